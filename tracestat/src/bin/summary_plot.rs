//! Summarizes the baseline diff column of a benchmark summary table and
//! charts it.

use std::path::PathBuf;

use structopt::StructOpt;

use tracestat::chart::BitmapRenderer;
use tracestat::pipeline::{self, SummaryConfig};
use tracestat::Error;

/// Prints descriptive statistics of the `baseline diff` column and saves
/// a scatter plot, a line plot and a histogram of it.
#[derive(Debug, StructOpt)]
#[structopt(name = "summary-plot", about = "Plot baseline diffs of a summary table.")]
struct Opt {
    /// Summary table with a `baseline diff` column.
    #[structopt(long, default_value = "summary.csv")]
    csv: PathBuf,

    /// Directory the charts are saved to.
    #[structopt(long, default_value = "plots")]
    out: PathBuf,
}

fn main() -> Result<(), Error> {
    let opt = Opt::from_args();
    let config = SummaryConfig {
        csv: opt.csv,
        output_dir: opt.out,
    };
    pipeline::run_summary(&config, &BitmapRenderer)?;
    Ok(())
}
