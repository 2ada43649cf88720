//! Reads a `<key>,<frequency>` access log and plots the cumulative
//! distribution of accesses over keys ranked hottest first.

use std::path::PathBuf;

use structopt::StructOpt;

use tracestat::chart::BitmapRenderer;
use tracestat::pipeline::{self, CdfConfig};
use tracestat::Error;

/// Generate access pattern graphs.
///
/// Writes `<folder>/output/cdf_plots.png`, with a linear and a
/// log-scale rank axis side by side.
#[derive(Debug, StructOpt)]
#[structopt(name = "cdf-plot", about = "Generate access pattern graphs.")]
struct Opt {
    /// File name with access patterns.
    filename: PathBuf,

    /// Folder under which the `output` directory is created.
    folder: PathBuf,

    /// Also write a `rank frequency cumulative cdf` table to
    /// `<folder>/output/cdf.txt`.
    #[structopt(long)]
    dump_cdf: bool,
}

fn main() -> Result<(), Error> {
    let opt = Opt::from_args();
    let config = CdfConfig {
        logs: vec![opt.filename],
        folder: opt.folder,
        dump_cdf: opt.dump_cdf,
    };
    pipeline::run_cdf(&config, &BitmapRenderer)?;
    Ok(())
}
