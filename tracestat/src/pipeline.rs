//! The two analyses, each a straight pass from loading through reduction
//! to rendering.
//!
//! Progress is reported on stdout: the human-readable lines the analyses
//! promise, interleaved with one JSON object per stage carrying sizes and
//! durations.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use serde_json::json;

use crate::cdf::Cdf;
use crate::chart::{Figure, Render};
use crate::summary::{SummaryTable, BASELINE_DIFF};
use crate::{freqlog, plots, Describe, Error, Scanner};

/// File name of the optional rank table written next to the CDF plots.
pub const CDF_TABLE: &str = "cdf.txt";

pub struct CdfConfig {
    /// Key/frequency logs, merged into one table.
    pub logs: Vec<PathBuf>,
    /// Plots go to the `output` directory under this folder.
    pub folder: PathBuf,
    /// Also write the per-rank table to [`CDF_TABLE`].
    pub dump_cdf: bool,
}

impl CdfConfig {
    pub fn output_dir(&self) -> PathBuf {
        self.folder.join("output")
    }
}

#[derive(Debug, PartialEq)]
pub enum CdfOutcome {
    /// This input log doesn't exist; nothing was written.
    MissingInput(PathBuf),
    /// The plots were saved to this path.
    Saved(PathBuf),
}

/// Loads the frequency logs, ranks them into a CDF and draws it.
///
/// A missing log is reported and ends the run without error. Unparseable
/// frequencies, an empty table and I/O or drawing failures are errors.
pub fn run_cdf(config: &CdfConfig, renderer: &dyn Render) -> Result<CdfOutcome, Error> {
    if let Some(missing) = config.logs.iter().find(|p| !p.exists()) {
        println!("Error: File {} does not exist.", missing.display());
        return Ok(CdfOutcome::MissingInput(missing.clone()));
    }

    let load_start = Instant::now();
    let table = freqlog::read(&Scanner::new(config.logs.clone(), b','))?;
    println!(
        "{}",
        json!({
            "nkeys": table.len(),
            "total_accesses": table.total() as f64,
            "load_duration": format!("{:.0?}", Instant::now().duration_since(load_start)),
        })
    );

    let output_dir = config.output_dir();
    fs::create_dir_all(&output_dir).map_err(|e| Error::io(&output_dir, e))?;

    let cdf = Cdf::from_table(&table)?;
    let stats = cdf.stats();
    println!(
        "{}",
        json!({
            "max_frequency": stats.max as f64,
            "min_frequency": stats.min as f64,
            "mean_frequency": stats.mean,
            "keys_covering": cdf.coverage(),
        })
    );

    if config.dump_cdf {
        let table_path = output_dir.join(CDF_TABLE);
        cdf.write_table(&table_path)?;
        println!("Saved CDF table: {}", table_path.display());
    }

    let path = output_dir.join(plots::CDF_PLOTS);
    render_timed(renderer, &plots::cdf_figure(&cdf), &path)?;
    println!("Saved CDF plots: {}", path.display());
    Ok(CdfOutcome::Saved(path))
}

pub struct SummaryConfig {
    pub csv: PathBuf,
    pub output_dir: PathBuf,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            csv: PathBuf::from("summary.csv"),
            output_dir: PathBuf::from("plots"),
        }
    }
}

pub struct SummaryOutcome {
    pub stats: Describe,
    pub plots: Vec<PathBuf>,
}

/// Cleans the summary table's baseline-diff column, prints its statistics
/// and draws the scatter, line and histogram charts.
///
/// A missing file or column is an error; rows that don't parse are not.
pub fn run_summary(
    config: &SummaryConfig,
    renderer: &dyn Render,
) -> Result<SummaryOutcome, Error> {
    let output_dir = &config.output_dir;
    fs::create_dir_all(output_dir).map_err(|e| Error::io(output_dir, e))?;

    let load_start = Instant::now();
    let table = SummaryTable::read(&config.csv)?;
    println!(
        "{}",
        json!({
            "rows": table.rows.len(),
            "dropped_rows": table.dropped,
            "load_duration": format!("{:.0?}", Instant::now().duration_since(load_start)),
        })
    );

    let values = table.baseline_diffs();
    let stats = Describe::from(values.iter().copied());
    println!("{}", summary_report(&stats));
    println!("{}", json!({ "baseline_diff": stats.to_map() }));

    let figures = vec![
        (plots::SCATTER_PLOT, plots::scatter_figure(&table)),
        (plots::LINE_PLOT, plots::line_figure(&table)),
        (plots::HISTOGRAM, plots::histogram_figure(&values)),
    ];
    let mut paths = Vec::with_capacity(figures.len());
    for (name, figure) in figures {
        let path = output_dir.join(name);
        render_timed(renderer, &figure, &path)?;
        paths.push(path);
    }

    println!(
        "\nGraphs have been saved in the '{}/' directory.",
        output_dir.display()
    );
    Ok(SummaryOutcome {
        stats,
        plots: paths,
    })
}

/// The statistics block `run_summary` prints: the full description of the
/// baseline-diff column, then its headline numbers to two decimals.
pub fn summary_report(stats: &Describe) -> String {
    let mut out = String::new();
    out.push_str("\nSummary Statistics for baseline diff (Random vs. CBA):\n");
    out.push_str(&stats.report(BASELINE_DIFF));
    out.push_str("\n\nAdditional Statistics for baseline diff:\n");
    out.push_str(&format!("  Mean: {:.2}\n", stats.mean));
    out.push_str(&format!("  Median: {:.2}\n", stats.median()));
    out.push_str(&format!("  Min: {:.2}\n", stats.min));
    out.push_str(&format!("  Max: {:.2}\n", stats.max));
    out.push_str(&format!("  Std Dev: {:.2}", stats.std));
    out
}

fn render_timed(renderer: &dyn Render, figure: &Figure, path: &Path) -> Result<(), Error> {
    let render_start = Instant::now();
    renderer.render(figure, path)?;
    println!(
        "{}",
        json!({
            "plot": path.display().to_string(),
            "render_duration": format!("{:.0?}", Instant::now().duration_since(render_start)),
        })
    );
    Ok(())
}
