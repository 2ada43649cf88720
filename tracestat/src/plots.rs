//! The figures drawn by the two analysis pipelines.

use itertools::Itertools;

use crate::cdf::{Cdf, FrequencyStats};
use crate::chart::{Figure, HLine, Panel, Rgb, Scale, Series};
use crate::density::{GaussianKde, Histogram};
use crate::summary::SummaryTable;

pub const CDF_PLOTS: &str = "cdf_plots.png";
pub const SCATTER_PLOT: &str = "scatter_plot_baseline_diff.png";
pub const LINE_PLOT: &str = "line_plot_baseline_diff.png";
pub const HISTOGRAM: &str = "histogram_baseline_diff.png";

pub const HISTOGRAM_BINS: usize = 50;
const KDE_GRID: usize = 200;

/// Baseline diff of a run that performs exactly like the baseline.
pub const BASELINE: f64 = 100.0;

/// Rank against cumulative probability, on a linear and on a log rank
/// axis, with the frequency range noted underneath.
pub fn cdf_figure(cdf: &Cdf) -> Figure {
    let points: Vec<(f64, f64)> = cdf
        .probabilities()
        .iter()
        .enumerate()
        .map(|(rank, &p)| (rank as f64, p))
        .collect();

    let panel = |title: &str, x_scale: Scale, color: Rgb| {
        let mut panel = Panel::new(title, "Rank", "Cumulative Probability");
        panel.x_scale = x_scale;
        panel.grid = true;
        panel.series.push(Series::Line {
            points: points.clone(),
            color,
            alpha: 1.0,
            markers: false,
            label: None,
        });
        panel
    };

    Figure {
        size: (1600, 600),
        panels: vec![
            panel("Cumulative Distribution Function (CDF)", Scale::Linear, Rgb::BLUE),
            panel("Log Cumulative Distribution Function", Scale::Log, Rgb::RED),
        ],
        annotation: frequency_annotation(cdf.stats()),
    }
}

pub fn frequency_annotation(stats: FrequencyStats) -> Vec<String> {
    vec![
        format!("Max Frequency: {}", thousands(stats.max)),
        format!("Min Frequency: {}", thousands(stats.min)),
        format!("Mean Frequency: {}", thousands(stats.mean as i128)),
    ]
}

/// Formats an integer with `,` between groups of three digits.
pub fn thousands(n: i128) -> String {
    let digits = n.unsigned_abs().to_string();
    let grouped = digits
        .as_bytes()
        .rchunks(3)
        .rev()
        .map(String::from_utf8_lossy)
        .join(",");
    if n < 0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

fn baseline_panel(title: &str, label: &str, series: Series) -> Panel {
    let mut panel = Panel::new(title, "Cluster Index", "Baseline Diff (%)");
    panel.grid = true;
    panel.series.push(series);
    panel.hlines.push(HLine {
        y: BASELINE,
        color: Rgb::RED,
        label: Some(label.to_string()),
    });
    panel
}

/// Baseline diff of every surviving row, against its row index.
pub fn scatter_figure(table: &SummaryTable) -> Figure {
    let series = Series::Scatter {
        points: table.indexed_baseline_diffs(),
        color: Rgb::BLUE,
        alpha: 0.7,
        label: None,
    };
    Figure {
        size: (1000, 500),
        panels: vec![baseline_panel(
            "Performance Difference Across Clusters (Random vs. CBA)",
            "Mean baseline diff",
            series,
        )],
        annotation: Vec::new(),
    }
}

/// The scatter's points joined in row order.
pub fn line_figure(table: &SummaryTable) -> Figure {
    let series = Series::Line {
        points: table.indexed_baseline_diffs(),
        color: Rgb::PURPLE,
        alpha: 0.7,
        markers: true,
        label: None,
    };
    Figure {
        size: (1000, 500),
        panels: vec![baseline_panel(
            "Trend of Performance Difference Across Clusters",
            "Baseline performance",
            series,
        )],
        annotation: Vec::new(),
    }
}

/// Counts over [`HISTOGRAM_BINS`] bins, overlaid with a kernel density
/// estimate scaled to the same counts.
pub fn histogram_figure(values: &[f64]) -> Figure {
    let histogram = Histogram::new(values, HISTOGRAM_BINS);
    let mut panel = Panel::new(
        "Histogram of Performance Differences",
        "Baseline Diff (%)",
        "Frequency",
    );
    panel.series.push(Series::Bars {
        bars: histogram
            .bins()
            .map(|(l, r, c)| (l, r, c as f64))
            .collect(),
        fill: Rgb::GREEN,
        alpha: 0.5,
    });

    if let Some(kde) = GaussianKde::scott(values) {
        let scale = values.len() as f64 * histogram.bin_width();
        panel.series.push(Series::Line {
            points: kde.curve(histogram.lo, histogram.hi, KDE_GRID, scale),
            color: Rgb::GREEN,
            alpha: 1.0,
            markers: false,
            label: None,
        });
    }

    Figure {
        size: (800, 500),
        panels: vec![panel],
        annotation: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::freqlog::FrequencyTable;

    #[test]
    fn thousands_separators() {
        assert_eq!(thousands(0), "0");
        assert_eq!(thousands(999), "999");
        assert_eq!(thousands(1000), "1,000");
        assert_eq!(thousands(1234567), "1,234,567");
        assert_eq!(thousands(-45000), "-45,000");
    }

    #[test]
    fn cdf_figure_has_linear_and_log_panels() {
        let mut table = FrequencyTable::new();
        table.add(b"k1", 15);
        table.add(b"k2", 3);
        let cdf = Cdf::from_table(&table).unwrap();
        let figure = cdf_figure(&cdf);

        assert_eq!(figure.panels.len(), 2);
        assert_eq!(figure.panels[0].x_scale, Scale::Linear);
        assert_eq!(figure.panels[1].x_scale, Scale::Log);
        for panel in &figure.panels {
            assert_eq!(panel.x_label, "Rank");
            assert_eq!(panel.y_label, "Cumulative Probability");
            assert!(panel.grid);
        }
        assert_eq!(
            figure.annotation,
            vec![
                "Max Frequency: 15",
                "Min Frequency: 3",
                "Mean Frequency: 9"
            ]
        );
    }

    #[test]
    fn mean_annotation_truncates() {
        let stats = FrequencyStats {
            max: 2_000_000,
            min: 1,
            mean: 1234.9,
        };
        assert_eq!(frequency_annotation(stats)[0], "Max Frequency: 2,000,000");
        assert_eq!(frequency_annotation(stats)[2], "Mean Frequency: 1,234");
    }

    #[test]
    fn histogram_has_fifty_bins_and_density() {
        let values = [80.0, 95.0, 100.0, 101.0, 130.0];
        let figure = histogram_figure(&values);
        let panel = &figure.panels[0];
        match &panel.series[0] {
            Series::Bars { bars, .. } => {
                assert_eq!(bars.len(), HISTOGRAM_BINS);
                let total: f64 = bars.iter().map(|b| b.2).sum();
                assert_eq!(total, 5.0);
            }
            other => panic!("expected bars, got {:?}", other),
        }
        match &panel.series[1] {
            Series::Line { points, .. } => assert_eq!(points.len(), KDE_GRID),
            other => panic!("expected density line, got {:?}", other),
        }
    }

    #[test]
    fn histogram_of_one_value_has_no_density() {
        let figure = histogram_figure(&[100.0]);
        assert_eq!(figure.panels[0].series.len(), 1);
    }
}
