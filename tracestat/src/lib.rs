//! # `tracestat` - access trace and benchmark summary analysis
//!
//! Includes utilities for reading comma-delimited plaintext access logs
//! and benchmark summary tables, reducing them to distributions and
//! descriptive statistics, and charting the results to PNG files.

use std::collections::HashMap;

use ordered_float::NotNan;

pub mod cdf;
pub mod chart;
pub mod density;
mod error;
pub mod freqlog;
pub mod pipeline;
pub mod plots;
mod scanner;
pub mod summary;

pub use error::Error;
pub use scanner::{DelimIter, Scanner};

const NQUARTILES: usize = 3;
const QUARTILES: [f64; NQUARTILES] = [0.25, 0.50, 0.75];

/// Descriptive statistics over a column of finite values: count, mean,
/// sample standard deviation, min, quartiles and max.
///
/// Quartiles interpolate linearly between the two closest ranks. Every
/// statistic but `count` is NaN for an empty column, and `std` is NaN
/// for a single value.
#[derive(Clone, Debug, PartialEq)]
pub struct Describe {
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub quartiles: [f64; NQUARTILES],
    pub max: f64,
}

impl Describe {
    pub fn from(it: impl Iterator<Item = f64>) -> Self {
        let mut v: Vec<NotNan<f64>> = it.filter_map(|f| NotNan::new(f).ok()).collect();
        v.sort_unstable();
        let v: Vec<f64> = v.into_iter().map(NotNan::into_inner).collect();

        let count = v.len();
        if count == 0 {
            return Self {
                count,
                mean: f64::NAN,
                std: f64::NAN,
                min: f64::NAN,
                quartiles: [f64::NAN; NQUARTILES],
                max: f64::NAN,
            };
        }

        let mean = v.iter().sum::<f64>() / count as f64;
        let std = if count < 2 {
            f64::NAN
        } else {
            let ss = v.iter().map(|x| (x - mean).powi(2)).sum::<f64>();
            (ss / (count - 1) as f64).sqrt()
        };
        let mut quartiles = [0.0; NQUARTILES];
        QUARTILES
            .iter()
            .map(|&q| interpolate(&v, q))
            .zip(quartiles.iter_mut())
            .for_each(|(val, p)| *p = val);

        Self {
            count,
            mean,
            std,
            min: v[0],
            quartiles,
            max: v[count - 1],
        }
    }

    pub fn median(&self) -> f64 {
        self.quartiles[1]
    }

    fn rows(&self) -> [(&'static str, f64); 8] {
        [
            ("count", self.count as f64),
            ("mean", self.mean),
            ("std", self.std),
            ("min", self.min),
            ("25%", self.quartiles[0]),
            ("50%", self.quartiles[1]),
            ("75%", self.quartiles[2]),
            ("max", self.max),
        ]
    }

    pub fn to_map(&self) -> HashMap<String, f64> {
        self.rows()
            .iter()
            .map(|&(name, val)| (name.to_string(), val))
            .collect()
    }

    /// A two-column text table, one statistic per line, closed by a line
    /// naming the column.
    pub fn report(&self, name: &str) -> String {
        let values: Vec<String> = self.rows().iter().map(|(_, v)| format!("{:.6}", v)).collect();
        let width = values.iter().map(String::len).max().unwrap_or(0) + 4;
        let mut out = String::new();
        for ((label, _), value) in self.rows().iter().zip(values.iter()) {
            out.push_str(&format!("{:<5}{:>width$}\n", label, value, width = width));
        }
        out.push_str(&format!("Name: {}, dtype: float64", name));
        out
    }
}

/// Linear interpolation at quantile `q` of nonempty sorted `v`.
fn interpolate(v: &[f64], q: f64) -> f64 {
    let pos = (v.len() - 1) as f64 * q;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    v[lo] + (v[hi] - v[lo]) * (pos - lo as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn mean_and_median() {
        let d = Describe::from(vec![100.0, 120.0, 80.0].into_iter());
        assert_eq!(d.count, 3);
        assert!(close(d.mean, 100.0));
        assert!(close(d.median(), 100.0));
        assert!(close(d.std, 20.0));
        assert!(close(d.min, 80.0));
        assert!(close(d.max, 120.0));
        assert!(close(d.quartiles[0], 90.0));
        assert!(close(d.quartiles[2], 110.0));
    }

    #[test]
    fn even_count_median_interpolates() {
        let d = Describe::from(vec![1.0, 2.0, 3.0, 10.0].into_iter());
        assert!(close(d.median(), 2.5));
        assert!(close(d.quartiles[0], 1.75));
        assert!(close(d.quartiles[2], 4.75));
    }

    #[test]
    fn single_value_has_no_std() {
        let d = Describe::from(std::iter::once(42.0));
        assert_eq!(d.count, 1);
        assert!(d.std.is_nan());
        assert!(close(d.median(), 42.0));
    }

    #[test]
    fn empty_is_all_nan() {
        let d = Describe::from(std::iter::empty());
        assert_eq!(d.count, 0);
        assert!(d.mean.is_nan() && d.min.is_nan() && d.max.is_nan());
        assert_eq!(d.to_map()["count"], 0.0);
    }

    #[test]
    fn report_lists_every_statistic() {
        let d = Describe::from(vec![100.0, 120.0, 80.0].into_iter());
        let report = d.report("baseline diff");
        let lines: Vec<&str> = report.lines().collect();
        assert_eq!(lines.len(), 9);
        assert!(lines[0].starts_with("count"));
        assert!(lines[0].ends_with("3.000000"));
        assert!(lines[1].ends_with("100.000000"));
        assert!(lines[5].starts_with("50%"));
        assert_eq!(lines[8], "Name: baseline diff, dtype: float64");
    }
}
