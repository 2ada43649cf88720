//! Cumulative distribution of access frequencies.
//!
//! Keys are ranked by descending frequency; element `i` of the CDF is the
//! share of all accesses that went to the `i + 1` hottest keys.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::freqlog::FrequencyTable;
use crate::Error;

/// Fractions of total accesses for which we report the hot-set size.
pub const COVERAGE_FRACTIONS: [f64; 4] = [0.5, 0.8, 0.9, 0.99];

/// Max, min and mean of the raw frequencies, used for annotation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrequencyStats {
    pub max: i128,
    pub min: i128,
    pub mean: f64,
}

pub struct Cdf {
    sorted: Vec<i128>,
    cumulative: Vec<i128>,
    probabilities: Vec<f64>,
    stats: FrequencyStats,
}

impl Cdf {
    /// Ranks the table's frequencies and normalizes their running sum.
    ///
    /// The reduction is undefined for an empty table. A table whose
    /// frequencies sum to zero produces NaN probabilities.
    pub fn from_table(table: &FrequencyTable) -> Result<Self, Error> {
        if table.is_empty() {
            return Err(Error::EmptyTable);
        }

        let mut sorted: Vec<i128> = table.values().collect();
        sorted.sort_unstable_by(|a, b| b.cmp(a));

        let cumulative: Vec<i128> = sorted
            .iter()
            .scan(0i128, |sum, &f| {
                *sum += f;
                Some(*sum)
            })
            .collect();
        let total = cumulative[cumulative.len() - 1];
        let probabilities = cumulative
            .iter()
            .map(|&c| c as f64 / total as f64)
            .collect();

        let stats = FrequencyStats {
            max: sorted[0],
            min: sorted[sorted.len() - 1],
            mean: total as f64 / sorted.len() as f64,
        };

        Ok(Self {
            sorted,
            cumulative,
            probabilities,
            stats,
        })
    }

    /// Frequencies in non-increasing order.
    pub fn sorted(&self) -> &[i128] {
        &self.sorted
    }

    pub fn cumulative(&self) -> &[i128] {
        &self.cumulative
    }

    /// The normalized cumulative sums; the last one is 1.
    pub fn probabilities(&self) -> &[f64] {
        &self.probabilities
    }

    pub fn total(&self) -> i128 {
        self.cumulative[self.cumulative.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.sorted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sorted.is_empty()
    }

    pub fn stats(&self) -> FrequencyStats {
        self.stats
    }

    /// Number of hottest keys needed to account for at least `fraction`
    /// of all accesses, if any prefix does.
    pub fn keys_covering(&self, fraction: f64) -> Option<usize> {
        self.probabilities
            .iter()
            .position(|&p| p >= fraction)
            .map(|i| i + 1)
    }

    /// Hot-set sizes for each of [`COVERAGE_FRACTIONS`], keyed by percent.
    pub fn coverage(&self) -> HashMap<String, Option<usize>> {
        COVERAGE_FRACTIONS
            .iter()
            .map(|&f| (format!("p{:.0}", f * 100.0), self.keys_covering(f)))
            .collect()
    }

    /// Writes `rank frequency cumulative_frequency cdf` lines, rank 0 first.
    pub fn write_table(&self, path: &Path) -> Result<(), Error> {
        let file = File::create(path).map_err(|e| Error::io(path, e))?;
        let mut writer = BufWriter::new(file);
        let rows = self
            .sorted
            .iter()
            .zip(self.cumulative.iter())
            .zip(self.probabilities.iter())
            .enumerate();
        for (rank, ((freq, cum), p)) in rows {
            writeln!(writer, "{} {} {} {}", rank, freq, cum, p).map_err(|e| Error::io(path, e))?;
        }
        writer.flush().map_err(|e| Error::io(path, e))
    }
}
