//! Reader for benchmark summary tables: a CSV file with a header record,
//! one measured cluster (or run) per following record.
//!
//! Only the baseline-diff column is interpreted. Its cells look like
//! `"150%"`; the percent signs are dropped and the rest parsed as a float.
//! Rows whose cell doesn't parse to a finite number are dropped.

use std::path::Path;

use bstr::ByteSlice;
use csv::{ByteRecord, ReaderBuilder, Trim};

use crate::Error;

pub const BASELINE_DIFF: &str = "baseline diff";

/// A row that survived cleaning.
#[derive(Clone, Debug, PartialEq)]
pub struct SummaryRow {
    /// Zero-based position among the data records of the source file,
    /// counted before any rows were dropped.
    pub index: usize,
    pub cells: Vec<String>,
    pub baseline_diff: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SummaryTable {
    pub columns: Vec<String>,
    pub rows: Vec<SummaryRow>,
    /// Data records whose baseline diff couldn't be coerced.
    pub dropped: usize,
}

impl SummaryTable {
    /// Reads the table at `path`. A missing file or a missing baseline-diff
    /// column is fatal.
    pub fn read(path: &Path) -> Result<Self, Error> {
        let bytes = std::fs::read(path).map_err(|e| Error::io(path, e))?;
        Self::parse(path, &bytes)
    }

    /// Header names are trimmed; data cells are kept as written, apart from
    /// CSV quoting. Blank lines are skipped and rows may be short.
    fn parse(path: &Path, bytes: &[u8]) -> Result<Self, Error> {
        let csv_err = |source: csv::Error| Error::Csv {
            path: path.to_path_buf(),
            source,
        };
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(Trim::Headers)
            .from_reader(bytes);

        let columns: Vec<String> = strings(reader.byte_headers().map_err(csv_err)?);
        let column = columns
            .iter()
            .position(|c| c == BASELINE_DIFF)
            .ok_or_else(|| Error::MissingColumn {
                path: path.to_path_buf(),
                column: BASELINE_DIFF.to_string(),
            })?;

        let mut rows = Vec::new();
        let mut dropped = 0;
        for (index, record) in reader.byte_records().enumerate() {
            let cells = strings(&record.map_err(csv_err)?);
            match cells.get(column).and_then(|c| clean_percent(c)) {
                Some(baseline_diff) => rows.push(SummaryRow {
                    index,
                    cells,
                    baseline_diff,
                }),
                None => dropped += 1,
            }
        }

        Ok(Self {
            columns,
            rows,
            dropped,
        })
    }

    pub fn baseline_diffs(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.baseline_diff).collect()
    }

    /// `(row index, baseline diff)` pairs, for plotting against the index.
    pub fn indexed_baseline_diffs(&self) -> Vec<(f64, f64)> {
        self.rows
            .iter()
            .map(|r| (r.index as f64, r.baseline_diff))
            .collect()
    }
}

fn strings(record: &ByteRecord) -> Vec<String> {
    record
        .iter()
        .map(|cell| cell.to_str_lossy().into_owned())
        .collect()
}

/// Strips every `%` and parses the remainder; `None` unless finite.
pub fn clean_percent(s: &str) -> Option<f64> {
    let stripped = s.replace('%', "");
    stripped
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<SummaryTable, Error> {
        SummaryTable::parse(Path::new("summary.csv"), text.as_bytes())
    }

    #[test]
    fn percent_is_stripped() {
        assert_eq!(clean_percent("150%"), Some(150.0));
        assert_eq!(clean_percent(" 99.5 % "), Some(99.5));
        assert_eq!(clean_percent("120"), Some(120.0));
        assert_eq!(clean_percent("abc"), None);
        assert_eq!(clean_percent(""), None);
        assert_eq!(clean_percent("nan"), None);
        assert_eq!(clean_percent("inf%"), None);
    }

    #[test]
    fn headers_are_trimmed_and_bad_rows_dropped() {
        let table =
            parse("cluster , baseline diff ,other\nc0,150%,x\nc1,abc,y\nc2,80%,z\n").unwrap();
        assert_eq!(table.columns, vec!["cluster", "baseline diff", "other"]);
        assert_eq!(table.baseline_diffs(), vec![150.0, 80.0]);
        assert_eq!(table.dropped, 1);
        // survivors keep their source position
        assert_eq!(table.indexed_baseline_diffs(), vec![(0.0, 150.0), (2.0, 80.0)]);
    }

    #[test]
    fn short_rows_and_empty_cells_are_dropped() {
        let table = parse("a,baseline diff\nx\ny,\nz,\"101%\"\r\n").unwrap();
        assert_eq!(table.baseline_diffs(), vec![101.0]);
        assert_eq!(table.dropped, 2);
        assert_eq!(table.rows[0].index, 2);
        assert_eq!(table.rows[0].cells, vec!["z", "101%"]);
    }

    #[test]
    fn quoted_commas_stay_in_their_cell() {
        let table = parse("cluster,baseline diff\n\"c0, east\",150%\n\"c1\",80%\n").unwrap();
        assert_eq!(table.baseline_diffs(), vec![150.0, 80.0]);
        assert_eq!(table.dropped, 0);
        assert_eq!(table.rows[0].cells, vec!["c0, east", "150%"]);
    }

    #[test]
    fn quoted_header_and_blank_lines() {
        let table = parse("\"name\",\" baseline diff\"\n\nc0,\" 99.5 % \"\n\nc1,120\n").unwrap();
        assert_eq!(table.columns, vec!["name", "baseline diff"]);
        assert_eq!(table.indexed_baseline_diffs(), vec![(0.0, 99.5), (1.0, 120.0)]);
    }

    #[test]
    fn missing_column_is_fatal() {
        assert!(matches!(
            parse("a,b\n1,2\n"),
            Err(Error::MissingColumn { .. })
        ));
        assert!(matches!(parse(""), Err(Error::MissingColumn { .. })));
    }

    #[test]
    fn missing_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let result = SummaryTable::read(&dir.path().join("summary.csv"));
        assert!(matches!(result, Err(Error::Io { .. })));
    }
}
