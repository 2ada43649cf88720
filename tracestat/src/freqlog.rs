//! Reader for key/frequency logs, i.e.,
//! <key>,<frequency>
//! one record per line, where frequency is an integer access count.
//!
//! Lines that don't split into exactly two fields are skipped. A second
//! field that isn't an integer fails the whole read.

use std::collections::HashMap;
use std::num::ParseIntError;

use bstr::{BString, ByteSlice};

use crate::scanner::{DelimIter, Scanner};
use crate::Error;

/// Accumulated access frequency per key. Every key appears once, holding
/// the sum of all of its occurrences in the source logs.
///
/// Sums are `i128`; adding `i64` records to them doesn't overflow.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrequencyTable {
    counts: HashMap<BString, i128>,
}

impl FrequencyTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, key: &[u8], freq: i64) {
        *self.counts.entry(BString::from(key)).or_insert(0) += i128::from(freq);
    }

    /// Folds another table into this one, summing shared keys.
    pub fn merge(mut self, other: FrequencyTable) -> Self {
        for (key, freq) in other.counts {
            *self.counts.entry(key).or_insert(0) += freq;
        }
        self
    }

    pub fn get(&self, key: &[u8]) -> Option<i128> {
        self.counts.get(key.as_bstr()).copied()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn total(&self) -> i128 {
        self.counts.values().sum()
    }

    /// Frequencies in arbitrary order.
    pub fn values(&self) -> impl Iterator<Item = i128> + '_ {
        self.counts.values().copied()
    }
}

/// A well-formed record: a trimmed key and its frequency.
pub struct Record<'a> {
    pub key: &'a [u8],
    pub freq: i64,
}

/// Parses the fields of a single line.
///
/// Returns `None` when the line doesn't have exactly two fields.
pub fn parse(mut fields: DelimIter<'_>) -> Option<Result<Record<'_>, ParseIntError>> {
    if fields.nfields() != 2 {
        return None;
    }
    let key = fields.next()?.trim();
    let freq = fields.next()?.trim();
    Some(parse_int(freq).map(|freq| Record { key, freq }))
}

fn parse_int(bytes: &[u8]) -> Result<i64, ParseIntError> {
    // non-utf8 bytes become replacement chars, which fail the parse
    bytes.to_str_lossy().parse()
}

/// Reads every file behind a comma-delimited scanner into a single table.
pub fn read(scanner: &Scanner) -> Result<FrequencyTable, Error> {
    let tables: Vec<FrequencyTable> = scanner
        .try_fold(
            |_| FrequencyTable::new(),
            |mut table: FrequencyTable, path, line, fields| {
                match parse(fields) {
                    None => {}
                    Some(Ok(record)) => table.add(record.key, record.freq),
                    Some(Err(source)) => {
                        return Err(Error::ParseFrequency {
                            path: path.to_path_buf(),
                            line,
                            source,
                        })
                    }
                }
                Ok(table)
            },
        )
        .collect::<Result<_, _>>()?;
    Ok(tables
        .into_iter()
        .fold(FrequencyTable::new(), FrequencyTable::merge))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_of(contents: &str) -> Result<FrequencyTable, Error> {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("access.log");
        std::fs::write(&path, contents).unwrap();
        read(&Scanner::new(vec![path], b','))
    }

    #[test]
    fn duplicate_keys_accumulate() {
        let table = table_of("a,1\na,2\n").unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(b"a"), Some(3));
    }

    #[test]
    fn wrong_field_counts_are_skipped() {
        let table = table_of("a,1,2\na\n\nb,4\n").unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(b"a"), None);
        assert_eq!(table.get(b"b"), Some(4));
    }

    #[test]
    fn fields_are_trimmed() {
        let table = table_of("  k1 ,  10 \r\nk1,5\n").unwrap();
        assert_eq!(table.get(b"k1"), Some(15));
    }

    #[test]
    fn total_matches_well_formed_lines() {
        let table = table_of("x,7\ny,-2\nbad\nz,1,1\ny,5\n").unwrap();
        assert_eq!(table.total(), 7 - 2 + 5);
    }

    #[test]
    fn bad_integer_is_fatal() {
        match table_of("a,1\nb,two\n") {
            Err(Error::ParseFrequency { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn empty_frequency_field_is_fatal() {
        assert!(matches!(
            table_of("a,\n"),
            Err(Error::ParseFrequency { .. })
        ));
    }

    #[test]
    fn sums_past_i64_max_are_exact() {
        let max = i64::MAX;
        let table = table_of(&format!("a,{}\na,{}\nb,{}\n", max, max, max)).unwrap();
        assert_eq!(table.get(b"a"), Some(2 * i128::from(max)));
        assert_eq!(table.total(), 3 * i128::from(max));
    }

    #[test]
    fn shards_merge() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.log");
        let b = dir.path().join("b.log");
        std::fs::write(&a, "k,1\nj,1\n").unwrap();
        std::fs::write(&b, "k,2\n").unwrap();
        let table = read(&Scanner::new(vec![a, b], b',')).unwrap();
        assert_eq!(table.get(b"k"), Some(3));
        assert_eq!(table.get(b"j"), Some(1));
    }
}
