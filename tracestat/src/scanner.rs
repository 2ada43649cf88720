//! This module helps us read from sequences of text files containing
//! fields separated by a common delimiter, line-by-line.
//!
//! Each file is folded over independently, one after another, so sharded
//! logs can be combined without concatenating them first. At most one file
//! is open at a time.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use bstr::ByteSlice;

use crate::Error;

const BUFSIZE: usize = 64 * 1024;

/// An iterator over byte slices separated by a delimiter.
/// The iterated-over slices won't contain the delimiter, but may be empty.
///
/// A line with `k` delimiters always yields `k + 1` fields, so `"a,"` is
/// two fields and the empty line is one (empty) field.
#[derive(Clone)]
pub struct DelimIter<'a> {
    bytes: &'a [u8],
    pos: Option<usize>,
    delim: u8,
}

impl<'a> DelimIter<'a> {
    pub fn new(bytes: &[u8], delim: u8) -> DelimIter<'_> {
        DelimIter {
            bytes,
            pos: Some(0),
            delim,
        }
    }

    /// Number of fields left in the line. Consumes nothing.
    pub fn nfields(&self) -> usize {
        self.clone().count()
    }
}

impl<'a> Iterator for DelimIter<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<&'a [u8]> {
        let start = self.pos?;
        let bytes = &self.bytes[start..];
        match bytes.find_byte(self.delim) {
            None => {
                self.pos = None;
                Some(bytes)
            }
            Some(end) => {
                self.pos = Some(start + end + 1);
                Some(&bytes[..end])
            }
        }
    }
}

/// A `Scanner` provides line-level access to underlying files of
/// fields, where fields are delimited with a specified delimiter.
///
/// Lines have surrounding whitespace (including a trailing `\r`) removed
/// before they are split. Outside of that, you're on your own: repeat
/// delimiters produce empty fields and blank lines a single empty field.
pub struct Scanner {
    paths: Vec<PathBuf>,
    delimiter: u8,
}

impl Scanner {
    pub fn new(paths: Vec<PathBuf>, delimiter: u8) -> Self {
        Self { paths, delimiter }
    }

    /// Fold over the lines in the associated files to this scanner.
    ///
    /// The `fold` function receives the accumulator, the path being read,
    /// the 1-indexed line number and a (cloneable) one-pass iterator over
    /// the fields of that line. The first error stops the fold for that
    /// file.
    ///
    /// Every file is folded over exactly once, starting from `id(i)` for
    /// the `i`-th path. The returned iterator is lazy: a file is opened
    /// only when its result is pulled, and closed before the next one.
    pub fn try_fold<'a, U, Id, Fold>(
        &'a self,
        id: Id,
        fold: Fold,
    ) -> impl Iterator<Item = Result<U, Error>> + 'a
    where
        U: 'a,
        Id: Fn(usize) -> U + 'a,
        Fold: Fn(U, &Path, usize, DelimIter<'_>) -> Result<U, Error> + 'a,
    {
        let delim = self.delimiter;
        self.paths
            .iter()
            .enumerate()
            .map(move |(i, path)| -> Result<U, Error> {
                let file = File::open(path).map_err(|source| Error::io(path, source))?;
                let reader = BufReader::with_capacity(BUFSIZE, file);
                let mut acc = id(i);
                for (lineno, line) in reader.split(b'\n').enumerate() {
                    let line = line.map_err(|source| Error::io(path, source))?;
                    let fields = DelimIter::new(line.as_slice().trim(), delim);
                    acc = fold(acc, path.as_path(), lineno + 1, fields)?;
                }
                Ok(acc)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(s: &str) -> Vec<&[u8]> {
        DelimIter::new(s.as_bytes(), b',').collect()
    }

    #[test]
    fn splits_on_delimiter() {
        assert_eq!(fields("a,1"), vec![&b"a"[..], &b"1"[..]]);
        assert_eq!(fields("a,,b"), vec![&b"a"[..], &b""[..], &b"b"[..]]);
        assert_eq!(DelimIter::new(b"a,1,2", b',').nfields(), 3);
    }

    #[test]
    fn empty_line_is_one_empty_field() {
        assert_eq!(fields(""), vec![&b""[..]]);
    }

    #[test]
    fn trailing_delimiter_keeps_last_empty_field() {
        assert_eq!(fields("a,"), vec![&b"a"[..], &b""[..]]);
        assert_eq!(fields(",,"), vec![&b""[..], &b""[..], &b""[..]]);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let scanner = Scanner::new(vec![dir.path().join("absent.log")], b',');
        let result: Result<Vec<usize>, Error> = scanner
            .try_fold(|_| 0, |n, _, _, _| Ok(n + 1))
            .collect();
        assert!(matches!(result, Err(Error::Io { .. })));
    }

    #[test]
    fn folds_every_line_of_every_file() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.log");
        let b = dir.path().join("b.log");
        std::fs::write(&a, "x,1\r\ny\n").unwrap();
        std::fs::write(&b, "z").unwrap();
        let scanner = Scanner::new(vec![a, b], b',');
        let counts: Vec<usize> = scanner
            .try_fold(|_| 0, |n, _, _, line| Ok(n + line.nfields()))
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(counts, vec![3, 1]);
    }

    #[test]
    fn first_error_stops_before_later_files() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.log");
        std::fs::write(&a, "x\ny\n").unwrap();
        let scanner = Scanner::new(vec![a, dir.path().join("absent.log")], b',');
        let result: Result<Vec<usize>, Error> = scanner
            .try_fold(|_| 0, |_, _, _, _| Err(Error::EmptyTable))
            .collect();
        assert!(matches!(result, Err(Error::EmptyTable)));
    }
}
