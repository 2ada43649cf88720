//! Crate-wide error type.

use std::io;
use std::num::ParseIntError;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::chart::PlotError;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{path:?} line {line}: invalid frequency: {source}")]
    ParseFrequency {
        path: PathBuf,
        line: usize,
        #[source]
        source: ParseIntError,
    },

    #[error("{path:?}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{path:?}: no column named {column:?}")]
    MissingColumn { path: PathBuf, column: String },

    #[error("frequency table is empty")]
    EmptyTable,

    #[error(transparent)]
    Plot(#[from] PlotError),
}

impl Error {
    pub(crate) fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}
