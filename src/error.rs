use std::path::PathBuf;

use thiserror::Error;

/// Fatal failures while reading the source table. No partial table is ever
/// returned alongside one of these.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot open data file {path:?}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("data file {path:?} has no header row")]
    NoHeaders { path: PathBuf },
    #[error("reading row {row} of {path:?}")]
    Malformed {
        path: PathBuf,
        row: usize,
        #[source]
        source: csv::Error,
    },
    #[error("row {row} of {path:?} is not valid {encoding}")]
    Decode {
        path: PathBuf,
        row: usize,
        encoding: &'static str,
    },
    #[error("row {row} has {found} field(s), expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("column '{column}' appears more than once")]
    DuplicateColumn { column: String },
    #[error("required column '{column}' is missing")]
    MissingColumn { column: String },
}

/// An optional column a feature depends on is absent. Callers skip the
/// feature instead of failing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("column '{column}' is not present")]
pub struct MissingColumn {
    pub column: String,
}

impl MissingColumn {
    pub fn new(column: &str) -> Self {
        Self {
            column: column.to_string(),
        }
    }
}
