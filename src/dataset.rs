//! In-memory table of student records and the cached loader.
//!
//! [`read_table`] parses a delimited file into a [`Table`] of typed cells.
//! [`load_normalized`] adds the required-column check and normalization, and
//! memoizes the result per source so repeated requests in one process reuse
//! the same immutable table.

use std::{
    collections::{HashMap, HashSet},
    path::{Path, PathBuf},
    sync::{Arc, Mutex, OnceLock, PoisonError},
};

use anyhow::{Context, Result};
use encoding_rs::Encoding;
use log::{debug, info};

use crate::{
    data::{Cell, ColumnKind},
    error::LoadError,
    io_utils, normalize,
    schema::REQUIRED_COLUMNS,
};

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<Cell>>) -> Result<Self, LoadError> {
        let mut seen = HashSet::with_capacity(headers.len());
        for header in &headers {
            if !seen.insert(header.as_str()) {
                return Err(LoadError::DuplicateColumn {
                    column: header.clone(),
                });
            }
        }
        for (idx, row) in rows.iter().enumerate() {
            if row.len() != headers.len() {
                return Err(LoadError::RaggedRow {
                    row: idx + 2,
                    expected: headers.len(),
                    found: row.len(),
                });
            }
        }
        Ok(Self { headers, rows })
    }

    /// Builds a table from raw string fields, typing every cell.
    pub fn from_raw<S>(headers: &[&str], rows: &[Vec<S>]) -> Result<Self, LoadError>
    where
        S: AsRef<str>,
    {
        let typed = rows
            .iter()
            .map(|row| row.iter().map(|field| Cell::parse(field.as_ref())).collect())
            .collect();
        Self::new(headers.iter().map(|h| h.to_string()).collect(), typed)
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|header| header == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn row(&self, index: usize) -> &[Cell] {
        &self.rows[index]
    }

    pub fn cell(&self, row: usize, column: usize) -> &Cell {
        &self.rows[row][column]
    }

    pub fn column(&self, column: usize) -> impl Iterator<Item = &Cell> + '_ {
        self.rows.iter().map(move |row| &row[column])
    }

    pub fn column_kind(&self, column: usize) -> ColumnKind {
        ColumnKind::detect(self.column(column))
    }

    pub fn require_columns(&self, names: &[&str]) -> Result<(), LoadError> {
        match names.iter().find(|name| !self.has_column(name)) {
            Some(missing) => Err(LoadError::MissingColumn {
                column: missing.to_string(),
            }),
            None => Ok(()),
        }
    }

    pub(crate) fn column_mut(&mut self, column: usize) -> impl Iterator<Item = &mut Cell> + '_ {
        self.rows.iter_mut().map(move |row| &mut row[column])
    }
}

#[derive(Debug, Clone, Copy)]
pub struct LoadOptions {
    pub delimiter: u8,
    pub encoding: &'static Encoding,
}

pub fn read_table(path: &Path, options: &LoadOptions) -> Result<Table, LoadError> {
    let mut reader = io_utils::open_csv_reader_from_path(path, options.delimiter)?;
    let header_record = reader
        .byte_headers()
        .map_err(|source| LoadError::Malformed {
            path: path.to_path_buf(),
            row: 1,
            source,
        })?
        .clone();
    if header_record.is_empty() {
        return Err(LoadError::NoHeaders {
            path: path.to_path_buf(),
        });
    }
    let headers = io_utils::decode_record(&header_record, options.encoding)
        .ok_or_else(|| LoadError::Decode {
            path: path.to_path_buf(),
            row: 1,
            encoding: options.encoding.name(),
        })?
        .into_iter()
        .map(|header| header.trim().to_string())
        .collect::<Vec<_>>();

    let mut rows = Vec::new();
    let mut record = csv::ByteRecord::new();
    loop {
        let row_number = rows.len() + 2;
        let has_record =
            reader
                .read_byte_record(&mut record)
                .map_err(|source| LoadError::Malformed {
                    path: path.to_path_buf(),
                    row: row_number,
                    source,
                })?;
        if !has_record {
            break;
        }
        let decoded =
            io_utils::decode_record(&record, options.encoding).ok_or_else(|| LoadError::Decode {
                path: path.to_path_buf(),
                row: row_number,
                encoding: options.encoding.name(),
            })?;
        rows.push(decoded.iter().map(|field| Cell::parse(field)).collect());
    }

    Table::new(headers, rows)
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    path: PathBuf,
    delimiter: u8,
    encoding: &'static str,
}

static TABLE_CACHE: OnceLock<Mutex<HashMap<CacheKey, Arc<Table>>>> = OnceLock::new();

/// Reads, validates and normalizes the source once per process; later calls
/// for the same source return the cached table.
pub fn load_normalized(path: &Path, options: &LoadOptions) -> Result<Arc<Table>> {
    let key = CacheKey {
        path: path.canonicalize().unwrap_or_else(|_| path.to_path_buf()),
        delimiter: options.delimiter,
        encoding: options.encoding.name(),
    };
    let cache = TABLE_CACHE.get_or_init(|| Mutex::new(HashMap::new()));
    let mut entries = cache.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(table) = entries.get(&key) {
        debug!("Reusing cached table for {:?}", key.path);
        return Ok(Arc::clone(table));
    }

    info!(
        "Loading '{}' with delimiter '{}'",
        path.display(),
        io_utils::printable_delimiter(options.delimiter)
    );
    let raw = read_table(path, options).with_context(|| format!("Loading data from {path:?}"))?;
    raw.require_columns(REQUIRED_COLUMNS)
        .with_context(|| format!("Validating columns of {path:?}"))?;
    let table = Arc::new(normalize::normalize(raw));
    info!(
        "Loaded {} row(s) across {} column(s)",
        table.row_count(),
        table.headers().len()
    );
    entries.insert(key, Arc::clone(&table));
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoding_rs::UTF_8;
    use std::io::Write;

    fn options() -> LoadOptions {
        LoadOptions {
            delimiter: b',',
            encoding: UTF_8,
        }
    }

    #[test]
    fn new_rejects_ragged_rows_and_duplicate_headers() {
        let ragged = Table::new(
            vec!["a".into(), "b".into()],
            vec![vec![Cell::Number(1.0)]],
        );
        assert!(matches!(
            ragged,
            Err(LoadError::RaggedRow {
                row: 2,
                expected: 2,
                found: 1
            })
        ));

        let duplicate = Table::new(vec!["a".into(), "a".into()], Vec::new());
        assert!(matches!(duplicate, Err(LoadError::DuplicateColumn { .. })));
    }

    #[test]
    fn read_table_types_cells() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "Gender,ExamScore,Note").unwrap();
        writeln!(file, "0,88,\"hello, world\"").unwrap();
        writeln!(file, "Female,,x").unwrap();
        let table = read_table(file.path(), &options()).expect("read table");

        assert_eq!(table.row_count(), 2);
        assert_eq!(table.cell(0, 0), &Cell::Number(0.0));
        assert_eq!(table.cell(0, 2), &Cell::text("hello, world"));
        assert_eq!(table.cell(1, 1), &Cell::Missing);
        assert_eq!(table.column_kind(0), ColumnKind::Text);
        assert_eq!(table.column_kind(1), ColumnKind::Numeric);
    }

    #[test]
    fn read_table_reports_missing_file() {
        let err = read_table(Path::new("does/not/exist.csv"), &options()).unwrap_err();
        assert!(matches!(err, LoadError::Open { .. }));
    }

    #[test]
    fn load_normalized_requires_core_columns() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "Gender,LearningStyle,Attendance").unwrap();
        writeln!(file, "0,1,90").unwrap();
        let err = load_normalized(file.path(), &options()).unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("ExamScore"), "unexpected error: {message}");
    }

    #[test]
    fn load_normalized_returns_cached_table() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "Gender,LearningStyle,Attendance,ExamScore").unwrap();
        writeln!(file, "1,3,75,64").unwrap();
        let first = load_normalized(file.path(), &options()).expect("first load");
        let second = load_normalized(file.path(), &options()).expect("second load");
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.cell(0, 0), &Cell::text("Female"));
    }
}
