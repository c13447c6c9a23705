//! Error types for each pipeline stage.
//!
//! Messages never embed their `#[source]`; callers render the full chain
//! with [`error_chain`].

use std::error::Error as StdError;
use std::io;

use thiserror::Error;

/// A single malformed line, before file and line context are attached.
#[derive(Debug, Error, PartialEq)]
pub enum RowError {
    #[error("expected at least {expected} columns, found {found}")]
    MissingColumns { expected: usize, found: usize },
    #[error("empty {field}")]
    EmptyField { field: &'static str },
    #[error("invalid {field} {value:?}")]
    InvalidCoordinate { field: &'static str, value: String },
}

/// Fatal failure while reading one of the GeoNames source files.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to open {file}")]
    Open {
        file: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to read {file} near line {line}")]
    Read {
        file: String,
        line: u64,
        #[source]
        source: csv::Error,
    },
    #[error("malformed line {line} in {file}")]
    Row {
        file: String,
        line: u64,
        #[source]
        source: RowError,
    },
}

impl ParseError {
    pub(crate) fn read(file: &str, source: csv::Error) -> Self {
        let line = source.position().map_or(0, |p| p.line());
        ParseError::Read {
            file: file.to_string(),
            line,
            source,
        }
    }

    pub(crate) fn row(file: &str, line: u64, source: RowError) -> Self {
        ParseError::Row {
            file: file.to_string(),
            line,
            source,
        }
    }
}

/// The produced batch is too small to be trusted.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("only {rows} rows produced, need more than {min_rows}")]
    TooFewRows { rows: usize, min_rows: usize },
}

/// Failure while registering or writing to the table store.
#[derive(Debug, Error)]
pub enum WarehouseError {
    #[error("{context}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to read catalog {path}")]
    CatalogRead {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to serialize catalog")]
    CatalogWrite(#[source] serde_json::Error),
    #[error("invalid table schema definition")]
    Schema(#[source] serde_json::Error),
    #[error("table {table} is registered with a different schema")]
    SchemaMismatch { table: String },
    #[error("namespace {0} does not exist")]
    UnknownNamespace(String),
    #[error("table {0} does not exist")]
    UnknownTable(String),
    #[error("no data for column {0}")]
    UnknownColumn(String),
    #[error("invalid partition identifier {0:?}")]
    InvalidPartition(String),
    #[error("invalid namespace or table name {0:?}")]
    InvalidName(String),
    #[error("failed to build record batch")]
    Arrow(#[from] arrow::error::ArrowError),
    #[error("failed to write parquet data")]
    Parquet(#[from] parquet::errors::ParquetError),
}

impl WarehouseError {
    pub(crate) fn io(context: impl Into<String>, source: io::Error) -> Self {
        WarehouseError::Io {
            context: context.into(),
            source,
        }
    }
}

/// Any failure of a full run, grouped by how it is reported.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Warehouse(#[from] WarehouseError),
}

/// Render an error and all of its sources as `outer: inner: root`.
pub fn error_chain(err: &(dyn StdError + 'static)) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        out.push_str(": ");
        out.push_str(&cause.to_string());
        source = cause.source();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_chain_includes_row_detail() {
        let err = ParseError::row(
            "cities1000.txt",
            12,
            RowError::InvalidCoordinate {
                field: "latitude",
                value: "north".to_string(),
            },
        );
        assert_eq!(
            error_chain(&err),
            "malformed line 12 in cities1000.txt: invalid latitude \"north\""
        );
    }

    #[test]
    fn test_transparent_run_error_keeps_chain() {
        let err = RunError::from(WarehouseError::io(
            "failed to create /data",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        ));
        assert_eq!(error_chain(&err), "failed to create /data: denied");
    }
}
