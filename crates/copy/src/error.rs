//! Ingest rule violations (§4.5, §7 `CopyError`). Every variant here aborts
//! the copy's transaction; there is no "lax" skip-and-continue mode.

use gq_common::TableId;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CopyError {
    #[error("PK value {0} violates uniqueness")]
    PkDuplicate(String),

    #[error("NULL around L{line} in file {file} violates the non-null constraint of the primary key column")]
    PkNull { file: String, line: usize },

    #[error("RelTable {table_id} is single-multiplicity but node {offset} has more than one neighbour in direction {direction}")]
    SingleMultiplicityViolation {
        table_id: TableId,
        offset: u64,
        direction: Direction,
    },

    #[error("key {0} not found in the primary key index of table {1}")]
    UnknownEndpointKey(String, TableId),

    #[error("field parse error at line {line}, column {column}: {message}")]
    FieldParseError { line: usize, column: usize, message: String },

    #[error("{0}")]
    Io(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Fwd,
    Bwd,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Fwd => write!(f, "FWD"),
            Direction::Bwd => write!(f, "BWD"),
        }
    }
}

impl From<csv::Error> for CopyError {
    fn from(err: csv::Error) -> Self {
        CopyError::Io(err.to_string())
    }
}

impl From<std::io::Error> for CopyError {
    fn from(err: std::io::Error) -> Self {
        CopyError::Io(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CopyError>;
