use gq_common::TableId;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CatalogError {
    #[error("Table {0} already exists.")]
    TableExists(String),
    #[error("Table {0} does not exist.")]
    TableNotFound(String),
    #[error("Index {0} already exists.")]
    IndexExists(String),
    #[error("Index {0} does not exist.")]
    IndexNotFound(String),
    #[error("Column {0} already exists.")]
    ColumnExists(String),
    #[error("Column {0} does not exist.")]
    ColumnNotFound(String),
    #[error("REL GROUP {0} does not exist.")]
    RelGroupNotFound(String),
    #[error("Cannot drop node table {0} while rel table(s) {1:?} still reference it.")]
    NodeTableReferenced(String, Vec<TableId>),
    #[error("Catalog file has invalid magic bytes.")]
    BadMagic,
    #[error("Storage version mismatch: expected {expected}, found {found}.")]
    VersionMismatch { expected: u64, found: u64 },
    #[error("I/O error while (de)serializing catalog: {0}")]
    Io(String),
}

pub type Result<T> = std::result::Result<T, CatalogError>;
