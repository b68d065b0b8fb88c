//! `VectorIndexError` (§7): HNSW-specific binder/runtime failures.

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum VectorIndexError {
    #[error("column {0} is not a FIXED_LIST<FLOAT|DOUBLE>, cannot build an HNSW index over it")]
    UnsupportedColumnType(String),

    #[error("vector of dimension {found} does not match index dimension {expected}")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("Index {0} does not exist.")]
    IndexNotFound(String),

    #[error("Table {0} does not exist.")]
    TableNotFound(String),

    #[error("catalog error: {0}")]
    Catalog(#[from] gq_catalog::CatalogError),
}

pub type Result<T> = std::result::Result<T, VectorIndexError>;
