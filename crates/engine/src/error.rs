//! Top-level error type (§7), aggregating every sub-crate's error the way
//! `spacetimedb-core::error::DBError` wraps its subsystem errors behind one
//! enum the host surfaces to callers.

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("bind error: {0}")]
    Bind(#[from] gq_binder::BinderError),

    #[error("catalog error: {0}")]
    Catalog(#[from] gq_catalog::CatalogError),

    #[error("copy error: {0}")]
    Copy(#[from] gq_copy::CopyError),

    #[error("storage error: {0}")]
    Storage(#[from] gq_storage::StorageError),

    #[error("vector index error: {0}")]
    VectorIndex(#[from] gq_vector_index::VectorIndexError),

    #[error("column {0} is bound to an expression copy execution cannot resolve to a field or a constant")]
    UnresolvableColumn(String),

    #[error("COPY FROM target {0} is a relationship table but no rel-copy plan information was bound")]
    MissingRelCopyInfo(String),

    #[error("table {0} has no committed data to copy relationships against")]
    EndpointTableNotStaged(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
