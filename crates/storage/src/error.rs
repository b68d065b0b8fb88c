//! `StorageError`/`RuntimeError` (§7): storage, IO, and on-disk-invariant
//! failures. Unlike `BinderError`/`CopyError`, a `StorageError` marks the
//! database read-only for the session and requires reopening (§7
//! propagation policy).

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("write error: {0}")]
    Write(String),

    #[error("storage version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u64, found: u64 },

    #[error("{0} is not a Kuzu directory")]
    NotAKuzuDirectory(String),

    #[error("no read-write transaction is active")]
    NoActiveWriter,

    #[error("a read-write transaction is already active")]
    WriterAlreadyActive,

    #[error("catalog error: {0}")]
    Catalog(#[from] gq_catalog::CatalogError),

    #[error("copy error: {0}")]
    Copy(#[from] gq_copy::CopyError),

    #[error("io error: {0}")]
    Io(String),
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        StorageError::Io(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, StorageError>;
