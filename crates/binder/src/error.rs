use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum BinderError {
    #[error("Table {0} does not exist.")]
    TableNotFound(String),
    #[error("REL GROUP {0} does not exist.")]
    RelGroupNotFound(String),
    #[error(
        "The table {0} has multiple FROM and TO pairs defined in the schema. A specific pair of FROM and TO options is expected when copying data into the {0} table."
    )]
    AmbiguousRelGroup(String),
    #[error("Table {0} does not contain column {1}.")]
    ColumnNotFound(String, String),
    #[error("Detect duplicate column name {0} during COPY.")]
    DuplicateColumnName(String),
    #[error("Copy by column is not supported for relationship table.")]
    ByColumnNotSupportedForRel,
    #[error("Copy by column with {0} file type is not supported.")]
    ByColumnRequiresNpy(String),
    #[error("Cannot cast {0} to {1}.")]
    CastNotPermitted(String, String),
    #[error("Default value for column {0} must be a constant-foldable literal.")]
    DefaultNotConstant(String),
    #[error("Index {0} does not exist on table {1}.")]
    IndexNotFound(String, String),
    #[error(transparent)]
    Catalog(#[from] gq_catalog::CatalogError),
}

pub type Result<T> = std::result::Result<T, BinderError>;
