//! The system catalog: schema storage, lookup and the wire format it
//! persists to (§4.1, §6).

pub mod catalog;
pub mod entry;
pub mod error;
pub mod serde_format;

pub use catalog::{
    Catalog, CreateIndexInfo, CreateNodeTableInfo, CreateRelGroupInfo, CreateRelTableInfo, PropertySpec, TableEntryRef,
};
pub use entry::{
    CatalogEntryType, IndexCatalogEntry, IndexKind, MacroCatalogEntry, NodeTableCatalogEntry, PropertyDefinition,
    RelGroupCatalogEntry, RelTableCatalogEntry,
};
pub use error::{CatalogError, Result};
