//! Storage manager (§4.6): the table set, write-ahead log, shadow paging
//! and the single-writer/many-reader transaction discipline built on top
//! of them.

pub mod error;
pub mod manager;
pub mod recovery;
pub mod shadow;
pub mod stats;
pub mod table;
pub mod transaction;
pub mod wal;

pub use error::{Result, StorageError};
pub use manager::StorageManager;
pub use recovery::recover_catalog_bytes;
pub use shadow::{ShadowPageFile, PAGE_SIZE};
pub use stats::{NodesStatistics, RelsStatistics, TableStatistics};
pub use table::{ColumnStore, NodeTable, RelTable, Table};
pub use transaction::Transaction;
pub use wal::{TableKind, Wal, WalRecord};
