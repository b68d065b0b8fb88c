//! `StorageManager` (§4.6): ties the WAL, shadow page file, table set and
//! per-kind statistics together under a single-writer/many-reader
//! discipline. Grounded on `RelationalDB`'s `Arc<RwLock<...>>` snapshot
//! layering (`crates/core/src/db/relational_db.rs`), generalized from
//! per-row MVCC down to this spec's whole-table COPY FROM staging.
//!
//! Table row counts are derived from the staged tables at commit time
//! rather than replayed from a `TableStatisticsRecord`; only the catalog
//! is durable across restarts, since table data itself lives in memory for
//! this engine's scope (§4.6 Non-goals).

use crate::error::{Result, StorageError};
use crate::recovery::recover_catalog_bytes;
use crate::shadow::ShadowPageFile;
use crate::stats::{NodesStatistics, RelsStatistics};
use crate::table::{NodeTable, RelTable};
use crate::transaction::Transaction;
use crate::wal::{TableKind, Wal, WalRecord};
use gq_catalog::Catalog;
use gq_common::TableId;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::Read;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

const CATALOG_PAGE_ID: u64 = 0;
const METADATA_FILE_NAME: &str = "catalog.kz";
const WAL_FILE_NAME: &str = "wal.log";

pub struct StorageManager {
    wal: Wal,
    metadata_file: Mutex<File>,
    shadow: Mutex<ShadowPageFile>,
    catalog: RwLock<Catalog>,
    node_tables: RwLock<HashMap<TableId, NodeTable>>,
    rel_tables: RwLock<HashMap<TableId, RelTable>>,
    nodes_stats: Mutex<NodesStatistics>,
    rels_stats: Mutex<RelsStatistics>,
    writer_active: Mutex<bool>,
    next_tx_id: AtomicU64,
}

impl StorageManager {
    /// Opens (creating if needed) the storage directory, replaying the WAL
    /// per §4.6's crash recovery before any transaction begins.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        let wal_path = dir.join(WAL_FILE_NAME);
        let metadata_path = dir.join(METADATA_FILE_NAME);

        let records = Wal::replay(&wal_path)?;
        let wal = Wal::open(&wal_path)?;

        let mut metadata_file = OpenOptions::new().create(true).read(true).write(true).open(&metadata_path)?;

        let catalog = if let Some(bytes) = recover_catalog_bytes(&records) {
            Catalog::deserialize(&bytes)?
        } else {
            let mut bytes = Vec::new();
            metadata_file.read_to_end(&mut bytes)?;
            if bytes.is_empty() {
                Catalog::new()
            } else {
                Catalog::deserialize(&bytes)?
            }
        };

        // Recovery is complete: whatever the WAL had to say is now folded
        // into `catalog`. Start the next session from an empty log.
        wal.truncate()?;

        Ok(StorageManager {
            wal,
            metadata_file: Mutex::new(metadata_file),
            shadow: Mutex::new(ShadowPageFile::new()),
            catalog: RwLock::new(catalog),
            node_tables: RwLock::new(HashMap::new()),
            rel_tables: RwLock::new(HashMap::new()),
            nodes_stats: Mutex::new(NodesStatistics::default()),
            rels_stats: Mutex::new(RelsStatistics::default()),
            writer_active: Mutex::new(false),
            next_tx_id: AtomicU64::new(1),
        })
    }

    /// Admits at most one concurrent writer; readers never block on it.
    pub fn begin_write_transaction(&self) -> Result<Transaction> {
        let mut active = self.writer_active.lock();
        if *active {
            return Err(StorageError::WriterAlreadyActive);
        }
        *active = true;
        let catalog = self.catalog.read().clone();
        let id = self.next_tx_id.fetch_add(1, Ordering::Relaxed);
        Ok(Transaction::new(id, catalog))
    }

    pub fn with_catalog<R>(&self, f: impl FnOnce(&Catalog) -> R) -> R {
        f(&self.catalog.read())
    }

    pub fn with_node_table<R>(&self, id: TableId, f: impl FnOnce(Option<&NodeTable>) -> R) -> R {
        f(self.node_tables.read().get(&id))
    }

    pub fn with_rel_table<R>(&self, id: TableId, f: impl FnOnce(Option<&RelTable>) -> R) -> R {
        f(self.rel_tables.read().get(&id))
    }

    pub fn node_row_count(&self, table_id: TableId) -> u64 {
        self.nodes_stats.lock().0.row_count(table_id)
    }

    pub fn rel_row_count(&self, table_id: TableId) -> u64 {
        self.rels_stats.lock().0.row_count(table_id)
    }

    /// §4.6 commit protocol: stage the new catalog as a shadow page, write
    /// and `fsync` a `CatalogRecord`/`CopyRecord`s/`CommitRecord`, then
    /// `checkpointInMemory` — flush the shadow page to the metadata file
    /// and swap the staged tables and catalog into the live snapshot.
    /// Readers that start after this point see the new snapshot; readers
    /// already in flight keep working off their own `Catalog` clone.
    pub fn commit(&self, tx: Transaction) -> Result<()> {
        if !*self.writer_active.lock() {
            return Err(StorageError::NoActiveWriter);
        }
        let tx_id = tx.id;
        let (catalog, staged_node_tables, staged_rel_tables) = tx.into_staged();
        let catalog_bytes = catalog.serialize()?;

        self.shadow.lock().write_page(CATALOG_PAGE_ID, catalog_bytes.clone());

        self.wal.append(&WalRecord::Catalog(catalog_bytes))?;
        for table_id in staged_node_tables.keys() {
            self.wal.append(&WalRecord::Copy {
                table_id: *table_id,
                kind: TableKind::Node,
            })?;
        }
        for table_id in staged_rel_tables.keys() {
            self.wal.append(&WalRecord::Copy {
                table_id: *table_id,
                kind: TableKind::Rel,
            })?;
        }
        self.wal.append(&WalRecord::Commit { tx_id })?;

        self.shadow.lock().checkpoint(&mut *self.metadata_file.lock())?;

        {
            let mut nodes_stats = self.nodes_stats.lock();
            let mut node_tables = self.node_tables.write();
            for (table_id, table) in staged_node_tables {
                nodes_stats.0.register_table(table_id);
                nodes_stats.0.set_row_count(table_id, table.row_count() as u64);
                node_tables.insert(table_id, table);
            }
        }
        {
            let mut rels_stats = self.rels_stats.lock();
            let mut rel_tables = self.rel_tables.write();
            for (table_id, table) in staged_rel_tables {
                rels_stats.0.register_table(table_id);
                rels_stats.0.set_row_count(table_id, table.row_count as u64);
                rel_tables.insert(table_id, table);
            }
        }

        // The committed snapshot is now durable in the metadata file; the
        // WAL entries that led up to it no longer need to survive a crash.
        self.wal.truncate()?;

        *self.catalog.write() = catalog;
        *self.writer_active.lock() = false;
        Ok(())
    }

    /// Discards every staged table. Shadow paging means the live metadata
    /// file was never touched, so rollback has no on-disk effect.
    pub fn rollback(&self, tx: Transaction) -> Result<()> {
        if !*self.writer_active.lock() {
            return Err(StorageError::NoActiveWriter);
        }
        self.wal.append(&WalRecord::Rollback)?;
        self.shadow.lock().rollback();
        self.wal.truncate()?;
        drop(tx);
        *self.writer_active.lock() = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::ColumnStore;
    use gq_common::{LogicalType, Value};
    use gq_copy::PkIndex;
    use tempfile::tempdir;

    fn sample_node_table(table_id: TableId) -> NodeTable {
        NodeTable {
            table_id,
            column_names: vec!["id".into()],
            columns: vec![ColumnStore {
                data: vec![Value::Int64(1), Value::Int64(2)],
            }],
            pk_index: PkIndex::with_capacity(0),
        }
    }

    #[test]
    fn committed_table_is_visible_and_durable_across_reopen() {
        let dir = tempdir().unwrap();
        let manager = StorageManager::open(dir.path()).unwrap();
        let mut tx = manager.begin_write_transaction().unwrap();
        let mut catalog = tx.catalog.clone();
        let table_id = catalog
            .create_node_table(gq_catalog::CreateNodeTableInfo {
                name: "Person".into(),
                properties: vec![gq_catalog::PropertySpec::new("id", LogicalType::Int64)],
                primary_key_name: "id".into(),
            })
            .unwrap();
        tx.catalog = catalog;
        tx.stage_node_table(sample_node_table(table_id));
        manager.commit(tx).unwrap();

        assert_eq!(manager.node_row_count(table_id), 2);
        manager.with_node_table(table_id, |t| assert_eq!(t.unwrap().row_count(), 2));
        manager.with_catalog(|c| assert!(c.contains_table("Person")));

        drop(manager);
        let reopened = StorageManager::open(dir.path()).unwrap();
        reopened.with_catalog(|c| assert!(c.contains_table("Person")));
    }

    #[test]
    fn only_one_writer_may_be_active_at_a_time() {
        let dir = tempdir().unwrap();
        let manager = StorageManager::open(dir.path()).unwrap();
        let _tx = manager.begin_write_transaction().unwrap();
        assert!(matches!(
            manager.begin_write_transaction(),
            Err(StorageError::WriterAlreadyActive)
        ));
    }

    #[test]
    fn rollback_discards_staged_tables_and_frees_the_writer_slot() {
        let dir = tempdir().unwrap();
        let manager = StorageManager::open(dir.path()).unwrap();
        let mut tx = manager.begin_write_transaction().unwrap();
        tx.stage_node_table(sample_node_table(TableId(1)));
        manager.rollback(tx).unwrap();

        manager.with_node_table(TableId(1), |t| assert!(t.is_none()));
        assert!(manager.begin_write_transaction().is_ok());
    }
}
