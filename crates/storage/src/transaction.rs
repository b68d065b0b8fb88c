//! A single-writer transaction (§4.6, §5): holds the writer's own clone of
//! the catalog (read-copy-update per §5 — clone, mutate, install on
//! commit) plus any tables staged by a COPY FROM during this transaction.
//! Generalizes `TxState`'s insert-table overlay from per-row
//! insert/delete tracking to whole-table COPY FROM staging, the only
//! data-mutation path in scope here.

use crate::table::{NodeTable, RelTable};
use gq_catalog::Catalog;
use gq_common::TableId;
use std::collections::HashMap;

pub struct Transaction {
    pub id: u64,
    pub catalog: Catalog,
    staged_node_tables: HashMap<TableId, NodeTable>,
    staged_rel_tables: HashMap<TableId, RelTable>,
}

impl Transaction {
    pub fn new(id: u64, catalog: Catalog) -> Self {
        Transaction {
            id,
            catalog,
            staged_node_tables: HashMap::new(),
            staged_rel_tables: HashMap::new(),
        }
    }

    pub fn stage_node_table(&mut self, table: NodeTable) {
        self.staged_node_tables.insert(table.table_id, table);
    }

    pub fn stage_rel_table(&mut self, table: RelTable) {
        self.staged_rel_tables.insert(table.table_id, table);
    }

    pub fn staged_node_table(&self, table_id: TableId) -> Option<&NodeTable> {
        self.staged_node_tables.get(&table_id)
    }

    pub fn staged_rel_table(&self, table_id: TableId) -> Option<&RelTable> {
        self.staged_rel_tables.get(&table_id)
    }

    pub fn is_empty(&self) -> bool {
        self.staged_node_tables.is_empty() && self.staged_rel_tables.is_empty()
    }

    /// Consumes the transaction, handing its staged tables to the caller
    /// (the storage manager, at commit time).
    pub fn into_staged(self) -> (Catalog, HashMap<TableId, NodeTable>, HashMap<TableId, RelTable>) {
        (self.catalog, self.staged_node_tables, self.staged_rel_tables)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::ColumnStore;
    use gq_copy::PkIndex;

    #[test]
    fn staged_tables_are_retrievable_before_commit() {
        let tx = Transaction::new(1, Catalog::default());
        assert!(tx.is_empty());
        let mut tx = tx;
        tx.stage_node_table(NodeTable {
            table_id: TableId(1),
            column_names: vec!["id".into()],
            columns: vec![ColumnStore::default()],
            pk_index: PkIndex::with_capacity(0),
        });
        assert!(!tx.is_empty());
        assert!(tx.staged_node_table(TableId(1)).is_some());
    }
}
