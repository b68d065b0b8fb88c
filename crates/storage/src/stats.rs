//! `NodesStatistics`/`RelsStatistics` (SPEC_FULL §4.6 **[FULL-ADD]**): one
//! atomic row-count counter per table, bumped under the catalog's coarse
//! schema-change mutex (§5) and persisted in the metadata file. A
//! `TableStatisticsRecord` WAL record carries a full-table snapshot on
//! schema commit (§6).

use gq_common::TableId;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct TableStatistics {
    counters: HashMap<TableId, AtomicU64>,
}

impl TableStatistics {
    pub fn row_count(&self, table_id: TableId) -> u64 {
        self.counters.get(&table_id).map(|c| c.load(Ordering::Acquire)).unwrap_or(0)
    }

    pub fn set_row_count(&mut self, table_id: TableId, count: u64) {
        self.counters.insert(table_id, AtomicU64::new(count));
    }

    pub fn add_rows(&self, table_id: TableId, delta: u64) {
        self.counters
            .get(&table_id)
            .unwrap_or_else(|| panic!("no statistics counter registered for table {table_id}"))
            .fetch_add(delta, Ordering::AcqRel);
    }

    pub fn register_table(&mut self, table_id: TableId) {
        self.counters.entry(table_id).or_insert_with(|| AtomicU64::new(0));
    }

    pub fn remove_table(&mut self, table_id: TableId) {
        self.counters.remove(&table_id);
    }

    /// A full-table snapshot for the `TableStatisticsRecord` WAL record.
    pub fn snapshot(&self) -> Vec<(TableId, u64)> {
        let mut rows: Vec<_> = self.counters.iter().map(|(id, c)| (*id, c.load(Ordering::Acquire))).collect();
        rows.sort_by_key(|(id, _)| *id);
        rows
    }

    pub fn restore_snapshot(&mut self, snapshot: Vec<(TableId, u64)>) {
        self.counters = snapshot.into_iter().map(|(id, count)| (id, AtomicU64::new(count))).collect();
    }
}

#[derive(Debug, Default)]
pub struct NodesStatistics(pub TableStatistics);

#[derive(Debug, Default)]
pub struct RelsStatistics(pub TableStatistics);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registered_table_starts_at_zero_and_accumulates() {
        let mut stats = NodesStatistics::default();
        stats.0.register_table(TableId(1));
        stats.0.add_rows(TableId(1), 3);
        stats.0.add_rows(TableId(1), 2);
        assert_eq!(stats.0.row_count(TableId(1)), 5);
    }

    #[test]
    fn snapshot_round_trips() {
        let mut stats = RelsStatistics::default();
        stats.0.register_table(TableId(7));
        stats.0.add_rows(TableId(7), 10);
        let snap = stats.0.snapshot();
        let mut restored = TableStatistics::default();
        restored.restore_snapshot(snap);
        assert_eq!(restored.row_count(TableId(7)), 10);
    }
}
