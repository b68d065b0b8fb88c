//! Crash recovery (§4.6 "Crash recovery (on open)"): replay the WAL and
//! recover the catalog bytes belonging to the last fully-committed
//! transaction. A `CatalogRecord` with no following `CommitRecord` belongs
//! to a transaction that crashed mid-commit and is discarded; a
//! `RollbackRecord` reverts to whatever catalog was committed before it.

use crate::wal::WalRecord;

pub fn recover_catalog_bytes(records: &[WalRecord]) -> Option<Vec<u8>> {
    let mut pending: Option<Vec<u8>> = None;
    let mut committed: Option<Vec<u8>> = None;
    for record in records {
        match record {
            WalRecord::Catalog(bytes) => pending = Some(bytes.clone()),
            WalRecord::Commit { .. } => {
                if pending.is_some() {
                    committed = pending.take();
                }
            }
            WalRecord::Rollback => pending = None,
            _ => {}
        }
    }
    committed
}

#[cfg(test)]
mod tests {
    use super::*;
    use gq_common::TableId;
    use crate::wal::TableKind;

    #[test]
    fn mid_commit_crash_discards_the_uncommitted_catalog() {
        let records = vec![WalRecord::Catalog(vec![1, 2, 3])];
        assert_eq!(recover_catalog_bytes(&records), None);
    }

    #[test]
    fn committed_catalog_survives_recovery() {
        let records = vec![
            WalRecord::Catalog(vec![1, 2, 3]),
            WalRecord::Commit { tx_id: 1 },
            WalRecord::Copy {
                table_id: TableId(1),
                kind: TableKind::Node,
            },
        ];
        assert_eq!(recover_catalog_bytes(&records), Some(vec![1, 2, 3]));
    }

    #[test]
    fn rollback_after_a_catalog_record_discards_it() {
        let records = vec![
            WalRecord::Catalog(vec![9, 9, 9]),
            WalRecord::Commit { tx_id: 1 },
            WalRecord::Catalog(vec![1, 1, 1]),
            WalRecord::Rollback,
        ];
        assert_eq!(recover_catalog_bytes(&records), Some(vec![9, 9, 9]));
    }
}
