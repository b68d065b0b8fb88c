//! Write-ahead log (§4.6, §6): one tagged record per entry, framed by a
//! `u32` length, appended and `fsync`'d — grounded on `CommitLog`'s
//! `mlog`/`append_commit_bytes` (an `Arc<Mutex<File>>` wrapped for shared
//! append access, generalized from `CommitLog`'s single `Commit` record
//! kind to this spec's five WAL record kinds).

use crate::error::{Result, StorageError};
use gq_common::TableId;
use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    Node,
    Rel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalRecord {
    Commit { tx_id: u64 },
    Copy { table_id: TableId, kind: TableKind },
    TableStatistics { table_kind: TableKind },
    Catalog(Vec<u8>),
    Rollback,
}

impl WalRecord {
    fn tag(&self) -> u8 {
        match self {
            WalRecord::Commit { .. } => 0,
            WalRecord::Copy { .. } => 1,
            WalRecord::TableStatistics { .. } => 2,
            WalRecord::Catalog(_) => 3,
            WalRecord::Rollback => 4,
        }
    }

    fn encode_body(&self) -> Vec<u8> {
        let mut body = vec![self.tag()];
        match self {
            WalRecord::Commit { tx_id } => body.extend_from_slice(&tx_id.to_le_bytes()),
            WalRecord::Copy { table_id, kind } => {
                body.extend_from_slice(&table_id.0.to_le_bytes());
                body.push(encode_table_kind(*kind));
            }
            WalRecord::TableStatistics { table_kind } => body.push(encode_table_kind(*table_kind)),
            WalRecord::Catalog(bytes) => {
                body.extend_from_slice(&(bytes.len() as u64).to_le_bytes());
                body.extend_from_slice(bytes);
            }
            WalRecord::Rollback => {}
        }
        body
    }

    fn decode(body: &[u8]) -> Result<Self> {
        let tag = *body.first().ok_or_else(|| StorageError::Write("empty WAL record".to_string()))?;
        let rest = &body[1..];
        match tag {
            0 => {
                let tx_id = u64::from_le_bytes(rest[0..8].try_into().unwrap());
                Ok(WalRecord::Commit { tx_id })
            }
            1 => {
                let table_id = TableId(u64::from_le_bytes(rest[0..8].try_into().unwrap()));
                let kind = decode_table_kind(rest[8])?;
                Ok(WalRecord::Copy { table_id, kind })
            }
            2 => Ok(WalRecord::TableStatistics {
                table_kind: decode_table_kind(rest[0])?,
            }),
            3 => {
                let len = u64::from_le_bytes(rest[0..8].try_into().unwrap()) as usize;
                Ok(WalRecord::Catalog(rest[8..8 + len].to_vec()))
            }
            4 => Ok(WalRecord::Rollback),
            other => Err(StorageError::Write(format!("unknown WAL record tag {other}"))),
        }
    }
}

fn encode_table_kind(kind: TableKind) -> u8 {
    match kind {
        TableKind::Node => 0,
        TableKind::Rel => 1,
    }
}

fn decode_table_kind(byte: u8) -> Result<TableKind> {
    match byte {
        0 => Ok(TableKind::Node),
        1 => Ok(TableKind::Rel),
        other => Err(StorageError::Write(format!("unknown table kind tag {other}"))),
    }
}

/// Shared append-only handle onto the WAL file, mirroring `CommitLog`'s
/// `Arc<Mutex<MessageLog>>`.
#[derive(Clone)]
pub struct Wal {
    file: Arc<Mutex<File>>,
}

impl Wal {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = OpenOptions::new().create(true).append(true).read(true).open(path)?;
        Ok(Wal { file: Arc::new(Mutex::new(file)) })
    }

    pub fn append(&self, record: &WalRecord) -> Result<()> {
        let body = record.encode_body();
        let checksum = crc32c::crc32c(&body);
        let mut file = self.file.lock().unwrap();
        file.write_all(&(body.len() as u32).to_le_bytes())?;
        file.write_all(&body)?;
        file.write_all(&checksum.to_le_bytes())?;
        file.sync_data()?;
        Ok(())
    }

    /// Reads every framed record currently in the file, in order. A frame
    /// whose checksum doesn't match is treated as a torn write at the tail
    /// of the log and replay stops there, same as the rest of the log
    /// being absent.
    pub fn replay(path: impl AsRef<Path>) -> Result<Vec<WalRecord>> {
        let mut file = match File::open(path) {
            Ok(f) => f,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)?;

        let mut records = Vec::new();
        let mut cursor = 0usize;
        while cursor + 4 <= bytes.len() {
            let len = u32::from_le_bytes(bytes[cursor..cursor + 4].try_into().unwrap()) as usize;
            cursor += 4;
            if cursor + len + 4 > bytes.len() {
                break;
            }
            let body = &bytes[cursor..cursor + len];
            let stored_checksum = u32::from_le_bytes(bytes[cursor + len..cursor + len + 4].try_into().unwrap());
            if crc32c::crc32c(body) != stored_checksum {
                break;
            }
            records.push(WalRecord::decode(body)?);
            cursor += len + 4;
        }
        Ok(records)
    }

    pub fn truncate(&self) -> Result<()> {
        let file = self.file.lock().unwrap();
        file.set_len(0)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn appended_records_replay_in_order() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("wal.log");
        let wal = Wal::open(&path).unwrap();
        wal.append(&WalRecord::Copy {
            table_id: TableId(1),
            kind: TableKind::Node,
        })
        .unwrap();
        wal.append(&WalRecord::Commit { tx_id: 42 }).unwrap();

        let replayed = Wal::replay(&path).unwrap();
        assert_eq!(
            replayed,
            vec![
                WalRecord::Copy {
                    table_id: TableId(1),
                    kind: TableKind::Node
                },
                WalRecord::Commit { tx_id: 42 },
            ]
        );
    }

    #[test]
    fn missing_wal_file_replays_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing.log");
        assert_eq!(Wal::replay(&path).unwrap(), Vec::new());
    }

    #[test]
    fn truncate_empties_the_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("wal.log");
        let wal = Wal::open(&path).unwrap();
        wal.append(&WalRecord::Rollback).unwrap();
        wal.truncate().unwrap();
        assert_eq!(Wal::replay(&path).unwrap(), Vec::new());
    }
}
