//! Dense identifiers used throughout the catalog and storage layers.
//!
//! All ids are newtypes over an integer so that a `TableId` can never be
//! confused with a `PropertyId` at the type level, mirroring the
//! `spacetimedb_primitives::{TableId, ColId}` newtype pattern.

use derive_more::{Display, From, Into};

/// Unique for the lifetime of a database; never reused after a table is dropped.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, From, Into)]
pub struct TableId(pub u64);

/// Dense, table-local identifier for a property definition.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, From, Into)]
pub struct PropertyId(pub u64);

/// Dense, table-local identifier for a materialized column.
///
/// May differ from the `PropertyId` of the same property: SERIAL properties
/// are not materialized, and a relationship table reserves column 0 for the
/// neighbor id.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, From, Into)]
pub struct ColumnId(pub u64);

/// Unique per owning table.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, From, Into)]
pub struct IndexId(pub u64);

/// Dense row id within a table, stable within a transaction.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, From, Into)]
pub struct InternalOffset(pub u64);

impl TableId {
    pub const INVALID: TableId = TableId(u64::MAX);
}

impl PropertyId {
    pub fn next(self) -> Self {
        PropertyId(self.0 + 1)
    }
}

impl ColumnId {
    pub fn next(self) -> Self {
        ColumnId(self.0 + 1)
    }
}

impl InternalOffset {
    pub fn next(self) -> Self {
        InternalOffset(self.0 + 1)
    }
}
