//! Primary-key index: a hash index mapping a PK value to the owning
//! table's internal offset, grounded on `HashIndex` — same `IndexMap`-backed
//! unique lookup, generalized from a single `RowId` to an `InternalOffset`
//! and from `AlgebraicValue` to this crate's primary-key-compatible subset
//! of `Value` (`LogicalType::is_primary_key_compatible()` permits only
//! `INT64`/`SERIAL`/`STRING`, so the key wrapper only needs to cover those).

use gq_common::{InternalOffset, Value};
use indexmap::IndexMap;
use std::hash::{Hash, Hasher};

#[derive(Debug, Clone, PartialEq)]
pub struct PkKey(Value);

impl PkKey {
    pub fn new(value: Value) -> Option<Self> {
        match value {
            Value::Int64(_) | Value::String(_) => Some(PkKey(value)),
            _ => None,
        }
    }
}

impl Eq for PkKey {}

impl Hash for PkKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match &self.0 {
            Value::Int64(v) => v.hash(state),
            Value::String(v) => v.hash(state),
            _ => unreachable!("PkKey::new only admits Int64/String"),
        }
    }
}

impl std::fmt::Display for PkKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Sized to the expected row count at construction (§4.5 step 2); internal
/// locking is modeled by requiring `&mut self` at every mutating call site —
/// callers serialize batch-populate tasks' index writes behind one lock.
#[derive(Debug, Default, Clone)]
pub struct PkIndex {
    entries: IndexMap<PkKey, InternalOffset>,
}

impl PkIndex {
    pub fn with_capacity(capacity: usize) -> Self {
        PkIndex {
            entries: IndexMap::with_capacity(capacity),
        }
    }

    /// Inserts `key -> offset`; returns the conflicting offset if `key` is
    /// already present (caller raises "PK value X violates uniqueness").
    pub fn try_insert(&mut self, key: PkKey, offset: InternalOffset) -> Result<(), InternalOffset> {
        if let Some(existing) = self.entries.get(&key) {
            return Err(*existing);
        }
        self.entries.insert(key, offset);
        Ok(())
    }

    pub fn lookup(&self, key: &PkKey) -> Option<InternalOffset> {
        self.entries.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_keys_round_trip_to_their_offset() {
        let mut idx = PkIndex::with_capacity(4);
        idx.try_insert(PkKey::new(Value::Int64(1)).unwrap(), InternalOffset(0)).unwrap();
        idx.try_insert(PkKey::new(Value::Int64(2)).unwrap(), InternalOffset(1)).unwrap();
        assert_eq!(idx.lookup(&PkKey::new(Value::Int64(2)).unwrap()), Some(InternalOffset(1)));
        assert_eq!(idx.len(), 2);
    }

    #[test]
    fn duplicate_key_reports_the_conflicting_offset() {
        let mut idx = PkIndex::with_capacity(4);
        idx.try_insert(PkKey::new(Value::Int64(1)).unwrap(), InternalOffset(0)).unwrap();
        let err = idx.try_insert(PkKey::new(Value::Int64(1)).unwrap(), InternalOffset(5)).unwrap_err();
        assert_eq!(err, InternalOffset(0));
    }

    #[test]
    fn string_keys_are_supported() {
        let mut idx = PkIndex::with_capacity(2);
        idx.try_insert(PkKey::new(Value::String("a".into())).unwrap(), InternalOffset(0)).unwrap();
        assert!(idx.lookup(&PkKey::new(Value::String("a".into())).unwrap()).is_some());
    }
}
