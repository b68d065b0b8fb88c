//! `ValueVector` (§4.4): a batch column. The original engine backs this
//! with a fixed-width payload buffer plus an overflow arena for
//! variable-length types; here the payload is simply a `Vec<Value>` — the
//! evaluator has no disk/mmap layer to stay byte-compatible with, so the
//! logical `Value` already *is* the in-memory representation. What's kept
//! faithful is the contract: flat-vs-unflat, the null mask, and the shared
//! selection vector.

use gq_common::{LogicalType, Value};

#[derive(Debug, Clone)]
pub struct ValueVector {
    logical_type: LogicalType,
    data: Vec<Value>,
    null_mask: Vec<bool>,
    /// A flat vector is logically length-1 and broadcasts to every selected
    /// position; an unflat vector has one slot per selected position.
    flat: bool,
}

impl ValueVector {
    pub fn new_unflat(logical_type: LogicalType, capacity: usize) -> Self {
        ValueVector {
            data: vec![Value::Null(logical_type.clone()); capacity],
            null_mask: vec![true; capacity],
            logical_type,
            flat: false,
        }
    }

    pub fn new_flat(value: Value) -> Self {
        let logical_type = value.logical_type();
        let is_null = value.is_null();
        ValueVector {
            data: vec![value],
            null_mask: vec![is_null],
            logical_type,
            flat: true,
        }
    }

    pub fn logical_type(&self) -> &LogicalType {
        &self.logical_type
    }

    pub fn is_flat(&self) -> bool {
        self.flat
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn resolve(&self, pos: usize) -> usize {
        if self.flat {
            0
        } else {
            pos
        }
    }

    pub fn get_value(&self, pos: usize) -> &Value {
        &self.data[self.resolve(pos)]
    }

    pub fn set_value(&mut self, pos: usize, value: Value) {
        let resolved = self.resolve(pos);
        self.null_mask[resolved] = value.is_null();
        self.data[resolved] = value;
    }

    pub fn set_null(&mut self, pos: usize, is_null: bool) {
        let resolved = self.resolve(pos);
        self.null_mask[resolved] = is_null;
        if is_null {
            self.data[resolved] = Value::Null(self.logical_type.clone());
        }
    }

    pub fn is_null(&self, pos: usize) -> bool {
        self.null_mask[self.resolve(pos)]
    }

    pub fn get_bool(&self, pos: usize) -> bool {
        matches!(self.get_value(pos), Value::Bool(true))
    }

    /// Deep-copies `src`'s value at `src_pos` into `self` at `dst_pos`; the
    /// `Value` payload is immutable/owned so this is a plain clone, but the
    /// call site (case/pattern evaluators) always goes through here rather
    /// than indexing `data` directly, matching the original's
    /// `copyFromVectorData` seam.
    pub fn copy_from_vector_data(&mut self, dst_pos: usize, src: &ValueVector, src_pos: usize) {
        let value = src.get_value(src_pos).clone();
        self.set_value(dst_pos, value);
    }

    /// No-op here: the `Vec<Value>` payload owns its data outright, so
    /// there is no shared arena to reclaim between batches.
    pub fn reset_auxiliary_buffer(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_vector_broadcasts_every_position() {
        let v = ValueVector::new_flat(Value::Int64(7));
        assert!(v.is_flat());
        assert_eq!(v.get_value(0), &Value::Int64(7));
        assert_eq!(v.get_value(41), &Value::Int64(7));
    }

    #[test]
    fn unflat_vector_tracks_per_position_nulls() {
        let mut v = ValueVector::new_unflat(LogicalType::Int64, 3);
        v.set_value(0, Value::Int64(1));
        v.set_null(1, true);
        v.set_value(2, Value::Int64(3));
        assert!(!v.is_null(0));
        assert!(v.is_null(1));
        assert!(!v.is_null(2));
    }
}
