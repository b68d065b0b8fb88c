//! A data chunk (§3 vector batch): a rectangular batch of value vectors
//! sharing one selection vector, plus the `ResultSet` that groups the
//! chunks a plan currently has materialized.

use crate::selection::SelectionVector;
use crate::vector::ValueVector;
use gq_common::{LogicalType, Value};

#[derive(Debug, Clone)]
pub struct DataChunk {
    pub vectors: Vec<ValueVector>,
    pub selection: SelectionVector,
}

impl DataChunk {
    pub fn new(vectors: Vec<ValueVector>, selection: SelectionVector) -> Self {
        DataChunk { vectors, selection }
    }

    pub fn num_selected(&self) -> usize {
        self.selection.selected_size()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    pub chunks: Vec<DataChunk>,
}

impl ResultSet {
    pub fn new(chunks: Vec<DataChunk>) -> Self {
        ResultSet { chunks }
    }
}

/// Builds a `DataChunk` column-by-column without a physical scan operator,
/// for the evaluator's own test suite (the scan/plan operators are out of scope).
#[derive(Default)]
pub struct DataChunkBuilder {
    columns: Vec<(LogicalType, Vec<Value>)>,
}

impl DataChunkBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_column(mut self, logical_type: LogicalType, values: Vec<Value>) -> Self {
        self.columns.push((logical_type, values));
        self
    }

    pub fn build(self) -> DataChunk {
        let len = self.columns.first().map(|(_, v)| v.len()).unwrap_or(0);
        let vectors = self
            .columns
            .into_iter()
            .map(|(ty, values)| {
                let mut vec = ValueVector::new_unflat(ty, values.len());
                for (i, v) in values.into_iter().enumerate() {
                    vec.set_value(i, v);
                }
                vec
            })
            .collect();
        DataChunk::new(vectors, SelectionVector::identity(len))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_produces_chunk_with_identity_selection() {
        let chunk = DataChunkBuilder::new()
            .add_column(LogicalType::Int64, vec![Value::Int64(1), Value::Int64(2)])
            .build();
        assert_eq!(chunk.num_selected(), 2);
        assert_eq!(chunk.vectors[0].get_value(1), &Value::Int64(2));
    }
}
