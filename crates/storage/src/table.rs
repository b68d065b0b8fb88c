//! Physical table storage (§4.6): a `NodeTable` owns one `PrimaryKeyIndex`
//! and N column stores; a `RelTable` owns two directed data containers
//! (fwd/bwd), each either a column store (single-multiplicity) or a CSR
//! list store (multi-multiplicity) — reusing `gq_copy::DirectionData`
//! directly rather than redefining an equivalent shape.

use gq_common::{TableId, Value};
use gq_copy::{DirectionData, NodeCopyResult, PkIndex, RelCopyResult};

#[derive(Debug, Clone, Default)]
pub struct ColumnStore {
    pub data: Vec<Value>,
}

impl ColumnStore {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn get(&self, offset: usize) -> Option<&Value> {
        self.data.get(offset)
    }
}

pub struct NodeTable {
    pub table_id: TableId,
    pub column_names: Vec<String>,
    pub columns: Vec<ColumnStore>,
    pub pk_index: PkIndex,
}

impl NodeTable {
    pub fn empty(table_id: TableId, column_names: Vec<String>) -> Self {
        let columns = column_names.iter().map(|_| ColumnStore::default()).collect();
        NodeTable {
            table_id,
            column_names,
            columns,
            pk_index: PkIndex::with_capacity(0),
        }
    }

    pub fn from_copy_result(table_id: TableId, result: NodeCopyResult) -> Self {
        let columns = result.columns.into_iter().map(|data| ColumnStore { data }).collect();
        NodeTable {
            table_id,
            column_names: result.column_names,
            columns,
            pk_index: result.pk_index,
        }
    }

    pub fn row_count(&self) -> usize {
        self.columns.first().map(ColumnStore::len).unwrap_or(0)
    }

    pub fn column(&self, name: &str) -> Option<&ColumnStore> {
        let idx = self.column_names.iter().position(|n| n == name)?;
        self.columns.get(idx)
    }
}

pub struct RelTable {
    pub table_id: TableId,
    pub fwd: DirectionData,
    pub bwd: DirectionData,
    pub property_names: Vec<String>,
    pub properties: Vec<ColumnStore>,
    pub row_count: usize,
}

impl RelTable {
    pub fn from_copy_result(table_id: TableId, result: RelCopyResult) -> Self {
        RelTable {
            table_id,
            fwd: result.fwd,
            bwd: result.bwd,
            property_names: result.property_names,
            properties: result.properties.into_iter().map(|data| ColumnStore { data }).collect(),
            row_count: result.row_count,
        }
    }

    /// Number of neighbors of `node_offset` in the given direction.
    pub fn degree(direction: &DirectionData, node_offset: usize) -> usize {
        match direction {
            DirectionData::Single(slots) => slots.get(node_offset).map(|s| s.is_some() as usize).unwrap_or(0),
            DirectionData::Multi { offsets, .. } => {
                if node_offset + 1 >= offsets.len() {
                    0
                } else {
                    (offsets[node_offset + 1] - offsets[node_offset]) as usize
                }
            }
        }
    }
}

pub enum Table {
    Node(NodeTable),
    Rel(RelTable),
}

impl Table {
    pub fn table_id(&self) -> TableId {
        match self {
            Table::Node(t) => t.table_id,
            Table::Rel(t) => t.table_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gq_common::{InternalOffset, LogicalType};
    use gq_copy::{copy_node_from, ColumnSource, ColumnSpec};

    #[test]
    fn node_table_built_from_a_copy_result_exposes_columns_by_name() {
        let specs = vec![ColumnSpec {
            name: "id".into(),
            logical_type: LogicalType::Int64,
            source: ColumnSource::Field(0),
            is_primary_key: true,
        }];
        let rows = vec![csv::StringRecord::from(vec!["1"]), csv::StringRecord::from(vec!["2"])];
        let result = copy_node_from(&rows, &specs, "in.csv").unwrap();
        let table = NodeTable::from_copy_result(TableId(1), result);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.column("id").unwrap().get(1), Some(&Value::Int64(2)));
    }

    #[test]
    fn degree_counts_single_and_multi_multiplicity_directions() {
        let single = DirectionData::Single(vec![Some(InternalOffset(0)), None]);
        assert_eq!(RelTable::degree(&single, 0), 1);
        assert_eq!(RelTable::degree(&single, 1), 0);

        let multi = DirectionData::Multi {
            offsets: vec![0, 2, 3],
            neighbors: vec![InternalOffset(0), InternalOffset(1), InternalOffset(0)],
            csr_row_order: vec![0, 1, 2],
        };
        assert_eq!(RelTable::degree(&multi, 0), 2);
        assert_eq!(RelTable::degree(&multi, 1), 1);
    }
}
