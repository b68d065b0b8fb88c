//! Node copy (§4.5 "Node copy" steps 1-4): one in-memory column per
//! non-SERIAL property plus a primary-key index builder, populated by
//! parallel batch-populate tasks over the blocks planned in `block.rs`.

use crate::block::{plan_blocks, Block, DEFAULT_BLOCK_SIZE};
use crate::error::{CopyError, Result};
use crate::pk_index::{PkIndex, PkKey};
use gq_common::{InternalOffset, LogicalType, Value};
use rayon::prelude::*;

/// Where a destination column's value comes from for a given input row:
/// a field in the source record, or a constant (a property's DEFAULT, or a
/// REFERENCE column bound to something other than a raw source field).
/// Mirrors the binder's `ColumnEvaluateType`, but `gq-copy` is executed
/// against an already-resolved plan rather than depending on `gq-binder`.
#[derive(Debug, Clone)]
pub enum ColumnSource {
    Field(usize),
    Constant(Value),
}

#[derive(Debug, Clone)]
pub struct ColumnSpec {
    pub name: String,
    pub logical_type: LogicalType,
    pub source: ColumnSource,
    pub is_primary_key: bool,
}

pub struct NodeCopyResult {
    pub column_names: Vec<String>,
    pub columns: Vec<Vec<Value>>,
    pub pk_index: PkIndex,
    pub row_count: usize,
}

pub(crate) fn parse_field(raw: &str, logical_type: &LogicalType, line: usize, column: usize) -> Result<Value> {
    if raw.is_empty() {
        return Ok(Value::Null(logical_type.clone()));
    }
    let value = match logical_type {
        LogicalType::Int64 | LogicalType::Serial => Value::Int64(raw.parse().map_err(|_| CopyError::FieldParseError {
            line,
            column,
            message: format!("'{raw}' is not a valid INT64"),
        })?),
        LogicalType::Int32 => Value::Int32(raw.parse().map_err(|_| CopyError::FieldParseError {
            line,
            column,
            message: format!("'{raw}' is not a valid INT32"),
        })?),
        LogicalType::Int16 => Value::Int16(raw.parse().map_err(|_| CopyError::FieldParseError {
            line,
            column,
            message: format!("'{raw}' is not a valid INT16"),
        })?),
        LogicalType::Double => Value::Double(raw.parse().map_err(|_| CopyError::FieldParseError {
            line,
            column,
            message: format!("'{raw}' is not a valid DOUBLE"),
        })?),
        LogicalType::Float => Value::Float(raw.parse().map_err(|_| CopyError::FieldParseError {
            line,
            column,
            message: format!("'{raw}' is not a valid FLOAT"),
        })?),
        LogicalType::Bool => Value::Bool(raw.parse().map_err(|_| CopyError::FieldParseError {
            line,
            column,
            message: format!("'{raw}' is not a valid BOOL"),
        })?),
        LogicalType::String => Value::String(raw.to_string()),
        _ => Value::String(raw.to_string()),
    };
    Ok(value)
}

struct BlockResult {
    start_row: usize,
    columns: Vec<Vec<Value>>,
    pk_values: Vec<(usize, PkKey)>,
}

fn populate_block(
    block: Block,
    rows: &[csv::StringRecord],
    specs: &[ColumnSpec],
    pk_column_index: usize,
    file_name: &str,
) -> Result<BlockResult> {
    let mut columns: Vec<Vec<Value>> = specs.iter().map(|_| Vec::with_capacity(block.row_count)).collect();
    let mut pk_values = Vec::with_capacity(block.row_count);

    for local_row in 0..block.row_count {
        let global_row = block.start_row + local_row;
        let record = &rows[global_row];
        for (col_idx, spec) in specs.iter().enumerate() {
            let value = match &spec.source {
                ColumnSource::Field(field_idx) => {
                    let raw = record.get(*field_idx).unwrap_or("");
                    parse_field(raw, &spec.logical_type, global_row, *field_idx)?
                }
                ColumnSource::Constant(v) => v.clone(),
            };
            if col_idx == pk_column_index && value.is_null() {
                return Err(CopyError::PkNull {
                    file: file_name.to_string(),
                    line: global_row,
                });
            }
            columns[col_idx].push(value);
        }
        let pk_value = columns[pk_column_index][local_row].clone();
        let key = PkKey::new(pk_value).expect("primary key columns are always PK-compatible");
        pk_values.push((local_row, key));
    }

    Ok(BlockResult {
        start_row: block.start_row,
        columns,
        pk_values,
    })
}

/// Parses `rows` into typed columns per `specs`, builds the primary-key
/// index, and reports the first uniqueness violation encountered (the
/// original aborts the whole copy on the first per-row `CopyException`).
pub fn copy_node_from(rows: &[csv::StringRecord], specs: &[ColumnSpec], file_name: &str) -> Result<NodeCopyResult> {
    let pk_column_index = specs
        .iter()
        .position(|s| s.is_primary_key)
        .expect("node copy plan always designates a primary-key column");

    let blocks = plan_blocks(rows.len(), DEFAULT_BLOCK_SIZE);
    let block_results: Result<Vec<BlockResult>> = blocks
        .into_par_iter()
        .map(|block| populate_block(block, rows, specs, pk_column_index, file_name))
        .collect();
    let mut block_results = block_results?;
    block_results.sort_by_key(|b| b.start_row);

    let mut columns: Vec<Vec<Value>> = specs.iter().map(|_| Vec::with_capacity(rows.len())).collect();
    let mut pk_index = PkIndex::with_capacity(rows.len());
    let mut row_count = 0usize;

    for block in block_results {
        for (col_idx, column) in columns.iter_mut().enumerate() {
            column.extend(block.columns[col_idx].iter().cloned());
        }
        for (local_row, key) in block.pk_values {
            let offset = InternalOffset((block.start_row + local_row) as u64);
            if let Err(existing) = pk_index.try_insert(key.clone(), offset) {
                let _ = existing;
                return Err(CopyError::PkDuplicate(key.to_string()));
            }
        }
        row_count += block.columns.first().map(Vec::len).unwrap_or(0);
    }

    Ok(NodeCopyResult {
        column_names: specs.iter().map(|s| s.name.clone()).collect(),
        columns,
        pk_index,
        row_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(fields: &[&str]) -> csv::StringRecord {
        csv::StringRecord::from(fields.to_vec())
    }

    fn int_specs() -> Vec<ColumnSpec> {
        vec![
            ColumnSpec {
                name: "id".into(),
                logical_type: LogicalType::Int64,
                source: ColumnSource::Field(0),
                is_primary_key: true,
            },
            ColumnSpec {
                name: "name".into(),
                logical_type: LogicalType::String,
                source: ColumnSource::Field(1),
                is_primary_key: false,
            },
        ]
    }

    #[test]
    fn scenario_s1_node_copy_int64_pk() {
        let rows = vec![record(&["1", "a"]), record(&["2", "b"]), record(&["3", "c"])];
        let result = copy_node_from(&rows, &int_specs(), "in.csv").unwrap();
        assert_eq!(result.row_count, 3);
        assert_eq!(result.columns[0], vec![Value::Int64(1), Value::Int64(2), Value::Int64(3)]);
        let offset = result.pk_index.lookup(&PkKey::new(Value::Int64(2)).unwrap());
        assert_eq!(offset, Some(InternalOffset(1)));
    }

    #[test]
    fn scenario_s2_duplicate_pk_aborts_with_no_rows_committed() {
        let rows = vec![record(&["1", "a"]), record(&["1", "b"])];
        let err = copy_node_from(&rows, &int_specs(), "in.csv").unwrap_err();
        assert_eq!(err, CopyError::PkDuplicate("1".to_string()));
    }

    #[test]
    fn null_primary_key_is_a_fatal_error() {
        let rows = vec![record(&["", "a"])];
        let err = copy_node_from(&rows, &int_specs(), "in.csv").unwrap_err();
        assert_eq!(
            err,
            CopyError::PkNull {
                file: "in.csv".to_string(),
                line: 0
            }
        );
    }

    #[test]
    fn default_constant_column_does_not_read_a_field() {
        let specs = vec![
            ColumnSpec {
                name: "id".into(),
                logical_type: LogicalType::Int64,
                source: ColumnSource::Field(0),
                is_primary_key: true,
            },
            ColumnSpec {
                name: "age".into(),
                logical_type: LogicalType::Int64,
                source: ColumnSource::Constant(Value::Int64(0)),
                is_primary_key: false,
            },
        ];
        let rows = vec![record(&["1"])];
        let result = copy_node_from(&rows, &specs, "in.csv").unwrap();
        assert_eq!(result.columns[1], vec![Value::Int64(0)]);
    }
}
