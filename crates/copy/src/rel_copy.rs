//! Relationship copy (§4.5 "Relationship copy"): two phases to get CSR
//! list sizes right. Phase A looks up `FROM`/`TO` keys against the
//! endpoint tables' primary-key indices and either writes directly into a
//! single-multiplicity direction's adjacency column or counts a
//! multi-multiplicity direction's per-node list size. Phase B turns the
//! counts into CSR offsets and places each tuple back-to-front into its
//! node's slot (`decrementListSize`), which after counting leaves a dense
//! list with no gaps.
//!
//! `gq-copy`'s output is an in-memory staging batch consumed by
//! `gq-storage`, not the final on-disk page layout, so unlike the original
//! this does not duplicate property storage per direction — the
//! multi-multiplicity direction instead carries a `csr_row_order`
//! permutation so a consumer can re-project the single canonical
//! (insertion-order) property table into CSR order if it needs to.

use crate::error::{CopyError, Direction, Result};
use crate::node_copy::{ColumnSource, ColumnSpec};
use crate::pk_index::{PkIndex, PkKey};
use gq_common::{InternalOffset, LogicalType, Multiplicity, TableId, Value};

#[derive(Debug, Clone)]
pub enum DirectionData {
    /// Single-multiplicity: one slot per node in the owning table, `None`
    /// until a row targets it, an error if targeted twice.
    Single(Vec<Option<InternalOffset>>),
    /// Multi-multiplicity: CSR `offsets[node] .. offsets[node + 1]` into
    /// `neighbors`, plus the row index each `neighbors` slot came from.
    Multi {
        offsets: Vec<u64>,
        neighbors: Vec<InternalOffset>,
        csr_row_order: Vec<usize>,
    },
}

pub struct RelCopyPlan {
    pub table_id: TableId,
    pub from_field: usize,
    pub to_field: usize,
    pub from_key_type: LogicalType,
    pub to_key_type: LogicalType,
    pub property_specs: Vec<ColumnSpec>,
    pub src_multiplicity: Multiplicity,
    pub dst_multiplicity: Multiplicity,
}

pub struct RelCopyResult {
    pub fwd: DirectionData,
    pub bwd: DirectionData,
    pub property_names: Vec<String>,
    /// One row per inserted relationship, in original file order; row `i`'s
    /// src/dst offsets are `src_offsets[i]`/`dst_offsets[i]`.
    pub properties: Vec<Vec<Value>>,
    pub src_offsets: Vec<InternalOffset>,
    pub dst_offsets: Vec<InternalOffset>,
    pub row_count: usize,
}

fn lookup_key(raw: &str, key_type: &LogicalType, index: &PkIndex, table_id: TableId, line: usize, file_name: &str) -> Result<InternalOffset> {
    if raw.is_empty() {
        return Err(CopyError::PkNull {
            file: file_name.to_string(),
            line,
        });
    }
    let value = match key_type {
        LogicalType::String => Value::String(raw.to_string()),
        _ => Value::Int64(raw.parse().map_err(|_| CopyError::FieldParseError {
            line,
            column: 0,
            message: format!("'{raw}' is not a valid key"),
        })?),
    };
    let key = PkKey::new(value.clone()).ok_or_else(|| CopyError::FieldParseError {
        line,
        column: 0,
        message: "endpoint key is not primary-key compatible".to_string(),
    })?;
    index.lookup(&key).ok_or(CopyError::UnknownEndpointKey(raw.to_string(), table_id))
}

/// Phase A: resolve every row's (src, dst) offsets, apply single-multiplicity
/// writes immediately, and accumulate per-node counts for multi-multiplicity
/// directions.
#[allow(clippy::too_many_arguments)]
fn phase_a(
    rows: &[csv::StringRecord],
    plan: &RelCopyPlan,
    src_pk_index: &PkIndex,
    dst_pk_index: &PkIndex,
    num_src_nodes: usize,
    num_dst_nodes: usize,
    file_name: &str,
) -> Result<(Vec<InternalOffset>, Vec<InternalOffset>, DirectionData, DirectionData, Vec<Vec<Value>>)> {
    let fwd_is_single = plan.dst_multiplicity == Multiplicity::One;
    let bwd_is_single = plan.src_multiplicity == Multiplicity::One;

    let mut fwd_single = fwd_is_single.then(|| vec![None; num_src_nodes]);
    let mut bwd_single = bwd_is_single.then(|| vec![None; num_dst_nodes]);
    let mut fwd_counts = (!fwd_is_single).then(|| vec![0u64; num_src_nodes]);
    let mut bwd_counts = (!bwd_is_single).then(|| vec![0u64; num_dst_nodes]);

    let mut src_offsets = Vec::with_capacity(rows.len());
    let mut dst_offsets = Vec::with_capacity(rows.len());
    let mut properties: Vec<Vec<Value>> = plan.property_specs.iter().map(|_| Vec::with_capacity(rows.len())).collect();

    for (line, record) in rows.iter().enumerate() {
        let from_raw = record.get(plan.from_field).unwrap_or("");
        let to_raw = record.get(plan.to_field).unwrap_or("");
        let src_offset = lookup_key(from_raw, &plan.from_key_type, src_pk_index, plan.table_id, line, file_name)?;
        let dst_offset = lookup_key(to_raw, &plan.to_key_type, dst_pk_index, plan.table_id, line, file_name)?;

        if let Some(fwd) = &mut fwd_single {
            let slot = &mut fwd[src_offset.0 as usize];
            if slot.is_some() {
                return Err(CopyError::SingleMultiplicityViolation {
                    table_id: plan.table_id,
                    offset: src_offset.0,
                    direction: Direction::Fwd,
                });
            }
            *slot = Some(dst_offset);
        } else if let Some(counts) = &mut fwd_counts {
            counts[src_offset.0 as usize] += 1;
        }

        if let Some(bwd) = &mut bwd_single {
            let slot = &mut bwd[dst_offset.0 as usize];
            if slot.is_some() {
                return Err(CopyError::SingleMultiplicityViolation {
                    table_id: plan.table_id,
                    offset: dst_offset.0,
                    direction: Direction::Bwd,
                });
            }
            *slot = Some(src_offset);
        } else if let Some(counts) = &mut bwd_counts {
            counts[dst_offset.0 as usize] += 1;
        }

        for (col_idx, spec) in plan.property_specs.iter().enumerate() {
            let value = match &spec.source {
                ColumnSource::Field(field_idx) => {
                    let raw = record.get(*field_idx).unwrap_or("");
                    crate::node_copy::parse_field(raw, &spec.logical_type, line, *field_idx)?
                }
                ColumnSource::Constant(v) => v.clone(),
            };
            properties[col_idx].push(value);
        }

        src_offsets.push(src_offset);
        dst_offsets.push(dst_offset);
    }

    let fwd = match (fwd_single, fwd_counts) {
        (Some(single), _) => DirectionData::Single(single),
        (None, Some(counts)) => build_csr(&counts, &src_offsets, &dst_offsets, rows.len()),
        _ => unreachable!("exactly one of single/counts is built per direction"),
    };
    let bwd = match (bwd_single, bwd_counts) {
        (Some(single), _) => DirectionData::Single(single),
        (None, Some(counts)) => build_csr(&counts, &dst_offsets, &src_offsets, rows.len()),
        _ => unreachable!("exactly one of single/counts is built per direction"),
    };

    Ok((src_offsets, dst_offsets, fwd, bwd, properties))
}

/// Phase B: CSR offsets from counts, then a back-to-front placement pass
/// (`decrementListSize`) so each node's slot ends up dense. `owner_offsets`
/// buckets each row by the node whose adjacency list it belongs to;
/// `neighbor_offsets` is the value placed into that list (the row's other
/// endpoint).
fn build_csr(counts: &[u64], owner_offsets: &[InternalOffset], neighbor_offsets: &[InternalOffset], row_count: usize) -> DirectionData {
    let mut offsets = Vec::with_capacity(counts.len() + 1);
    let mut running = 0u64;
    for &c in counts {
        offsets.push(running);
        running += c;
    }
    offsets.push(running);

    let mut remaining = counts.to_vec();
    let mut neighbors = vec![InternalOffset(0); running as usize];
    let mut csr_row_order = vec![0usize; running as usize];

    for row in 0..row_count {
        let node = owner_offsets[row].0 as usize;
        remaining[node] -= 1;
        let pos = offsets[node] + remaining[node];
        neighbors[pos as usize] = neighbor_offsets[row];
        csr_row_order[pos as usize] = row;
    }

    DirectionData::Multi { offsets, neighbors, csr_row_order }
}

pub fn copy_rel_from(
    rows: &[csv::StringRecord],
    plan: &RelCopyPlan,
    src_pk_index: &PkIndex,
    dst_pk_index: &PkIndex,
    num_src_nodes: usize,
    num_dst_nodes: usize,
    file_name: &str,
) -> Result<RelCopyResult> {
    let (src_offsets, dst_offsets, fwd, bwd, properties) =
        phase_a(rows, plan, src_pk_index, dst_pk_index, num_src_nodes, num_dst_nodes, file_name)?;

    Ok(RelCopyResult {
        fwd,
        bwd,
        property_names: plan.property_specs.iter().map(|s| s.name.clone()).collect(),
        properties,
        src_offsets,
        dst_offsets,
        row_count: rows.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node_copy::copy_node_from;

    fn record(fields: &[&str]) -> csv::StringRecord {
        csv::StringRecord::from(fields.to_vec())
    }

    fn build_node_index(ids: &[i64]) -> PkIndex {
        let specs = vec![ColumnSpec {
            name: "id".into(),
            logical_type: LogicalType::Int64,
            source: ColumnSource::Field(0),
            is_primary_key: true,
        }];
        let rows: Vec<_> = ids.iter().map(|id| record(&[&id.to_string()])).collect();
        copy_node_from(&rows, &specs, "nodes.csv").unwrap().pk_index
    }

    fn one_one_plan() -> RelCopyPlan {
        RelCopyPlan {
            table_id: TableId(10),
            from_field: 0,
            to_field: 1,
            from_key_type: LogicalType::Int64,
            to_key_type: LogicalType::Int64,
            property_specs: vec![],
            src_multiplicity: Multiplicity::One,
            dst_multiplicity: Multiplicity::One,
        }
    }

    #[test]
    fn scenario_s3_single_multiplicity_violation_on_fwd() {
        let src_index = build_node_index(&[1]);
        let dst_index = build_node_index(&[1, 2]);
        let rows = vec![record(&["1", "1"]), record(&["1", "2"])];
        let err = copy_rel_from(&rows, &one_one_plan(), &src_index, &dst_index, 1, 2, "rel.csv").unwrap_err();
        assert_eq!(
            err,
            CopyError::SingleMultiplicityViolation {
                table_id: TableId(10),
                offset: 0,
                direction: Direction::Fwd,
            }
        );
    }

    #[test]
    fn unknown_endpoint_key_is_reported() {
        let src_index = build_node_index(&[1]);
        let dst_index = build_node_index(&[1]);
        let rows = vec![record(&["1", "99"])];
        let err = copy_rel_from(&rows, &one_one_plan(), &src_index, &dst_index, 1, 1, "rel.csv").unwrap_err();
        assert_eq!(err, CopyError::UnknownEndpointKey("99".to_string(), TableId(10)));
    }

    #[test]
    fn multi_multiplicity_direction_produces_a_dense_csr_with_matching_total() {
        let mut plan = one_one_plan();
        plan.src_multiplicity = Multiplicity::Many;
        plan.dst_multiplicity = Multiplicity::Many;
        let src_index = build_node_index(&[1, 2]);
        let dst_index = build_node_index(&[1, 2]);
        let rows = vec![record(&["1", "1"]), record(&["1", "2"]), record(&["2", "1"])];
        let result = copy_rel_from(&rows, &plan, &src_index, &dst_index, 2, 2, "rel.csv").unwrap();
        match result.fwd {
            DirectionData::Multi { offsets, neighbors, .. } => {
                assert_eq!(offsets, vec![0, 2, 3]);
                let mut src0_neighbors = neighbors[0..2].iter().map(|o| o.0).collect::<Vec<_>>();
                src0_neighbors.sort();
                assert_eq!(src0_neighbors, vec![0, 1]);
                assert_eq!(neighbors[2], InternalOffset(0));
            }
            _ => panic!("expected CSR"),
        }
        assert_eq!(result.row_count, 3);
    }
}
