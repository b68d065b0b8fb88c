//! Bridges a bound `COPY FROM` statement to `gq-copy`'s execution contract
//! (§4.5): walks each bound column expression down to the source field it
//! reads (or the constant it folds to) and turns the result into the
//! `ColumnSpec`/`RelCopyPlan` gq-copy's batch-populate passes consume.

use crate::error::{EngineError, Result};
use gq_binder::bound::BoundCopyFromInfo;
use gq_catalog::Catalog;
use gq_common::{LogicalType, TableId};
use gq_copy::{ColumnSource, ColumnSpec, RelCopyPlan};
use gq_expr::{Expression, ExpressionKind};

/// Walks `expr` down through CAST wrappers to the PROPERTY leaf it reads, or
/// recognizes a LITERAL leaf as a constant. Both REFERENCE and CAST
/// evaluate-types collapse to `ColumnSource::Field`: `gq_copy::parse_field`
/// parses the raw source string straight into the destination logical type
/// regardless of any notional intermediate source type.
fn resolve_column_source(expr: &Expression, source_columns: &[(String, LogicalType)]) -> Result<ColumnSource> {
    match &expr.kind {
        ExpressionKind::Literal(v) => Ok(ColumnSource::Constant(v.clone())),
        ExpressionKind::Property(p) => {
            let field_idx = source_columns
                .iter()
                .position(|(name, _)| name == &p.property_name)
                .ok_or_else(|| EngineError::UnresolvableColumn(p.property_name.clone()))?;
            Ok(ColumnSource::Field(field_idx))
        }
        ExpressionKind::Function(f) if f.name == "CAST" && expr.children.len() == 1 => {
            resolve_column_source(&expr.children[0], source_columns)
        }
        _ => Err(EngineError::UnresolvableColumn(expr.unique_name.clone())),
    }
}

/// Recomputes the destination property list a node COPY FROM binds against,
/// in the same order `bind_copy_node_from` walked it in (schema order,
/// skipping `_id` and whichever columns an explicit column list or a SERIAL
/// type excludes) — `BoundCopyFromInfo` itself only carries expressions, not
/// the destination names/types/PK flag those expressions line up with.
fn node_column_specs(catalog: &Catalog, table_id: TableId, explicit_columns: &[String]) -> Result<Vec<(String, LogicalType, bool)>> {
    let table = catalog
        .get_node_table(table_id)
        .ok_or_else(|| gq_catalog::CatalogError::TableNotFound(table_id.to_string()))?;
    let pk_name = table.primary_key().name.clone();
    Ok(table
        .properties
        .iter()
        .filter(|p| p.name != "_id")
        .filter(|p| {
            if explicit_columns.is_empty() {
                !p.is_serial()
            } else {
                explicit_columns.contains(&p.name)
            }
        })
        .map(|p| (p.name.clone(), p.logical_type.clone(), p.name == pk_name))
        .collect())
}

pub fn node_column_specs_for(catalog: &Catalog, bound: &BoundCopyFromInfo, explicit_columns: &[String]) -> Result<Vec<ColumnSpec>> {
    let destinations = node_column_specs(catalog, bound.table_id, explicit_columns)?;
    if destinations.len() != bound.columns.len() {
        return Err(EngineError::UnresolvableColumn(format!(
            "expected {} bound columns for table {}, found {}",
            destinations.len(),
            bound.table_id,
            bound.columns.len()
        )));
    }
    destinations
        .into_iter()
        .zip(bound.columns.iter())
        .map(|((name, logical_type, is_primary_key), expr)| {
            Ok(ColumnSpec {
                source: resolve_column_source(expr, &bound.source_columns)?,
                name,
                logical_type,
                is_primary_key,
            })
        })
        .collect()
}

pub fn rel_copy_plan_for(catalog: &Catalog, bound: &BoundCopyFromInfo) -> Result<RelCopyPlan> {
    let extra = bound
        .extra
        .as_ref()
        .ok_or_else(|| EngineError::MissingRelCopyInfo(bound.table_id.to_string()))?;
    let rel_table = catalog
        .get_rel_table(bound.table_id)
        .ok_or_else(|| gq_catalog::CatalogError::TableNotFound(bound.table_id.to_string()))?;

    let from_field = match resolve_column_source(&extra.src_lookup.key_expr, &bound.source_columns)? {
        ColumnSource::Field(idx) => idx,
        ColumnSource::Constant(_) => return Err(EngineError::UnresolvableColumn("FROM".to_string())),
    };
    let to_field = match resolve_column_source(&extra.dst_lookup.key_expr, &bound.source_columns)? {
        ColumnSource::Field(idx) => idx,
        ColumnSource::Constant(_) => return Err(EngineError::UnresolvableColumn("TO".to_string())),
    };

    // columns[0..3] are the internal SRC_OFFSET/DST_OFFSET/ROW_OFFSET
    // placeholders resolved via `extra`, not real source columns.
    let user_columns = &bound.columns[3..];
    let property_specs = rel_table
        .user_properties()
        .zip(user_columns.iter())
        .map(|(property, expr)| {
            Ok(ColumnSpec {
                name: property.name.clone(),
                logical_type: property.logical_type.clone(),
                source: resolve_column_source(expr, &bound.source_columns)?,
                is_primary_key: false,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(RelCopyPlan {
        table_id: bound.table_id,
        from_field,
        to_field,
        from_key_type: extra.src_lookup.key_expr.logical_type.clone(),
        to_key_type: extra.dst_lookup.key_expr.logical_type.clone(),
        property_specs,
        src_multiplicity: rel_table.src_multiplicity,
        dst_multiplicity: rel_table.dst_multiplicity,
    })
}
