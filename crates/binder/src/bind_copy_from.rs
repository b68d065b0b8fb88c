//! COPY FROM binding (§4.2): resolves the target table, the expected
//! column list, and per-column evaluate strategy, grounded on
//! `binder/bind/copy/bind_copy_from.cpp`.

use crate::bound::{BoundCopyFrom, BoundCopyFromInfo, ColumnEvaluateType, ExtraCopyRelInfo, IndexLookupInfo};
use crate::error::{BinderError, Result};
use crate::expression_binder::{bind_literal, bind_source_column, create_variable, force_cast, ROW_OFFSET};
use crate::parse_tree::ParsedCopyFrom;
use gq_catalog::entry::{NodeTableCatalogEntry, PropertyDefinition, RelTableCatalogEntry};
use gq_catalog::{Catalog, TableEntryRef};
use gq_common::LogicalType;
use gq_expr::Expression;

const FROM_OPTION_NAME: &str = "from";
const TO_OPTION_NAME: &str = "to";

pub fn bind_copy_from(catalog: &Catalog, stmt: &ParsedCopyFrom) -> Result<BoundCopyFrom> {
    let table_name = &stmt.table_name;
    if let Some(group) = catalog
        .get_table_id(table_name)
        .and_then(|id| catalog.get_rel_group(id))
    {
        if group.child_rel_table_ids.len() == 1 {
            let rel = catalog.get_rel_table(group.child_rel_table_ids[0]).expect("child rel table must exist");
            return bind_copy_rel_from(catalog, stmt, rel);
        }
        let from = stmt.parsing_options.get(FROM_OPTION_NAME);
        let to = stmt.parsing_options.get(TO_OPTION_NAME);
        let (from, to) = match (from, to) {
            (Some(f), Some(t)) => (f, t),
            _ => return Err(BinderError::AmbiguousRelGroup(table_name.clone())),
        };
        let child_name = gq_catalog::RelGroupCatalogEntry::child_table_name(table_name, from, to);
        if let Some(rel) = catalog.get_table_id(&child_name).and_then(|id| catalog.get_rel_table(id)) {
            return bind_copy_rel_from(catalog, stmt, rel);
        }
        return Err(BinderError::RelGroupNotFound(table_name.clone()));
    }

    match catalog.get_table_id(table_name).and_then(|id| catalog.get_table_entry(id)) {
        Some(TableEntryRef::Node(_)) => {
            let id = catalog.get_table_id(table_name).unwrap();
            bind_copy_node_from(catalog.get_node_table(id).unwrap(), stmt)
        }
        Some(TableEntryRef::Rel(_)) => {
            let id = catalog.get_table_id(table_name).unwrap();
            bind_copy_rel_from(catalog, stmt, catalog.get_rel_table(id).unwrap())
        }
        _ => Err(BinderError::TableNotFound(table_name.clone())),
    }
}

fn skip_property_in_file(property: &PropertyDefinition) -> bool {
    property.name == "_id"
}

fn skip_property_in_schema(property: &PropertyDefinition) -> bool {
    property.is_serial() || property.name == "_id"
}

fn bind_expected_columns(
    properties: &[PropertyDefinition],
    input_column_names: &[String],
) -> Result<Vec<(String, LogicalType)>> {
    if !input_column_names.is_empty() {
        let mut seen = std::collections::HashSet::new();
        for name in input_column_names {
            if !seen.insert(name.clone()) {
                return Err(BinderError::DuplicateColumnName(name.clone()));
            }
        }
        let mut out = Vec::with_capacity(input_column_names.len());
        for name in input_column_names {
            let property = properties
                .iter()
                .find(|p| &p.name == name)
                .ok_or_else(|| BinderError::ColumnNotFound("?".to_string(), name.clone()))?;
            if skip_property_in_file(property) {
                continue;
            }
            out.push((property.name.clone(), property.logical_type.clone()));
        }
        Ok(out)
    } else {
        Ok(properties
            .iter()
            .filter(|p| !skip_property_in_schema(p))
            .map(|p| (p.name.clone(), p.logical_type.clone()))
            .collect())
    }
}

fn match_column_expression(
    source_columns: &[(String, LogicalType)],
    property: &PropertyDefinition,
) -> Result<(ColumnEvaluateType, Expression)> {
    for (name, ty) in source_columns {
        if &property.name == name {
            let column = bind_source_column(name, ty.clone());
            if ty == &property.logical_type {
                return Ok((ColumnEvaluateType::Reference, column));
            }
            return Ok((ColumnEvaluateType::Cast, force_cast(column, &property.logical_type)?));
        }
    }
    if !gq_expr::visitor::is_constant(&bind_literal(property.default.clone())) {
        return Err(BinderError::DefaultNotConstant(property.name.clone()));
    }
    Ok((ColumnEvaluateType::Default, bind_literal(property.default.clone())))
}

fn bind_copy_node_from(node_table_entry: &NodeTableCatalogEntry, stmt: &ParsedCopyFrom) -> Result<BoundCopyFrom> {
    let expected = bind_expected_columns(&node_table_entry.properties, &stmt.column_names)?;
    let source_columns: Vec<(String, LogicalType)> = stmt
        .source_columns
        .iter()
        .map(|c| (c.name.clone(), c.logical_type.clone()))
        .collect();

    if stmt.by_column {
        let is_npy = stmt.parsing_options.get("file_type").map(|s| s.eq_ignore_ascii_case("npy")).unwrap_or(false);
        if !is_npy {
            let file_type = stmt.parsing_options.get("file_type").cloned().unwrap_or_default();
            return Err(BinderError::ByColumnRequiresNpy(file_type));
        }
    }

    let mut columns = Vec::new();
    let mut evaluate_types = Vec::new();
    for property in &node_table_entry.properties {
        if property.name == "_id" {
            continue;
        }
        if !expected.iter().any(|(name, _)| name == &property.name) {
            continue;
        }
        let (evaluate_type, column) = match_column_expression(&source_columns, property)?;
        columns.push(column);
        evaluate_types.push(evaluate_type);
    }
    let row_offset_expr = create_variable(ROW_OFFSET, LogicalType::Int64);
    Ok(BoundCopyFrom {
        info: BoundCopyFromInfo {
            table_id: node_table_entry.table_id,
            source_columns,
            row_offset_expr,
            columns,
            evaluate_types,
            extra: None,
        },
    })
}

fn bind_expected_rel_columns(
    catalog: &Catalog,
    rel_table_entry: &RelTableCatalogEntry,
    input_column_names: &[String],
) -> Result<Vec<(String, LogicalType)>> {
    let src = catalog.get_node_table(rel_table_entry.src_table_id).expect("src node table must exist");
    let dst = catalog.get_node_table(rel_table_entry.dst_table_id).expect("dst node table must exist");
    let src_pk_ty = src.primary_key().logical_type.underlying_storage_type();
    let dst_pk_ty = dst.primary_key().logical_type.underlying_storage_type();
    let mut columns = vec![("from".to_string(), src_pk_ty), ("to".to_string(), dst_pk_ty)];
    let rest = bind_expected_columns(&rel_table_entry.properties, input_column_names)?;
    columns.extend(rest.into_iter().filter(|(name, _)| name != "from" && name != "to"));
    Ok(columns)
}

fn bind_copy_rel_from(catalog: &Catalog, stmt: &ParsedCopyFrom, rel_table_entry: &RelTableCatalogEntry) -> Result<BoundCopyFrom> {
    if stmt.by_column {
        return Err(BinderError::ByColumnNotSupportedForRel);
    }
    let expected = bind_expected_rel_columns(catalog, rel_table_entry, &stmt.column_names)?;
    let source_columns: Vec<(String, LogicalType)> = stmt
        .source_columns
        .iter()
        .map(|c| (c.name.clone(), c.logical_type.clone()))
        .collect();

    let row_offset_expr = create_variable(ROW_OFFSET, LogicalType::Int64);
    let src_offset = create_variable("SRC_OFFSET", LogicalType::Int64);
    let dst_offset = create_variable("DST_OFFSET", LogicalType::Int64);
    let mut columns = vec![src_offset.clone(), dst_offset.clone(), row_offset_expr.clone()];
    let mut evaluate_types = vec![ColumnEvaluateType::Reference, ColumnEvaluateType::Reference, ColumnEvaluateType::Reference];

    for property in rel_table_entry.user_properties() {
        let (evaluate_type, column) = match_column_expression(&source_columns, property)?;
        columns.push(column);
        evaluate_types.push(evaluate_type);
    }

    let from_source = source_columns
        .first()
        .cloned()
        .unwrap_or_else(|| ("from".to_string(), expected[0].1.clone()));
    let to_source = source_columns
        .get(1)
        .cloned()
        .unwrap_or_else(|| ("to".to_string(), expected[1].1.clone()));
    let from_col = bind_source_column(&from_source.0, from_source.1.clone());
    let to_col = bind_source_column(&to_source.0, to_source.1.clone());
    let src_key = if from_source.1 != expected[0].1 {
        force_cast(from_col, &expected[0].1)?
    } else {
        from_col
    };
    let dst_key = if to_source.1 != expected[1].1 {
        force_cast(to_col, &expected[1].1)?
    } else {
        to_col
    };

    let extra = ExtraCopyRelInfo {
        internal_id_column_indices: [0, 1, 2],
        src_lookup: IndexLookupInfo {
            table_id: rel_table_entry.src_table_id,
            offset_expr: src_offset,
            key_expr: src_key,
        },
        dst_lookup: IndexLookupInfo {
            table_id: rel_table_entry.dst_table_id,
            offset_expr: dst_offset,
            key_expr: dst_key,
        },
    };

    Ok(BoundCopyFrom {
        info: BoundCopyFromInfo {
            table_id: rel_table_entry.table_id,
            source_columns,
            row_offset_expr,
            columns,
            evaluate_types,
            extra: Some(extra),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_tree::ParsedScanColumn;
    use gq_catalog::{CreateNodeTableInfo, CreateRelTableInfo, PropertySpec};
    use gq_common::{Multiplicity, Value};

    fn person_catalog() -> (Catalog, gq_common::TableId) {
        let mut cat = Catalog::new();
        let id = cat
            .create_node_table(CreateNodeTableInfo {
                name: "Person".into(),
                properties: vec![
                    PropertySpec::new("id", LogicalType::Serial),
                    PropertySpec::new("name", LogicalType::String).with_default(Value::String("anon".into())),
                ],
                primary_key_name: "id".into(),
            })
            .unwrap();
        (cat, id)
    }

    #[test]
    fn node_copy_skips_serial_and_uses_reference_for_matching_source_column() {
        let (cat, _id) = person_catalog();
        let stmt = ParsedCopyFrom {
            table_name: "Person".into(),
            column_names: vec![],
            by_column: false,
            source_columns: vec![ParsedScanColumn {
                name: "name".into(),
                logical_type: LogicalType::String,
            }],
            parsing_options: Default::default(),
        };
        let bound = bind_copy_from(&cat, &stmt).unwrap();
        assert_eq!(bound.info.columns.len(), 1);
        assert_eq!(bound.info.evaluate_types[0], ColumnEvaluateType::Reference);
        assert!(bound.info.extra.is_none());
    }

    #[test]
    fn node_copy_falls_back_to_default_when_source_column_missing() {
        let (cat, _id) = person_catalog();
        let stmt = ParsedCopyFrom {
            table_name: "Person".into(),
            column_names: vec![],
            by_column: false,
            source_columns: vec![],
            parsing_options: Default::default(),
        };
        let bound = bind_copy_from(&cat, &stmt).unwrap();
        assert_eq!(bound.info.evaluate_types[0], ColumnEvaluateType::Default);
    }

    #[test]
    fn missing_table_is_an_error() {
        let (cat, _id) = person_catalog();
        let stmt = ParsedCopyFrom {
            table_name: "Nope".into(),
            ..Default::default()
        };
        assert_eq!(bind_copy_from(&cat, &stmt).unwrap_err(), BinderError::TableNotFound("Nope".into()));
    }

    #[test]
    fn rel_copy_injects_src_dst_row_offsets_and_lookup_info() {
        let (mut cat, person) = person_catalog();
        let knows = cat
            .create_rel_table(CreateRelTableInfo {
                name: "Knows".into(),
                src_table_id: person,
                dst_table_id: person,
                src_multiplicity: Multiplicity::Many,
                dst_multiplicity: Multiplicity::Many,
                properties: vec![PropertySpec::new("since", LogicalType::Int64)],
            })
            .unwrap();
        let _ = knows;
        let stmt = ParsedCopyFrom {
            table_name: "Knows".into(),
            column_names: vec![],
            by_column: false,
            source_columns: vec![
                ParsedScanColumn {
                    name: "from".into(),
                    logical_type: LogicalType::Int64,
                },
                ParsedScanColumn {
                    name: "to".into(),
                    logical_type: LogicalType::Int64,
                },
                ParsedScanColumn {
                    name: "since".into(),
                    logical_type: LogicalType::Int64,
                },
            ],
            parsing_options: Default::default(),
        };
        let bound = bind_copy_from(&cat, &stmt).unwrap();
        let extra = bound.info.extra.expect("rel copy must carry ExtraCopyRelInfo");
        assert_eq!(extra.internal_id_column_indices, [0, 1, 2]);
        assert_eq!(bound.info.columns.len(), 4);
    }

    #[test]
    fn by_column_on_rel_table_is_rejected() {
        let (mut cat, person) = person_catalog();
        cat.create_rel_table(CreateRelTableInfo {
            name: "Knows".into(),
            src_table_id: person,
            dst_table_id: person,
            src_multiplicity: Multiplicity::Many,
            dst_multiplicity: Multiplicity::Many,
            properties: vec![],
        })
        .unwrap();
        let stmt = ParsedCopyFrom {
            table_name: "Knows".into(),
            by_column: true,
            ..Default::default()
        };
        assert_eq!(bind_copy_from(&cat, &stmt).unwrap_err(), BinderError::ByColumnNotSupportedForRel);
    }
}
