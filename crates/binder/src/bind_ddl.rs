//! DDL statement binding (§4.1 contract callers): resolves table/property
//! names against the catalog and produces the owned `Bound*` structs the
//! catalog's create/alter/drop methods consume.

use crate::bound::{
    BoundAlter, BoundAlterAction, BoundCreateIndex, BoundCreateTable, BoundDropIndex, BoundDropTable,
    CreateIndexInfoOwned, CreateNodeTableInfoOwned, CreateRelGroupInfoOwned, CreateRelTableInfoOwned,
    PropertySpecOwned,
};
use crate::error::{BinderError, Result};
use crate::parse_tree::{
    ParsedAlter, ParsedAlterAction, ParsedCreateIndex, ParsedCreateNodeTable, ParsedCreateRelGroup,
    ParsedCreateRelTable, ParsedDropIndex, ParsedDropTable, ParsedPropertyDef,
};
use gq_catalog::Catalog;
use gq_common::Value;

fn bind_property(p: &ParsedPropertyDef) -> PropertySpecOwned {
    PropertySpecOwned {
        name: p.name.clone(),
        logical_type: p.logical_type.clone(),
        default: p.default.clone().unwrap_or_else(|| Value::Null(p.logical_type.clone())),
    }
}

pub fn bind_create_node_table(stmt: &ParsedCreateNodeTable) -> CreateNodeTableInfoOwned {
    CreateNodeTableInfoOwned {
        name: stmt.table_name.clone(),
        properties: stmt.properties.iter().map(bind_property).collect(),
        primary_key_name: stmt.primary_key_name.clone(),
    }
}

pub fn bind_create_rel_table(catalog: &Catalog, stmt: &ParsedCreateRelTable) -> Result<CreateRelTableInfoOwned> {
    let src_table_id = catalog
        .get_table_id(&stmt.src_table_name)
        .ok_or_else(|| BinderError::TableNotFound(stmt.src_table_name.clone()))?;
    let dst_table_id = catalog
        .get_table_id(&stmt.dst_table_name)
        .ok_or_else(|| BinderError::TableNotFound(stmt.dst_table_name.clone()))?;
    Ok(CreateRelTableInfoOwned {
        name: stmt.table_name.clone(),
        src_table_id,
        dst_table_id,
        src_multiplicity: stmt.src_multiplicity,
        dst_multiplicity: stmt.dst_multiplicity,
        properties: stmt.properties.iter().map(bind_property).collect(),
    })
}

pub fn bind_create_rel_group(catalog: &Catalog, stmt: &ParsedCreateRelGroup) -> Result<CreateRelGroupInfoOwned> {
    let mut children = Vec::with_capacity(stmt.children.len());
    for child in &stmt.children {
        children.push(bind_create_rel_table(catalog, child)?);
    }
    Ok(CreateRelGroupInfoOwned {
        name: stmt.group_name.clone(),
        children,
    })
}

pub fn bind_drop_table(catalog: &Catalog, stmt: &ParsedDropTable) -> Result<BoundDropTable> {
    let table_id = catalog
        .get_table_id(&stmt.table_name)
        .ok_or_else(|| BinderError::TableNotFound(stmt.table_name.clone()))?;
    if let Some(incident) = catalog.get_node_table(table_id).map(|_| catalog.incident_rel_tables(table_id)) {
        if !incident.is_empty() {
            return Err(BinderError::Catalog(gq_catalog::CatalogError::NodeTableReferenced(
                stmt.table_name.clone(),
                incident,
            )));
        }
    }
    Ok(BoundDropTable { table_id })
}

pub fn bind_alter(catalog: &Catalog, stmt: &ParsedAlter) -> Result<BoundAlter> {
    let table_id = catalog
        .get_table_id(&stmt.table_name)
        .ok_or_else(|| BinderError::TableNotFound(stmt.table_name.clone()))?;
    let action = match &stmt.action {
        ParsedAlterAction::RenameTable { new_name } => BoundAlterAction::RenameTable {
            new_name: new_name.clone(),
        },
        ParsedAlterAction::RenameProperty { old_name, new_name } => BoundAlterAction::RenameProperty {
            old_name: old_name.clone(),
            new_name: new_name.clone(),
        },
        ParsedAlterAction::AddProperty(p) => BoundAlterAction::AddProperty(bind_property(p)),
        ParsedAlterAction::DropProperty { name } => BoundAlterAction::DropProperty { name: name.clone() },
        ParsedAlterAction::SetComment { comment } => BoundAlterAction::SetComment {
            comment: comment.clone(),
        },
    };
    Ok(BoundAlter { table_id, action })
}

pub fn bind_create_index(catalog: &Catalog, stmt: &ParsedCreateIndex) -> Result<BoundCreateIndex> {
    let table_id = catalog
        .get_table_id(&stmt.table_name)
        .ok_or_else(|| BinderError::TableNotFound(stmt.table_name.clone()))?;
    let node_table = catalog
        .get_node_table(table_id)
        .ok_or_else(|| BinderError::TableNotFound(stmt.table_name.clone()))?;
    let mut property_ids = Vec::with_capacity(stmt.property_names.len());
    for name in &stmt.property_names {
        let property = node_table
            .get_property(name)
            .ok_or_else(|| BinderError::ColumnNotFound(stmt.table_name.clone(), name.clone()))?;
        property_ids.push(property.property_id);
    }
    Ok(BoundCreateIndex {
        info: CreateIndexInfoOwned {
            table_id,
            name: stmt.index_name.clone(),
            property_ids,
            kind: stmt.kind.clone(),
            aux: stmt.aux.clone(),
        },
    })
}

pub fn bind_drop_index(catalog: &Catalog, stmt: &ParsedDropIndex) -> Result<BoundDropIndex> {
    let table_id = catalog
        .get_table_id(&stmt.table_name)
        .ok_or_else(|| BinderError::TableNotFound(stmt.table_name.clone()))?;
    let index = catalog
        .get_index_by_name(table_id, &stmt.index_name)
        .ok_or_else(|| BinderError::IndexNotFound(stmt.index_name.clone(), stmt.table_name.clone()))?;
    Ok(BoundDropIndex {
        table_id,
        index_id: index.index_id,
    })
}
