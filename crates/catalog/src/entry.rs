//! Catalog entries: tables, rel groups, indexes, macros and the property
//! definitions every table carries (§3 DATA MODEL).

use gq_common::{ColumnId, IndexId, LogicalType, Multiplicity, PropertyId, TableId, Value};
use std::collections::BTreeSet;

/// Name, logical type, default expression, property id, column id and owner.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDefinition {
    pub name: String,
    pub logical_type: LogicalType,
    /// Constant-foldable default; `Value::Null(ty)` if the user didn't supply one.
    pub default: Value,
    pub property_id: PropertyId,
    pub column_id: ColumnId,
    pub owner: TableId,
}

impl PropertyDefinition {
    pub fn is_serial(&self) -> bool {
        matches!(self.logical_type, LogicalType::Serial)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Copy)]
pub enum CatalogEntryType {
    NodeTable = 1,
    RelTable = 2,
    RelGroup = 3,
    Index = 4,
    Macro = 5,
}

#[derive(Debug, Clone)]
pub struct NodeTableCatalogEntry {
    pub table_id: TableId,
    pub name: String,
    pub comment: String,
    pub properties: Vec<PropertyDefinition>,
    pub primary_key_property_id: PropertyId,
    pub next_property_id: PropertyId,
    pub next_column_id: ColumnId,
    /// Rel tables for which this node table is the `src`.
    pub fwd_rel_table_ids: BTreeSet<TableId>,
    /// Rel tables for which this node table is the `dst`.
    pub bwd_rel_table_ids: BTreeSet<TableId>,
}

impl NodeTableCatalogEntry {
    pub fn primary_key(&self) -> &PropertyDefinition {
        self.properties
            .iter()
            .find(|p| p.property_id == self.primary_key_property_id)
            .expect("primary key property must exist")
    }

    pub fn get_property(&self, name: &str) -> Option<&PropertyDefinition> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub fn contains_property(&self, name: &str) -> bool {
        self.get_property(name).is_some()
    }
}

#[derive(Debug, Clone)]
pub struct RelTableCatalogEntry {
    pub table_id: TableId,
    pub name: String,
    pub comment: String,
    pub src_table_id: TableId,
    pub dst_table_id: TableId,
    pub src_multiplicity: Multiplicity,
    pub dst_multiplicity: Multiplicity,
    /// Properties including the synthetic first `_id` property of type INT64.
    pub properties: Vec<PropertyDefinition>,
    pub next_property_id: PropertyId,
    pub next_column_id: ColumnId,
}

impl RelTableCatalogEntry {
    pub fn get_property(&self, name: &str) -> Option<&PropertyDefinition> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub fn contains_property(&self, name: &str) -> bool {
        self.get_property(name).is_some()
    }

    /// Properties excluding the synthetic `_id` property, in declared order.
    pub fn user_properties(&self) -> impl Iterator<Item = &PropertyDefinition> {
        self.properties.iter().filter(|p| p.name != "_id")
    }
}

#[derive(Debug, Clone)]
pub struct RelGroupCatalogEntry {
    pub table_id: TableId,
    pub name: String,
    /// Child relationship table ids, in insertion order; immutable after creation.
    pub child_rel_table_ids: Vec<TableId>,
}

impl RelGroupCatalogEntry {
    /// `group_FROM_TO`, the synthesized name used when a rel group has more
    /// than one (src, dst) pair and COPY must disambiguate with FROM/TO.
    pub fn child_table_name(group_name: &str, from: &str, to: &str) -> String {
        format!("{group_name}_{from}_{to}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexKind {
    /// An HNSW vector index; `aux` carries the serialized `HNSWIndexAuxInfo`.
    Hnsw,
    /// A plain property index used by the primary-key lookup path.
    PrimaryKey,
}

#[derive(Debug, Clone)]
pub struct IndexCatalogEntry {
    pub index_id: IndexId,
    pub table_id: TableId,
    pub name: String,
    pub property_ids: Vec<PropertyId>,
    pub kind: IndexKind,
    /// Index-type-specific auxiliary info, opaque to the catalog.
    pub aux: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct MacroCatalogEntry {
    pub name: String,
    pub parameter_names: Vec<String>,
    /// Opaque serialized expression body; the binder is responsible for
    /// parsing and substituting parameters at bind time.
    pub body: Vec<u8>,
}
