//! The system catalog: owns the schema, enforces uniqueness, and provides
//! bidirectional lookup by name and by id (§4.1).

use crate::entry::{
    IndexCatalogEntry, IndexKind, MacroCatalogEntry, NodeTableCatalogEntry, PropertyDefinition, RelGroupCatalogEntry,
    RelTableCatalogEntry,
};
use crate::error::{CatalogError, Result};
use gq_common::{ColumnId, IndexId, LogicalType, Multiplicity, PropertyId, TableId, Value};
use std::collections::{BTreeSet, HashMap};

#[derive(Debug, Clone)]
pub struct PropertySpec {
    pub name: String,
    pub logical_type: LogicalType,
    pub default: Value,
}

impl PropertySpec {
    pub fn new(name: impl Into<String>, logical_type: LogicalType) -> Self {
        let logical_type_clone = logical_type.clone();
        Self {
            name: name.into(),
            logical_type,
            default: Value::Null(logical_type_clone),
        }
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = default;
        self
    }
}

pub struct CreateNodeTableInfo {
    pub name: String,
    pub properties: Vec<PropertySpec>,
    pub primary_key_name: String,
}

pub struct CreateRelTableInfo {
    pub name: String,
    pub src_table_id: TableId,
    pub dst_table_id: TableId,
    pub src_multiplicity: Multiplicity,
    pub dst_multiplicity: Multiplicity,
    pub properties: Vec<PropertySpec>,
}

pub struct CreateRelGroupInfo {
    pub name: String,
    pub children: Vec<CreateRelTableInfo>,
}

pub struct CreateIndexInfo {
    pub table_id: TableId,
    pub name: String,
    pub property_ids: Vec<PropertyId>,
    pub kind: IndexKind,
    pub aux: Vec<u8>,
}

/// A reference to whichever kind of table entry a `TableId` resolves to.
#[derive(Debug, Clone, Copy)]
pub enum TableEntryRef<'a> {
    Node(&'a NodeTableCatalogEntry),
    Rel(&'a RelTableCatalogEntry),
    RelGroup(&'a RelGroupCatalogEntry),
}

impl<'a> TableEntryRef<'a> {
    pub fn name(&self) -> &'a str {
        match self {
            TableEntryRef::Node(e) => &e.name,
            TableEntryRef::Rel(e) => &e.name,
            TableEntryRef::RelGroup(e) => &e.name,
        }
    }

    pub fn table_id(&self) -> TableId {
        match self {
            TableEntryRef::Node(e) => e.table_id,
            TableEntryRef::Rel(e) => e.table_id,
            TableEntryRef::RelGroup(e) => e.table_id,
        }
    }
}

/// Manage the schema: tables, rel groups, indexes and macros.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub(crate) node_tables: HashMap<TableId, NodeTableCatalogEntry>,
    pub(crate) rel_tables: HashMap<TableId, RelTableCatalogEntry>,
    pub(crate) rel_groups: HashMap<TableId, RelGroupCatalogEntry>,
    pub(crate) indexes: HashMap<IndexId, IndexCatalogEntry>,
    pub(crate) macros: HashMap<String, MacroCatalogEntry>,
    /// Node tables, rel tables and rel groups all share one name namespace.
    pub(crate) name_to_id: HashMap<String, TableId>,
    pub(crate) next_table_id: u64,
    pub(crate) next_index_id: u64,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    fn alloc_table_id(&mut self) -> TableId {
        let id = TableId(self.next_table_id);
        self.next_table_id += 1;
        id
    }

    fn alloc_index_id(&mut self) -> IndexId {
        let id = IndexId(self.next_index_id);
        self.next_index_id += 1;
        id
    }

    pub fn contains_table(&self, name: &str) -> bool {
        self.name_to_id.contains_key(name)
    }

    pub fn get_table_id(&self, name: &str) -> Option<TableId> {
        self.name_to_id.get(name).copied()
    }

    pub fn get_table_entry(&self, id: TableId) -> Option<TableEntryRef<'_>> {
        if let Some(e) = self.node_tables.get(&id) {
            return Some(TableEntryRef::Node(e));
        }
        if let Some(e) = self.rel_tables.get(&id) {
            return Some(TableEntryRef::Rel(e));
        }
        if let Some(e) = self.rel_groups.get(&id) {
            return Some(TableEntryRef::RelGroup(e));
        }
        None
    }

    pub fn get_node_table(&self, id: TableId) -> Option<&NodeTableCatalogEntry> {
        self.node_tables.get(&id)
    }

    pub fn get_rel_table(&self, id: TableId) -> Option<&RelTableCatalogEntry> {
        self.rel_tables.get(&id)
    }

    pub fn get_rel_group(&self, id: TableId) -> Option<&RelGroupCatalogEntry> {
        self.rel_groups.get(&id)
    }

    fn build_properties(
        table_id: TableId,
        specs: Vec<PropertySpec>,
        starting_property_id: u64,
        starting_column_id: u64,
    ) -> (Vec<PropertyDefinition>, PropertyId, ColumnId) {
        let mut properties = Vec::with_capacity(specs.len());
        let mut next_property_id = starting_property_id;
        let mut next_column_id = starting_column_id;
        for spec in specs {
            let property_id = PropertyId(next_property_id);
            next_property_id += 1;
            // SERIAL properties are not materialized as a column.
            let column_id = if matches!(spec.logical_type, LogicalType::Serial) {
                ColumnId(u64::MAX)
            } else {
                let c = ColumnId(next_column_id);
                next_column_id += 1;
                c
            };
            properties.push(PropertyDefinition {
                name: spec.name,
                logical_type: spec.logical_type,
                default: spec.default,
                property_id,
                column_id,
                owner: table_id,
            });
        }
        (properties, PropertyId(next_property_id), ColumnId(next_column_id))
    }

    pub fn create_node_table(&mut self, info: CreateNodeTableInfo) -> Result<TableId> {
        if self.contains_table(&info.name) {
            return Err(CatalogError::TableExists(info.name));
        }
        let table_id = self.alloc_table_id();
        let (properties, next_property_id, next_column_id) = Self::build_properties(table_id, info.properties, 0, 0);
        let primary_key_property_id = properties
            .iter()
            .find(|p| p.name == info.primary_key_name)
            .map(|p| p.property_id)
            .ok_or_else(|| CatalogError::ColumnNotFound(info.primary_key_name.clone()))?;
        let entry = NodeTableCatalogEntry {
            table_id,
            name: info.name.clone(),
            comment: String::new(),
            properties,
            primary_key_property_id,
            next_property_id,
            next_column_id,
            fwd_rel_table_ids: BTreeSet::new(),
            bwd_rel_table_ids: BTreeSet::new(),
        };
        self.node_tables.insert(table_id, entry);
        self.name_to_id.insert(info.name, table_id);
        Ok(table_id)
    }

    /// Creates a single rel table. Column 0 is reserved for the neighbor id,
    /// so materialized user columns start at column id 1; property ids start
    /// at 1 too since property 0 is the synthetic `_id` (INT64).
    pub fn create_rel_table(&mut self, info: CreateRelTableInfo) -> Result<TableId> {
        if self.contains_table(&info.name) {
            return Err(CatalogError::TableExists(info.name));
        }
        if !self.node_tables.contains_key(&info.src_table_id) || !self.node_tables.contains_key(&info.dst_table_id) {
            return Err(CatalogError::TableNotFound(format!(
                "src/dst for rel table {}",
                info.name
            )));
        }
        let table_id = self.alloc_table_id();
        let id_property = PropertyDefinition {
            name: "_id".to_string(),
            logical_type: LogicalType::Int64,
            default: Value::Null(LogicalType::Int64),
            property_id: PropertyId(0),
            column_id: ColumnId(0),
            owner: table_id,
        };
        let (mut properties, next_property_id, next_column_id) = Self::build_properties(table_id, info.properties, 1, 1);
        properties.insert(0, id_property);
        let entry = RelTableCatalogEntry {
            table_id,
            name: info.name.clone(),
            comment: String::new(),
            src_table_id: info.src_table_id,
            dst_table_id: info.dst_table_id,
            src_multiplicity: info.src_multiplicity,
            dst_multiplicity: info.dst_multiplicity,
            properties,
            next_property_id,
            next_column_id,
        };
        self.rel_tables.insert(table_id, entry);
        self.name_to_id.insert(info.name, table_id);
        self.node_tables.get_mut(&info.src_table_id).unwrap().fwd_rel_table_ids.insert(table_id);
        self.node_tables.get_mut(&info.dst_table_id).unwrap().bwd_rel_table_ids.insert(table_id);
        Ok(table_id)
    }

    pub fn create_rel_group(&mut self, info: CreateRelGroupInfo) -> Result<TableId> {
        if self.contains_table(&info.name) {
            return Err(CatalogError::TableExists(info.name));
        }
        let mut child_ids = Vec::with_capacity(info.children.len());
        for child in info.children {
            child_ids.push(self.create_rel_table(child)?);
        }
        let table_id = self.alloc_table_id();
        self.rel_groups.insert(
            table_id,
            RelGroupCatalogEntry {
                table_id,
                name: info.name.clone(),
                child_rel_table_ids: child_ids,
            },
        );
        self.name_to_id.insert(info.name, table_id);
        Ok(table_id)
    }

    /// Returns the rel table ids that still reference `node_table_id` as
    /// either src or dst. The binder must check this is empty before calling
    /// [`Catalog::drop_table`] on a node table (§4.1).
    pub fn incident_rel_tables(&self, node_table_id: TableId) -> Vec<TableId> {
        self.node_tables
            .get(&node_table_id)
            .map(|e| e.fwd_rel_table_ids.iter().chain(e.bwd_rel_table_ids.iter()).copied().collect())
            .unwrap_or_default()
    }

    /// Cascades: dropping a rel group drops every child table; dropping a
    /// table removes its name from the name→id map.
    pub fn drop_table(&mut self, id: TableId) -> Result<()> {
        if let Some(group) = self.rel_groups.remove(&id) {
            self.name_to_id.remove(&group.name);
            for child in group.child_rel_table_ids {
                self.drop_rel_table_entry(child);
            }
            return Ok(());
        }
        if self.rel_tables.contains_key(&id) {
            self.drop_rel_table_entry(id);
            return Ok(());
        }
        if let Some(node) = self.node_tables.remove(&id) {
            self.name_to_id.remove(&node.name);
            return Ok(());
        }
        Err(CatalogError::TableNotFound(format!("id {id}")))
    }

    fn drop_rel_table_entry(&mut self, id: TableId) {
        if let Some(rel) = self.rel_tables.remove(&id) {
            self.name_to_id.remove(&rel.name);
            if let Some(src) = self.node_tables.get_mut(&rel.src_table_id) {
                src.fwd_rel_table_ids.remove(&id);
            }
            if let Some(dst) = self.node_tables.get_mut(&rel.dst_table_id) {
                dst.bwd_rel_table_ids.remove(&id);
            }
        }
    }

    pub fn rename_table(&mut self, id: TableId, new_name: &str) -> Result<()> {
        if self.contains_table(new_name) {
            return Err(CatalogError::TableExists(new_name.to_string()));
        }
        let old_name = match self.get_table_entry(id) {
            Some(e) => e.name().to_string(),
            None => return Err(CatalogError::TableNotFound(format!("id {id}"))),
        };
        if let Some(e) = self.node_tables.get_mut(&id) {
            e.name = new_name.to_string();
        } else if let Some(e) = self.rel_tables.get_mut(&id) {
            e.name = new_name.to_string();
        } else if let Some(e) = self.rel_groups.get_mut(&id) {
            e.name = new_name.to_string();
        }
        self.name_to_id.remove(&old_name);
        self.name_to_id.insert(new_name.to_string(), id);
        Ok(())
    }

    pub fn set_comment(&mut self, id: TableId, comment: &str) -> Result<()> {
        if let Some(e) = self.node_tables.get_mut(&id) {
            e.comment = comment.to_string();
        } else if let Some(e) = self.rel_tables.get_mut(&id) {
            e.comment = comment.to_string();
        } else {
            return Err(CatalogError::TableNotFound(format!("id {id}")));
        }
        Ok(())
    }

    pub fn rename_property(&mut self, table_id: TableId, old_name: &str, new_name: &str) -> Result<()> {
        let properties = self.properties_mut(table_id)?;
        if properties.iter().any(|p| p.name == new_name) {
            return Err(CatalogError::ColumnExists(new_name.to_string()));
        }
        let prop = properties
            .iter_mut()
            .find(|p| p.name == old_name)
            .ok_or_else(|| CatalogError::ColumnNotFound(old_name.to_string()))?;
        prop.name = new_name.to_string();
        Ok(())
    }

    pub fn add_property(&mut self, table_id: TableId, spec: PropertySpec) -> Result<PropertyId> {
        if let Some(e) = self.node_tables.get_mut(&table_id) {
            if e.contains_property(&spec.name) {
                return Err(CatalogError::ColumnExists(spec.name));
            }
            let property_id = e.next_property_id;
            let column_id = e.next_column_id;
            e.properties.push(PropertyDefinition {
                name: spec.name,
                logical_type: spec.logical_type,
                default: spec.default,
                property_id,
                column_id,
                owner: table_id,
            });
            e.next_property_id = property_id.next();
            e.next_column_id = column_id.next();
            return Ok(property_id);
        }
        if let Some(e) = self.rel_tables.get_mut(&table_id) {
            if e.contains_property(&spec.name) {
                return Err(CatalogError::ColumnExists(spec.name));
            }
            let property_id = e.next_property_id;
            let column_id = e.next_column_id;
            e.properties.push(PropertyDefinition {
                name: spec.name,
                logical_type: spec.logical_type,
                default: spec.default,
                property_id,
                column_id,
                owner: table_id,
            });
            e.next_property_id = property_id.next();
            e.next_column_id = column_id.next();
            return Ok(property_id);
        }
        Err(CatalogError::TableNotFound(format!("id {table_id}")))
    }

    pub fn drop_property(&mut self, table_id: TableId, name: &str) -> Result<()> {
        let properties = self.properties_mut(table_id)?;
        let before = properties.len();
        properties.retain(|p| p.name != name);
        if properties.len() == before {
            return Err(CatalogError::ColumnNotFound(name.to_string()));
        }
        Ok(())
    }

    fn properties_mut(&mut self, table_id: TableId) -> Result<&mut Vec<PropertyDefinition>> {
        if let Some(e) = self.node_tables.get_mut(&table_id) {
            return Ok(&mut e.properties);
        }
        if let Some(e) = self.rel_tables.get_mut(&table_id) {
            return Ok(&mut e.properties);
        }
        Err(CatalogError::TableNotFound(format!("id {table_id}")))
    }

    pub fn create_index(&mut self, info: CreateIndexInfo) -> Result<IndexId> {
        if self.contains_index(info.table_id, &info.name) {
            return Err(CatalogError::IndexExists(info.name));
        }
        let index_id = self.alloc_index_id();
        self.indexes.insert(
            index_id,
            IndexCatalogEntry {
                index_id,
                table_id: info.table_id,
                name: info.name,
                property_ids: info.property_ids,
                kind: info.kind,
                aux: info.aux,
            },
        );
        Ok(index_id)
    }

    pub fn drop_index(&mut self, index_id: IndexId) -> Result<()> {
        self.indexes
            .remove(&index_id)
            .map(|_| ())
            .ok_or(CatalogError::IndexNotFound(format!("id {index_id}")))
    }

    pub fn contains_index(&self, table_id: TableId, name: &str) -> bool {
        self.indexes.values().any(|idx| idx.table_id == table_id && idx.name == name)
    }

    pub fn get_index_by_name(&self, table_id: TableId, name: &str) -> Option<&IndexCatalogEntry> {
        self.indexes.values().find(|idx| idx.table_id == table_id && idx.name == name)
    }

    pub fn get_index(&self, index_id: IndexId) -> Option<&IndexCatalogEntry> {
        self.indexes.get(&index_id)
    }

    pub fn create_macro(&mut self, entry: MacroCatalogEntry) -> Result<()> {
        if self.macros.contains_key(&entry.name) {
            return Err(CatalogError::TableExists(entry.name));
        }
        self.macros.insert(entry.name.clone(), entry);
        Ok(())
    }

    pub fn get_macro(&self, name: &str) -> Option<&MacroCatalogEntry> {
        self.macros.get(name)
    }

    pub fn iter_node_tables(&self) -> impl Iterator<Item = &NodeTableCatalogEntry> {
        self.node_tables.values()
    }

    pub fn iter_rel_tables(&self) -> impl Iterator<Item = &RelTableCatalogEntry> {
        self.rel_tables.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gq_common::LogicalType;

    fn make_t_table(cat: &mut Catalog) -> TableId {
        cat.create_node_table(CreateNodeTableInfo {
            name: "T".into(),
            properties: vec![
                PropertySpec::new("id", LogicalType::Int64),
                PropertySpec::new("name", LogicalType::String),
            ],
            primary_key_name: "id".into(),
        })
        .unwrap()
    }

    #[test]
    fn create_then_drop_round_trips_next_table_id() {
        let mut cat = Catalog::new();
        let id = make_t_table(&mut cat);
        let next_after_create = cat.next_table_id;
        cat.drop_table(id).unwrap();
        assert!(!cat.contains_table("T"));
        assert_eq!(cat.next_table_id, next_after_create, "dropping must not reuse or rewind ids");
    }

    #[test]
    fn duplicate_table_name_is_rejected() {
        let mut cat = Catalog::new();
        make_t_table(&mut cat);
        let err = cat
            .create_node_table(CreateNodeTableInfo {
                name: "T".into(),
                properties: vec![PropertySpec::new("id", LogicalType::Int64)],
                primary_key_name: "id".into(),
            })
            .unwrap_err();
        assert_eq!(err, CatalogError::TableExists("T".to_string()));
    }

    #[test]
    fn rel_table_registers_fwd_bwd_adjacency() {
        let mut cat = Catalog::new();
        let a = cat
            .create_node_table(CreateNodeTableInfo {
                name: "A".into(),
                properties: vec![PropertySpec::new("id", LogicalType::Int64)],
                primary_key_name: "id".into(),
            })
            .unwrap();
        let b = cat
            .create_node_table(CreateNodeTableInfo {
                name: "B".into(),
                properties: vec![PropertySpec::new("id", LogicalType::Int64)],
                primary_key_name: "id".into(),
            })
            .unwrap();
        let r = cat
            .create_rel_table(CreateRelTableInfo {
                name: "R".into(),
                src_table_id: a,
                dst_table_id: b,
                src_multiplicity: Multiplicity::Many,
                dst_multiplicity: Multiplicity::Many,
                properties: vec![],
            })
            .unwrap();
        assert!(cat.get_node_table(a).unwrap().fwd_rel_table_ids.contains(&r));
        assert!(cat.get_node_table(b).unwrap().bwd_rel_table_ids.contains(&r));
        assert_eq!(cat.incident_rel_tables(a), vec![r]);
    }

    #[test]
    fn dropping_rel_group_drops_children() {
        let mut cat = Catalog::new();
        let a = cat
            .create_node_table(CreateNodeTableInfo {
                name: "A".into(),
                properties: vec![PropertySpec::new("id", LogicalType::Int64)],
                primary_key_name: "id".into(),
            })
            .unwrap();
        let group = cat
            .create_rel_group(CreateRelGroupInfo {
                name: "G".into(),
                children: vec![CreateRelTableInfo {
                    name: "G_A_A".into(),
                    src_table_id: a,
                    dst_table_id: a,
                    src_multiplicity: Multiplicity::Many,
                    dst_multiplicity: Multiplicity::Many,
                    properties: vec![],
                }],
            })
            .unwrap();
        cat.drop_table(group).unwrap();
        assert!(!cat.contains_table("G"));
        assert!(!cat.contains_table("G_A_A"));
        assert!(cat.get_node_table(a).unwrap().fwd_rel_table_ids.is_empty());
    }
}
