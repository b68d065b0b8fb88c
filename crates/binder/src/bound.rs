//! The bound tree: fully resolved statements the planner (out of scope)
//! would consume next (§4.2).

use gq_catalog::{CreateIndexInfo, CreateNodeTableInfo, CreateRelGroupInfo, CreateRelTableInfo, PropertySpec};
use gq_common::TableId;
use gq_expr::Expression;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnEvaluateType {
    Reference,
    Cast,
    Default,
}

/// Per-endpoint primary-key lookup the rel-copy phase-two pass performs:
/// resolve `keyExpr` against the endpoint table's PK index to produce the
/// internal offset written into `offsetExpr`'s column.
#[derive(Debug, Clone)]
pub struct IndexLookupInfo {
    pub table_id: TableId,
    pub offset_expr: Expression,
    pub key_expr: Expression,
}

#[derive(Debug, Clone)]
pub struct ExtraCopyRelInfo {
    /// Indices into `BoundCopyFromInfo::columns` of `src_offset`, `dst_offset`, `row_offset`.
    pub internal_id_column_indices: [usize; 3],
    pub src_lookup: IndexLookupInfo,
    pub dst_lookup: IndexLookupInfo,
}

#[derive(Debug, Clone)]
pub struct BoundCopyFromInfo {
    pub table_id: TableId,
    pub source_columns: Vec<(String, gq_common::LogicalType)>,
    pub row_offset_expr: Expression,
    pub columns: Vec<Expression>,
    pub evaluate_types: Vec<ColumnEvaluateType>,
    pub extra: Option<ExtraCopyRelInfo>,
}

#[derive(Debug, Clone)]
pub struct BoundCopyFrom {
    pub info: BoundCopyFromInfo,
}

#[derive(Debug, Clone)]
pub enum BoundCreateTable {
    Node(CreateNodeTableInfoOwned),
    Rel(CreateRelTableInfoOwned),
    RelGroup(CreateRelGroupInfoOwned),
}

// gq-catalog's Create*Info structs are not `Clone`-friendly call-by-value
// builders; the binder owns its own copies so a bound statement can be
// inspected without consuming the catalog-facing info.
#[derive(Debug, Clone)]
pub struct CreateNodeTableInfoOwned {
    pub name: String,
    pub properties: Vec<PropertySpecOwned>,
    pub primary_key_name: String,
}

#[derive(Debug, Clone)]
pub struct CreateRelTableInfoOwned {
    pub name: String,
    pub src_table_id: TableId,
    pub dst_table_id: TableId,
    pub src_multiplicity: gq_common::Multiplicity,
    pub dst_multiplicity: gq_common::Multiplicity,
    pub properties: Vec<PropertySpecOwned>,
}

#[derive(Debug, Clone)]
pub struct CreateRelGroupInfoOwned {
    pub name: String,
    pub children: Vec<CreateRelTableInfoOwned>,
}

#[derive(Debug, Clone)]
pub struct PropertySpecOwned {
    pub name: String,
    pub logical_type: gq_common::LogicalType,
    pub default: gq_common::Value,
}

impl From<PropertySpecOwned> for PropertySpec {
    fn from(p: PropertySpecOwned) -> Self {
        PropertySpec::new(p.name, p.logical_type).with_default(p.default)
    }
}

impl From<CreateNodeTableInfoOwned> for CreateNodeTableInfo {
    fn from(i: CreateNodeTableInfoOwned) -> Self {
        CreateNodeTableInfo {
            name: i.name,
            properties: i.properties.into_iter().map(Into::into).collect(),
            primary_key_name: i.primary_key_name,
        }
    }
}

impl From<CreateRelTableInfoOwned> for CreateRelTableInfo {
    fn from(i: CreateRelTableInfoOwned) -> Self {
        CreateRelTableInfo {
            name: i.name,
            src_table_id: i.src_table_id,
            dst_table_id: i.dst_table_id,
            src_multiplicity: i.src_multiplicity,
            dst_multiplicity: i.dst_multiplicity,
            properties: i.properties.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<CreateRelGroupInfoOwned> for CreateRelGroupInfo {
    fn from(i: CreateRelGroupInfoOwned) -> Self {
        CreateRelGroupInfo {
            name: i.name,
            children: i.children.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct BoundDropTable {
    pub table_id: TableId,
}

#[derive(Debug, Clone)]
pub enum BoundAlterAction {
    RenameTable { new_name: String },
    RenameProperty { old_name: String, new_name: String },
    AddProperty(PropertySpecOwned),
    DropProperty { name: String },
    SetComment { comment: String },
}

#[derive(Debug, Clone)]
pub struct BoundAlter {
    pub table_id: TableId,
    pub action: BoundAlterAction,
}

#[derive(Debug, Clone)]
pub struct BoundCreateIndex {
    pub info: CreateIndexInfoOwned,
}

#[derive(Debug, Clone)]
pub struct CreateIndexInfoOwned {
    pub table_id: TableId,
    pub name: String,
    pub property_ids: Vec<gq_common::PropertyId>,
    pub kind: gq_catalog::IndexKind,
    pub aux: Vec<u8>,
}

impl From<CreateIndexInfoOwned> for CreateIndexInfo {
    fn from(i: CreateIndexInfoOwned) -> Self {
        CreateIndexInfo {
            table_id: i.table_id,
            name: i.name,
            property_ids: i.property_ids,
            kind: i.kind,
            aux: i.aux,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BoundDropIndex {
    pub table_id: TableId,
    pub index_id: gq_common::IndexId,
}

#[derive(Debug, Clone)]
pub enum BoundStatement {
    CopyFrom(BoundCopyFrom),
    CreateTable(BoundCreateTable),
    DropTable(BoundDropTable),
    Alter(BoundAlter),
    CreateIndex(BoundCreateIndex),
    DropIndex(BoundDropIndex),
}
