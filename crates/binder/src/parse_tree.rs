//! A minimal parse-tree IR standing in for the out-of-scope surface parser.
//!
//! Nothing in this repository constructs these from query text; they are
//! the shape a parser would hand the binder, kept just expressive enough to
//! exercise every bind path this crate implements.

use gq_catalog::IndexKind;
use gq_common::{LogicalType, Multiplicity, Value};
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct ParsedPropertyDef {
    pub name: String,
    pub logical_type: LogicalType,
    pub default: Option<Value>,
}

#[derive(Debug, Clone)]
pub struct ParsedCreateNodeTable {
    pub table_name: String,
    pub properties: Vec<ParsedPropertyDef>,
    pub primary_key_name: String,
}

#[derive(Debug, Clone)]
pub struct ParsedCreateRelTable {
    pub table_name: String,
    pub src_table_name: String,
    pub dst_table_name: String,
    pub src_multiplicity: Multiplicity,
    pub dst_multiplicity: Multiplicity,
    pub properties: Vec<ParsedPropertyDef>,
}

#[derive(Debug, Clone)]
pub struct ParsedCreateRelGroup {
    pub group_name: String,
    pub children: Vec<ParsedCreateRelTable>,
}

#[derive(Debug, Clone)]
pub struct ParsedDropTable {
    pub table_name: String,
}

#[derive(Debug, Clone)]
pub enum ParsedAlterAction {
    RenameTable { new_name: String },
    RenameProperty { old_name: String, new_name: String },
    AddProperty(ParsedPropertyDef),
    DropProperty { name: String },
    SetComment { comment: String },
}

#[derive(Debug, Clone)]
pub struct ParsedAlter {
    pub table_name: String,
    pub action: ParsedAlterAction,
}

#[derive(Debug, Clone)]
pub struct ParsedCreateIndex {
    pub table_name: String,
    pub index_name: String,
    pub property_names: Vec<String>,
    pub kind: IndexKind,
    pub aux: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct ParsedDropIndex {
    pub table_name: String,
    pub index_name: String,
}

/// A column the not-yet-built physical scan would expose, paired with its
/// inferred logical type; `bind_scan_source` in the original binder derives
/// this from the file's header. Here the parse tree simply carries it.
#[derive(Debug, Clone)]
pub struct ParsedScanColumn {
    pub name: String,
    pub logical_type: LogicalType,
}

#[derive(Debug, Clone, Default)]
pub struct ParsedCopyFrom {
    pub table_name: String,
    /// Explicit `COPY t(col1, col2) FROM ...` column list; empty means "use schema order".
    pub column_names: Vec<String>,
    pub by_column: bool,
    pub source_columns: Vec<ParsedScanColumn>,
    pub parsing_options: HashMap<String, String>,
}

#[derive(Debug, Clone)]
pub enum ParsedStatement {
    CreateNodeTable(ParsedCreateNodeTable),
    CreateRelTable(ParsedCreateRelTable),
    CreateRelGroup(ParsedCreateRelGroup),
    DropTable(ParsedDropTable),
    Alter(ParsedAlter),
    CreateIndex(ParsedCreateIndex),
    DropIndex(ParsedDropIndex),
    CopyFrom(ParsedCopyFrom),
}
