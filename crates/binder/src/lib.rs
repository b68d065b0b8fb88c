//! Turns a parse-tree statement into a fully resolved bound statement
//! (§4.2): name resolution, type inference, implicit casts and internal
//! column injection.

pub mod bind_copy_from;
pub mod bind_ddl;
pub mod bind_subquery;
pub mod bound;
pub mod error;
pub mod expression_binder;
pub mod parse_tree;

pub use error::{BinderError, Result};
pub use parse_tree::ParsedStatement;

use bound::BoundStatement;
use gq_catalog::Catalog;

/// Dispatches a parse-tree statement to its bind routine. Query statements
/// (`MATCH`/`RETURN`/subqueries) are out of scope per the parser boundary;
/// this only covers the DDL and COPY FROM surface the catalog exposes.
pub fn bind(catalog: &Catalog, stmt: &ParsedStatement) -> Result<BoundStatement> {
    Ok(match stmt {
        ParsedStatement::CreateNodeTable(s) => {
            BoundStatement::CreateTable(bound::BoundCreateTable::Node(bind_ddl::bind_create_node_table(s)))
        }
        ParsedStatement::CreateRelTable(s) => {
            BoundStatement::CreateTable(bound::BoundCreateTable::Rel(bind_ddl::bind_create_rel_table(catalog, s)?))
        }
        ParsedStatement::CreateRelGroup(s) => {
            BoundStatement::CreateTable(bound::BoundCreateTable::RelGroup(bind_ddl::bind_create_rel_group(catalog, s)?))
        }
        ParsedStatement::DropTable(s) => BoundStatement::DropTable(bind_ddl::bind_drop_table(catalog, s)?),
        ParsedStatement::Alter(s) => BoundStatement::Alter(bind_ddl::bind_alter(catalog, s)?),
        ParsedStatement::CreateIndex(s) => BoundStatement::CreateIndex(bind_ddl::bind_create_index(catalog, s)?),
        ParsedStatement::DropIndex(s) => BoundStatement::DropIndex(bind_ddl::bind_drop_index(catalog, s)?),
        ParsedStatement::CopyFrom(s) => BoundStatement::CopyFrom(bind_copy_from::bind_copy_from(catalog, s)?),
    })
}
