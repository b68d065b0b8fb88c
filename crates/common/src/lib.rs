//! Shared ids, logical types and runtime values for the graph query engine.
//!
//! Every other crate in the workspace depends on this one; it owns no
//! behavior beyond type definitions and small pure helpers.

pub mod cursor;
pub mod ids;
pub mod types;
pub mod value;

pub use cursor::Cursor;
pub use ids::{ColumnId, IndexId, InternalOffset, PropertyId, TableId};
pub use types::{LogicalType, Multiplicity, StructField};
pub use value::Value;
