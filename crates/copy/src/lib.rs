//! COPY FROM ingest engine (§4.5): block layout, a primary-key index
//! builder, and the two physical shapes — node copy (columns + PK index)
//! and two-phase rel copy (CSR adjacency lists built from counted sizes).

pub mod block;
pub mod error;
pub mod node_copy;
pub mod pk_index;
pub mod rel_copy;

pub use block::{plan_blocks, Block, DEFAULT_BLOCK_SIZE};
pub use error::{CopyError, Direction, Result};
pub use node_copy::{copy_node_from, ColumnSource, ColumnSpec, NodeCopyResult};
pub use pk_index::{PkIndex, PkKey};
pub use rel_copy::{copy_rel_from, DirectionData, RelCopyPlan, RelCopyResult};
