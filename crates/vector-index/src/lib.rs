//! Two-layer HNSW vector index (§4.7): built atop two auxiliary
//! relationship tables whose endpoints are both the indexed node table.
//! Construction is exposed as the `_CREATE_HNSW_INDEX` table function;
//! querying as `QUERY_HNSW_INDEX` (SPEC_FULL §4.7 **[FULL-ADD]**).

pub mod aux;
pub mod config;
pub mod create;
pub mod error;
pub mod graph;
pub mod query;

pub use aux::HnswIndexAuxInfo;
pub use config::{fixed_list_dimension, value_to_vector, DistFunc, HnswConfig};
pub use create::{bind_create_hnsw_index, create_hnsw_index, drop_hnsw_index, CreateHnswResult, CreateHnswSharedState};
pub use error::{Result, VectorIndexError};
pub use graph::InMemHnswIndex;
pub use query::query_hnsw_index;
