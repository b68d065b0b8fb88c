//! Top-level façade (§1, §7): wires the binder, expression evaluator,
//! copy-from ingest, storage manager and HNSW vector index together behind
//! one `Database` surface, the way `spacetimedb-core` wires its subsystems
//! behind `RelationalDB`.

pub mod copy_exec;
pub mod database;
pub mod error;

pub use database::{DdlOutcome, Database};
pub use error::{EngineError, Result};
