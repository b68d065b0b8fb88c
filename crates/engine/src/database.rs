//! `Database` (§1, §4.6): the session-facing façade tying the binder,
//! gq-copy and the HNSW vector index together behind one DDL/COPY FROM/
//! index-maintenance surface, the way `RelationalDB` ties the commit log
//! and datastore together in the original
//! (`crates/core/src/db/relational_db.rs`).

use crate::copy_exec::{node_column_specs_for, rel_copy_plan_for};
use crate::error::{EngineError, Result};
use gq_binder::bound::{BoundAlterAction, BoundCreateTable, BoundStatement};
use gq_binder::parse_tree::{ParsedCopyFrom, ParsedStatement};
use gq_catalog::{Catalog, TableEntryRef};
use gq_common::{IndexId, TableId, Value};
use gq_copy::{copy_node_from, copy_rel_from, PkIndex};
use gq_storage::table::{NodeTable, RelTable};
use gq_storage::{StorageManager, Transaction};
use gq_vector_index::{create_hnsw_index, drop_hnsw_index, query_hnsw_index, CreateHnswResult, HnswConfig, InMemHnswIndex};
use std::path::Path;
use tracing::{debug, info};

pub struct Database {
    manager: StorageManager,
}

/// What a DDL statement resolved to, for callers that want the new id.
#[derive(Debug, Clone, Copy)]
pub enum DdlOutcome {
    Table(TableId),
    Index(IndexId),
    None,
}

fn apply_alter(catalog: &mut Catalog, table_id: TableId, action: BoundAlterAction) -> gq_catalog::Result<()> {
    match action {
        BoundAlterAction::RenameTable { new_name } => catalog.rename_table(table_id, &new_name)?,
        BoundAlterAction::RenameProperty { old_name, new_name } => catalog.rename_property(table_id, &old_name, &new_name)?,
        BoundAlterAction::AddProperty(spec) => {
            catalog.add_property(table_id, spec.into())?;
        }
        BoundAlterAction::DropProperty { name } => catalog.drop_property(table_id, &name)?,
        BoundAlterAction::SetComment { comment } => catalog.set_comment(table_id, &comment)?,
    }
    Ok(())
}

impl Database {
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        Ok(Database {
            manager: StorageManager::open(dir)?,
        })
    }

    pub fn with_catalog<R>(&self, f: impl FnOnce(&Catalog) -> R) -> R {
        self.manager.with_catalog(f)
    }

    pub fn with_node_table<R>(&self, id: TableId, f: impl FnOnce(Option<&NodeTable>) -> R) -> R {
        self.manager.with_node_table(id, f)
    }

    pub fn with_rel_table<R>(&self, id: TableId, f: impl FnOnce(Option<&RelTable>) -> R) -> R {
        self.manager.with_rel_table(id, f)
    }

    /// Binds and applies every DDL statement but `CopyFrom` (which needs the
    /// source rows `execute_copy_from` takes separately) in its own
    /// write transaction.
    pub fn execute_ddl(&self, stmt: &ParsedStatement) -> Result<DdlOutcome> {
        let mut tx = self.manager.begin_write_transaction()?;
        let bound = gq_binder::bind(&tx.catalog, stmt)?;
        let outcome = match bound {
            BoundStatement::CreateTable(BoundCreateTable::Node(info)) => DdlOutcome::Table(tx.catalog.create_node_table(info.into())?),
            BoundStatement::CreateTable(BoundCreateTable::Rel(info)) => DdlOutcome::Table(tx.catalog.create_rel_table(info.into())?),
            BoundStatement::CreateTable(BoundCreateTable::RelGroup(info)) => DdlOutcome::Table(tx.catalog.create_rel_group(info.into())?),
            BoundStatement::DropTable(d) => {
                tx.catalog.drop_table(d.table_id)?;
                DdlOutcome::None
            }
            BoundStatement::Alter(a) => {
                apply_alter(&mut tx.catalog, a.table_id, a.action)?;
                DdlOutcome::None
            }
            BoundStatement::CreateIndex(c) => DdlOutcome::Index(tx.catalog.create_index(c.info.into())?),
            BoundStatement::DropIndex(d) => {
                tx.catalog.drop_index(d.index_id)?;
                DdlOutcome::None
            }
            BoundStatement::CopyFrom(_) => return Err(EngineError::MissingRelCopyInfo("COPY FROM must go through execute_copy_from".to_string())),
        };
        debug!(?outcome, "executing DDL statement");
        self.manager.commit(tx)?;
        Ok(outcome)
    }

    /// The PK index and row count of a rel endpoint's node table, whichever
    /// side it's visible from: already staged in this transaction (an
    /// earlier COPY FROM in the same transaction), or already committed.
    fn endpoint_pk_index(&self, tx: &Transaction, table_id: TableId) -> Result<(PkIndex, usize)> {
        if let Some(table) = tx.staged_node_table(table_id) {
            return Ok((table.pk_index.clone(), table.row_count()));
        }
        self.manager
            .with_node_table(table_id, |t| t.map(|t| (t.pk_index.clone(), t.row_count())))
            .ok_or_else(|| EngineError::EndpointTableNotStaged(table_id.to_string()))
    }

    /// Binds `stmt` and runs the COPY FROM against already-tokenized rows
    /// (reading and header-sniffing the source file is the out-of-scope
    /// surface parser's job; this consumes its output).
    pub fn execute_copy_from(&self, stmt: &ParsedCopyFrom, rows: &[csv::StringRecord]) -> Result<usize> {
        let mut tx = self.manager.begin_write_transaction()?;
        let catalog_snapshot = tx.catalog.clone();
        let bound = gq_binder::bind_copy_from::bind_copy_from(&catalog_snapshot, stmt)?;
        let info = bound.info;

        let row_count = match catalog_snapshot.get_table_entry(info.table_id) {
            Some(TableEntryRef::Node(_)) => {
                let specs = node_column_specs_for(&catalog_snapshot, &info, &stmt.column_names)?;
                let result = copy_node_from(rows, &specs, &stmt.table_name)?;
                let row_count = result.row_count;
                tx.stage_node_table(NodeTable::from_copy_result(info.table_id, result));
                row_count
            }
            Some(TableEntryRef::Rel(rel)) => {
                let (src_pk_index, num_src_nodes) = self.endpoint_pk_index(&tx, rel.src_table_id)?;
                let (dst_pk_index, num_dst_nodes) = self.endpoint_pk_index(&tx, rel.dst_table_id)?;
                let plan = rel_copy_plan_for(&catalog_snapshot, &info)?;
                let result = copy_rel_from(rows, &plan, &src_pk_index, &dst_pk_index, num_src_nodes, num_dst_nodes, &stmt.table_name)?;
                let row_count = result.row_count;
                tx.stage_rel_table(RelTable::from_copy_result(info.table_id, result));
                row_count
            }
            _ => return Err(EngineError::Catalog(gq_catalog::CatalogError::TableNotFound(stmt.table_name.clone()))),
        };
        debug!(table = %stmt.table_name, row_count, "copy from staged");
        self.manager.commit(tx)?;
        Ok(row_count)
    }

    /// §4.7 step 1-4: builds the in-memory HNSW graph over `vectors` (every
    /// row's `(node_offset, raw_property_value)`, dense over
    /// `0..vectors.len()`) and registers the index, returning the edge lists
    /// a rel-table batch insert would consume, all within one transaction.
    pub fn create_hnsw_index(
        &self,
        table_name: &str,
        column_name: &str,
        index_name: &str,
        vectors: &[(u32, Value)],
        config: HnswConfig,
    ) -> Result<CreateHnswResult> {
        let mut tx = self.manager.begin_write_transaction()?;
        let result = create_hnsw_index(&mut tx.catalog, table_name, column_name, index_name, vectors, config)?;

        tx.stage_rel_table(rel_table_from_edges(result.upper_rel_table_id, &result.upper_edges));
        tx.stage_rel_table(rel_table_from_edges(result.lower_rel_table_id, &result.lower_edges));

        info!(index = index_name, nodes = vectors.len(), "created HNSW index");
        self.manager.commit(tx)?;
        Ok(result)
    }

    pub fn query_hnsw_index(&self, index: &InMemHnswIndex, query_vector: &Value, k: usize, efs: usize) -> Result<Vec<(u32, f64)>> {
        Ok(query_hnsw_index(index, query_vector, k, efs)?)
    }

    pub fn drop_hnsw_index(&self, index_id: IndexId) -> Result<()> {
        let mut tx = self.manager.begin_write_transaction()?;
        drop_hnsw_index(&mut tx.catalog, index_id)?;
        self.manager.commit(tx)?;
        Ok(())
    }
}

/// Turns a deduplicated undirected edge list into the `fwd`/`bwd` CSR pair a
/// MANY/MANY `RelTable` stores (§4.7 step 4), treating each `(a, b)` edge as
/// one relationship row: `fwd` buckets by `a` and neighbors on `b`, `bwd`
/// buckets by `b` and neighbors on `a` — the same back-to-front placement
/// `gq_copy::rel_copy` uses for an ordinary COPY FROM.
fn rel_table_from_edges(table_id: TableId, edges: &[(u32, u32)]) -> RelTable {
    use gq_common::InternalOffset;
    use gq_copy::DirectionData;

    let max_node = edges.iter().flat_map(|(a, b)| [*a, *b]).max().map(|m| m as usize + 1).unwrap_or(0);
    let a_offsets: Vec<InternalOffset> = edges.iter().map(|(a, _)| InternalOffset(*a as u64)).collect();
    let b_offsets: Vec<InternalOffset> = edges.iter().map(|(_, b)| InternalOffset(*b as u64)).collect();

    let mut fwd_counts = vec![0u64; max_node];
    let mut bwd_counts = vec![0u64; max_node];
    for (a, b) in edges {
        fwd_counts[*a as usize] += 1;
        bwd_counts[*b as usize] += 1;
    }

    let fwd = build_csr(&fwd_counts, &a_offsets, &b_offsets);
    let bwd = build_csr(&bwd_counts, &b_offsets, &a_offsets);

    RelTable {
        table_id,
        fwd,
        bwd,
        property_names: vec![],
        properties: vec![],
        row_count: edges.len(),
    }
}

/// Owner-bucketed CSR build with the `decrementListSize` back-to-front
/// placement pass, mirroring `gq_copy::rel_copy`'s private helper of the
/// same shape (this crate's input is an edge list, not CSV rows, so it
/// cannot reuse that one directly).
fn build_csr(counts: &[u64], owner_offsets: &[gq_common::InternalOffset], neighbor_offsets: &[gq_common::InternalOffset]) -> gq_copy::DirectionData {
    let mut offsets = Vec::with_capacity(counts.len() + 1);
    let mut running = 0u64;
    for &c in counts {
        offsets.push(running);
        running += c;
    }
    offsets.push(running);

    let mut remaining = counts.to_vec();
    let mut neighbors = vec![gq_common::InternalOffset(0); running as usize];
    let mut csr_row_order = vec![0usize; running as usize];
    for row in 0..owner_offsets.len() {
        let node = owner_offsets[row].0 as usize;
        remaining[node] -= 1;
        let pos = offsets[node] + remaining[node];
        neighbors[pos as usize] = neighbor_offsets[row];
        csr_row_order[pos as usize] = row;
    }
    gq_copy::DirectionData::Multi {
        offsets,
        neighbors,
        csr_row_order,
    }
}
