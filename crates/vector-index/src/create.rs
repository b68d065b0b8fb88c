//! `CALL _CREATE_HNSW_INDEX` (§4.7 steps 1-4): bind (validate the column,
//! allocate shared state), rewrite (the two auxiliary rel tables), execute
//! (parallel morsel insert) and finalize (shrink + register the catalog
//! entry).

use crate::aux::HnswIndexAuxInfo;
use crate::config::{fixed_list_dimension, value_to_vector, HnswConfig};
use crate::error::{Result, VectorIndexError};
use crate::graph::InMemHnswIndex;
use gq_catalog::{Catalog, CreateIndexInfo, CreateRelTableInfo, IndexKind};
use gq_common::{IndexId, Multiplicity, TableId, Value};
use rand::SeedableRng;
use rayon::prelude::*;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Per-index shared state for the morsel-parallel construction pass
/// (§4.7 step 3): the in-memory graph every worker inserts into, plus an
/// `inserted`/`total` counter for progress reporting.
pub struct CreateHnswSharedState {
    pub in_mem_index: Arc<InMemHnswIndex>,
    pub total_nodes: usize,
    inserted: AtomicUsize,
}

impl CreateHnswSharedState {
    pub fn progress(&self) -> f64 {
        if self.total_nodes == 0 {
            1.0
        } else {
            self.inserted.load(Ordering::Relaxed) as f64 / self.total_nodes as f64
        }
    }
}

pub struct CreateHnswResult {
    pub index_id: IndexId,
    pub upper_rel_table_id: TableId,
    pub lower_rel_table_id: TableId,
    pub index: Arc<InMemHnswIndex>,
    /// Deduplicated undirected edges in each layer, ready for a rel-table
    /// batch insert (the physical batch-insert operator itself is out of
    /// scope per §1; this is the edge list it would consume).
    pub upper_edges: Vec<(u32, u32)>,
    pub lower_edges: Vec<(u32, u32)>,
}

/// §4.7 step 1 "Bind": validates the column type and returns its vector
/// dimension.
pub fn bind_create_hnsw_index(catalog: &Catalog, table_name: &str, column_name: &str) -> Result<usize> {
    let table_id = catalog
        .get_table_id(table_name)
        .ok_or_else(|| VectorIndexError::TableNotFound(table_name.to_string()))?;
    let table = catalog
        .get_node_table(table_id)
        .ok_or_else(|| VectorIndexError::TableNotFound(table_name.to_string()))?;
    let property = table
        .get_property(column_name)
        .ok_or_else(|| VectorIndexError::UnsupportedColumnType(column_name.to_string()))?;
    fixed_list_dimension(&property.logical_type).ok_or_else(|| VectorIndexError::UnsupportedColumnType(column_name.to_string()))
}

/// §4.7 steps 2-4 end to end: creates the `upper_<name>`/`lower_<name>` rel
/// tables, builds the in-memory graph in parallel over `vectors`, shrinks
/// and finalizes it, and registers the `IndexEntry`.
///
/// `vectors` is `(node_offset, raw_property_value)` for every row of the
/// indexed table; `node_offset` must be dense (`0..vectors.len()` after
/// sorting, which the caller is responsible for since row order is a
/// storage-layer concern out of this crate's scope).
pub fn create_hnsw_index(
    catalog: &mut Catalog,
    table_name: &str,
    column_name: &str,
    index_name: &str,
    vectors: &[(u32, Value)],
    config: HnswConfig,
) -> Result<CreateHnswResult> {
    let dim = bind_create_hnsw_index(catalog, table_name, column_name)?;
    let table_id = catalog.get_table_id(table_name).expect("validated above");

    if catalog.contains_index(table_id, index_name) {
        return Err(VectorIndexError::Catalog(gq_catalog::CatalogError::IndexExists(index_name.to_string())));
    }

    let upper_name = format!("upper_{index_name}");
    let lower_name = format!("lower_{index_name}");
    let upper_rel_table_id = catalog.create_rel_table(CreateRelTableInfo {
        name: upper_name,
        src_table_id: table_id,
        dst_table_id: table_id,
        src_multiplicity: Multiplicity::Many,
        dst_multiplicity: Multiplicity::Many,
        properties: vec![],
    })?;
    let lower_rel_table_id = catalog.create_rel_table(CreateRelTableInfo {
        name: lower_name,
        src_table_id: table_id,
        dst_table_id: table_id,
        src_multiplicity: Multiplicity::Many,
        dst_multiplicity: Multiplicity::Many,
        properties: vec![],
    })?;

    let capacity = vectors.iter().map(|(offset, _)| *offset as usize + 1).max().unwrap_or(0);
    let shared = CreateHnswSharedState {
        in_mem_index: Arc::new(InMemHnswIndex::new(dim, config, capacity)),
        total_nodes: vectors.len(),
        inserted: AtomicUsize::new(0),
    };

    // §4.7 step 3: one morsel per node offset, thread-local scratch sets.
    vectors.par_iter().try_for_each(|(node_offset, value)| -> Result<()> {
        let vector = value_to_vector(value, dim).ok_or_else(|| VectorIndexError::DimensionMismatch {
            expected: dim,
            found: 0,
        })?;
        let mut rng = rand::rngs::StdRng::seed_from_u64(*node_offset as u64);
        let mut upper_visited = HashSet::new();
        let mut lower_visited = HashSet::new();
        shared.in_mem_index.insert(*node_offset, vector, &mut rng, &mut upper_visited, &mut lower_visited);
        shared.inserted.fetch_add(1, Ordering::Relaxed);
        Ok(())
    })?;

    // §4.7 step 4: single-threaded shrink + finalize.
    shared.in_mem_index.shrink();
    let (upper_edges, lower_edges) = shared.in_mem_index.finalize();

    let aux = HnswIndexAuxInfo {
        upper_rel_table_id,
        lower_rel_table_id,
        upper_entry_point: shared.in_mem_index.upper_entry_point(),
        lower_entry_point: shared.in_mem_index.lower_entry_point(),
        config,
    };
    let index_id = catalog.create_index(CreateIndexInfo {
        table_id,
        name: index_name.to_string(),
        property_ids: vec![],
        kind: IndexKind::Hnsw,
        aux: aux.serialize(),
    })?;

    Ok(CreateHnswResult {
        index_id,
        upper_rel_table_id,
        lower_rel_table_id,
        index: shared.in_mem_index,
        upper_edges,
        lower_edges,
    })
}

/// Symmetric drop (§4.7 "Drop is symmetric"): drop the index catalog entry,
/// then the two auxiliary rel tables.
pub fn drop_hnsw_index(catalog: &mut Catalog, index_id: IndexId) -> Result<()> {
    let entry = catalog
        .get_index(index_id)
        .ok_or_else(|| VectorIndexError::IndexNotFound(format!("id {index_id}")))?
        .clone();
    let aux = HnswIndexAuxInfo::deserialize(&entry.aux).expect("HNSW index aux bytes must round-trip");
    catalog.drop_index(index_id)?;
    catalog.drop_table(aux.upper_rel_table_id)?;
    catalog.drop_table(aux.lower_rel_table_id)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DistFunc;
    use gq_catalog::{CreateNodeTableInfo, PropertySpec};
    use gq_common::LogicalType;

    fn node_table_with_embedding(catalog: &mut Catalog) -> TableId {
        catalog
            .create_node_table(CreateNodeTableInfo {
                name: "Doc".into(),
                properties: vec![
                    PropertySpec::new("id", LogicalType::Int64),
                    PropertySpec::new(
                        "embedding",
                        LogicalType::FixedList {
                            child: Box::new(LogicalType::Float),
                            num_elements: 2,
                        },
                    ),
                ],
                primary_key_name: "id".into(),
            })
            .unwrap()
    }

    fn test_config() -> HnswConfig {
        HnswConfig {
            mu: 4,
            ml: 0.5,
            efc: 8,
            dist_func: DistFunc::L2,
            alpha: 1.2,
            pu: 0.2,
        }
    }

    #[test]
    fn bind_rejects_a_non_vector_column() {
        let mut catalog = Catalog::new();
        node_table_with_embedding(&mut catalog);
        let err = bind_create_hnsw_index(&catalog, "Doc", "id").unwrap_err();
        assert!(matches!(err, VectorIndexError::UnsupportedColumnType(_)));
    }

    #[test]
    fn create_then_drop_leaves_the_node_table_and_catalog_untouched() {
        let mut catalog = Catalog::new();
        let table_id = node_table_with_embedding(&mut catalog);
        let vectors: Vec<(u32, Value)> = (0..6)
            .map(|i| (i, Value::List(vec![Value::Float(i as f32), Value::Float(0.0)])))
            .collect();

        let result = create_hnsw_index(&mut catalog, "Doc", "embedding", "doc_idx", &vectors, test_config()).unwrap();
        assert!(catalog.contains_index(table_id, "doc_idx"));
        assert!(catalog.contains_table("upper_doc_idx"));
        assert!(catalog.contains_table("lower_doc_idx"));
        assert!(!result.lower_edges.is_empty());

        drop_hnsw_index(&mut catalog, result.index_id).unwrap();
        assert!(!catalog.contains_index(table_id, "doc_idx"));
        assert!(!catalog.contains_table("upper_doc_idx"));
        assert!(!catalog.contains_table("lower_doc_idx"));
        assert!(catalog.contains_table("Doc"));
    }

    #[test]
    fn duplicate_index_name_on_the_same_table_is_rejected() {
        let mut catalog = Catalog::new();
        node_table_with_embedding(&mut catalog);
        let vectors = vec![(0u32, Value::List(vec![Value::Float(0.0), Value::Float(0.0)]))];
        create_hnsw_index(&mut catalog, "Doc", "embedding", "doc_idx", &vectors, test_config()).unwrap();
        let err = create_hnsw_index(&mut catalog, "Doc", "embedding", "doc_idx", &vectors, test_config()).unwrap_err();
        assert!(matches!(err, VectorIndexError::Catalog(gq_catalog::CatalogError::IndexExists(_))));
    }
}
