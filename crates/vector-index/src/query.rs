//! `CALL QUERY_HNSW_INDEX(indexName, queryVector, k, efs)` (SPEC_FULL
//! §4.7 **[FULL-ADD]**): the read counterpart of construction. Without
//! this the index has no externally observable behavior beyond
//! create/drop.

use crate::config::value_to_vector;
use crate::error::{Result, VectorIndexError};
use crate::graph::InMemHnswIndex;
use gq_common::Value;

/// Greedy descent through the upper layer to an entry point, then a
/// bounded best-first search in the lower layer; returns `(nodeOffset,
/// distance)` rows closest-first.
pub fn query_hnsw_index(index: &InMemHnswIndex, query_vector: &Value, k: usize, efs: usize) -> Result<Vec<(u32, f64)>> {
    let query = value_to_vector(query_vector, index.dim).ok_or(VectorIndexError::DimensionMismatch {
        expected: index.dim,
        found: 0,
    })?;
    Ok(index.search(&query, k, efs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DistFunc, HnswConfig};
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn query_returns_k_closest_rows_sorted_ascending() {
        let config = HnswConfig {
            mu: 6,
            ml: 0.5,
            efc: 16,
            dist_func: DistFunc::L2,
            alpha: 1.2,
            pu: 0.2,
        };
        let index = InMemHnswIndex::new(2, config, 8);
        let mut rng = rand::rngs::StdRng::seed_from_u64(3);
        let mut uv = HashSet::new();
        let mut lv = HashSet::new();
        for i in 0..8u32 {
            index.insert(i, vec![i as f32, 0.0], &mut rng, &mut uv, &mut lv);
        }
        index.shrink();

        let query = Value::List(vec![Value::Float(6.2), Value::Float(0.0)]);
        let results = query_hnsw_index(&index, &query, 3, 16).unwrap();
        assert_eq!(results.len(), 3);
        for pair in results.windows(2) {
            assert!(pair[0].1 <= pair[1].1);
        }
    }

    #[test]
    fn dimension_mismatch_is_rejected() {
        let index = InMemHnswIndex::new(3, HnswConfig::default(), 1);
        let query = Value::List(vec![Value::Float(1.0), Value::Float(2.0)]);
        let err = query_hnsw_index(&index, &query, 1, 10).unwrap_err();
        assert!(matches!(err, VectorIndexError::DimensionMismatch { .. }));
    }
}
