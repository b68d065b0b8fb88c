//! The in-memory two-layer HNSW graph (§4.7 step 3-4): neighbor-lock
//! sharded adjacency per layer, greedy/best-first search, `shrink` and
//! `finalize`.

use crate::config::HnswConfig;
use parking_lot::{Mutex, RwLock};
use rand::Rng;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};

/// A candidate in a best-first search frontier, ordered by distance
/// (min-heap via `Reverse`-style `Ord` flip).
#[derive(Debug, Clone, Copy, PartialEq)]
struct Candidate {
    dist: f64,
    node: u32,
}
impl Eq for Candidate {}
impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        other.dist.partial_cmp(&self.dist).unwrap_or(Ordering::Equal)
    }
}
impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// The reverse ordering (max-heap) used to keep only the `ef` best
/// candidates found so far.
#[derive(Debug, Clone, Copy, PartialEq)]
struct FarCandidate(Candidate);
impl Eq for FarCandidate {}
impl Ord for FarCandidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.dist.partial_cmp(&other.0.dist).unwrap_or(Ordering::Equal)
    }
}
impl PartialOrd for FarCandidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// One HNSW layer: a per-node neighbor list behind its own lock ("neighbor-
/// lock sharding", §4.7 step 3) so concurrent inserts into disjoint
/// neighborhoods proceed without contending on a single global lock.
pub struct Layer {
    neighbors: Vec<Mutex<Vec<u32>>>,
    entry_point: RwLock<Option<u32>>,
}

impl Layer {
    fn with_capacity(capacity: usize) -> Self {
        Layer {
            neighbors: (0..capacity).map(|_| Mutex::new(Vec::new())).collect(),
            entry_point: RwLock::new(None),
        }
    }

    fn assert_capacity(&self, node: u32) {
        // Nodes are inserted in increasing offset order during construction
        // (§4.5 nodes are copied before edges); capacity is sized up front.
        debug_assert!((node as usize) < self.neighbors.len(), "node offset exceeds preallocated layer capacity");
    }

    pub fn entry_point(&self) -> Option<u32> {
        *self.entry_point.read()
    }

    pub fn neighbors_of(&self, node: u32) -> Vec<u32> {
        self.neighbors[node as usize].lock().clone()
    }

    fn connect(&self, a: u32, b: u32) {
        let mut na = self.neighbors[a as usize].lock();
        if !na.contains(&b) {
            na.push(b);
        }
    }

    fn maybe_set_entry_point(&self, node: u32, pu: f64, rng: &mut impl Rng) {
        let mut ep = self.entry_point.write();
        if ep.is_none() || rng.random::<f64>() < pu {
            *ep = Some(node);
        }
    }
}

pub struct InMemHnswIndex {
    pub dim: usize,
    config: HnswConfig,
    vectors: RwLock<Vec<Option<Vec<f32>>>>,
    pub upper: Layer,
    pub lower: Layer,
}

impl InMemHnswIndex {
    pub fn new(dim: usize, config: HnswConfig, capacity: usize) -> Self {
        InMemHnswIndex {
            dim,
            config,
            vectors: RwLock::new(vec![None; capacity]),
            upper: Layer::with_capacity(capacity),
            lower: Layer::with_capacity(capacity),
        }
    }

    pub fn config(&self) -> HnswConfig {
        self.config
    }

    fn vector_of(&self, node: u32) -> Vec<f32> {
        self.vectors.read()[node as usize]
            .clone()
            .expect("vector_of called on a node that hasn't been inserted yet")
    }

    fn dist(&self, a: &[f32], node: u32) -> f64 {
        self.config.dist_func.distance(a, &self.vector_of(node))
    }

    /// Greedy best-first descent from `entry` toward `query`, stopping when
    /// no neighbor improves on the current closest node. This is the
    /// coarse, single-path search used to cross from the upper layer into
    /// the lower layer's entry point.
    fn greedy_search(&self, layer: &Layer, entry: u32, query: &[f32]) -> u32 {
        let mut current = entry;
        let mut current_dist = self.dist(query, current);
        loop {
            let mut improved = false;
            for neighbor in layer.neighbors_of(current) {
                let d = self.dist(query, neighbor);
                if d < current_dist {
                    current = neighbor;
                    current_dist = d;
                    improved = true;
                }
            }
            if !improved {
                return current;
            }
        }
    }

    /// Bounded best-first search: explores outward from `entry`, keeping
    /// the `ef` closest candidates found. Returns them sorted nearest-first.
    fn beam_search(&self, layer: &Layer, entry: u32, query: &[f32], ef: usize, visited: &mut HashSet<u32>) -> Vec<Candidate> {
        visited.clear();
        visited.insert(entry);
        let mut frontier = BinaryHeap::new();
        let entry_dist = self.dist(query, entry);
        frontier.push(Candidate { dist: entry_dist, node: entry });
        let mut best = BinaryHeap::new();
        best.push(FarCandidate(Candidate { dist: entry_dist, node: entry }));

        while let Some(Candidate { dist, node }) = frontier.pop() {
            let worst_in_best = best.peek().map(|c| c.0.dist).unwrap_or(f64::INFINITY);
            if best.len() >= ef && dist > worst_in_best {
                break;
            }
            for neighbor in layer.neighbors_of(node) {
                if !visited.insert(neighbor) {
                    continue;
                }
                let d = self.dist(query, neighbor);
                if best.len() < ef || d < worst_in_best {
                    frontier.push(Candidate { dist: d, node: neighbor });
                    best.push(FarCandidate(Candidate { dist: d, node: neighbor }));
                    if best.len() > ef {
                        best.pop();
                    }
                }
            }
        }

        let mut out: Vec<Candidate> = best.into_iter().map(|f| f.0).collect();
        out.sort_by(|a, b| a.dist.partial_cmp(&b.dist).unwrap_or(Ordering::Equal));
        out
    }

    /// Relative-neighborhood diversification (`alpha`): keep a candidate
    /// only if no already-selected neighbor lies within `alpha`x closer to
    /// it than the query, which spreads the selected neighbors out instead
    /// of clustering them all on one side of the query point.
    fn select_neighbors(&self, candidates: &[Candidate], m: usize) -> Vec<u32> {
        let mut selected: Vec<Candidate> = Vec::new();
        for &cand in candidates {
            if selected.len() >= m {
                break;
            }
            let dominated = selected
                .iter()
                .any(|s| self.dist(&self.vector_of(cand.node), s.node) * self.config.alpha < cand.dist);
            if !dominated {
                selected.push(cand);
            }
        }
        if selected.len() < m {
            for &cand in candidates {
                if selected.len() >= m {
                    break;
                }
                if !selected.iter().any(|s| s.node == cand.node) {
                    selected.push(cand);
                }
            }
        }
        selected.into_iter().map(|c| c.node).collect()
    }

    /// Inserts `node`'s `vector` into both layers, per §4.7 step 3. Callers
    /// on different worker threads may call this concurrently as long as
    /// each passes its own scratch `upper_visited`/`lower_visited` sets —
    /// the index itself only ever takes per-node locks.
    pub fn insert(&self, node: u32, vector: Vec<f32>, rng: &mut impl Rng, upper_visited: &mut HashSet<u32>, lower_visited: &mut HashSet<u32>) {
        self.upper.assert_capacity(node);
        self.lower.assert_capacity(node);
        assert_eq!(vector.len(), self.dim, "vector dimension mismatch on insert");
        self.vectors.write()[node as usize] = Some(vector.clone());

        let lower_entry = match self.upper.entry_point() {
            Some(upper_entry) => {
                let best_upper = self.greedy_search(&self.upper, upper_entry, &vector);
                // Descend to the lower layer at the point closest to the
                // query the upper layer could find.
                self.lower.entry_point().map(|le| {
                    let candidates = self.beam_search(&self.lower, le, &vector, 1.max(1), lower_visited);
                    candidates
                        .first()
                        .map(|c| c.node)
                        .unwrap_or(best_upper)
                })
            }
            None => None,
        };
        let lower_entry = lower_entry.or_else(|| self.lower.entry_point());

        match lower_entry {
            Some(entry) => {
                let candidates = self.beam_search(&self.lower, entry, &vector, self.config.efc, lower_visited);
                let chosen = self.select_neighbors(&candidates, self.config.mu);
                for &other in &chosen {
                    self.lower.connect(node, other);
                    self.lower.connect(other, node);
                }
            }
            None => {}
        }
        self.lower.maybe_set_entry_point(node, self.config.pu, rng);

        if rng.random::<f64>() < self.config.ml {
            match self.upper.entry_point() {
                Some(entry) => {
                    let candidates = self.beam_search(&self.upper, entry, &vector, self.config.efc, upper_visited);
                    let chosen = self.select_neighbors(&candidates, self.config.mu);
                    for &other in &chosen {
                        self.upper.connect(node, other);
                        self.upper.connect(other, node);
                    }
                }
                None => {}
            }
            self.upper.maybe_set_entry_point(node, self.config.pu, rng);
        }
    }

    /// §4.7 step 4 "shrink": trims every node's neighbor list in both
    /// layers down to `mu`, keeping the closest.
    pub fn shrink(&self) {
        for layer in [&self.upper, &self.lower] {
            for node in 0..layer.neighbors.len() {
                let node = node as u32;
                let vectors = self.vectors.read();
                if vectors[node as usize].is_none() {
                    continue;
                }
                let query = vectors[node as usize].clone().unwrap();
                drop(vectors);
                let mut neighbors = layer.neighbors[node as usize].lock();
                if neighbors.len() <= self.config.mu {
                    continue;
                }
                let mut scored: Vec<Candidate> = neighbors.iter().map(|&n| Candidate { dist: self.dist(&query, n), node: n }).collect();
                scored.sort_by(|a, b| a.dist.partial_cmp(&b.dist).unwrap_or(Ordering::Equal));
                scored.truncate(self.config.mu);
                *neighbors = scored.into_iter().map(|c| c.node).collect();
            }
        }
    }

    /// §4.7 step 4 "finalize": flattens each layer's adjacency into a
    /// deduplicated undirected edge list (`i < j`) ready for a rel-table
    /// batch insert.
    pub fn finalize(&self) -> (Vec<(u32, u32)>, Vec<(u32, u32)>) {
        let flatten = |layer: &Layer| -> Vec<(u32, u32)> {
            let mut edges = Vec::new();
            let mut seen = HashSet::new();
            for node in 0..layer.neighbors.len() {
                let node = node as u32;
                for neighbor in layer.neighbors_of(node) {
                    let key = (node.min(neighbor), node.max(neighbor));
                    if seen.insert(key) {
                        edges.push(key);
                    }
                }
            }
            edges
        };
        (flatten(&self.upper), flatten(&self.lower))
    }

    pub fn upper_entry_point(&self) -> Option<u32> {
        self.upper.entry_point()
    }

    pub fn lower_entry_point(&self) -> Option<u32> {
        self.lower.entry_point()
    }

    /// Query-side search (SPEC_FULL §4.7 `QUERY_HNSW_INDEX`): greedy
    /// descent through the upper layer to an entry point, then a bounded
    /// best-first search in the lower layer, returning the `k` closest
    /// `(node, distance)` pairs.
    pub fn search(&self, query: &[f32], k: usize, efs: usize) -> Vec<(u32, f64)> {
        assert_eq!(query.len(), self.dim, "query vector dimension mismatch");
        let mut upper_visited = HashSet::new();
        let mut lower_visited = HashSet::new();
        let lower_entry = match self.upper.entry_point() {
            Some(upper_entry) => {
                let best = self.greedy_search(&self.upper, upper_entry, query);
                self.lower
                    .entry_point()
                    .map(|le| self.beam_search(&self.lower, le, query, 1, &mut upper_visited).first().map(|c| c.node).unwrap_or(best))
                    .unwrap_or(best)
            }
            None => match self.lower.entry_point() {
                Some(e) => e,
                None => return Vec::new(),
            },
        };
        let ef = efs.max(k);
        let mut candidates = self.beam_search(&self.lower, lower_entry, query, ef, &mut lower_visited);
        candidates.truncate(k);
        candidates.into_iter().map(|c| (c.node, c.dist)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DistFunc;
    use rand::SeedableRng;

    fn test_config() -> HnswConfig {
        HnswConfig {
            mu: 8,
            ml: 0.5,
            efc: 16,
            dist_func: DistFunc::L2,
            alpha: 1.2,
            pu: 0.2,
        }
    }

    #[test]
    fn search_finds_the_nearest_neighbor_of_an_inserted_point() {
        let index = InMemHnswIndex::new(2, test_config(), 10);
        let mut rng = rand::rngs::StdRng::seed_from_u64(7);
        let mut uv = HashSet::new();
        let mut lv = HashSet::new();
        let points: Vec<(u32, Vec<f32>)> = (0..10).map(|i| (i, vec![i as f32, 0.0])).collect();
        for (node, vector) in &points {
            index.insert(*node, vector.clone(), &mut rng, &mut uv, &mut lv);
        }
        index.shrink();

        let results = index.search(&[5.1, 0.0], 1, 16);
        assert_eq!(results.first().map(|(n, _)| *n), Some(5));
    }

    #[test]
    fn shrink_bounds_every_node_to_mu_neighbors() {
        let mut config = test_config();
        config.mu = 2;
        let index = InMemHnswIndex::new(2, config, 6);
        let mut rng = rand::rngs::StdRng::seed_from_u64(1);
        let mut uv = HashSet::new();
        let mut lv = HashSet::new();
        for i in 0..6u32 {
            index.insert(i, vec![i as f32, 0.0], &mut rng, &mut uv, &mut lv);
        }
        index.shrink();
        for node in 0..6u32 {
            assert!(index.lower.neighbors_of(node).len() <= 2);
        }
    }

    #[test]
    fn finalize_produces_deduplicated_undirected_edges() {
        let index = InMemHnswIndex::new(1, test_config(), 4);
        index.lower.connect(0, 1);
        index.lower.connect(1, 0);
        index.lower.connect(1, 2);
        let (_upper, lower) = index.finalize();
        assert_eq!(lower.len(), 2);
        assert!(lower.contains(&(0, 1)));
        assert!(lower.contains(&(1, 2)));
    }
}
