//! HNSW construction/query parameters (§4.7): `CALL _CREATE_HNSW_INDEX(...,
//! {mu, ml, efc, distFunc, alpha, pu})`.

use gq_common::{LogicalType, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistFunc {
    L2,
    Cosine,
    Dot,
}

impl DistFunc {
    fn tag(self) -> u8 {
        match self {
            DistFunc::L2 => 0,
            DistFunc::Cosine => 1,
            DistFunc::Dot => 2,
        }
    }

    fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(DistFunc::L2),
            1 => Some(DistFunc::Cosine),
            2 => Some(DistFunc::Dot),
            _ => None,
        }
    }

    /// Distance between two vectors of the same dimension; smaller is closer.
    pub fn distance(self, a: &[f32], b: &[f32]) -> f64 {
        match self {
            DistFunc::L2 => a
                .iter()
                .zip(b)
                .map(|(x, y)| ((*x - *y) as f64).powi(2))
                .sum::<f64>()
                .sqrt(),
            DistFunc::Cosine => {
                let dot: f64 = a.iter().zip(b).map(|(x, y)| (*x as f64) * (*y as f64)).sum();
                let na: f64 = a.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();
                let nb: f64 = b.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();
                if na == 0.0 || nb == 0.0 {
                    1.0
                } else {
                    1.0 - dot / (na * nb)
                }
            }
            DistFunc::Dot => {
                let dot: f64 = a.iter().zip(b).map(|(x, y)| (*x as f64) * (*y as f64)).sum();
                -dot
            }
        }
    }
}

/// Construction/query config for one HNSW index.
///
/// `ml` is the original multi-level HNSW's level-probability multiplier;
/// this engine only ever materializes two layers (§4.7), so it is
/// reinterpreted as the Bernoulli probability that a freshly inserted node
/// is *also* promoted into the upper layer (a single-trial stand-in for the
/// usual geometric level draw). `pu` ("probability of update") is the
/// chance a newly inserted node replaces the layer's entry point, which
/// keeps the entry point from going stale as the graph grows without
/// needing a second, explicit maintenance pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HnswConfig {
    /// Max neighbors retained per node per layer after `shrink`.
    pub mu: usize,
    /// Probability of promoting an inserted node into the upper layer.
    pub ml: f64,
    /// Candidate list size during construction search.
    pub efc: usize,
    pub dist_func: DistFunc,
    /// Neighbor-selection diversification threshold (relative-neighborhood
    /// pruning heuristic): a candidate is kept only if it is not dominated
    /// by an already-selected neighbor within this factor.
    pub alpha: f64,
    /// Probability a new node becomes the layer's entry point.
    pub pu: f64,
}

impl Default for HnswConfig {
    fn default() -> Self {
        HnswConfig {
            mu: 30,
            ml: 0.3,
            efc: 100,
            dist_func: DistFunc::L2,
            alpha: 1.2,
            pu: 0.05,
        }
    }
}

impl HnswConfig {
    pub(crate) fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&(self.mu as u64).to_le_bytes());
        out.extend_from_slice(&self.ml.to_le_bytes());
        out.extend_from_slice(&(self.efc as u64).to_le_bytes());
        out.push(self.dist_func.tag());
        out.extend_from_slice(&self.alpha.to_le_bytes());
        out.extend_from_slice(&self.pu.to_le_bytes());
    }

    pub(crate) fn decode(bytes: &[u8], cursor: &mut usize) -> Option<Self> {
        let read_u64 = |bytes: &[u8], c: &mut usize| -> Option<u64> {
            let v = u64::from_le_bytes(bytes.get(*c..*c + 8)?.try_into().ok()?);
            *c += 8;
            Some(v)
        };
        let read_f64 = |bytes: &[u8], c: &mut usize| -> Option<f64> {
            let v = f64::from_le_bytes(bytes.get(*c..*c + 8)?.try_into().ok()?);
            *c += 8;
            Some(v)
        };
        let mu = read_u64(bytes, cursor)? as usize;
        let ml = read_f64(bytes, cursor)?;
        let efc = read_u64(bytes, cursor)? as usize;
        let dist_func = DistFunc::from_tag(*bytes.get(*cursor)?)?;
        *cursor += 1;
        let alpha = read_f64(bytes, cursor)?;
        let pu = read_f64(bytes, cursor)?;
        Some(HnswConfig { mu, ml, efc, dist_func, alpha, pu })
    }
}

/// Extracts a `FIXED_LIST<FLOAT|DOUBLE>` value as an `f32` vector, the
/// shape the indexed column's type is validated against at bind time.
pub fn value_to_vector(value: &Value, dim: usize) -> Option<Vec<f32>> {
    let Value::List(items) = value else { return None };
    if items.len() != dim {
        return None;
    }
    items
        .iter()
        .map(|v| match v {
            Value::Float(f) => Some(*f),
            Value::Double(d) => Some(*d as f32),
            _ => None,
        })
        .collect()
}

/// Validates that `ty` is a column type an HNSW index can be built over:
/// `FIXED_LIST<FLOAT|DOUBLE>` of a fixed dimension.
pub fn fixed_list_dimension(ty: &LogicalType) -> Option<usize> {
    match ty {
        LogicalType::FixedList { child, num_elements } if matches!(**child, LogicalType::Float | LogicalType::Double) => {
            Some(*num_elements)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_round_trips_through_encode_decode() {
        let config = HnswConfig {
            mu: 16,
            ml: 0.25,
            efc: 64,
            dist_func: DistFunc::Cosine,
            alpha: 1.1,
            pu: 0.1,
        };
        let mut bytes = Vec::new();
        config.encode(&mut bytes);
        let mut cursor = 0;
        assert_eq!(HnswConfig::decode(&bytes, &mut cursor), Some(config));
        assert_eq!(cursor, bytes.len());
    }

    #[test]
    fn l2_distance_of_identical_vectors_is_zero() {
        assert_eq!(DistFunc::L2.distance(&[1.0, 2.0], &[1.0, 2.0]), 0.0);
    }

    #[test]
    fn fixed_list_of_float_yields_its_dimension() {
        let ty = LogicalType::FixedList {
            child: Box::new(LogicalType::Float),
            num_elements: 128,
        };
        assert_eq!(fixed_list_dimension(&ty), Some(128));
        assert_eq!(fixed_list_dimension(&LogicalType::Int64), None);
    }
}
