//! Approximate-nearest-neighbour index abstraction and the exact flat
//! inner-product index shipped with the service.
//!
//! Artifact layout, little-endian:
//!
//! ```text
//! "CFVI" | version: u32 | dimension: u32 | count: u32 | count * dimension f32
//! ```

use std::path::Path;

use crate::error::{RecommenderError, RecommenderResult};
use crate::models::CandidateScore;

const MAGIC: &[u8; 4] = b"CFVI";
const FORMAT_VERSION: u32 = 1;
const HEADER_LEN: usize = 16;

/// Nearest-neighbour search by inner product over dense slots.
pub trait AnnIndex: Send + Sync {
    fn dimension(&self) -> usize;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stored vector for `slot`; `None` when out of range or never stored.
    fn reconstruct(&self, slot: usize) -> Option<Vec<f32>>;

    /// Up to `k` slots by descending inner product with `query`.
    fn search(&self, query: &[f32], k: usize) -> RecommenderResult<Vec<CandidateScore>>;
}

/// Scale `vector` to unit length. Zero vectors are left unchanged.
pub fn l2_normalize(vector: &mut [f32]) {
    let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > 0.0 {
        vector.iter_mut().for_each(|v| *v /= norm);
    }
}

/// Exact inner-product index held in one contiguous buffer.
///
/// All-zero rows are treated as never stored.
#[derive(Debug, Clone)]
pub struct FlatIpIndex {
    dimension: usize,
    vectors: Vec<f32>,
}

impl FlatIpIndex {
    pub fn from_vectors(dimension: usize, rows: Vec<Vec<f32>>) -> RecommenderResult<Self> {
        if dimension == 0 {
            return Err(RecommenderError::Artifact("index dimension must be positive".to_string()));
        }
        let mut vectors = Vec::with_capacity(dimension * rows.len());
        for (slot, row) in rows.into_iter().enumerate() {
            if row.len() != dimension {
                return Err(RecommenderError::Artifact(format!(
                    "row {} has {} values, expected {}",
                    slot,
                    row.len(),
                    dimension
                )));
            }
            vectors.extend(row);
        }
        Ok(Self { dimension, vectors })
    }

    pub fn from_bytes(bytes: &[u8]) -> RecommenderResult<Self> {
        if bytes.len() < HEADER_LEN {
            return Err(RecommenderError::Artifact("index file is truncated".to_string()));
        }
        if &bytes[0..4] != MAGIC {
            return Err(RecommenderError::Artifact("index file has wrong magic".to_string()));
        }

        let version = read_u32(bytes, 4);
        if version != FORMAT_VERSION {
            return Err(RecommenderError::Artifact(format!(
                "unsupported index version {}",
                version
            )));
        }

        let dimension = read_u32(bytes, 8) as usize;
        let count = read_u32(bytes, 12) as usize;
        if dimension == 0 {
            return Err(RecommenderError::Artifact("index dimension must be positive".to_string()));
        }

        let expected = count
            .checked_mul(dimension)
            .and_then(|n| n.checked_mul(4))
            .ok_or_else(|| RecommenderError::Artifact("index header overflows".to_string()))?;
        let payload = &bytes[HEADER_LEN..];
        if payload.len() != expected {
            return Err(RecommenderError::Artifact(format!(
                "index payload is {} bytes, header declares {}",
                payload.len(),
                expected
            )));
        }

        let vectors = payload
            .chunks_exact(4)
            .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect();

        Ok(Self { dimension, vectors })
    }

    pub async fn load(path: impl AsRef<Path>) -> RecommenderResult<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            RecommenderError::Artifact(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_bytes(&bytes)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(HEADER_LEN + self.vectors.len() * 4);
        bytes.extend_from_slice(MAGIC);
        bytes.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
        bytes.extend_from_slice(&(self.dimension as u32).to_le_bytes());
        bytes.extend_from_slice(&(self.len() as u32).to_le_bytes());
        for value in &self.vectors {
            bytes.extend_from_slice(&value.to_le_bytes());
        }
        bytes
    }

    fn row(&self, slot: usize) -> Option<&[f32]> {
        let start = slot.checked_mul(self.dimension)?;
        self.vectors.get(start..start.checked_add(self.dimension)?)
    }

    fn is_stored(row: &[f32]) -> bool {
        row.iter().any(|v| *v != 0.0)
    }
}

impl AnnIndex for FlatIpIndex {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn len(&self) -> usize {
        self.vectors.len() / self.dimension
    }

    fn reconstruct(&self, slot: usize) -> Option<Vec<f32>> {
        self.row(slot)
            .filter(|row| Self::is_stored(row))
            .map(<[f32]>::to_vec)
    }

    fn search(&self, query: &[f32], k: usize) -> RecommenderResult<Vec<CandidateScore>> {
        if query.len() != self.dimension {
            return Err(RecommenderError::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            });
        }
        if k == 0 {
            return Ok(Vec::new());
        }

        let mut hits: Vec<CandidateScore> = self
            .vectors
            .chunks_exact(self.dimension)
            .enumerate()
            .filter(|(_, row)| Self::is_stored(row))
            .map(|(slot, row)| CandidateScore {
                slot,
                score: row.iter().zip(query).map(|(a, b)| a * b).sum(),
            })
            .collect();

        // Ties keep slot order.
        hits.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.slot.cmp(&b.slot)));
        hits.truncate(k);
        Ok(hits)
    }
}

fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}
