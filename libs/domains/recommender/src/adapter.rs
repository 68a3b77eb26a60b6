//! Course-id level view over the ANN index.

use domain_catalog::CourseId;
use std::sync::Arc;

use crate::error::{RecommenderError, RecommenderResult};
use crate::index::{AnnIndex, l2_normalize};
use crate::metadata::CatalogMetadata;
use crate::models::CandidateScore;

/// Joins the slot-addressed index with the slot-ordered metadata table.
#[derive(Clone)]
pub struct VectorIndexAdapter {
    index: Arc<dyn AnnIndex>,
    metadata: Arc<CatalogMetadata>,
}

impl VectorIndexAdapter {
    /// A size mismatch between table and index is tolerated: index slots
    /// without a table entry never resolve, table entries without a slot
    /// never reconstruct.
    pub fn new(index: Arc<dyn AnnIndex>, metadata: Arc<CatalogMetadata>) -> RecommenderResult<Self> {
        let numeric = metadata.numeric_features().len();
        if numeric >= index.dimension() {
            return Err(RecommenderError::Config(format!(
                "{} numeric features leave no text dimensions in a {}-dimensional index",
                numeric,
                index.dimension()
            )));
        }

        if metadata.len() != index.len() {
            tracing::warn!(
                metadata_entries = metadata.len(),
                index_slots = index.len(),
                "Metadata table and vector index differ in size"
            );
        }

        Ok(Self { index, metadata })
    }

    pub fn dimension(&self) -> usize {
        self.index.dimension()
    }

    /// Leading dimensions produced by the text embedding model.
    pub fn text_dimension(&self) -> usize {
        self.index.dimension() - self.metadata.numeric_features().len()
    }

    pub fn metadata(&self) -> &CatalogMetadata {
        &self.metadata
    }

    pub fn len(&self) -> usize {
        self.metadata.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metadata.is_empty()
    }

    /// Stored vector for a course; `None` when the id is unknown or its
    /// slot was never stored.
    pub fn vector_for(&self, id: &CourseId) -> Option<Vec<f32>> {
        let slot = self.metadata.slot_of(id)?;
        self.index.reconstruct(slot)
    }

    /// Normalize `query` and return up to `k` hits, most similar first.
    pub fn search(&self, mut query: Vec<f32>, k: usize) -> RecommenderResult<Vec<CandidateScore>> {
        l2_normalize(&mut query);
        self.index.search(&query, k)
    }

    pub fn resolve(&self, slot: usize) -> Option<&CourseId> {
        self.metadata.id_at(slot)
    }
}
