//! Free-text search: embed the term, pad the numeric-feature dimensions
//! with zeros, and run one ANN query.

use observability::RecommenderMetrics;
use std::sync::Arc;

use crate::adapter::VectorIndexAdapter;
use crate::embedding::EmbeddingProvider;
use crate::error::{RecommenderError, RecommenderResult};
use crate::models::RankedResult;

pub const EMBEDDING_UNAVAILABLE: &str = "text search is temporarily unavailable";
pub const NO_MATCHES: &str = "no matching courses";

pub struct TextSearch {
    adapter: Arc<VectorIndexAdapter>,
    embedder: Arc<dyn EmbeddingProvider>,
    model: String,
}

impl TextSearch {
    pub fn new(
        adapter: Arc<VectorIndexAdapter>,
        embedder: Arc<dyn EmbeddingProvider>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            adapter,
            embedder,
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub async fn search(&self, term: &str, top_k: usize) -> RecommenderResult<Vec<RankedResult>> {
        let term = term.trim();
        if term.is_empty() {
            return Err(RecommenderError::Validation("Missing 'term' parameter".to_string()));
        }
        if top_k == 0 {
            return Ok(Vec::new());
        }

        let embedding = match self.embedder.embed(&self.model, term).await {
            Ok(embedding) => embedding,
            Err(e) => {
                tracing::warn!(
                    provider = self.embedder.provider_name(),
                    model = %self.model,
                    error = %e,
                    "Embedding request failed"
                );
                RecommenderMetrics::record_upstream_failure("embedding");
                return Err(RecommenderError::Empty(EMBEDDING_UNAVAILABLE.to_string()));
            }
        };

        let query = self.pad_to_index(embedding)?;
        let results: Vec<RankedResult> = self
            .adapter
            .search(query, top_k)?
            .into_iter()
            .filter_map(|hit| {
                self.adapter.resolve(hit.slot).map(|course_id| RankedResult {
                    course_id: course_id.clone(),
                    score: f64::from(hit.score),
                })
            })
            .collect();

        if results.is_empty() {
            return Err(RecommenderError::Empty(NO_MATCHES.to_string()));
        }
        Ok(results)
    }

    /// The embedding fills the text dimensions; numeric features stay zero.
    fn pad_to_index(&self, mut embedding: Vec<f32>) -> RecommenderResult<Vec<f32>> {
        let expected = self.adapter.text_dimension();
        if embedding.len() != expected {
            return Err(RecommenderError::DimensionMismatch {
                expected,
                actual: embedding.len(),
            });
        }
        embedding.resize(self.adapter.dimension(), 0.0);
        Ok(embedding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::MockEmbeddingProvider;
    use crate::index::FlatIpIndex;
    use crate::metadata::CatalogMetadata;
    use domain_catalog::CourseId;
    use mockall::predicate::eq;

    /// Two text dimensions plus one numeric feature.
    fn adapter() -> Arc<VectorIndexAdapter> {
        let metadata = CatalogMetadata::new(
            "mini-lm",
            vec!["avg_rating".to_string()],
            vec![CourseId::from_i64(1), CourseId::from_i64(2), CourseId::from_i64(3)],
        )
        .unwrap();
        let index = FlatIpIndex::from_vectors(
            3,
            vec![
                vec![0.6, 0.0, 0.8],
                vec![0.0, 0.6, 0.8],
                vec![0.0, 0.0, 1.0],
            ],
        )
        .unwrap();
        Arc::new(VectorIndexAdapter::new(Arc::new(index), Arc::new(metadata)).unwrap())
    }

    fn search_with(mock: MockEmbeddingProvider) -> TextSearch {
        TextSearch::new(adapter(), Arc::new(mock), "mini-lm")
    }

    #[tokio::test]
    async fn test_search_pads_numeric_dimensions_with_zeros() {
        let mut mock = MockEmbeddingProvider::new();
        mock.expect_embed()
            .with(eq("mini-lm"), eq("rust"))
            .times(1)
            .returning(|_, _| Ok(vec![2.0, 0.0]));

        let results = search_with(mock).search("  rust ", 5).await.unwrap();

        // Course 3 has only numeric signal and scores zero against a padded query
        assert_eq!(results[0].course_id, CourseId::from_i64(1));
        assert!((results[0].score - 0.6).abs() < 1e-6);
        assert!(results.iter().skip(1).all(|r| r.score.abs() < 1e-6));
    }

    #[tokio::test]
    async fn test_blank_term_is_invalid_input() {
        let mut mock = MockEmbeddingProvider::new();
        mock.expect_embed().never();

        let err = search_with(mock).search("   ", 5).await.unwrap_err();
        assert!(matches!(err, RecommenderError::Validation(_)));
    }

    #[tokio::test]
    async fn test_embedding_failure_degrades_to_empty() {
        let mut mock = MockEmbeddingProvider::new();
        mock.expect_embed()
            .returning(|_, _| Err(RecommenderError::Embedding("timeout".to_string())));
        mock.expect_provider_name().return_const("mock");

        let err = search_with(mock).search("rust", 5).await.unwrap_err();
        assert!(matches!(err, RecommenderError::Empty(reason) if reason == EMBEDDING_UNAVAILABLE));
    }

    #[tokio::test]
    async fn test_wrong_embedding_size_is_dimension_mismatch() {
        let mut mock = MockEmbeddingProvider::new();
        mock.expect_embed().returning(|_, _| Ok(vec![1.0, 0.0, 0.0]));

        let err = search_with(mock).search("rust", 5).await.unwrap_err();
        assert!(matches!(
            err,
            RecommenderError::DimensionMismatch { expected: 2, actual: 3 }
        ));
    }

    #[tokio::test]
    async fn test_top_k_truncates_and_zero_skips_embedding() {
        let mut mock = MockEmbeddingProvider::new();
        mock.expect_embed().times(1).returning(|_, _| Ok(vec![0.0, 1.0]));
        let search = search_with(mock);

        let results = search.search("python", 1).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].course_id, CourseId::from_i64(2));

        assert!(search.search("python", 0).await.unwrap().is_empty());
    }
}
