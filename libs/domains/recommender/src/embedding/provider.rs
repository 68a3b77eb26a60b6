use async_trait::async_trait;

use crate::error::RecommenderResult;

/// Trait for text embedding providers
///
/// The model name comes from the artifact metadata so query vectors live in
/// the same space as the indexed courses.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Short provider label for logs and metrics
    fn provider_name(&self) -> &'static str;

    /// Generate embedding for a single text
    async fn embed(&self, model: &str, text: &str) -> RecommenderResult<Vec<f32>>;

    /// Generate embeddings for multiple texts in batch, in input order
    async fn embed_batch(&self, model: &str, texts: &[String]) -> RecommenderResult<Vec<Vec<f32>>>;
}
