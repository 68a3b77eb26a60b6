use domain_catalog::{CatalogRepository, CatalogService, EnrolledCourse, validate_user_id};
use observability::RecommenderMetrics;
use std::sync::Arc;
use std::time::Instant;

use crate::adapter::VectorIndexAdapter;
use crate::aggregator::InterestAggregator;
use crate::clock::{Clock, SystemClock};
use crate::config::RecommenderConfig;
use crate::embedding::EmbeddingProvider;
use crate::error::{RecommenderError, RecommenderResult};
use crate::hydrator::Hydrator;
use crate::index::{AnnIndex, FlatIpIndex};
use crate::metadata::CatalogMetadata;
use crate::models::{Fallback, HydratedResult, Recommendations, Strategy};
use crate::text_query::TextSearch;

/// Entry point for ranking: owns the read-only index and metadata and
/// composes aggregation, text search and hydration.
pub struct RecommenderService<R: CatalogRepository> {
    catalog: CatalogService<R>,
    aggregator: InterestAggregator<R>,
    text_search: TextSearch,
    hydrator: Hydrator<R>,
    adapter: Arc<VectorIndexAdapter>,
    config: RecommenderConfig,
}

impl<R: CatalogRepository> RecommenderService<R> {
    /// Read the artifacts from `config.artifact_dir` and wire the service.
    pub async fn load(
        config: RecommenderConfig,
        repository: Arc<R>,
        embedder: Arc<dyn EmbeddingProvider>,
    ) -> RecommenderResult<Self> {
        let index_path = config.index_path();
        let metadata_path = config.metadata_path();

        let index = FlatIpIndex::load(&index_path).await?;
        let metadata_bytes = tokio::fs::read(&metadata_path).await.map_err(|e| {
            RecommenderError::Artifact(format!("cannot read {}: {}", metadata_path.display(), e))
        })?;
        let metadata = CatalogMetadata::from_slice(&metadata_bytes)?;

        tracing::info!(
            index = %index_path.display(),
            entries = metadata.len(),
            slots = index.len(),
            dimension = index.dimension(),
            embedding_model = metadata.embedding_model(),
            "Loaded recommender artifacts"
        );

        let adapter = VectorIndexAdapter::new(Arc::new(index), Arc::new(metadata))?;
        Ok(Self::new(
            adapter,
            repository,
            embedder,
            Arc::new(SystemClock),
            config,
        ))
    }

    pub fn new(
        adapter: VectorIndexAdapter,
        repository: Arc<R>,
        embedder: Arc<dyn EmbeddingProvider>,
        clock: Arc<dyn Clock>,
        config: RecommenderConfig,
    ) -> Self {
        let adapter = Arc::new(adapter);
        let model = config
            .embedding_model
            .clone()
            .unwrap_or_else(|| adapter.metadata().embedding_model().to_string());

        RecommenderMetrics::set_catalog_size(adapter.len());

        Self {
            catalog: CatalogService::from_shared(Arc::clone(&repository)),
            aggregator: InterestAggregator::new(Arc::clone(&repository), Arc::clone(&adapter), clock),
            text_search: TextSearch::new(Arc::clone(&adapter), embedder, model),
            hydrator: Hydrator::new(repository),
            adapter,
            config,
        }
    }

    pub fn config(&self) -> &RecommenderConfig {
        &self.config
    }

    /// Number of courses in the vector catalog
    pub fn catalog_size(&self) -> usize {
        self.adapter.len()
    }

    /// Content-based recommendations for a user, best first.
    pub async fn recommend_for_user(
        &self,
        user_id: &str,
        k: Option<usize>,
    ) -> RecommenderResult<Vec<HydratedResult>> {
        let user_id = require_user_id(user_id)?;
        let started = Instant::now();

        let ranked = self
            .aggregator
            .recommend(
                user_id,
                k.unwrap_or(self.config.default_k),
                self.config.per_source_k,
            )
            .await
            .inspect_err(record_empty)?;

        let items = self.hydrator.hydrate(ranked).await;
        RecommenderMetrics::record_served(strategy_label(Strategy::ContentBased), items.len(), started.elapsed());
        Ok(items)
    }

    /// Courses closest to a free-text query, best first.
    pub async fn search_by_text(
        &self,
        term: &str,
        k: Option<usize>,
    ) -> RecommenderResult<Vec<HydratedResult>> {
        let started = Instant::now();

        let ranked = self
            .text_search
            .search(term, k.unwrap_or(self.config.search_default_k))
            .await
            .inspect_err(record_empty)?;

        let items = self.hydrator.hydrate(ranked).await;
        RecommenderMetrics::record_served(strategy_label(Strategy::TextSearch), items.len(), started.elapsed());
        Ok(items)
    }

    /// Recommendations for a user; with [`Fallback::Random`], a user with
    /// nothing to rank from gets a random sample instead of an empty result.
    pub async fn recommend_or_sample(
        &self,
        user_id: &str,
        k: Option<usize>,
        fallback: Fallback,
    ) -> RecommenderResult<Recommendations> {
        match (self.recommend_for_user(user_id, k).await, fallback) {
            (Ok(items), _) => Ok(Recommendations {
                strategy: Strategy::ContentBased,
                items,
            }),
            (Err(RecommenderError::Empty(reason)), Fallback::Random) => {
                tracing::info!(user_id, reason = %reason, "Falling back to random courses");
                let sample = self
                    .catalog
                    .random_courses(Some(self.config.random_fallback_size))
                    .await;
                match sample {
                    Ok(courses) => Ok(Recommendations {
                        strategy: Strategy::Random,
                        items: courses.into_iter().map(HydratedResult::unranked).collect(),
                    }),
                    Err(e) => {
                        tracing::warn!(error = %e, "Random fallback unavailable");
                        RecommenderMetrics::record_upstream_failure("catalog_store");
                        Err(RecommenderError::Empty(reason))
                    }
                }
            }
            (Err(e), _) => Err(e),
        }
    }

    pub async fn enrolled_courses(&self, user_id: &str) -> RecommenderResult<Vec<EnrolledCourse>> {
        Ok(self.catalog.enrolled_courses(user_id).await?)
    }
}

fn require_user_id(user_id: &str) -> RecommenderResult<&str> {
    if user_id.trim().is_empty() {
        return Err(RecommenderError::Validation("Missing 'user_id' parameter".to_string()));
    }
    Ok(validate_user_id(user_id)?)
}

fn strategy_label(strategy: Strategy) -> &'static str {
    strategy.into()
}

fn record_empty(err: &RecommenderError) {
    if let RecommenderError::Empty(reason) = err {
        RecommenderMetrics::record_empty(reason);
    }
}
