//! Per-user interest aggregation: one ANN query per enrolled course,
//! recency-weighted and fused by maximum.

use chrono::{DateTime, Utc};
use domain_catalog::{CatalogRepository, CourseId, Subscription};
use observability::RecommenderMetrics;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::adapter::VectorIndexAdapter;
use crate::clock::Clock;
use crate::error::{RecommenderError, RecommenderResult};
use crate::models::{CandidateScore, RankedResult};

pub const NO_SUBSCRIPTIONS: &str = "no subscriptions";
pub const NO_VALID_VECTORS: &str = "no valid vectors";

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// `1 / (1 + days)` with `days` the fractional days from `subscribed_at` to
/// `now`. Future timestamps give negative days and are not clamped.
pub fn recency_weight(subscribed_at: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let days = (now - subscribed_at).num_milliseconds() as f64 / MILLIS_PER_DAY;
    1.0 / (1.0 + days)
}

/// Keep the best weighted score per slot across all sources.
pub fn max_fuse(sources: &[(f64, Vec<CandidateScore>)]) -> HashMap<usize, f64> {
    let mut fused: HashMap<usize, f64> = HashMap::new();
    for (weight, hits) in sources {
        for hit in hits {
            let score = f64::from(hit.score) * weight;
            fused
                .entry(hit.slot)
                .and_modify(|best| *best = best.max(score))
                .or_insert(score);
        }
    }
    fused
}

pub struct InterestAggregator<R: CatalogRepository> {
    repository: Arc<R>,
    adapter: Arc<VectorIndexAdapter>,
    clock: Arc<dyn Clock>,
}

impl<R: CatalogRepository> InterestAggregator<R> {
    pub fn new(repository: Arc<R>, adapter: Arc<VectorIndexAdapter>, clock: Arc<dyn Clock>) -> Self {
        Self {
            repository,
            adapter,
            clock,
        }
    }

    /// Rank courses for `user_id`, excluding those already enrolled.
    ///
    /// Fails with [`RecommenderError::Empty`] when the user has no
    /// enrollments or none of them has a stored vector.
    pub async fn recommend(
        &self,
        user_id: &str,
        top_k: usize,
        per_source_k: usize,
    ) -> RecommenderResult<Vec<RankedResult>> {
        let subscriptions = self.load_subscriptions(user_id).await;
        if subscriptions.is_empty() {
            return Err(RecommenderError::Empty(NO_SUBSCRIPTIONS.to_string()));
        }

        let now = self.clock.now();
        let mut sources = Vec::with_capacity(subscriptions.len());
        let mut skipped = 0;

        for subscription in &subscriptions {
            let Some(vector) = self.adapter.vector_for(&subscription.course_id) else {
                tracing::debug!(course_id = %subscription.course_id, "No stored vector for course");
                skipped += 1;
                continue;
            };
            let weight = recency_weight(subscription.subscribed_at, now);
            let hits = self.adapter.search(vector, per_source_k)?;
            sources.push((weight, hits));
        }

        RecommenderMetrics::record_skipped_vectors(skipped);
        if sources.is_empty() {
            return Err(RecommenderError::Empty(NO_VALID_VECTORS.to_string()));
        }

        let enrolled: HashSet<&CourseId> = subscriptions.iter().map(|s| &s.course_id).collect();
        let mut ranked: Vec<(usize, RankedResult)> = max_fuse(&sources)
            .into_iter()
            .filter_map(|(slot, score)| {
                let course_id = self.adapter.resolve(slot)?;
                (!enrolled.contains(course_id)).then(|| {
                    (
                        slot,
                        RankedResult {
                            course_id: course_id.clone(),
                            score,
                        },
                    )
                })
            })
            .collect();

        ranked.sort_by(|(slot_a, a), (slot_b, b)| {
            b.score.total_cmp(&a.score).then(slot_a.cmp(slot_b))
        });
        ranked.truncate(top_k);

        tracing::debug!(
            user_id,
            sources = sources.len(),
            skipped,
            returned = ranked.len(),
            "Aggregated interest vectors"
        );
        Ok(ranked.into_iter().map(|(_, result)| result).collect())
    }

    /// Store failures read as "no enrollments".
    async fn load_subscriptions(&self, user_id: &str) -> Vec<Subscription> {
        match self.repository.subscriptions_for_user(user_id).await {
            Ok(subscriptions) => subscriptions,
            Err(e) => {
                tracing::warn!(user_id, error = %e, "Failed to load subscriptions");
                RecommenderMetrics::record_upstream_failure("catalog_store");
                Vec::new()
            }
        }
    }
}
