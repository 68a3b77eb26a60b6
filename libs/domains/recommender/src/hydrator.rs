use domain_catalog::{CatalogRepository, Course, CourseId};
use observability::RecommenderMetrics;
use std::collections::HashMap;
use std::sync::Arc;

use crate::models::{CourseAttributes, HydratedResult, RankedResult};

/// Attaches display attributes to ranked ids with one batched lookup.
pub struct Hydrator<R: CatalogRepository> {
    repository: Arc<R>,
}

impl<R: CatalogRepository> Hydrator<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Output order matches `ranked`. Ids without a row, and every id when
    /// the lookup fails, get all-`null` attributes.
    pub async fn hydrate(&self, ranked: Vec<RankedResult>) -> Vec<HydratedResult> {
        if ranked.is_empty() {
            return Vec::new();
        }

        let ids: Vec<CourseId> = ranked.iter().map(|r| r.course_id.clone()).collect();
        let mut courses: HashMap<CourseId, Course> = match self.repository.courses_by_ids(&ids).await {
            Ok(courses) => courses.into_iter().map(|c| (c.id.clone(), c)).collect(),
            Err(e) => {
                tracing::warn!(count = ids.len(), error = %e, "Failed to hydrate ranked courses");
                RecommenderMetrics::record_upstream_failure("catalog_store");
                HashMap::new()
            }
        };

        ranked
            .into_iter()
            .map(|result| {
                let attributes = courses
                    .remove(&result.course_id)
                    .map(CourseAttributes::from)
                    .unwrap_or_default();
                HydratedResult {
                    course_id: result.course_id,
                    score: Some(result.score),
                    attributes,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain_catalog::InMemoryCatalogRepository;

    fn ranked(id: i64, score: f64) -> RankedResult {
        RankedResult {
            course_id: CourseId::from_i64(id),
            score,
        }
    }

    #[tokio::test]
    async fn test_hydrate_preserves_rank_order_and_fills_missing() {
        let repo = InMemoryCatalogRepository::with_courses([
            Course {
                category: Some("Development".to_string()),
                ..Course::new(CourseId::from_i64(1), "First")
            },
            Course::new(CourseId::from_i64(3), "Third"),
        ]);
        let hydrator = Hydrator::new(Arc::new(repo));

        let results = hydrator
            .hydrate(vec![ranked(3, 0.9), ranked(2, 0.5), ranked(1, 0.1)])
            .await;

        let ids: Vec<&str> = results.iter().map(|r| r.course_id.as_str()).collect();
        assert_eq!(ids, vec!["3.0", "2.0", "1.0"]);
        assert_eq!(results[0].attributes.title.as_deref(), Some("Third"));
        assert_eq!(results[1].attributes, CourseAttributes::default());
        assert_eq!(results[1].score, Some(0.5));
        assert_eq!(results[2].attributes.category.as_deref(), Some("Development"));
    }

    #[tokio::test]
    async fn test_hydrate_empty_input() {
        let hydrator = Hydrator::new(Arc::new(InMemoryCatalogRepository::new()));
        assert!(hydrator.hydrate(vec![]).await.is_empty());
    }
}
