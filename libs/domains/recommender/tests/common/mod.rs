//! Shared fixtures: a three-course vector catalog with matching rows.
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use domain_catalog::{
    CatalogError, CatalogRepository, CatalogResult, Course, CourseFilter, CourseId,
    InMemoryCatalogRepository, Subscription,
};
use domain_recommender::{
    EmbeddingProvider, FlatIpIndex, RecommenderConfig, RecommenderError, RecommenderResult,
};
use serde_json::json;
use std::path::Path;

pub const MODEL: &str = "test-embedding-model";

/// Returns a fixed vector, or fails like an unreachable API.
pub enum FakeEmbedder {
    Fixed(Vec<f32>),
    Failing,
}

#[async_trait]
impl EmbeddingProvider for FakeEmbedder {
    fn provider_name(&self) -> &'static str {
        "fake"
    }

    async fn embed(&self, model: &str, _text: &str) -> RecommenderResult<Vec<f32>> {
        assert_eq!(model, MODEL);
        match self {
            FakeEmbedder::Fixed(vector) => Ok(vector.clone()),
            FakeEmbedder::Failing => Err(RecommenderError::Embedding("connection refused".to_string())),
        }
    }

    async fn embed_batch(&self, model: &str, texts: &[String]) -> RecommenderResult<Vec<Vec<f32>>> {
        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            out.push(self.embed(model, text).await?);
        }
        Ok(out)
    }
}

pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap()
}

pub fn cid(id: i64) -> CourseId {
    CourseId::from_i64(id)
}

/// Slots: A=1 [1,0], B=2 [0.8,0.6], C=3 [0.5,0.866], D=4 unstored.
/// One trailing numeric feature, always zero here.
pub fn write_artifacts(dir: &Path) {
    let index = FlatIpIndex::from_vectors(
        3,
        vec![
            vec![1.0, 0.0, 0.0],
            vec![0.8, 0.6, 0.0],
            vec![0.5, 0.866, 0.0],
            vec![0.0, 0.0, 0.0],
        ],
    )
    .unwrap();
    std::fs::write(dir.join("index.bin"), index.to_bytes()).unwrap();

    let metadata = json!({
        "embedding_model": MODEL,
        "numeric_features": ["avg_rating"],
        "entries": [
            { "id": 1, "title": "Rust Fundamentals" },
            { "id": "2", "title": "Async Rust" },
            { "id": 3.0, "title": "Rust Web Services" },
            { "id": "4.0", "title": "Unindexed" }
        ]
    });
    std::fs::write(dir.join("metadata.json"), serde_json::to_vec(&metadata).unwrap()).unwrap();
}

pub fn config_for(dir: &Path) -> RecommenderConfig {
    RecommenderConfig {
        artifact_dir: dir.to_path_buf(),
        ..RecommenderConfig::default()
    }
}

/// Rows for A and B and an extra course 5 outside the index. C has no row.
pub fn repository() -> InMemoryCatalogRepository {
    InMemoryCatalogRepository::with_courses([
        Course {
            category: Some("Development".to_string()),
            instructor_name: Some("Ferris".to_string()),
            ..Course::new(cid(1), "Rust Fundamentals")
        },
        Course {
            category: Some("Development".to_string()),
            avg_rating: Some(4.8),
            ..Course::new(cid(2), "Async Rust")
        },
        Course::new(cid(5), "Gardening Basics"),
    ])
}

/// In-memory catalog whose random sampling fails like a dropped connection.
pub struct SampleFailingRepository(pub InMemoryCatalogRepository);

#[async_trait]
impl CatalogRepository for SampleFailingRepository {
    async fn subscriptions_for_user(&self, user_id: &str) -> CatalogResult<Vec<Subscription>> {
        self.0.subscriptions_for_user(user_id).await
    }

    async fn courses_by_ids(&self, ids: &[CourseId]) -> CatalogResult<Vec<Course>> {
        self.0.courses_by_ids(ids).await
    }

    async fn random_sample(&self, _limit: u64) -> CatalogResult<Vec<Course>> {
        Err(CatalogError::Internal("Database error: connection reset".to_string()))
    }

    async fn find_by_filter(&self, filter: &CourseFilter, limit: u64) -> CatalogResult<Vec<Course>> {
        self.0.find_by_filter(filter, limit).await
    }

    async fn most_popular(&self, limit: u64) -> CatalogResult<Vec<Course>> {
        self.0.most_popular(limit).await
    }

    async fn enroll(
        &self,
        user_id: &str,
        course_id: &CourseId,
        at: DateTime<Utc>,
    ) -> CatalogResult<Subscription> {
        self.0.enroll(user_id, course_id, at).await
    }
}
