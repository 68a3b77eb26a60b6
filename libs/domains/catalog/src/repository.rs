use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::collections::hash_map::RandomState;
use std::hash::BuildHasher;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::course_id::CourseId;
use crate::error::{CatalogError, CatalogResult};
use crate::filter::{popularity_order, rank_order};
use crate::models::{Course, CourseFilter, Subscription};

/// Read and enrollment access to the relational course store.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Every enrollment of the user, in no particular order
    async fn subscriptions_for_user(&self, user_id: &str) -> CatalogResult<Vec<Subscription>>;

    /// Courses for the given ids in one batch. Unknown ids are absent from
    /// the result; order is unspecified.
    async fn courses_by_ids(&self, ids: &[CourseId]) -> CatalogResult<Vec<Course>>;

    /// Up to `limit` courses in random order
    async fn random_sample(&self, limit: u64) -> CatalogResult<Vec<Course>>;

    /// Courses matching every constraint of `filter`, best rated first
    async fn find_by_filter(&self, filter: &CourseFilter, limit: u64) -> CatalogResult<Vec<Course>>;

    /// Courses with the most subscribers first
    async fn most_popular(&self, limit: u64) -> CatalogResult<Vec<Course>>;

    /// Record an enrollment
    async fn enroll(
        &self,
        user_id: &str,
        course_id: &CourseId,
        at: DateTime<Utc>,
    ) -> CatalogResult<Subscription>;
}

/// In-memory implementation of CatalogRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryCatalogRepository {
    courses: Arc<RwLock<HashMap<CourseId, Course>>>,
    subscriptions: Arc<RwLock<HashMap<String, Vec<Subscription>>>>,
}

impl InMemoryCatalogRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_courses(courses: impl IntoIterator<Item = Course>) -> Self {
        let courses = courses.into_iter().map(|c| (c.id.clone(), c)).collect();
        Self {
            courses: Arc::new(RwLock::new(courses)),
            subscriptions: Arc::default(),
        }
    }

    pub async fn insert_course(&self, course: Course) {
        self.courses.write().await.insert(course.id.clone(), course);
    }

    /// Seed an enrollment without the existence checks of [`CatalogRepository::enroll`].
    pub async fn insert_subscription(&self, user_id: &str, subscription: Subscription) {
        self.subscriptions
            .write()
            .await
            .entry(user_id.to_string())
            .or_default()
            .push(subscription);
    }
}

#[async_trait]
impl CatalogRepository for InMemoryCatalogRepository {
    async fn subscriptions_for_user(&self, user_id: &str) -> CatalogResult<Vec<Subscription>> {
        let subscriptions = self.subscriptions.read().await;
        Ok(subscriptions.get(user_id).cloned().unwrap_or_default())
    }

    async fn courses_by_ids(&self, ids: &[CourseId]) -> CatalogResult<Vec<Course>> {
        let courses = self.courses.read().await;
        Ok(ids.iter().filter_map(|id| courses.get(id).cloned()).collect())
    }

    async fn random_sample(&self, limit: u64) -> CatalogResult<Vec<Course>> {
        let courses = self.courses.read().await;
        let state = RandomState::new();

        let mut sample: Vec<Course> = courses.values().cloned().collect();
        sample.sort_by_cached_key(|c| state.hash_one(&c.id));
        sample.truncate(limit as usize);
        Ok(sample)
    }

    async fn find_by_filter(&self, filter: &CourseFilter, limit: u64) -> CatalogResult<Vec<Course>> {
        let courses = self.courses.read().await;

        let mut result: Vec<Course> = courses
            .values()
            .filter(|c| filter.matches(c))
            .cloned()
            .collect();
        result.sort_by(rank_order);
        result.truncate(limit as usize);
        Ok(result)
    }

    async fn most_popular(&self, limit: u64) -> CatalogResult<Vec<Course>> {
        let courses = self.courses.read().await;

        let mut result: Vec<Course> = courses.values().cloned().collect();
        result.sort_by(popularity_order);
        result.truncate(limit as usize);
        Ok(result)
    }

    async fn enroll(
        &self,
        user_id: &str,
        course_id: &CourseId,
        at: DateTime<Utc>,
    ) -> CatalogResult<Subscription> {
        if !self.courses.read().await.contains_key(course_id) {
            return Err(CatalogError::CourseNotFound(course_id.clone()));
        }

        let mut subscriptions = self.subscriptions.write().await;
        let entries = subscriptions.entry(user_id.to_string()).or_default();
        if entries.iter().any(|s| &s.course_id == course_id) {
            return Err(CatalogError::AlreadyEnrolled {
                user_id: user_id.to_string(),
                course_id: course_id.clone(),
            });
        }

        let subscription = Subscription {
            course_id: course_id.clone(),
            subscribed_at: at,
        };
        entries.push(subscription.clone());

        tracing::info!(user_id, course_id = %course_id, "Enrolled user in course");
        Ok(subscription)
    }
}
