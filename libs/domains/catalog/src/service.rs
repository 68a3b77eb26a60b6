use chrono::Utc;
use observability::RecommenderMetrics;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use validator::Validate;

use crate::course_id::CourseId;
use crate::error::{CatalogError, CatalogResult};
use crate::filter::{FILTER_RESULT_CAP, RelaxationRule};
use crate::models::{
    Course, CourseFilter, EnrolledCourse, FilterOutcome, FilterStrategy, Subscription,
};
use crate::repository::CatalogRepository;

/// Default size of a random course sample
pub const DEFAULT_RANDOM_LIMIT: u64 = 30;
/// Largest random sample a caller may request
pub const MAX_RANDOM_LIMIT: u64 = 100;

const MAX_USER_ID_LEN: usize = 36;

/// Service layer for catalog browsing and enrollment
pub struct CatalogService<R: CatalogRepository> {
    repository: Arc<R>,
}

impl<R: CatalogRepository> Clone for CatalogService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}

impl<R: CatalogRepository> CatalogService<R> {
    pub fn new(repository: R) -> Self {
        Self::from_shared(Arc::new(repository))
    }

    /// Share one repository between several services.
    pub fn from_shared(repository: Arc<R>) -> Self {
        Self { repository }
    }

    pub fn repository(&self) -> Arc<R> {
        Arc::clone(&self.repository)
    }

    /// Run a structured filter, loosening it until something matches.
    ///
    /// Relaxation rules are applied cumulatively in a fixed order; a rule with
    /// nothing to relax is skipped without a query. When every rule is spent
    /// the most popular courses are returned instead.
    pub async fn filter_courses(&self, filter: CourseFilter) -> CatalogResult<FilterOutcome> {
        filter
            .validate()
            .map_err(|e| CatalogError::Validation(e.to_string()))?;

        let started = Instant::now();
        let outcome = self.run_relaxation(filter.normalized()).await?;
        RecommenderMetrics::record_relaxation(outcome.steps.len());
        RecommenderMetrics::record_served("filter", outcome.courses.len(), started.elapsed());
        Ok(outcome)
    }

    async fn run_relaxation(&self, mut current: CourseFilter) -> CatalogResult<FilterOutcome> {
        let courses = self.repository.find_by_filter(&current, FILTER_RESULT_CAP).await?;
        if !courses.is_empty() {
            return Ok(FilterOutcome {
                courses,
                strategy: FilterStrategy::Exact,
                steps: Vec::new(),
                applied_filter: Some(current),
                conflicts: Vec::new(),
            });
        }

        let conflicts = self.find_conflicts(&current).await?;
        let mut steps = Vec::new();
        if !conflicts.is_empty() {
            tracing::debug!(?conflicts, "Filter has constraints matching nothing");
            steps.push(format!("Conflicting constraints: {}", conflicts.join(", ")));
        }
        for rule in RelaxationRule::ORDER {
            let Some(step) = rule.apply(&mut current) else {
                continue;
            };
            tracing::debug!(step = %step, "Relaxing course filter");
            steps.push(step);

            let courses = self.repository.find_by_filter(&current, FILTER_RESULT_CAP).await?;
            if !courses.is_empty() {
                tracing::info!(steps = steps.len(), found = courses.len(), "Filter matched after relaxation");
                return Ok(FilterOutcome {
                    courses,
                    strategy: FilterStrategy::Relaxed,
                    steps,
                    applied_filter: Some(current),
                    conflicts,
                });
            }
        }

        tracing::info!(steps = steps.len(), "Filter matched nothing, falling back to popular courses");
        steps.push("no matching courses, showing the most popular".to_string());
        let courses = self.repository.most_popular(FILTER_RESULT_CAP).await?;
        Ok(FilterOutcome {
            courses,
            strategy: FilterStrategy::Popular,
            steps,
            applied_filter: None,
            conflicts,
        })
    }

    /// Fields of `filter` that match no course even when applied alone.
    async fn find_conflicts(&self, filter: &CourseFilter) -> CatalogResult<Vec<String>> {
        let mut conflicts = Vec::new();
        for constraint in filter.constraints() {
            if self.repository.find_by_filter(&constraint.alone(), 1).await?.is_empty() {
                conflicts.push(constraint.field().to_string());
            }
        }
        Ok(conflicts)
    }

    /// Random sample; `None` means [`DEFAULT_RANDOM_LIMIT`].
    pub async fn random_courses(&self, limit: Option<u64>) -> CatalogResult<Vec<Course>> {
        let limit = limit.unwrap_or(DEFAULT_RANDOM_LIMIT);
        if limit == 0 || limit > MAX_RANDOM_LIMIT {
            return Err(CatalogError::Validation(format!(
                "limit must be between 1 and {}",
                MAX_RANDOM_LIMIT
            )));
        }
        let started = Instant::now();
        let courses = self.repository.random_sample(limit).await?;
        RecommenderMetrics::record_served("random", courses.len(), started.elapsed());
        Ok(courses)
    }

    pub async fn subscriptions(&self, user_id: &str) -> CatalogResult<Vec<Subscription>> {
        let user_id = validate_user_id(user_id)?;
        self.repository.subscriptions_for_user(user_id).await
    }

    /// Courses the user is enrolled in, most recent enrollment first.
    ///
    /// Enrollments whose course row no longer exists are skipped.
    pub async fn enrolled_courses(&self, user_id: &str) -> CatalogResult<Vec<EnrolledCourse>> {
        let subscriptions = self.subscriptions(user_id).await?;
        if subscriptions.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<CourseId> = subscriptions.iter().map(|s| s.course_id.clone()).collect();
        let mut courses: HashMap<CourseId, Course> = self
            .repository
            .courses_by_ids(&ids)
            .await?
            .into_iter()
            .map(|c| (c.id.clone(), c))
            .collect();

        let mut enrolled: Vec<EnrolledCourse> = subscriptions
            .into_iter()
            .filter_map(|s| {
                courses.remove(&s.course_id).map(|course| EnrolledCourse {
                    course,
                    subscribed_at: s.subscribed_at,
                })
            })
            .collect();
        enrolled.sort_by(|a, b| b.subscribed_at.cmp(&a.subscribed_at));
        Ok(enrolled)
    }

    /// Enroll the user in a course as of now.
    pub async fn enroll(&self, user_id: &str, course_id: &CourseId) -> CatalogResult<Subscription> {
        let user_id = validate_user_id(user_id)?;
        self.repository.enroll(user_id, course_id, Utc::now()).await
    }
}

/// Trimmed user id, or a validation error when blank or longer than 36 characters.
pub fn validate_user_id(user_id: &str) -> CatalogResult<&str> {
    let trimmed = user_id.trim();
    if trimmed.is_empty() {
        return Err(CatalogError::Validation("user_id must not be empty".to_string()));
    }
    if trimmed.chars().count() > MAX_USER_ID_LEN {
        return Err(CatalogError::Validation(format!(
            "user_id must be at most {} characters",
            MAX_USER_ID_LEN
        )));
    }
    Ok(trimmed)
}
