use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::ActiveValue::Set;
use sea_orm::sea_query::{Expr, NullOrdering};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, Order, QueryFilter, QueryOrder,
    QuerySelect,
};

use crate::{
    course_id::CourseId,
    entity::{course, user_course},
    error::{CatalogError, CatalogResult},
    models::{Course, CourseFilter, Subscription},
    repository::CatalogRepository,
};

/// PostgreSQL-backed catalog.
///
/// Course ids may be stored as `"123"` or `"123.0"`; lookups go through
/// [`CourseId::storage_keys`] and results are canonicalized on read.
#[derive(Clone)]
pub struct PgCatalogRepository {
    db: DatabaseConnection,
}

impl PgCatalogRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn find_course_row(&self, course_id: &CourseId) -> CatalogResult<Option<course::Model>> {
        Ok(course::Entity::find()
            .filter(course::Column::Id.is_in(course_id.storage_keys()))
            .one(&self.db)
            .await?)
    }
}

#[async_trait]
impl CatalogRepository for PgCatalogRepository {
    async fn subscriptions_for_user(&self, user_id: &str) -> CatalogResult<Vec<Subscription>> {
        let rows = user_course::Entity::find()
            .filter(user_course::Column::UserId.eq(user_id))
            .all(&self.db)
            .await?;

        let now = Utc::now();
        Ok(rows.into_iter().map(|row| row.into_subscription(now)).collect())
    }

    async fn courses_by_ids(&self, ids: &[CourseId]) -> CatalogResult<Vec<Course>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut keys: Vec<String> = ids.iter().flat_map(CourseId::storage_keys).collect();
        keys.sort();
        keys.dedup();

        let rows = course::Entity::find()
            .filter(course::Column::Id.is_in(keys))
            .all(&self.db)
            .await?;

        tracing::debug!(requested = ids.len(), found = rows.len(), "Fetched courses by id");
        Ok(rows.into_iter().map(Course::from).collect())
    }

    async fn random_sample(&self, limit: u64) -> CatalogResult<Vec<Course>> {
        let rows = course::Entity::find()
            .order_by(Expr::cust("RANDOM()"), Order::Asc)
            .limit(limit)
            .all(&self.db)
            .await?;

        Ok(rows.into_iter().map(Course::from).collect())
    }

    async fn find_by_filter(&self, filter: &CourseFilter, limit: u64) -> CatalogResult<Vec<Course>> {
        let rows = course::Entity::find()
            .filter(filter.to_condition())
            .order_by_with_nulls(course::Column::AvgRating, Order::Desc, NullOrdering::Last)
            .order_by_with_nulls(course::Column::NumSubscribers, Order::Desc, NullOrdering::Last)
            .limit(limit)
            .all(&self.db)
            .await?;

        Ok(rows.into_iter().map(Course::from).collect())
    }

    async fn most_popular(&self, limit: u64) -> CatalogResult<Vec<Course>> {
        let rows = course::Entity::find()
            .order_by_with_nulls(course::Column::NumSubscribers, Order::Desc, NullOrdering::Last)
            .limit(limit)
            .all(&self.db)
            .await?;

        Ok(rows.into_iter().map(Course::from).collect())
    }

    async fn enroll(
        &self,
        user_id: &str,
        course_id: &CourseId,
        at: DateTime<Utc>,
    ) -> CatalogResult<Subscription> {
        let course_row = self
            .find_course_row(course_id)
            .await?
            .ok_or_else(|| CatalogError::CourseNotFound(course_id.clone()))?;

        let existing = user_course::Entity::find()
            .filter(user_course::Column::UserId.eq(user_id))
            .filter(user_course::Column::CourseId.is_in(course_id.storage_keys()))
            .one(&self.db)
            .await?;

        if existing.is_some() {
            return Err(CatalogError::AlreadyEnrolled {
                user_id: user_id.to_string(),
                course_id: course_id.clone(),
            });
        }

        // Store the id as the courses table spells it so joins stay exact.
        let active_model = user_course::ActiveModel {
            user_id: Set(user_id.to_string()),
            course_id: Set(course_row.id),
            subscribed_at: Set(Some(at.naive_utc())),
        };
        let model = active_model.insert(&self.db).await?;

        tracing::info!(user_id, course_id = %course_id, "Enrolled user in course");
        Ok(model.into_subscription(at))
    }
}
