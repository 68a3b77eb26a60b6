use chrono::{DateTime as UtcDateTime, Utc};
use sea_orm::entity::prelude::*;

use crate::course_id::CourseId;
use crate::models::Subscription;

/// Sea-ORM Entity for the `user_courses` enrollment table
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "user_courses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub course_id: String,
    pub subscribed_at: Option<DateTime>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// A missing enrollment timestamp reads as `now`.
    pub fn into_subscription(self, now: UtcDateTime<Utc>) -> Subscription {
        Subscription {
            course_id: CourseId::normalize(&self.course_id),
            subscribed_at: self.subscribed_at.map(|t| t.and_utc()).unwrap_or(now),
        }
    }
}
