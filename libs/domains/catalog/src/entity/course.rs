use sea_orm::entity::prelude::*;

use crate::course_id::CourseId;
use crate::models::Course;

/// Sea-ORM Entity for the `courses` table
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "courses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(column_type = "Text")]
    pub title: String,
    pub is_paid: bool,
    #[sea_orm(column_type = "Double", nullable)]
    pub price: Option<f64>,
    #[sea_orm(column_type = "Text", nullable)]
    pub headline: Option<String>,
    pub num_subscribers: Option<i32>,
    #[sea_orm(column_type = "Double", nullable)]
    pub avg_rating: Option<f64>,
    pub num_reviews: Option<i32>,
    pub num_comments: Option<i32>,
    pub num_lectures: Option<i32>,
    pub content_length_min: Option<i32>,
    pub published_time: Option<DateTime>,
    pub last_update_date: Option<DateTime>,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub topic: Option<String>,
    pub language: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub course_url: Option<String>,
    pub instructor_name: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub instructor_url: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Rows keep whatever id spelling they were imported with; the domain model
/// always carries the canonical form. Timestamps are stored without zone
/// and read as UTC.
impl From<Model> for Course {
    fn from(model: Model) -> Self {
        Self {
            id: CourseId::normalize(&model.id),
            title: model.title,
            is_paid: model.is_paid,
            price: model.price,
            headline: model.headline,
            num_subscribers: model.num_subscribers,
            avg_rating: model.avg_rating,
            num_reviews: model.num_reviews,
            num_comments: model.num_comments,
            num_lectures: model.num_lectures,
            content_length_min: model.content_length_min,
            published_time: model.published_time.map(|t| t.and_utc()),
            last_update_date: model.last_update_date.map(|t| t.and_utc()),
            category: model.category,
            subcategory: model.subcategory,
            topic: model.topic,
            language: model.language,
            course_url: model.course_url,
            instructor_name: model.instructor_name,
            instructor_url: model.instructor_url,
        }
    }
}
