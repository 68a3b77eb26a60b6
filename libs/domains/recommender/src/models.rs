use chrono::{DateTime, Utc};
use domain_catalog::{Course, CourseId};
use serde::{Deserialize, Serialize};
use strum::{Display, IntoStaticStr};
use utoipa::{IntoParams, ToSchema};

/// One ANN hit: a dense index slot and its similarity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CandidateScore {
    pub slot: usize,
    pub score: f32,
}

/// A course id with its final ranking score, best first.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedResult {
    pub course_id: CourseId,
    pub score: f64,
}

/// Display attributes attached to a ranked id.
///
/// Every field is always serialized; a course missing from the store yields
/// all `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CourseAttributes {
    pub title: Option<String>,
    pub is_paid: Option<bool>,
    pub price: Option<f64>,
    pub headline: Option<String>,
    pub num_subscribers: Option<i32>,
    pub avg_rating: Option<f64>,
    pub num_reviews: Option<i32>,
    pub num_comments: Option<i32>,
    pub num_lectures: Option<i32>,
    pub content_length_min: Option<i32>,
    pub published_time: Option<DateTime<Utc>>,
    pub last_update_date: Option<DateTime<Utc>>,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub topic: Option<String>,
    pub language: Option<String>,
    pub course_url: Option<String>,
    pub instructor_name: Option<String>,
    pub instructor_url: Option<String>,
}

impl From<Course> for CourseAttributes {
    fn from(course: Course) -> Self {
        Self {
            title: Some(course.title),
            is_paid: Some(course.is_paid),
            price: course.price,
            headline: course.headline,
            num_subscribers: course.num_subscribers,
            avg_rating: course.avg_rating,
            num_reviews: course.num_reviews,
            num_comments: course.num_comments,
            num_lectures: course.num_lectures,
            content_length_min: course.content_length_min,
            published_time: course.published_time,
            last_update_date: course.last_update_date,
            category: course.category,
            subcategory: course.subcategory,
            topic: course.topic,
            language: course.language,
            course_url: course.course_url,
            instructor_name: course.instructor_name,
            instructor_url: course.instructor_url,
        }
    }
}

/// A ranked result with its display attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct HydratedResult {
    pub course_id: CourseId,
    /// Ranking score; `null` for unranked samples
    pub score: Option<f64>,
    #[serde(flatten)]
    pub attributes: CourseAttributes,
}

impl HydratedResult {
    /// An unranked course, as returned by the random fallback.
    pub fn unranked(course: Course) -> Self {
        Self {
            course_id: course.id.clone(),
            score: None,
            attributes: course.into(),
        }
    }
}

/// How a recommendation list was produced.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Display, IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Strategy {
    /// Interest vectors built from the user's enrollments
    ContentBased,
    /// Free-text query embedding
    TextSearch,
    /// Random sample for users without usable history
    Random,
}

/// What to do when a user has nothing to base recommendations on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Fallback {
    /// Report the empty result
    #[default]
    None,
    /// Return a random sample instead
    Random,
}

/// A recommendation list and the strategy that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Recommendations {
    pub strategy: Strategy,
    pub items: Vec<HydratedResult>,
}

/// Query parameters for user recommendations.
///
/// Kept as raw strings so malformed values produce the standard error body.
#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
pub struct RecommendQuery {
    /// User to recommend for (required)
    pub user_id: Option<String>,
    /// Number of results (default 50)
    pub k: Option<String>,
    /// `random` to sample courses when the user has no usable history
    pub fallback: Option<String>,
}

/// Query parameters for text search
#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
pub struct SearchQuery {
    /// Free-text query (required)
    pub term: Option<String>,
    /// Number of results (default 20)
    pub k: Option<String>,
}

/// Response envelope for user recommendations
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RecommendationResponse {
    pub user_id: String,
    pub strategy: Strategy,
    pub count: usize,
    pub items: Vec<HydratedResult>,
}

/// Response envelope for text search
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SearchResponse {
    pub term: String,
    pub count: usize,
    pub items: Vec<HydratedResult>,
}
