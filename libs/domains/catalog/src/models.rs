use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::course_id::CourseId;

/// A course row as exposed by the API.
///
/// Every attribute is always serialized; absent values are explicit `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Course {
    pub id: CourseId,
    pub title: String,
    pub is_paid: bool,
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

impl Course {
    /// Display attributes in serialization order, excluding `id`.
    pub const FIELDS: [&'static str; 19] = [
        "title",
        "is_paid",
        "price",
        "headline",
        "num_subscribers",
        "avg_rating",
        "num_reviews",
        "num_comments",
        "num_lectures",
        "content_length_min",
        "published_time",
        "last_update_date",
        "category",
        "subcategory",
        "topic",
        "language",
        "course_url",
        "instructor_name",
        "instructor_url",
    ];

    /// Minimal course with only the required columns set.
    pub fn new(id: CourseId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            is_paid: false,
            price: None,
            headline: None,
            num_subscribers: None,
            avg_rating: None,
            num_reviews: None,
            num_comments: None,
            num_lectures: None,
            content_length_min: None,
            published_time: None,
            last_update_date: None,
            category: None,
            subcategory: None,
            topic: None,
            language: None,
            course_url: None,
            instructor_name: None,
            instructor_url: None,
        }
    }
}

/// One enrollment of a user in a course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Subscription {
    pub course_id: CourseId,
    pub subscribed_at: DateTime<Utc>,
}

/// A course joined with the time the user enrolled in it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct EnrolledCourse {
    #[serde(flatten)]
    pub course: Course,
    pub subscribed_at: DateTime<Utc>,
}

/// Body of an enrollment request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct EnrollRequest {
    /// Course id as a number or string
    #[serde(alias = "courseId")]
    pub course_id: CourseId,
}

/// Structured course filter.
///
/// Set fields combine by conjunction. Empty strings and zero lower bounds
/// impose no constraint. camelCase keys are accepted for compatibility with
/// existing clients.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema, Validate)]
pub struct CourseFilter {
    #[validate(length(max = 100))]
    pub category: Option<String>,

    #[validate(length(max = 100))]
    pub subcategory: Option<String>,

    /// Substring match against the course topic
    #[validate(length(max = 100))]
    pub topic: Option<String>,

    #[validate(length(max = 50))]
    pub language: Option<String>,

    #[serde(alias = "isPaid")]
    pub is_paid: Option<bool>,

    #[serde(alias = "minRating")]
    #[validate(range(min = 0.0, max = 5.0))]
    pub min_rating: Option<f64>,

    #[serde(alias = "maxPrice")]
    #[validate(range(min = 0.0))]
    pub max_price: Option<f64>,

    /// Minimum content length in minutes
    #[serde(alias = "minDuration")]
    #[validate(range(min = 0))]
    pub min_duration: Option<i32>,

    /// Maximum content length in minutes
    #[serde(alias = "maxDuration")]
    #[validate(range(min = 0))]
    pub max_duration: Option<i32>,
}

/// How a filter result was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FilterStrategy {
    /// The filter matched as given
    Exact,
    /// Matched after loosening some constraints
    Relaxed,
    /// Nothing matched; most popular courses instead
    Popular,
}

/// Result of running a filter with relaxation.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterOutcome {
    pub courses: Vec<Course>,
    pub strategy: FilterStrategy,
    /// Human-readable description of each applied relaxation
    pub steps: Vec<String>,
    /// Filter that produced `courses`; `None` for the popular fallback
    pub applied_filter: Option<CourseFilter>,
    /// Fields that match nothing even on their own
    pub conflicts: Vec<String>,
}

/// Response envelope for course listings
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CourseListResponse {
    pub count: usize,
    pub items: Vec<Course>,
}

impl From<Vec<Course>> for CourseListResponse {
    fn from(items: Vec<Course>) -> Self {
        Self {
            count: items.len(),
            items,
        }
    }
}

/// Response envelope for a user's enrolled courses
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EnrolledCoursesResponse {
    pub count: usize,
    pub items: Vec<EnrolledCourse>,
}

/// Response envelope for the structured filter
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FilterResponse {
    pub count: usize,
    pub items: Vec<Course>,
    pub strategy: FilterStrategy,
    pub relaxation_steps: Vec<String>,
    pub applied_filter: Option<CourseFilter>,
    /// Filter fields that match no course by themselves
    pub conflicts: Vec<String>,
}

impl From<FilterOutcome> for FilterResponse {
    fn from(outcome: FilterOutcome) -> Self {
        Self {
            count: outcome.courses.len(),
            items: outcome.courses,
            strategy: outcome.strategy,
            relaxation_steps: outcome.steps,
            applied_filter: outcome.applied_filter,
            conflicts: outcome.conflicts,
        }
    }
}

/// Query parameters for the random sample endpoint
#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
pub struct RandomQuery {
    /// Number of courses to return (default 30, max 100)
    pub limit: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_course_serializes_every_field() {
        let course = Course::new(CourseId::from_i64(7), "Rust Basics");
        let value = serde_json::to_value(&course).unwrap();
        let object = value.as_object().unwrap();

        assert_eq!(object.len(), Course::FIELDS.len() + 1);
        for field in Course::FIELDS {
            assert!(object.contains_key(field), "missing {}", field);
        }
        assert_eq!(object["price"], json!(null));
        assert_eq!(object["id"], json!("7.0"));
    }

    #[test]
    fn test_filter_accepts_camel_case_keys() {
        let filter: CourseFilter = serde_json::from_value(json!({
            "category": "Development",
            "isPaid": false,
            "minRating": 4.0,
            "maxDuration": 120
        }))
        .unwrap();

        assert_eq!(filter.category.as_deref(), Some("Development"));
        assert_eq!(filter.is_paid, Some(false));
        assert_eq!(filter.min_rating, Some(4.0));
        assert_eq!(filter.max_duration, Some(120));
    }

    #[test]
    fn test_filter_validation_rejects_out_of_range_rating() {
        let filter = CourseFilter {
            min_rating: Some(7.5),
            ..Default::default()
        };
        assert!(filter.validate().is_err());
    }

    #[test]
    fn test_enrolled_course_flattens_course() {
        let enrolled = EnrolledCourse {
            course: Course::new(CourseId::from_i64(1), "A"),
            subscribed_at: "2024-01-01T00:00:00Z".parse().unwrap(),
        };
        let value = serde_json::to_value(&enrolled).unwrap();
        assert_eq!(value["title"], json!("A"));
        assert_eq!(value["subscribed_at"], json!("2024-01-01T00:00:00Z"));
    }
}
