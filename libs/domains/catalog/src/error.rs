use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use sea_orm::DbErr;
use thiserror::Error;

use crate::course_id::CourseId;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Course not found: {0}")]
    CourseNotFound(CourseId),

    #[error("User '{user_id}' is already enrolled in course {course_id}")]
    AlreadyEnrolled { user_id: String, course_id: CourseId },

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type CatalogResult<T> = Result<T, CatalogError>;

impl From<DbErr> for CatalogError {
    fn from(err: DbErr) -> Self {
        CatalogError::Internal(format!("Database error: {}", err))
    }
}

/// Convert CatalogError to AppError for standardized error responses
impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::CourseNotFound(id) => AppError::NotFound(format!("Course {} not found", id)),
            CatalogError::AlreadyEnrolled { .. } => {
                AppError::Conflict("Already enrolled in this course".to_string())
            }
            CatalogError::Validation(msg) => AppError::BadRequest(msg),
            CatalogError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}
