use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecommenderError {
    /// Nothing to return for this request; the reason is user-facing.
    #[error("{0}")]
    Empty(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Artifact error: {0}")]
    Artifact(String),

    #[error("Query dimension {actual} does not match index dimension {expected}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type RecommenderResult<T> = Result<T, RecommenderError>;

impl From<reqwest::Error> for RecommenderError {
    fn from(err: reqwest::Error) -> Self {
        RecommenderError::Embedding(err.to_string())
    }
}

impl From<serde_json::Error> for RecommenderError {
    fn from(err: serde_json::Error) -> Self {
        RecommenderError::Artifact(format!("JSON error: {}", err))
    }
}

impl From<std::io::Error> for RecommenderError {
    fn from(err: std::io::Error) -> Self {
        RecommenderError::Artifact(format!("I/O error: {}", err))
    }
}

impl From<domain_catalog::CatalogError> for RecommenderError {
    fn from(err: domain_catalog::CatalogError) -> Self {
        match err {
            domain_catalog::CatalogError::Validation(msg) => RecommenderError::Validation(msg),
            other => RecommenderError::Internal(other.to_string()),
        }
    }
}

/// Convert RecommenderError to AppError for standardized HTTP error responses
impl From<RecommenderError> for AppError {
    fn from(err: RecommenderError) -> Self {
        match err {
            RecommenderError::Empty(reason) => AppError::Empty(reason),
            RecommenderError::Validation(msg) => AppError::BadRequest(msg),
            RecommenderError::Embedding(msg) => AppError::Upstream(msg),
            err @ (RecommenderError::Artifact(_)
            | RecommenderError::DimensionMismatch { .. }
            | RecommenderError::Config(_)
            | RecommenderError::Internal(_)) => AppError::InternalServerError(err.to_string()),
        }
    }
}

impl IntoResponse for RecommenderError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}
