//! JSON body extractor that runs `validator` rules before the handler.

use crate::errors::AppError;
use axum::extract::{FromRequest, Json, Request};
use serde::de::DeserializeOwned;
use validator::Validate;

/// Deserialize the body as `T` and validate it.
///
/// Malformed JSON becomes [`AppError::JsonExtractorRejection`]; rule
/// violations become [`AppError::ValidationError`] with per-field details.
///
/// ```ignore
/// async fn filter(ValidatedJson(filter): ValidatedJson<CourseFilter>) -> impl IntoResponse {
///     // `filter` passed its #[validate] rules
/// }
/// ```
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(data) = Json::<T>::from_request(req, state).await?;
        data.validate()?;
        Ok(ValidatedJson(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, body::Body, http::StatusCode, routing::post};
    use serde::Deserialize;
    use tower::ServiceExt;

    #[derive(Deserialize, Validate)]
    struct Limit {
        #[validate(range(min = 1, max = 100))]
        limit: u32,
    }

    async fn echo(ValidatedJson(body): ValidatedJson<Limit>) -> String {
        body.limit.to_string()
    }

    fn request(body: &'static str) -> axum::http::Request<Body> {
        axum::http::Request::builder()
            .method("POST")
            .uri("/")
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_valid_body_reaches_handler() {
        let app = Router::new().route("/", post(echo));
        let response = app.oneshot(request(r#"{"limit": 5}"#)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_rule_violation_is_400() {
        let app = Router::new().route("/", post(echo));
        let response = app.oneshot(request(r#"{"limit": 500}"#)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_malformed_json_is_rejected() {
        let app = Router::new().route("/", post(echo));
        let response = app.oneshot(request(r#"{"limit": "#)).await.unwrap();
        assert!(response.status().is_client_error());
    }
}
