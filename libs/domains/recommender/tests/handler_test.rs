//! Recommendation and search endpoints over loaded artifacts: status codes,
//! envelopes and error bodies.

mod common;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::Duration;
use common::*;
use domain_catalog::Subscription;
use domain_recommender::*;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

async fn json_body<T: serde::de::DeserializeOwned>(body: Body) -> T {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn app(dir: &std::path::Path, embedder: FakeEmbedder) -> Router {
    write_artifacts(dir);
    let repo = Arc::new(repository());
    repo.insert_subscription(
        "learner",
        Subscription {
            course_id: cid(1),
            subscribed_at: chrono::Utc::now() - Duration::days(1),
        },
    )
    .await;

    let service = RecommenderService::load(config_for(dir), repo, Arc::new(embedder))
        .await
        .unwrap();
    handlers::router(service)
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    (status, json_body(response.into_body()).await)
}

#[tokio::test]
async fn test_recommendations_returns_hydrated_envelope() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(dir.path(), FakeEmbedder::Failing).await;

    let (status, body) = get(app, "/recommendations?user_id=learner").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user_id"], json!("learner"));
    assert_eq!(body["strategy"], json!("content_based"));
    assert_eq!(body["count"], json!(2));
    assert_eq!(body["items"][0]["course_id"], json!("2.0"));
    assert_eq!(body["items"][0]["title"], json!("Async Rust"));
    assert_eq!(body["items"][1]["course_id"], json!("3.0"));
    // no catalog row for course 3
    assert_eq!(body["items"][1]["title"], Value::Null);
    assert!(body["items"][1].as_object().unwrap().contains_key("instructor_url"));
}

#[tokio::test]
async fn test_recommendations_respects_k() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(dir.path(), FakeEmbedder::Failing).await;

    let (status, body) = get(app, "/recommendations?user_id=learner&k=1").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], json!(1));
    assert_eq!(body["items"][0]["course_id"], json!("2.0"));
}

#[tokio::test]
async fn test_recommendations_requires_user_id() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(dir.path(), FakeEmbedder::Failing).await;

    let (status, body) = get(app, "/recommendations?user_id=%20").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("INVALID_PARAMETER"));
    assert_eq!(body["message"], json!("Missing 'user_id' parameter"));
}

#[tokio::test]
async fn test_recommendations_rejects_bad_k() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(dir.path(), FakeEmbedder::Failing).await;

    let (status, body) = get(app, "/recommendations?user_id=learner&k=lots").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], json!("Invalid 'k' parameter"));
}

#[tokio::test]
async fn test_user_without_history_is_empty_result() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(dir.path(), FakeEmbedder::Failing).await;

    let (status, body) = get(app, "/recommendations?user_id=newcomer").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], json!("EMPTY_RESULT"));
    assert_eq!(body["message"], json!("no subscriptions"));
}

#[tokio::test]
async fn test_random_fallback_for_user_without_history() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(dir.path(), FakeEmbedder::Failing).await;

    let (status, body) = get(app, "/recommendations?user_id=newcomer&fallback=random").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["strategy"], json!("random"));
    assert_eq!(body["count"], json!(3));
    assert!(body["items"].as_array().unwrap().iter().all(|i| i["score"].is_null()));
}

#[tokio::test]
async fn test_unknown_fallback_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(dir.path(), FakeEmbedder::Failing).await;

    let (status, body) = get(app, "/recommendations?user_id=newcomer&fallback=popular").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], json!("Invalid 'fallback' parameter"));
}

#[tokio::test]
async fn test_search_ranks_by_query_similarity() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(dir.path(), FakeEmbedder::Fixed(vec![0.0, 1.0])).await;

    let (status, body) = get(app, "/search?term=web%20services&k=2").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["term"], json!("web services"));
    assert_eq!(body["count"], json!(2));
    assert_eq!(body["items"][0]["course_id"], json!("3.0"));
    assert_eq!(body["items"][1]["course_id"], json!("2.0"));
}

#[tokio::test]
async fn test_search_requires_term() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(dir.path(), FakeEmbedder::Fixed(vec![0.0, 1.0])).await;

    let (status, body) = get(app, "/search").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], json!("Missing 'term' parameter"));
}

#[tokio::test]
async fn test_search_reports_unavailable_embeddings_as_empty() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(dir.path(), FakeEmbedder::Failing).await;

    let (status, body) = get(app, "/search?term=rust").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], json!("EMPTY_RESULT"));
    assert!(!body["message"].as_str().unwrap().contains("connection refused"));
}
