use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use axum_helpers::errors::responses::{
    BadRequestResponse, EmptyResultResponse, InternalServerErrorResponse,
};
use domain_catalog::CatalogRepository;
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::{RecommenderError, RecommenderResult};
use crate::models::{
    CourseAttributes, Fallback, HydratedResult, RecommendQuery, RecommendationResponse,
    SearchQuery, SearchResponse, Strategy,
};
use crate::service::RecommenderService;

pub const RECOMMENDATIONS_TAG: &str = "recommendations";

/// OpenAPI documentation for ranking endpoints
#[derive(OpenApi)]
#[openapi(
    paths(recommendations, search),
    components(
        schemas(
            CourseAttributes,
            HydratedResult,
            RecommendationResponse,
            SearchResponse,
            Strategy
        ),
        responses(BadRequestResponse, EmptyResultResponse, InternalServerErrorResponse)
    ),
    tags(
        (name = RECOMMENDATIONS_TAG, description = "Personalized recommendations and text search")
    )
)]
pub struct ApiDoc;

/// Create the recommender router
pub fn router<R: CatalogRepository + 'static>(service: RecommenderService<R>) -> Router {
    Router::new()
        .route("/recommendations", get(recommendations))
        .route("/search", get(search))
        .with_state(Arc::new(service))
}

/// Recommend courses for a user
///
/// Ranks courses by similarity to the user's enrollments, weighting recent
/// enrollments higher. Enrolled courses are never returned.
#[utoipa::path(
    get,
    path = "/recommendations",
    tag = RECOMMENDATIONS_TAG,
    params(RecommendQuery),
    responses(
        (status = 200, description = "Ranked courses", body = RecommendationResponse),
        (status = 400, response = BadRequestResponse),
        (status = 404, response = EmptyResultResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn recommendations<R: CatalogRepository>(
    State(service): State<Arc<RecommenderService<R>>>,
    Query(query): Query<RecommendQuery>,
) -> RecommenderResult<Json<RecommendationResponse>> {
    let user_id = required(query.user_id.as_deref(), "user_id")?;
    let k = parse_k(query.k.as_deref())?;
    let fallback = parse_fallback(query.fallback.as_deref())?;

    let recommendations = service.recommend_or_sample(user_id, k, fallback).await?;
    Ok(Json(RecommendationResponse {
        user_id: user_id.to_string(),
        strategy: recommendations.strategy,
        count: recommendations.items.len(),
        items: recommendations.items,
    }))
}

/// Search courses by free text
#[utoipa::path(
    get,
    path = "/search",
    tag = RECOMMENDATIONS_TAG,
    params(SearchQuery),
    responses(
        (status = 200, description = "Courses closest to the query", body = SearchResponse),
        (status = 400, response = BadRequestResponse),
        (status = 404, response = EmptyResultResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn search<R: CatalogRepository>(
    State(service): State<Arc<RecommenderService<R>>>,
    Query(query): Query<SearchQuery>,
) -> RecommenderResult<Json<SearchResponse>> {
    let term = required(query.term.as_deref(), "term")?;
    let k = parse_k(query.k.as_deref())?;

    let items = service.search_by_text(term, k).await?;
    Ok(Json(SearchResponse {
        term: term.to_string(),
        count: items.len(),
        items,
    }))
}

fn required<'a>(value: Option<&'a str>, name: &str) -> RecommenderResult<&'a str> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| RecommenderError::Validation(format!("Missing '{}' parameter", name)))
}

/// Absent or blank means the configured default.
fn parse_k(raw: Option<&str>) -> RecommenderResult<Option<usize>> {
    match raw.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(v) => v
            .parse()
            .map(Some)
            .map_err(|_| RecommenderError::Validation("Invalid 'k' parameter".to_string())),
    }
}

fn parse_fallback(raw: Option<&str>) -> RecommenderResult<Fallback> {
    match raw.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(Fallback::None),
        Some(v) if v.eq_ignore_ascii_case("none") => Ok(Fallback::None),
        Some(v) if v.eq_ignore_ascii_case("random") => Ok(Fallback::Random),
        Some(_) => Err(RecommenderError::Validation(
            "Invalid 'fallback' parameter".to_string(),
        )),
    }
}
