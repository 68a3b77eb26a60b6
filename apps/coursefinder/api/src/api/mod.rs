use axum::{Router, middleware, routing::get};
use domain_catalog::{CatalogService, PgCatalogRepository};
use domain_recommender::RecommenderService;
use std::sync::Arc;

pub mod health;

/// API routes without the `/api` prefix; `create_router` adds it.
///
/// Both domain routers have their state applied, so the result is stateless.
pub fn routes(
    repository: Arc<PgCatalogRepository>,
    recommender: RecommenderService<PgCatalogRepository>,
) -> Router {
    Router::new()
        .merge(domain_catalog::handlers::router(CatalogService::from_shared(repository)))
        .merge(domain_recommender::handlers::router(recommender))
        .route_layer(middleware::from_fn(observability::metrics_middleware))
}

/// `/ready` with real dependency checks and the Prometheus `/metrics` scrape.
pub fn ops_router(state: crate::state::AppState) -> Router {
    Router::new()
        .route("/ready", get(health::ready_handler))
        .with_state(state)
        .route("/metrics", get(observability::metrics_handler))
}
