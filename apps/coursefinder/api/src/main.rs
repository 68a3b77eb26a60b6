use axum_helpers::server::{create_production_app, health_router};
use core_config::tracing::{init_tracing, install_color_eyre};
use domain_catalog::PgCatalogRepository;
use domain_recommender::{OpenAIProvider, RecommenderService};
use migration::Migrator;
use std::sync::Arc;
use tracing::info;

mod api;
mod config;
mod openapi;
mod state;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    install_color_eyre();

    let config = Config::from_env()?;
    init_tracing(&config.environment);

    observability::init_metrics()
        .map_err(|e| eyre::eyre!("Failed to install metrics recorder: {}", e))?;

    let db = database::postgres::connect_from_config_with_retry(config.database.clone(), None)
        .await
        .map_err(|e| eyre::eyre!("PostgreSQL connection failed: {}", e))?;
    database::postgres::run_migrations::<Migrator>(&db, config.app.name)
        .await
        .map_err(|e| eyre::eyre!("Migrations failed: {}", e))?;

    let embedder = OpenAIProvider::new(config.embedding.clone())
        .map_err(|e| eyre::eyre!("Failed to build embedding client: {}", e))?;

    let repository = Arc::new(PgCatalogRepository::new(db.clone()));
    let recommender = RecommenderService::load(
        config.recommender.clone(),
        Arc::clone(&repository),
        Arc::new(embedder),
    )
    .await
    .map_err(|e| eyre::eyre!("Failed to load recommender artifacts: {}", e))?;

    let state = AppState {
        catalog_entries: recommender.catalog_size(),
        config,
        db,
    };

    let api_routes = api::routes(repository, recommender);
    let cors = axum_helpers::cors_layer_from_env(&state.config.environment)?;
    let router = axum_helpers::create_router::<openapi::ApiDoc>(api_routes, cors);

    // /health: liveness with app name/version
    // /ready: database and vector catalog checks
    // /metrics: Prometheus scrape
    let app = router
        .merge(health_router(state.config.app.clone()))
        .merge(api::ops_router(state.clone()));

    info!(
        catalog_entries = state.catalog_entries,
        "Starting course finder API"
    );

    let shutdown_timeout = state.config.server.shutdown_timeout();
    create_production_app(
        app,
        &state.config.server,
        shutdown_timeout,
        async move {
            info!("Shutting down: closing database connections");
            match state.db.close().await {
                Ok(_) => info!("PostgreSQL connection closed successfully"),
                Err(e) => tracing::error!("Error closing PostgreSQL: {}", e),
            }
        },
    )
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Course finder API shutdown complete");
    Ok(())
}
