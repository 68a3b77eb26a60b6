//! Prometheus metrics for the course finder services.
//!
//! - [`init_metrics`] installs the global recorder once
//! - [`metrics_handler`] renders the scrape body for `/metrics`
//! - [`middleware::metrics_middleware`] records per-route HTTP metrics
//! - [`RecommenderMetrics`] records ranking and search outcomes
//!
//! ```rust,ignore
//! observability::init_metrics()?;
//!
//! let app = Router::new()
//!     .route("/metrics", get(observability::metrics_handler))
//!     .route_layer(middleware::from_fn(observability::metrics_middleware));
//! ```

pub mod middleware;
pub mod recommender;

pub use middleware::metrics_middleware;
pub use recommender::RecommenderMetrics;

pub use metrics::{counter, gauge, histogram};

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use tracing::info;

static METRICS_HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

/// Install the Prometheus recorder. Later calls return the same handle.
pub fn init_metrics() -> Result<&'static PrometheusHandle, BuildError> {
    METRICS_HANDLE.get_or_try_init(|| {
        let handle = PrometheusBuilder::new().install_recorder()?;
        info!("Prometheus metrics recorder initialized");
        register_metric_descriptions();
        Ok(handle)
    })
}

pub fn get_metrics_handle() -> Option<&'static PrometheusHandle> {
    METRICS_HANDLE.get()
}

/// Axum handler for `/metrics`.
pub async fn metrics_handler() -> String {
    match get_metrics_handle() {
        Some(handle) => handle.render(),
        None => "# Metrics not initialized\n".to_string(),
    }
}

fn register_metric_descriptions() {
    use metrics::{describe_counter, describe_gauge, describe_histogram};

    describe_counter!("http_requests_total", "Total number of HTTP requests");
    describe_histogram!(
        "http_request_duration_seconds",
        "HTTP request duration in seconds"
    );
    describe_counter!(
        "http_requests_errors_total",
        "Total number of HTTP requests answered with 4xx or 5xx"
    );

    describe_counter!(
        "recommendations_served_total",
        "Ranked result lists returned, by strategy"
    );
    describe_histogram!(
        "recommendation_duration_seconds",
        "Time spent ranking one request, by strategy"
    );
    describe_counter!(
        "recommendations_empty_total",
        "Requests that produced no candidates, by reason"
    );
    describe_counter!(
        "interest_vectors_skipped_total",
        "Subscriptions without a resolvable vector"
    );
    describe_counter!(
        "upstream_failures_total",
        "Failed calls to the relational store or embedding endpoint"
    );
    describe_counter!(
        "filter_relaxation_steps_total",
        "Relaxation steps applied to structured filters"
    );
    describe_gauge!("catalog_entries", "Entries in the loaded vector catalog");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_metrics_handler_before_and_after_init() {
        if get_metrics_handle().is_none() {
            assert!(metrics_handler().await.contains("not initialized"));
        }
        let first = init_metrics().unwrap() as *const PrometheusHandle;
        let second = init_metrics().unwrap() as *const PrometheusHandle;
        assert_eq!(first, second);
    }
}
