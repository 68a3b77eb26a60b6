//! Shared state for the app-level routes (readiness).
//!
//! Domain routers carry their own service state.

/// Cloned into each readiness request; all fields are cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub config: crate::config::Config,
    /// PostgreSQL connection pool
    pub db: database::postgres::DatabaseConnection,
    /// Entries in the loaded vector catalog
    pub catalog_entries: usize,
}
