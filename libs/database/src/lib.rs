//! PostgreSQL connection management for the course catalog.
//!
//! - [`postgres::PostgresConfig`]: pool settings, loadable from `DATABASE_URL`
//!   and `DB_*` variables with the `config` feature
//! - [`postgres::connect_from_config_with_retry`]: startup connect with
//!   exponential backoff
//! - [`postgres::run_migrations`] and [`postgres::check_health`]
//!
//! ```ignore
//! use database::postgres::{self, PostgresConfig};
//!
//! let db = postgres::connect_from_config_with_retry(PostgresConfig::from_env()?, None).await?;
//! postgres::run_migrations::<migration::Migrator>(&db, "coursefinder_api").await?;
//! ```

pub mod common;
pub mod postgres;

pub use common::{DatabaseError, DatabaseResult};
