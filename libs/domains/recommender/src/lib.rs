//! Recommender Domain
//!
//! Content-based course recommendations and free-text course search over a
//! precomputed vector index.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐
//! │   Handlers   │  ← /recommendations, /search
//! └──────┬───────┘
//!        │
//! ┌──────▼───────┐
//! │   Service    │  ← RecommenderService: load, fallback policy, metrics
//! └──────┬───────┘
//!        │
//! ┌──────▼───────────────────────────────┐
//! │ InterestAggregator │ TextSearch      │  ← fusion / query embedding
//! └──────┬───────────────────────┬───────┘
//!        │                       │
//! ┌──────▼───────┐        ┌──────▼───────┐
//! │ IndexAdapter │        │  Embedding   │  ← AnnIndex + metadata / HTTP API
//! └──────┬───────┘        └──────────────┘
//!        │
//! ┌──────▼───────┐
//! │   Hydrator   │  ← one batched catalog lookup
//! └──────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_catalog::InMemoryCatalogRepository;
//! use domain_recommender::{
//!     handlers, OpenAIConfig, OpenAIProvider, RecommenderConfig, RecommenderService,
//! };
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), domain_recommender::RecommenderError> {
//! let repository = Arc::new(InMemoryCatalogRepository::new());
//! let embedder = Arc::new(OpenAIProvider::new(OpenAIConfig::default())?);
//! let service =
//!     RecommenderService::load(RecommenderConfig::default(), repository, embedder).await?;
//! let router = handlers::router(service);
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod aggregator;
pub mod clock;
pub mod config;
pub mod embedding;
pub mod error;
pub mod handlers;
pub mod hydrator;
pub mod index;
pub mod metadata;
pub mod models;
pub mod service;
pub mod text_query;

pub use adapter::VectorIndexAdapter;
pub use aggregator::{InterestAggregator, recency_weight};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::RecommenderConfig;
pub use embedding::{EmbeddingProvider, OpenAIConfig, OpenAIProvider};
pub use error::{RecommenderError, RecommenderResult};
pub use handlers::ApiDoc;
pub use index::{AnnIndex, FlatIpIndex};
pub use metadata::CatalogMetadata;
pub use models::{Fallback, HydratedResult, RankedResult, Recommendations, Strategy};
pub use service::RecommenderService;
