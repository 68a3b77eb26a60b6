//! Course Catalog Domain
//!
//! Relational access to courses and enrollments: batch lookups by id,
//! random samples, structured filtering with progressive relaxation, and
//! enrollment.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← /courses/filter, /courses/random, /users/{id}/courses
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← Validation, filter relaxation, popular fallback
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← CatalogRepository (PostgreSQL + in-memory)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← Course, Subscription, CourseFilter, CourseId
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_catalog::{handlers, InMemoryCatalogRepository, CatalogService};
//!
//! let service = CatalogService::new(InMemoryCatalogRepository::new());
//! let router = handlers::router(service);
//! ```

pub mod course_id;
pub mod entity;
pub mod error;
pub mod filter;
pub mod handlers;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod service;

pub use course_id::CourseId;
pub use error::{CatalogError, CatalogResult};
pub use filter::{Constraint, FILTER_RESULT_CAP, RelaxationRule};
pub use handlers::ApiDoc;
pub use models::{
    Course, CourseFilter, CourseListResponse, EnrolledCourse, EnrolledCoursesResponse,
    FilterOutcome, FilterResponse, FilterStrategy, Subscription,
};
pub use postgres::PgCatalogRepository;
pub use repository::{CatalogRepository, InMemoryCatalogRepository};
pub use service::{CatalogService, validate_user_id};
