use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use axum_helpers::{
    ValidatedJson,
    errors::responses::{
        BadRequestResponse, BadRequestValidationResponse, ConflictResponse,
        InternalServerErrorResponse, NotFoundResponse,
    },
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::CatalogResult;
use crate::models::{
    Course, CourseFilter, CourseListResponse, EnrollRequest, EnrolledCourse,
    EnrolledCoursesResponse, FilterResponse, FilterStrategy, RandomQuery, Subscription,
};
use crate::repository::CatalogRepository;
use crate::service::CatalogService;

pub const COURSES_TAG: &str = "courses";
pub const ENROLLMENTS_TAG: &str = "enrollments";

/// OpenAPI documentation for catalog browsing and enrollment
#[derive(OpenApi)]
#[openapi(
    paths(filter_courses, random_courses, list_enrolled_courses, enroll),
    components(
        schemas(
            Course,
            CourseFilter,
            CourseListResponse,
            EnrollRequest,
            EnrolledCourse,
            EnrolledCoursesResponse,
            FilterResponse,
            FilterStrategy,
            Subscription
        ),
        responses(
            BadRequestResponse,
            BadRequestValidationResponse,
            ConflictResponse,
            InternalServerErrorResponse,
            NotFoundResponse
        )
    ),
    tags(
        (name = COURSES_TAG, description = "Course catalog browsing"),
        (name = ENROLLMENTS_TAG, description = "User enrollments")
    )
)]
pub struct ApiDoc;

/// Create the catalog router with all HTTP endpoints
pub fn router<R: CatalogRepository + 'static>(service: CatalogService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/courses/filter", post(filter_courses))
        .route("/courses/random", get(random_courses))
        .route(
            "/users/{user_id}/courses",
            get(list_enrolled_courses).post(enroll),
        )
        .with_state(shared_service)
}

/// Filter courses by structured attributes
///
/// Constraints are loosened step by step when nothing matches; the response
/// lists every relaxation applied.
#[utoipa::path(
    post,
    path = "/courses/filter",
    tag = COURSES_TAG,
    request_body = CourseFilter,
    responses(
        (status = 200, description = "Matching courses, best rated first", body = FilterResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn filter_courses<R: CatalogRepository>(
    State(service): State<Arc<CatalogService<R>>>,
    ValidatedJson(filter): ValidatedJson<CourseFilter>,
) -> CatalogResult<Json<FilterResponse>> {
    let outcome = service.filter_courses(filter).await?;
    Ok(Json(outcome.into()))
}

/// Random sample of courses
#[utoipa::path(
    get,
    path = "/courses/random",
    tag = COURSES_TAG,
    params(RandomQuery),
    responses(
        (status = 200, description = "Randomly chosen courses", body = CourseListResponse),
        (status = 400, response = BadRequestResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn random_courses<R: CatalogRepository>(
    State(service): State<Arc<CatalogService<R>>>,
    Query(query): Query<RandomQuery>,
) -> CatalogResult<Json<CourseListResponse>> {
    let courses = service.random_courses(query.limit).await?;
    Ok(Json(courses.into()))
}

/// Courses a user is enrolled in
#[utoipa::path(
    get,
    path = "/users/{user_id}/courses",
    tag = ENROLLMENTS_TAG,
    params(
        ("user_id" = String, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Enrolled courses, most recent first", body = EnrolledCoursesResponse),
        (status = 400, response = BadRequestResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_enrolled_courses<R: CatalogRepository>(
    State(service): State<Arc<CatalogService<R>>>,
    Path(user_id): Path<String>,
) -> CatalogResult<Json<EnrolledCoursesResponse>> {
    let items = service.enrolled_courses(&user_id).await?;
    Ok(Json(EnrolledCoursesResponse {
        count: items.len(),
        items,
    }))
}

/// Enroll a user in a course
#[utoipa::path(
    post,
    path = "/users/{user_id}/courses",
    tag = ENROLLMENTS_TAG,
    params(
        ("user_id" = String, Path, description = "User ID")
    ),
    request_body = EnrollRequest,
    responses(
        (status = 201, description = "Enrollment recorded", body = Subscription),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn enroll<R: CatalogRepository>(
    State(service): State<Arc<CatalogService<R>>>,
    Path(user_id): Path<String>,
    ValidatedJson(input): ValidatedJson<EnrollRequest>,
) -> CatalogResult<impl IntoResponse> {
    let subscription = service.enroll(&user_id, &input.course_id).await?;
    Ok((StatusCode::CREATED, Json(subscription)))
}
