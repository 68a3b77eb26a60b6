use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    components(
        schemas(axum_helpers::ErrorResponse)
    ),
    info(
        title = "Course Finder API",
        version = "0.1.0",
        description = "Course recommendations, text search, structured filtering and enrollments"
    ),
    servers(
        (url = "/api", description = "API base path")
    )
)]
struct BaseDoc;

/// Combined documentation for the catalog and recommender routes.
///
/// Both domains document paths relative to `/api`, so their documents are
/// merged rather than nested.
pub struct ApiDoc;

impl OpenApi for ApiDoc {
    fn openapi() -> utoipa::openapi::OpenApi {
        let mut doc = BaseDoc::openapi();
        doc.merge(domain_catalog::ApiDoc::openapi());
        doc.merge(domain_recommender::ApiDoc::openapi());
        doc
    }
}
