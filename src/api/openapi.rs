//! OpenAPI document for the HTTP surface

use utoipa::OpenApi;

/// OpenAPI documentation, served at `/openapi.json` and, when enabled,
/// browsable at `/swagger-ui`
#[derive(OpenApi)]
#[openapi(
    info(
        title = "voxstrip HTTP API",
        version = "0.1.0",
        description = "Submit a media URL, wait for download and speech processing, then fetch the processed file",
        license(
            name = "MIT OR Apache-2.0"
        )
    ),
    servers(
        (url = "http://localhost:5000", description = "Local development server")
    ),
    paths(
        // Media
        crate::api::routes::index,
        crate::api::routes::submit,
        crate::api::routes::serve_video,

        // System
        crate::api::routes::health_check,
        crate::api::routes::openapi_spec,
        crate::api::routes::event_stream,
    ),
    components(schemas(
        crate::api::routes::SubmitForm,
        crate::api::routes::SubmitResponse,
        crate::error::ApiError,
        crate::error::ErrorDetail,
    )),
    tags(
        (name = "media", description = "Submit URLs and retrieve processed files"),
        (name = "system", description = "Health checks, OpenAPI document, pipeline events"),
    )
)]
pub struct ApiDoc;
