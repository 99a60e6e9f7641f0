//! Media handlers: submission page, pipeline runs, processed files.

use super::{NO_URL_MESSAGE, SubmitForm, SubmitResponse};
use crate::api::AppState;
use crate::error::Error;
use crate::types::PipelineResult;
use axum::{
    Form, Json,
    body::Body,
    extract::{Path, Request, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use tower::ServiceExt;
use tower_http::services::ServeFile;

const INDEX_HTML: &str = include_str!("../../../templates/index.html");

/// GET / - Submission page
#[utoipa::path(
    get,
    path = "/",
    tag = "media",
    responses(
        (status = 200, description = "HTML submission form", content_type = "text/html")
    )
)]
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// POST / - Download and process the submitted URL
///
/// Blocks until the pipeline finishes. The run is detached from the request,
/// so a client that disconnects does not abort the external tools.
#[utoipa::path(
    post,
    path = "/",
    tag = "media",
    request_body(content = SubmitForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Pipeline finished (completed or failed)", body = SubmitResponse),
        (status = 400, description = "No URL provided", body = SubmitResponse),
        (status = 500, description = "Internal server error", body = crate::error::ApiError)
    )
)]
pub async fn submit(
    State(state): State<AppState>,
    Form(form): Form<SubmitForm>,
) -> Result<(StatusCode, Json<SubmitResponse>), Error> {
    let url = form.url.as_deref().map(str::trim).unwrap_or_default();
    if url.is_empty() {
        return Ok((
            StatusCode::BAD_REQUEST,
            Json(SubmitResponse::Error {
                message: NO_URL_MESSAGE.to_string(),
            }),
        ));
    }

    let orchestrator = state.orchestrator.clone();
    let url = url.to_string();
    let result = tokio::spawn(async move { orchestrator.run(&url).await })
        .await
        .map_err(|e| Error::Other(format!("pipeline task failed: {}", e)))?;

    let response = match result {
        PipelineResult::Completed { servable_filename } => SubmitResponse::Completed {
            video_url: video_url(&servable_filename),
        },
        PipelineResult::Failed { reason } => SubmitResponse::Error { message: reason },
    };
    Ok((StatusCode::OK, Json(response)))
}

/// GET /video/:filename - Stream a processed file from the working directory
#[utoipa::path(
    get,
    path = "/video/{filename}",
    tag = "media",
    params(
        ("filename" = String, Path, description = "Exact file name inside the working directory")
    ),
    responses(
        (status = 200, description = "File contents (range requests supported)"),
        (status = 400, description = "File name is not a plain name", body = crate::error::ApiError),
        (status = 404, description = "No such file", body = crate::error::ApiError)
    )
)]
pub async fn serve_video(
    State(state): State<AppState>,
    Path(filename): Path<String>,
    request: Request,
) -> Result<Response, Error> {
    if !is_plain_file_name(&filename) {
        return Err(Error::InvalidRequest(format!(
            "invalid file name {:?}",
            filename
        )));
    }

    let path = state.config.upload_folder().join(&filename);
    let is_file = tokio::fs::metadata(&path)
        .await
        .map(|meta| meta.is_file())
        .unwrap_or(false);
    if !is_file {
        return Err(Error::ArtifactNotFound(filename));
    }

    tracing::debug!(path = %path.display(), "serving processed file");
    let response = match ServeFile::new(&path).oneshot(request).await {
        Ok(response) => response,
        Err(never) => match never {},
    };
    Ok(response.map(Body::new).into_response())
}

/// Link under which a processed file is served
pub fn video_url(filename: &str) -> String {
    format!("/video/{}", urlencoding::encode(filename))
}

/// A single path component naming a file directly inside the working directory
fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0'])
}
