use super::*;
use crate::error::{DownloadError, ProcessingError};
use crate::naming::ArtifactNamer;
use crate::types::{ProcessedArtifact, SourceArtifact};
use crate::{MediaFetcher, MediaProcessor};
use async_trait::async_trait;
use axum::body::{Body, to_bytes};
use axum::extract::Request;
use axum::http::StatusCode;
use axum::response::Response;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;


/// Fetcher that materializes a fixed title, or fails when `fail` is set
struct StubFetcher {
    namer: ArtifactNamer,
    title: &'static str,
    fail: bool,
}

#[async_trait]
impl MediaFetcher for StubFetcher {
    async fn resolve_title(
        &self,
        _url: &str,
        _cancel: &CancellationToken,
    ) -> std::result::Result<String, DownloadError> {
        Ok(self.title.to_string())
    }

    async fn fetch(
        &self,
        url: &str,
        _cancel: &CancellationToken,
    ) -> std::result::Result<SourceArtifact, DownloadError> {
        if self.fail {
            return Err(DownloadError::EngineFailed {
                url: url.to_string(),
                code: Some(1),
                stderr: "ERROR: Video unavailable".to_string(),
            });
        }
        let paths = self.namer.for_title(self.title);
        std::fs::write(&paths.source, b"source").unwrap();
        Ok(SourceArtifact {
            path: paths.source,
            base_name: paths.base_name,
            extension: self.namer.container_ext().to_string(),
            title: self.title.to_string(),
        })
    }

    fn name(&self) -> &'static str {
        "stub-fetcher"
    }
}

/// Processor writing `<base>_processed_video.mp4` next to the source
struct StubProcessor;

#[async_trait]
impl MediaProcessor for StubProcessor {
    async fn process(
        &self,
        source: &Path,
        _cancel: &CancellationToken,
    ) -> std::result::Result<ProcessedArtifact, ProcessingError> {
        let stem = source.file_stem().unwrap().to_string_lossy().into_owned();
        let output = source.with_file_name(format!("{}_processed_video.mp4", stem));
        std::fs::write(&output, b"processed video bytes").unwrap();
        Ok(ProcessedArtifact::new(output))
    }

    fn name(&self) -> &'static str {
        "stub-processor"
    }
}

struct TestApp {
    dir: TempDir,
    orchestrator: Arc<PipelineOrchestrator>,
    config: Arc<Config>,
}

impl TestApp {
    fn router(&self) -> Router {
        create_router(self.orchestrator.clone(), self.config.clone())
    }
}

fn test_app_with(config: Config, title: &'static str, fail: bool) -> TestApp {
    let dir = TempDir::new().unwrap();
    let mut config = config;
    config.storage.upload_folder = dir.path().to_path_buf();

    let namer = ArtifactNamer::new(dir.path(), "webm");
    let fetcher = StubFetcher {
        namer: namer.clone(),
        title,
        fail,
    };
    let orchestrator = PipelineOrchestrator::new(Arc::new(fetcher), Arc::new(StubProcessor), namer);

    TestApp {
        dir,
        orchestrator: Arc::new(orchestrator),
        config: Arc::new(config),
    }
}

fn test_app() -> TestApp {
    test_app_with(Config::default(), "My Song", false)
}

fn get(uri: &str) -> Request {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_form(body: &str) -> Request {
    Request::builder()
        .method("POST")
        .uri("/")
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: Response) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_api_server_spawns() {
    let app = test_app();
    let mut config = (*app.config).clone();
    config.api.bind_address = "127.0.0.1:0".parse().unwrap(); // Port 0 = OS assigns a free port
    let config = Arc::new(config);

    let api_handle = tokio::spawn({
        let orchestrator = app.orchestrator.clone();
        async move { start_api_server(orchestrator, config).await }
    });

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(!api_handle.is_finished(), "server exited early");

    api_handle.abort();
}

#[tokio::test]
async fn test_cors_enabled() {
    let app = test_app();

    let request = Request::builder()
        .uri("/health")
        .header("Origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();
    let response = app.router().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response.headers().contains_key("access-control-allow-origin"),
        "CORS header should be present when CORS is enabled"
    );
}

#[tokio::test]
async fn test_cors_disabled() {
    let mut config = Config::default();
    config.api.cors_enabled = false;
    let app = test_app_with(config, "My Song", false);

    let request = Request::builder()
        .uri("/health")
        .header("Origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();
    let response = app.router().oneshot(request).await.unwrap();

    assert!(!response.headers().contains_key("access-control-allow-origin"));
}

#[tokio::test]
async fn test_cors_specific_origin() {
    let mut config = Config::default();
    config.api.cors_origins = vec!["http://allowed.example".to_string()];
    let app = test_app_with(config, "My Song", false);

    let request = Request::builder()
        .uri("/health")
        .header("Origin", "http://allowed.example")
        .body(Body::empty())
        .unwrap();
    let response = app.router().oneshot(request).await.unwrap();

    assert_eq!(
        response.headers().get("access-control-allow-origin").unwrap(),
        "http://allowed.example"
    );
}
