//! # voxstrip
//!
//! Download online media and strip music and noise from its speech track.
//!
//! A request moves through three stages:
//! - **Cleaning**: artifacts left behind by an earlier run for the same title are removed
//! - **Downloading**: `yt-dlp` fetches the best video and audio into the working directory
//! - **Processing**: an external speech-processing engine produces the servable file
//!
//! ## Quick Start
//!
//! ```no_run
//! use voxstrip::{ArtifactNamer, CliMediaProcessor, PipelineOrchestrator, YtDlpFetcher};
//! use std::path::PathBuf;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let namer = ArtifactNamer::new("/srv/uploads", "webm");
//!     let fetcher = YtDlpFetcher::from_path(namer.clone()).ok_or("yt-dlp not found")?;
//!     let processor = CliMediaProcessor::new(PathBuf::from(
//!         "./MediaProcessor/build/VideoSpeechProcessing",
//!     ));
//!
//!     let orchestrator = PipelineOrchestrator::new(Arc::new(fetcher), Arc::new(processor), namer);
//!
//!     // Subscribe to events
//!     let mut events = orchestrator.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("Event: {:?}", event);
//!         }
//!     });
//!
//!     let result = orchestrator.run("https://www.youtube.com/watch?v=abc123").await;
//!     println!("{:?}", result);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// REST API module
pub mod api;
/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Media retrieval through yt-dlp
pub mod fetcher;
/// Artifact naming
pub mod naming;
/// Pipeline orchestration
pub mod pipeline;
/// Speech processing engine invocation
pub mod processor;
/// Core types and events
pub mod types;
/// Subprocess helpers
pub(crate) mod utils;

// Re-export commonly used types
pub use config::{ApiConfig, Config, LimitsConfig, StorageConfig, ToolsConfig};
pub use error::{ApiError, DownloadError, Error, ErrorDetail, ProcessingError, Result, ToHttpStatus};
pub use fetcher::{MediaFetcher, YtDlpFetcher};
pub use naming::{ArtifactNamer, ArtifactPaths};
pub use pipeline::{ArtifactLocks, PipelineOrchestrator};
pub use processor::{CliMediaProcessor, MediaProcessor};
pub use types::{Event, PipelineResult, ProcessedArtifact, SourceArtifact, Stage};

/// Wait for a termination signal, then cancel every in-flight pipeline run.
///
/// - **Unix:** listens for SIGTERM and SIGINT, with fallbacks if signal registration fails.
/// - **Windows/other:** listens for Ctrl+C via `tokio::signal::ctrl_c()`.
///
/// # Example
///
/// ```no_run
/// use voxstrip::{ArtifactNamer, CliMediaProcessor, PipelineOrchestrator, YtDlpFetcher, run_with_shutdown};
/// use std::path::PathBuf;
/// use std::sync::Arc;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let namer = ArtifactNamer::new("uploads", "webm");
///     let fetcher = YtDlpFetcher::new(PathBuf::from("yt-dlp"), namer.clone());
///     let processor = CliMediaProcessor::new(PathBuf::from("./engine"));
///     let orchestrator = PipelineOrchestrator::new(Arc::new(fetcher), Arc::new(processor), namer);
///
///     run_with_shutdown(orchestrator).await;
///     Ok(())
/// }
/// ```
pub async fn run_with_shutdown(orchestrator: PipelineOrchestrator) {
    wait_for_signal().await;
    orchestrator.shutdown();
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{Signal, SignalKind, signal};

    // Registration may fail in restricted environments (containers, tests)
    fn register(kind: SignalKind, name: &str) -> Option<Signal> {
        signal(kind)
            .inspect_err(|e| tracing::warn!(error = %e, signal = name, "could not register signal handler"))
            .ok()
    }

    async fn next(signal: Option<Signal>) {
        match signal {
            Some(mut signal) => {
                signal.recv().await;
            }
            None => std::future::pending::<()>().await,
        }
    }

    let sigterm = register(SignalKind::terminate(), "SIGTERM");
    let sigint = register(SignalKind::interrupt(), "SIGINT");
    if sigterm.is_none() && sigint.is_none() {
        tracing::error!("no signal handlers registered, using ctrl_c fallback");
        tokio::signal::ctrl_c().await.ok();
        return;
    }

    tokio::select! {
        _ = next(sigterm) => tracing::info!("received SIGTERM"),
        _ = next(sigint) => tracing::info!("received SIGINT"),
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for Ctrl+C");
    }
}

#[cfg(all(test, unix))]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::path::PathBuf;
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    #[serial]
    async fn test_sigterm_shuts_orchestrator_down() {
        let namer = ArtifactNamer::new("/tmp", "webm");
        let orchestrator = PipelineOrchestrator::new(
            Arc::new(YtDlpFetcher::new(
                PathBuf::from("/nonexistent/yt-dlp"),
                namer.clone(),
            )),
            Arc::new(CliMediaProcessor::new(PathBuf::from("/nonexistent/engine"))),
            namer,
        );
        let waiter = tokio::spawn(run_with_shutdown(orchestrator.clone()));
        // handlers register on the task's first poll
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(!orchestrator.is_shut_down());

        let status = std::process::Command::new("kill")
            .args(["-TERM", &std::process::id().to_string()])
            .status()
            .unwrap();
        assert!(status.success());

        tokio::time::timeout(Duration::from_secs(5), waiter)
            .await
            .expect("SIGTERM was not handled")
            .unwrap();
        assert!(orchestrator.is_shut_down());
    }
}
