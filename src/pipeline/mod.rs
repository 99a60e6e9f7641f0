//! Pipeline orchestration
//!
//! A run moves through `Cleaning -> Downloading -> Processing` and ends as
//! [`PipelineResult::Completed`] or [`PipelineResult::Failed`]:
//!
//! 1. **Cleaning**: the media title is resolved, the per-base-name lock is
//!    taken and the previous run's artifacts for that base name are removed.
//! 2. **Downloading**: the [`MediaFetcher`] materializes the source file. If
//!    the downloaded title differs from the probed one, the new base name is
//!    locked and its old engine outputs are removed too.
//! 3. **Processing**: the [`MediaProcessor`] turns it into the servable file.
//!
//! Stage errors are logged in full and collapsed into the two caller-facing
//! messages; nothing is retried.

mod cleanup;
mod locks;


pub use locks::{ArtifactGuard, ArtifactLocks};

use crate::fetcher::MediaFetcher;
use crate::naming::{ArtifactNamer, is_usable_base_name};
use crate::processor::MediaProcessor;
use crate::types::{Event, PipelineResult, Stage};
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Capacity of the event broadcast channel
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Drives fetch and processing for each request
///
/// Cloning is cheap; clones share the lock registry, the event channel and the
/// shutdown token.
#[derive(Clone)]
pub struct PipelineOrchestrator {
    fetcher: Arc<dyn MediaFetcher>,
    processor: Arc<dyn MediaProcessor>,
    namer: ArtifactNamer,
    locks: ArtifactLocks,
    event_tx: broadcast::Sender<Event>,
    shutdown: CancellationToken,
}

impl PipelineOrchestrator {
    /// Create an orchestrator writing artifacts through `namer`
    pub fn new(
        fetcher: Arc<dyn MediaFetcher>,
        processor: Arc<dyn MediaProcessor>,
        namer: ArtifactNamer,
    ) -> Self {
        let (event_tx, _rx) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            fetcher,
            processor,
            namer,
            locks: ArtifactLocks::new(),
            event_tx,
            shutdown: CancellationToken::new(),
        }
    }

    /// Subscribe to pipeline events
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// Namer used for artifact paths
    pub fn namer(&self) -> &ArtifactNamer {
        &self.namer
    }

    /// Registry of base names currently being worked on
    pub fn locks(&self) -> &ArtifactLocks {
        &self.locks
    }

    /// Cancel every in-flight run; external tools are killed
    pub fn shutdown(&self) {
        info!("cancelling in-flight pipeline runs");
        self.shutdown.cancel();
    }

    /// Whether [`shutdown`](Self::shutdown) has been called
    pub fn is_shut_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    /// Run the pipeline for `url`, cancelled only by [`shutdown`](Self::shutdown)
    pub async fn run(&self, url: &str) -> PipelineResult {
        let cancel = self.shutdown.child_token();
        self.run_with_cancel(url, &cancel).await
    }

    /// Run the pipeline for `url` until it finishes or `cancel` fires
    pub async fn run_with_cancel(&self, url: &str, cancel: &CancellationToken) -> PipelineResult {
        info!(url, fetcher = self.fetcher.name(), processor = self.processor.name(), "starting pipeline run");

        // Cleaning: the base name is only known once the title is resolved
        let title = match self.fetcher.resolve_title(url, cancel).await {
            Ok(title) => title,
            Err(e) => {
                error!(url, error = %e, "error resolving media title");
                return self.fail(url, Stage::Downloading, PipelineResult::download_failed());
            }
        };
        let paths = self.namer.for_title(&title);
        if !is_usable_base_name(&paths.base_name) {
            error!(url, title, "media title does not produce a usable file name");
            return self.fail(url, Stage::Downloading, PipelineResult::download_failed());
        }

        let _guard = self.locks.acquire(&paths.base_name).await;
        self.emit(Event::Cleaning {
            url: url.to_string(),
            base_name: paths.base_name.clone(),
        });
        if let Err(e) = cleanup::remove_stale_artifacts(&paths).await {
            error!(url, base_name = %paths.base_name, error = %e, "failed to remove old artifacts");
            return self.fail(url, Stage::Cleaning, PipelineResult::download_failed());
        }

        // Downloading
        self.emit(Event::Downloading {
            url: url.to_string(),
            base_name: paths.base_name.clone(),
        });
        let source = match self.fetcher.fetch(url, cancel).await {
            Ok(source) => source,
            Err(e) => {
                error!(url, error = %e, "error downloading media");
                return self.fail(url, Stage::Downloading, PipelineResult::download_failed());
            }
        };
        // the title can change between probe and download; the resolved name
        // then needs its own lock and its own cleaning
        let _resolved_guard = if source.base_name != paths.base_name {
            warn!(
                expected = %paths.base_name,
                actual = %source.base_name,
                "title changed between probe and download"
            );
            let guard = self.locks.acquire(&source.base_name).await;
            let resolved = self.namer.for_base_name(&source.base_name);
            if let Err(e) = cleanup::remove_stale_outputs(&resolved).await {
                error!(url, base_name = %resolved.base_name, error = %e, "failed to remove old artifacts");
                return self.fail(url, Stage::Cleaning, PipelineResult::download_failed());
            }
            Some(guard)
        } else {
            None
        };

        // Processing
        self.emit(Event::Processing {
            url: url.to_string(),
            base_name: source.base_name.clone(),
        });
        let processed = match self.processor.process(&source.path, cancel).await {
            Ok(processed) => processed,
            Err(e) => {
                error!(url, source = %source.path.display(), error = %e, "error processing media");
                return self.fail(url, Stage::Processing, PipelineResult::processing_failed());
            }
        };

        let Some(filename) = processed.base_name() else {
            error!(output = %processed.path.display(), "processed path has no file name");
            return self.fail(url, Stage::Processing, PipelineResult::processing_failed());
        };
        if processed.path.parent() != Some(self.namer.work_dir()) {
            warn!(
                output = %processed.path.display(),
                work_dir = %self.namer.work_dir().display(),
                "processed file is outside the working directory and cannot be served"
            );
        }

        info!(url, filename, "pipeline run completed");
        self.emit(Event::Completed {
            url: url.to_string(),
            filename: filename.clone(),
        });
        PipelineResult::Completed {
            servable_filename: filename,
        }
    }

    fn fail(&self, url: &str, stage: Stage, result: PipelineResult) -> PipelineResult {
        if let PipelineResult::Failed { reason } = &result {
            self.emit(Event::Failed {
                url: url.to_string(),
                stage,
                reason: reason.clone(),
            });
        }
        result
    }

    fn emit(&self, event: Event) {
        // no subscribers is fine
        self.event_tx.send(event).ok();
    }
}
