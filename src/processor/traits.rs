//! Trait for processing engine backends

use crate::error::ProcessingError;
use crate::types::ProcessedArtifact;
use async_trait::async_trait;
use std::path::Path;
use tokio_util::sync::CancellationToken;

/// Removes music and background noise from a media file's speech track
#[async_trait]
pub trait MediaProcessor: Send + Sync {
    /// Process `source` and return the artifact the engine produced
    ///
    /// `source` is expected to exist; it is not re-validated here.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The engine cannot be started
    /// - The engine exits with a non-zero status
    /// - The engine exits cleanly but never reports an output path
    /// - The timeout elapses or `cancel` fires
    async fn process(
        &self,
        source: &Path,
        cancel: &CancellationToken,
    ) -> Result<ProcessedArtifact, ProcessingError>;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}
