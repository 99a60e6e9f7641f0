//! Trait for media retrieval backends

use crate::error::DownloadError;
use crate::types::SourceArtifact;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// Retrieves remote media into the working directory
///
/// Implementations must leave the merged container at the canonical source
/// path for the media's base name (see [`crate::naming::ArtifactNamer`]) and
/// return its absolute path.
#[async_trait]
pub trait MediaFetcher: Send + Sync {
    /// Look up the media title without downloading anything
    ///
    /// The pipeline uses the title to lock and clean the artifact set before
    /// the download starts.
    async fn resolve_title(
        &self,
        url: &str,
        cancel: &CancellationToken,
    ) -> Result<String, DownloadError>;

    /// Download the best combined audio+video rendition of `url`
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The retrieval tool cannot be started or reports a failure
    /// - The merged file is not where the tool's metadata says it should be
    /// - The timeout elapses or `cancel` fires
    async fn fetch(
        &self,
        url: &str,
        cancel: &CancellationToken,
    ) -> Result<SourceArtifact, DownloadError>;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}
