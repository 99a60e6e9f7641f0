//! Core types and events

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use utoipa::ToSchema;

/// Message reported to callers when retrieval fails
pub const DOWNLOAD_FAILED_MESSAGE: &str = "Failed to download video.";

/// Message reported to callers when processing fails
pub const PROCESSING_FAILED_MESSAGE: &str = "Failed to process video.";

/// A media file fetched into the working directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceArtifact {
    /// Absolute path of the renamed file
    pub path: PathBuf,
    /// Sanitized base name derived from the title
    pub base_name: String,
    /// Container extension (without the dot)
    pub extension: String,
    /// Title as reported by the retrieval tool
    pub title: String,
}

/// The file produced by the processing engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedArtifact {
    /// Path reported on the engine's standard output
    ///
    /// The base name is not stored; [`base_name`](Self::base_name) derives it.
    pub path: PathBuf,
}

impl ProcessedArtifact {
    /// Wrap a path reported by the engine
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Base name inferred from the reported path: its final component, which is
    /// also the servable file name
    pub fn base_name(&self) -> Option<String> {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
    }

    /// Path reported by the engine
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Outcome of one pipeline run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PipelineResult {
    /// Both stages succeeded
    Completed {
        /// File name under which the processed artifact can be fetched
        servable_filename: String,
    },
    /// A stage failed; `reason` is safe to show to users
    Failed {
        /// Coarse, user-facing failure message
        reason: String,
    },
}

impl PipelineResult {
    /// Failure caused by the retrieval stage
    pub fn download_failed() -> Self {
        Self::Failed {
            reason: DOWNLOAD_FAILED_MESSAGE.to_string(),
        }
    }

    /// Failure caused by the processing stage
    pub fn processing_failed() -> Self {
        Self::Failed {
            reason: PROCESSING_FAILED_MESSAGE.to_string(),
        }
    }

    /// Whether the run completed
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }
}

/// Pipeline stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Removing stale artifacts
    Cleaning,
    /// Retrieving media
    Downloading,
    /// Running the processing engine
    Processing,
}

/// Events emitted while a pipeline run progresses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// Stale artifacts for `base_name` are being removed
    Cleaning {
        /// Requested URL
        url: String,
        /// Resolved base name
        base_name: String,
    },
    /// Media retrieval started
    Downloading {
        /// Requested URL
        url: String,
        /// Resolved base name
        base_name: String,
    },
    /// Processing engine started
    Processing {
        /// Requested URL
        url: String,
        /// Resolved base name
        base_name: String,
    },
    /// Run finished successfully
    Completed {
        /// Requested URL
        url: String,
        /// Servable file name
        filename: String,
    },
    /// Run failed
    Failed {
        /// Requested URL
        url: String,
        /// Stage that failed
        stage: Stage,
        /// User-facing reason
        reason: String,
    },
}

impl Event {
    /// Short name used as the SSE event type
    pub fn kind(&self) -> &'static str {
        match self {
            Event::Cleaning { .. } => "cleaning",
            Event::Downloading { .. } => "downloading",
            Event::Processing { .. } => "processing",
            Event::Completed { .. } => "completed",
            Event::Failed { .. } => "failed",
        }
    }
}
