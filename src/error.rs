//! Error types for voxstrip
//!
//! This module provides error handling for the library, including:
//! - Stage-specific error types (download, processing)
//! - HTTP status code mapping for API integration
//! - Structured error responses with machine-readable error codes

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use utoipa::ToSchema;

/// Result type alias for voxstrip operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for voxstrip
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "container_ext")
        key: Option<String>,
    },

    /// Media retrieval failed
    #[error("download error: {0}")]
    Download(#[from] DownloadError),

    /// External processing engine failed
    #[error("processing error: {0}")]
    Processing(#[from] ProcessingError),

    /// Requested artifact is not present in the working directory
    #[error("artifact not found: {0}")]
    ArtifactNotFound(String),

    /// Request was malformed
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// API server error
    #[error("API server error: {0}")]
    ApiServerError(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// Errors raised while retrieving media with the external retrieval tool
#[derive(Debug, Error)]
pub enum DownloadError {
    /// The retrieval tool could not be started
    #[error("failed to execute {binary}: {reason}")]
    LaunchFailed {
        /// Binary that failed to start
        binary: PathBuf,
        /// Underlying OS error
        reason: String,
    },

    /// The retrieval tool reported an error (network, unsupported URL, restrictions)
    #[error("retrieval of {url} failed (exit code {code:?}): {stderr}")]
    EngineFailed {
        /// Requested URL
        url: String,
        /// Exit code, if the tool exited normally
        code: Option<i32>,
        /// Captured standard error
        stderr: String,
    },

    /// The tool succeeded but its metadata could not be understood
    #[error("unreadable metadata for {url}: {reason}")]
    InvalidMetadata {
        /// Requested URL
        url: String,
        /// What was wrong with the metadata
        reason: String,
    },

    /// The media title does not yield a usable base name
    #[error("title {title:?} does not produce a usable file name")]
    UnusableTitle {
        /// Raw title reported by the tool
        title: String,
    },

    /// The merged container was not where the tool's metadata said it would be
    #[error("merged file not found at {path}")]
    MergedFileNotFound {
        /// Expected location of the merged file
        path: PathBuf,
    },

    /// The merged file could not be renamed to its sanitized name
    #[error("failed to rename {from} to {to}: {reason}")]
    RenameFailed {
        /// Merged file as written by the tool
        from: PathBuf,
        /// Canonical source path
        to: PathBuf,
        /// Underlying OS error
        reason: String,
    },

    /// Retrieval exceeded its time budget
    #[error("retrieval timed out after {0:?}")]
    Timeout(Duration),

    /// Retrieval was cancelled
    #[error("retrieval cancelled")]
    Cancelled,
}

/// Errors raised while running the external processing engine
#[derive(Debug, Error)]
pub enum ProcessingError {
    /// The engine could not be started (missing or not executable)
    #[error("failed to execute {binary}: {reason}")]
    LaunchFailed {
        /// Binary that failed to start
        binary: PathBuf,
        /// Underlying OS error
        reason: String,
    },

    /// The engine exited with a non-zero status
    #[error("processing engine exited with code {code:?}: {stderr}")]
    NonZeroExit {
        /// Exit code, if the engine exited normally
        code: Option<i32>,
        /// Captured standard error
        stderr: String,
    },

    /// The engine exited successfully without printing the success marker
    #[error("processing engine reported no output file")]
    MissingSuccessMarker {
        /// Captured standard output
        stdout: String,
    },

    /// Processing exceeded its time budget
    #[error("processing timed out after {0:?}")]
    Timeout(Duration),

    /// Processing was cancelled
    #[error("processing cancelled")]
    Cancelled,
}

/// API error response format
///
/// # Example JSON Response
///
/// ```json
/// {
///   "error": {
///     "code": "artifact_not_found",
///     "message": "artifact not found: song_processed_video.mp4"
///   }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// The error details
    pub error: ErrorDetail,
}

/// Detailed error information for API responses
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "artifact_not_found")
    pub code: String,

    /// Human-readable error message
    pub message: String,

    /// Optional additional context about the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Create a new API error with code and message
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }

    /// Create a "not found" error
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::new("not_found", format!("{} not found", resource.into()))
    }

    /// Create an "internal server error"
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new("internal_error", message)
    }
}

/// Convert errors to HTTP status codes for API responses
pub trait ToHttpStatus {
    /// Get the HTTP status code for this error
    fn status_code(&self) -> u16;

    /// Get the machine-readable error code
    fn error_code(&self) -> &str;
}

impl ToHttpStatus for Error {
    fn status_code(&self) -> u16 {
        match self {
            Error::Config { .. } => 400,
            Error::InvalidRequest(_) => 400,

            Error::ArtifactNotFound(_) => 404,

            // Upstream tool failures
            Error::Download(_) => 502,
            Error::Processing(_) => 502,

            Error::Io(_) => 500,
            Error::Serialization(_) => 500,
            Error::ApiServerError(_) => 500,
            Error::Other(_) => 500,
        }
    }

    fn error_code(&self) -> &str {
        match self {
            Error::Config { .. } => "config_error",
            Error::Download(e) => match e {
                DownloadError::LaunchFailed { .. } => "download_launch_failed",
                DownloadError::EngineFailed { .. } => "download_failed",
                DownloadError::InvalidMetadata { .. } => "invalid_metadata",
                DownloadError::UnusableTitle { .. } => "unusable_title",
                DownloadError::MergedFileNotFound { .. } => "merged_file_not_found",
                DownloadError::RenameFailed { .. } => "rename_failed",
                DownloadError::Timeout(_) => "download_timeout",
                DownloadError::Cancelled => "download_cancelled",
            },
            Error::Processing(e) => match e {
                ProcessingError::LaunchFailed { .. } => "processing_launch_failed",
                ProcessingError::NonZeroExit { .. } => "processing_failed",
                ProcessingError::MissingSuccessMarker { .. } => "missing_success_marker",
                ProcessingError::Timeout(_) => "processing_timeout",
                ProcessingError::Cancelled => "processing_cancelled",
            },
            Error::ArtifactNotFound(_) => "artifact_not_found",
            Error::InvalidRequest(_) => "invalid_request",
            Error::Io(_) => "io_error",
            Error::Serialization(_) => "serialization_error",
            Error::ApiServerError(_) => "api_server_error",
            Error::Other(_) => "internal_error",
        }
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        let code = error.error_code().to_string();
        let message = error.to_string();

        let details = match &error {
            Error::Config { key: Some(key), .. } => Some(serde_json::json!({
                "key": key,
            })),
            Error::ArtifactNotFound(name) => Some(serde_json::json!({
                "filename": name,
            })),
            _ => None,
        };

        ApiError {
            error: ErrorDetail {
                code,
                message,
                details,
            },
        }
    }
}
