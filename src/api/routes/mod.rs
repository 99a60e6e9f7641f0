//! Route handlers for the HTTP surface
//!
//! - [`media`]: submission page, pipeline runs, processed file streaming
//! - [`system`]: health, events, OpenAPI

use serde::{Deserialize, Serialize};

mod media;
mod system;

pub use media::*;
pub use system::*;

/// Message returned when `POST /` carries no usable `url`
pub const NO_URL_MESSAGE: &str = "No URL provided.";

/// Form body for POST /
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct SubmitForm {
    /// Media URL to download and process
    #[serde(default)]
    pub url: Option<String>,
}

/// Response for POST /
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SubmitResponse {
    /// Pipeline finished; the file is available at `video_url`
    Completed {
        /// Relative URL of the processed file, e.g. `/video/My_Song_processed_video.mp4`
        video_url: String,
    },
    /// Pipeline or request failed
    Error {
        /// Caller-facing failure message
        message: String,
    },
}
