//! Configuration types for voxstrip
//!
//! The configuration is read once at startup and shared immutably (behind an
//! `Arc`) with every component. The on-disk format is a flat JSON object:
//!
//! ```json
//! {
//!   "deep_filter_path": "/opt/DeepFilterNet",
//!   "downloads_dir": "downloads",
//!   "ffmpeg_path": "/usr/bin/ffmpeg",
//!   "upload_folder": "uploads"
//! }
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{
    net::SocketAddr,
    path::{Path, PathBuf},
    time::Duration,
};

/// External tool paths
///
/// Used as a flattened sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Install path of the noise-removal engine, exported to the processor
    /// as `DEEPFILTERNET_PATH`
    #[serde(default)]
    pub deep_filter_path: PathBuf,

    /// Path to ffmpeg, passed to yt-dlp for merging (yt-dlp default if None)
    #[serde(default)]
    pub ffmpeg_path: Option<PathBuf>,

    /// Path to yt-dlp executable (auto-detected if None)
    #[serde(default)]
    pub ytdlp_path: Option<PathBuf>,

    /// Path to the processing engine executable
    #[serde(default = "default_processor_path")]
    pub processor_path: PathBuf,

    /// Whether to search PATH for yt-dlp if no explicit path is set (default: true)
    #[serde(default = "default_true")]
    pub search_path: bool,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            deep_filter_path: PathBuf::new(),
            ffmpeg_path: None,
            ytdlp_path: None,
            processor_path: default_processor_path(),
            search_path: true,
        }
    }
}

/// Directory layout and artifact naming
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Working directory holding every artifact (default: "uploads")
    #[serde(default = "default_upload_folder")]
    pub upload_folder: PathBuf,

    /// Scratch directory for partial stream fragments (default: "downloads")
    #[serde(default = "default_downloads_dir")]
    pub downloads_dir: PathBuf,

    /// Container extension of merged downloads (default: "webm")
    #[serde(default = "default_container_ext")]
    pub container_ext: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            upload_folder: default_upload_folder(),
            downloads_dir: default_downloads_dir(),
            container_ext: default_container_ext(),
        }
    }
}

/// Time budgets for the external tools
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Maximum time for a single retrieval, in seconds (default: 1800)
    #[serde(default = "default_download_timeout", with = "duration_serde")]
    pub download_timeout: Duration,

    /// Maximum time for a single processing run, in seconds (default: 3600)
    #[serde(default = "default_process_timeout", with = "duration_serde")]
    pub process_timeout: Duration,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            download_timeout: default_download_timeout(),
            process_timeout: default_process_timeout(),
        }
    }
}

/// REST API configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Address to bind to (default: 127.0.0.1:5000)
    #[serde(default = "default_bind_address")]
    pub bind_address: SocketAddr,

    /// Enable CORS for browser access (default: true)
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// Allowed CORS origins (default: ["*"])
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    /// Enable Swagger UI at /swagger-ui (default: false)
    #[serde(default)]
    pub swagger_ui: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            cors_enabled: true,
            cors_origins: default_cors_origins(),
            swagger_ui: false,
        }
    }
}

/// Main configuration
///
/// Sub-configs are flattened so the JSON format stays a single flat object;
/// only `api` is nested.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// External tool paths
    #[serde(flatten)]
    pub tools: ToolsConfig,

    /// Directory layout
    #[serde(flatten)]
    pub storage: StorageConfig,

    /// Timeouts for external tools
    #[serde(flatten)]
    pub limits: LimitsConfig,

    /// HTTP server settings
    #[serde(default)]
    pub api: ApiConfig,
}

impl Config {
    /// Load configuration from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| Error::Config {
            message: format!("cannot read {}: {}", path.display(), e),
            key: None,
        })?;
        let config: Config = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings no pipeline run could succeed with
    pub fn validate(&self) -> Result<()> {
        let ext = self.storage.container_ext.trim();
        if ext.is_empty() || ext.contains(['/', '\\', '.']) {
            return Err(Error::Config {
                message: format!("invalid container extension {:?}", ext),
                key: Some("container_ext".to_string()),
            });
        }
        if self.limits.download_timeout.is_zero() {
            return Err(Error::Config {
                message: "download timeout must be greater than zero".to_string(),
                key: Some("download_timeout".to_string()),
            });
        }
        if self.limits.process_timeout.is_zero() {
            return Err(Error::Config {
                message: "process timeout must be greater than zero".to_string(),
                key: Some("process_timeout".to_string()),
            });
        }
        Ok(())
    }

    /// Create the working and scratch directories and return a copy whose
    /// directory paths are absolute
    pub fn prepare_dirs(&self) -> Result<Self> {
        let mut prepared = self.clone();
        for dir in [
            &mut prepared.storage.upload_folder,
            &mut prepared.storage.downloads_dir,
        ] {
            if !dir.exists() {
                tracing::info!(path = %dir.display(), "creating directory");
            }
            std::fs::create_dir_all(&*dir)?;
            *dir = std::path::absolute(&*dir)?;
        }
        Ok(prepared)
    }

    /// Working directory
    pub fn upload_folder(&self) -> &Path {
        &self.storage.upload_folder
    }
}

fn default_processor_path() -> PathBuf {
    PathBuf::from("./MediaProcessor/build/VideoSpeechProcessing")
}

fn default_upload_folder() -> PathBuf {
    PathBuf::from("uploads")
}

fn default_downloads_dir() -> PathBuf {
    PathBuf::from("downloads")
}

fn default_container_ext() -> String {
    "webm".to_string()
}

fn default_true() -> bool {
    true
}

fn default_download_timeout() -> Duration {
    Duration::from_secs(30 * 60)
}

fn default_process_timeout() -> Duration {
    Duration::from_secs(60 * 60)
}

fn default_bind_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 5000))
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}

// Duration serialization helper
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
