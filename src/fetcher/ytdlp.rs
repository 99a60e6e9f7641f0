//! Retrieval backend driving the external `yt-dlp` binary

use super::parser::{MediaInfo, parse_info_json, parse_title_output};
use super::traits::MediaFetcher;
use crate::config::Config;
use crate::error::DownloadError;
use crate::naming::{ArtifactNamer, is_usable_base_name, sanitize};
use crate::types::SourceArtifact;
use crate::utils::{CommandFailure, captured_command, run_bounded};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Output;
use std::time::Duration;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

/// Format selector: best video merged with best audio, else best single file
const FORMAT_SELECTOR: &str = "bestvideo+bestaudio/best";

/// File name template; yt-dlp names the merged file after the raw title
const OUTPUT_TEMPLATE: &str = "%(title)s.%(ext)s";

/// Default time budget for a single yt-dlp invocation
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// Retrieval backend using the external `yt-dlp` binary
///
/// # Examples
///
/// ```no_run
/// use voxstrip::fetcher::YtDlpFetcher;
/// use voxstrip::naming::ArtifactNamer;
/// use std::path::PathBuf;
///
/// let namer = ArtifactNamer::new("/srv/uploads", "webm");
/// let fetcher = YtDlpFetcher::new(PathBuf::from("/usr/local/bin/yt-dlp"), namer)
///     .with_ffmpeg(PathBuf::from("/usr/bin/ffmpeg"));
/// ```
#[derive(Debug, Clone)]
pub struct YtDlpFetcher {
    binary_path: PathBuf,
    namer: ArtifactNamer,
    ffmpeg_path: Option<PathBuf>,
    temp_dir: Option<PathBuf>,
    timeout: Duration,
}

impl YtDlpFetcher {
    /// Create a fetcher with an explicit binary path
    pub fn new(binary_path: PathBuf, namer: ArtifactNamer) -> Self {
        Self {
            binary_path,
            namer,
            ffmpeg_path: None,
            temp_dir: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Attempt to find `yt-dlp` in PATH
    pub fn from_path(namer: ArtifactNamer) -> Option<Self> {
        which::which("yt-dlp")
            .ok()
            .map(|binary| Self::new(binary, namer))
    }

    /// Build a fetcher from configuration
    ///
    /// Uses `ytdlp_path` when set, otherwise searches PATH if `search_path`
    /// is enabled. Returns `None` when no binary can be located.
    pub fn from_config(config: &Config) -> Option<Self> {
        let namer = ArtifactNamer::new(
            config.storage.upload_folder.clone(),
            config.storage.container_ext.clone(),
        );
        let fetcher = match &config.tools.ytdlp_path {
            Some(path) => Self::new(path.clone(), namer),
            None if config.tools.search_path => Self::from_path(namer)?,
            None => return None,
        };

        let fetcher = fetcher
            .with_temp_dir(config.storage.downloads_dir.clone())
            .with_timeout(config.limits.download_timeout);
        Some(match &config.tools.ffmpeg_path {
            Some(ffmpeg) => fetcher.with_ffmpeg(ffmpeg.clone()),
            None => fetcher,
        })
    }

    /// Use a specific ffmpeg for merging streams
    pub fn with_ffmpeg(mut self, ffmpeg_path: PathBuf) -> Self {
        self.ffmpeg_path = Some(ffmpeg_path);
        self
    }

    /// Keep partial fragments in `temp_dir` instead of the working directory
    pub fn with_temp_dir(mut self, temp_dir: PathBuf) -> Self {
        self.temp_dir = Some(temp_dir);
        self
    }

    /// Bound every yt-dlp invocation by `timeout`
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Path of the yt-dlp binary
    pub fn binary_path(&self) -> &Path {
        &self.binary_path
    }

    fn probe_command(&self, url: &str) -> Command {
        let mut cmd = captured_command(&self.binary_path);
        cmd.args(["--skip-download", "--no-playlist", "--no-warnings"])
            .args(["--print", "title"])
            .arg("--")
            .arg(url);
        cmd
    }

    fn download_command(&self, url: &str) -> Command {
        let mut cmd = captured_command(&self.binary_path);
        cmd.args(["-f", FORMAT_SELECTOR])
            .arg("--no-playlist")
            // intermediate streams are kept next to the merged file
            .arg("--keep-video")
            .args(["--merge-output-format", self.namer.container_ext()])
            .args(["--no-progress", "--dump-json", "--no-simulate"])
            // -P is ignored for absolute templates, so the template stays relative
            .arg("-P")
            .arg(path_option("home", self.namer.work_dir()));
        if let Some(temp_dir) = &self.temp_dir {
            cmd.arg("-P").arg(path_option("temp", temp_dir));
        }
        cmd.args(["-o", OUTPUT_TEMPLATE]);
        if let Some(ffmpeg) = &self.ffmpeg_path {
            cmd.arg("--ffmpeg-location").arg(ffmpeg);
        }
        cmd.arg("--").arg(url);
        cmd
    }

    async fn run(
        &self,
        cmd: Command,
        url: &str,
        cancel: &CancellationToken,
    ) -> Result<Output, DownloadError> {
        let output = run_bounded(cmd, self.timeout, cancel)
            .await
            .map_err(|failure| match failure {
                CommandFailure::Io(e) => DownloadError::LaunchFailed {
                    binary: self.binary_path.clone(),
                    reason: e.to_string(),
                },
                CommandFailure::TimedOut(after) => DownloadError::Timeout(after),
                CommandFailure::Cancelled => DownloadError::Cancelled,
            })?;

        if !output.status.success() {
            return Err(DownloadError::EngineFailed {
                url: url.to_string(),
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(output)
    }

    /// Find the merged container: first under the raw title, then under the
    /// name yt-dlp planned (its own sanitization may differ from the title)
    async fn locate_merged(&self, info: &MediaInfo) -> Option<PathBuf> {
        let mut candidates = vec![self.namer.raw_download_path(&info.title)];
        if let Some(name) = info.filename.as_deref().and_then(Path::file_name) {
            candidates.push(
                self.namer
                    .work_dir()
                    .join(name)
                    .with_extension(self.namer.container_ext()),
            );
        }

        for candidate in candidates {
            debug!(path = %candidate.display(), "checking if merged file exists");
            if tokio::fs::try_exists(&candidate).await.unwrap_or(false) {
                return Some(candidate);
            }
        }
        None
    }
}

/// `-P TYPE:PATH` argument; paths are not template-expanded, so no escaping
fn path_option(kind: &str, path: &Path) -> String {
    format!("{}:{}", kind, path.to_string_lossy())
}

#[async_trait]
impl MediaFetcher for YtDlpFetcher {
    async fn resolve_title(
        &self,
        url: &str,
        cancel: &CancellationToken,
    ) -> Result<String, DownloadError> {
        debug!(url, "resolving media title");
        let output = self.run(self.probe_command(url), url, cancel).await?;

        parse_title_output(&output.stdout).ok_or_else(|| DownloadError::InvalidMetadata {
            url: url.to_string(),
            reason: "yt-dlp printed no title".to_string(),
        })
    }

    async fn fetch(
        &self,
        url: &str,
        cancel: &CancellationToken,
    ) -> Result<SourceArtifact, DownloadError> {
        info!(url, binary = %self.binary_path.display(), "downloading media");
        let output = self.run(self.download_command(url), url, cancel).await?;

        let info = parse_info_json(&output.stdout).map_err(|reason| {
            DownloadError::InvalidMetadata {
                url: url.to_string(),
                reason,
            }
        })?;

        let base_name = sanitize(&info.title);
        if !is_usable_base_name(&base_name) {
            return Err(DownloadError::UnusableTitle { title: info.title });
        }

        let paths = self.namer.for_base_name(&base_name);
        let Some(merged) = self.locate_merged(&info).await else {
            let expected = self.namer.raw_download_path(&info.title);
            error!(
                path = %expected.display(),
                reported_ext = ?info.ext,
                "final merged file not found"
            );
            return Err(DownloadError::MergedFileNotFound { path: expected });
        };

        if merged != paths.source {
            info!(
                from = %merged.display(),
                to = %paths.source.display(),
                "renaming merged file"
            );
            tokio::fs::rename(&merged, &paths.source)
                .await
                .map_err(|e| DownloadError::RenameFailed {
                    from: merged.clone(),
                    to: paths.source.clone(),
                    reason: e.to_string(),
                })?;
        }

        let path = std::path::absolute(&paths.source).unwrap_or(paths.source);
        Ok(SourceArtifact {
            path,
            base_name,
            extension: self.namer.container_ext().to_string(),
            title: info.title,
        })
    }

    fn name(&self) -> &'static str {
        "yt-dlp"
    }
}
