//! CLI-based processor using the external speech-processing executable

use super::parser::parse_success_marker;
use super::traits::MediaProcessor;
use crate::config::Config;
use crate::error::ProcessingError;
use crate::types::ProcessedArtifact;
use crate::utils::{CommandFailure, captured_command, run_bounded};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

/// Environment variable telling the engine where its model lives
pub const ENGINE_PATH_ENV: &str = "DEEPFILTERNET_PATH";

/// Default time budget for a single processing run
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60 * 60);

/// Processor that runs the external engine as a subprocess
///
/// # Examples
///
/// ```no_run
/// use voxstrip::processor::{CliMediaProcessor, MediaProcessor};
/// use std::path::{Path, PathBuf};
/// use tokio_util::sync::CancellationToken;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let processor = CliMediaProcessor::new(PathBuf::from("./MediaProcessor/build/VideoSpeechProcessing"))
///     .with_engine_path(PathBuf::from("/opt/DeepFilterNet"));
///
/// let output = processor
///     .process(Path::new("/srv/uploads/My_Song.webm"), &CancellationToken::new())
///     .await?;
/// println!("processed into {}", output.path.display());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct CliMediaProcessor {
    binary_path: PathBuf,
    engine_path: Option<PathBuf>,
    timeout: Duration,
}

impl CliMediaProcessor {
    /// Create a processor with an explicit binary path
    pub fn new(binary_path: PathBuf) -> Self {
        Self {
            binary_path,
            engine_path: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Build a processor from configuration
    pub fn from_config(config: &Config) -> Self {
        let processor = Self::new(config.tools.processor_path.clone())
            .with_timeout(config.limits.process_timeout);
        if config.tools.deep_filter_path.as_os_str().is_empty() {
            processor
        } else {
            processor.with_engine_path(config.tools.deep_filter_path.clone())
        }
    }

    /// Export `engine_path` to the child as `DEEPFILTERNET_PATH`
    pub fn with_engine_path(mut self, engine_path: PathBuf) -> Self {
        self.engine_path = Some(engine_path);
        self
    }

    /// Bound every run by `timeout`
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Path of the engine binary
    pub fn binary_path(&self) -> &Path {
        &self.binary_path
    }
}

#[async_trait]
impl MediaProcessor for CliMediaProcessor {
    async fn process(
        &self,
        source: &Path,
        cancel: &CancellationToken,
    ) -> Result<ProcessedArtifact, ProcessingError> {
        info!(path = %source.display(), "processing media");

        let mut cmd = captured_command(&self.binary_path);
        cmd.arg(source);
        if let Some(engine_path) = &self.engine_path {
            cmd.env(ENGINE_PATH_ENV, engine_path);
        }

        let output = run_bounded(cmd, self.timeout, cancel)
            .await
            .map_err(|failure| match failure {
                CommandFailure::Io(e) => {
                    error!(binary = %self.binary_path.display(), error = %e, "failed to run processing engine");
                    ProcessingError::LaunchFailed {
                        binary: self.binary_path.clone(),
                        reason: e.to_string(),
                    }
                }
                CommandFailure::TimedOut(after) => {
                    error!(path = %source.display(), timeout = ?after, "processing engine timed out");
                    ProcessingError::Timeout(after)
                }
                CommandFailure::Cancelled => ProcessingError::Cancelled,
            })?;

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        if !output.status.success() {
            error!(code = ?output.status.code(), stderr = %stderr, "error processing media");
            return Err(ProcessingError::NonZeroExit {
                code: output.status.code(),
                stderr,
            });
        }

        match parse_success_marker(&output.stdout) {
            Some(path) => {
                debug!(output = %path.display(), "processing engine reported output");
                Ok(ProcessedArtifact::new(path))
            }
            None => {
                let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
                error!(stdout = %stdout, stderr = %stderr, "processing engine exited without success marker");
                Err(ProcessingError::MissingSuccessMarker { stdout })
            }
        }
    }

    fn name(&self) -> &'static str {
        "cli-speech-processor"
    }
}
