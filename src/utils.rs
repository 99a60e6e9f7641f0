//! Utility functions shared by the external tool adapters

use std::ffi::OsStr;
use std::process::{Output, Stdio};
use std::time::Duration;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;

/// Why an external command did not produce an [`Output`]
#[derive(Debug)]
pub(crate) enum CommandFailure {
    /// The process could not be spawned or its output could not be collected
    Io(std::io::Error),
    /// The process outlived its time budget and was killed
    TimedOut(Duration),
    /// The cancellation token fired and the process was killed
    Cancelled,
}

/// Build a command with captured stdout/stderr and no stdin
pub(crate) fn captured_command(program: impl AsRef<OsStr>) -> Command {
    let mut cmd = Command::new(program);
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    cmd
}

/// Run a command to completion, bounded by `timeout` and `cancel`.
///
/// The child is spawned with `kill_on_drop`, so when either bound wins the
/// race the in-flight wait future is dropped and the process is killed.
pub(crate) async fn run_bounded(
    mut cmd: Command,
    timeout: Duration,
    cancel: &CancellationToken,
) -> Result<Output, CommandFailure> {
    let child = cmd.spawn().map_err(CommandFailure::Io)?;

    tokio::select! {
        result = tokio::time::timeout(timeout, child.wait_with_output()) => match result {
            Ok(Ok(output)) => Ok(output),
            Ok(Err(e)) => Err(CommandFailure::Io(e)),
            Err(_) => Err(CommandFailure::TimedOut(timeout)),
        },
        _ = cancel.cancelled() => Err(CommandFailure::Cancelled),
    }
}
