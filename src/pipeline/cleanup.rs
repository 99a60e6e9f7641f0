//! Cleaning stage: removes a previous run's artifacts

use crate::naming::ArtifactPaths;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{debug, info};

/// Remove every canonical artifact of `paths` that exists
///
/// Missing files are not an error. Returns how many files were removed.
pub(crate) async fn remove_stale_artifacts(paths: &ArtifactPaths) -> std::io::Result<usize> {
    remove_existing(&paths.base_name, &paths.all()).await
}

/// Remove the engine outputs of `paths`, keeping the source file
pub(crate) async fn remove_stale_outputs(paths: &ArtifactPaths) -> std::io::Result<usize> {
    remove_existing(
        &paths.base_name,
        &[paths.isolated_audio.as_path(), paths.processed.as_path()],
    )
    .await
}

async fn remove_existing(base_name: &str, files: &[&Path]) -> std::io::Result<usize> {
    let mut removed = 0;

    for path in files {
        match tokio::fs::remove_file(path).await {
            Ok(()) => {
                info!(path = %path.display(), "removed old file");
                removed += 1;
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e),
        }
    }

    debug!(base_name, removed, "cleanup finished");
    Ok(removed)
}
