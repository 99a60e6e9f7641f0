//! Artifact naming
//!
//! Every artifact belonging to one logical media item is addressed by a single
//! *base name* derived from the media title. The functions here are pure: they
//! never touch the filesystem.

use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Suffix the processing engine appends for the extracted speech track
pub const ISOLATED_AUDIO_SUFFIX: &str = "_isolated_audio.wav";

/// Suffix the processing engine appends for the final remuxed video
pub const PROCESSED_VIDEO_SUFFIX: &str = "_processed_video.mp4";

// Path separators are folded in with whitespace so a title can't leave the working directory.
#[allow(clippy::expect_used)]
static SEPARATOR_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\s/\\]+").expect("static regex"));

/// Derive a filesystem-safe base name from a media title.
///
/// Each run of whitespace (or path separators) becomes a single underscore.
/// The result is idempotent: `sanitize(&sanitize(t)) == sanitize(t)`.
///
/// ```
/// use voxstrip::naming::sanitize;
///
/// assert_eq!(sanitize("My Song  Remix"), "My_Song_Remix");
/// ```
pub fn sanitize(title: &str) -> String {
    SEPARATOR_RUN.replace_all(title, "_").into_owned()
}

/// Whether a base name can safely be used as a file stem inside the working directory
pub fn is_usable_base_name(base: &str) -> bool {
    !base.is_empty() && base != "." && base != ".." && !base.contains(['/', '\\', '\0'])
}

/// Canonical locations of one media item's artifacts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    /// Sanitized base name shared by all three paths
    pub base_name: String,
    /// Merged source container (`<base>.<ext>`)
    pub source: PathBuf,
    /// Speech track extracted by the engine (`<base>_isolated_audio.wav`)
    pub isolated_audio: PathBuf,
    /// Final processed output (`<base>_processed_video.mp4`)
    pub processed: PathBuf,
}

impl ArtifactPaths {
    /// All three paths, in pipeline order
    pub fn all(&self) -> [&Path; 3] {
        [&self.source, &self.isolated_audio, &self.processed]
    }
}

/// Computes artifact paths rooted in the working directory
#[derive(Debug, Clone)]
pub struct ArtifactNamer {
    work_dir: PathBuf,
    container_ext: String,
}

impl ArtifactNamer {
    /// Create a namer for `work_dir` whose source containers use `container_ext`
    pub fn new(work_dir: impl Into<PathBuf>, container_ext: impl Into<String>) -> Self {
        Self {
            work_dir: work_dir.into(),
            container_ext: container_ext.into(),
        }
    }

    /// Working directory all paths are rooted in
    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Container extension of source files (without the dot)
    pub fn container_ext(&self) -> &str {
        &self.container_ext
    }

    /// Paths for the media item with the given title
    pub fn for_title(&self, title: &str) -> ArtifactPaths {
        self.for_base_name(&sanitize(title))
    }

    /// Paths for an already-sanitized base name
    pub fn for_base_name(&self, base: &str) -> ArtifactPaths {
        ArtifactPaths {
            base_name: base.to_string(),
            source: self
                .work_dir
                .join(format!("{}.{}", base, self.container_ext)),
            isolated_audio: self.work_dir.join(format!("{}{}", base, ISOLATED_AUDIO_SUFFIX)),
            processed: self
                .work_dir
                .join(format!("{}{}", base, PROCESSED_VIDEO_SUFFIX)),
        }
    }

    /// Where the retrieval tool writes the merged file before it is renamed
    pub fn raw_download_path(&self, title: &str) -> PathBuf {
        self.work_dir
            .join(format!("{}.{}", title, self.container_ext))
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_collapses_whitespace_runs() {
        assert_eq!(sanitize("My Song Remix"), "My_Song_Remix");
        assert_eq!(sanitize("a \t\n b"), "a_b");
        assert_eq!(sanitize("  padded  "), "_padded_");
    }

    #[test]
    fn test_sanitize_leaves_clean_titles_alone() {
        assert_eq!(sanitize("already_clean-title"), "already_clean-title");
        assert_eq!(sanitize(""), "");
    }

    #[test]
    fn test_sanitize_folds_path_separators() {
        assert_eq!(sanitize("AC/DC - Live"), "AC_DC_-_Live");
        assert_eq!(sanitize("../../etc/passwd"), ".._.._etc_passwd");
        assert_eq!(sanitize(r"back\slash"), "back_slash");
    }

    #[test]
    fn test_sanitize_is_idempotent_and_whitespace_free() {
        let titles = [
            "My Song Remix",
            "  lots   of\tspace\n",
            "unicode\u{3000}ideographic space",
            "mixed _ underscores  and / slashes",
            "non\u{a0}breaking",
            "",
        ];
        for title in titles {
            let once = sanitize(title);
            assert!(
                !once.chars().any(char::is_whitespace),
                "whitespace left in {:?}",
                once
            );
            assert_eq!(sanitize(&once), once, "not idempotent for {:?}", title);
        }
    }

    #[test]
    fn test_usable_base_name() {
        assert!(is_usable_base_name("My_Song"));
        assert!(is_usable_base_name(".hidden"));
        assert!(!is_usable_base_name(""));
        assert!(!is_usable_base_name("."));
        assert!(!is_usable_base_name(".."));
    }

    #[test]
    fn test_paths_for_title() {
        let namer = ArtifactNamer::new("/srv/uploads", "webm");
        let paths = namer.for_title("My Song Remix");

        assert_eq!(paths.base_name, "My_Song_Remix");
        assert_eq!(paths.source, PathBuf::from("/srv/uploads/My_Song_Remix.webm"));
        assert_eq!(
            paths.isolated_audio,
            PathBuf::from("/srv/uploads/My_Song_Remix_isolated_audio.wav")
        );
        assert_eq!(
            paths.processed,
            PathBuf::from("/srv/uploads/My_Song_Remix_processed_video.mp4")
        );
        assert_eq!(paths.all().len(), 3);
    }

    #[test]
    fn test_paths_are_deterministic() {
        let namer = ArtifactNamer::new("/w", "mkv");
        assert_eq!(namer.for_title("x y"), namer.for_title("x y"));
        assert_eq!(namer.for_title("x y"), namer.for_base_name("x_y"));
        assert!(namer.for_title("x y").source.ends_with("x_y.mkv"));
    }

    #[test]
    fn test_raw_download_path_keeps_title() {
        let namer = ArtifactNamer::new("/w", "webm");
        assert_eq!(
            namer.raw_download_path("My Song"),
            PathBuf::from("/w/My Song.webm")
        );
    }
}
