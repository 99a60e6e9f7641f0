//! Shell-script stand-ins for yt-dlp and the processing engine
//!
//! Scripts are written to their own directory so argument logs never land in
//! the working directory under test.

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Title every fake download resolves to
pub const FAKE_TITLE: &str = "My Song Remix";

/// How the fake yt-dlp behaves on download
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum YtDlpBehavior {
    /// Writes `<title>.webm` into the `-P home:` directory and prints info JSON
    Merge,
    /// Writes the merged file under a name of its own and reports it as `filename`
    OwnFileName,
    /// Prints info JSON but writes nothing
    NoMergedFile,
    /// Exits 1 with an error on stderr
    Unavailable,
}

/// Directory holding the generated scripts
pub struct FakeTools {
    dir: TempDir,
}

impl FakeTools {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    /// Newline-separated arguments of every yt-dlp invocation so far
    pub fn ytdlp_args(&self) -> String {
        std::fs::read_to_string(self.dir.path().join("ytdlp-args.log")).unwrap_or_default()
    }

    pub fn ytdlp(&self, behavior: YtDlpBehavior) -> PathBuf {
        let download = match behavior {
            YtDlpBehavior::Merge => {
                r#"printf 'merged' > "$dir/$title.webm"
printf '[Merger] Merging formats into "%s"\n' "$dir/$title.webm"
printf '{"id": "abc123", "title": "%s", "ext": "webm"}\n' "$title""#
            }
            YtDlpBehavior::OwnFileName => {
                r#"printf 'merged' > "$dir/tool_named.webm"
printf '{"id": "abc123", "title": "%s", "ext": "webm", "filename": "%s"}\n' "$title" "$dir/tool_named.webm""#
            }
            YtDlpBehavior::NoMergedFile => {
                r#"printf '{"id": "abc123", "title": "%s", "ext": "webm"}\n' "$title""#
            }
            YtDlpBehavior::Unavailable => {
                r#"echo "ERROR: [youtube] abc123: Video unavailable" >&2
exit 1"#
            }
        };

        let body = format!(
            r#"title='{title}'
printf '%s\n' "$@" >> "{log}"
probe=0
dir='.'
while [ "$#" -gt 0 ]; do
  case "$1" in
    --skip-download) probe=1 ;;
    -P) shift; case "$1" in home:*) dir="${{1#home:}}" ;; esac ;;
    -o) shift ;;
    --) shift; break ;;
  esac
  shift
done
if [ "$probe" = 1 ]; then
  printf '%s\n' "$title"
  exit 0
fi
{download}"#,
            title = FAKE_TITLE,
            log = self.dir.path().join("ytdlp-args.log").display(),
            download = download,
        );
        self.script("yt-dlp", &body)
    }

    /// Engine writing the isolated audio and processed video next to its input
    pub fn processor(&self) -> PathBuf {
        self.script(
            "VideoSpeechProcessing",
            r#"src="$1"
base="${src%.*}"
printf 'wav' > "${base}_isolated_audio.wav"
printf 'mp4' > "${base}_processed_video.mp4"
echo "Extracting audio..."
echo "Video processed successfully: ${base}_processed_video.mp4""#,
        )
    }

    /// Engine that exits cleanly without printing the success marker
    pub fn silent_processor(&self) -> PathBuf {
        self.script("VideoSpeechProcessing-silent", "echo 'model loaded'")
    }

    fn script(&self, name: &str, body: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        write_script(&path, body);
        path
    }
}

/// Write an executable `/bin/sh` script
pub fn write_script(path: &Path, body: &str) {
    std::fs::write(path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
}
