//! Parsers for yt-dlp output

use serde::Deserialize;
use std::path::PathBuf;

/// Subset of yt-dlp's info JSON the pipeline relies on
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MediaInfo {
    /// Media title, used to derive the base name
    pub title: String,
    /// Final extension chosen by yt-dlp, when reported
    #[serde(default)]
    pub ext: Option<String>,
    /// Extractor-specific identifier, when reported
    #[serde(default)]
    pub id: Option<String>,
    /// File name yt-dlp planned for the download, after its own sanitization
    #[serde(default)]
    pub filename: Option<PathBuf>,
}

/// Parse the output of `yt-dlp --print title`
///
/// Returns the first non-empty line with its line terminator removed. Leading
/// and trailing spaces are kept because yt-dlp names files from the raw title.
pub fn parse_title_output(stdout: &[u8]) -> Option<String> {
    let text = String::from_utf8_lossy(stdout);
    text.lines()
        .map(|line| line.trim_end_matches('\r'))
        .find(|line| !line.trim().is_empty())
        .map(str::to_string)
}

/// Parse the info JSON yt-dlp prints with `--dump-json --no-simulate`
///
/// Warnings may be interleaved on stdout, so the last line that parses as an
/// info object wins.
pub fn parse_info_json(stdout: &[u8]) -> Result<MediaInfo, String> {
    let text = String::from_utf8_lossy(stdout);
    let mut last_error = None;

    for line in text.lines().rev() {
        let line = line.trim();
        if !line.starts_with('{') {
            continue;
        }
        match serde_json::from_str::<MediaInfo>(line) {
            Ok(info) => return Ok(info),
            Err(e) => last_error = Some(e.to_string()),
        }
    }

    Err(last_error.unwrap_or_else(|| "no info JSON in output".to_string()))
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_title_first_non_empty_line() {
        assert_eq!(
            parse_title_output(b"\nMy Song Remix\nsecond\n").as_deref(),
            Some("My Song Remix")
        );
        assert_eq!(
            parse_title_output(b"Windows line\r\n").as_deref(),
            Some("Windows line")
        );
    }

    #[test]
    fn test_parse_title_empty_output() {
        assert_eq!(parse_title_output(b""), None);
        assert_eq!(parse_title_output(b"  \n\n"), None);
    }

    #[test]
    fn test_parse_info_json_single_line() {
        let stdout = br#"{"id": "abc", "title": "My Song Remix", "ext": "webm", "duration": 12}"#;
        let info = parse_info_json(stdout).unwrap();

        assert_eq!(info.title, "My Song Remix");
        assert_eq!(info.ext.as_deref(), Some("webm"));
        assert_eq!(info.id.as_deref(), Some("abc"));
        assert_eq!(info.filename, None);
    }

    #[test]
    fn test_parse_info_json_planned_filename() {
        let stdout = br#"{"title": "AC/DC", "filename": "/w/AC\u29f8DC.webm", "_filename": "/w/AC\u29f8DC.webm"}"#;
        let info = parse_info_json(stdout).unwrap();

        assert_eq!(info.filename, Some(PathBuf::from("/w/AC\u{29f8}DC.webm")));
    }

    #[test]
    fn test_parse_info_json_skips_noise() {
        let stdout = b"WARNING: something odd\n{\"title\": \"Clip\"}\n[info] done\n";
        let info = parse_info_json(stdout).unwrap();

        assert_eq!(info.title, "Clip");
        assert_eq!(info.ext, None);
    }

    #[test]
    fn test_parse_info_json_missing_title() {
        let err = parse_info_json(br#"{"id": "abc"}"#).unwrap_err();
        assert!(err.contains("title"));
    }

    #[test]
    fn test_parse_info_json_no_json() {
        let err = parse_info_json(b"ERROR: Unsupported URL\n").unwrap_err();
        assert_eq!(err, "no info JSON in output");
    }
}
