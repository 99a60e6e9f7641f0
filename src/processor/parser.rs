//! Parser for processing engine output

use std::path::PathBuf;

/// Prefix of the line the engine prints when it wrote an output file
pub const SUCCESS_MARKER: &str = "Video processed successfully";

/// Find the output path announced by the engine
///
/// Scans stdout for the first line containing `Video processed successfully:`
/// and returns the trimmed text after the colon. A marker line with an empty
/// path does not count.
pub fn parse_success_marker(stdout: &[u8]) -> Option<PathBuf> {
    let text = String::from_utf8_lossy(stdout);

    text.lines().find_map(|line| {
        let (_, rest) = line.split_once(SUCCESS_MARKER)?;
        let path = rest.trim_start().strip_prefix(':')?.trim();
        (!path.is_empty()).then(|| PathBuf::from(path))
    })
}
