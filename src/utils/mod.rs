//! Utility modules for the content pipeline.

pub mod date;
pub mod log;
pub mod minify;
pub mod slug;

use std::path::Path;

/// File name of `path` for log lines, falling back to the full path.
pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
