//! Host path helpers shared by the registry and the recent file list.
//!
//! Archives opened from disk are keyed by their normalized path: absolute,
//! with every separator written as `/`. Two spellings of the same file
//! (relative vs absolute, `\` vs `/`) therefore compare equal.

use std::path::{Path, PathBuf};

use crate::Result;

/// Rewrites every `\` separator as `/`.
pub fn forward_slashes(path: &str) -> String {
    path.replace('\\', "/")
}

/// Returns the absolute, `/`-separated form of `path`.
///
/// The path does not need to exist. Symlinks are not resolved.
pub fn normalize_path(path: &Path) -> Result<String> {
    let absolute = std::path::absolute(path)?;
    Ok(forward_slashes(&absolute.to_string_lossy()))
}

/// Returns the absolute form of `path` as a [`PathBuf`].
pub fn normalize_path_buf(path: &Path) -> Result<PathBuf> {
    normalize_path(path).map(PathBuf::from)
}

/// Returns the final component of a `/`-separated path.
pub fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}
