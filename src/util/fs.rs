//! Filesystem utilities.

use std::fs;
use std::path::{Path, PathBuf};

use crate::util::diagnostic::BuildError;

/// Ensure a directory exists, creating it and its parents if necessary.
///
/// Succeeds when the directory is already present.
pub fn ensure_dir(path: &Path) -> Result<(), BuildError> {
    fs::create_dir_all(path).map_err(|e| BuildError::io("create directory", path, e))
}

/// Get the relative path from `base` to `path`.
pub fn relative_path(base: &Path, path: &Path) -> PathBuf {
    pathdiff::diff_paths(path, base).unwrap_or_else(|| path.to_path_buf())
}

/// Display `path` relative to `base` when it lives underneath it.
pub fn display_relative(base: &Path, path: &Path) -> String {
    if path.starts_with(base) {
        relative_path(base, path).display().to_string()
    } else {
        path.display().to_string()
    }
}
