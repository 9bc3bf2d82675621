//! Source discovery.
//!
//! A [`FileSet`] is the ordered list of absolute input paths for one file
//! category. It is built once at the start of a run and never mutated.

use std::path::{Path, PathBuf};

use serde::Serialize;
use walkdir::WalkDir;

use crate::util::diagnostic::BuildError;

/// Role a discovered file plays in the build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileRole {
    /// Native translation units handed to a compiler
    Native,
    /// Shader sources handed to the validator
    Shader,
}

impl FileRole {
    /// Human-readable role name used in diagnostics.
    pub fn as_str(&self) -> &'static str {
        match self {
            FileRole::Native => "source",
            FileRole::Shader => "shader",
        }
    }
}

/// Discovered input files, absolute and sorted lexicographically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileSet {
    role: FileRole,
    files: Vec<PathBuf>,
}

impl FileSet {
    /// Create a file set from already-resolved paths.
    ///
    /// Paths are sorted and deduplicated so the set is deterministic no
    /// matter how the caller collected them.
    pub fn new(role: FileRole, mut files: Vec<PathBuf>) -> Self {
        files.sort();
        files.dedup();
        FileSet { role, files }
    }

    /// The role of every file in this set.
    pub fn role(&self) -> FileRole {
        self.role
    }

    /// The files, in lexicographic order.
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PathBuf> {
        self.files.iter()
    }
}

impl<'a> IntoIterator for &'a FileSet {
    type Item = &'a PathBuf;
    type IntoIter = std::slice::Iter<'a, PathBuf>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.iter()
    }
}

/// Recursively collect every file under `root` whose extension is in `suffixes`.
///
/// Suffixes are matched against the file extension without the leading dot
/// (`"cpp"`, `"frag"`); a leading dot in the pattern is tolerated. The root
/// must exist: a missing root is a configuration error, not an empty set.
pub fn discover(root: &Path, suffixes: &[String], role: FileRole) -> Result<FileSet, BuildError> {
    if !root.is_dir() {
        return Err(BuildError::SourceDirMissing {
            role: role.as_str(),
            path: root.to_path_buf(),
        });
    }

    let root = root
        .canonicalize()
        .map_err(|e| BuildError::io("resolve", root, e))?;
    let suffixes: Vec<&str> = suffixes.iter().map(|s| s.trim_start_matches('.')).collect();

    let mut files = Vec::new();
    for entry in WalkDir::new(&root).follow_links(true) {
        let entry = entry.map_err(|source| BuildError::Discovery {
            root: root.clone(),
            source,
        })?;

        if !entry.file_type().is_file() {
            continue;
        }

        let matches = entry
            .path()
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| suffixes.contains(&ext));

        if matches {
            files.push(entry.into_path());
        }
    }

    tracing::debug!(
        "discovered {} {} file(s) under {}",
        files.len(),
        role.as_str(),
        root.display()
    );

    Ok(FileSet::new(role, files))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn exts(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_discover_filters_and_sorts() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src");
        fs::create_dir_all(src.join("render/vk")).unwrap();
        fs::write(src.join("main.cpp"), "").unwrap();
        fs::write(src.join("render/vk/device.cpp"), "").unwrap();
        fs::write(src.join("render/surface.cpp"), "").unwrap();
        fs::write(src.join("render/surface.hpp"), "").unwrap();
        fs::write(src.join("README.md"), "").unwrap();

        let set = discover(&src, &exts(&["cpp"]), FileRole::Native).unwrap();
        assert_eq!(set.len(), 3);
        assert!(set.iter().all(|p| p.is_absolute()));
        assert!(set.iter().all(|p| p.extension().unwrap() == "cpp"));

        let mut sorted = set.files().to_vec();
        sorted.sort();
        assert_eq!(set.files(), sorted.as_slice());
    }

    #[test]
    fn test_discover_unions_suffixes() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("tri.vert"), "").unwrap();
        fs::write(tmp.path().join("tri.frag"), "").unwrap();
        fs::write(tmp.path().join("tri.comp"), "").unwrap();

        let set = discover(tmp.path(), &exts(&[".frag", "vert"]), FileRole::Shader).unwrap();
        let names: Vec<_> = set
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["tri.frag", "tri.vert"]);
        assert_eq!(set.role(), FileRole::Shader);
    }

    #[test]
    fn test_discover_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("a/b")).unwrap();
        fs::write(tmp.path().join("a/b/z.cpp"), "").unwrap();
        fs::write(tmp.path().join("a/y.cpp"), "").unwrap();

        let first = discover(tmp.path(), &exts(&["cpp"]), FileRole::Native).unwrap();
        let second = discover(tmp.path(), &exts(&["cpp"]), FileRole::Native).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_discover_missing_root_is_error() {
        let tmp = TempDir::new().unwrap();
        let err = discover(&tmp.path().join("nope"), &exts(&["cpp"]), FileRole::Native)
            .unwrap_err();
        assert!(matches!(err, BuildError::SourceDirMissing { role: "source", .. }));
    }

    #[test]
    fn test_discover_empty_tree() {
        let tmp = TempDir::new().unwrap();
        let set = discover(tmp.path(), &exts(&["cpp"]), FileRole::Native).unwrap();
        assert!(set.is_empty());
    }
}
