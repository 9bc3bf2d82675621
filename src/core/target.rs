//! Build target identity - what a run produces and where.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::util::diagnostic::BuildError;

/// Identity of one orchestration run.
///
/// Constructed once from the project root and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildTarget {
    /// Artifact base name, taken from the project root directory name
    name: String,
    /// Absolute project root
    root: PathBuf,
    /// Absolute top-level output directory
    output_dir: PathBuf,
    /// Host platform label, e.g. `x86_64-windows`
    triple: String,
}

impl BuildTarget {
    /// Create a target for the project at `root`, writing into `root/<output>`.
    ///
    /// The root must exist; its canonical directory name becomes the target name.
    pub fn new(root: &Path, output: &Path) -> Result<Self, BuildError> {
        if !root.is_dir() {
            return Err(BuildError::ProjectRootMissing {
                path: root.to_path_buf(),
            });
        }

        let root = root
            .canonicalize()
            .map_err(|e| BuildError::io("resolve", root, e))?;

        let name = root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "app".to_string());

        let output_dir = if output.is_absolute() {
            output.to_path_buf()
        } else {
            root.join(output)
        };

        Ok(BuildTarget {
            name,
            root,
            output_dir,
            triple: host_triple(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn triple(&self) -> &str {
        &self.triple
    }

    /// Resolve a project-relative path against the root.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    /// Per-toolchain working directory: `<output>/<toolchain>`.
    pub fn toolchain_dir(&self, toolchain: &str) -> PathBuf {
        self.output_dir.join(toolchain)
    }

    /// Final executable path for a toolchain, e.g. `build/app_msvc64.exe`.
    pub fn artifact_path(&self, toolchain: &str, exe_extension: &str) -> PathBuf {
        let mut file = format!("{}_{}", self.name, toolchain);
        if !exe_extension.is_empty() {
            file.push('.');
            file.push_str(exe_extension);
        }
        self.output_dir.join(file)
    }
}

fn host_triple() -> String {
    format!("{}-{}", std::env::consts::ARCH, std::env::consts::OS)
}
