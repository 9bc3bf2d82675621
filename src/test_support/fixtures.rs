//! Test fixtures for common test scenarios.
//!
//! Pre-built project trees and canned file contents.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::util::config::CONFIG_FILE;

/// Fixture for a complete project structure.
#[derive(Debug, Clone)]
pub struct ProjectFixture {
    /// Project directory name; becomes the artifact base name.
    pub name: String,
    /// Slipway.toml content, if any.
    pub config: Option<String>,
    /// Files relative to the project root -> content.
    pub files: BTreeMap<PathBuf, String>,
}

impl ProjectFixture {
    /// Create a new empty project fixture.
    pub fn new(name: impl Into<String>) -> Self {
        ProjectFixture {
            name: name.into(),
            config: None,
            files: BTreeMap::new(),
        }
    }

    /// A small renderer: two translation units and one shader per stage.
    pub fn renderer(name: impl Into<String>) -> Self {
        ProjectFixture::new(name)
            .with_source("main.cpp", sources::MAIN)
            .with_source("gfx/device.cpp", sources::DEVICE)
            .with_shader("tri.frag", sources::FRAG)
            .with_shader("tri.vert", sources::VERT)
    }

    /// Set the Slipway.toml content.
    pub fn with_config(mut self, config: impl Into<String>) -> Self {
        self.config = Some(config.into());
        self
    }

    /// Add a native source under `src/`.
    pub fn with_source(self, path: impl AsRef<Path>, content: impl Into<String>) -> Self {
        let path = Path::new("src").join(path);
        self.with_file(path, content)
    }

    /// Add a shader under `src/shaders/`.
    pub fn with_shader(self, path: impl AsRef<Path>, content: impl Into<String>) -> Self {
        let path = Path::new("src/shaders").join(path);
        self.with_file(path, content)
    }

    /// Add any file relative to the project root.
    pub fn with_file(mut self, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        self.files.insert(path.into(), content.into());
        self
    }

    /// Write this fixture to a real directory, returning the project root.
    pub fn write_to(&self, base_path: &Path) -> std::io::Result<PathBuf> {
        let project_path = base_path.join(&self.name);
        std::fs::create_dir_all(&project_path)?;

        if let Some(config) = &self.config {
            std::fs::write(project_path.join(CONFIG_FILE), config)?;
        }

        for (rel_path, content) in &self.files {
            let full_path = project_path.join(rel_path);
            if let Some(parent) = full_path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&full_path, content)?;
        }

        Ok(project_path)
    }
}

/// Canned file contents.
pub mod sources {
    pub const MAIN: &str = r#"#include <cstdio>

int main() {
    std::puts("hello");
    return 0;
}
"#;

    pub const DEVICE: &str = r#"namespace gfx {
int device_count() { return 1; }
}
"#;

    pub const FRAG: &str = r#"#version 450
layout(location = 0) out vec4 color;
void main() { color = vec4(1.0); }
"#;

    pub const VERT: &str = r#"#version 450
void main() { gl_Position = vec4(0.0); }
"#;

    /// Fed to the fake validator, which rejects anything containing "broken".
    pub const BROKEN: &str = "broken\n";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_renderer_layout() {
        let tmp = tempfile::TempDir::new().unwrap();
        let root = ProjectFixture::renderer("vkdemo")
            .with_config("[build]\n")
            .write_to(tmp.path())
            .unwrap();

        assert!(root.join("src/gfx/device.cpp").is_file());
        assert!(root.join("src/shaders/tri.vert").is_file());
        assert!(root.join(CONFIG_FILE).is_file());
    }
}
