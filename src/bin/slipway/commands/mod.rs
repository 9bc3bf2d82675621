//! Command implementations

pub mod build;
pub mod completions;
pub mod init;
pub mod toolchain;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Resolve the project root argument, defaulting to the current directory.
pub fn project_root(path: Option<PathBuf>) -> Result<PathBuf> {
    match path {
        Some(path) => Ok(path),
        None => std::env::current_dir().context("failed to get current directory"),
    }
}

/// Load merged global + project configuration.
pub fn load_config(root: &Path) -> Result<slipway::Config> {
    let global = slipway::util::config::global_config_path();
    slipway::util::config::load_config(global.as_deref(), root)
}
