//! Implementation of `slipway init`.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::util::config::{project_config_path, Config};

/// Write a default `Slipway.toml` into `path`, creating the directory if needed.
///
/// Refuses to overwrite an existing config. Returns the written file's path.
pub fn init_project(path: &Path) -> Result<PathBuf> {
    if !path.exists() {
        std::fs::create_dir_all(path)
            .with_context(|| format!("failed to create directory: {}", path.display()))?;
    }

    let config_path = project_config_path(path);
    if config_path.exists() {
        bail!("`Slipway.toml` already exists in `{}`", path.display());
    }

    Config::default().save(&config_path)?;
    tracing::info!("wrote {}", config_path.display());

    Ok(config_path)
}
