//! Toolchain construction from configuration.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::util::config::{Config, ToolchainConfig};
use crate::util::diagnostic::BuildError;
use crate::util::process::find_executable;

use super::{CompileSettings, GccToolchain, MsvcToolchain, Toolchain, ToolchainPlatform, ToolchainProfile};

/// Create the grammar implementation for one configured toolchain.
pub fn toolchain_for(tc: &ToolchainConfig) -> Arc<dyn Toolchain> {
    match tc.kind {
        ToolchainPlatform::Gcc | ToolchainPlatform::Clang => {
            let driver = tc
                .compiler
                .clone()
                .unwrap_or_else(|| PathBuf::from(GccToolchain::default_driver(tc.kind)));
            Arc::new(GccToolchain::new(driver, tc.kind))
        }
        ToolchainPlatform::Msvc => {
            let defaults = MsvcToolchain::default();
            Arc::new(MsvcToolchain::new(
                tc.compiler.clone().unwrap_or(defaults.cl),
                tc.linker.clone().unwrap_or(defaults.link),
            ))
        }
    }
}

/// Turn the configured toolchain list into profiles, in configured order.
///
/// `only` restricts the result to the named profiles; an unknown name is a
/// configuration error.
pub fn profiles_from_config(config: &Config, only: &[String]) -> Result<Vec<ToolchainProfile>, BuildError> {
    for name in only {
        if !config.toolchains.iter().any(|tc| &tc.name == name) {
            let available: Vec<&str> = config.toolchains.iter().map(|tc| tc.name.as_str()).collect();
            return Err(BuildError::config(format!(
                "unknown toolchain `{}`, available: {}",
                name,
                if available.is_empty() {
                    "(none)".to_string()
                } else {
                    available.join(", ")
                }
            )));
        }
    }

    let profiles = config
        .toolchains
        .iter()
        .filter(|tc| only.is_empty() || only.contains(&tc.name))
        .map(|tc| {
            let mut libs = config.build.libs.clone();
            libs.extend(tc.libs.iter().cloned());

            ToolchainProfile {
                name: tc.name.clone(),
                toolchain: toolchain_for(tc),
                pipeline: tc.pipeline,
                mode: tc.mode,
                activation: tc.activation.clone(),
                settings: CompileSettings {
                    std: config.build.std,
                    warnings: config.build.warnings,
                    opt: config.build.opt_level,
                    flags: tc.flags.clone(),
                },
                include_dirs: config.build.include_dirs.clone(),
                libs,
                env: tc.env.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
            }
        })
        .collect();

    Ok(profiles)
}

/// Resolve a profile's compiler on the current PATH.
///
/// Staged compilers only appear on PATH after activation, so for them this
/// reports whether the activation script exists instead.
pub fn compiler_on_path(profile: &ToolchainProfile, root: &Path) -> Option<PathBuf> {
    match &profile.activation {
        Some(script) => {
            let script = if script.is_absolute() {
                script.clone()
            } else {
                root.join(script)
            };
            script.is_file().then_some(script)
        }
        None => find_executable(profile.toolchain.compiler_path()),
    }
}
