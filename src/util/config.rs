//! Configuration file support for Slipway.
//!
//! Slipway supports two configuration file locations:
//! - Global: `~/.slipway/config.toml` - User-wide defaults
//! - Project: `Slipway.toml` in the project root - Project-specific overrides
//!
//! Project config takes precedence over global config. A section present in
//! a later file replaces the whole section from earlier ones; in particular a
//! `[[toolchain]]` list replaces the default toolchain list.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::builder::toolchain::{Pipeline, ToolchainPlatform};
use crate::core::language::{CppStandard, OptLevel, WarningLevel};
use crate::util::diagnostic::BuildError;
use crate::util::process::RunMode;

/// Project configuration file name.
pub const CONFIG_FILE: &str = "Slipway.toml";

/// Slipway configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Project layout
    pub project: ProjectConfig,

    /// Language settings shared by every toolchain
    pub build: BuildConfig,

    /// Toolchain profiles, built in order
    #[serde(rename = "toolchain")]
    pub toolchains: Vec<ToolchainConfig>,

    /// Shader pipeline settings
    pub shaders: ShaderConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            project: ProjectConfig::default(),
            build: BuildConfig::default(),
            toolchains: ToolchainConfig::defaults(),
            shaders: ShaderConfig::default(),
        }
    }
}

/// Where sources live and where output goes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ProjectConfig {
    /// Native source subtree, relative to the project root
    pub sources: PathBuf,

    /// Native source file extensions
    pub source_extensions: Vec<String>,

    /// Top-level output directory, relative to the project root
    pub output: PathBuf,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        ProjectConfig {
            sources: PathBuf::from("src"),
            source_extensions: vec!["cpp".to_string()],
            output: PathBuf::from("build"),
        }
    }
}

/// Language settings applied to every toolchain.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct BuildConfig {
    pub std: CppStandard,
    pub warnings: WarningLevel,
    pub opt_level: OptLevel,

    /// Include directories; relative paths resolve against the project root
    pub include_dirs: Vec<PathBuf>,

    /// Libraries linked by every toolchain
    pub libs: Vec<String>,
}

/// One `[[toolchain]]` entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ToolchainConfig {
    /// Profile name; names the artifact and working directory
    pub name: String,

    /// Argument grammar family
    pub kind: ToolchainPlatform,

    /// Compiler driver; defaults per kind
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compiler: Option<PathBuf>,

    /// Linker for split MSVC pipelines; defaults to `link`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linker: Option<PathBuf>,

    #[serde(default)]
    pub pipeline: Pipeline,

    #[serde(default)]
    pub mode: RunMode,

    /// Environment activation script; makes the toolchain staged
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activation: Option<PathBuf>,

    /// Extra libraries, appended to `build.libs`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub libs: Vec<String>,

    /// Extra compile flags passed through verbatim
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub flags: Vec<String>,

    /// Explicit process environment
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,
}

impl ToolchainConfig {
    /// A direct, fused, best-effort toolchain of the given kind.
    pub fn new(name: impl Into<String>, kind: ToolchainPlatform) -> Self {
        ToolchainConfig {
            name: name.into(),
            kind,
            compiler: None,
            linker: None,
            pipeline: Pipeline::Fused,
            mode: RunMode::BestEffort,
            activation: None,
            libs: Vec::new(),
            flags: Vec::new(),
            env: BTreeMap::new(),
        }
    }

    /// Default toolchain list: clang and MinGW everywhere, MSVC on Windows.
    pub fn defaults() -> Vec<ToolchainConfig> {
        let mut toolchains = vec![
            ToolchainConfig::new("clang64", ToolchainPlatform::Clang),
            ToolchainConfig::new("mingw64", ToolchainPlatform::Gcc),
        ];

        if cfg!(windows) {
            toolchains.push(ToolchainConfig {
                pipeline: Pipeline::Split,
                mode: RunMode::Strict,
                activation: Some(PathBuf::from(
                    "C:\\Program Files\\Microsoft Visual Studio\\2022\\Community\\VC\\Auxiliary\\Build\\vcvars64.bat",
                )),
                libs: vec!["User32".to_string()],
                ..ToolchainConfig::new("msvc64", ToolchainPlatform::Msvc)
            });
        }

        toolchains
    }
}

/// `[shaders]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ShaderConfig {
    pub enabled: bool,

    /// Shader source subtree, relative to the project root
    pub dir: PathBuf,

    /// Shader stage extensions, unioned into one job list
    pub extensions: Vec<String>,

    /// Validator/compiler executable
    pub validator: PathBuf,

    /// Appended to each source file name to form the artifact name
    pub artifact_suffix: String,

    /// Artifact subdirectory of `project.output`
    pub output: PathBuf,
}

impl Default for ShaderConfig {
    fn default() -> Self {
        ShaderConfig {
            enabled: true,
            dir: PathBuf::from("src/shaders"),
            extensions: vec!["frag".to_string(), "vert".to_string()],
            validator: PathBuf::from("glslangValidator"),
            artifact_suffix: "spv".to_string(),
            output: PathBuf::from("shaders"),
        }
    }
}

/// A config file as written: every section optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct PartialConfig {
    project: Option<ProjectConfig>,
    build: Option<BuildConfig>,
    #[serde(rename = "toolchain")]
    toolchains: Option<Vec<ToolchainConfig>>,
    shaders: Option<ShaderConfig>,
}

impl Config {
    /// Parse a config file's contents on top of the defaults.
    pub fn parse(contents: &str) -> Result<Self> {
        let mut config = Config::default();
        config.merge(toml::from_str(contents)?);
        Ok(config)
    }

    /// Load configuration from a file, on top of the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = Config::default();
        config.merge_file(path)?;
        Ok(config)
    }

    fn merge_file(&mut self, path: &Path) -> Result<()> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;
        let partial: PartialConfig = toml::from_str(&contents)
            .with_context(|| format!("failed to parse config: {}", path.display()))?;
        self.merge(partial);
        Ok(())
    }

    fn merge(&mut self, other: PartialConfig) {
        if let Some(project) = other.project {
            self.project = project;
        }
        if let Some(build) = other.build {
            self.build = build;
        }
        if let Some(toolchains) = other.toolchains {
            self.toolchains = toolchains;
        }
        if let Some(shaders) = other.shaders {
            self.shaders = shaders;
        }
    }

    /// Check cross-field rules that serde cannot express.
    pub fn validate(&self) -> Result<(), BuildError> {
        let mut names = HashSet::new();

        for tc in &self.toolchains {
            if tc.name.is_empty() || tc.name.contains(['/', '\\']) || tc.name == "." || tc.name == ".." {
                return Err(BuildError::config(format!(
                    "toolchain name `{}` must be a plain directory name",
                    tc.name
                )));
            }

            if tc.name == self.shaders.output.to_string_lossy() {
                return Err(BuildError::config(format!(
                    "toolchain `{}` collides with the shader output directory",
                    tc.name
                )));
            }

            if !names.insert(tc.name.as_str()) {
                return Err(BuildError::config(format!(
                    "toolchain `{}` is defined more than once",
                    tc.name
                )));
            }

            if tc.activation.is_some() && tc.mode == RunMode::BestEffort {
                return Err(BuildError::config(format!(
                    "toolchain `{}` uses an activation script and must run in strict mode",
                    tc.name
                )));
            }
        }

        if self.project.source_extensions.is_empty() {
            return Err(BuildError::config("`project.source-extensions` is empty"));
        }

        if self.shaders.enabled && self.shaders.extensions.is_empty() {
            return Err(BuildError::config("`shaders.extensions` is empty"));
        }

        Ok(())
    }

    /// Serialize to TOML, as written by `slipway init`.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("failed to serialize config")
    }

    /// Write the configuration to a file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = self.to_toml()?;
        std::fs::write(path, contents)
            .with_context(|| format!("failed to write config: {}", path.display()))
    }
}

/// Load merged configuration for a project.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (`Slipway.toml`)
/// 2. Global config (`~/.slipway/config.toml`)
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, project_root: &Path) -> Result<Config> {
    let mut config = Config::default();

    if let Some(global) = global_path.filter(|p| p.exists()) {
        tracing::debug!("loading global config {}", global.display());
        config.merge_file(global)?;
    }

    let project = project_config_path(project_root);
    if project.exists() {
        tracing::debug!("loading project config {}", project.display());
        config.merge_file(&project)?;
    }

    config.validate()?;
    Ok(config)
}

/// Get the global slipway config directory (~/.slipway).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".slipway"))
}

/// Get the global config path (~/.slipway/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path (`<root>/Slipway.toml`).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(CONFIG_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.project.sources, PathBuf::from("src"));
        assert_eq!(config.build.std, CppStandard::Cpp20);
        assert_eq!(config.shaders.extensions, vec!["frag", "vert"]);
        assert!(config.toolchains.iter().any(|t| t.name == "clang64"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_project_file() {
        let config = Config::parse(
            r#"
[build]
std = "latest"
warnings = "all"
opt-level = "3"
include-dirs = ["third_party/glm"]

[[toolchain]]
name = "msvc64"
kind = "msvc"
pipeline = "split"
mode = "strict"
activation = "vcvars64.bat"
libs = ["User32"]
env = { VSCMD_SKIP_SENDTELEMETRY = "1" }
"#,
        )
        .unwrap();

        assert_eq!(config.build.std, CppStandard::Latest);
        assert_eq!(config.build.opt_level, OptLevel::O3);
        assert_eq!(config.toolchains.len(), 1);
        let tc = &config.toolchains[0];
        assert_eq!(tc.kind, ToolchainPlatform::Msvc);
        assert_eq!(tc.pipeline, Pipeline::Split);
        assert_eq!(tc.mode, RunMode::Strict);
        assert_eq!(tc.env.get("VSCMD_SKIP_SENDTELEMETRY").map(String::as_str), Some("1"));

        // Untouched sections keep their defaults
        assert_eq!(config.shaders, ShaderConfig::default());
    }

    #[test]
    fn test_unknown_section_rejected() {
        assert!(Config::parse("[packages]\nfoo = 1\n").is_err());
        assert!(Config::parse("[build]\nstd = \"98\"\n").is_err());
    }

    #[test]
    fn test_staged_best_effort_rejected() {
        let config = Config::parse(
            r#"
[[toolchain]]
name = "msvc64"
kind = "msvc"
activation = "vcvars64.bat"
"#,
        )
        .unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("strict"));
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let mut config = Config::default();
        config
            .toolchains
            .push(ToolchainConfig::new("clang64", ToolchainPlatform::Clang));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_project_overrides_global() {
        let tmp = TempDir::new().unwrap();
        let global = tmp.path().join("global.toml");
        std::fs::write(&global, "[build]\nopt-level = \"0\"\n\n[shaders]\nenabled = false\n").unwrap();
        std::fs::write(
            tmp.path().join(CONFIG_FILE),
            "[build]\nopt-level = \"s\"\n",
        )
        .unwrap();

        let config = load_config(Some(&global), tmp.path()).unwrap();
        assert_eq!(config.build.opt_level, OptLevel::Size);
        assert!(!config.shaders.enabled);
    }

    #[test]
    fn test_round_trip_through_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(CONFIG_FILE);
        Config::default().save(&path).unwrap();
        assert_eq!(Config::load(&path).unwrap(), Config::default());
    }
}
