//! Toolchain abstraction for C++ compilers.
//!
//! Every toolchain family expresses the same settings (standard, warnings,
//! optimization, include directories, link targets, output path) with its own
//! incompatible argument grammar. A [`Toolchain`] implementation knows one
//! grammar; a [`ToolchainProfile`] pairs it with the settings and run policy
//! for one configured build.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core::language::{CppStandard, OptLevel, WarningLevel};
use crate::util::process::RunMode;

mod detect;
mod gcc;
mod msvc;

pub use detect::{compiler_on_path, profiles_from_config, toolchain_for};
pub use gcc::GccToolchain;
pub use msvc::MsvcToolchain;

/// A command to execute, with program, arguments, and environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandSpec {
    /// The program to run (e.g., "clang++", "cl")
    pub program: PathBuf,
    /// Command arguments
    pub args: Vec<String>,
    /// Environment variables to set
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub env: Vec<(String, String)>,
}

impl CommandSpec {
    /// Create a new command spec.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        CommandSpec {
            program: program.into(),
            args: Vec::new(),
            env: Vec::new(),
        }
    }

    /// Add an argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add multiple arguments.
    pub fn args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args.extend(args.into_iter().map(|a| a.into()));
        self
    }

    /// Add an environment variable.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }
}

/// Language settings and extra flags applied to every compile.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileSettings {
    pub std: CppStandard,
    pub warnings: WarningLevel,
    pub opt: OptLevel,
    /// Toolchain-specific flags passed through verbatim
    pub flags: Vec<String>,
}

/// Something handed to the linker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkTarget {
    /// A library looked up by name (`-lfoo`, `foo.lib`)
    Name(String),
    /// A concrete archive or object file
    Path(PathBuf),
}

impl LinkTarget {
    /// Classify a configured library string.
    ///
    /// Anything with a directory separator or a known library/object
    /// extension is a path; everything else is a library name.
    pub fn parse(raw: &str) -> Self {
        const FILE_EXTENSIONS: &[&str] = &["a", "so", "dylib", "lib", "dll", "o", "obj"];

        let path = Path::new(raw);
        let has_separator = raw.contains('/') || raw.contains('\\');
        let has_extension = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| FILE_EXTENSIONS.contains(&e));

        if has_separator || has_extension {
            LinkTarget::Path(path.to_path_buf())
        } else {
            LinkTarget::Name(raw.to_string())
        }
    }
}

/// Input for a separate compile step producing object files.
#[derive(Debug, Clone)]
pub struct CompileInput<'a> {
    /// Sources paired with the object file each one produces
    pub units: &'a [(PathBuf, PathBuf)],
    /// Directory all objects are written to
    pub object_dir: &'a Path,
    pub include_dirs: &'a [PathBuf],
    pub settings: &'a CompileSettings,
}

/// Input for a link step.
#[derive(Debug, Clone)]
pub struct LinkInput<'a> {
    pub objects: &'a [PathBuf],
    pub output: &'a Path,
    pub libs: &'a [LinkTarget],
}

/// Input for a single invocation that compiles and links in one go.
#[derive(Debug, Clone)]
pub struct FusedInput<'a> {
    pub sources: &'a [PathBuf],
    pub output: &'a Path,
    pub include_dirs: &'a [PathBuf],
    pub libs: &'a [LinkTarget],
    pub settings: &'a CompileSettings,
}

/// The family of a toolchain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolchainPlatform {
    /// GCC (GNU Compiler Collection, including MinGW)
    Gcc,
    /// Clang/LLVM
    Clang,
    /// Microsoft Visual C++
    Msvc,
}

impl ToolchainPlatform {
    /// Get the platform name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolchainPlatform::Gcc => "gcc",
            ToolchainPlatform::Clang => "clang",
            ToolchainPlatform::Msvc => "msvc",
        }
    }
}

impl fmt::Display for ToolchainPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trait for toolchain implementations.
///
/// The primitive methods spell one setting each; the command methods
/// assemble them into complete invocations for the three step shapes.
pub trait Toolchain: fmt::Debug + Send + Sync {
    /// Get the toolchain platform.
    fn platform(&self) -> ToolchainPlatform;

    /// Get the compiler path.
    fn compiler_path(&self) -> &Path;

    /// Get the linker used for split pipelines.
    fn linker_path(&self) -> &Path;

    /// Language standard selection, e.g. `-std=c++20`.
    fn std_flag(&self, std: CppStandard) -> String;

    /// Warning flags for a level; may be empty.
    fn warning_flags(&self, level: WarningLevel) -> Vec<String>;

    /// Optimization flag, e.g. `-O2`.
    fn opt_flag(&self, level: OptLevel) -> String;

    /// Include directory argument, e.g. `-I<dir>`.
    fn include_arg(&self, dir: &Path) -> String;

    /// Link argument for a library name or file.
    fn link_arg(&self, lib: &LinkTarget) -> String;

    /// Generate the compile-only commands for a split pipeline.
    fn compile_commands(&self, input: &CompileInput<'_>) -> Vec<CommandSpec>;

    /// Generate the link command for a split pipeline.
    fn link_command(&self, input: &LinkInput<'_>) -> CommandSpec;

    /// Generate a single compile-and-link command.
    fn fused_command(&self, input: &FusedInput<'_>) -> CommandSpec;

    /// Get the object file extension.
    fn object_extension(&self) -> &str;

    /// Get the executable extension.
    fn exe_extension(&self) -> &str;

    /// Standard, warning, optimization, extra and include arguments, in that order.
    fn language_args(&self, settings: &CompileSettings, include_dirs: &[PathBuf]) -> Vec<String> {
        let mut args = vec![self.std_flag(settings.std)];
        args.extend(self.warning_flags(settings.warnings));
        args.push(self.opt_flag(settings.opt));
        args.extend(settings.flags.iter().cloned());
        args.extend(include_dirs.iter().map(|dir| self.include_arg(dir)));
        args
    }
}

/// How a profile turns sources into an executable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pipeline {
    /// One invocation compiles and links
    #[default]
    Fused,
    /// Compile to objects, then link them
    Split,
}

impl Pipeline {
    pub fn as_str(&self) -> &'static str {
        match self {
            Pipeline::Fused => "fused",
            Pipeline::Split => "split",
        }
    }
}

/// One configured toolchain build: grammar, settings, and run policy.
#[derive(Debug, Clone)]
pub struct ToolchainProfile {
    /// Profile name; names the artifact and the working subdirectory
    pub name: String,
    pub toolchain: Arc<dyn Toolchain>,
    pub pipeline: Pipeline,
    pub mode: RunMode,
    /// Vendor environment script run before the compiler is reachable
    pub activation: Option<PathBuf>,
    pub settings: CompileSettings,
    pub include_dirs: Vec<PathBuf>,
    pub libs: Vec<String>,
    /// Explicit environment for every process of this profile
    pub env: Vec<(String, String)>,
}

impl ToolchainProfile {
    /// Create a fused, best-effort profile with default settings.
    pub fn new(name: impl Into<String>, toolchain: Arc<dyn Toolchain>) -> Self {
        ToolchainProfile {
            name: name.into(),
            toolchain,
            pipeline: Pipeline::Fused,
            mode: RunMode::BestEffort,
            activation: None,
            settings: CompileSettings::default(),
            include_dirs: Vec::new(),
            libs: Vec::new(),
            env: Vec::new(),
        }
    }

    pub fn with_pipeline(mut self, pipeline: Pipeline) -> Self {
        self.pipeline = pipeline;
        self
    }

    pub fn with_mode(mut self, mode: RunMode) -> Self {
        self.mode = mode;
        self
    }

    /// Make this profile staged behind an activation script.
    ///
    /// Staged builds always run strict.
    pub fn with_activation(mut self, script: impl Into<PathBuf>) -> Self {
        self.activation = Some(script.into());
        self.mode = RunMode::Strict;
        self
    }

    pub fn with_settings(mut self, settings: CompileSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_include_dirs(mut self, dirs: Vec<PathBuf>) -> Self {
        self.include_dirs = dirs;
        self
    }

    pub fn with_libs(mut self, libs: Vec<String>) -> Self {
        self.libs = libs;
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Whether the compiler is only reachable after environment activation.
    pub fn is_staged(&self) -> bool {
        self.activation.is_some()
    }
}
