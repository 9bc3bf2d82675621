//! Error taxonomy for an orchestration run.
//!
//! Every failure a build can hit is a [`BuildError`]. Variants carry enough
//! context to name the failing toolchain or stage, and each one doubles as a
//! [`miette::Diagnostic`] so the CLI can print an actionable hint.

use std::io;
use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Error raised while discovering inputs, rendering invocations, or running them.
#[derive(Debug, Error, Diagnostic)]
pub enum BuildError {
    #[error("project root `{}` does not exist", path.display())]
    #[diagnostic(code(slipway::config::root))]
    ProjectRootMissing { path: PathBuf },

    #[error("{role} directory `{}` does not exist", path.display())]
    #[diagnostic(code(slipway::config::layout), help("adjust `[project]` or `[shaders]` in Slipway.toml to match your layout"))]
    SourceDirMissing { role: &'static str, path: PathBuf },

    #[error("invalid configuration: {message}")]
    #[diagnostic(code(slipway::config::invalid))]
    Config { message: String },

    #[error("failed to scan `{}`", root.display())]
    #[diagnostic(code(slipway::discovery))]
    Discovery {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("toolchain `{toolchain}`: include directory `{}` cannot be resolved", path.display())]
    #[diagnostic(code(slipway::invocation::include), help("fix the path in Slipway.toml or install the missing SDK"))]
    UnresolvedInclude { toolchain: String, path: PathBuf },

    #[error("toolchain `{toolchain}`: library `{}` cannot be resolved", path.display())]
    #[diagnostic(code(slipway::invocation::library), help("fix the path in Slipway.toml or install the missing SDK"))]
    UnresolvedLibrary { toolchain: String, path: PathBuf },

    #[error("toolchain `{toolchain}`: activation script `{}` cannot be resolved", path.display())]
    #[diagnostic(code(slipway::invocation::activation), help("fix the path in Slipway.toml or install the missing SDK"))]
    UnresolvedActivation { toolchain: String, path: PathBuf },

    #[error(
        "toolchain `{toolchain}`: `{}` and `{}` both compile to `{object}`",
        first.display(),
        second.display()
    )]
    #[diagnostic(code(slipway::invocation::collision))]
    ObjectCollision {
        toolchain: String,
        object: String,
        first: PathBuf,
        second: PathBuf,
    },

    #[error(
        "shaders `{}` and `{}` both compile to `{}`",
        first.display(),
        second.display(),
        artifact.display()
    )]
    #[diagnostic(code(slipway::shader::collision), help("keep shader sources under the `[shaders] dir` tree"))]
    ShaderCollision {
        artifact: PathBuf,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("{stage} failed ({})\n{stderr}", describe_exit(*exit_code))]
    #[diagnostic(code(slipway::process::failed), help("run `slipway build --verbose` for the full command line"))]
    ProcessFailed {
        stage: String,
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("{stage}: failed to spawn `{}`", program.display())]
    #[diagnostic(code(slipway::process::spawn))]
    SpawnFailed {
        stage: String,
        program: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("shader `{}` compiled but `{}` was not produced", shader.display(), artifact.display())]
    #[diagnostic(code(slipway::shader::artifact))]
    ShaderArtifactMissing { shader: PathBuf, artifact: PathBuf },

    #[error("failed to remove transient script `{}`", path.display())]
    #[diagnostic(code(slipway::cleanup))]
    ScriptCleanup {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to {action} `{}`", path.display())]
    #[diagnostic(code(slipway::io))]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl BuildError {
    /// Exit status the binary should terminate with for this error.
    ///
    /// Process failures surface the child's own exit code; everything else is `1`.
    pub fn exit_code(&self) -> i32 {
        match self {
            BuildError::ProcessFailed {
                exit_code: Some(code),
                ..
            } if *code != 0 => *code,
            _ => 1,
        }
    }

    /// Build a configuration error from any displayable message.
    pub fn config(message: impl Into<String>) -> Self {
        BuildError::Config {
            message: message.into(),
        }
    }

    /// Wrap an I/O error with the action and path that produced it.
    pub fn io(action: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        BuildError::Io {
            action,
            path: path.into(),
            source,
        }
    }
}

fn describe_exit(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "terminated by signal".to_string(),
    }
}
