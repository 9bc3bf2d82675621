//! Subprocess execution.
//!
//! Every external tool (compiler, linker, validator, staged script) runs
//! through [`run`]: synchronously, with stdout and stderr captured so that
//! diagnostics from different stages never interleave on the console.

use std::ffi::OsStr;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use serde::{Deserialize, Serialize};

use crate::builder::toolchain::CommandSpec;
use crate::util::diagnostic::BuildError;

/// What a non-zero exit means for the rest of the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RunMode {
    /// Record the failure and keep going
    #[default]
    BestEffort,
    /// Abort the whole run on failure
    Strict,
}

impl RunMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunMode::BestEffort => "best-effort",
            RunMode::Strict => "strict",
        }
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one finished (or unlaunchable) process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessResult {
    /// Exit code; `None` when killed by a signal or never started
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessResult {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    fn from_output(output: Output) -> Self {
        ProcessResult {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }
}

/// Builder for subprocess execution.
#[derive(Debug, Clone)]
pub struct ProcessBuilder {
    program: PathBuf,
    args: Vec<String>,
    env: Vec<(String, String)>,
    cwd: Option<PathBuf>,
}

impl ProcessBuilder {
    /// Create a new process builder for the given program.
    pub fn new(program: impl AsRef<Path>) -> Self {
        ProcessBuilder {
            program: program.as_ref().to_path_buf(),
            args: Vec::new(),
            env: Vec::new(),
            cwd: None,
        }
    }

    /// Create a process builder from a rendered command.
    pub fn from_spec(spec: &CommandSpec) -> Self {
        let mut pb = ProcessBuilder::new(&spec.program).args(&spec.args);
        for (key, value) in &spec.env {
            pb = pb.env(key, value);
        }
        pb
    }

    /// Add a single argument.
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_string_lossy().into_owned());
        self
    }

    /// Add multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args.extend(
            args.into_iter()
                .map(|s| s.as_ref().to_string_lossy().into_owned()),
        );
        self
    }

    /// Set an environment variable.
    pub fn env(mut self, key: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        self.env
            .push((key.as_ref().to_string(), value.as_ref().to_string()));
        self
    }

    /// Set the working directory.
    pub fn cwd(mut self, cwd: impl AsRef<Path>) -> Self {
        self.cwd = Some(cwd.as_ref().to_path_buf());
        self
    }

    /// Get the program path.
    pub fn get_program(&self) -> &Path {
        &self.program
    }

    /// Get the arguments.
    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    /// Build the Command.
    fn build_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);

        for (key, value) in &self.env {
            cmd.env(key, value);
        }

        if let Some(ref cwd) = self.cwd {
            cmd.current_dir(cwd);
        }

        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        cmd
    }

    /// Execute the command and wait for completion.
    pub fn exec(&self) -> std::io::Result<Output> {
        self.build_command().output()
    }

    /// Display the command for error messages.
    pub fn display_command(&self) -> String {
        let mut parts = vec![self.program.display().to_string()];
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }
}

/// Run a process to completion under the given mode.
///
/// In [`RunMode::Strict`] a spawn failure or non-zero exit becomes an error.
/// In [`RunMode::BestEffort`] both are folded into a failed [`ProcessResult`]
/// and the caller decides how to record it.
pub fn run(process: &ProcessBuilder, stage: &str, mode: RunMode) -> Result<ProcessResult, BuildError> {
    tracing::debug!("[{}] {}", stage, process.display_command());

    let result = match process.exec() {
        Ok(output) => ProcessResult::from_output(output),
        Err(source) => {
            if mode == RunMode::Strict {
                return Err(BuildError::SpawnFailed {
                    stage: stage.to_string(),
                    program: process.get_program().to_path_buf(),
                    source,
                });
            }
            tracing::warn!(
                "{}: failed to spawn `{}`: {}",
                stage,
                process.get_program().display(),
                source
            );
            ProcessResult {
                exit_code: None,
                stdout: String::new(),
                stderr: format!("failed to spawn `{}`: {}", process.get_program().display(), source),
            }
        }
    };

    if !result.success() && mode == RunMode::Strict {
        return Err(BuildError::ProcessFailed {
            stage: stage.to_string(),
            exit_code: result.exit_code,
            stderr: result.stderr,
        });
    }

    Ok(result)
}

/// Find an executable in PATH.
pub fn find_executable(name: impl AsRef<OsStr>) -> Option<PathBuf> {
    which::which(name).ok()
}
