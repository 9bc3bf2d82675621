//! Staged script execution.
//!
//! Toolchains that need a vendor environment activated (vcvars, setvars)
//! cannot be driven command by command: the activation only affects the
//! shell it runs in. Their steps are written to a [`TransientScript`] and
//! executed as one process. The script exists only for the duration of that
//! process.

use std::fs;
use std::path::{Path, PathBuf};

use crate::builder::invocation::{Invocation, ScriptBody, ScriptFlavor};
use crate::util::diagnostic::BuildError;
use crate::util::fs::ensure_dir;
use crate::util::process::{run, ProcessBuilder, ProcessResult, RunMode};

/// Base name of the generated script inside a toolchain's working dir.
pub const SCRIPT_NAME: &str = "command";

/// A generated script file that is deleted when released.
///
/// Call [`TransientScript::remove`] to delete it and observe failures. If the
/// guard is dropped without that (early return, panic) the file is still
/// removed and any error is logged.
#[derive(Debug)]
pub struct TransientScript {
    path: PathBuf,
    flavor: ScriptFlavor,
    armed: bool,
}

impl TransientScript {
    /// Write `body` to `dir/command.<ext>`, replacing any stale copy.
    pub fn create(dir: &Path, body: &ScriptBody) -> Result<Self, BuildError> {
        let path = dir.join(format!("{}.{}", SCRIPT_NAME, body.flavor.extension()));
        fs::write(&path, body.contents()).map_err(|e| BuildError::io("write script", &path, e))?;
        tracing::debug!("wrote transient script {}", path.display());

        Ok(TransientScript {
            path,
            flavor: body.flavor,
            armed: true,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Process that executes the script through its interpreter.
    pub fn command(&self) -> ProcessBuilder {
        match self.flavor {
            ScriptFlavor::Batch => ProcessBuilder::new("cmd").arg("/C").arg(&self.path),
            ScriptFlavor::Posix => ProcessBuilder::new("sh").arg(&self.path),
        }
    }

    /// Delete the script now.
    pub fn remove(mut self) -> Result<(), BuildError> {
        self.armed = false;
        remove_script(&self.path)
    }
}

impl Drop for TransientScript {
    fn drop(&mut self) {
        if self.armed {
            if let Err(e) = remove_script(&self.path) {
                tracing::warn!("{}", e);
            }
        }
    }
}

fn remove_script(path: &Path) -> Result<(), BuildError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(BuildError::ScriptCleanup {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Execute a staged invocation.
///
/// Creates the working and object directories, writes the script, runs it
/// in strict mode and deletes it on every exit path. When both the run and
/// the cleanup fail, the run's error wins and the cleanup error is logged.
pub fn run_staged(invocation: &Invocation) -> Result<ProcessResult, BuildError> {
    let Some(script) = invocation.script() else {
        return Err(BuildError::config(format!(
            "toolchain `{}` has no activation step",
            invocation.toolchain
        )));
    };

    ensure_dir(&invocation.work_dir)?;
    if let Some(object_dir) = &invocation.object_dir {
        ensure_dir(object_dir)?;
    }

    let transient = TransientScript::create(&invocation.work_dir, script)?;
    let process = transient.command().cwd(&invocation.cwd);
    let outcome = run(&process, &invocation.toolchain, RunMode::Strict);
    let cleanup = transient.remove();

    match (outcome, cleanup) {
        (Ok(result), Ok(())) => Ok(result),
        (Ok(_), Err(cleanup)) => Err(cleanup),
        (Err(failure), Ok(())) => Err(failure),
        (Err(failure), Err(cleanup)) => {
            tracing::warn!("{}", cleanup);
            Err(failure)
        }
    }
}
