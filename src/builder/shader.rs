//! Shader asset compilation.
//!
//! Each discovered shader source becomes a [`ShaderJob`] and is handed to
//! the validator as `validator -V <input> -o <output>`. The stage is inferred
//! by the validator from the file extension. The first failing job aborts the
//! pipeline: a missing artifact leaves the application unusable.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::builder::toolchain::CommandSpec;
use crate::core::FileSet;
use crate::util::diagnostic::BuildError;
use crate::util::fs::ensure_dir;
use crate::util::process::{run, ProcessBuilder, RunMode};

/// One shader source and the binary it compiles to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShaderJob {
    pub source: PathBuf,
    pub output: PathBuf,
}

/// Validator invocation settings for one run.
#[derive(Debug, Clone)]
pub struct ShaderPipeline {
    validator: PathBuf,
    /// Directory shader sources were discovered under
    source_dir: PathBuf,
    /// Directory artifacts are written to
    output_dir: PathBuf,
    artifact_suffix: String,
    cwd: PathBuf,
}

impl ShaderPipeline {
    pub fn new(
        validator: impl Into<PathBuf>,
        source_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        let output_dir = output_dir.into();
        // discovered paths are canonical, so the prefix must be too
        let source_dir = source_dir.into();
        let source_dir = source_dir.canonicalize().unwrap_or(source_dir);
        ShaderPipeline {
            validator: validator.into(),
            source_dir,
            cwd: output_dir.clone(),
            output_dir,
            artifact_suffix: "spv".to_string(),
        }
    }

    /// Suffix appended to the source file name, without the dot.
    pub fn with_artifact_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.artifact_suffix = suffix.into().trim_start_matches('.').to_string();
        self
    }

    /// Working directory for validator processes.
    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = cwd.into();
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Plan one job per shader, mirroring the source tree under the output dir.
    ///
    /// `tri.frag` becomes `<output>/tri.frag.spv`. A shader outside the source
    /// dir keeps only its file name, and two shaders landing on the same
    /// artifact are rejected.
    pub fn jobs(&self, shaders: &FileSet) -> Result<Vec<ShaderJob>, BuildError> {
        let mut seen: HashMap<PathBuf, &PathBuf> = HashMap::new();
        let mut jobs = Vec::with_capacity(shaders.len());

        for source in shaders.iter() {
            let relative = source.strip_prefix(&self.source_dir).unwrap_or_else(|_| {
                Path::new(source.file_name().unwrap_or(source.as_os_str()))
            });
            let mut file = relative.as_os_str().to_os_string();
            file.push(".");
            file.push(&self.artifact_suffix);
            let output = self.output_dir.join(file);

            if let Some(first) = seen.insert(output.clone(), source) {
                return Err(BuildError::ShaderCollision {
                    artifact: output,
                    first: first.clone(),
                    second: source.clone(),
                });
            }

            jobs.push(ShaderJob {
                source: source.clone(),
                output,
            });
        }

        Ok(jobs)
    }

    /// The validator command for one job.
    pub fn command(&self, job: &ShaderJob) -> CommandSpec {
        CommandSpec::new(&self.validator)
            .arg("-V")
            .arg(job.source.display().to_string())
            .arg("-o")
            .arg(job.output.display().to_string())
    }

    /// Compile a single job, strictly.
    ///
    /// A zero exit without the artifact on disk is a failure too.
    pub fn run_job(&self, job: &ShaderJob) -> Result<PathBuf, BuildError> {
        if let Some(parent) = job.output.parent() {
            ensure_dir(parent)?;
        }

        let stage = format!("shader `{}`", job.source.display());
        let process = ProcessBuilder::from_spec(&self.command(job)).cwd(&self.cwd);
        run(&process, &stage, RunMode::Strict)?;

        if !job.output.is_file() {
            return Err(BuildError::ShaderArtifactMissing {
                shader: job.source.clone(),
                artifact: job.output.clone(),
            });
        }

        Ok(job.output.clone())
    }

    /// Compile every job in order, stopping at the first failure.
    ///
    /// `on_job` is called before each job starts.
    pub fn run_all(
        &self,
        jobs: &[ShaderJob],
        mut on_job: impl FnMut(&ShaderJob),
    ) -> Result<Vec<PathBuf>, BuildError> {
        ensure_dir(&self.output_dir)?;

        let mut artifacts = Vec::with_capacity(jobs.len());
        for job in jobs {
            on_job(job);
            artifacts.push(self.run_job(job)?);
        }
        Ok(artifacts)
    }
}
