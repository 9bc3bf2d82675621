//! Implementation of `slipway build`.
//!
//! Sequencing: create the output directory, discover native sources, build
//! and run one invocation per toolchain profile, then compile shaders.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Result;
use rayon::prelude::*;
use serde::Serialize;

use crate::builder::invocation::{build_invocation, Invocation, StepKind};
use crate::builder::shader::{ShaderJob, ShaderPipeline};
use crate::builder::staged::run_staged;
use crate::builder::toolchain::{profiles_from_config, ToolchainProfile};
use crate::core::{discover, BuildTarget, FileRole, FileSet};
use crate::util::config::Config;
use crate::util::diagnostic::BuildError;
use crate::util::fs::{display_relative, ensure_dir};
use crate::util::process::{run, ProcessBuilder, RunMode};
use crate::util::shell::{format_duration, Shell, Status};

/// Options for the build command.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Toolchain profiles to run (empty = all configured)
    pub toolchains: Vec<String>,

    /// Run the shader pipeline (still subject to `[shaders] enabled`)
    pub shaders: bool,

    /// Run toolchain stages concurrently
    pub parallel: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        BuildOptions {
            toolchains: Vec::new(),
            shaders: true,
            parallel: false,
        }
    }
}

/// Everything a build would execute, rendered but not run.
#[derive(Debug, Clone, Serialize)]
pub struct BuildPlan {
    pub target: BuildTarget,
    pub sources: FileSet,
    pub invocations: Vec<Invocation>,
    pub shaders: Vec<ShaderJob>,
}

/// How one toolchain stage ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum StageOutcome {
    Built { artifact: PathBuf },
    /// Recorded best-effort failure; `None` when the process never started
    Failed { exit_code: Option<i32> },
}

/// Result of one toolchain stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageReport {
    pub toolchain: String,
    pub mode: RunMode,
    pub outcome: StageOutcome,
}

impl StageReport {
    pub fn is_built(&self) -> bool {
        matches!(self.outcome, StageOutcome::Built { .. })
    }
}

/// Result of a whole run that did not hit a fatal error.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BuildReport {
    pub stages: Vec<StageReport>,
    pub shader_artifacts: Vec<PathBuf>,
}

impl BuildReport {
    /// Stages that failed in best-effort mode.
    pub fn failures(&self) -> impl Iterator<Item = &StageReport> {
        self.stages.iter().filter(|s| !s.is_built())
    }

    /// Artifacts produced by successful stages.
    pub fn artifacts(&self) -> impl Iterator<Item = &Path> {
        self.stages.iter().filter_map(|s| match &s.outcome {
            StageOutcome::Built { artifact } => Some(artifact.as_path()),
            StageOutcome::Failed { .. } => None,
        })
    }
}

/// Render the build for the project at `root` without running anything.
pub fn plan(config: &Config, root: &Path, opts: &BuildOptions) -> Result<BuildPlan> {
    let target = BuildTarget::new(root, &config.project.output)?;
    let sources = discover_sources(config, &target)?;
    let profiles = profiles_from_config(config, &opts.toolchains)?;

    let invocations = profiles
        .iter()
        .map(|profile| build_invocation(profile, &sources, &target))
        .collect::<Result<Vec<_>, _>>()?;

    let shaders = match shader_pipeline(config, &target, opts) {
        Some(pipeline) => {
            let shaders = discover_shaders(config, &target)?;
            pipeline.jobs(&shaders)?
        }
        None => Vec::new(),
    };

    Ok(BuildPlan {
        target,
        sources,
        invocations,
        shaders,
    })
}

/// Build the project at `root`.
///
/// Best-effort toolchain failures are recorded in the report; any strict
/// failure, shader failure or configuration problem aborts the run.
pub fn build(config: &Config, root: &Path, opts: &BuildOptions, shell: &Shell) -> Result<BuildReport> {
    let start = Instant::now();
    let target = BuildTarget::new(root, &config.project.output)?;
    tracing::info!("building `{}` into {}", target.name(), target.output_dir().display());

    ensure_dir(target.output_dir())?;

    let sources = discover_sources(config, &target)?;
    if sources.is_empty() {
        shell.warn(format!(
            "no sources found under `{}`",
            config.project.sources.display()
        ));
    }

    let profiles = profiles_from_config(config, &opts.toolchains)?;
    let mut report = BuildReport::default();

    if opts.parallel {
        let invocations = profiles
            .iter()
            .map(|profile| build_invocation(profile, &sources, &target))
            .collect::<Result<Vec<_>, _>>()?;

        report.stages = invocations
            .par_iter()
            .map(|invocation| run_stage(invocation, &target, shell))
            .collect::<Result<Vec<_>, _>>()?;
    } else {
        for profile in &profiles {
            report.stages.push(build_stage(profile, &sources, &target, shell)?);
        }
    }

    if let Some(pipeline) = shader_pipeline(config, &target, opts) {
        let shaders = discover_shaders(config, &target)?;
        report.shader_artifacts = run_shaders(&pipeline, &shaders, &target, shell)?;
    } else {
        tracing::info!("shader pipeline disabled");
    }

    for failure in report.failures() {
        let detail = match &failure.outcome {
            StageOutcome::Failed {
                exit_code: Some(code),
            } => format!("exit code {}", code),
            _ => "did not run".to_string(),
        };
        shell.warn(format!(
            "toolchain `{}` failed ({}, {})",
            failure.toolchain, failure.mode, detail
        ));
    }

    shell.status(
        Status::Finished,
        format!(
            "{} of {} toolchain(s), {} shader(s) in {}",
            report.artifacts().count(),
            report.stages.len(),
            report.shader_artifacts.len(),
            format_duration(start.elapsed())
        ),
    );

    Ok(report)
}

fn discover_sources(config: &Config, target: &BuildTarget) -> Result<FileSet, BuildError> {
    discover(
        &target.resolve(&config.project.sources),
        &config.project.source_extensions,
        FileRole::Native,
    )
}

fn discover_shaders(config: &Config, target: &BuildTarget) -> Result<FileSet, BuildError> {
    discover(
        &target.resolve(&config.shaders.dir),
        &config.shaders.extensions,
        FileRole::Shader,
    )
}

fn shader_pipeline(config: &Config, target: &BuildTarget, opts: &BuildOptions) -> Option<ShaderPipeline> {
    if !(opts.shaders && config.shaders.enabled) {
        return None;
    }

    let pipeline = ShaderPipeline::new(
        &config.shaders.validator,
        target.resolve(&config.shaders.dir),
        target.output_dir().join(&config.shaders.output),
    )
    .with_artifact_suffix(&config.shaders.artifact_suffix)
    .with_cwd(target.root());

    Some(pipeline)
}

/// Render then run one profile.
fn build_stage(
    profile: &ToolchainProfile,
    sources: &FileSet,
    target: &BuildTarget,
    shell: &Shell,
) -> Result<StageReport, BuildError> {
    let invocation = build_invocation(profile, sources, target)?;
    run_stage(&invocation, target, shell)
}

/// Run one rendered invocation to completion.
fn run_stage(invocation: &Invocation, target: &BuildTarget, shell: &Shell) -> Result<StageReport, BuildError> {
    tracing::info!(
        "toolchain `{}`: {} pipeline, {}",
        invocation.toolchain,
        invocation.pipeline.as_str(),
        invocation.mode
    );

    let report = |outcome| StageReport {
        toolchain: invocation.toolchain.clone(),
        mode: invocation.mode,
        outcome,
    };

    if invocation.is_staged() {
        shell.status(
            Status::Running,
            format!("{} (staged, {})", invocation.toolchain, invocation.pipeline.as_str()),
        );
        let result = run_staged(invocation)?;
        shell.tool_output(false, &result.stdout, &result.stderr);
        return Ok(report(finished(invocation, target, shell)));
    }

    ensure_dir(&invocation.work_dir)?;
    if let Some(object_dir) = &invocation.object_dir {
        ensure_dir(object_dir)?;
    }

    for step in invocation.steps().unwrap_or_default() {
        let verb = match step.kind {
            StepKind::Link => Status::Linking,
            _ => Status::Compiling,
        };
        shell.status(verb, format!("{} ({})", invocation.toolchain, step.kind.as_str()));

        let stage = format!("{} {}", invocation.toolchain, step.kind.as_str());
        let process = ProcessBuilder::from_spec(&step.command).cwd(&invocation.cwd);
        let result = run(&process, &stage, invocation.mode)?;
        shell.tool_output(!result.success(), &result.stdout, &result.stderr);

        if !result.success() {
            tracing::warn!("{} failed, skipping the rest of `{}`", stage, invocation.toolchain);
            return Ok(report(StageOutcome::Failed {
                exit_code: result.exit_code,
            }));
        }
    }

    Ok(report(finished(invocation, target, shell)))
}

fn finished(invocation: &Invocation, target: &BuildTarget, shell: &Shell) -> StageOutcome {
    shell.status(
        Status::Created,
        display_relative(target.root(), &invocation.artifact),
    );
    StageOutcome::Built {
        artifact: invocation.artifact.clone(),
    }
}

fn run_shaders(
    pipeline: &ShaderPipeline,
    shaders: &FileSet,
    target: &BuildTarget,
    shell: &Shell,
) -> Result<Vec<PathBuf>, BuildError> {
    let jobs = pipeline.jobs(shaders)?;
    if jobs.is_empty() {
        shell.status(Status::Skipped, "no shaders found");
    } else {
        shell.status(Status::Compiling, format!("{} shader(s)", jobs.len()));
    }

    let progress = shell.progress(jobs.len() as u64, "shaders");
    let result = pipeline.run_all(&jobs, |job| {
        tracing::debug!("shader {}", display_relative(target.root(), &job.source));
        progress.inc(1);
    });
    progress.finish();
    result
}
