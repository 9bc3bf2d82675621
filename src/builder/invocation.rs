//! Invocation rendering.
//!
//! Turns a [`ToolchainProfile`], a native [`FileSet`] and the
//! [`BuildTarget`] into a ready-to-run [`Invocation`]: either a list of
//! direct commands, or a script body for toolchains that need their vendor
//! environment activated first. Rendering is purely syntactic; nothing is
//! executed here.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::builder::toolchain::{
    CommandSpec, CompileInput, FusedInput, LinkInput, LinkTarget, Pipeline, ToolchainProfile,
};
use crate::core::{BuildTarget, FileSet};
use crate::util::diagnostic::BuildError;
use crate::util::process::RunMode;

/// Name of the intermediate-objects directory inside a toolchain's working dir.
pub const OBJECT_DIR: &str = "obj";

/// What one step of an invocation does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StepKind {
    /// Vendor environment setup
    Activate,
    /// Environment variable assignment
    Env,
    /// Sources to objects
    Compile,
    /// Objects to executable
    Link,
    /// Sources straight to executable
    Build,
}

impl StepKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepKind::Activate => "activate",
            StepKind::Env => "env",
            StepKind::Compile => "compile",
            StepKind::Link => "link",
            StepKind::Build => "build",
        }
    }
}

/// One directly executable command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Step {
    pub kind: StepKind,
    pub command: CommandSpec,
}

/// Shell dialect a staged script is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScriptFlavor {
    /// Windows `cmd.exe` batch file
    Batch,
    /// POSIX `sh`
    Posix,
}

impl ScriptFlavor {
    /// Dialect native to the host running the build.
    pub fn host() -> Self {
        if cfg!(windows) {
            ScriptFlavor::Batch
        } else {
            ScriptFlavor::Posix
        }
    }

    /// Script file extension (without the dot).
    pub fn extension(&self) -> &'static str {
        match self {
            ScriptFlavor::Batch => "bat",
            ScriptFlavor::Posix => "sh",
        }
    }

    fn quote(&self, word: &str) -> String {
        match self {
            ScriptFlavor::Batch => {
                let word = batch_escape_percent(word);
                if word.is_empty() || word.contains([' ', '\t', '&', '(', ')', '^', '|', '<', '>', '"']) {
                    batch_quote(&word)
                } else {
                    word
                }
            }
            ScriptFlavor::Posix => {
                let safe = !word.is_empty()
                    && word
                        .chars()
                        .all(|c| c.is_ascii_alphanumeric() || "-_./=:+,@%".contains(c));
                if safe {
                    word.to_string()
                } else {
                    format!("'{}'", word.replace('\'', r"'\''"))
                }
            }
        }
    }

    fn activation_line(&self, script: &Path) -> String {
        let path = script.display().to_string();
        match self {
            ScriptFlavor::Batch => format!("call {}", batch_quote(&batch_escape_percent(&path))),
            ScriptFlavor::Posix => format!(". {}", self.quote(&path)),
        }
    }

    fn env_line(&self, key: &str, value: &str) -> String {
        match self {
            ScriptFlavor::Batch => format!(
                "set \"{}={}\"",
                batch_escape_percent(key),
                batch_escape_percent(value)
            ),
            ScriptFlavor::Posix => format!("export {}={}", key, self.quote(value)),
        }
    }

    fn command_line(&self, command: &CommandSpec) -> String {
        let mut words = vec![self.quote(&command.program.display().to_string())];
        words.extend(command.args.iter().map(|a| self.quote(a)));
        words.join(" ")
    }
}

/// `%` starts a variable expansion inside `.bat` files.
fn batch_escape_percent(word: &str) -> String {
    word.replace('%', "%%")
}

/// Quote one argument for the MSVC runtime's command-line parser.
///
/// Backslashes are literal unless they precede a `"`, so runs of them before
/// an embedded quote or the closing quote are doubled.
fn batch_quote(word: &str) -> String {
    let mut out = String::with_capacity(word.len() + 2);
    out.push('"');

    let mut backslashes = 0;
    for c in word.chars() {
        match c {
            '\\' => backslashes += 1,
            '"' => {
                out.extend(std::iter::repeat('\\').take(backslashes * 2 + 1));
                out.push('"');
                backslashes = 0;
            }
            _ => {
                out.extend(std::iter::repeat('\\').take(backslashes));
                out.push(c);
                backslashes = 0;
            }
        }
    }
    out.extend(std::iter::repeat('\\').take(backslashes * 2));
    out.push('"');
    out
}

/// One line of a staged script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScriptLine {
    pub kind: StepKind,
    pub text: String,
}

/// Ordered shell commands for an environment-activating toolchain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScriptBody {
    pub flavor: ScriptFlavor,
    pub lines: Vec<ScriptLine>,
}

impl ScriptBody {
    /// Render activation, environment and command steps into script lines.
    pub fn render(flavor: ScriptFlavor, activation: &Path, env: &[(String, String)], steps: &[Step]) -> Self {
        let mut lines = vec![ScriptLine {
            kind: StepKind::Activate,
            text: flavor.activation_line(activation),
        }];

        lines.extend(env.iter().map(|(key, value)| ScriptLine {
            kind: StepKind::Env,
            text: flavor.env_line(key, value),
        }));

        lines.extend(steps.iter().map(|step| ScriptLine {
            kind: step.kind,
            text: flavor.command_line(&step.command),
        }));

        ScriptBody { flavor, lines }
    }

    /// Position of the first line of a kind.
    pub fn position(&self, kind: StepKind) -> Option<usize> {
        self.lines.iter().position(|l| l.kind == kind)
    }

    /// Full file contents, with failure checks so a broken step stops the script.
    pub fn contents(&self) -> String {
        let mut out = String::new();
        match self.flavor {
            ScriptFlavor::Batch => {
                out.push_str("@echo off\r\n");
                for line in &self.lines {
                    out.push_str(&line.text);
                    out.push_str("\r\n");
                    if line.kind != StepKind::Env {
                        out.push_str("if errorlevel 1 exit /b %errorlevel%\r\n");
                    }
                }
            }
            ScriptFlavor::Posix => {
                out.push_str("set -e\n");
                for line in &self.lines {
                    out.push_str(&line.text);
                    out.push('\n');
                }
            }
        }
        out
    }
}

/// How an invocation is carried out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "body", rename_all = "lowercase")]
pub enum InvocationBody {
    /// Commands executed one after another
    Direct(Vec<Step>),
    /// A script executed as one process
    Staged(ScriptBody),
}

/// The fully rendered build of one toolchain profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Invocation {
    pub toolchain: String,
    pub mode: RunMode,
    pub pipeline: Pipeline,
    /// Final executable path
    pub artifact: PathBuf,
    /// `<output>/<toolchain>`, home of the staged script
    pub work_dir: PathBuf,
    /// Intermediate objects, for split pipelines
    pub object_dir: Option<PathBuf>,
    /// Working directory for every process
    pub cwd: PathBuf,
    pub body: InvocationBody,
}

impl Invocation {
    pub fn is_staged(&self) -> bool {
        matches!(self.body, InvocationBody::Staged(_))
    }

    /// Direct steps, if this invocation runs without a script.
    pub fn steps(&self) -> Option<&[Step]> {
        match &self.body {
            InvocationBody::Direct(steps) => Some(steps),
            InvocationBody::Staged(_) => None,
        }
    }

    /// Script body, if this invocation is staged.
    pub fn script(&self) -> Option<&ScriptBody> {
        match &self.body {
            InvocationBody::Staged(script) => Some(script),
            InvocationBody::Direct(_) => None,
        }
    }
}

/// Render the invocation for one profile.
///
/// Every referenced include directory, library file and activation script
/// must exist. An empty file set still renders a well-formed invocation;
/// the toolchain is left to reject it.
pub fn build_invocation(
    profile: &ToolchainProfile,
    files: &FileSet,
    target: &BuildTarget,
) -> Result<Invocation, BuildError> {
    build_invocation_with(profile, files, target, ScriptFlavor::host())
}

/// Like [`build_invocation`], with an explicit script dialect.
pub fn build_invocation_with(
    profile: &ToolchainProfile,
    files: &FileSet,
    target: &BuildTarget,
    flavor: ScriptFlavor,
) -> Result<Invocation, BuildError> {
    let toolchain = profile.toolchain.as_ref();
    let include_dirs = resolve_includes(profile, target)?;
    let libs = resolve_libs(profile, target)?;
    let activation = profile
        .activation
        .as_deref()
        .map(|script| resolve_activation(profile, target, script))
        .transpose()?;

    let work_dir = target.toolchain_dir(&profile.name);
    let artifact = target.artifact_path(&profile.name, toolchain.exe_extension());

    let (steps, object_dir) = match profile.pipeline {
        Pipeline::Fused => {
            let command = toolchain.fused_command(&FusedInput {
                sources: files.files(),
                output: &artifact,
                include_dirs: &include_dirs,
                libs: &libs,
                settings: &profile.settings,
            });
            (vec![Step { kind: StepKind::Build, command }], None)
        }
        Pipeline::Split => {
            let object_dir = work_dir.join(OBJECT_DIR);
            let units = object_units(profile, files, &object_dir, toolchain.object_extension())?;
            let objects: Vec<PathBuf> = units.iter().map(|(_, obj)| obj.clone()).collect();

            let mut steps: Vec<Step> = toolchain
                .compile_commands(&CompileInput {
                    units: &units,
                    object_dir: &object_dir,
                    include_dirs: &include_dirs,
                    settings: &profile.settings,
                })
                .into_iter()
                .map(|command| Step {
                    kind: StepKind::Compile,
                    command,
                })
                .collect();

            steps.push(Step {
                kind: StepKind::Link,
                command: toolchain.link_command(&LinkInput {
                    objects: &objects,
                    output: &artifact,
                    libs: &libs,
                }),
            });

            (steps, Some(object_dir))
        }
    };

    let body = match activation {
        Some(activation) => {
            InvocationBody::Staged(ScriptBody::render(flavor, &activation, &profile.env, &steps))
        }
        None => InvocationBody::Direct(
            steps
                .into_iter()
                .map(|mut step| {
                    step.command.env.extend(profile.env.iter().cloned());
                    step
                })
                .collect(),
        ),
    };

    Ok(Invocation {
        toolchain: profile.name.clone(),
        mode: profile.mode,
        pipeline: profile.pipeline,
        artifact,
        work_dir,
        object_dir,
        cwd: target.root().to_path_buf(),
        body,
    })
}

fn resolve_includes(profile: &ToolchainProfile, target: &BuildTarget) -> Result<Vec<PathBuf>, BuildError> {
    profile
        .include_dirs
        .iter()
        .map(|dir| {
            let resolved = target.resolve(dir);
            if resolved.is_dir() {
                Ok(resolved)
            } else {
                Err(BuildError::UnresolvedInclude {
                    toolchain: profile.name.clone(),
                    path: resolved,
                })
            }
        })
        .collect()
}

fn resolve_libs(profile: &ToolchainProfile, target: &BuildTarget) -> Result<Vec<LinkTarget>, BuildError> {
    profile
        .libs
        .iter()
        .map(|raw| match LinkTarget::parse(raw) {
            LinkTarget::Path(path) => {
                let resolved = target.resolve(&path);
                if resolved.is_file() {
                    Ok(LinkTarget::Path(resolved))
                } else {
                    Err(BuildError::UnresolvedLibrary {
                        toolchain: profile.name.clone(),
                        path: resolved,
                    })
                }
            }
            name => Ok(name),
        })
        .collect()
}

fn resolve_activation(
    profile: &ToolchainProfile,
    target: &BuildTarget,
    script: &Path,
) -> Result<PathBuf, BuildError> {
    let resolved = target.resolve(script);
    if resolved.is_file() {
        Ok(resolved)
    } else {
        Err(BuildError::UnresolvedActivation {
            toolchain: profile.name.clone(),
            path: resolved,
        })
    }
}

/// Pair each source with its object path, rejecting name collisions.
fn object_units(
    profile: &ToolchainProfile,
    files: &FileSet,
    object_dir: &Path,
    extension: &str,
) -> Result<Vec<(PathBuf, PathBuf)>, BuildError> {
    let mut seen: HashMap<String, &PathBuf> = HashMap::new();
    let mut units = Vec::with_capacity(files.len());

    for source in files {
        let stem = source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let object = format!("{}.{}", stem, extension);

        if let Some(first) = seen.insert(object.clone(), source) {
            return Err(BuildError::ObjectCollision {
                toolchain: profile.name.clone(),
                object,
                first: first.clone(),
                second: source.clone(),
            });
        }

        units.push((source.clone(), object_dir.join(&object)));
    }

    Ok(units)
}
