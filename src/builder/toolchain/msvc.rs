//! MSVC toolchain implementation.

use std::path::{Path, PathBuf};

use crate::core::language::{CppStandard, OptLevel, WarningLevel};

use super::{
    CommandSpec, CompileInput, FusedInput, LinkInput, LinkTarget, Toolchain, ToolchainPlatform,
};

/// MSVC toolchain (Windows).
#[derive(Debug, Clone)]
pub struct MsvcToolchain {
    /// Path to cl.exe (compiler)
    pub cl: PathBuf,
    /// Path to link.exe (linker)
    pub link: PathBuf,
}

impl MsvcToolchain {
    /// Create a new MSVC toolchain.
    pub fn new(cl: impl Into<PathBuf>, link: impl Into<PathBuf>) -> Self {
        MsvcToolchain {
            cl: cl.into(),
            link: link.into(),
        }
    }
}

impl Default for MsvcToolchain {
    /// Bare tool names, resolved through PATH once the environment is activated.
    fn default() -> Self {
        MsvcToolchain::new("cl", "link")
    }
}

impl Toolchain for MsvcToolchain {
    fn platform(&self) -> ToolchainPlatform {
        ToolchainPlatform::Msvc
    }

    fn compiler_path(&self) -> &Path {
        &self.cl
    }

    fn linker_path(&self) -> &Path {
        &self.link
    }

    fn std_flag(&self, std: CppStandard) -> String {
        format!("/std:{}", std.as_msvc_flag_value())
    }

    fn warning_flags(&self, level: WarningLevel) -> Vec<String> {
        let flags: &[&str] = match level {
            WarningLevel::Off => &["/W0"],
            WarningLevel::Default => &[],
            WarningLevel::All => &["/W4"],
            WarningLevel::Pedantic => &["/W4", "/permissive-"],
        };
        flags.iter().map(|f| f.to_string()).collect()
    }

    fn opt_flag(&self, level: OptLevel) -> String {
        match level {
            OptLevel::O0 => "/Od",
            OptLevel::O1 => "/O1",
            OptLevel::O2 | OptLevel::O3 => "/O2",
            OptLevel::Size => "/Os",
        }
        .to_string()
    }

    fn include_arg(&self, dir: &Path) -> String {
        format!("/I{}", dir.display())
    }

    fn link_arg(&self, lib: &LinkTarget) -> String {
        match lib {
            LinkTarget::Name(name) => format!("{}.lib", name),
            LinkTarget::Path(path) => path.display().to_string(),
        }
    }

    fn compile_commands(&self, input: &CompileInput<'_>) -> Vec<CommandSpec> {
        // cl batches every unit into one call when /Fo names a directory.
        // A trailing `\` would escape the closing quote of a quoted path.
        let mut object_dir = input.object_dir.display().to_string();
        if !object_dir.ends_with(['/', '\\']) {
            object_dir.push('/');
        }

        let cmd = CommandSpec::new(&self.cl)
            .arg("/nologo")
            .arg("/c")
            .arg("/EHsc")
            .args(self.language_args(input.settings, input.include_dirs))
            .arg(format!("/Fo{}", object_dir))
            .args(input.units.iter().map(|(source, _)| source.display().to_string()));

        vec![cmd]
    }

    fn link_command(&self, input: &LinkInput<'_>) -> CommandSpec {
        CommandSpec::new(&self.link)
            .arg("/nologo")
            .arg(format!("/OUT:{}", input.output.display()))
            .args(input.objects.iter().map(|o| o.display().to_string()))
            .args(input.libs.iter().map(|lib| self.link_arg(lib)))
    }

    fn fused_command(&self, input: &FusedInput<'_>) -> CommandSpec {
        let mut cmd = CommandSpec::new(&self.cl)
            .arg("/nologo")
            .arg("/EHsc")
            .args(self.language_args(input.settings, input.include_dirs))
            .args(input.sources.iter().map(|s| s.display().to_string()))
            .arg(format!("/Fe:{}", input.output.display()));

        // Everything after /link goes to link.exe
        if !input.libs.is_empty() {
            cmd = cmd
                .arg("/link")
                .args(input.libs.iter().map(|lib| self.link_arg(lib)));
        }

        cmd
    }

    fn object_extension(&self) -> &str {
        "obj"
    }

    fn exe_extension(&self) -> &str {
        "exe"
    }
}
