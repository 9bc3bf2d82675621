//! GCC/Clang toolchain implementation.

use std::path::{Path, PathBuf};

use crate::core::language::{CppStandard, OptLevel, WarningLevel};

use super::{
    CommandSpec, CompileInput, FusedInput, LinkInput, LinkTarget, Toolchain, ToolchainPlatform,
};

/// GCC-style driver (g++, clang++, MinGW g++).
///
/// The compiler driver doubles as the linker.
#[derive(Debug, Clone)]
pub struct GccToolchain {
    /// Path to the C++ compiler driver
    pub cxx: PathBuf,
    /// Compiler family (gcc or clang)
    pub family: ToolchainPlatform,
}

impl GccToolchain {
    /// Create a new GCC-style toolchain.
    pub fn new(cxx: impl Into<PathBuf>, family: ToolchainPlatform) -> Self {
        GccToolchain {
            cxx: cxx.into(),
            family,
        }
    }

    /// Default C++ driver name for a family.
    pub fn default_driver(family: ToolchainPlatform) -> &'static str {
        match family {
            ToolchainPlatform::Clang => "clang++",
            _ => "g++",
        }
    }

    fn link_args<'a>(&'a self, libs: &'a [LinkTarget]) -> impl Iterator<Item = String> + 'a {
        libs.iter().map(|lib| self.link_arg(lib))
    }
}

impl Toolchain for GccToolchain {
    fn platform(&self) -> ToolchainPlatform {
        self.family
    }

    fn compiler_path(&self) -> &Path {
        &self.cxx
    }

    fn linker_path(&self) -> &Path {
        &self.cxx
    }

    fn std_flag(&self, std: CppStandard) -> String {
        format!("-std={}", std.as_flag_value())
    }

    fn warning_flags(&self, level: WarningLevel) -> Vec<String> {
        let flags: &[&str] = match level {
            WarningLevel::Off => &["-w"],
            WarningLevel::Default => &[],
            WarningLevel::All => &["-Wall", "-Wextra"],
            WarningLevel::Pedantic => &["-Wall", "-Wextra", "-pedantic"],
        };
        flags.iter().map(|f| f.to_string()).collect()
    }

    fn opt_flag(&self, level: OptLevel) -> String {
        match level {
            OptLevel::O0 => "-O0",
            OptLevel::O1 => "-O1",
            OptLevel::O2 => "-O2",
            OptLevel::O3 => "-O3",
            OptLevel::Size => "-Os",
        }
        .to_string()
    }

    fn include_arg(&self, dir: &Path) -> String {
        format!("-I{}", dir.display())
    }

    fn link_arg(&self, lib: &LinkTarget) -> String {
        match lib {
            LinkTarget::Name(name) => format!("-l{}", name),
            LinkTarget::Path(path) => path.display().to_string(),
        }
    }

    fn compile_commands(&self, input: &CompileInput<'_>) -> Vec<CommandSpec> {
        // One command per unit: `-o` names a single object
        input
            .units
            .iter()
            .map(|(source, object)| {
                CommandSpec::new(&self.cxx)
                    .arg("-c")
                    .args(self.language_args(input.settings, input.include_dirs))
                    .arg(source.display().to_string())
                    .arg("-o")
                    .arg(object.display().to_string())
            })
            .collect()
    }

    fn link_command(&self, input: &LinkInput<'_>) -> CommandSpec {
        CommandSpec::new(&self.cxx)
            .arg("-o")
            .arg(input.output.display().to_string())
            .args(input.objects.iter().map(|o| o.display().to_string()))
            .args(self.link_args(input.libs))
    }

    fn fused_command(&self, input: &FusedInput<'_>) -> CommandSpec {
        CommandSpec::new(&self.cxx)
            .args(self.language_args(input.settings, input.include_dirs))
            .args(input.sources.iter().map(|s| s.display().to_string()))
            .arg("-o")
            .arg(input.output.display().to_string())
            .args(self.link_args(input.libs))
    }

    fn object_extension(&self) -> &str {
        "o"
    }

    fn exe_extension(&self) -> &str {
        if cfg!(windows) {
            "exe"
        } else {
            ""
        }
    }
}
