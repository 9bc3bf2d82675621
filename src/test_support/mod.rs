//! Test utilities for Slipway unit tests.
//!
//! Provides scratch project trees and fake toolchain executables, so the
//! orchestrator can be driven end to end without a real compiler.
//!
//! # Example
//!
//! ```rust,ignore
//! use slipway::test_support::{ProjectFixture, fake_compiler};
//!
//! #[test]
//! fn test_example() {
//!     let tmp = tempfile::TempDir::new().unwrap();
//!     let root = ProjectFixture::renderer("app").write_to(tmp.path()).unwrap();
//!     let cxx = fake_compiler(tmp.path(), "fake-c++");
//!     // Point a ToolchainConfig at `cxx` and build...
//! }
//! ```

pub mod fixtures;

use std::path::{Path, PathBuf};

pub use fixtures::*;

/// Fake compiler: creates whatever file follows `-o`, then exits 0.
///
/// Also serves as a shader validator, whose command line has the same shape.
pub const FAKE_COMPILER: &str = r#"out=""
while [ $# -gt 0 ]; do
  if [ "$1" = "-o" ]; then
    out="$2"
    shift
  fi
  shift
done
[ -n "$out" ] && : > "$out"
exit 0
"#;

/// Fake validator: like [`FAKE_COMPILER`] but fails on inputs containing "broken".
pub const FAKE_VALIDATOR: &str = r#"grep -q broken "$2" && { echo "ERROR: $2: syntax error" >&2; exit 2; }
: > "$4"
"#;

/// Write an executable `#!/bin/sh` script into `dir/bin/name`.
#[cfg(unix)]
pub fn fake_tool(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let bin = dir.join("bin");
    std::fs::create_dir_all(&bin).expect("failed to create bin dir");
    let path = bin.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{}", body)).expect("failed to write fake tool");
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
        .expect("failed to mark fake tool executable");
    path
}

/// A compiler that produces its `-o` output and succeeds.
#[cfg(unix)]
pub fn fake_compiler(dir: &Path, name: &str) -> PathBuf {
    fake_tool(dir, name, FAKE_COMPILER)
}

/// A validator that rejects shaders containing "broken".
#[cfg(unix)]
pub fn fake_validator(dir: &Path) -> PathBuf {
    fake_tool(dir, "fake-validator", FAKE_VALIDATOR)
}

/// A tool that prints to stderr and exits with `code`.
#[cfg(unix)]
pub fn failing_tool(dir: &Path, name: &str, code: i32) -> PathBuf {
    fake_tool(
        dir,
        name,
        &format!("echo \"{}: fatal error: no input files\" >&2\nexit {}\n", name, code),
    )
}

/// Helper to create a temporary project with the renderer layout.
///
/// Returns the TempDir handle and the project root inside it.
pub fn create_test_project(name: &str) -> (tempfile::TempDir, PathBuf) {
    let tmp = tempfile::TempDir::new().expect("failed to create temp dir");
    let root = ProjectFixture::renderer(name)
        .write_to(tmp.path())
        .expect("failed to write fixture");
    (tmp, root)
}
