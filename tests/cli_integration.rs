//! CLI integration tests for Slipway.
//!
//! These tests drive the binary end to end: init, planning, building with
//! fake toolchains, and failure exit codes.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get the slipway binary command, isolated from the user's global config.
fn slipway(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("slipway").unwrap();
    cmd.env("HOME", home).env("USERPROFILE", home).env_remove("RUST_LOG");
    cmd
}

/// Create a temporary directory for test projects.
fn temp_dir() -> TempDir {
    TempDir::new().unwrap()
}

/// Write a project with one source and one shader of each stage.
fn write_project(tmp: &Path, name: &str) -> PathBuf {
    let root = tmp.join(name);
    fs::create_dir_all(root.join("src/shaders")).unwrap();
    fs::write(root.join("src/main.cpp"), "int main() { return 0; }\n").unwrap();
    fs::write(root.join("src/shaders/tri.frag"), "#version 450\n").unwrap();
    fs::write(root.join("src/shaders/tri.vert"), "#version 450\n").unwrap();
    root
}

#[cfg(unix)]
fn write_tool(tmp: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = tmp.join(name);
    fs::write(&path, format!("#!/bin/sh\n{}", body)).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// A compiler/validator that creates whatever follows `-o`.
#[cfg(unix)]
fn fake_compiler(tmp: &Path) -> PathBuf {
    write_tool(
        tmp,
        "fake-c++",
        r#"out=""
while [ $# -gt 0 ]; do
  if [ "$1" = "-o" ]; then out="$2"; shift; fi
  shift
done
[ -n "$out" ] && : > "$out"
exit 0
"#,
    )
}

// ============================================================================
// slipway init
// ============================================================================

#[test]
fn test_init_writes_config() {
    let tmp = temp_dir();
    let root = tmp.path().join("vkdemo");

    slipway(tmp.path())
        .arg("init")
        .arg(&root)
        .assert()
        .success()
        .stderr(predicate::str::contains("Created"));

    let config = fs::read_to_string(root.join("Slipway.toml")).unwrap();
    assert!(config.contains("[[toolchain]]"));
    assert!(config.contains("name = \"clang64\""));
    assert!(config.contains("glslangValidator"));
}

#[test]
fn test_init_refuses_existing_config() {
    let tmp = temp_dir();
    fs::write(tmp.path().join("Slipway.toml"), "").unwrap();

    slipway(tmp.path())
        .arg("init")
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

// ============================================================================
// slipway build --plan
// ============================================================================

#[test]
fn test_plan_prints_json_without_building() {
    let tmp = temp_dir();
    let root = write_project(tmp.path(), "vkdemo");

    let output = slipway(tmp.path())
        .args(["build", "--plan", "--toolchain", "mingw64"])
        .current_dir(&root)
        .output()
        .unwrap();
    assert!(output.status.success());

    let plan: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(plan["target"]["name"], "vkdemo");
    assert_eq!(plan["invocations"].as_array().unwrap().len(), 1);
    assert_eq!(plan["invocations"][0]["toolchain"], "mingw64");
    assert_eq!(plan["shaders"].as_array().unwrap().len(), 2);
    assert!(!root.join("build").exists());
}

#[test]
fn test_unknown_toolchain_fails() {
    let tmp = temp_dir();
    let root = write_project(tmp.path(), "vkdemo");

    slipway(tmp.path())
        .args(["build", "--plan", "--toolchain", "icc"])
        .current_dir(&root)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("unknown toolchain `icc`"));
}

#[test]
fn test_missing_source_dir_shows_help() {
    let tmp = temp_dir();
    let root = tmp.path().join("empty");
    fs::create_dir_all(&root).unwrap();

    slipway(tmp.path())
        .args(["build", "--plan"])
        .current_dir(&root)
        .assert()
        .failure()
        .stderr(predicate::str::contains("source directory"))
        .stderr(predicate::str::contains("help:"));
}

#[test]
fn test_invalid_config_rejected() {
    let tmp = temp_dir();
    let root = write_project(tmp.path(), "vkdemo");
    fs::write(
        root.join("Slipway.toml"),
        "[[toolchain]]\nname = \"msvc64\"\nkind = \"msvc\"\nactivation = \"vcvars64.bat\"\n",
    )
    .unwrap();

    slipway(tmp.path())
        .args(["build", "--plan"])
        .current_dir(&root)
        .assert()
        .failure()
        .stderr(predicate::str::contains("strict mode"));
}

// ============================================================================
// slipway build
// ============================================================================

#[cfg(unix)]
#[test]
fn test_build_with_fake_toolchains() {
    let tmp = temp_dir();
    let root = write_project(tmp.path(), "vkdemo");
    let cxx = fake_compiler(tmp.path());
    fs::write(
        root.join("Slipway.toml"),
        format!(
            r#"[[toolchain]]
name = "fused"
kind = "clang"
compiler = "{cxx}"

[[toolchain]]
name = "split"
kind = "gcc"
compiler = "{cxx}"
pipeline = "split"
mode = "strict"

[shaders]
validator = "{cxx}"
"#,
            cxx = cxx.display()
        ),
    )
    .unwrap();

    for _ in 0..2 {
        slipway(tmp.path())
            .args(["build", "--color", "never"])
            .current_dir(&root)
            .assert()
            .success()
            .stderr(predicate::str::contains("Finished"));
    }

    assert!(root.join("build/vkdemo_fused").is_file());
    assert!(root.join("build/vkdemo_split").is_file());
    assert!(root.join("build/split/obj/main.o").is_file());
    assert!(root.join("build/shaders/tri.frag.spv").is_file());
    assert!(root.join("build/shaders/tri.vert.spv").is_file());
}

#[cfg(unix)]
#[test]
fn test_best_effort_failure_exits_zero() {
    let tmp = temp_dir();
    let root = write_project(tmp.path(), "vkdemo");
    let cxx = fake_compiler(tmp.path());
    let bad = write_tool(tmp.path(), "bad-c++", "echo 'bad-c++: internal error' >&2\nexit 5\n");
    fs::write(
        root.join("Slipway.toml"),
        format!(
            "[[toolchain]]\nname = \"bad\"\nkind = \"gcc\"\ncompiler = \"{}\"\n\n\
             [[toolchain]]\nname = \"good\"\nkind = \"gcc\"\ncompiler = \"{}\"\n\n\
             [shaders]\nenabled = false\n",
            bad.display(),
            cxx.display()
        ),
    )
    .unwrap();

    slipway(tmp.path())
        .args(["build", "--color", "never"])
        .current_dir(&root)
        .assert()
        .success()
        .stderr(predicate::str::contains("internal error"))
        .stderr(predicate::str::contains("toolchain `bad` failed"));

    assert!(root.join("build/vkdemo_good").is_file());
}

#[cfg(unix)]
#[test]
fn test_strict_failure_exit_code_surfaces() {
    let tmp = temp_dir();
    let root = write_project(tmp.path(), "vkdemo");
    let bad = write_tool(tmp.path(), "bad-c++", "exit 7\n");
    fs::write(
        root.join("Slipway.toml"),
        format!(
            "[[toolchain]]\nname = \"bad\"\nkind = \"gcc\"\ncompiler = \"{}\"\nmode = \"strict\"\n",
            bad.display()
        ),
    )
    .unwrap();

    slipway(tmp.path())
        .args(["build", "--no-shaders"])
        .current_dir(&root)
        .assert()
        .code(7)
        .stderr(predicate::str::contains("bad build failed"));
}

// ============================================================================
// slipway toolchain / completions
// ============================================================================

#[test]
fn test_toolchain_lists_profiles() {
    let tmp = temp_dir();
    let root = write_project(tmp.path(), "vkdemo");

    slipway(tmp.path())
        .arg("toolchain")
        .arg(&root)
        .assert()
        .success()
        .stdout(predicate::str::contains("clang64"))
        .stdout(predicate::str::contains("mingw64"))
        .stdout(predicate::str::contains("best-effort"));
}

#[test]
fn test_completions_bash() {
    let tmp = temp_dir();

    slipway(tmp.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("slipway"));
}
