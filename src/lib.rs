//! Slipway - a multi-toolchain build orchestrator for C++ projects
//!
//! This crate provides the library behind the `slipway` binary: source
//! discovery, per-toolchain invocation rendering, process execution and
//! the shader asset pipeline.

pub mod builder;
pub mod core;
pub mod ops;
pub mod util;

/// Test utilities for Slipway unit tests.
///
/// Only compiled for tests. Provides a scratch project tree with sources,
/// shaders and fake toolchain scripts.
#[cfg(test)]
pub mod test_support;

pub use crate::core::{discover, BuildTarget, FileRole, FileSet};
pub use crate::util::config::Config;
pub use crate::util::diagnostic::BuildError;
