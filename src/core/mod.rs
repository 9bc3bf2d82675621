//! Core data structures for Slipway.
//!
//! This module contains the foundational types every stage reads:
//! - The build target (name, output tree, host label)
//! - Discovered file sets
//! - Language settings (standard, warnings, optimization)

pub mod file_set;
pub mod language;
pub mod target;

pub use file_set::{discover, FileRole, FileSet};
pub use language::{CppStandard, OptLevel, WarningLevel};
pub use target::BuildTarget;
