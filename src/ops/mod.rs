//! High-level operations.
//!
//! This module contains the implementation of Slipway commands.

pub mod slipway_build;
pub mod slipway_init;

pub use slipway_build::{build, plan, BuildOptions, BuildPlan, BuildReport, StageOutcome, StageReport};
pub use slipway_init::init_project;
