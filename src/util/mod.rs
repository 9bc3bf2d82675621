//! Shared utilities

pub mod config;
pub mod diagnostic;
pub mod fs;
pub mod process;
pub mod shell;

pub use config::Config;
pub use diagnostic::BuildError;
pub use process::{ProcessBuilder, ProcessResult, RunMode};
pub use shell::Shell;
