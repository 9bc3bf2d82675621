//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell as CompletionShell;
use slipway::util::shell::ColorChoice;

/// Slipway - build one C++ project with every configured toolchain
#[derive(Parser)]
#[command(name = "slipway")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Coloring: auto, always, never
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    pub color: ColorChoice,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build the project with every configured toolchain, then its shaders
    Build(BuildArgs),

    /// Write a default Slipway.toml
    Init(InitArgs),

    /// List configured toolchains and whether they can be found
    Toolchain(ToolchainArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct BuildArgs {
    /// Project root (defaults to current directory)
    pub path: Option<PathBuf>,

    /// Only build with the named toolchain(s)
    #[arg(short, long = "toolchain", value_name = "NAME")]
    pub toolchains: Vec<String>,

    /// Skip the shader pipeline
    #[arg(long)]
    pub no_shaders: bool,

    /// Print the rendered build plan as JSON (no build)
    #[arg(long)]
    pub plan: bool,

    /// Run toolchain stages concurrently
    #[arg(long)]
    pub parallel: bool,
}

#[derive(Args)]
pub struct InitArgs {
    /// Directory to initialize (defaults to current directory)
    pub path: Option<PathBuf>,
}

#[derive(Args)]
pub struct ToolchainArgs {
    /// Project root (defaults to current directory)
    pub path: Option<PathBuf>,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: CompletionShell,
}
