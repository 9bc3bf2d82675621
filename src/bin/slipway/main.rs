//! Slipway CLI - a multi-toolchain build orchestrator for C++

use anyhow::Result;
use clap::Parser;
use miette::Diagnostic;
use tracing_subscriber::EnvFilter;

use slipway::util::diagnostic::BuildError;
use slipway::util::shell::Shell;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    let shell = Shell::from_flags(cli.quiet, cli.verbose, cli.color);

    // Set up logging
    let default_filter = if cli.verbose {
        "slipway=debug"
    } else if cli.quiet {
        "slipway=error"
    } else {
        "slipway=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli, &shell) {
        let build_error = e.chain().find_map(|cause| cause.downcast_ref::<BuildError>());

        shell.error(format!("{:#}", e));
        if let Some(help) = build_error.and_then(|err| err.help()) {
            eprintln!("{:>12} {}", "help:", help);
        }

        std::process::exit(build_error.map_or(1, BuildError::exit_code));
    }
}

fn run(cli: Cli, shell: &Shell) -> Result<()> {
    match cli.command {
        Commands::Build(args) => commands::build::execute(args, shell),
        Commands::Init(args) => commands::init::execute(args, shell),
        Commands::Toolchain(args) => commands::toolchain::execute(args),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
