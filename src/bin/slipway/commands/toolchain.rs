//! `slipway toolchain` command

use anyhow::Result;

use crate::cli::ToolchainArgs;
use crate::commands::{load_config, project_root};
use slipway::builder::toolchain::{compiler_on_path, profiles_from_config};

pub fn execute(args: ToolchainArgs) -> Result<()> {
    let root = project_root(args.path)?;
    let config = load_config(&root)?;
    let profiles = profiles_from_config(&config, &[])?;

    println!("Toolchains:");
    println!();

    for profile in &profiles {
        let kind = if profile.is_staged() { "staged" } else { "direct" };
        println!(
            "  {:<12} {:<6} {:<6} {:<6} {:<12}",
            profile.name,
            profile.toolchain.platform().as_str(),
            kind,
            profile.pipeline.as_str(),
            profile.mode.as_str(),
        );

        match compiler_on_path(profile, &root) {
            Some(path) => println!("               {}", path.display()),
            None => println!(
                "               {} not found",
                profile
                    .activation
                    .as_deref()
                    .unwrap_or_else(|| profile.toolchain.compiler_path())
                    .display()
            ),
        }
    }

    if profiles.is_empty() {
        println!("  (none configured)");
    }

    Ok(())
}
