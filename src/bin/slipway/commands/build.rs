//! `slipway build` command

use anyhow::{Context, Result};

use crate::cli::BuildArgs;
use crate::commands::{load_config, project_root};
use slipway::ops::{build, plan, BuildOptions};
use slipway::util::shell::Shell;

pub fn execute(args: BuildArgs, shell: &Shell) -> Result<()> {
    let root = project_root(args.path)?;
    let config = load_config(&root)?;

    let opts = BuildOptions {
        toolchains: args.toolchains,
        shaders: !args.no_shaders,
        parallel: args.parallel,
    };

    if args.plan {
        let plan = plan(&config, &root, &opts)?;
        let json = serde_json::to_string_pretty(&plan).context("failed to serialize build plan")?;
        println!("{}", json);
        return Ok(());
    }

    build(&config, &root, &opts, shell)?;
    Ok(())
}
