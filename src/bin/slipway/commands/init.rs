//! `slipway init` command

use anyhow::Result;

use crate::cli::InitArgs;
use crate::commands::project_root;
use slipway::ops::init_project;
use slipway::util::shell::{Shell, Status};

pub fn execute(args: InitArgs, shell: &Shell) -> Result<()> {
    let root = project_root(args.path)?;
    let path = init_project(&root)?;

    shell.status(Status::Created, path.display());
    Ok(())
}
