//! Subcommand implementations, one module per mode.

pub mod gauge;
pub mod list;
pub mod profile;
pub mod summary;

use anyhow::{Context, Result};
use log::debug;

use flume_rs::{Run, RunLoader};

use crate::cli::Args;

/// Load the run named on the command line.
fn load_run(args: &Args) -> Result<Run> {
    let loader = RunLoader::new(args.loader_config());
    debug!("Loader configuration: {:?}", loader.config());

    loader
        .load(args.run_id(), &args.input)
        .with_context(|| format!("Failed to load run from {}", args.input.display()))
}

/// Load the run and build its derived matrices.
fn load_derived_run(args: &Args) -> Result<Run> {
    let mut run = load_run(args)?;
    let run_id = run.id().to_string();
    run.build_derived()
        .with_context(|| format!("Failed to derive flume surface for run '{}'", run_id))?;
    Ok(run)
}
