//! flumerun - Inspect wave flume run recordings.
//!
//! This tool loads a run from a MATLAB .mat container and prints its
//! summary, gauge layout, cross-shore profiles, or gauge time series.

mod cli;
mod commands;
mod output;

use anyhow::Result;
use clap::Parser;

use cli::Args;

fn main() {
    // Parse command line arguments
    let args = Args::parse();

    // RUST_LOG takes precedence over -v / -q
    env_logger::Builder::new()
        .filter_level(args.log_level())
        .parse_default_env()
        .format_timestamp(None)
        .init();

    // Run the appropriate command
    if let Err(e) = run(args) {
        output::print_error(&e);
        std::process::exit(1);
    }
}

/// Main dispatch function.
fn run(args: Args) -> Result<()> {
    // Validate arguments
    args.validate().map_err(|e| anyhow::anyhow!("{}", e))?;

    // Dispatch to appropriate command
    if args.list {
        commands::list::run(&args)
    } else if let Some(id) = args.gauge {
        commands::gauge::run(&args, id)
    } else if let Some(indices) = &args.profile {
        commands::profile::run(&args, indices)
    } else {
        commands::summary::run(&args)
    }
}
