//! Cross-shore profile command (--profile mode).

use anyhow::{Context, Result};

use crate::cli::Args;
use crate::output;

/// Run the profile command.
pub fn run(args: &Args, indices: &[usize]) -> Result<()> {
    let run = super::load_derived_run(args)?;

    let profiles = run
        .profiles_at(indices)
        .with_context(|| format!("Run '{}' has {} samples", run.id(), run.num_times()))?;

    for profile in profiles {
        output::print_header(&format!("Profile {} at {}", profile.index, profile.time));
        println!("  {:<12}  {:>10}  {:>10}", "Source", "x", "eta");
        output::print_separator();

        for (column, (x, eta)) in profile.points().enumerate() {
            let source = match column {
                0 => "wave maker".to_string(),
                g => format!("gauge {g}"),
            };
            println!("  {source:<12}  {x:>10.4}  {eta:>10.4}");
        }
    }

    Ok(())
}
