//! List variables command (--list mode).

use anyhow::{Context, Result};
use colored::Colorize;
use log::debug;

use flume_rs::{MatFile, MatValue, WaveFields};

use crate::cli::Args;
use crate::output;

/// Run the list command.
pub fn run(args: &Args) -> Result<()> {
    debug!("Opening container: {}", args.input.display());

    let mat = MatFile::open(&args.input)
        .with_context(|| format!("Failed to open container: {}", args.input.display()))?;

    if mat.is_empty() {
        output::print_warning("No variables found in container", args.quiet);
        return Ok(());
    }

    // Print header
    println!("{}", format!("Variables in '{}':", args.input.display()).bold());
    println!();

    let entries = mat.walk();

    // Calculate column widths
    let max_name = entries.iter().map(|(n, _)| n.len()).max().unwrap_or(4).max(4);

    // Print header row
    println!(
        "  {:<width$}  {:>14}  {:>10}  {}",
        "Name", "Shape", "Class", "Notes",
        width = max_name
    );
    println!(
        "  {:-<width$}  {:->14}  {:->10}  -----",
        "", "", "",
        width = max_name
    );

    for (name, value) in &entries {
        let shape = format!("{:?}", value.shape());
        println!(
            "  {:<width$}  {:>14}  {:>10}  {}",
            name,
            shape,
            value.class_name(),
            notes(value).join(", "),
            width = max_name
        );
    }

    // Print summary
    println!();
    println!(
        "{} top-level variable(s), {} entries",
        mat.len(),
        entries.len()
    );

    // Check whether the run can be loaded as configured
    match WaveFields::from_mat(&mat, &args.struct_name) {
        Ok(fields) => output::print_hint(
            &format!(
                "'{}' holds a recording with {} samples from {} gauges",
                args.struct_name,
                fields.num_times(),
                fields.num_gauges()
            ),
            args.quiet,
        ),
        Err(e) => output::print_warning(
            &format!("'{}' is not a loadable recording: {}", args.struct_name, e),
            args.quiet,
        ),
    }

    Ok(())
}

/// Short remarks about a variable.
fn notes(value: &MatValue) -> Vec<String> {
    let mut notes = Vec::new();

    match value {
        MatValue::Numeric(data) => {
            if data.is_likely_datenum() {
                notes.push("date codes?".green().to_string());
            }
            if data.is_complex() {
                notes.push("complex".yellow().to_string());
            }
            if data.dtype() != "double" {
                notes.push("read as double".dimmed().to_string());
            }
            if data.is_1d() && !data.is_empty() {
                notes.push("1D".dimmed().to_string());
            }
        }
        MatValue::Struct(s) => {
            notes.push(format!("{} field(s)", s.field_names().count()).dimmed().to_string());
        }
        MatValue::Char(text) => {
            notes.push(format!("{text:?}").dimmed().to_string());
        }
        MatValue::Cell(_) => {}
        MatValue::Unsupported { .. } => {
            notes.push("unsupported".red().to_string());
        }
    }

    notes
}
