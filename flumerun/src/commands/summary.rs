//! Run summary command (default mode).

use anyhow::Result;

use crate::cli::Args;
use crate::output;

/// Run the summary command.
pub fn run(args: &Args) -> Result<()> {
    let run = super::load_derived_run(args)?;

    output::print_header("Run");
    println!("{run}");

    output::print_header("Recording");
    output::print_kv("Samples", &output::format_number(run.num_times()), 2);
    output::print_kv("Gauges", &run.num_gauges().to_string(), 2);

    match run.time_axis().and_then(|axis| axis.stats()) {
        Some(stats) => {
            output::print_kv("First sample", &stats.start.to_string(), 2);
            output::print_kv("Last sample", &stats.end.to_string(), 2);
            output::print_kv("Duration", &output::format_duration(stats.duration), 2);
            output::print_kv(
                "Sample interval",
                &format!("{:.4}s ({:.2} Hz)", stats.mean_interval, stats.sample_rate()),
                2,
            );
            if !stats.is_regular {
                output::print_warning("Sample interval is irregular", args.quiet);
            }
            if !stats.is_monotonic {
                output::print_warning("Timestamps are not in increasing order", args.quiet);
            }
        }
        None => output::print_warning("Too few samples for timing statistics", args.quiet),
    }

    if let Some(actuator) = run.actuator() {
        let (min, max) = actuator
            .position()
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &x| {
                (lo.min(x), hi.max(x))
            });
        output::print_kv("Wave maker stroke", &format!("{min:.4} to {max:.4}"), 2);
    }

    if let Some(table) = run.location_table() {
        output::print_header("Gauge locations");
        print!("{table}");
    }

    output::print_hint(
        "use --profile I,J,... for cross-shore profiles or --gauge ID for a time series",
        args.quiet,
    );

    Ok(())
}
