//! Gauge time series command (--gauge mode).

use anyhow::{bail, Result};

use flume_rs::GaugeId;

use crate::cli::Args;
use crate::output;

/// Run the gauge command.
pub fn run(args: &Args, id: GaugeId) -> Result<()> {
    let run = super::load_run(args)?;

    let Some(gauge) = run.gauge(id) else {
        bail!(
            "{} (run '{}' has gauges 1 to {})",
            flume_rs::Error::UnknownGauge { id },
            run.id(),
            run.num_gauges()
        );
    };
    let location = gauge.location();

    output::print_header(&format!("Gauge {id}"));
    output::print_kv("Location", &format!("x={:.4}, y={:.4}", location.x, location.y), 2);
    output::print_kv("Samples", &output::format_number(gauge.len()), 2);
    println!();

    let limit = if args.limit == 0 { usize::MAX } else { args.limit };

    println!("  {:<26}  {:>10}", "Time", "eta");
    output::print_separator();
    for (time, eta) in run.gauge_series(id)?.take(limit) {
        println!("  {:<26}  {:>10.4}", time.to_string(), eta);
    }

    if gauge.len() > limit {
        output::print_hint(
            &format!(
                "showing {} of {} samples; use --limit 0 for all",
                limit,
                gauge.len()
            ),
            args.quiet,
        );
    }

    Ok(())
}
