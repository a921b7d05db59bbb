//! Terminal output formatting utilities.

use chrono::Duration;
use colored::Colorize;

/// Print an error message to stderr.
pub fn print_error(err: &anyhow::Error) {
    eprintln!("{}: {}", "error".red().bold(), err);

    // Print cause chain
    for cause in err.chain().skip(1) {
        eprintln!("  {}: {}", "caused by".red(), cause);
    }
}

/// Print a warning message to stderr (respects quiet mode).
pub fn print_warning(msg: &str, quiet: bool) {
    if !quiet {
        eprintln!("{}: {}", "warning".yellow().bold(), msg);
    }
}

/// Print a hint line (respects quiet mode).
pub fn print_hint(msg: &str, quiet: bool) {
    if !quiet {
        println!("{}: {}", "hint".cyan(), msg);
    }
}

/// Print a header line.
pub fn print_header(title: &str) {
    println!("\n{}", title.bold().underline());
}

/// Print a key-value pair.
pub fn print_kv(key: &str, value: &str, indent: usize) {
    let padding = " ".repeat(indent);
    println!("{}{}: {}", padding, key.dimmed(), value);
}

/// Print a separator line.
pub fn print_separator() {
    println!("{}", "─".repeat(60).dimmed());
}

/// Format a number with thousands separators.
pub fn format_number(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::new();

    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.insert(0, ',');
        }
        result.insert(0, c);
    }

    result
}

/// Format a span of time to a human-readable string.
pub fn format_duration(duration: Duration) -> String {
    let seconds = duration
        .num_microseconds()
        .map_or(duration.num_seconds() as f64, |us| us as f64 / 1e6);

    if seconds < 1.0 {
        format!("{:.0}ms", seconds * 1000.0)
    } else if seconds < 60.0 {
        format!("{:.2}s", seconds)
    } else if seconds < 3600.0 {
        let mins = (seconds / 60.0).floor();
        let secs = seconds % 60.0;
        format!("{}m {:.1}s", mins, secs)
    } else {
        let hours = (seconds / 3600.0).floor();
        let mins = ((seconds % 3600.0) / 60.0).floor();
        format!("{}h {}m", hours, mins)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(1234567), "1,234,567");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::milliseconds(500)), "500ms");
        assert_eq!(format_duration(Duration::milliseconds(1500)), "1.50s");
        assert_eq!(format_duration(Duration::seconds(90)), "1m 30.0s");
        assert_eq!(format_duration(Duration::seconds(7500)), "2h 5m");
    }
}
