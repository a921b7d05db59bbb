//! Command-line argument definitions using clap derive macros.

use clap::Parser;
use std::path::PathBuf;

use flume_rs::{LoaderConfig, DAY_OFFSET, DEFAULT_STRUCT_NAME};

/// Inspect wave flume run recordings.
///
/// flumerun loads a run from a MATLAB .mat container and prints its
/// summary, gauge layout, cross-shore profiles, or a gauge's time series.
#[derive(Parser, Debug)]
#[command(name = "flumerun")]
#[command(author, version, about, long_about = None)]
#[command(after_help = EXAMPLES)]
pub struct Args {
    /// Input .mat file
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    // ========================================================================
    // Mode Selection
    // ========================================================================
    /// List variables in the container and exit
    #[arg(short, long)]
    pub list: bool,

    /// Print cross-shore profiles at these time indices (comma-separated)
    #[arg(short, long, value_name = "INDICES", value_delimiter = ',')]
    pub profile: Option<Vec<usize>>,

    /// Print the time series of one gauge
    #[arg(short, long, value_name = "ID")]
    pub gauge: Option<u32>,

    /// Maximum number of rows printed with --gauge (0 prints all)
    #[arg(short = 'n', long, value_name = "N", default_value = "20")]
    pub limit: usize,

    // ========================================================================
    // Loader Configuration
    // ========================================================================
    /// Run identifier (defaults to the input file stem)
    #[arg(long, value_name = "ID")]
    pub id: Option<String>,

    /// Name of the top-level struct holding the recording
    #[arg(long, value_name = "NAME", default_value = DEFAULT_STRUCT_NAME)]
    pub struct_name: String,

    /// Day offset applied to the logger's time codes
    #[arg(long, value_name = "DAYS", default_value_t = DAY_OFFSET, allow_hyphen_values = true)]
    pub day_offset: f64,

    // ========================================================================
    // Output Control
    // ========================================================================
    /// Show detailed progress and information
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress informational output and warnings
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    /// Validate argument combinations.
    pub fn validate(&self) -> Result<(), String> {
        // Quiet and verbose are mutually exclusive
        if self.quiet && self.verbose {
            return Err("Cannot use both --quiet and --verbose".to_string());
        }

        if self.list && (self.profile.is_some() || self.gauge.is_some()) {
            return Err("--list cannot be combined with --profile or --gauge".to_string());
        }

        if self.struct_name.is_empty() {
            return Err("Struct name must not be empty".to_string());
        }

        if !self.day_offset.is_finite() {
            return Err(format!("Day offset must be finite, got {}", self.day_offset));
        }

        // Check input file exists
        if !self.input.exists() {
            return Err(format!("Input file not found: {}", self.input.display()));
        }

        Ok(())
    }

    /// Run identifier: `--id`, or the input file stem.
    pub fn run_id(&self) -> String {
        self.id.clone().unwrap_or_else(|| {
            self.input
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "run".to_string())
        })
    }

    /// Loader configuration from the command line.
    pub fn loader_config(&self) -> LoaderConfig {
        LoaderConfig::new()
            .struct_name(&self.struct_name)
            .day_offset(self.day_offset)
    }

    /// Log level filter implied by -v / -q.
    pub fn log_level(&self) -> log::LevelFilter {
        if self.verbose {
            log::LevelFilter::Debug
        } else if self.quiet {
            log::LevelFilter::Error
        } else {
            log::LevelFilter::Warn
        }
    }
}

/// Example usage shown in --help.
const EXAMPLES: &str = r#"
EXAMPLES:
    # List variables in a container
    flumerun --list run001.mat

    # Print the run summary and gauge layout
    flumerun run001.mat

    # Cross-shore profiles at three time samples
    flumerun run001.mat --profile 0,100,200

    # First 50 samples of gauge 3
    flumerun run001.mat --gauge 3 --limit 50

    # Recording stored under another struct name
    flumerun waves.mat --struct-name waves --id trial-7
"#;

#[cfg(test)]
mod tests {
    use super::*;

    fn args(argv: &[&str]) -> Args {
        Args::parse_from(std::iter::once("flumerun").chain(argv.iter().copied()))
    }

    #[test]
    fn test_defaults() {
        let args = args(&["run001.mat"]);

        assert!(!args.list);
        assert_eq!(args.limit, 20);
        assert_eq!(args.struct_name, "eta");
        assert_eq!(args.day_offset, DAY_OFFSET);
        assert_eq!(args.run_id(), "run001");
        assert_eq!(args.log_level(), log::LevelFilter::Warn);
    }

    #[test]
    fn test_profile_indices() {
        let args = args(&["run.mat", "--profile", "0,10,20", "--id", "trial"]);
        assert_eq!(args.profile, Some(vec![0, 10, 20]));
        assert_eq!(args.run_id(), "trial");
    }

    #[test]
    fn test_loader_config() {
        let args = args(&["run.mat", "--struct-name", "waves", "--day-offset", "-366"]);
        let config = args.loader_config();
        assert_eq!(config.struct_name, "waves");
        assert_eq!(config.day_offset, -366.0);
    }

    #[test]
    fn test_quiet_and_verbose_conflict() {
        let args = args(&["run.mat", "-q", "-v"]);
        assert!(args.validate().unwrap_err().contains("--quiet"));
    }

    #[test]
    fn test_list_excludes_other_modes() {
        let args = args(&["run.mat", "--list", "--gauge", "1"]);
        assert!(args.validate().is_err());
    }
}
