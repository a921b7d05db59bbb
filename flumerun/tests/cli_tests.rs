//! Integration tests for the flumerun CLI.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Get the flumerun command.
fn flumerun() -> Command {
    let mut cmd = Command::cargo_bin("flumerun").unwrap();
    cmd.env("NO_COLOR", "1").env_remove("RUST_LOG");
    cmd
}

/// Write a synthetic run with 4 gauges and 50 samples into `dir`.
fn sample(dir: &TempDir, compress: bool) -> PathBuf {
    let path = dir.path().join("sample.mat");
    let mut cmd = Command::cargo_bin("generate_sample").unwrap();
    cmd.arg(&path).args(["--gauges", "4", "--samples", "50"]);
    if compress {
        cmd.arg("--compress");
    }
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Written 50 samples from 4 gauges"));
    path
}

// ============================================================================
// Basic CLI Tests
// ============================================================================

#[test]
fn test_help() {
    flumerun()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Inspect wave flume run recordings"))
        .stdout(predicate::str::contains("--list"))
        .stdout(predicate::str::contains("--profile"))
        .stdout(predicate::str::contains("EXAMPLES"));
}

#[test]
fn test_version() {
    flumerun()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("flumerun"));
}

#[test]
fn test_missing_input() {
    flumerun()
        .assert()
        .failure()
        .stderr(predicate::str::contains("required"));
}

#[test]
fn test_nonexistent_input() {
    flumerun()
        .arg("/nonexistent/file.mat")
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_quiet_and_verbose() {
    let temp = TempDir::new().unwrap();
    let input = sample(&temp, false);

    flumerun()
        .arg(&input)
        .args(["-q", "-v"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Cannot use both"));
}

#[test]
fn test_malformed_input() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("junk.mat");
    fs::write(&input, "not a mat file").unwrap();

    flumerun()
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load run"))
        .stderr(predicate::str::contains("Malformed container"));
}

// ============================================================================
// Modes
// ============================================================================

#[test]
fn test_summary() {
    let temp = TempDir::new().unwrap();
    let input = sample(&temp, false);

    flumerun()
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("id: sample"))
        .stdout(predicate::str::contains("Start Date: 2011-01-01"))
        .stdout(predicate::str::contains("2011-01-01 06:00:00"))
        .stdout(predicate::str::contains("20.00 Hz"))
        .stdout(predicate::str::contains("x_loc"))
        .stdout(predicate::str::contains("7.5000"));
}

#[test]
fn test_summary_compressed_with_id() {
    let temp = TempDir::new().unwrap();
    let input = sample(&temp, true);

    flumerun()
        .arg(&input)
        .args(["--id", "trial-7"])
        .assert()
        .success()
        .stdout(predicate::str::contains("id: trial-7"));
}

#[test]
fn test_list() {
    let temp = TempDir::new().unwrap();
    let input = sample(&temp, false);

    flumerun()
        .arg("--list")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("eta.date"))
        .stdout(predicate::str::contains("eta.x_wm"))
        .stdout(predicate::str::contains("date codes?"))
        .stdout(predicate::str::contains("50 samples from 4 gauges"));
}

#[test]
fn test_profiles() {
    let temp = TempDir::new().unwrap();
    let input = sample(&temp, false);

    flumerun()
        .arg(&input)
        .args(["--profile", "0,20"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Profile 0 at 2011-01-01 06:00:00"))
        .stdout(predicate::str::contains("Profile 20 at 2011-01-01 06:00:0"))
        .stdout(predicate::str::contains("wave maker"))
        .stdout(predicate::str::contains("gauge 4"));
}

#[test]
fn test_profile_out_of_range() {
    let temp = TempDir::new().unwrap();
    let input = sample(&temp, false);

    flumerun()
        .arg(&input)
        .args(["--profile", "50"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("out of range"));
}

#[test]
fn test_gauge_series() {
    let temp = TempDir::new().unwrap();
    let input = sample(&temp, false);

    flumerun()
        .arg(&input)
        .args(["--gauge", "2", "--limit", "5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Gauge 2"))
        .stdout(predicate::str::contains("x=4.5000, y=0.2500"))
        .stdout(predicate::str::contains("showing 5 of 50 samples"));
}

#[test]
fn test_unknown_gauge() {
    let temp = TempDir::new().unwrap();
    let input = sample(&temp, false);

    flumerun()
        .arg(&input)
        .args(["--gauge", "9"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown gauge id 9"));
}

#[test]
fn test_wrong_struct_name() {
    let temp = TempDir::new().unwrap();
    let input = sample(&temp, false);

    flumerun()
        .arg(&input)
        .args(["--struct-name", "waves"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Variable 'waves' not found"));
}
