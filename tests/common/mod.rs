//! Shared test helpers for integration tests
//!
//! This module provides common utilities used across all test files.

#![allow(dead_code)]

use assert_cmd::cargo;
use assert_cmd::Command;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Operating hours of a wear-out history (fits to beta ~2.26, eta ~1076)
pub const WEAR_OUT_HOURS: [f64; 6] = [410.0, 650.0, 820.0, 1010.0, 1240.0, 1500.0];

/// Helper to get a relia command isolated from the caller's environment
pub fn relia() -> Command {
    let mut cmd = Command::new(cargo::cargo_bin!("relia"));
    cmd.env_remove("RELIA_LOG")
        .env_remove("RELIA_MAX_RUNS")
        .env_remove("RELIA_COST_MODEL");
    cmd
}

/// Helper to run relia inside a temp directory
pub fn relia_in(tmp: &TempDir) -> Command {
    let mut cmd = relia();
    cmd.current_dir(tmp.path())
        .env("HOME", tmp.path())
        .env("XDG_CONFIG_HOME", tmp.path().join("xdg"));
    cmd
}

/// Write a CSV failure history with one record per month
pub fn write_failures_csv(tmp: &TempDir, name: &str, hours: &[f64]) -> PathBuf {
    let mut content = String::from("failure_date,operating_hours_at_failure,tbf_days,description\n");
    for (i, h) in hours.iter().enumerate() {
        content.push_str(&format!(
            "2024-{:02}-15,{},,failure {}\n",
            (i % 12) + 1,
            h,
            i + 1
        ));
    }
    let path = tmp.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

/// Write a YAML failure history using time-between-failures in days
pub fn write_failures_yaml(tmp: &TempDir, name: &str, tbf_days: &[f64]) -> PathBuf {
    let mut content = String::new();
    for (i, d) in tbf_days.iter().enumerate() {
        content.push_str(&format!(
            "- failure_date: 2023-{:02}-01\n  tbf_days: {}\n",
            (i % 12) + 1,
            d
        ));
    }
    let path = tmp.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

/// Write an asset document with stored Weibull parameters
pub fn write_asset(tmp: &TempDir, id: &str, beta: f64, eta: f64) -> PathBuf {
    let path = tmp.path().join(format!("{}.yaml", id));
    fs::write(
        &path,
        format!(
            "id: {}\nname: Test asset\nweibull_beta: {}\nweibull_eta: {}\ntime_unit: hours\n",
            id, beta, eta
        ),
    )
    .unwrap();
    path
}

/// Write a project-level config file
pub fn write_project_config(tmp: &TempDir, content: &str) {
    let dir = tmp.path().join(".relia");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("config.yaml"), content).unwrap();
}

/// Run a command with `--format json` and parse stdout
pub fn json_output(cmd: &mut Command) -> serde_json::Value {
    let output = cmd.args(["--format", "json"]).output().unwrap();
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}
