#![allow(deprecated)] // TODO: migrate cargo_bin to cargo_bin_cmd!

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;

fn idlestop() -> Command {
    let mut cmd = Command::cargo_bin("idlestop").unwrap();
    cmd.env_remove("IDLESTOP_REGION")
        .env_remove("IDLESTOP_SLACK_WEBHOOK_URL")
        .env_remove("IDLESTOP_DISCORD_WEBHOOK_URL");
    cmd
}

/// Help lists every subcommand
#[test]
fn test_cli_help() {
    idlestop()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Stop idle tagged EC2 instances"))
        .stdout(predicate::str::contains("invoke"))
        .stdout(predicate::str::contains("stop-idle"))
        .stdout(predicate::str::contains("warn"))
        .stdout(predicate::str::contains("instances"))
        .stdout(predicate::str::contains("buckets"));
}

#[test]
fn test_cli_version() {
    idlestop()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("idlestop"));
}

#[test]
fn test_invoke_help() {
    idlestop()
        .args(["invoke", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--manual"))
        .stdout(predicate::str::contains("--at"));
}

/// `--at` only accepts HH:MM
#[test]
fn test_invoke_rejects_bad_time() {
    idlestop()
        .args(["invoke", "--at", "25:00"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("25:00"));
}

#[test]
fn test_invalid_command() {
    idlestop().arg("invalid-command").assert().failure();
}

/// `config` prints the defaults when no file overrides them
#[test]
fn test_config_defaults() {
    let temp_dir = tempfile::tempdir().unwrap();
    let config_path = temp_dir.path().join("idlestop.yaml");
    fs::write(&config_path, "# empty\n").unwrap();

    idlestop()
        .env("IDLESTOP_CONFIG_PATH", &config_path)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("region: ap-south-1"))
        .stdout(predicate::str::contains("DoNotStop"))
        .stdout(predicate::str::contains("16:00"));
}

#[test]
fn test_config_file_and_env_override() {
    let temp_dir = tempfile::tempdir().unwrap();
    let config_path = temp_dir.path().join("idlestop.yaml");
    fs::write(&config_path, "target_tag:\n  key: Team\n  value: qa\n").unwrap();

    idlestop()
        .env("IDLESTOP_CONFIG_PATH", &config_path)
        .env("IDLESTOP_REGION", "eu-central-1")
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("region: eu-central-1"))
        .stdout(predicate::str::contains("key: Team"));
}

/// An invalid config file fails before any provider call
#[test]
fn test_invalid_config_fails() {
    let temp_dir = tempfile::tempdir().unwrap();
    let config_path = temp_dir.path().join("idlestop.yaml");
    fs::write(&config_path, "sampling:\n  period_secs: 45\n").unwrap();

    idlestop()
        .env("IDLESTOP_CONFIG_PATH", &config_path)
        .args(["invoke", "--manual"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("period_secs"));
}

#[test]
fn test_missing_config_path_fails() {
    idlestop()
        .env("IDLESTOP_CONFIG_PATH", "/nonexistent/idlestop.yaml")
        .arg("config")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Config file not found"));
}
