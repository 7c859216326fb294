//! Smoke tests to verify command wiring

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn test_help_lists_commands() {
    let mut cmd = Command::cargo_bin("replidemo").unwrap();
    cmd.arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("compare"))
        .stdout(predicate::str::contains("init-schema"));
}

#[test]
fn test_serve_help() {
    let mut cmd = Command::cargo_bin("replidemo").unwrap();
    cmd.arg("serve").arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("in-memory store"))
        .stdout(predicate::str::contains("failure policy"));
}

#[test]
fn test_compare_help() {
    let mut cmd = Command::cargo_bin("replidemo").unwrap();
    cmd.arg("compare").arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("/api/compare"));
}

#[test]
fn test_missing_config_fails() {
    let dir = tempfile::tempdir().unwrap();
    let mut cmd = Command::cargo_bin("replidemo").unwrap();
    cmd.arg("--config")
        .arg(dir.path().join("absent.toml"))
        .arg("compare");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load config"));
}

#[test]
fn test_config_without_replica_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
[master]
host = "localhost"
user = "postgres"
database = "demo"

[pgcat]
host = "localhost"
port = 6432
"#,
    )
    .unwrap();

    let mut cmd = Command::cargo_bin("replidemo").unwrap();
    cmd.env("REPLIDEMO_CONFIG", &path).arg("ping");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("no replica database configured"));
}

#[test]
fn test_invalid_failure_policy_rejected() {
    let mut cmd = Command::cargo_bin("replidemo").unwrap();
    cmd.arg("serve").arg("--memory").arg("--failure-policy").arg("lenient");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("unknown failure policy"));
}

#[test]
fn test_completions_bash() {
    let mut cmd = Command::cargo_bin("replidemo").unwrap();
    cmd.arg("completions").arg("bash");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("replidemo"));
}
