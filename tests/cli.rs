// this_file: tests/cli.rs
//! CLI integration tests for the luxmeter binary

use assert_cmd::prelude::*;
use assert_cmd::Command;
use predicates::prelude::*;

/// Helper to run the `luxmeter` binary
fn bin() -> Command {
    Command::cargo_bin("luxmeter").expect("binary exists")
}

#[test]
fn test_cli_version_prints() {
    let mut cmd = bin();
    cmd.arg("version");
    cmd.env_remove("RUST_LOG");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("luxmeter version"));
}

#[test]
fn test_cli_help_lists_serve_command() {
    let mut cmd = bin();
    cmd.arg("--help");
    cmd.env_remove("RUST_LOG");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("serve"));
}

#[test]
fn test_cli_serve_rejects_missing_config_file() {
    let mut cmd = bin();
    cmd.args(["serve", "--config", "/nonexistent/luxmeter.toml"]);
    cmd.env_remove("RUST_LOG");
    cmd.assert().failure();
}

#[test]
fn test_cli_serve_rejects_malformed_config_file() {
    use std::io::Write;
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "port = \"eight thousand\"").unwrap();

    let mut cmd = bin();
    cmd.args(["serve", "--config"]);
    cmd.arg(file.path());
    cmd.env_remove("RUST_LOG");
    cmd.assert().failure();
}
