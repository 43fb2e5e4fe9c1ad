//! CLI smoke tests for the users-server binary
//!
//! These tests verify that the CLI commands work correctly, including
//! configuration validation, help output, and server startup.

use std::path::Path;
use std::process::{Command, Stdio};
use std::time::Duration;
use tempfile::TempDir;
use tokio::time::timeout;

/// Helper to run the users-server binary with given arguments
fn run_users_server(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_users-server"))
        .args(args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .expect("Failed to execute users-server")
}

/// Writes `body` under a `server:` section whose home_dir points into `dir`.
fn write_config(dir: &Path, name: &str, port: u16, body: &str) -> String {
    let path = dir.join(name);
    let config = format!(
        r#"
server:
  home_dir: "{}"
  host: "127.0.0.1"
  port: {}
{}
"#,
        dir.join("home").to_string_lossy().replace('\\', "/"),
        port,
        body
    );
    std::fs::write(&path, config).expect("Failed to write config file");
    path.to_string_lossy().to_string()
}

#[test]
fn test_cli_help_command() {
    let output = run_users_server(&["--help"]);

    assert!(output.status.success(), "Help command should succeed");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("users-server"), "Should contain binary name");
    assert!(stdout.contains("Usage:"), "Should contain usage information");
    assert!(stdout.contains("run"), "Should contain 'run' subcommand");
    assert!(stdout.contains("check"), "Should contain 'check' subcommand");
    assert!(stdout.contains("--config"), "Should mention config option");
    assert!(stdout.contains("--mock"), "Should mention mock option");
}

#[test]
fn test_cli_version_command() {
    let output = run_users_server(&["--version"]);

    assert!(output.status.success(), "Version command should succeed");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("users-server 0.1.0"));
}

#[test]
fn test_cli_invalid_command() {
    let output = run_users_server(&["invalid-command"]);

    assert!(!output.status.success(), "Invalid command should fail");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("error"), "Should report an error: {}", stderr);
}

#[test]
fn test_cli_config_validation_missing_file() {
    for flag in ["--config", "-c"] {
        let output = run_users_server(&[flag, "/nonexistent/config.yaml", "check"]);

        assert!(!output.status.success(), "Should fail with missing config");
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(
            stderr.contains("Config file not found"),
            "Should mention config file issue: {}",
            stderr
        );
    }
}

#[test]
fn test_cli_config_validation_invalid_yaml() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = temp_dir.path().join("invalid.yaml");
    std::fs::write(&config_path, "invalid: yaml: content: [unclosed")
        .expect("Failed to write file");

    let output = run_users_server(&["--config", config_path.to_str().unwrap(), "check"]);

    assert!(!output.status.success(), "Should fail with invalid YAML");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Failed to parse config file"),
        "Should mention YAML parsing issue: {}",
        stderr
    );
}

#[test]
fn test_cli_config_validation_valid_config() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = write_config(
        temp_dir.path(),
        "valid.yaml",
        8087,
        r#"
database:
  url: "sqlite://database/users.db"

logging:
  default:
    console_level: info
    file: "logs/users-server.log"
    file_level: info
    max_backups: 3
    max_size_mb: 10

modules:
  users_info:
    jwt_secret: "test-secret"
  api_ingress:
    cors_enabled: true
"#,
    );

    let output = run_users_server(&["--config", &config_path, "check"]);

    if !output.status.success() {
        eprintln!("STDERR: {}", String::from_utf8_lossy(&output.stderr));
    }
    assert!(output.status.success(), "Should succeed with valid config");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Configuration check passed"));
}

#[test]
fn test_cli_check_rejects_unknown_module_key() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = write_config(
        temp_dir.path(),
        "bad_module.yaml",
        8087,
        r#"
database:
  url: "sqlite://users.db"

modules:
  users_info:
    secret_key: "typo"
"#,
    );

    let output = run_users_server(&["--config", &config_path, "check"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("users_info"), "{}", stderr);
}

#[test]
fn test_cli_mock_flag_ignores_unsupported_database() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = write_config(
        temp_dir.path(),
        "mock.yaml",
        8087,
        r#"
database:
  url: "postgresql://localhost/nonexistent"
"#,
    );

    let without_mock = run_users_server(&["--config", &config_path, "check"]);
    assert!(!without_mock.status.success());
    let stderr = String::from_utf8_lossy(&without_mock.stderr);
    assert!(stderr.contains("Unsupported database type"), "{}", stderr);

    let with_mock = run_users_server(&["--config", &config_path, "--mock", "check"]);
    assert!(
        with_mock.status.success(),
        "Should succeed with mock database: {}",
        String::from_utf8_lossy(&with_mock.stderr)
    );
}

#[test]
fn test_cli_print_config_applies_port_override() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = write_config(temp_dir.path(), "print.yaml", 8087, "");

    let output = run_users_server(&["--config", &config_path, "--port", "9191", "--print-config"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("port: 9191"), "{}", stdout);
}

#[test]
fn test_cli_subcommand_help() {
    let output = run_users_server(&["run", "--help"]);
    assert!(output.status.success(), "Run subcommand help should succeed");
    assert!(String::from_utf8_lossy(&output.stdout).contains("Start the server"));

    let output = run_users_server(&["check", "--help"]);
    assert!(output.status.success(), "Check subcommand help should succeed");
    assert!(String::from_utf8_lossy(&output.stdout).contains("Check configuration"));
}

#[tokio::test]
async fn test_cli_run_serves_until_killed() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = write_config(
        temp_dir.path(),
        "run.yaml",
        0,
        r#"
database:
  url: "sqlite://database/users.db"

logging:
  default:
    console_level: info
    file: ""
"#,
    );

    let mut cmd = tokio::process::Command::new(env!("CARGO_BIN_EXE_users-server"));
    cmd.args(["--config", &config_path, "run"])
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let result = timeout(Duration::from_secs(5), cmd.output()).await;

    // Still running when the timeout fires means startup succeeded.
    match result {
        Err(_elapsed) => {
            assert!(temp_dir.path().join("home/database/users.db").exists());
        }
        Ok(output) => {
            let output = output.expect("Failed to execute users-server");
            panic!(
                "Server exited early: {}",
                String::from_utf8_lossy(&output.stderr)
            );
        }
    }
}
