//! Common utilities for integration tests
//!
//! Builds throwaway config directories and commands for the
//! `signage-server` binary with the environment isolated.

use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Get the path to the `signage-server` binary
///
/// Prefers `CARGO_BIN_EXE_signage-server` (set by cargo, including custom
/// target directories in CI) and falls back to `cargo_bin`.
#[allow(deprecated)] // cargo_bin() is deprecated but needed for fallback
pub fn signage_binary() -> PathBuf {
    std::env::var("CARGO_BIN_EXE_signage-server")
        .map(PathBuf::from)
        .unwrap_or_else(|_| assert_cmd::cargo::cargo_bin("signage-server"))
}

/// Command with overrides and home directory isolated
pub fn signage_command() -> Command {
    let mut cmd = Command::new(signage_binary());
    cmd.env("HOME", "/nonexistent")
        .env_remove("SIGNAGE_MQTT_SERVER")
        .env_remove("SIGNAGE_BINDING_IP")
        .env_remove("SIGNAGE_BINDING_PORT")
        .env_remove("SIGNAGE_NAMESPACE")
        .env_remove("SIGNAGE_LOG_FILE")
        .env_remove("RUST_LOG");
    cmd
}

/// Temp directory holding a valid `config.json`
pub fn setup_config_dir() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("config.json"),
        r#"{
  "mqttServer": "mqtt://127.0.0.1:1883",
  "bindingIP": "192.168.0.10",
  "bindingPort": 8080
}"#,
    )
    .unwrap();
    temp_dir
}

#[allow(dead_code)] // Not every test file writes registry files
pub fn write_file(dir: &Path, name: &str, content: &str) {
    fs::write(dir.join(name), content).unwrap();
}
