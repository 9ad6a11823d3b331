//! Common test utilities for CLI integration tests.
//!
//! This module provides shared helpers for CLI testing, including:
//! - Test environment setup with temporary directories
//! - Command builder helpers for common patterns
//! - Test data fixtures

use assert_cmd::Command;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Environment variables the CLI reads; cleared for every test command.
const RAYCONF_ENV_VARS: &[&str] = &[
    "RAYCONF_DATA_DIR",
    "RAYCONF_TUN",
    "RAYCONF_SOCKS_PORT",
    "RAYCONF_HTTP_PORT",
    "RAYCONF_LISTEN",
    "RAYCONF_LOG_LEVEL",
    "RAYCONF_LOG_MODE",
    "RAYCONF_DNS_SERVERS",
    "RAYCONF_CONFIG_DIR",
];

/// A profile store with two standard profiles.
#[allow(dead_code)]
pub const STANDARD_STORE: &str = r"
profiles:
  - index_id: hk1
    remarks: Hong Kong
    config_type: vmess
    address: hk.example.com
    port: 443
    id: b831381d-6324-4d53-ad4f-8cda48b30811
  - index_id: jp1
    remarks: Tokyo
    config_type: trojan
    address: jp.example.com
    port: 443
    id: secret
    stream_security: tls
";

/// Test environment with isolated data directory.
///
/// This struct provides an isolated test environment with:
/// - A temporary directory used as the working directory
/// - A separate data directory for user settings
/// - Helper methods for common CLI operations
pub struct TestEnv {
    /// Temporary directory (kept alive for the duration of the test)
    #[allow(dead_code)]
    temp_dir: TempDir,
    /// Path to the temporary directory
    pub temp_path: PathBuf,
    /// Path to the rayconf data directory
    pub data_dir: PathBuf,
}

#[allow(dead_code)]
impl TestEnv {
    /// Create a new test environment.
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let temp_path = temp_dir.path().to_path_buf();
        let data_dir = temp_path.join("rayconf-data");
        std::fs::create_dir_all(&data_dir).expect("Failed to create data dir");

        Self {
            temp_dir,
            temp_path,
            data_dir,
        }
    }

    /// Get a bare command builder without pre-configured flags.
    ///
    /// The command runs inside the temporary directory with every
    /// `RAYCONF_*` variable removed.
    pub fn command_bare(&self) -> Command {
        let mut cmd = Command::cargo_bin("rayconf").expect("Failed to find rayconf binary");
        cmd.current_dir(&self.temp_path);
        for var in RAYCONF_ENV_VARS {
            cmd.env_remove(var);
        }
        cmd
    }

    /// Get a command builder with the data directory pre-configured.
    pub fn command(&self) -> Command {
        let mut cmd = self.command_bare();
        cmd.arg("--data-dir").arg(&self.data_dir);
        cmd
    }

    /// Get the temp path.
    pub fn path(&self) -> &Path {
        &self.temp_path
    }

    /// Write a file under the temporary directory and return its path.
    pub fn write_file(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_path.join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent dir");
        }
        std::fs::write(&path, contents).expect("Failed to write test file");
        path
    }

    /// Write the user settings file in the data directory.
    pub fn write_user_settings(&self, contents: &str) -> PathBuf {
        let path = self.data_dir.join("config.yaml");
        std::fs::write(&path, contents).expect("Failed to write settings");
        path
    }

    /// Write the standard two-profile store and return its path.
    pub fn standard_store(&self) -> PathBuf {
        self.write_file("profiles.yaml", STANDARD_STORE)
    }

    /// Read a file under the temporary directory.
    pub fn read(&self, name: &str) -> String {
        std::fs::read_to_string(self.temp_path.join(name)).expect("Failed to read output")
    }

    /// Run `generate` for `selector` and parse stdout as JSON.
    pub fn generate_json(&self, store: &Path, selector: &str) -> serde_json::Value {
        let output = self
            .command()
            .arg("generate")
            .arg("--profiles")
            .arg(store)
            .arg("--select")
            .arg(selector)
            .output()
            .expect("Failed to run generate command");

        assert!(
            output.status.success(),
            "Generate failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );

        serde_json::from_slice(&output.stdout).expect("Output is not valid JSON")
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}
