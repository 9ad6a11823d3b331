//! Integration tests for settings-related commands and global options.
//!
//! These tests cover `validate`, `show-settings`, `completions`, and the
//! precedence of global flags over environment variables and files.

mod common;

use common::TestEnv;
use predicates::prelude::*;

#[test]
fn test_validate_accepts_valid_file() {
    let env = TestEnv::new();
    let path = env.write_file(
        "rayconf.yaml",
        "inbound:\n  socks_port: 1080\nlog_level: info\n",
    );

    env.command()
        .arg("validate")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Settings are valid"));
}

#[test]
fn test_validate_rejects_unknown_field() {
    let env = TestEnv::new();
    let path = env.write_file("bad.yaml", "unknown_field: 1\n");

    env.command()
        .arg("validate")
        .arg(&path)
        .assert()
        .failure()
        .code(7)
        .stderr(predicate::str::contains("Parse error"));
}

#[test]
fn test_validate_rejects_invalid_values() {
    let env = TestEnv::new();
    let path = env.write_file("bad.yaml", "inbound:\n  socks_port: 0\n");

    env.command()
        .arg("validate")
        .arg(&path)
        .assert()
        .failure()
        .code(7)
        .stderr(predicate::str::contains("Validation error"));
}

#[test]
fn test_validate_missing_file() {
    let env = TestEnv::new();

    env.command()
        .arg("validate")
        .arg(env.path().join("nope.yaml"))
        .assert()
        .failure()
        .code(4);
}

#[test]
fn test_show_settings_defaults() {
    let env = TestEnv::new();

    let output = env.command().arg("show-settings").output().unwrap();
    assert!(output.status.success());

    let yaml: serde_yaml::Value = serde_yaml::from_slice(&output.stdout).unwrap();
    assert_eq!(yaml["inbound"]["socks_port"].as_u64(), Some(10808));
    assert_eq!(yaml["inbound"]["http_port"].as_u64(), Some(10809));
    assert_eq!(yaml["tun"]["enabled"].as_bool(), Some(false));
}

#[test]
fn test_show_settings_precedence() {
    let env = TestEnv::new();
    env.write_user_settings("inbound:\n  socks_port: 2000\n  http_port: 2001\n");
    env.write_file("rayconf.yaml", "inbound:\n  socks_port: 3000\n");

    let output = env
        .command()
        .env("RAYCONF_HTTP_PORT", "4001")
        .arg("show-settings")
        .output()
        .unwrap();
    assert!(output.status.success());

    let yaml: serde_yaml::Value = serde_yaml::from_slice(&output.stdout).unwrap();
    assert_eq!(yaml["inbound"]["socks_port"].as_u64(), Some(3000));
    assert_eq!(yaml["inbound"]["http_port"].as_u64(), Some(4001));
}

#[test]
fn test_tun_flag_and_env() {
    let env = TestEnv::new();

    let flag = env.command().arg("--tun").arg("show-settings").output().unwrap();
    let yaml: serde_yaml::Value = serde_yaml::from_slice(&flag.stdout).unwrap();
    assert_eq!(yaml["tun"]["enabled"].as_bool(), Some(true));

    let from_env = env
        .command()
        .env("RAYCONF_TUN", "true")
        .arg("show-settings")
        .output()
        .unwrap();
    let yaml: serde_yaml::Value = serde_yaml::from_slice(&from_env.stdout).unwrap();
    assert_eq!(yaml["tun"]["enabled"].as_bool(), Some(true));
}

#[test]
fn test_data_dir_from_env() {
    let env = TestEnv::new();
    env.write_user_settings("log_level: debug\n");

    let output = env
        .command_bare()
        .env("RAYCONF_DATA_DIR", &env.data_dir)
        .arg("show-settings")
        .output()
        .unwrap();
    let yaml: serde_yaml::Value = serde_yaml::from_slice(&output.stdout).unwrap();
    assert_eq!(yaml["log_level"].as_str(), Some("debug"));
    assert_eq!(
        yaml["config_dir"].as_str().map(std::path::PathBuf::from),
        Some(env.data_dir.join("configs"))
    );
}

#[test]
fn test_broken_user_settings_is_config_error() {
    let env = TestEnv::new();
    env.write_user_settings("inbound: [not, a, map]\n");

    env.command()
        .arg("show-settings")
        .assert()
        .failure()
        .code(7);
}

#[test]
fn test_completions_bash() {
    let env = TestEnv::new();

    env.command()
        .arg("completions")
        .arg("bash")
        .assert()
        .success()
        .stdout(predicate::str::contains("rayconf"));
}

#[test]
fn test_help_lists_commands() {
    let env = TestEnv::new();

    env.command_bare()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("generate"))
        .stdout(predicate::str::contains("merge"))
        .stdout(predicate::str::contains("show-settings"));
}
