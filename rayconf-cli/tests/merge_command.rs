//! Integration tests for the `merge` and `speedtest` commands.

mod common;

use common::TestEnv;
use predicates::prelude::*;

#[test]
fn test_merge_every_profile() {
    let env = TestEnv::new();
    let store = env.standard_store();

    env.command()
        .arg("merge")
        .arg("--profiles")
        .arg(&store)
        .arg("--output")
        .arg(env.path().join("merged.json"))
        .assert()
        .success();

    let doc: serde_json::Value = serde_json::from_str(&env.read("merged.json")).unwrap();
    let aggregate = &doc["0"];
    let tags: Vec<_> = aggregate["outbounds"]
        .as_array()
        .unwrap()
        .iter()
        .map(|o| o["tag"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(tags, vec!["proxy-1", "direct", "block", "proxy-2"]);
}

#[test]
fn test_merge_selected_order() {
    let env = TestEnv::new();
    let store = env.standard_store();

    env.command()
        .arg("merge")
        .arg("--profiles")
        .arg(&store)
        .arg("--select")
        .arg("jp1")
        .arg("--select")
        .arg("hk1")
        .arg("--output")
        .arg(env.path().join("merged.json"))
        .assert()
        .success();

    let doc: serde_json::Value = serde_json::from_str(&env.read("merged.json")).unwrap();
    assert_eq!(doc["0"]["outbounds"][0]["protocol"], "trojan");
    assert_eq!(doc["0"]["outbounds"][3]["protocol"], "vmess");
}

#[test]
fn test_merge_requires_output() {
    let env = TestEnv::new();
    let store = env.standard_store();

    env.command()
        .arg("merge")
        .arg("--profiles")
        .arg(&store)
        .assert()
        .failure()
        .stderr(predicate::str::contains("--output"));
}

#[test]
fn test_merge_unknown_profile_writes_nothing() {
    let env = TestEnv::new();
    let store = env.standard_store();
    let output = env.path().join("merged.json");

    env.command()
        .arg("merge")
        .arg("--profiles")
        .arg(&store)
        .arg("--select")
        .arg("hk1")
        .arg("--select")
        .arg("ghost")
        .arg("--output")
        .arg(&output)
        .assert()
        .failure()
        .code(4);

    assert!(!output.exists());
}

#[test]
fn test_speedtest_prints_document() {
    let env = TestEnv::new();
    let store = env.standard_store();
    env.write_user_settings("speedtest:\n  check_occupancy: false\n");

    let output = env
        .command()
        .arg("speedtest")
        .arg("--profiles")
        .arg(&store)
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "speedtest failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let doc: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(doc["inbounds"][0]["tag"], "socks10900");
    assert_eq!(doc["inbounds"][1]["tag"], "socks10901");
    assert_eq!(doc["outbounds"][0]["tag"], "proxy10900");

    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("Hong Kong\t10900"));
}

#[test]
fn test_speedtest_nothing_eligible() {
    let env = TestEnv::new();
    let store = env.write_file(
        "profiles.yaml",
        r"
profiles:
  - index_id: sb
    config_type: tuic
    address: t.example.com
    port: 443
    id: b831381d-6324-4d53-ad4f-8cda48b30811
",
    );

    env.command()
        .arg("speedtest")
        .arg("--profiles")
        .arg(&store)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("no profile can be speed tested"));
}
