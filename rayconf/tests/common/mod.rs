//! Shared fixtures for rayconf integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use rayconf::{CoreType, GlobalSettings, ProfileDescriptor, Protocol};

/// A VMess profile over TLS.
pub fn vmess(index_id: &str) -> ProfileDescriptor {
    let mut profile =
        ProfileDescriptor::standard(Protocol::Vmess, format!("{index_id}.example.com"), 443)
            .with_id("b831381d-6324-4d53-ad4f-8cda48b30811")
            .with_index_id(index_id);
    profile.stream_security = "tls".into();
    profile
}

/// A VLESS REALITY profile.
pub fn vless_reality(index_id: &str) -> ProfileDescriptor {
    let mut profile =
        ProfileDescriptor::standard(Protocol::Vless, format!("{index_id}.example.com"), 443)
            .with_id("b831381d-6324-4d53-ad4f-8cda48b30811")
            .with_index_id(index_id);
    profile.stream_security = "reality".into();
    profile.public_key = "pbk".into();
    profile.short_id = "6ba85179e30d4fc2".into();
    profile.sni = "www.microsoft.com".into();
    profile
}

/// A profile pinned to sing-box.
pub fn sing_box(index_id: &str) -> ProfileDescriptor {
    vmess(index_id).with_core_type(CoreType::SingBox)
}

/// Settings whose custom configuration directory is `dir`.
pub fn settings_in(dir: &Path) -> GlobalSettings {
    let mut settings = GlobalSettings::default();
    settings.config_dir = dir.join("configs");
    settings
}

/// Write `contents` to `dir/name`, creating parent directories.
pub fn write(dir: &Path, name: &str, contents: &[u8]) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, contents).unwrap();
    path
}

/// Parse a JSON file.
pub fn read_json(path: &Path) -> serde_json::Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

/// Tags of a JSON array of objects.
pub fn tags(value: &serde_json::Value) -> Vec<String> {
    value
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["tag"].as_str().unwrap().to_string())
        .collect()
}
