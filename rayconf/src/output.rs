//! Document emission.
//!
//! Documents are written as pretty-printed JSON. Field order follows
//! struct declaration order and unset optional fields are omitted, so the
//! same document always serializes to the same text.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::Result;

/// Where a generated document goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmissionTarget {
    /// Return the serialized text to the caller.
    Text,
    /// Write to a file, replacing any existing content.
    File(PathBuf),
}

impl EmissionTarget {
    /// A file target.
    #[must_use]
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::File(path.into())
    }

    /// The destination path of a file target.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Text => None,
            Self::File(path) => Some(path),
        }
    }

    /// Emit `value`; returns the text for [`Text`](Self::Text) and an
    /// empty string after writing a file.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn emit<T: Serialize + ?Sized>(&self, value: &T) -> Result<String> {
        match self {
            Self::Text => to_text(value),
            Self::File(path) => {
                to_file(value, path)?;
                Ok(String::new())
            }
        }
    }
}

/// Serialize `value` to pretty-printed JSON.
///
/// # Errors
///
/// Returns an error if serialization fails.
///
/// # Examples
///
/// ```
/// use rayconf::output::to_text;
/// use rayconf::schema::v2ray::V2rayLog;
///
/// let text = to_text(&V2rayLog::default()).unwrap();
/// assert_eq!(text, "{\n  \"loglevel\": \"warning\"\n}");
/// ```
pub fn to_text<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Write `value` to `path` as pretty-printed JSON.
///
/// Missing parent directories are created. An existing file is replaced
/// without a backup.
///
/// # Errors
///
/// Returns an error if serialization, directory creation or the write
/// fails.
pub fn to_file<T: Serialize + ?Sized>(value: &T, path: &Path) -> Result<()> {
    let text = to_text(value)?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, text)?;
    log::debug!(target: "output", "wrote {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::v2ray::V2rayConfig;
    use tempfile::TempDir;

    #[test]
    fn test_text_target_returns_document() {
        let text = EmissionTarget::Text.emit(&V2rayConfig::default()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["routing"]["domainStrategy"], "AsIs");
    }

    #[test]
    fn test_file_target_overwrites_and_creates_parents() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested/dir/config.json");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "stale content that is much longer than the new document").unwrap();

        let target = EmissionTarget::file(&path);
        let returned = target.emit(&V2rayConfig::default()).unwrap();
        assert!(returned.is_empty());

        let written = fs::read_to_string(&path).unwrap();
        assert!(!written.contains("stale"));
        assert_eq!(written, to_text(&V2rayConfig::default()).unwrap());
        assert!(!temp.path().join("nested/dir/config.json.bak").exists());
    }

    #[test]
    fn test_file_target_creates_missing_directories() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("a/b/out.json");
        to_file(&V2rayConfig::default(), &path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_serialization_is_deterministic() {
        let first = to_text(&V2rayConfig::default()).unwrap();
        let second = to_text(&V2rayConfig::default()).unwrap();
        assert_eq!(first, second);
        assert!(first.find("\"log\"").unwrap() < first.find("\"routing\"").unwrap());
    }
}
