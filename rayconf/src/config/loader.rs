//! Settings file discovery and loading.
//!
//! This module handles discovering and loading rayconf settings files
//! from various locations with proper precedence.

use crate::config::schema::Settings;
use crate::error::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// File name of the user settings file inside the data directory.
pub const USER_SETTINGS_FILE: &str = "config.yaml";

/// File name of a project settings file.
pub const PROJECT_SETTINGS_FILE: &str = "rayconf.yaml";

/// File name of a private project settings file.
pub const LOCAL_SETTINGS_FILE: &str = "rayconf.local.yaml";

/// Settings source with its precedence level.
///
/// Lower precedence values are overridden by higher ones.
#[derive(Debug, Clone)]
pub struct SettingsSource {
    /// Path to the settings file.
    pub path: PathBuf,
    /// Precedence level (higher values take priority).
    pub precedence: u8,
    /// Parsed settings.
    pub settings: Settings,
}

/// Loads settings from various sources.
pub struct SettingsLoader;

impl SettingsLoader {
    /// Discover and load all settings files.
    ///
    /// Searches for:
    /// 1. User settings at `{data_dir}/config.yaml` (precedence 1)
    /// 2. Project `rayconf.yaml` walking up from `working_dir` (precedence 2)
    /// 3. Project `rayconf.local.yaml` next to it (precedence 3)
    ///
    /// # Errors
    ///
    /// Returns an error if any settings file exists but cannot be read
    /// or parsed.
    pub fn load_all(working_dir: &Path, data_dir: &Path) -> Result<Vec<SettingsSource>> {
        let mut sources = Vec::new();

        let user_path = data_dir.join(USER_SETTINGS_FILE);
        if user_path.exists() {
            let settings = Self::load_file(&user_path)?;
            sources.push(SettingsSource {
                path: user_path,
                precedence: 1,
                settings,
            });
        }

        sources.extend(Self::discover_project_settings(working_dir)?);

        // Higher precedence last for easier processing
        sources.sort_by_key(|s| s.precedence);

        Ok(sources)
    }

    /// Discover project settings by walking up directories.
    ///
    /// Stops at the first directory containing either project file.
    ///
    /// # Errors
    ///
    /// Returns an error if any discovered file cannot be read or parsed.
    pub fn discover_project_settings(start_dir: &Path) -> Result<Vec<SettingsSource>> {
        let mut found = Vec::new();
        let mut current = start_dir.to_path_buf();

        loop {
            for (name, precedence) in [(PROJECT_SETTINGS_FILE, 2), (LOCAL_SETTINGS_FILE, 3)] {
                let candidate = current.join(name);
                if candidate.exists() {
                    let settings = Self::load_file(&candidate)?;
                    found.push(SettingsSource {
                        path: candidate,
                        precedence,
                        settings,
                    });
                }
            }

            if !found.is_empty() || !current.pop() {
                break;
            }
        }

        Ok(found)
    }

    /// Load and parse a YAML settings file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the YAML is invalid.
    pub fn load_file(path: &Path) -> Result<Settings> {
        let contents = fs::read_to_string(path).map_err(|e| Error::Validation {
            field: format!("{}", path.display()),
            message: format!("Failed to read settings file: {e}"),
        })?;

        serde_yaml::from_str(&contents).map_err(|e| Error::Validation {
            field: format!("{}", path.display()),
            message: format!("Invalid YAML: {e}"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_nonexistent_file() {
        let result = SettingsLoader::load_file(Path::new("/nonexistent/path/config.yaml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_invalid_yaml() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bad.yaml");
        fs::write(&path, "inbound: [not, a, map").unwrap();

        let err = SettingsLoader::load_file(&path).unwrap_err();
        assert!(err.to_string().contains("Invalid YAML"));
    }

    #[test]
    fn test_load_all_orders_by_precedence() {
        let data_dir = TempDir::new().unwrap();
        let project = TempDir::new().unwrap();

        fs::write(
            data_dir.path().join(USER_SETTINGS_FILE),
            "log_level: error\n",
        )
        .unwrap();
        fs::write(
            project.path().join(LOCAL_SETTINGS_FILE),
            "log_level: debug\n",
        )
        .unwrap();
        fs::write(
            project.path().join(PROJECT_SETTINGS_FILE),
            "log_level: info\n",
        )
        .unwrap();

        let sources = SettingsLoader::load_all(project.path(), data_dir.path()).unwrap();
        let precedences: Vec<u8> = sources.iter().map(|s| s.precedence).collect();
        assert_eq!(precedences, vec![1, 2, 3]);
    }

    #[test]
    fn test_discover_walks_up_to_nearest_project() {
        let root = TempDir::new().unwrap();
        fs::write(root.path().join(PROJECT_SETTINGS_FILE), "{}\n").unwrap();
        let nested = root.path().join("a").join("b");
        fs::create_dir_all(&nested).unwrap();

        let found = SettingsLoader::discover_project_settings(&nested).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].path, root.path().join(PROJECT_SETTINGS_FILE));
    }

    #[test]
    fn test_missing_user_settings_is_not_an_error() {
        let data_dir = TempDir::new().unwrap();
        let project = TempDir::new().unwrap();
        let sources = SettingsLoader::load_all(project.path(), data_dir.path()).unwrap();
        assert!(sources.iter().all(|s| s.precedence != 1));
    }
}
