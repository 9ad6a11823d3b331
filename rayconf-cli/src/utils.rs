//! Utility functions for CLI operations.
//!
//! This module provides helpers shared across CLI commands: settings
//! resolution, profile store loading and outcome handling.

use crate::error::CliError;
use rayconf::config::{default_data_dir, TunSettings};
use rayconf::{GlobalSettings, Outcome, ProfileDescriptor, ProfileSet, Settings, SettingsBuilder};
use std::path::{Path, PathBuf};

/// Global CLI options shared across all commands.
#[derive(Debug, Clone)]
#[allow(dead_code)] // Fields used via pattern matching in main.rs
pub struct GlobalOptions {
    /// Enable verbose output.
    pub verbose: bool,

    /// Suppress non-essential output.
    pub quiet: bool,

    /// Override the data directory location.
    pub data_dir: Option<PathBuf>,

    /// Force tunnel mode on.
    pub tun: bool,
}

impl GlobalOptions {
    /// The data directory in effect.
    pub fn resolved_data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(default_data_dir)
    }
}

/// Build the settings builder every command starts from.
///
/// Settings are merged from multiple sources with precedence:
/// 1. Global options (highest priority)
/// 2. Environment variables
/// 3. Settings files
/// 4. Built-in defaults (lowest priority)
pub fn settings_builder(global: &GlobalOptions) -> SettingsBuilder {
    let mut builder = SettingsBuilder::new().with_data_dir(global.resolved_data_dir());

    if global.tun {
        builder = builder.with_settings(Settings {
            tun: Some(TunSettings {
                enabled: Some(true),
                ..Default::default()
            }),
            ..Default::default()
        });
    }

    builder
}

/// Load fully resolved settings.
pub fn load_settings(global: &GlobalOptions) -> Result<GlobalSettings, CliError> {
    settings_builder(global)
        .build()
        .map_err(|e| CliError::Config(e.to_string()))
}

/// Load a profile store file.
pub fn load_profiles(path: &Path) -> Result<ProfileSet, CliError> {
    if !path.exists() {
        return Err(CliError::InvalidArguments(format!(
            "Profile store not found: {}",
            path.display()
        )));
    }
    ProfileSet::load(path).map_err(CliError::from)
}

/// Resolve selectors against a store, failing on the first unknown one.
///
/// An empty selector list selects every profile.
pub fn select_profiles<'a>(
    store: &'a ProfileSet,
    selectors: &[String],
) -> Result<Vec<&'a ProfileDescriptor>, CliError> {
    let selected = store.select(selectors);
    if selected.is_empty() {
        return Err(CliError::InvalidArguments(
            "Profile store is empty".to_string(),
        ));
    }

    selected
        .into_iter()
        .enumerate()
        .map(|(i, profile)| {
            profile.ok_or_else(|| {
                CliError::InvalidArguments(format!("Unknown profile: {}", selectors[i]))
            })
        })
        .collect()
}

/// Turn a failed outcome into an exit-code-1 error.
pub fn check_outcome(outcome: Outcome) -> Result<Outcome, CliError> {
    if outcome.is_success() {
        Ok(outcome)
    } else {
        Err(CliError::GenerationFailed(outcome.message))
    }
}
