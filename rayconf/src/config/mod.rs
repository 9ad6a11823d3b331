//! Settings system for rayconf.
//!
//! This module provides hierarchical settings with support for:
//! - YAML settings files (user settings and project `rayconf.yaml`)
//! - Environment variable overrides
//! - Programmatic settings via the builder
//! - Validation before resolution
//!
//! # Precedence
//!
//! Settings are merged from multiple sources with the following precedence
//! (highest to lowest):
//!
//! 1. Programmatic overrides (via `SettingsBuilder::with_settings`)
//! 2. Environment variables (`RAYCONF_*`)
//! 3. Private project settings (`rayconf.local.yaml`)
//! 4. Project settings (`rayconf.yaml`)
//! 5. User settings (`~/.rayconf/config.yaml`)
//! 6. Built-in defaults
//!
//! # Examples
//!
//! ```
//! use rayconf::config::{Settings, SettingsBuilder, TunSettings};
//!
//! let settings = SettingsBuilder::new()
//!     .skip_files()
//!     .skip_env()
//!     .with_settings(Settings {
//!         tun: Some(TunSettings { enabled: Some(true), ..Default::default() }),
//!         ..Default::default()
//!     })
//!     .build()
//!     .unwrap();
//!
//! assert!(settings.tunnel_enabled());
//! ```

use std::path::PathBuf;

pub mod builder;
pub mod environment;
pub mod global;
pub mod loader;
pub mod merger;
pub mod schema;
pub mod validator;

pub use builder::SettingsBuilder;
pub use environment::EnvironmentSettings;
pub use global::{GlobalSettings, InboundDefaults, SpeedtestDefaults, TunMode};
pub use loader::{SettingsLoader, SettingsSource};
pub use merger::SettingsMerger;
pub use schema::{
    DomainStrategy, EngineLogLevel, InboundSettings, Settings, SpeedtestSettings, TunSettings,
};
pub use validator::SettingsValidator;

/// Name of the data directory under the user's home.
pub const DATA_DIR_NAME: &str = ".rayconf";

/// The default data directory, `~/.rayconf`.
///
/// Falls back to a relative `.rayconf` when no home directory is known.
#[must_use]
pub fn default_data_dir() -> PathBuf {
    home::home_dir().map_or_else(|| PathBuf::from(DATA_DIR_NAME), |home| home.join(DATA_DIR_NAME))
}
