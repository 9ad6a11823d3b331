//! Settings builder.
//!
//! [`SettingsBuilder`] layers every settings source in precedence order,
//! validates the merged result, and resolves it into [`GlobalSettings`].

use std::env;
use std::path::{Path, PathBuf};

use crate::config::environment::EnvironmentSettings;
use crate::config::global::GlobalSettings;
use crate::config::loader::SettingsLoader;
use crate::config::merger::SettingsMerger;
use crate::config::schema::Settings;
use crate::config::validator::SettingsValidator;
use crate::config::default_data_dir;
use crate::error::Result;

/// Builder for resolved settings.
///
/// Precedence, highest first: programmatic settings, `RAYCONF_*`
/// environment variables, `rayconf.local.yaml`, `rayconf.yaml`, the user
/// settings file, built-in defaults.
///
/// # Examples
///
/// ```
/// use rayconf::config::{InboundSettings, Settings, SettingsBuilder};
///
/// let settings = SettingsBuilder::new()
///     .skip_files()
///     .skip_env()
///     .with_settings(Settings {
///         inbound: Some(InboundSettings {
///             socks_port: Some(1080),
///             ..Default::default()
///         }),
///         ..Default::default()
///     })
///     .build()
///     .unwrap();
///
/// assert_eq!(settings.inbound.socks_port.value(), 1080);
/// assert_eq!(settings.inbound.http_port.value(), 1081);
/// ```
#[derive(Debug, Default)]
pub struct SettingsBuilder {
    working_dir: Option<PathBuf>,
    data_dir: Option<PathBuf>,
    load_files: bool,
    load_env: bool,
    overrides: Option<Settings>,
}

impl SettingsBuilder {
    /// A builder that reads files and environment variables.
    #[must_use]
    pub fn new() -> Self {
        Self {
            load_files: true,
            load_env: true,
            ..Default::default()
        }
    }

    /// Directory project settings discovery starts from.
    #[must_use]
    pub fn with_working_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.working_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Data directory holding the user settings file.
    #[must_use]
    pub fn with_data_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.data_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Ignore every settings file.
    #[must_use]
    pub const fn skip_files(mut self) -> Self {
        self.load_files = false;
        self
    }

    /// Ignore `RAYCONF_*` environment variables.
    #[must_use]
    pub const fn skip_env(mut self) -> Self {
        self.load_env = false;
        self
    }

    /// Programmatic settings, applied above every other source.
    #[must_use]
    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.overrides = Some(settings);
        self
    }

    /// Merge and validate, without resolving defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if a settings file cannot be read or parsed, an
    /// environment variable is malformed, or validation fails.
    pub fn build_settings(&self) -> Result<Settings> {
        let mut settings = if self.load_files {
            let working_dir = match &self.working_dir {
                Some(dir) => dir.clone(),
                None => env::current_dir()?,
            };
            SettingsMerger::merge(SettingsLoader::load_all(&working_dir, &self.data_dir())?)
        } else {
            Settings::default()
        };

        if self.load_env {
            EnvironmentSettings::apply_overrides(&mut settings)?;
        }

        if let Some(ref overrides) = self.overrides {
            SettingsMerger::merge_into(&mut settings, overrides);
        }

        SettingsValidator::validate(&settings)?;
        log::debug!(target: "settings", "merged settings: {settings:?}");

        Ok(settings)
    }

    /// Build fully resolved settings.
    ///
    /// # Errors
    ///
    /// Returns an error under the same conditions as
    /// [`build_settings`](Self::build_settings), or if resolution fails.
    pub fn build(self) -> Result<GlobalSettings> {
        let settings = self.build_settings()?;
        GlobalSettings::resolve(&settings, &self.data_dir())
    }

    fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(default_data_dir)
    }
}
