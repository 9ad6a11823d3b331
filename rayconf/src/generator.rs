//! Single-profile generation.
//!
//! [`ConfigGenerator`] picks a [`GenerationMode`] for a profile, runs the
//! matching builder (or the custom passthrough) and emits the result.

use std::fmt;

use crate::builder::{DocumentBuilder, SingboxBuilder, V2rayBuilder};
use crate::config::GlobalSettings;
use crate::custom::CustomPassthrough;
use crate::error::{Error, Result};
use crate::messages::{CHECK_SERVER_SETTINGS, SUCCESSFUL_CONFIGURATION};
use crate::output::EmissionTarget;
use crate::profile::{ConfigKind, ProfileDescriptor};
use crate::schema::GeneratedDocument;

/// How a profile is turned into configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationMode {
    /// Copy the user's file.
    Custom,
    /// Build a sing-box document.
    Singbox,
    /// Build a V2Ray/Xray document.
    V2ray,
}

impl GenerationMode {
    /// Select the mode for `profile`.
    ///
    /// Custom profiles always pass through. Otherwise tunnel mode, or a
    /// profile that resolves to sing-box, selects the sing-box document;
    /// everything else gets the V2Ray document.
    ///
    /// # Examples
    ///
    /// ```
    /// use rayconf::config::GlobalSettings;
    /// use rayconf::generator::GenerationMode;
    /// use rayconf::profile::{CoreType, ProfileDescriptor, Protocol};
    ///
    /// let mut settings = GlobalSettings::default();
    /// let profile = ProfileDescriptor::standard(Protocol::Vmess, "example.com", 443);
    /// assert_eq!(GenerationMode::select(&profile, &settings), GenerationMode::V2ray);
    ///
    /// let pinned = profile.clone().with_core_type(CoreType::SingBox);
    /// assert_eq!(GenerationMode::select(&pinned, &settings), GenerationMode::Singbox);
    ///
    /// settings.tun.enabled = true;
    /// assert_eq!(GenerationMode::select(&profile, &settings), GenerationMode::Singbox);
    /// ```
    #[must_use]
    pub fn select(profile: &ProfileDescriptor, settings: &GlobalSettings) -> Self {
        match profile.kind {
            ConfigKind::Custom => Self::Custom,
            ConfigKind::Standard(_)
                if settings.tunnel_enabled() || settings.core_type_for(profile).is_sing_box() =>
            {
                Self::Singbox
            }
            ConfigKind::Standard(_) => Self::V2ray,
        }
    }
}

impl fmt::Display for GenerationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Custom => "custom",
            Self::Singbox => "sing-box",
            Self::V2ray => "v2ray",
        };
        f.write_str(name)
    }
}

/// Result of a successful generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generated {
    /// Human-readable status message.
    pub message: String,
    /// Serialized document for text targets; empty for file targets.
    pub content: String,
}

/// Generates configuration for one profile.
#[derive(Debug, Clone, Copy)]
pub struct ConfigGenerator<'a> {
    settings: &'a GlobalSettings,
}

impl<'a> ConfigGenerator<'a> {
    /// A generator reading `settings`.
    #[must_use]
    pub const fn new(settings: &'a GlobalSettings) -> Self {
        Self { settings }
    }

    /// The settings in use.
    #[must_use]
    pub const fn settings(&self) -> &'a GlobalSettings {
        self.settings
    }

    /// Generate configuration for `profile` and emit it to `target`.
    ///
    /// Custom profiles are handed to [`CustomPassthrough`], which needs a
    /// file target.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidInput`] if `profile` is `None`
    /// - [`Error::Generation`] if the builder rejects the profile
    /// - any passthrough or emission error
    pub fn generate(
        &self,
        profile: Option<&ProfileDescriptor>,
        target: &EmissionTarget,
    ) -> Result<Generated> {
        let profile = profile.ok_or_else(|| Error::invalid_input(CHECK_SERVER_SETTINGS))?;

        let mode = GenerationMode::select(profile, self.settings);
        log::debug!(target: "generator", "{}: {mode} mode", profile.label());

        if mode == GenerationMode::Custom {
            let message = CustomPassthrough::new(self.settings).apply(Some(profile), target.path())?;
            return Ok(Generated {
                message,
                content: String::new(),
            });
        }

        let document = self.build_document(profile, mode)?;
        let content = target.emit(&document)?;

        Ok(Generated {
            message: SUCCESSFUL_CONFIGURATION.to_string(),
            content,
        })
    }

    /// Build the document for a standard profile in the given mode.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Generation`] if the builder rejects the profile or
    /// `mode` is [`GenerationMode::Custom`].
    pub fn build_document(
        &self,
        profile: &ProfileDescriptor,
        mode: GenerationMode,
    ) -> Result<GeneratedDocument> {
        match mode {
            GenerationMode::Singbox => Ok(SingboxBuilder::new(self.settings).build(profile)?.into()),
            GenerationMode::V2ray => Ok(V2rayBuilder::new(self.settings).build(profile)?.into()),
            GenerationMode::Custom => Err(Error::generation(format!(
                "{}: custom profiles have no generated document",
                profile.label()
            ))),
        }
    }
}
