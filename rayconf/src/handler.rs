//! Public status-code entry points.
//!
//! Each function runs one operation to completion and reports an
//! [`Outcome`]: status `0` or `-1`, a human-readable message, and any
//! in-memory content. Errors never cross this boundary; they are logged
//! with the operation name as the log target and mapped to a message.

use std::path::Path;

use crate::config::GlobalSettings;
use crate::custom::CustomPassthrough;
use crate::error::{Error, ErrorKind};
use crate::generator::ConfigGenerator;
use crate::merge::MultiProfileMerger;
use crate::messages::{
    CHECK_SERVER_SETTINGS, FAILED_GEN_DEFAULT_CONFIGURATION, SUCCESSFUL_CONFIGURATION,
};
use crate::output::{self, EmissionTarget};
use crate::port::occupancy::PortOccupancyChecker;
use crate::profile::ProfileDescriptor;
use crate::speedtest::{SpeedtestGenerator, SpeedtestItem};

/// Status of a successful operation.
pub const STATUS_OK: i32 = 0;

/// Status of a failed operation.
pub const STATUS_FAILED: i32 = -1;

/// The result of a boundary call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    /// `0` on success, `-1` on failure.
    pub status: i32,
    /// Human-readable message.
    pub message: String,
    /// Serialized document for in-memory results; otherwise empty.
    pub content: String,
}

impl Outcome {
    /// A successful outcome.
    #[must_use]
    pub fn success(message: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            status: STATUS_OK,
            message: message.into(),
            content: content.into(),
        }
    }

    /// A failed outcome with no content.
    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            status: STATUS_FAILED,
            message: message.into(),
            content: String::new(),
        }
    }

    /// Whether the operation succeeded.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status == STATUS_OK
    }

    /// Log `error` against `operation` and turn it into a failed outcome.
    fn from_error(operation: &str, error: &Error) -> Self {
        log::error!(target: operation, "{error}");
        let message = match error.kind() {
            ErrorKind::InvalidInput => CHECK_SERVER_SETTINGS.to_string(),
            ErrorKind::GenerationFailure => error.to_string(),
            ErrorKind::NotFound | ErrorKind::IoFailure | ErrorKind::Unknown => {
                FAILED_GEN_DEFAULT_CONFIGURATION.to_string()
            }
        };
        Self::failure(message)
    }
}

/// Generate configuration for one profile.
///
/// With no `file_path` the document is returned as `content`; otherwise it
/// is written to the file and `content` is empty. Custom profiles require a
/// file path.
///
/// # Examples
///
/// ```
/// use rayconf::config::GlobalSettings;
/// use rayconf::handler::generate_client_config;
///
/// let outcome = generate_client_config(None, &GlobalSettings::default(), None);
/// assert_eq!(outcome.status, -1);
/// assert_eq!(outcome.message, "check server settings");
/// ```
pub fn generate_client_config(
    profile: Option<&ProfileDescriptor>,
    settings: &GlobalSettings,
    file_path: Option<&Path>,
) -> Outcome {
    let target = file_path.map_or(EmissionTarget::Text, EmissionTarget::file);
    match ConfigGenerator::new(settings).generate(profile, &target) {
        Ok(generated) => Outcome::success(generated.message, generated.content),
        Err(e) => Outcome::from_error("generate_client_config", &e),
    }
}

/// Generate one merged artifact for several profiles and write it to
/// `file_path`.
pub fn generate_client_configs<'p, I>(
    profiles: I,
    settings: &GlobalSettings,
    file_path: &Path,
) -> Outcome
where
    I: IntoIterator<Item = Option<&'p ProfileDescriptor>>,
{
    match MultiProfileMerger::new(settings).generate_many(profiles, file_path) {
        Ok(message) => Outcome::success(message, ""),
        Err(e) => Outcome::from_error("generate_client_configs", &e),
    }
}

/// Copy a custom profile's file to `file_path`, patching port directives.
pub fn generate_client_custom_config(
    profile: Option<&ProfileDescriptor>,
    settings: &GlobalSettings,
    file_path: Option<&Path>,
) -> Outcome {
    match CustomPassthrough::new(settings).apply(profile, file_path) {
        Ok(message) => Outcome::success(message, ""),
        Err(e) => Outcome::from_error("generate_client_custom_config", &e),
    }
}

/// Generate a speed-test document; its text is returned as `content`.
///
/// The assigned listener ports are written back into `items`.
pub fn generate_speedtest_config<C: PortOccupancyChecker + ?Sized>(
    items: &mut Vec<SpeedtestItem>,
    settings: &GlobalSettings,
    checker: &C,
) -> Outcome {
    let result = SpeedtestGenerator::new(settings, checker)
        .generate(items.clone())
        .and_then(|config| {
            let text = output::to_text(&config.document)?;
            *items = config.items;
            Ok(text)
        });
    match result {
        Ok(text) => Outcome::success(SUCCESSFUL_CONFIGURATION, text),
        Err(e) => Outcome::from_error("generate_speedtest_config", &e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::occupancy::MockOccupancyChecker;
    use crate::profile::Protocol;
    use tempfile::TempDir;

    #[test]
    fn test_generation_failure_carries_builder_message() {
        let settings = GlobalSettings::default();
        let profile = ProfileDescriptor::standard(Protocol::Vmess, "example.com", 0).with_id("u");
        let outcome = generate_client_config(Some(&profile), &settings, None);
        assert_eq!(outcome.status, STATUS_FAILED);
        assert!(outcome.message.contains("server port is invalid"));
        assert!(outcome.content.is_empty());
    }

    #[test]
    fn test_missing_custom_source_is_generic_failure() {
        let temp = TempDir::new().unwrap();
        let mut settings = GlobalSettings::default();
        settings.config_dir = temp.path().to_path_buf();

        let outcome = generate_client_custom_config(
            Some(&ProfileDescriptor::custom("missing.yaml")),
            &settings,
            Some(&temp.path().join("out.yaml")),
        );
        assert_eq!(outcome.status, STATUS_FAILED);
        assert_eq!(outcome.message, FAILED_GEN_DEFAULT_CONFIGURATION);
    }

    #[test]
    fn test_custom_without_path_is_invalid_input() {
        let settings = GlobalSettings::default();
        let outcome =
            generate_client_custom_config(Some(&ProfileDescriptor::custom("a.yaml")), &settings, None);
        assert_eq!(outcome.message, CHECK_SERVER_SETTINGS);
    }

    #[test]
    fn test_merge_absent_profile_writes_nothing() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("merged.json");
        let settings = GlobalSettings::default();
        let profile = ProfileDescriptor::standard(Protocol::Vmess, "example.com", 443).with_id("u");

        let outcome = generate_client_configs([Some(&profile), None], &settings, &path);
        assert_eq!(outcome.status, STATUS_FAILED);
        assert_eq!(outcome.message, CHECK_SERVER_SETTINGS);
        assert!(!path.exists());
    }

    #[test]
    fn test_speedtest_writes_back_ports() {
        let settings = GlobalSettings::default();
        let checker = MockOccupancyChecker::empty();
        let profile = ProfileDescriptor::standard(Protocol::Trojan, "example.com", 443).with_id("pw");
        let mut items = vec![SpeedtestItem::new(profile)];

        let outcome = generate_speedtest_config(&mut items, &settings, &checker);
        assert!(outcome.is_success());
        assert_eq!(items[0].port.map(|p| p.value()), Some(10900));
        assert!(outcome.content.contains("socks10900"));
    }

    #[test]
    fn test_speedtest_failure_keeps_items() {
        let settings = GlobalSettings::default();
        let checker = MockOccupancyChecker::empty();
        let mut items = Vec::new();
        let outcome = generate_speedtest_config(&mut items, &settings, &checker);
        assert_eq!(outcome.status, STATUS_FAILED);
        assert_eq!(outcome.message, "no profile can be speed tested");
    }
}
