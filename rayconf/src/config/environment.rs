//! Environment variable handling for settings overrides.
//!
//! This module provides support for RAYCONF_* environment variables that
//! override settings file values.

use crate::config::schema::{EngineLogLevel, InboundSettings, Settings};
use crate::error::{Error, Result};
use std::env;
use std::path::PathBuf;

/// Handles environment variable overrides for settings.
///
/// # Examples
///
/// ```no_run
/// use rayconf::config::{EnvironmentSettings, Settings};
///
/// let mut settings = Settings::default();
/// EnvironmentSettings::apply_overrides(&mut settings).unwrap();
/// ```
pub struct EnvironmentSettings;

impl EnvironmentSettings {
    /// Apply environment variable overrides to settings.
    ///
    /// # Errors
    ///
    /// Returns an error if any environment variable value is invalid
    /// (e.g., non-numeric port, invalid boolean).
    pub fn apply_overrides(settings: &mut Settings) -> Result<()> {
        // RAYCONF_TUN
        if let Ok(val) = env::var("RAYCONF_TUN") {
            let tun = settings.tun.get_or_insert_with(Default::default);
            tun.enabled = Some(Self::parse_bool("RAYCONF_TUN", &val)?);
        }

        Self::apply_inbound_overrides(settings)?;

        // RAYCONF_LOG_LEVEL
        if let Ok(level) = env::var("RAYCONF_LOG_LEVEL") {
            settings.log_level = Some(Self::parse_log_level(&level)?);
        }

        // RAYCONF_DNS_SERVERS (comma-separated, accumulated)
        if let Ok(servers) = env::var("RAYCONF_DNS_SERVERS") {
            let extra = Self::parse_list(&servers);
            match &mut settings.dns_servers {
                Some(existing) => {
                    for server in extra {
                        if !existing.contains(&server) {
                            existing.push(server);
                        }
                    }
                }
                None => settings.dns_servers = Some(extra),
            }
        }

        // RAYCONF_CONFIG_DIR
        if let Ok(dir) = env::var("RAYCONF_CONFIG_DIR") {
            settings.config_dir = Some(PathBuf::from(dir));
        }

        Ok(())
    }

    /// Apply listener-related environment variable overrides.
    fn apply_inbound_overrides(settings: &mut Settings) -> Result<()> {
        let mut inbound: InboundSettings = settings.inbound.clone().unwrap_or_default();
        let mut modified = false;

        if let Ok(port) = env::var("RAYCONF_SOCKS_PORT") {
            inbound.socks_port = Some(Self::parse_port("RAYCONF_SOCKS_PORT", &port)?);
            modified = true;
        }

        if let Ok(port) = env::var("RAYCONF_HTTP_PORT") {
            inbound.http_port = Some(Self::parse_port("RAYCONF_HTTP_PORT", &port)?);
            modified = true;
        }

        if let Ok(listen) = env::var("RAYCONF_LISTEN") {
            inbound.listen = Some(listen);
            modified = true;
        }

        if modified {
            settings.inbound = Some(inbound);
        }

        Ok(())
    }

    fn parse_port(var: &str, value: &str) -> Result<u16> {
        value.trim().parse().map_err(|_| Error::Validation {
            field: var.into(),
            message: "Invalid port number".into(),
        })
    }

    fn parse_log_level(value: &str) -> Result<EngineLogLevel> {
        serde_yaml::from_str(&value.trim().to_lowercase()).map_err(|_| Error::Validation {
            field: "RAYCONF_LOG_LEVEL".into(),
            message: format!(
                "Unknown log level '{value}' (expected debug, info, warning, error or none)"
            ),
        })
    }

    /// Split a comma-separated list, dropping empty entries.
    fn parse_list(value: &str) -> Vec<String> {
        value
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect()
    }

    /// Parse a boolean environment value.
    ///
    /// Accepts `true/false`, `1/0`, `yes/no`, `on/off` (case-insensitive).
    fn parse_bool(var: &str, value: &str) -> Result<bool> {
        match value.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(true),
            "false" | "0" | "no" | "off" => Ok(false),
            _ => Err(Error::Validation {
                field: var.into(),
                message: format!("Invalid boolean value '{value}'"),
            }),
        }
    }
}
