//! Settings validation.
//!
//! Checks the merged settings for values that would produce documents the
//! engines cannot load, before any resolution takes place.

use crate::config::schema::{InboundSettings, Settings, SpeedtestSettings, TunSettings};
use crate::error::{Error, Result};

/// Smallest MTU accepted for the TUN interface.
const MIN_TUN_MTU: u16 = 576;

/// TUN stacks understood by sing-box.
const TUN_STACKS: [&str; 3] = ["system", "gvisor", "mixed"];

/// Validates settings.
///
/// # Examples
///
/// ```
/// use rayconf::config::{Settings, SettingsValidator};
///
/// SettingsValidator::validate(&Settings::default()).unwrap();
/// ```
pub struct SettingsValidator;

impl SettingsValidator {
    /// Validate a complete settings value.
    ///
    /// # Errors
    ///
    /// Returns the first validation error found.
    pub fn validate(settings: &Settings) -> Result<()> {
        if let Some(ref inbound) = settings.inbound {
            Self::validate_inbound(inbound)?;
        }

        if let Some(ref tun) = settings.tun {
            Self::validate_tun(tun)?;
        }

        if let Some(ref speedtest) = settings.speedtest {
            Self::validate_speedtest(speedtest)?;
        }

        if let Some(ref servers) = settings.dns_servers {
            if let Some(index) = servers.iter().position(|s| s.trim().is_empty()) {
                return Err(Error::Validation {
                    field: format!("dns_servers[{index}]"),
                    message: "DNS server address cannot be empty".into(),
                });
            }
        }

        Ok(())
    }

    fn validate_inbound(inbound: &InboundSettings) -> Result<()> {
        if inbound.socks_port == Some(0) {
            return Err(Error::Validation {
                field: "inbound.socks_port".into(),
                message: "Port must be between 1 and 65535".into(),
            });
        }
        if inbound.http_port == Some(0) {
            return Err(Error::Validation {
                field: "inbound.http_port".into(),
                message: "Port must be between 1 and 65535".into(),
            });
        }
        if let (Some(socks), Some(http)) = (inbound.socks_port, inbound.http_port) {
            if socks == http {
                return Err(Error::Validation {
                    field: "inbound.http_port".into(),
                    message: format!("HTTP port {http} collides with the SOCKS port"),
                });
            }
        }
        if inbound.socks_port == Some(u16::MAX) && inbound.http_port.is_none() {
            return Err(Error::Validation {
                field: "inbound.http_port".into(),
                message: "SOCKS port 65535 leaves no room for the default HTTP port".into(),
            });
        }
        if let Some(ref listen) = inbound.listen {
            if listen.trim().is_empty() {
                return Err(Error::Validation {
                    field: "inbound.listen".into(),
                    message: "Listen address cannot be empty".into(),
                });
            }
        }
        Ok(())
    }

    fn validate_tun(tun: &TunSettings) -> Result<()> {
        if let Some(mtu) = tun.mtu {
            if mtu < MIN_TUN_MTU {
                return Err(Error::Validation {
                    field: "tun.mtu".into(),
                    message: format!("MTU must be at least {MIN_TUN_MTU}"),
                });
            }
        }
        if let Some(ref stack) = tun.stack {
            if !TUN_STACKS.contains(&stack.as_str()) {
                return Err(Error::Validation {
                    field: "tun.stack".into(),
                    message: format!("Unknown stack '{stack}' (expected system, gvisor or mixed)"),
                });
            }
        }
        Ok(())
    }

    fn validate_speedtest(speedtest: &SpeedtestSettings) -> Result<()> {
        if speedtest.port_min == Some(0) {
            return Err(Error::Validation {
                field: "speedtest.port_min".into(),
                message: "Port must be between 1 and 65535".into(),
            });
        }
        if let (Some(min), Some(max)) = (speedtest.port_min, speedtest.port_max) {
            if max < min {
                return Err(Error::Validation {
                    field: "speedtest.port_max".into(),
                    message: format!("port_max ({max}) must be >= port_min ({min})"),
                });
            }
        }
        Ok(())
    }
}
