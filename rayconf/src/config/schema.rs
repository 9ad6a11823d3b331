//! Settings file schema definitions.
//!
//! Every field is optional so that several sources can be layered; the
//! merged result is resolved into [`crate::config::GlobalSettings`].

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::profile::{ConfigKind, CoreType};

/// Complete settings file structure.
///
/// # Examples
///
/// ```
/// use rayconf::config::{InboundSettings, Settings};
///
/// let settings = Settings {
///     inbound: Some(InboundSettings {
///         socks_port: Some(1080),
///         ..Default::default()
///     }),
///     ..Default::default()
/// };
/// assert_eq!(settings.inbound.unwrap().socks_port, Some(1080));
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Tunnel (TUN) mode settings.
    pub tun: Option<TunSettings>,

    /// Local inbound listener settings.
    pub inbound: Option<InboundSettings>,

    /// Engine log level written into generated documents.
    pub log_level: Option<EngineLogLevel>,

    /// Upstream DNS servers.
    pub dns_servers: Option<Vec<String>>,

    /// Routing domain strategy for V2Ray documents.
    pub domain_strategy: Option<DomainStrategy>,

    /// Engine to use per profile config type, when the profile has none.
    pub core_types: Option<BTreeMap<ConfigKind, CoreType>>,

    /// Directory custom profile sources are re-resolved against.
    pub config_dir: Option<PathBuf>,

    /// Speed-test listener allocation.
    pub speedtest: Option<SpeedtestSettings>,
}

/// Tunnel mode settings.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct TunSettings {
    /// Force every profile onto the sing-box document with a TUN inbound.
    pub enabled: Option<bool>,

    /// TUN network stack (`system`, `gvisor`, `mixed`).
    pub stack: Option<String>,

    /// TUN interface MTU.
    pub mtu: Option<u16>,

    /// Enable strict routing.
    pub strict_route: Option<bool>,
}

/// Local inbound listener settings.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct InboundSettings {
    /// Listen address.
    pub listen: Option<String>,

    /// SOCKS listener port.
    pub socks_port: Option<u16>,

    /// HTTP listener port (defaults to the SOCKS port plus one).
    pub http_port: Option<u16>,

    /// Enable traffic sniffing.
    pub sniffing: Option<bool>,

    /// Enable UDP on the SOCKS listener.
    pub udp: Option<bool>,
}

/// Speed-test allocation settings.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct SpeedtestSettings {
    /// First port tried for speed-test listeners.
    pub port_min: Option<u16>,

    /// Last port tried for speed-test listeners.
    pub port_max: Option<u16>,

    /// Skip ports something is already listening on.
    pub check_occupancy: Option<bool>,
}

/// Engine log level, using the V2Ray level names.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum EngineLogLevel {
    /// Debug.
    Debug,
    /// Info.
    Info,
    /// Warning.
    #[default]
    Warning,
    /// Error.
    Error,
    /// Logging disabled.
    None,
}

impl EngineLogLevel {
    /// The V2Ray spelling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::None => "none",
        }
    }

    /// The sing-box spelling; `None` when logging is disabled.
    #[must_use]
    pub const fn sing_box_level(self) -> Option<&'static str> {
        match self {
            Self::Debug => Some("debug"),
            Self::Info => Some("info"),
            Self::Warning => Some("warn"),
            Self::Error => Some("error"),
            Self::None => None,
        }
    }
}

impl fmt::Display for EngineLogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// V2Ray routing domain strategy.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
pub enum DomainStrategy {
    /// Route on domains only.
    #[default]
    AsIs,
    /// Resolve when no domain rule matched.
    IPIfNonMatch,
    /// Resolve as soon as an IP rule is hit.
    IPOnDemand,
}

impl DomainStrategy {
    /// The V2Ray spelling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AsIs => "AsIs",
            Self::IPIfNonMatch => "IPIfNonMatch",
            Self::IPOnDemand => "IPOnDemand",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::Protocol;

    #[test]
    fn test_parse_full_settings() {
        let yaml = r"
tun:
  enabled: true
  stack: gvisor
  mtu: 1500
inbound:
  listen: 0.0.0.0
  socks_port: 1080
  sniffing: false
log_level: debug
dns_servers: [1.1.1.1, 'https://dns.google/dns-query']
domain_strategy: IPIfNonMatch
core_types:
  vless: xray
  custom: clash_meta
config_dir: /etc/rayconf/configs
speedtest:
  port_min: 20000
  port_max: 20100
";
        let settings: Settings = serde_yaml::from_str(yaml).unwrap();
        let tun = settings.tun.unwrap();
        assert_eq!(tun.enabled, Some(true));
        assert_eq!(tun.stack.as_deref(), Some("gvisor"));
        assert_eq!(settings.inbound.unwrap().socks_port, Some(1080));
        assert_eq!(settings.log_level, Some(EngineLogLevel::Debug));
        assert_eq!(settings.dns_servers.unwrap().len(), 2);
        assert_eq!(settings.domain_strategy, Some(DomainStrategy::IPIfNonMatch));

        let core_types = settings.core_types.unwrap();
        assert_eq!(
            core_types.get(&ConfigKind::Standard(Protocol::Vless)),
            Some(&CoreType::Xray)
        );
        assert_eq!(
            core_types.get(&ConfigKind::Custom),
            Some(&CoreType::ClashMeta)
        );
        assert_eq!(settings.speedtest.unwrap().port_max, Some(20100));
    }

    #[test]
    fn test_unknown_fields_rejected() {
        assert!(serde_yaml::from_str::<Settings>("bogus: 1").is_err());
        assert!(serde_yaml::from_str::<Settings>("inbound:\n  bogus: 1").is_err());
    }

    #[test]
    fn test_engine_log_level_spellings() {
        assert_eq!(EngineLogLevel::Warning.as_str(), "warning");
        assert_eq!(EngineLogLevel::Warning.sing_box_level(), Some("warn"));
        assert_eq!(EngineLogLevel::None.sing_box_level(), None);
        assert_eq!(EngineLogLevel::default(), EngineLogLevel::Warning);
    }

    #[test]
    fn test_domain_strategy_default() {
        assert_eq!(DomainStrategy::default().as_str(), "AsIs");
    }
}
