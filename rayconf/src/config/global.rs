//! Resolved process-wide settings.
//!
//! [`GlobalSettings`] is what generation reads: every value present, ports
//! validated, defaults filled in.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::config::schema::{DomainStrategy, EngineLogLevel, Settings};
use crate::error::{Error, Result};
use crate::port::{Port, PortRange};
use crate::profile::{ConfigKind, CoreType, ProfileDescriptor};

/// Default local SOCKS listener port.
pub const DEFAULT_SOCKS_PORT: Port = Port::from_const(10808);

/// Default local listen address.
pub const DEFAULT_LISTEN: &str = "127.0.0.1";

/// Default upstream DNS servers.
pub const DEFAULT_DNS_SERVERS: [&str; 2] = ["1.1.1.1", "8.8.8.8"];

/// Default first speed-test listener port.
pub const DEFAULT_SPEEDTEST_PORT_MIN: Port = Port::from_const(10900);

/// Default last speed-test listener port.
pub const DEFAULT_SPEEDTEST_PORT_MAX: Port = Port::from_const(10999);

/// Engine used when neither the profile nor the mapping names one.
pub const DEFAULT_CORE_TYPE: CoreType = CoreType::Xray;

/// Sub-directory of the data directory holding custom sources.
pub const CONFIG_DIR_NAME: &str = "configs";

/// Tunnel mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TunMode {
    /// Force every standard profile onto the sing-box document.
    pub enabled: bool,
    /// TUN network stack.
    pub stack: String,
    /// Interface MTU.
    pub mtu: u16,
    /// Strict routing.
    pub strict_route: bool,
}

impl Default for TunMode {
    fn default() -> Self {
        Self {
            enabled: false,
            stack: "system".to_string(),
            mtu: 9000,
            strict_route: true,
        }
    }
}

/// Local inbound listener defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InboundDefaults {
    /// Listen address.
    pub listen: String,
    /// SOCKS listener port.
    pub socks_port: Port,
    /// HTTP listener port.
    pub http_port: Port,
    /// Traffic sniffing.
    pub sniffing: bool,
    /// UDP on the SOCKS listener.
    pub udp: bool,
}

impl Default for InboundDefaults {
    fn default() -> Self {
        Self {
            listen: DEFAULT_LISTEN.to_string(),
            socks_port: DEFAULT_SOCKS_PORT,
            http_port: Port::from_const(DEFAULT_SOCKS_PORT.value() + 1),
            sniffing: true,
            udp: true,
        }
    }
}

/// Speed-test listener allocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpeedtestDefaults {
    /// First port tried.
    pub port_min: Port,
    /// Last port tried.
    pub port_max: Port,
    /// Skip ports already in use.
    pub check_occupancy: bool,
}

impl SpeedtestDefaults {
    /// The allocation range.
    ///
    /// # Errors
    ///
    /// Returns an error if `port_max` is below `port_min`.
    pub fn range(&self) -> Result<PortRange> {
        PortRange::new(self.port_min, self.port_max)
    }
}

impl Default for SpeedtestDefaults {
    fn default() -> Self {
        Self {
            port_min: DEFAULT_SPEEDTEST_PORT_MIN,
            port_max: DEFAULT_SPEEDTEST_PORT_MAX,
            check_occupancy: true,
        }
    }
}

/// Process-wide settings consulted during generation.
///
/// # Examples
///
/// ```
/// use rayconf::config::GlobalSettings;
/// use rayconf::profile::{CoreType, ProfileDescriptor, Protocol};
///
/// let settings = GlobalSettings::default();
/// assert_eq!(settings.inbound.socks_port.value(), 10808);
/// assert_eq!(settings.inbound.http_port.value(), 10809);
///
/// let profile = ProfileDescriptor::standard(Protocol::Vmess, "example.com", 443);
/// assert_eq!(settings.core_type_for(&profile), CoreType::Xray);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GlobalSettings {
    /// Tunnel mode.
    pub tun: TunMode,
    /// Local listeners.
    pub inbound: InboundDefaults,
    /// Engine log level.
    pub log_level: EngineLogLevel,
    /// Upstream DNS servers.
    pub dns_servers: Vec<String>,
    /// Routing domain strategy.
    pub domain_strategy: DomainStrategy,
    /// Engine per config type.
    pub core_types: BTreeMap<ConfigKind, CoreType>,
    /// Directory custom sources are re-resolved against.
    pub config_dir: PathBuf,
    /// Speed-test allocation.
    pub speedtest: SpeedtestDefaults,
}

impl Default for GlobalSettings {
    fn default() -> Self {
        Self {
            tun: TunMode::default(),
            inbound: InboundDefaults::default(),
            log_level: EngineLogLevel::default(),
            dns_servers: DEFAULT_DNS_SERVERS.iter().map(ToString::to_string).collect(),
            domain_strategy: DomainStrategy::default(),
            core_types: BTreeMap::new(),
            config_dir: PathBuf::from(CONFIG_DIR_NAME),
            speedtest: SpeedtestDefaults::default(),
        }
    }
}

impl GlobalSettings {
    /// Resolve layered settings into concrete values.
    ///
    /// # Errors
    ///
    /// Returns an error if a port is 0, the default HTTP port would overflow,
    /// or the speed-test range is inverted.
    pub fn resolve(settings: &Settings, data_dir: &Path) -> Result<Self> {
        let defaults = Self::default();

        let tun = settings.tun.clone().unwrap_or_default();
        let tun = TunMode {
            enabled: tun.enabled.unwrap_or(defaults.tun.enabled),
            stack: tun.stack.unwrap_or(defaults.tun.stack),
            mtu: tun.mtu.unwrap_or(defaults.tun.mtu),
            strict_route: tun.strict_route.unwrap_or(defaults.tun.strict_route),
        };

        let inbound = settings.inbound.clone().unwrap_or_default();
        let socks_port = match inbound.socks_port {
            Some(port) => Port::try_from(port)?,
            None => defaults.inbound.socks_port,
        };
        let http_port = match inbound.http_port {
            Some(port) => Port::try_from(port)?,
            None => socks_port.offset(1).ok_or_else(|| Error::Validation {
                field: "inbound.http_port".into(),
                message: format!("no default HTTP port above SOCKS port {socks_port}"),
            })?,
        };
        let inbound = InboundDefaults {
            listen: inbound.listen.unwrap_or(defaults.inbound.listen),
            socks_port,
            http_port,
            sniffing: inbound.sniffing.unwrap_or(defaults.inbound.sniffing),
            udp: inbound.udp.unwrap_or(defaults.inbound.udp),
        };

        let speedtest = settings.speedtest.clone().unwrap_or_default();
        let speedtest = SpeedtestDefaults {
            port_min: match speedtest.port_min {
                Some(port) => Port::try_from(port)?,
                None => defaults.speedtest.port_min,
            },
            port_max: match speedtest.port_max {
                Some(port) => Port::try_from(port)?,
                None => defaults.speedtest.port_max,
            },
            check_occupancy: speedtest
                .check_occupancy
                .unwrap_or(defaults.speedtest.check_occupancy),
        };
        speedtest.range()?;

        Ok(Self {
            tun,
            inbound,
            log_level: settings.log_level.unwrap_or(defaults.log_level),
            dns_servers: settings.dns_servers.clone().unwrap_or(defaults.dns_servers),
            domain_strategy: settings.domain_strategy.unwrap_or(defaults.domain_strategy),
            core_types: settings.core_types.clone().unwrap_or_default(),
            config_dir: settings
                .config_dir
                .clone()
                .unwrap_or_else(|| data_dir.join(CONFIG_DIR_NAME)),
            speedtest,
        })
    }

    /// Whether tunnel mode forces the sing-box document.
    #[must_use]
    pub const fn tunnel_enabled(&self) -> bool {
        self.tun.enabled
    }

    /// The engine a profile runs on: the profile's own choice, then the
    /// per-kind mapping, then Xray.
    #[must_use]
    pub fn core_type_for(&self, profile: &ProfileDescriptor) -> CoreType {
        profile
            .core_type
            .or_else(|| self.core_types.get(&profile.kind).copied())
            .unwrap_or(DEFAULT_CORE_TYPE)
    }

    /// The SOCKS port a profile's document listens on.
    #[must_use]
    pub fn socks_port_for(&self, profile: &ProfileDescriptor) -> Port {
        profile
            .socks_port_override()
            .unwrap_or(self.inbound.socks_port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{InboundSettings, SpeedtestSettings, TunSettings};
    use crate::profile::Protocol;

    #[test]
    fn test_resolve_defaults() {
        let resolved = GlobalSettings::resolve(&Settings::default(), Path::new("/data")).unwrap();
        assert_eq!(resolved.inbound.socks_port.value(), 10808);
        assert_eq!(resolved.inbound.http_port.value(), 10809);
        assert_eq!(resolved.dns_servers, vec!["1.1.1.1", "8.8.8.8"]);
        assert_eq!(resolved.config_dir, PathBuf::from("/data/configs"));
        assert!(!resolved.tunnel_enabled());
    }

    #[test]
    fn test_http_port_follows_socks_port() {
        let settings = Settings {
            inbound: Some(InboundSettings {
                socks_port: Some(1080),
                ..Default::default()
            }),
            ..Default::default()
        };
        let resolved = GlobalSettings::resolve(&settings, Path::new("/data")).unwrap();
        assert_eq!(resolved.inbound.http_port.value(), 1081);
    }

    #[test]
    fn test_resolve_rejects_zero_port() {
        let settings = Settings {
            inbound: Some(InboundSettings {
                http_port: Some(0),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert!(GlobalSettings::resolve(&settings, Path::new("/data")).is_err());
    }

    #[test]
    fn test_resolve_rejects_inverted_speedtest_range() {
        let settings = Settings {
            speedtest: Some(SpeedtestSettings {
                port_min: Some(30000),
                port_max: Some(20000),
                ..Default::default()
            }),
            ..Default::default()
        };
        let err = GlobalSettings::resolve(&settings, Path::new("/data")).unwrap_err();
        assert!(err.to_string().contains("invalid port range"));
    }

    #[test]
    fn test_resolve_tun() {
        let settings = Settings {
            tun: Some(TunSettings {
                enabled: Some(true),
                stack: Some("gvisor".into()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let resolved = GlobalSettings::resolve(&settings, Path::new("/data")).unwrap();
        assert!(resolved.tunnel_enabled());
        assert_eq!(resolved.tun.stack, "gvisor");
        assert_eq!(resolved.tun.mtu, 9000);
    }

    #[test]
    fn test_core_type_resolution_order() {
        let mut settings = GlobalSettings::default();
        let vless = ProfileDescriptor::standard(Protocol::Vless, "v.example.com", 443);

        assert_eq!(settings.core_type_for(&vless), CoreType::Xray);

        settings
            .core_types
            .insert(ConfigKind::Standard(Protocol::Vless), CoreType::SingBox);
        assert_eq!(settings.core_type_for(&vless), CoreType::SingBox);

        let pinned = vless.with_core_type(CoreType::V2fly);
        assert_eq!(settings.core_type_for(&pinned), CoreType::V2fly);
    }

    #[test]
    fn test_socks_port_for_override() {
        let settings = GlobalSettings::default();
        let profile = ProfileDescriptor::standard(Protocol::Socks, "s.example.com", 1080);
        assert_eq!(settings.socks_port_for(&profile).value(), 10808);

        let profile = profile.with_pre_socks_port(20808);
        assert_eq!(settings.socks_port_for(&profile).value(), 20808);
    }
}
