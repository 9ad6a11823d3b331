//! Proxy profile descriptors.
//!
//! A profile describes one proxy endpoint (or, for [`ConfigKind::Custom`],
//! a user-authored engine configuration file). Profiles are immutable input
//! to generation; they normally come from a caller-owned store, and
//! [`ProfileSet`] reads such a store from a YAML file.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Error, Result};
use crate::port::Port;

/// Wire protocol of a standard profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Protocol {
    /// VMess.
    Vmess,
    /// VLESS.
    Vless,
    /// Shadowsocks.
    Shadowsocks,
    /// SOCKS5 upstream.
    Socks,
    /// HTTP CONNECT upstream.
    Http,
    /// Trojan.
    Trojan,
    /// Hysteria 2.
    Hysteria2,
    /// TUIC.
    Tuic,
}

impl Protocol {
    /// All protocols, in declaration order.
    pub const ALL: [Self; 8] = [
        Self::Vmess,
        Self::Vless,
        Self::Shadowsocks,
        Self::Socks,
        Self::Http,
        Self::Trojan,
        Self::Hysteria2,
        Self::Tuic,
    ];

    /// The protocol's canonical lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Vmess => "vmess",
            Self::Vless => "vless",
            Self::Shadowsocks => "shadowsocks",
            Self::Socks => "socks",
            Self::Http => "http",
            Self::Trojan => "trojan",
            Self::Hysteria2 => "hysteria2",
            Self::Tuic => "tuic",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration kind of a profile.
///
/// Serialized as a single string: a protocol name for standard profiles,
/// or `custom`.
///
/// # Examples
///
/// ```
/// use rayconf::profile::{ConfigKind, Protocol};
///
/// assert_eq!("vless".parse::<ConfigKind>().unwrap(), ConfigKind::Standard(Protocol::Vless));
/// assert_eq!("custom".parse::<ConfigKind>().unwrap(), ConfigKind::Custom);
/// assert!("carrier-pigeon".parse::<ConfigKind>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ConfigKind {
    /// Generated from profile fields.
    Standard(Protocol),
    /// Copied from a user-authored file.
    Custom,
}

impl fmt::Display for ConfigKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Standard(protocol) => protocol.fmt(f),
            Self::Custom => f.write_str("custom"),
        }
    }
}

impl FromStr for ConfigKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        if lowered == "custom" {
            return Ok(Self::Custom);
        }
        Protocol::ALL
            .iter()
            .find(|p| p.as_str() == lowered)
            .map(|p| Self::Standard(*p))
            .ok_or_else(|| format!("unknown config type: {s}"))
    }
}

impl Serialize for ConfigKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ConfigKind {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Downstream proxy engine a profile runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoreType {
    /// v2fly v4.
    V2fly,
    /// SagerNet's v2ray fork.
    Sagernet,
    /// Xray.
    Xray,
    /// v2fly v5.
    V2flyV5,
    /// Clash.
    Clash,
    /// Clash.Meta.
    ClashMeta,
    /// mihomo (Clash.Meta successor).
    Mihomo,
    /// Hysteria.
    Hysteria,
    /// NaiveProxy.
    Naiveproxy,
    /// TUIC client.
    Tuic,
    /// sing-box.
    SingBox,
}

impl CoreType {
    /// Engines that consume the V2Ray document shape.
    #[must_use]
    pub const fn is_v2ray_family(self) -> bool {
        matches!(self, Self::V2fly | Self::Sagernet | Self::Xray | Self::V2flyV5)
    }

    /// Engines whose YAML dialect sets local ports with `port:` and
    /// `socks-port:` directives.
    #[must_use]
    pub const fn uses_port_directives(self) -> bool {
        matches!(self, Self::Clash | Self::ClashMeta | Self::Mihomo)
    }

    /// The alternate engine, which consumes the sing-box document shape.
    #[must_use]
    pub const fn is_sing_box(self) -> bool {
        matches!(self, Self::SingBox)
    }
}

impl fmt::Display for CoreType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::V2fly => "v2fly",
            Self::Sagernet => "sagernet",
            Self::Xray => "xray",
            Self::V2flyV5 => "v2fly_v5",
            Self::Clash => "clash",
            Self::ClashMeta => "clash_meta",
            Self::Mihomo => "mihomo",
            Self::Hysteria => "hysteria",
            Self::Naiveproxy => "naiveproxy",
            Self::Tuic => "tuic",
            Self::SingBox => "sing_box",
        };
        f.write_str(name)
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// A user-defined proxy profile.
///
/// For custom profiles `address` holds the source file path and the
/// remaining endpoint fields are ignored.
///
/// # Examples
///
/// ```
/// use rayconf::profile::{ProfileDescriptor, Protocol};
///
/// let profile = ProfileDescriptor::standard(Protocol::Vmess, "example.com", 443)
///     .with_id("b831381d-6324-4d53-ad4f-8cda48b30811");
/// assert!(!profile.is_custom());
///
/// let custom = ProfileDescriptor::custom("clash.yaml");
/// assert!(custom.is_custom());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfileDescriptor {
    /// Stable identifier within the profile store.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub index_id: String,

    /// Display name.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub remarks: String,

    /// Standard protocol or custom passthrough.
    #[serde(rename = "config_type")]
    pub kind: ConfigKind,

    /// Preferred downstream engine; falls back to the settings mapping.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub core_type: Option<CoreType>,

    /// Server host, or the source file path for custom profiles.
    pub address: String,

    /// Server port.
    #[serde(default)]
    pub port: u16,

    /// User id (UUID) or password, depending on protocol.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,

    /// Cipher (shadowsocks, vmess) or encryption (vless).
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub security: String,

    /// VLESS/Trojan flow control.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub flow: String,

    /// Username for socks/http upstreams.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub username: String,

    /// Transport network: `tcp`, `ws`, `grpc` or `h2`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub network: String,

    /// Transport host header.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub host: String,

    /// Transport path (gRPC service name for `grpc`).
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub path: String,

    /// Stream security: empty, `tls` or `reality`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub stream_security: String,

    /// TLS server name.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub sni: String,

    /// TLS ALPN list.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alpn: Vec<String>,

    /// uTLS fingerprint.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub fingerprint: String,

    /// REALITY public key.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub public_key: String,

    /// REALITY short id.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub short_id: String,

    /// Skip TLS certificate verification.
    #[serde(default, skip_serializing_if = "is_false")]
    pub allow_insecure: bool,

    /// Explicit local SOCKS port for this profile.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pre_socks_port: Option<u16>,
}

impl ProfileDescriptor {
    /// A standard profile with every optional field empty.
    #[must_use]
    pub fn standard(protocol: Protocol, address: impl Into<String>, port: u16) -> Self {
        Self::blank(ConfigKind::Standard(protocol), address.into(), port)
    }

    /// A custom profile whose configuration is copied from `source`.
    #[must_use]
    pub fn custom(source: impl Into<String>) -> Self {
        Self::blank(ConfigKind::Custom, source.into(), 0)
    }

    fn blank(kind: ConfigKind, address: String, port: u16) -> Self {
        Self {
            index_id: String::new(),
            remarks: String::new(),
            kind,
            core_type: None,
            address,
            port,
            id: String::new(),
            security: String::new(),
            flow: String::new(),
            username: String::new(),
            network: String::new(),
            host: String::new(),
            path: String::new(),
            stream_security: String::new(),
            sni: String::new(),
            alpn: Vec::new(),
            fingerprint: String::new(),
            public_key: String::new(),
            short_id: String::new(),
            allow_insecure: false,
            pre_socks_port: None,
        }
    }

    /// Set the store identifier.
    #[must_use]
    pub fn with_index_id(mut self, index_id: impl Into<String>) -> Self {
        self.index_id = index_id.into();
        self
    }

    /// Set the user id or password.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Pin the downstream engine.
    #[must_use]
    pub fn with_core_type(mut self, core_type: CoreType) -> Self {
        self.core_type = Some(core_type);
        self
    }

    /// Set the local SOCKS port override.
    #[must_use]
    pub fn with_pre_socks_port(mut self, port: u16) -> Self {
        self.pre_socks_port = Some(port);
        self
    }

    /// Returns `true` for custom passthrough profiles.
    #[must_use]
    pub const fn is_custom(&self) -> bool {
        matches!(self.kind, ConfigKind::Custom)
    }

    /// The protocol of a standard profile.
    #[must_use]
    pub const fn protocol(&self) -> Option<Protocol> {
        match self.kind {
            ConfigKind::Standard(protocol) => Some(protocol),
            ConfigKind::Custom => None,
        }
    }

    /// The local SOCKS port override, if one is set to a usable port.
    #[must_use]
    pub fn socks_port_override(&self) -> Option<Port> {
        self.pre_socks_port.and_then(|p| Port::try_from(p).ok())
    }

    /// A label for log lines: remarks, then index id, then address.
    #[must_use]
    pub fn label(&self) -> &str {
        [&self.remarks, &self.index_id, &self.address]
            .into_iter()
            .find(|s| !s.is_empty())
            .map_or("", String::as_str)
    }
}

/// An ordered list of profiles read from a YAML store file.
///
/// ```yaml
/// profiles:
///   - index_id: hk1
///     config_type: vmess
///     address: hk.example.com
///     port: 443
///     id: b831381d-6324-4d53-ad4f-8cda48b30811
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfileSet {
    /// Profiles in store order.
    #[serde(default)]
    pub profiles: Vec<ProfileDescriptor>,
}

impl ProfileSet {
    /// Load a profile store file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid store.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::Validation {
            field: path.display().to_string(),
            message: format!("Failed to read profile store: {e}"),
        })?;
        Self::parse(&contents)
    }

    /// Parse a profile store from YAML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is invalid.
    pub fn parse(contents: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(contents)?)
    }

    /// Find a profile by index id, then by remarks, then by position.
    #[must_use]
    pub fn find(&self, selector: &str) -> Option<&ProfileDescriptor> {
        self.profiles
            .iter()
            .find(|p| p.index_id == selector)
            .or_else(|| self.profiles.iter().find(|p| p.remarks == selector))
            .or_else(|| {
                selector
                    .parse::<usize>()
                    .ok()
                    .and_then(|i| self.profiles.get(i))
            })
    }

    /// Resolve each selector, keeping unresolved ones as `None`.
    ///
    /// An empty selector list selects every profile in store order.
    #[must_use]
    pub fn select(&self, selectors: &[String]) -> Vec<Option<&ProfileDescriptor>> {
        if selectors.is_empty() {
            return self.profiles.iter().map(Some).collect();
        }
        selectors.iter().map(|s| self.find(s)).collect()
    }
}
