//! sing-box document schema.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A complete sing-box configuration document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SingboxConfig {
    /// Log settings.
    pub log: SingboxLog,
    /// DNS settings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dns: Option<SingboxDns>,
    /// Inbounds.
    pub inbounds: Vec<SingboxInbound>,
    /// Outbounds; the first one is the default route.
    pub outbounds: Vec<SingboxOutbound>,
    /// Routing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route: Option<SingboxRoute>,
}

/// Log settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SingboxLog {
    /// Disable logging altogether.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disabled: Option<bool>,
    /// `debug`, `info`, `warn` or `error`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    /// Prefix lines with timestamps.
    pub timestamp: bool,
}

/// DNS settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SingboxDns {
    /// Servers.
    pub servers: Vec<SingboxDnsServer>,
    /// Rules.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<SingboxDnsRule>,
    /// Server tag used when no rule matches.
    #[serde(default, rename = "final", skip_serializing_if = "Option::is_none")]
    pub final_server: Option<String>,
}

/// A DNS server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SingboxDnsServer {
    /// Unique tag.
    pub tag: String,
    /// Address (`local`, an IP, or a DoH/DoT URL).
    pub address: String,
    /// Outbound queries are sent through.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detour: Option<String>,
}

/// A DNS rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SingboxDnsRule {
    /// Matching outbound tags.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outbound: Option<Vec<String>>,
    /// Server tag to use.
    pub server: String,
}

/// An inbound.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SingboxInbound {
    /// `mixed` or `tun`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Unique tag.
    pub tag: String,
    /// Listen address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listen: Option<String>,
    /// Listen port.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listen_port: Option<u16>,
    /// Traffic sniffing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sniff: Option<bool>,
    /// TUN interface name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interface_name: Option<String>,
    /// TUN IPv4 address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inet4_address: Option<String>,
    /// TUN MTU.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mtu: Option<u16>,
    /// Install default routes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_route: Option<bool>,
    /// Strict routing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strict_route: Option<bool>,
    /// TUN stack.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

impl SingboxInbound {
    /// An inbound with only type and tag set.
    #[must_use]
    pub fn new(kind: &str, tag: &str) -> Self {
        Self {
            kind: kind.to_string(),
            tag: tag.to_string(),
            listen: None,
            listen_port: None,
            sniff: None,
            interface_name: None,
            inet4_address: None,
            mtu: None,
            auto_route: None,
            strict_route: None,
            stack: None,
        }
    }
}

/// An outbound.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SingboxOutbound {
    /// Outbound protocol.
    #[serde(rename = "type")]
    pub kind: String,
    /// Unique tag.
    pub tag: String,
    /// Server host.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server: Option<String>,
    /// Server port.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_port: Option<u16>,
    /// UUID (vmess, vless, tuic).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    /// Password.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Shadowsocks cipher.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    /// SOCKS/HTTP user name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// VMess cipher.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security: Option<String>,
    /// VMess alter id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alter_id: Option<u32>,
    /// VLESS flow.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow: Option<String>,
    /// TUIC congestion control.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub congestion_control: Option<String>,
    /// TLS settings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tls: Option<SingboxTls>,
    /// V2Ray transport.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transport: Option<SingboxTransport>,
}

impl SingboxOutbound {
    /// An outbound with only type and tag set.
    #[must_use]
    pub fn new(kind: &str, tag: &str) -> Self {
        Self {
            kind: kind.to_string(),
            tag: tag.to_string(),
            server: None,
            server_port: None,
            uuid: None,
            password: None,
            method: None,
            username: None,
            security: None,
            alter_id: None,
            flow: None,
            congestion_control: None,
            tls: None,
            transport: None,
        }
    }
}

/// TLS settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SingboxTls {
    /// TLS on.
    pub enabled: bool,
    /// SNI.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_name: Option<String>,
    /// Skip certificate verification.
    pub insecure: bool,
    /// ALPN list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alpn: Option<Vec<String>>,
    /// uTLS client hello.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utls: Option<SingboxUtls>,
    /// REALITY.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reality: Option<SingboxReality>,
}

/// uTLS settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SingboxUtls {
    /// uTLS on.
    pub enabled: bool,
    /// Fingerprint name.
    pub fingerprint: String,
}

/// REALITY settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SingboxReality {
    /// REALITY on.
    pub enabled: bool,
    /// Server public key.
    pub public_key: String,
    /// Short id.
    pub short_id: String,
}

/// V2Ray transport settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SingboxTransport {
    /// `ws`, `grpc` or `http`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Request path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// HTTP host names.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<Vec<String>>,
    /// Extra request headers.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    /// gRPC service name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_name: Option<String>,
}

/// Routing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SingboxRoute {
    /// Rules in match order.
    pub rules: Vec<SingboxRouteRule>,
    /// Bind outbound connections to the default interface.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_detect_interface: Option<bool>,
    /// Outbound used when no rule matches.
    #[serde(default, rename = "final", skip_serializing_if = "Option::is_none")]
    pub final_outbound: Option<String>,
}

/// A route rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SingboxRouteRule {
    /// Matching sniffed protocols.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<Vec<String>>,
    /// Matching inbound tags.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inbound: Option<Vec<String>>,
    /// Match private destination addresses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_is_private: Option<bool>,
    /// Target outbound.
    pub outbound: String,
}

impl SingboxRouteRule {
    /// An empty rule routed to `outbound`.
    #[must_use]
    pub fn to_outbound(outbound: &str) -> Self {
        Self {
            protocol: None,
            inbound: None,
            ip_is_private: None,
            outbound: outbound.to_string(),
        }
    }
}
