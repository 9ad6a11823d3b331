//! V2Ray/Xray document schema.
//!
//! Field names follow the engine's camelCase JSON. Optional blocks are
//! omitted from the output when unset.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Tag of the per-profile upstream outbound.
pub const PROXY_TAG: &str = "proxy";

/// Tag of the freedom outbound.
pub const DIRECT_TAG: &str = "direct";

/// Tag of the blackhole outbound.
pub const BLOCK_TAG: &str = "block";

/// Tag of the local SOCKS inbound.
pub const SOCKS_TAG: &str = "socks";

/// Tag of the local HTTP inbound.
pub const HTTP_TAG: &str = "http";

/// A complete V2Ray/Xray configuration document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct V2rayConfig {
    /// Log settings.
    pub log: V2rayLog,
    /// Inbounds in listener order.
    pub inbounds: Vec<V2rayInbound>,
    /// Outbounds; the first one is the default route.
    pub outbounds: Vec<V2rayOutbound>,
    /// Statistics block.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<Stats>,
    /// API block.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api: Option<Api>,
    /// Policy block.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy: Option<Policy>,
    /// Routing rules.
    pub routing: Routing,
    /// DNS block.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dns: Option<V2rayDns>,
}

/// Log settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct V2rayLog {
    /// Access log path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access: Option<String>,
    /// Error log path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Log level name.
    pub loglevel: String,
}

impl Default for V2rayLog {
    fn default() -> Self {
        Self {
            access: None,
            error: None,
            loglevel: "warning".to_string(),
        }
    }
}

/// A local listener.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct V2rayInbound {
    /// Unique tag.
    pub tag: String,
    /// Listen port.
    pub port: u16,
    /// Listen address.
    pub listen: String,
    /// `socks` or `http`.
    pub protocol: String,
    /// Traffic sniffing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sniffing: Option<Sniffing>,
    /// Protocol settings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<InboundProtocolSettings>,
}

/// Sniffing settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sniffing {
    /// Whether sniffing runs.
    pub enabled: bool,
    /// Protocols whose destination is overridden.
    pub dest_override: Vec<String>,
}

/// Inbound protocol settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundProtocolSettings {
    /// SOCKS authentication (`noauth`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<String>,
    /// UDP relay.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub udp: Option<bool>,
    /// Accept transparent proxy requests (HTTP).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_transparent: Option<bool>,
}

/// An outbound.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct V2rayOutbound {
    /// Tag; `proxy` for the profile's upstream.
    pub tag: String,
    /// Outbound protocol.
    pub protocol: String,
    /// Protocol settings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<OutboundProtocolSettings>,
    /// Transport settings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream_settings: Option<StreamSettings>,
}

impl V2rayOutbound {
    /// An outbound with no settings, such as `freedom`.
    #[must_use]
    pub fn bare(tag: &str, protocol: &str) -> Self {
        Self {
            tag: tag.to_string(),
            protocol: protocol.to_string(),
            settings: None,
            stream_settings: None,
        }
    }
}

/// Outbound protocol settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboundProtocolSettings {
    /// VMess/VLESS servers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vnext: Option<Vec<VnextServer>>,
    /// Shadowsocks/Trojan/SOCKS/HTTP servers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub servers: Option<Vec<Server>>,
    /// Blackhole response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<BlackholeResponse>,
}

/// A VMess/VLESS server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VnextServer {
    /// Host.
    pub address: String,
    /// Port.
    pub port: u16,
    /// Accounts.
    pub users: Vec<VnextUser>,
}

/// A VMess/VLESS account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VnextUser {
    /// UUID.
    pub id: String,
    /// VMess alter id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alter_id: Option<u32>,
    /// VMess cipher.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security: Option<String>,
    /// VLESS encryption.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encryption: Option<String>,
    /// VLESS flow.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow: Option<String>,
}

/// A Shadowsocks/Trojan/SOCKS/HTTP server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Server {
    /// Host.
    pub address: String,
    /// Port.
    pub port: u16,
    /// Shadowsocks cipher.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    /// Shadowsocks/Trojan password.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Trojan flow.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow: Option<String>,
    /// SOCKS/HTTP accounts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub users: Option<Vec<ServerUser>>,
}

/// A SOCKS/HTTP account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerUser {
    /// User name.
    pub user: String,
    /// Password.
    pub pass: String,
}

/// Blackhole response kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlackholeResponse {
    /// `http` or `none`.
    #[serde(rename = "type")]
    pub kind: String,
}

/// Transport settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamSettings {
    /// `tcp`, `ws`, `grpc` or `h2`.
    pub network: String,
    /// `tls` or `reality`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security: Option<String>,
    /// TLS settings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tls_settings: Option<TlsSettings>,
    /// REALITY settings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reality_settings: Option<RealitySettings>,
    /// WebSocket settings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ws_settings: Option<WsSettings>,
    /// gRPC settings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grpc_settings: Option<GrpcSettings>,
    /// HTTP/2 settings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_settings: Option<HttpSettings>,
}

/// TLS settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TlsSettings {
    /// Skip certificate verification.
    pub allow_insecure: bool,
    /// SNI.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_name: Option<String>,
    /// ALPN list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alpn: Option<Vec<String>>,
    /// uTLS fingerprint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
}

/// REALITY settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RealitySettings {
    /// SNI.
    pub server_name: String,
    /// uTLS fingerprint.
    pub fingerprint: String,
    /// Server public key.
    pub public_key: String,
    /// Short id.
    pub short_id: String,
}

/// WebSocket settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WsSettings {
    /// Request path.
    pub path: String,
    /// Extra request headers.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
}

/// gRPC settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrpcSettings {
    /// Service name.
    pub service_name: String,
    /// Multi mode.
    pub multi_mode: bool,
}

/// HTTP/2 settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpSettings {
    /// Host names.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub host: Vec<String>,
    /// Request path.
    pub path: String,
}

/// Statistics block; presence alone enables statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {}

/// API block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Api {
    /// Tag of the API inbound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    /// Enabled services.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub services: Vec<String>,
}

/// Policy block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Policy {
    /// System-wide statistics switches.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<SystemPolicy>,
}

/// System policy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemPolicy {
    /// Count outbound uplink traffic.
    pub stats_outbound_uplink: bool,
    /// Count outbound downlink traffic.
    pub stats_outbound_downlink: bool,
}

/// Routing block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Routing {
    /// `AsIs`, `IPIfNonMatch` or `IPOnDemand`.
    pub domain_strategy: String,
    /// Rules in match order.
    pub rules: Vec<RoutingRule>,
}

impl Default for Routing {
    fn default() -> Self {
        Self {
            domain_strategy: "AsIs".to_string(),
            rules: Vec::new(),
        }
    }
}

/// A field routing rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutingRule {
    /// Always `field`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Matching inbound tags.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inbound_tag: Option<Vec<String>>,
    /// Matching destination IPs or geoip sets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<Vec<String>>,
    /// Matching domains or geosite sets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<Vec<String>>,
    /// Target outbound.
    pub outbound_tag: String,
}

impl RoutingRule {
    /// An empty field rule routed to `outbound_tag`.
    #[must_use]
    pub fn to_outbound(outbound_tag: &str) -> Self {
        Self {
            kind: "field".to_string(),
            inbound_tag: None,
            ip: None,
            domain: None,
            outbound_tag: outbound_tag.to_string(),
        }
    }
}

/// DNS block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct V2rayDns {
    /// Servers in query order.
    pub servers: Vec<DnsServer>,
}

/// A DNS server entry: a bare address or an address bound to domains.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DnsServer {
    /// `"1.1.1.1"`.
    Address(String),
    /// An address used only for the listed domains.
    Detailed {
        /// Server address.
        address: String,
        /// Server port.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        port: Option<u16>,
        /// Domains resolved through this server.
        domains: Vec<String>,
    },
}

impl From<&str> for DnsServer {
    fn from(address: &str) -> Self {
        Self::Address(address.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_optional_blocks_omitted() {
        let value = serde_json::to_value(V2rayConfig::default()).unwrap();
        assert_eq!(
            value,
            json!({
                "log": {"loglevel": "warning"},
                "inbounds": [],
                "outbounds": [],
                "routing": {"domainStrategy": "AsIs", "rules": []}
            })
        );
    }

    #[test]
    fn test_empty_blocks_serialize_as_objects() {
        let config = V2rayConfig {
            stats: Some(Stats::default()),
            api: Some(Api::default()),
            policy: Some(Policy::default()),
            ..Default::default()
        };
        let value = serde_json::to_value(config).unwrap();
        assert_eq!(value["stats"], json!({}));
        assert_eq!(value["api"], json!({}));
        assert_eq!(value["policy"], json!({}));
    }

    #[test]
    fn test_dns_server_shapes() {
        let servers = vec![
            DnsServer::from("1.1.1.1"),
            DnsServer::Detailed {
                address: "223.5.5.5".into(),
                port: None,
                domains: vec!["geosite:cn".into()],
            },
        ];
        let value = serde_json::to_value(V2rayDns { servers }).unwrap();
        assert_eq!(
            value,
            json!({"servers": ["1.1.1.1", {"address": "223.5.5.5", "domains": ["geosite:cn"]}]})
        );

        let parsed: V2rayDns = serde_json::from_value(value).unwrap();
        assert_eq!(parsed.servers[0], DnsServer::from("1.1.1.1"));
    }

    #[test]
    fn test_camel_case_stream_settings() {
        let stream = StreamSettings {
            network: "grpc".into(),
            grpc_settings: Some(GrpcSettings {
                service_name: "tunnel".into(),
                multi_mode: false,
            }),
            ..Default::default()
        };
        let value = serde_json::to_value(stream).unwrap();
        assert_eq!(value["grpcSettings"]["serviceName"], "tunnel");
    }
}
