//! V2Ray/Xray document builder.

use std::collections::BTreeMap;

use crate::builder::{network_of, non_empty, server_name_of, validate_profile, DocumentBuilder};
use crate::config::GlobalSettings;
use crate::error::{Error, Result};
use crate::port::Port;
use crate::profile::{ProfileDescriptor, Protocol};
use crate::schema::v2ray::{
    Api, BlackholeResponse, DnsServer, GrpcSettings, HttpSettings, InboundProtocolSettings,
    OutboundProtocolSettings, Policy, RealitySettings, Routing, RoutingRule, Server, ServerUser,
    Sniffing, Stats, StreamSettings, SystemPolicy, TlsSettings, V2rayConfig, V2rayDns,
    V2rayInbound, V2rayLog, V2rayOutbound, VnextServer, VnextUser, WsSettings, BLOCK_TAG, DIRECT_TAG,
    HTTP_TAG, PROXY_TAG, SOCKS_TAG,
};

/// Name used in builder failure messages.
const SCHEMA_NAME: &str = "V2Ray";

/// Builds V2Ray/Xray documents.
#[derive(Debug, Clone, Copy)]
pub struct V2rayBuilder<'a> {
    settings: &'a GlobalSettings,
}

impl<'a> V2rayBuilder<'a> {
    /// A builder reading `settings`.
    #[must_use]
    pub const fn new(settings: &'a GlobalSettings) -> Self {
        Self { settings }
    }

    /// Whether the V2Ray document can carry `protocol`.
    #[must_use]
    pub const fn supports(protocol: Protocol) -> bool {
        !matches!(protocol, Protocol::Hysteria2 | Protocol::Tuic)
    }

    /// The upstream outbound for `profile`, tagged `tag`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Generation`] if the profile is not a valid standard
    /// profile for this document shape.
    pub fn proxy_outbound(&self, profile: &ProfileDescriptor, tag: &str) -> Result<V2rayOutbound> {
        let protocol = validate_profile(profile, SCHEMA_NAME, Self::supports)?;

        let settings = match protocol {
            Protocol::Vmess => OutboundProtocolSettings {
                vnext: Some(vec![VnextServer {
                    address: profile.address.clone(),
                    port: profile.port,
                    users: vec![VnextUser {
                        id: profile.id.clone(),
                        alter_id: Some(0),
                        security: Some(non_empty(&profile.security).unwrap_or_else(|| "auto".into())),
                        encryption: None,
                        flow: None,
                    }],
                }]),
                ..Default::default()
            },
            Protocol::Vless => OutboundProtocolSettings {
                vnext: Some(vec![VnextServer {
                    address: profile.address.clone(),
                    port: profile.port,
                    users: vec![VnextUser {
                        id: profile.id.clone(),
                        alter_id: None,
                        security: None,
                        encryption: Some(non_empty(&profile.security).unwrap_or_else(|| "none".into())),
                        flow: non_empty(&profile.flow),
                    }],
                }]),
                ..Default::default()
            },
            Protocol::Shadowsocks | Protocol::Trojan | Protocol::Socks | Protocol::Http => {
                OutboundProtocolSettings {
                    servers: Some(vec![Self::server(protocol, profile)]),
                    ..Default::default()
                }
            }
            Protocol::Hysteria2 | Protocol::Tuic => {
                return Err(Error::generation(format!(
                    "{}: {protocol} is not supported by {SCHEMA_NAME}",
                    profile.label()
                )));
            }
        };

        Ok(V2rayOutbound {
            tag: tag.to_string(),
            protocol: protocol.as_str().to_string(),
            settings: Some(settings),
            stream_settings: Some(Self::stream_settings(profile)?),
        })
    }

    fn server(protocol: Protocol, profile: &ProfileDescriptor) -> Server {
        let mut server = Server {
            address: profile.address.clone(),
            port: profile.port,
            method: None,
            password: None,
            flow: None,
            users: None,
        };
        match protocol {
            Protocol::Shadowsocks => {
                server.method = non_empty(&profile.security);
                server.password = Some(profile.id.clone());
            }
            Protocol::Trojan => {
                server.password = Some(profile.id.clone());
                server.flow = non_empty(&profile.flow);
            }
            _ => {
                if !profile.username.is_empty() {
                    server.users = Some(vec![ServerUser {
                        user: profile.username.clone(),
                        pass: profile.id.clone(),
                    }]);
                }
            }
        }
        server
    }

    fn stream_settings(profile: &ProfileDescriptor) -> Result<StreamSettings> {
        let network = network_of(profile);
        let mut stream = StreamSettings {
            network: network.to_string(),
            ..Default::default()
        };

        match network {
            "tcp" => {}
            "ws" => {
                let mut headers = BTreeMap::new();
                if !profile.host.is_empty() {
                    headers.insert("Host".to_string(), profile.host.clone());
                }
                stream.ws_settings = Some(WsSettings {
                    path: profile.path.clone(),
                    headers,
                });
            }
            "grpc" => {
                stream.grpc_settings = Some(GrpcSettings {
                    service_name: profile.path.clone(),
                    multi_mode: false,
                });
            }
            "h2" => {
                stream.http_settings = Some(HttpSettings {
                    host: non_empty(&profile.host).into_iter().collect(),
                    path: profile.path.clone(),
                });
            }
            other => {
                return Err(Error::generation(format!(
                    "{}: unsupported transport network '{other}'",
                    profile.label()
                )));
            }
        }

        match profile.stream_security.as_str() {
            "" => {}
            "tls" => {
                stream.security = Some("tls".into());
                stream.tls_settings = Some(TlsSettings {
                    allow_insecure: profile.allow_insecure,
                    server_name: server_name_of(profile),
                    alpn: (!profile.alpn.is_empty()).then(|| profile.alpn.clone()),
                    fingerprint: non_empty(&profile.fingerprint),
                });
            }
            "reality" => {
                stream.security = Some("reality".into());
                stream.reality_settings = Some(RealitySettings {
                    server_name: server_name_of(profile).unwrap_or_default(),
                    fingerprint: non_empty(&profile.fingerprint).unwrap_or_else(|| "chrome".into()),
                    public_key: profile.public_key.clone(),
                    short_id: profile.short_id.clone(),
                });
            }
            other => {
                return Err(Error::generation(format!(
                    "{}: unsupported stream security '{other}'",
                    profile.label()
                )));
            }
        }

        Ok(stream)
    }

    fn inbounds(&self, socks_port: Port, http_port: Option<Port>) -> Vec<V2rayInbound> {
        let inbound = &self.settings.inbound;
        let sniffing = inbound.sniffing.then(|| Sniffing {
            enabled: true,
            dest_override: vec!["http".into(), "tls".into()],
        });

        let mut inbounds = vec![V2rayInbound {
            tag: SOCKS_TAG.to_string(),
            port: socks_port.value(),
            listen: inbound.listen.clone(),
            protocol: "socks".to_string(),
            sniffing: sniffing.clone(),
            settings: Some(InboundProtocolSettings {
                auth: Some("noauth".into()),
                udp: Some(inbound.udp),
                allow_transparent: None,
            }),
        }];

        if let Some(http_port) = http_port {
            inbounds.push(V2rayInbound {
                tag: HTTP_TAG.to_string(),
                port: http_port.value(),
                listen: inbound.listen.clone(),
                protocol: "http".to_string(),
                sniffing,
                settings: Some(InboundProtocolSettings {
                    allow_transparent: Some(false),
                    ..Default::default()
                }),
            });
        }

        inbounds
    }

    /// The freedom and blackhole outbounds every document ends with.
    #[must_use]
    pub fn fallback_outbounds() -> [V2rayOutbound; 2] {
        let mut block = V2rayOutbound::bare(BLOCK_TAG, "blackhole");
        block.settings = Some(OutboundProtocolSettings {
            response: Some(BlackholeResponse {
                kind: "http".into(),
            }),
            ..Default::default()
        });
        [V2rayOutbound::bare(DIRECT_TAG, "freedom"), block]
    }

    /// The routing block with the default direct and block rules.
    #[must_use]
    pub fn routing(&self) -> Routing {
        let mut private = RoutingRule::to_outbound(DIRECT_TAG);
        private.ip = Some(vec!["geoip:private".into()]);

        let mut ads = RoutingRule::to_outbound(BLOCK_TAG);
        ads.domain = Some(vec!["geosite:category-ads-all".into()]);

        Routing {
            domain_strategy: self.settings.domain_strategy.as_str().to_string(),
            rules: vec![private, ads],
        }
    }

    /// Log settings from the configured level.
    #[must_use]
    pub fn log(&self) -> V2rayLog {
        V2rayLog {
            loglevel: self.settings.log_level.as_str().to_string(),
            ..Default::default()
        }
    }

    /// DNS block from the configured servers.
    #[must_use]
    pub fn dns(&self) -> V2rayDns {
        V2rayDns {
            servers: self
                .settings
                .dns_servers
                .iter()
                .map(|s| DnsServer::from(s.as_str()))
                .collect(),
        }
    }
}

impl DocumentBuilder for V2rayBuilder<'_> {
    type Document = V2rayConfig;

    fn build(&self, profile: &ProfileDescriptor) -> Result<V2rayConfig> {
        let proxy = self.proxy_outbound(profile, PROXY_TAG)?;

        // An overridden SOCKS port carries its HTTP listener one above it
        let (socks_port, http_port) = match profile.socks_port_override() {
            Some(port) => (port, port.offset(1)),
            None => (
                self.settings.inbound.socks_port,
                Some(self.settings.inbound.http_port),
            ),
        };

        let mut outbounds = vec![proxy];
        outbounds.extend(Self::fallback_outbounds());

        log::debug!(
            target: "v2ray_builder",
            "built document for {} on socks port {socks_port}",
            profile.label()
        );

        Ok(V2rayConfig {
            log: self.log(),
            inbounds: self.inbounds(socks_port, http_port),
            outbounds,
            stats: Some(Stats::default()),
            api: Some(Api {
                tag: Some("api".into()),
                services: vec!["StatsService".into()],
            }),
            policy: Some(Policy {
                system: Some(SystemPolicy {
                    stats_outbound_uplink: true,
                    stats_outbound_downlink: true,
                }),
            }),
            routing: self.routing(),
            dns: Some(self.dns()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineLogLevel;

    fn vmess() -> ProfileDescriptor {
        ProfileDescriptor::standard(Protocol::Vmess, "hk.example.com", 443)
            .with_id("b831381d-6324-4d53-ad4f-8cda48b30811")
    }

    #[test]
    fn test_document_layout() {
        let settings = GlobalSettings::default();
        let config = V2rayBuilder::new(&settings).build(&vmess()).unwrap();

        let inbound_tags: Vec<_> = config.inbounds.iter().map(|i| i.tag.as_str()).collect();
        assert_eq!(inbound_tags, vec!["socks", "http"]);
        assert_eq!(config.inbounds[0].port, 10808);
        assert_eq!(config.inbounds[1].port, 10809);

        let outbound_tags: Vec<_> = config.outbounds.iter().map(|o| o.tag.as_str()).collect();
        assert_eq!(outbound_tags, vec!["proxy", "direct", "block"]);

        assert_eq!(config.log.loglevel, "warning");
        assert_eq!(config.routing.domain_strategy, "AsIs");
        assert_eq!(config.routing.rules.len(), 2);
        assert_eq!(
            config.dns.unwrap().servers,
            vec![DnsServer::from("1.1.1.1"), DnsServer::from("8.8.8.8")]
        );
    }

    #[test]
    fn test_settings_flow_into_document() {
        let mut settings = GlobalSettings::default();
        settings.log_level = EngineLogLevel::Debug;
        settings.inbound.sniffing = false;
        settings.inbound.listen = "0.0.0.0".into();

        let config = V2rayBuilder::new(&settings).build(&vmess()).unwrap();
        assert_eq!(config.log.loglevel, "debug");
        assert!(config.inbounds[0].sniffing.is_none());
        assert_eq!(config.inbounds[0].listen, "0.0.0.0");
    }

    #[test]
    fn test_socks_port_override() {
        let settings = GlobalSettings::default();
        let config = V2rayBuilder::new(&settings)
            .build(&vmess().with_pre_socks_port(20000))
            .unwrap();
        assert_eq!(config.inbounds[0].port, 20000);
        assert_eq!(config.inbounds[1].port, 20001);

        let config = V2rayBuilder::new(&settings)
            .build(&vmess().with_pre_socks_port(65535))
            .unwrap();
        assert_eq!(config.inbounds.len(), 1);
    }

    #[test]
    fn test_vless_reality_outbound() {
        let mut profile = ProfileDescriptor::standard(Protocol::Vless, "v.example.com", 443)
            .with_id("uuid");
        profile.flow = "xtls-rprx-vision".into();
        profile.stream_security = "reality".into();
        profile.sni = "www.example.com".into();
        profile.public_key = "pk".into();
        profile.short_id = "ab".into();

        let settings = GlobalSettings::default();
        let outbound = V2rayBuilder::new(&settings)
            .proxy_outbound(&profile, "proxy")
            .unwrap();

        let value = serde_json::to_value(&outbound).unwrap();
        assert_eq!(value["settings"]["vnext"][0]["users"][0]["encryption"], "none");
        assert_eq!(value["settings"]["vnext"][0]["users"][0]["flow"], "xtls-rprx-vision");
        assert_eq!(value["streamSettings"]["security"], "reality");
        assert_eq!(value["streamSettings"]["realitySettings"]["fingerprint"], "chrome");
        assert_eq!(value["streamSettings"]["realitySettings"]["serverName"], "www.example.com");
    }

    #[test]
    fn test_shadowsocks_and_socks_servers() {
        let settings = GlobalSettings::default();
        let builder = V2rayBuilder::new(&settings);

        let mut ss = ProfileDescriptor::standard(Protocol::Shadowsocks, "ss.example.com", 8388)
            .with_id("secret");
        ss.security = "aes-256-gcm".into();
        let outbound = builder.proxy_outbound(&ss, "proxy").unwrap();
        let server = &outbound.settings.unwrap().servers.unwrap()[0];
        assert_eq!(server.method.as_deref(), Some("aes-256-gcm"));
        assert_eq!(server.password.as_deref(), Some("secret"));

        let mut socks = ProfileDescriptor::standard(Protocol::Socks, "s.example.com", 1080);
        socks.username = "alice".into();
        socks.id = "pw".into();
        let outbound = builder.proxy_outbound(&socks, "proxy").unwrap();
        let server = &outbound.settings.unwrap().servers.unwrap()[0];
        assert_eq!(server.users.as_ref().unwrap()[0].user, "alice");
    }

    #[test]
    fn test_ws_transport() {
        let mut profile = vmess();
        profile.network = "ws".into();
        profile.host = "cdn.example.com".into();
        profile.path = "/ray".into();
        profile.stream_security = "tls".into();

        let settings = GlobalSettings::default();
        let outbound = V2rayBuilder::new(&settings)
            .proxy_outbound(&profile, "proxy")
            .unwrap();
        let stream = outbound.stream_settings.unwrap();
        let ws = stream.ws_settings.unwrap();
        assert_eq!(ws.path, "/ray");
        assert_eq!(ws.headers["Host"], "cdn.example.com");
        assert_eq!(
            stream.tls_settings.unwrap().server_name.as_deref(),
            Some("cdn.example.com")
        );
    }

    #[test]
    fn test_rejections() {
        let settings = GlobalSettings::default();
        let builder = V2rayBuilder::new(&settings);

        let hy2 = ProfileDescriptor::standard(Protocol::Hysteria2, "h.example.com", 443)
            .with_id("pw");
        assert!(builder.build(&hy2).is_err());

        let mut bad_network = vmess();
        bad_network.network = "kcp".into();
        let err = builder.build(&bad_network).unwrap_err();
        assert!(err.to_string().contains("kcp"));

        assert!(builder.build(&ProfileDescriptor::custom("c.json")).is_err());
    }
}
