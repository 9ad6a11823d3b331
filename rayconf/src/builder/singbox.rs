//! sing-box document builder.

use std::collections::BTreeMap;

use crate::builder::{network_of, non_empty, server_name_of, validate_profile, DocumentBuilder};
use crate::config::GlobalSettings;
use crate::error::{Error, Result};
use crate::profile::{ProfileDescriptor, Protocol};
use crate::schema::singbox::{
    SingboxConfig, SingboxDns, SingboxDnsRule, SingboxDnsServer, SingboxInbound, SingboxLog,
    SingboxOutbound, SingboxReality, SingboxRoute, SingboxRouteRule, SingboxTls, SingboxTransport,
    SingboxUtls,
};

const SCHEMA_NAME: &str = "sing-box";

/// Tag of the local mixed (SOCKS + HTTP) inbound.
pub const MIXED_TAG: &str = "mixed-in";

/// Tag of the TUN inbound.
pub const TUN_TAG: &str = "tun-in";

/// Tag of the DNS outbound.
pub const DNS_OUT_TAG: &str = "dns-out";

const TUN_INTERFACE: &str = "rayconf_tun";
const TUN_INET4_ADDRESS: &str = "172.19.0.1/30";

/// Builds sing-box documents.
///
/// With tunnel mode enabled the document also captures system traffic
/// through a TUN inbound.
#[derive(Debug, Clone, Copy)]
pub struct SingboxBuilder<'a> {
    settings: &'a GlobalSettings,
}

impl<'a> SingboxBuilder<'a> {
    /// A builder reading `settings`.
    #[must_use]
    pub const fn new(settings: &'a GlobalSettings) -> Self {
        Self { settings }
    }

    /// sing-box carries every standard protocol.
    #[must_use]
    pub const fn supports(_protocol: Protocol) -> bool {
        true
    }

    fn log(&self) -> SingboxLog {
        match self.settings.log_level.sing_box_level() {
            Some(level) => SingboxLog {
                disabled: None,
                level: Some(level.to_string()),
                timestamp: true,
            },
            None => SingboxLog {
                disabled: Some(true),
                level: None,
                timestamp: true,
            },
        }
    }

    fn inbounds(&self, profile: &ProfileDescriptor) -> Vec<SingboxInbound> {
        let mut mixed = SingboxInbound::new("mixed", MIXED_TAG);
        mixed.listen = Some(self.settings.inbound.listen.clone());
        mixed.listen_port = Some(self.settings.socks_port_for(profile).value());
        mixed.sniff = Some(self.settings.inbound.sniffing);

        let mut inbounds = vec![mixed];

        if self.settings.tunnel_enabled() {
            let tun_mode = &self.settings.tun;
            let mut tun = SingboxInbound::new("tun", TUN_TAG);
            tun.interface_name = Some(TUN_INTERFACE.into());
            tun.inet4_address = Some(TUN_INET4_ADDRESS.into());
            tun.mtu = Some(tun_mode.mtu);
            tun.auto_route = Some(true);
            tun.strict_route = Some(tun_mode.strict_route);
            tun.stack = Some(tun_mode.stack.clone());
            tun.sniff = Some(true);
            inbounds.push(tun);
        }

        inbounds
    }

    fn proxy_outbound(profile: &ProfileDescriptor, protocol: Protocol) -> Result<SingboxOutbound> {
        let mut outbound = SingboxOutbound::new(protocol.as_str(), "proxy");
        outbound.server = Some(profile.address.clone());
        outbound.server_port = Some(profile.port);

        match protocol {
            Protocol::Vmess => {
                outbound.uuid = Some(profile.id.clone());
                outbound.security =
                    Some(non_empty(&profile.security).unwrap_or_else(|| "auto".into()));
                outbound.alter_id = Some(0);
            }
            Protocol::Vless => {
                outbound.uuid = Some(profile.id.clone());
                outbound.flow = non_empty(&profile.flow);
            }
            Protocol::Shadowsocks => {
                outbound.method = non_empty(&profile.security);
                outbound.password = Some(profile.id.clone());
            }
            Protocol::Socks | Protocol::Http => {
                outbound.username = non_empty(&profile.username);
                outbound.password = non_empty(&profile.id);
            }
            Protocol::Trojan | Protocol::Hysteria2 => {
                outbound.password = Some(profile.id.clone());
            }
            Protocol::Tuic => {
                outbound.uuid = Some(profile.id.clone());
                outbound.password = non_empty(&profile.security);
                outbound.congestion_control = Some("bbr".into());
            }
        }

        // QUIC-based protocols are always TLS
        let quic = matches!(protocol, Protocol::Hysteria2 | Protocol::Tuic);
        outbound.tls = Self::tls(profile, quic)?;
        if !quic {
            outbound.transport = Self::transport(profile)?;
        }

        Ok(outbound)
    }

    fn tls(profile: &ProfileDescriptor, force: bool) -> Result<Option<SingboxTls>> {
        let reality = match profile.stream_security.as_str() {
            "" if !force => return Ok(None),
            "" | "tls" => false,
            "reality" => true,
            other => {
                return Err(Error::generation(format!(
                    "{}: unsupported stream security '{other}'",
                    profile.label()
                )));
            }
        };

        let fingerprint = match (non_empty(&profile.fingerprint), reality) {
            (Some(fingerprint), _) => Some(fingerprint),
            (None, true) => Some("chrome".to_string()),
            (None, false) => None,
        };

        Ok(Some(SingboxTls {
            enabled: true,
            server_name: server_name_of(profile),
            insecure: profile.allow_insecure,
            alpn: (!profile.alpn.is_empty()).then(|| profile.alpn.clone()),
            utls: fingerprint.map(|fingerprint| SingboxUtls {
                enabled: true,
                fingerprint,
            }),
            reality: reality.then(|| SingboxReality {
                enabled: true,
                public_key: profile.public_key.clone(),
                short_id: profile.short_id.clone(),
            }),
        }))
    }

    fn transport(profile: &ProfileDescriptor) -> Result<Option<SingboxTransport>> {
        let transport = match network_of(profile) {
            "tcp" => return Ok(None),
            "ws" => {
                let mut headers = BTreeMap::new();
                if !profile.host.is_empty() {
                    headers.insert("Host".to_string(), profile.host.clone());
                }
                SingboxTransport {
                    kind: "ws".into(),
                    path: non_empty(&profile.path),
                    headers,
                    ..Default::default()
                }
            }
            "grpc" => SingboxTransport {
                kind: "grpc".into(),
                service_name: non_empty(&profile.path),
                ..Default::default()
            },
            "h2" => SingboxTransport {
                kind: "http".into(),
                path: non_empty(&profile.path),
                host: non_empty(&profile.host).map(|host| vec![host]),
                ..Default::default()
            },
            other => {
                return Err(Error::generation(format!(
                    "{}: unsupported transport network '{other}'",
                    profile.label()
                )));
            }
        };
        Ok(Some(transport))
    }

    fn dns(&self) -> SingboxDns {
        let mut servers: Vec<SingboxDnsServer> = self
            .settings
            .dns_servers
            .iter()
            .enumerate()
            .map(|(n, address)| SingboxDnsServer {
                tag: format!("remote-{}", n + 1),
                address: address.clone(),
                detour: Some("proxy".into()),
            })
            .collect();
        let final_server = servers.first().map(|s| s.tag.clone());

        servers.push(SingboxDnsServer {
            tag: "local".into(),
            address: "local".into(),
            detour: Some("direct".into()),
        });

        SingboxDns {
            servers,
            rules: vec![SingboxDnsRule {
                outbound: Some(vec!["any".into()]),
                server: "local".into(),
            }],
            final_server,
        }
    }

    fn route(&self) -> SingboxRoute {
        let mut dns = SingboxRouteRule::to_outbound(DNS_OUT_TAG);
        dns.protocol = Some(vec!["dns".into()]);

        let mut private = SingboxRouteRule::to_outbound("direct");
        private.ip_is_private = Some(true);

        SingboxRoute {
            rules: vec![dns, private],
            auto_detect_interface: self.settings.tunnel_enabled().then_some(true),
            final_outbound: Some("proxy".into()),
        }
    }
}

impl DocumentBuilder for SingboxBuilder<'_> {
    type Document = SingboxConfig;

    fn build(&self, profile: &ProfileDescriptor) -> Result<SingboxConfig> {
        let protocol = validate_profile(profile, SCHEMA_NAME, Self::supports)?;

        let outbounds = vec![
            Self::proxy_outbound(profile, protocol)?,
            SingboxOutbound::new("direct", "direct"),
            SingboxOutbound::new("block", "block"),
            SingboxOutbound::new("dns", DNS_OUT_TAG),
        ];

        log::debug!(
            target: "singbox_builder",
            "built document for {} (tun: {})",
            profile.label(),
            self.settings.tunnel_enabled()
        );

        Ok(SingboxConfig {
            log: self.log(),
            dns: Some(self.dns()),
            inbounds: self.inbounds(profile),
            outbounds,
            route: Some(self.route()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineLogLevel;

    fn vless() -> ProfileDescriptor {
        ProfileDescriptor::standard(Protocol::Vless, "v.example.com", 443).with_id("uuid")
    }

    #[test]
    fn test_document_layout() {
        let settings = GlobalSettings::default();
        let config = SingboxBuilder::new(&settings).build(&vless()).unwrap();

        assert_eq!(config.log.level.as_deref(), Some("warn"));
        assert_eq!(config.inbounds.len(), 1);
        assert_eq!(config.inbounds[0].tag, MIXED_TAG);
        assert_eq!(config.inbounds[0].listen_port, Some(10808));

        let tags: Vec<_> = config.outbounds.iter().map(|o| o.tag.as_str()).collect();
        assert_eq!(tags, vec!["proxy", "direct", "block", "dns-out"]);

        let dns = config.dns.unwrap();
        let dns_tags: Vec<_> = dns.servers.iter().map(|s| s.tag.as_str()).collect();
        assert_eq!(dns_tags, vec!["remote-1", "remote-2", "local"]);
        assert_eq!(dns.final_server.as_deref(), Some("remote-1"));

        let route = config.route.unwrap();
        assert_eq!(route.final_outbound.as_deref(), Some("proxy"));
        assert_eq!(route.auto_detect_interface, None);
    }

    #[test]
    fn test_tunnel_mode_adds_tun_inbound() {
        let mut settings = GlobalSettings::default();
        settings.tun.enabled = true;
        settings.tun.stack = "gvisor".into();

        let config = SingboxBuilder::new(&settings).build(&vless()).unwrap();
        let tun = &config.inbounds[1];
        assert_eq!(tun.tag, TUN_TAG);
        assert_eq!(tun.stack.as_deref(), Some("gvisor"));
        assert_eq!(tun.mtu, Some(9000));
        assert_eq!(config.route.unwrap().auto_detect_interface, Some(true));
    }

    #[test]
    fn test_disabled_log_level() {
        let mut settings = GlobalSettings::default();
        settings.log_level = EngineLogLevel::None;
        let config = SingboxBuilder::new(&settings).build(&vless()).unwrap();
        assert_eq!(config.log.disabled, Some(true));
        assert!(config.log.level.is_none());
    }

    #[test]
    fn test_quic_protocols_force_tls() {
        let settings = GlobalSettings::default();
        let mut tuic = ProfileDescriptor::standard(Protocol::Tuic, "t.example.com", 443)
            .with_id("uuid");
        tuic.security = "pw".into();
        tuic.network = "ws".into();

        let config = SingboxBuilder::new(&settings).build(&tuic).unwrap();
        let proxy = &config.outbounds[0];
        assert_eq!(proxy.kind, "tuic");
        assert_eq!(proxy.password.as_deref(), Some("pw"));
        assert!(proxy.tls.as_ref().unwrap().enabled);
        assert!(proxy.transport.is_none());
    }

    #[test]
    fn test_reality_defaults_fingerprint() {
        let mut profile = vless();
        profile.stream_security = "reality".into();
        profile.public_key = "pk".into();

        let settings = GlobalSettings::default();
        let config = SingboxBuilder::new(&settings).build(&profile).unwrap();
        let tls = config.outbounds[0].tls.clone().unwrap();
        assert_eq!(tls.utls.unwrap().fingerprint, "chrome");
        assert_eq!(tls.reality.unwrap().public_key, "pk");
    }

    #[test]
    fn test_grpc_transport_and_socks_override() {
        let mut profile = vless().with_pre_socks_port(30000);
        profile.network = "grpc".into();
        profile.path = "svc".into();

        let settings = GlobalSettings::default();
        let config = SingboxBuilder::new(&settings).build(&profile).unwrap();
        assert_eq!(config.inbounds[0].listen_port, Some(30000));
        let transport = config.outbounds[0].transport.clone().unwrap();
        assert_eq!(transport.kind, "grpc");
        assert_eq!(transport.service_name.as_deref(), Some("svc"));
    }
}
