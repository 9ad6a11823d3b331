//! Speed-test document generation.
//!
//! A speed test runs one engine with a local SOCKS listener per profile,
//! each routed to that profile's outbound. Listener ports come from the
//! configured speed-test range, skipping ports that are already in use.

use std::collections::HashSet;

use crate::builder::V2rayBuilder;
use crate::config::GlobalSettings;
use crate::error::{Error, Result};
use crate::port::occupancy::PortOccupancyChecker;
use crate::port::Port;
use crate::profile::ProfileDescriptor;
use crate::schema::v2ray::{
    InboundProtocolSettings, Routing, RoutingRule, V2rayConfig, V2rayInbound, PROXY_TAG,
};

/// Listen address of speed-test listeners.
pub const SPEEDTEST_LISTEN: &str = "127.0.0.1";

/// A profile selected for a speed test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeedtestItem {
    /// The profile under test.
    pub profile: ProfileDescriptor,
    /// Whether the profile takes part.
    pub allow_test: bool,
    /// Local listener port, once assigned.
    pub port: Option<Port>,
}

impl SpeedtestItem {
    /// An item that takes part in the test.
    #[must_use]
    pub const fn new(profile: ProfileDescriptor) -> Self {
        Self {
            profile,
            allow_test: true,
            port: None,
        }
    }
}

/// A generated speed-test document and the ports it assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeedtestConfig {
    /// The document.
    pub document: V2rayConfig,
    /// The input items, with `port` set on every item in the document.
    pub items: Vec<SpeedtestItem>,
}

impl SpeedtestConfig {
    /// Items that received a listener.
    pub fn assigned(&self) -> impl Iterator<Item = (&ProfileDescriptor, Port)> {
        self.items
            .iter()
            .filter_map(|item| item.port.map(|port| (&item.profile, port)))
    }
}

/// Builds speed-test documents.
pub struct SpeedtestGenerator<'a, C: PortOccupancyChecker + ?Sized> {
    settings: &'a GlobalSettings,
    checker: &'a C,
}

impl<'a, C: PortOccupancyChecker + ?Sized> SpeedtestGenerator<'a, C> {
    /// A generator reading `settings` and probing ports with `checker`.
    #[must_use]
    pub const fn new(settings: &'a GlobalSettings, checker: &'a C) -> Self {
        Self { settings, checker }
    }

    /// Build the speed-test document.
    ///
    /// Custom profiles, profiles whose engine is not in the V2Ray family,
    /// and items with `allow_test == false` are skipped. Profiles the V2Ray
    /// builder rejects are skipped with a warning.
    ///
    /// # Errors
    ///
    /// - [`Error::PortExhausted`] if the range runs out of free ports
    /// - [`Error::Generation`] if no item can be tested
    /// - any occupancy check failure
    pub fn generate(&self, items: Vec<SpeedtestItem>) -> Result<SpeedtestConfig> {
        let range = self.settings.speedtest.range()?;
        let builder = V2rayBuilder::new(self.settings);

        let mut candidates = range.iter();
        let mut assigned: HashSet<Port> = HashSet::new();
        let mut items = items;

        let mut inbounds = Vec::new();
        let mut outbounds = Vec::new();
        let mut rules = Vec::new();

        for item in &mut items {
            item.port = None;
            if !self.is_eligible(item) {
                continue;
            }

            let mut outbound = match builder.proxy_outbound(&item.profile, PROXY_TAG) {
                Ok(outbound) => outbound,
                Err(e) => {
                    log::warn!(target: "speedtest", "skipping {}: {e}", item.profile.label());
                    continue;
                }
            };

            let port = self
                .next_free_port(&mut candidates, &assigned)?
                .ok_or(Error::PortExhausted { range })?;
            assigned.insert(port);
            item.port = Some(port);

            let inbound_tag = format!("socks{port}");
            outbound.tag = format!("{PROXY_TAG}{port}");

            let mut rule = RoutingRule::to_outbound(&outbound.tag);
            rule.inbound_tag = Some(vec![inbound_tag.clone()]);
            rules.push(rule);

            inbounds.push(V2rayInbound {
                tag: inbound_tag,
                port: port.value(),
                listen: SPEEDTEST_LISTEN.to_string(),
                protocol: "socks".to_string(),
                sniffing: None,
                settings: Some(InboundProtocolSettings {
                    auth: Some("noauth".into()),
                    udp: Some(true),
                    allow_transparent: None,
                }),
            });
            outbounds.push(outbound);
        }

        if inbounds.is_empty() {
            return Err(Error::generation("no profile can be speed tested"));
        }

        log::debug!(target: "speedtest", "assigned {} listener(s) from {range}", inbounds.len());

        outbounds.extend(V2rayBuilder::fallback_outbounds());

        Ok(SpeedtestConfig {
            document: V2rayConfig {
                log: builder.log(),
                inbounds,
                outbounds,
                stats: None,
                api: None,
                policy: None,
                routing: Routing {
                    domain_strategy: builder.routing().domain_strategy,
                    rules,
                },
                dns: Some(builder.dns()),
            },
            items,
        })
    }

    fn is_eligible(&self, item: &SpeedtestItem) -> bool {
        item.allow_test
            && !item.profile.is_custom()
            && self.settings.core_type_for(&item.profile).is_v2ray_family()
    }

    fn next_free_port(
        &self,
        candidates: &mut impl Iterator<Item = Port>,
        assigned: &HashSet<Port>,
    ) -> Result<Option<Port>> {
        for port in candidates {
            if assigned.contains(&port) {
                continue;
            }
            if self.settings.speedtest.check_occupancy && self.checker.is_occupied(port)? {
                log::debug!(target: "speedtest", "port {port} is occupied");
                continue;
            }
            return Ok(Some(port));
        }
        Ok(None)
    }
}
