//! Settings merging and precedence handling.
//!
//! This module implements hierarchical merging of settings sources, with
//! special handling for accumulated fields like `dns_servers` and
//! `core_types`.

use crate::config::loader::SettingsSource;
use crate::config::schema::{InboundSettings, Settings, SpeedtestSettings, TunSettings};

/// Merges settings sources according to precedence rules.
///
/// # Examples
///
/// ```
/// use rayconf::config::{EngineLogLevel, Settings, SettingsMerger};
///
/// let low = Settings { log_level: Some(EngineLogLevel::Error), ..Default::default() };
/// let high = Settings { log_level: Some(EngineLogLevel::Debug), ..Default::default() };
///
/// let mut result = low;
/// SettingsMerger::merge_into(&mut result, &high);
/// assert_eq!(result.log_level, Some(EngineLogLevel::Debug));
/// ```
pub struct SettingsMerger;

impl SettingsMerger {
    /// Merge multiple settings sources into final settings.
    ///
    /// Sources should be provided in order from lowest to highest precedence.
    #[must_use]
    pub fn merge(sources: Vec<SettingsSource>) -> Settings {
        let mut result = Settings::default();

        for source in sources {
            Self::merge_into(&mut result, &source.settings);
        }

        result
    }

    /// Merge source settings into target (source overwrites target).
    ///
    /// # Merging Rules
    ///
    /// - Simple fields: source overwrites if Some
    /// - DNS servers: accumulated as an ordered set
    /// - Core type mapping: merged key by key
    /// - Nested sections: field-by-field merge
    pub fn merge_into(target: &mut Settings, source: &Settings) {
        if source.log_level.is_some() {
            target.log_level = source.log_level;
        }

        if source.domain_strategy.is_some() {
            target.domain_strategy = source.domain_strategy;
        }

        if source.config_dir.is_some() {
            target.config_dir.clone_from(&source.config_dir);
        }

        if let Some(ref source_tun) = source.tun {
            target.tun = Some(match &target.tun {
                Some(target_tun) => Self::merge_tun(target_tun, source_tun),
                None => source_tun.clone(),
            });
        }

        if let Some(ref source_inbound) = source.inbound {
            target.inbound = Some(match &target.inbound {
                Some(target_inbound) => Self::merge_inbound(target_inbound, source_inbound),
                None => source_inbound.clone(),
            });
        }

        if let Some(ref source_speedtest) = source.speedtest {
            target.speedtest = Some(match &target.speedtest {
                Some(target_speedtest) => Self::merge_speedtest(target_speedtest, source_speedtest),
                None => source_speedtest.clone(),
            });
        }

        // Union of all DNS servers, first-seen order
        if let Some(ref source_dns) = source.dns_servers {
            let target_dns = target.dns_servers.get_or_insert_with(Vec::new);
            for server in source_dns {
                if !target_dns.contains(server) {
                    target_dns.push(server.clone());
                }
            }
        }

        if let Some(ref source_core_types) = source.core_types {
            target
                .core_types
                .get_or_insert_with(Default::default)
                .extend(source_core_types.iter().map(|(k, v)| (*k, *v)));
        }
    }

    fn merge_tun(target: &TunSettings, source: &TunSettings) -> TunSettings {
        TunSettings {
            enabled: source.enabled.or(target.enabled),
            stack: source.stack.clone().or_else(|| target.stack.clone()),
            mtu: source.mtu.or(target.mtu),
            strict_route: source.strict_route.or(target.strict_route),
        }
    }

    fn merge_inbound(target: &InboundSettings, source: &InboundSettings) -> InboundSettings {
        InboundSettings {
            listen: source.listen.clone().or_else(|| target.listen.clone()),
            socks_port: source.socks_port.or(target.socks_port),
            http_port: source.http_port.or(target.http_port),
            sniffing: source.sniffing.or(target.sniffing),
            udp: source.udp.or(target.udp),
        }
    }

    fn merge_speedtest(target: &SpeedtestSettings, source: &SpeedtestSettings) -> SpeedtestSettings {
        SpeedtestSettings {
            port_min: source.port_min.or(target.port_min),
            port_max: source.port_max.or(target.port_max),
            check_occupancy: source.check_occupancy.or(target.check_occupancy),
        }
    }
}
