//! Multi-profile merging.
//!
//! V2Ray documents from several profiles are folded into one
//! [`AggregateDocument`]; sing-box documents are kept side by side. The
//! artifact written to disk is a [`DocumentCollection`] holding the
//! sing-box documents in processing order followed by the aggregate.
//!
//! # Fold rules
//!
//! - log settings: the last folded document wins
//! - inbounds: first occurrence of each tag wins
//! - outbounds tagged `proxy` are renamed `proxy-1`, `proxy-2`, ... in fold
//!   order and always kept; other outbounds are kept on first occurrence
//!   of their tag
//! - DNS servers: each distinct entry once, first-seen order

use std::path::Path;

use crate::builder::{DocumentBuilder, SingboxBuilder, V2rayBuilder};
use crate::config::GlobalSettings;
use crate::custom::CustomPassthrough;
use crate::error::{Error, Result};
use crate::generator::GenerationMode;
use crate::messages::{CHECK_SERVER_SETTINGS, SUCCESSFUL_CONFIGURATION};
use crate::output;
use crate::profile::ProfileDescriptor;
use crate::schema::v2ray::{Api, Policy, Routing, Stats, V2rayConfig, V2rayDns, PROXY_TAG};
use crate::schema::DocumentCollection;

/// Accumulator for folded V2Ray documents.
///
/// # Examples
///
/// ```
/// use rayconf::merge::AggregateDocument;
/// use rayconf::schema::v2ray::{V2rayConfig, V2rayOutbound};
///
/// let document = V2rayConfig {
///     outbounds: vec![V2rayOutbound::bare("proxy", "vmess"), V2rayOutbound::bare("direct", "freedom")],
///     ..Default::default()
/// };
///
/// let aggregate = AggregateDocument::new().fold(document.clone()).fold(document);
/// let tags: Vec<_> = aggregate.document().outbounds.iter().map(|o| o.tag.as_str()).collect();
/// assert_eq!(tags, vec!["proxy-1", "direct", "proxy-2"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateDocument {
    document: V2rayConfig,
    next_proxy_index: usize,
    folded: usize,
}

impl Default for AggregateDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl AggregateDocument {
    /// An empty aggregate: default log, no listeners or outbounds, empty
    /// stats/api/policy blocks, `AsIs` routing without rules, no DNS
    /// servers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            document: V2rayConfig {
                stats: Some(Stats::default()),
                api: Some(Api::default()),
                policy: Some(Policy::default()),
                routing: Routing::default(),
                dns: Some(V2rayDns::default()),
                ..Default::default()
            },
            next_proxy_index: 1,
            folded: 0,
        }
    }

    /// Fold one document into the aggregate.
    #[must_use]
    pub fn fold(mut self, document: V2rayConfig) -> Self {
        let V2rayConfig {
            log,
            inbounds,
            outbounds,
            dns,
            ..
        } = document;

        self.document.log = log;

        for inbound in inbounds {
            if !self.document.inbounds.iter().any(|i| i.tag == inbound.tag) {
                self.document.inbounds.push(inbound);
            }
        }

        for mut outbound in outbounds {
            if outbound.tag == PROXY_TAG {
                outbound.tag = format!("{PROXY_TAG}-{}", self.next_proxy_index);
                self.next_proxy_index += 1;
                self.document.outbounds.push(outbound);
            } else if !self.document.outbounds.iter().any(|o| o.tag == outbound.tag) {
                self.document.outbounds.push(outbound);
            }
        }

        if let Some(dns) = dns {
            let servers = &mut self.document.dns.get_or_insert_with(V2rayDns::default).servers;
            for server in dns.servers {
                if !servers.contains(&server) {
                    servers.push(server);
                }
            }
        }

        self.folded += 1;
        self
    }

    /// The aggregate so far.
    #[must_use]
    pub const fn document(&self) -> &V2rayConfig {
        &self.document
    }

    /// Consume the aggregate.
    #[must_use]
    pub fn into_document(self) -> V2rayConfig {
        self.document
    }

    /// Index the next `proxy` outbound will be renamed with.
    #[must_use]
    pub const fn next_proxy_index(&self) -> usize {
        self.next_proxy_index
    }

    /// Number of documents folded.
    #[must_use]
    pub const fn folded(&self) -> usize {
        self.folded
    }
}

/// Generates one merged artifact for several profiles.
#[derive(Debug, Clone, Copy)]
pub struct MultiProfileMerger<'a> {
    settings: &'a GlobalSettings,
}

impl<'a> MultiProfileMerger<'a> {
    /// A merger reading `settings`.
    #[must_use]
    pub const fn new(settings: &'a GlobalSettings) -> Self {
        Self { settings }
    }

    /// Generate every profile in order and write the merged artifact to
    /// `file_path`.
    ///
    /// A custom profile ends the whole call: its file is copied to
    /// `file_path` by the passthrough and everything generated before it is
    /// dropped. Profiles after it are not processed.
    ///
    /// Returns the success message.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidInput`] at the first absent profile
    /// - [`Error::Generation`] at the first builder failure
    /// - any passthrough or write error
    ///
    /// Nothing is written unless every profile succeeds.
    pub fn generate_many<'p, I>(&self, profiles: I, file_path: &Path) -> Result<String>
    where
        I: IntoIterator<Item = Option<&'p ProfileDescriptor>>,
    {
        let settings = self.settings;
        let mut aggregate = AggregateDocument::new();
        let mut collection = DocumentCollection::new();

        for profile in profiles {
            let profile = profile.ok_or_else(|| Error::invalid_input(CHECK_SERVER_SETTINGS))?;

            match GenerationMode::select(profile, settings) {
                GenerationMode::Custom => {
                    if aggregate.folded() > 0 || !collection.is_empty() {
                        log::warn!(
                            target: "merge",
                            "custom profile {} replaces {} generated document(s)",
                            profile.label(),
                            aggregate.folded() + collection.len()
                        );
                    }
                    return CustomPassthrough::new(settings).apply(Some(profile), Some(file_path));
                }
                GenerationMode::Singbox => {
                    collection.push(SingboxBuilder::new(settings).build(profile)?);
                }
                GenerationMode::V2ray => {
                    aggregate = aggregate.fold(V2rayBuilder::new(settings).build(profile)?);
                }
            }
        }

        log::debug!(
            target: "merge",
            "merged {} v2ray and {} sing-box document(s)",
            aggregate.folded(),
            collection.len()
        );

        collection.push(aggregate.into_document());
        output::to_file(&collection, file_path)?;

        Ok(SUCCESSFUL_CONFIGURATION.to_string())
    }
}
