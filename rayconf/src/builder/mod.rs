//! Schema builders.
//!
//! A builder turns one standard profile plus the resolved settings into a
//! complete engine document. Builders never see custom profiles; those
//! are routed to [`crate::custom::CustomPassthrough`] before schema
//! construction.

use crate::error::{Error, Result};
use crate::profile::{ProfileDescriptor, Protocol};

pub mod singbox;
pub mod v2ray;

pub use singbox::SingboxBuilder;
pub use v2ray::V2rayBuilder;

/// Builds one engine document from one profile.
///
/// # Examples
///
/// ```
/// use rayconf::builder::{DocumentBuilder, V2rayBuilder};
/// use rayconf::config::GlobalSettings;
/// use rayconf::profile::{ProfileDescriptor, Protocol};
///
/// let settings = GlobalSettings::default();
/// let profile = ProfileDescriptor::standard(Protocol::Vmess, "example.com", 443)
///     .with_id("b831381d-6324-4d53-ad4f-8cda48b30811");
///
/// let document = V2rayBuilder::new(&settings).build(&profile).unwrap();
/// assert_eq!(document.outbounds[0].tag, "proxy");
/// ```
pub trait DocumentBuilder {
    /// The document shape produced.
    type Document;

    /// Build a complete document for `profile`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Generation`] if the profile cannot be expressed in
    /// this document shape.
    fn build(&self, profile: &ProfileDescriptor) -> Result<Self::Document>;
}

/// Checks shared by every builder; returns the profile's protocol.
pub(crate) fn validate_profile(
    profile: &ProfileDescriptor,
    schema: &str,
    supports: impl Fn(Protocol) -> bool,
) -> Result<Protocol> {
    let Some(protocol) = profile.protocol() else {
        return Err(Error::generation(format!(
            "{}: custom profiles cannot be built into a {schema} document",
            profile.label()
        )));
    };

    if profile.address.trim().is_empty() {
        return Err(Error::generation(format!(
            "{}: server address is empty",
            profile.label()
        )));
    }

    if profile.port == 0 {
        return Err(Error::generation(format!(
            "{}: server port is invalid",
            profile.label()
        )));
    }

    if !supports(protocol) {
        return Err(Error::generation(format!(
            "{}: {protocol} is not supported by {schema}",
            profile.label()
        )));
    }

    if requires_credential(protocol) && profile.id.is_empty() {
        return Err(Error::generation(format!(
            "{}: {protocol} requires an id or password",
            profile.label()
        )));
    }

    Ok(protocol)
}

const fn requires_credential(protocol: Protocol) -> bool {
    !matches!(protocol, Protocol::Socks | Protocol::Http)
}

/// The transport network, defaulting to `tcp`.
pub(crate) fn network_of(profile: &ProfileDescriptor) -> &str {
    if profile.network.is_empty() {
        "tcp"
    } else {
        profile.network.as_str()
    }
}

/// The TLS server name: SNI, else the host header.
pub(crate) fn server_name_of(profile: &ProfileDescriptor) -> Option<String> {
    [&profile.sni, &profile.host]
        .into_iter()
        .find(|s| !s.is_empty())
        .cloned()
}

/// `None` for an empty string.
pub(crate) fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}
