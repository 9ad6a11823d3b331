//! Custom configuration passthrough.
//!
//! A custom profile points at a user-authored engine configuration file.
//! The file is copied to the destination unchanged, except that for the
//! Clash family the local `port:` and `socks-port:` directives are
//! replaced with the configured listener ports.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::GlobalSettings;
use crate::error::{Error, Result};
use crate::messages::SUCCESSFUL_CONFIGURATION;
use crate::port::Port;
use crate::profile::ProfileDescriptor;

const HTTP_PORT_DIRECTIVE: &[u8] = b"port:";
const SOCKS_PORT_DIRECTIVE: &[u8] = b"socks-port:";

/// Copies and patches custom configuration files.
#[derive(Debug, Clone, Copy)]
pub struct CustomPassthrough<'a> {
    settings: &'a GlobalSettings,
}

impl<'a> CustomPassthrough<'a> {
    /// A passthrough reading `settings`.
    #[must_use]
    pub const fn new(settings: &'a GlobalSettings) -> Self {
        Self { settings }
    }

    /// Copy the profile's source file to `destination` and patch it.
    ///
    /// Any existing destination file is deleted first. The source is
    /// `profile.address` as given, or else resolved against the
    /// configuration directory. The delete and copy are not atomic: a
    /// failure in between leaves no destination file.
    ///
    /// Returns the success message; the content is never returned in
    /// memory.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidInput`] if the profile or destination is missing
    /// - [`Error::NotFound`] if the source cannot be resolved, or the
    ///   destination is missing after the copy
    /// - [`Error::Io`] if a file operation fails
    pub fn apply(
        &self,
        profile: Option<&ProfileDescriptor>,
        destination: Option<&Path>,
    ) -> Result<String> {
        let (Some(profile), Some(destination)) = (profile, destination) else {
            return Err(Error::invalid_input(
                "custom configuration needs a profile and a destination file",
            ));
        };

        if destination.exists() {
            fs::remove_file(destination)?;
        }

        let source = self.resolve_source(&profile.address)?;
        if let Some(parent) = destination.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::copy(&source, destination)?;

        if !destination.exists() {
            return Err(Error::NotFound {
                path: destination.to_path_buf(),
            });
        }

        if profile.socks_port_override().is_none() {
            let core_type = self.settings.core_type_for(profile);
            let contents = fs::read(destination)?;
            let contents = if core_type.uses_port_directives() {
                log::debug!(
                    target: "custom",
                    "patching port directives of {} for {core_type}",
                    destination.display()
                );
                patch_port_directives(
                    &contents,
                    self.settings.inbound.http_port,
                    self.settings.inbound.socks_port,
                )
            } else {
                contents
            };
            fs::write(destination, contents)?;
        }

        log::info!(
            target: "custom",
            "copied {} to {}",
            source.display(),
            destination.display()
        );

        Ok(SUCCESSFUL_CONFIGURATION.to_string())
    }

    /// Resolve a custom source: as given, then under the configuration
    /// directory.
    fn resolve_source(&self, address: &str) -> Result<PathBuf> {
        let direct = PathBuf::from(address);
        if direct.is_file() {
            return Ok(direct);
        }

        let in_config_dir = self.settings.config_dir.join(address);
        if in_config_dir.is_file() {
            return Ok(in_config_dir);
        }

        Err(Error::NotFound { path: direct })
    }
}

/// Replace the local port directives of a Clash-family file.
///
/// Removes the first line containing `port:`, then the first remaining line
/// containing `socks-port:`, and appends `port: {http}` and
/// `socks-port: {socks}`. Matching is an unanchored substring search, so a
/// `socks-port:` line that precedes every other `port:` line is the one
/// removed first. Kept lines are untouched, terminators included.
///
/// Lines are split on `\n` only. A bare `\r` is not a terminator, so a
/// file using classic Mac line endings is treated as a single line.
///
/// # Examples
///
/// ```
/// use rayconf::custom::patch_port_directives;
/// use rayconf::Port;
///
/// let original = b"mixed-port: 7890\nmode: rule\n";
/// let patched = patch_port_directives(
///     original,
///     Port::try_from(10809).unwrap(),
///     Port::try_from(10808).unwrap(),
/// );
/// assert_eq!(patched, b"mode: rule\nport: 10809\nsocks-port: 10808\n");
/// ```
#[must_use]
pub fn patch_port_directives(contents: &[u8], http: Port, socks: Port) -> Vec<u8> {
    let mut lines: Vec<Vec<u8>> = contents
        .split_inclusive(|b| *b == b'\n')
        .map(<[u8]>::to_vec)
        .collect();

    for directive in [HTTP_PORT_DIRECTIVE, SOCKS_PORT_DIRECTIVE] {
        if let Some(index) = lines.iter().position(|line| contains(line, directive)) {
            lines.remove(index);
        }
    }

    if let Some(last) = lines.last_mut() {
        if last.last() != Some(&b'\n') {
            last.push(b'\n');
        }
    }

    lines.push(format!("port: {http}\n").into_bytes());
    lines.push(format!("socks-port: {socks}\n").into_bytes());

    lines.concat()
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|window| window == needle)
}
