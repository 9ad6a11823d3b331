//! Port and port range types for local inbound listeners.
//!
//! Local inbound ports (SOCKS, HTTP, speed-test listeners) are carried as
//! validated [`Port`] values; speed-test allocation walks a [`PortRange`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub mod occupancy;

/// A valid network port number (1-65535).
///
/// Port 0 is considered invalid as it has special meaning in networking contexts.
///
/// # Examples
///
/// ```
/// use rayconf::Port;
///
/// let port = Port::try_from(10808).unwrap();
/// assert_eq!(port.value(), 10808);
///
/// assert!(Port::try_from(0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct Port(u16);

impl Port {
    /// Creates a port in a const context; a zero value fails the build.
    ///
    /// # Panics
    ///
    /// Panics if `value` is 0.
    #[must_use]
    pub const fn from_const(value: u16) -> Self {
        assert!(value != 0, "port 0 is invalid");
        Self(value)
    }

    /// Returns the underlying port number.
    #[must_use]
    pub const fn value(self) -> u16 {
        self.0
    }

    /// Returns the port `offset` above this one, if it is still a valid port.
    ///
    /// # Examples
    ///
    /// ```
    /// use rayconf::Port;
    ///
    /// let socks = Port::try_from(10808).unwrap();
    /// assert_eq!(socks.offset(1).unwrap().value(), 10809);
    /// assert!(Port::try_from(65535).unwrap().offset(1).is_none());
    /// ```
    #[must_use]
    pub fn offset(self, offset: u16) -> Option<Self> {
        self.0.checked_add(offset).map(Self)
    }
}

impl TryFrom<u16> for Port {
    type Error = Error;

    fn try_from(value: u16) -> Result<Self> {
        if value == 0 {
            return Err(Error::InvalidPort {
                value,
                reason: "port 0 is reserved for the OS to pick".into(),
            });
        }
        Ok(Self(value))
    }
}

impl From<Port> for u16 {
    fn from(port: Port) -> Self {
        port.0
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A range of ports (inclusive on both ends).
///
/// # Examples
///
/// ```
/// use rayconf::{Port, PortRange};
///
/// let min = Port::try_from(10900).unwrap();
/// let max = Port::try_from(10910).unwrap();
/// let range = PortRange::new(min, max).unwrap();
///
/// assert_eq!(range.len(), 11);
/// assert!(range.contains(Port::try_from(10905).unwrap()));
/// assert!(!range.contains(Port::try_from(10899).unwrap()));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortRange {
    min: Port,
    max: Port,
}

impl PortRange {
    /// Creates a new port range.
    ///
    /// # Errors
    ///
    /// Returns an error if `max` is less than `min`.
    pub fn new(min: Port, max: Port) -> Result<Self> {
        if max < min {
            return Err(Error::InvalidPortRange {
                min: min.value(),
                max: max.value(),
                reason: "the last port comes before the first".into(),
            });
        }
        Ok(Self { min, max })
    }

    /// Returns the minimum port in the range.
    #[must_use]
    pub const fn min(&self) -> Port {
        self.min
    }

    /// Returns the maximum port in the range.
    #[must_use]
    pub const fn max(&self) -> Port {
        self.max
    }

    /// Returns `true` if the range contains the given port.
    #[must_use]
    pub const fn contains(&self, port: Port) -> bool {
        port.value() >= self.min.value() && port.value() <= self.max.value()
    }

    /// Returns the number of ports in the range (inclusive).
    #[must_use]
    pub const fn len(&self) -> u32 {
        self.max.value() as u32 - self.min.value() as u32 + 1
    }

    /// Always `false`; a constructed range holds at least one port.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Returns an iterator over all ports in this range.
    #[must_use]
    pub fn iter(self) -> PortRangeIter {
        PortRangeIter {
            max: u32::from(self.max.value()),
            current: u32::from(self.min.value()),
        }
    }
}

impl fmt::Display for PortRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.min, self.max)
    }
}

impl IntoIterator for PortRange {
    type Item = Port;
    type IntoIter = PortRangeIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over ports in a `PortRange`.
#[derive(Debug)]
pub struct PortRangeIter {
    max: u32,
    current: u32,
}

impl Iterator for PortRangeIter {
    type Item = Port;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current <= self.max {
            // current never exceeds max, which came from a u16
            let port = Port(self.current as u16);
            self.current += 1;
            Some(port)
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.max + 1).saturating_sub(self.current) as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for PortRangeIter {}

#[cfg(test)]
mod tests {
    use super::*;

    fn port(value: u16) -> Port {
        Port::try_from(value).unwrap()
    }

    #[test]
    fn test_port_validation() {
        assert!(Port::try_from(0).is_err());
        assert!(Port::try_from(1).is_ok());
        assert!(Port::try_from(65535).is_ok());
    }

    #[test]
    fn test_port_zero_error() {
        let err = Port::try_from(0).unwrap_err();
        assert!(matches!(err, Error::InvalidPort { value: 0, .. }));
    }

    #[test]
    fn test_port_serde_rejects_zero() {
        let json = serde_json::to_string(&port(10808)).unwrap();
        assert_eq!(json, "10808");

        let deserialized: Port = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, port(10808));

        assert!(serde_json::from_str::<Port>("0").is_err());
    }

    #[test]
    fn test_port_offset() {
        assert_eq!(port(10808).offset(1), Some(port(10809)));
        assert_eq!(port(65535).offset(1), None);
    }

    #[test]
    fn test_port_range_invalid() {
        let err = PortRange::new(port(10999), port(10900)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid port range 10999-10900: the last port comes before the first"
        );
    }

    #[test]
    fn test_port_range_single_port() {
        let range = PortRange::new(port(10900), port(10900)).unwrap();
        assert_eq!(range.len(), 1);
        assert!(range.contains(port(10900)));
    }

    #[test]
    fn test_port_range_display() {
        let range = PortRange::new(port(10900), port(10999)).unwrap();
        assert_eq!(format!("{range}"), "10900-10999");
    }

    #[test]
    fn test_port_range_iterator() {
        let range = PortRange::new(port(10900), port(10902)).unwrap();
        let ports: Vec<u16> = range.iter().map(Port::value).collect();
        assert_eq!(ports, vec![10900, 10901, 10902]);
    }

    #[test]
    fn test_port_range_iterator_exact_size() {
        let mut iter = PortRange::new(port(10900), port(10910)).unwrap().iter();
        assert_eq!(iter.len(), 11);
        iter.next();
        assert_eq!(iter.len(), 10);
    }

    #[test]
    fn test_port_range_reaches_top_port() {
        let range = PortRange::new(port(65534), port(65535)).unwrap();
        let ports: Vec<u16> = range.into_iter().map(Port::value).collect();
        assert_eq!(ports, vec![65534, 65535]);
        assert_eq!(PortRange::new(port(1), port(65535)).unwrap().len(), 65535);
    }
}
