//! Port occupancy checking for speed-test listener allocation.
//!
//! Speed-test documents bind one local SOCKS listener per profile, so ports
//! that something else is already listening on are skipped. The check is
//! behind a trait so allocation can be tested deterministically.

use std::collections::HashSet;

use crate::{Port, PortRange, Result};

/// Trait for checking port occupancy on the system.
pub trait PortOccupancyChecker {
    /// Check if a specific port is occupied.
    ///
    /// Returns `Ok(true)` if the port is occupied, `Ok(false)` if available.
    ///
    /// # Errors
    ///
    /// Returns an error if the occupancy check itself fails.
    fn is_occupied(&self, port: Port) -> Result<bool>;

    /// Find all occupied ports in a given range.
    ///
    /// # Errors
    ///
    /// Returns an error if any occupancy check fails.
    fn find_occupied_ports(&self, range: &PortRange) -> Result<Vec<Port>> {
        let mut occupied = Vec::new();
        for port in *range {
            if self.is_occupied(port)? {
                occupied.push(port);
            }
        }
        Ok(occupied)
    }
}

/// Production implementation using the port-selector crate.
///
/// A port counts as occupied when a localhost bind to it fails.
#[derive(Debug, Clone, Copy)]
pub struct SystemOccupancyChecker;

impl PortOccupancyChecker for SystemOccupancyChecker {
    fn is_occupied(&self, port: Port) -> Result<bool> {
        Ok(!port_selector::is_free(port.value()))
    }
}

/// Checker that reports every port as free.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopOccupancyChecker;

impl PortOccupancyChecker for NoopOccupancyChecker {
    fn is_occupied(&self, _port: Port) -> Result<bool> {
        Ok(false)
    }
}

/// Mock implementation for testing with configurable occupied ports.
///
/// # Examples
///
/// ```
/// use rayconf::port::occupancy::{MockOccupancyChecker, PortOccupancyChecker};
/// use rayconf::Port;
///
/// let mut checker = MockOccupancyChecker::empty();
/// checker.mark_occupied(Port::try_from(10900).unwrap());
///
/// assert!(checker.is_occupied(Port::try_from(10900).unwrap()).unwrap());
/// assert!(!checker.is_occupied(Port::try_from(10901).unwrap()).unwrap());
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockOccupancyChecker {
    occupied_ports: HashSet<Port>,
}

impl MockOccupancyChecker {
    /// Create a new mock checker with the specified occupied ports.
    #[must_use]
    pub fn new(occupied_ports: HashSet<Port>) -> Self {
        Self { occupied_ports }
    }

    /// Create an empty mock checker (all ports available).
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Add a port to the occupied set.
    pub fn mark_occupied(&mut self, port: Port) {
        self.occupied_ports.insert(port);
    }

    /// Remove a port from the occupied set.
    pub fn mark_free(&mut self, port: Port) {
        self.occupied_ports.remove(&port);
    }
}

impl PortOccupancyChecker for MockOccupancyChecker {
    fn is_occupied(&self, port: Port) -> Result<bool> {
        Ok(self.occupied_ports.contains(&port))
    }
}
