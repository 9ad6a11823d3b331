//! Error types for the rayconf library.
//!
//! This module provides the error hierarchy for configuration synthesis,
//! using `thiserror` for ergonomic error handling. Errors never cross the
//! status boundary in [`crate::handler`]; they are logged there and turned
//! into a status code plus message.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for operations that may fail with a rayconf error.
///
/// # Examples
///
/// ```
/// use rayconf::{Error, Result};
///
/// fn example_operation() -> Result<u16> {
///     Ok(10808)
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for the rayconf library.
#[derive(Debug, Error)]
pub enum Error {
    /// A required input (profile, destination path) was missing or unusable.
    #[error("invalid input: {reason}")]
    InvalidInput {
        /// Why the input was rejected.
        reason: String,
    },

    /// A schema builder refused to produce a document.
    #[error("{message}")]
    Generation {
        /// The builder's failure message.
        message: String,
    },

    /// A custom configuration source could not be resolved.
    #[error("source file not found: {}", path.display())]
    NotFound {
        /// The path as given by the profile.
        path: PathBuf,
    },

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A document could not be serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A settings or profile file could not be parsed.
    #[error("configuration error: {0}")]
    Configuration(#[from] serde_yaml::Error),

    /// A validation error occurred.
    #[error("validation error for '{field}': {message}")]
    Validation {
        /// The field that failed validation.
        field: String,
        /// A description of the validation failure.
        message: String,
    },

    /// An invalid port number was provided.
    #[error("invalid port {value}: {reason}")]
    InvalidPort {
        /// The invalid port value.
        value: u16,
        /// The reason the port is invalid.
        reason: String,
    },

    /// An invalid port range was specified.
    #[error("invalid port range {min}-{max}: {reason}")]
    InvalidPortRange {
        /// The minimum port in the range.
        min: u16,
        /// The maximum port in the range.
        max: u16,
        /// The reason the range is invalid.
        reason: String,
    },

    /// No free port was left in the range.
    #[error("port range {range} exhausted")]
    PortExhausted {
        /// The port range that was exhausted.
        range: crate::port::PortRange,
    },
}

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing profile or path.
    InvalidInput,
    /// A delegated schema builder failed.
    GenerationFailure,
    /// An unresolvable custom source file.
    NotFound,
    /// A failure while touching the filesystem.
    IoFailure,
    /// Anything else.
    Unknown,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidInput => write!(f, "invalid input"),
            Self::GenerationFailure => write!(f, "generation failure"),
            Self::NotFound => write!(f, "not found"),
            Self::IoFailure => write!(f, "I/O failure"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

impl Error {
    /// Shorthand for an [`Error::Generation`] with the given message.
    pub fn generation(message: impl Into<String>) -> Self {
        Self::Generation {
            message: message.into(),
        }
    }

    /// Shorthand for an [`Error::InvalidInput`] with the given reason.
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }

    /// Classify this error.
    ///
    /// # Examples
    ///
    /// ```
    /// use rayconf::error::{Error, ErrorKind};
    ///
    /// let err = Error::generation("address is empty");
    /// assert_eq!(err.kind(), ErrorKind::GenerationFailure);
    /// ```
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput { .. } => ErrorKind::InvalidInput,
            Self::Generation { .. } => ErrorKind::GenerationFailure,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Io(_) => ErrorKind::IoFailure,
            _ => ErrorKind::Unknown,
        }
    }

    /// Check if error indicates a missing custom source.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
