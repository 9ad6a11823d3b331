//! Status messages returned across the [`crate::handler`] boundary.

/// A profile or destination was missing.
pub const CHECK_SERVER_SETTINGS: &str = "check server settings";

/// Generic failure message for errors the caller cannot act on.
pub const FAILED_GEN_DEFAULT_CONFIGURATION: &str = "failed to generate default configuration";

/// Generation succeeded.
pub const SUCCESSFUL_CONFIGURATION: &str = "configuration successful";
