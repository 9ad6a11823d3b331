#![deny(missing_docs, unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! # rayconf
//!
//! A library for synthesizing proxy engine configuration from proxy
//! profiles.
//!
//! One or more [`ProfileDescriptor`]s plus resolved [`GlobalSettings`] are
//! turned into a V2Ray/Xray document, a sing-box document, a merged
//! multi-profile artifact, or a patched copy of a user-authored file.
//!
//! ## Core Types
//!
//! - [`ProfileDescriptor`] and [`ProfileSet`]: proxy profiles
//! - [`GlobalSettings`] and [`SettingsBuilder`]: layered settings
//! - [`ConfigGenerator`]: single-profile generation
//! - [`MultiProfileMerger`] and [`AggregateDocument`]: multi-profile merging
//! - [`CustomPassthrough`]: custom file passthrough
//! - [`SpeedtestGenerator`]: speed-test documents
//! - [`handler`]: status-code entry points that never return errors
//! - [`Port`] and [`PortRange`]: network port types with validation
//! - [`Error`] and [`Result`]: error handling types
//! - [`Logger`] and [`LogLevel`]: logging infrastructure
//!
//! ## Examples
//!
//! ```
//! use rayconf::handler::generate_client_config;
//! use rayconf::{GlobalSettings, ProfileDescriptor, Protocol};
//!
//! let settings = GlobalSettings::default();
//! let profile = ProfileDescriptor::standard(Protocol::Vless, "example.com", 443)
//!     .with_id("b831381d-6324-4d53-ad4f-8cda48b30811");
//!
//! let outcome = generate_client_config(Some(&profile), &settings, None);
//! assert_eq!(outcome.status, 0);
//! assert!(outcome.content.contains("\"vless\""));
//! ```

pub mod builder;
pub mod config;
pub mod custom;
pub mod error;
pub mod generator;
pub mod handler;
pub mod logging;
pub mod merge;
pub mod messages;
pub mod output;
pub mod port;
pub mod profile;
pub mod schema;
pub mod speedtest;

// Re-export key types at crate root for convenience
pub use config::{GlobalSettings, Settings, SettingsBuilder};
pub use custom::CustomPassthrough;
pub use error::{Error, ErrorKind, Result};
pub use generator::{ConfigGenerator, Generated, GenerationMode};
pub use handler::Outcome;
pub use logging::{init_logger, install_logger, LogLevel, Logger};
pub use merge::{AggregateDocument, MultiProfileMerger};
pub use output::EmissionTarget;
pub use port::occupancy::{PortOccupancyChecker, SystemOccupancyChecker};
pub use port::{Port, PortRange};
pub use profile::{ConfigKind, CoreType, ProfileDescriptor, ProfileSet, Protocol};
pub use schema::{DocumentCollection, GeneratedDocument, SingboxConfig, V2rayConfig};
pub use speedtest::{SpeedtestConfig, SpeedtestGenerator, SpeedtestItem};
