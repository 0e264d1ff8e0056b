//! Shared foundation for leakscout.
//!
//! Defines the domain enums, the TOML-based application configuration and the
//! error types used across the other crates.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod config;
pub mod error;
pub mod types;

pub use config::AppConfig;
pub use error::{ConfigError, ConfigResult};
pub use types::SourceType;
