//! leakscout search orchestration.
//!
//! Coordinates one scan cycle end to end: discover candidate projects,
//! partition the active rules into rate-limited batches, fan each batch out
//! to one concurrent search task per rule, and deduplicate and persist the
//! matches. Collaborator failures are logged and the cycle continues; no
//! error from this crate stops the periodic scheduler.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod batcher;
pub mod catalog;
pub mod dispatcher;
pub mod error;
pub mod sink;

// Re-export commonly used items
pub use batcher::{generate_batches, partition_rules};
pub use catalog::{list_valid_projects, refresh_projects, PROJECTS_PER_PAGE};
pub use dispatcher::{client_token, SearchDispatcher, PACING_FLOOR};
pub use error::{Result, ScanError};
pub use sink::{mark_scanned, persist_results};
