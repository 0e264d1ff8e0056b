//! GitLab code search API for leakscout.
//!
//! Exposes the [`CodeSearchApi`] trait the scanner orchestrates against and
//! the [`GitlabClient`] implementation over the GitLab v4 REST API.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod api;
pub mod client;
pub mod error;

pub use api::{BlobMatch, CodeSearchApi, ProjectPage, RemoteProject};
pub use client::GitlabClient;
pub use error::{ApiError, Result};
