//! Code search API contract.
//!
//! The scanner orchestrates against this trait rather than a concrete HTTP
//! client, so tests can substitute an in-memory implementation.

use crate::error::Result;
use async_trait::async_trait;

/// One page of the public project listing.
#[derive(Debug, Clone)]
pub struct ProjectPage {
    /// Projects on this page
    pub projects: Vec<RemoteProject>,
    /// Page number of the next page, or 0 when this is the last page
    pub next_page: u64,
}

/// A project as reported by the listing endpoint.
#[derive(Debug, Clone)]
pub struct RemoteProject {
    /// The platform's project identifier
    pub id: i64,
    /// Web URL of the repository
    pub web_url: String,
    /// Namespaced path, e.g. `group/repo`
    pub path_with_namespace: String,
}

/// One matched blob from a code search.
#[derive(Debug, Clone)]
pub struct BlobMatch {
    /// Directory part of the matched file
    pub basename: String,
    /// File name of the matched blob
    pub filename: String,
    /// The matched code fragment
    pub data: String,
    /// Project the match was found in
    pub project_id: i64,
}

/// Async contract for a code-hosting platform's search API.
#[async_trait]
pub trait CodeSearchApi: Send + Sync {
    /// Fetch one page of the public project listing.
    async fn list_projects(&self, page: u64, per_page: u64) -> Result<ProjectPage>;

    /// Search a project's blobs for a keyword.
    async fn search_blobs(&self, project_id: i64, keyword: &str) -> Result<Vec<BlobMatch>>;

    /// Install the credential used for subsequent requests.
    ///
    /// Tokens live in the store and may rotate while the scan loop runs; the
    /// dispatcher installs the current one at the start of every cycle. The
    /// default implementation ignores the value.
    fn set_token(&self, _token: String) {}
}
