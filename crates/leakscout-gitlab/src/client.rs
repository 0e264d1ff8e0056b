//! GitLab REST API client.
//!
//! Implements [`CodeSearchApi`] over the v4 REST API: the public project
//! listing (`GET /api/v4/projects`) and per-project blob search
//! (`GET /api/v4/projects/{id}/search?scope=blobs`).

use crate::api::{BlobMatch, CodeSearchApi, ProjectPage, RemoteProject};
use crate::error::{ApiError, Result};
use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::Client;
use serde::Deserialize;
use std::sync::{PoisonError, RwLock};

/// GitLab API client.
pub struct GitlabClient {
    client: Client,
    base_url: String,
    /// Credential for the `PRIVATE-TOKEN` header; replaced per cycle via
    /// [`CodeSearchApi::set_token`]
    token: RwLock<String>,
}

impl GitlabClient {
    /// Create a client against gitlab.com.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created.
    pub fn new(token: impl Into<String>) -> Result<Self> {
        Self::with_base_url("https://gitlab.com", token)
    }

    /// Create a client against a specific GitLab instance.
    ///
    /// An empty token is accepted; requests are then unauthenticated and the
    /// API will reject them per call.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created.
    pub fn with_base_url(base_url: impl Into<String>, token: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: RwLock::new(token.into()),
        })
    }

    fn get(&self, endpoint: &str) -> reqwest::RequestBuilder {
        let token = self.token.read().unwrap_or_else(PoisonError::into_inner);
        self.client
            .get(format!("{}{endpoint}", self.base_url))
            .header("PRIVATE-TOKEN", token.as_str())
    }
}

/// Extract the next page number from GitLab's `x-next-page` response header.
///
/// GitLab leaves the header empty on the last page; both missing and empty
/// map to 0.
fn next_page_from_headers(headers: &HeaderMap) -> u64 {
    headers
        .get("x-next-page")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(0)
}

#[derive(Debug, Deserialize)]
struct ProjectResponse {
    id: i64,
    web_url: String,
    path_with_namespace: String,
}

#[derive(Debug, Deserialize)]
struct BlobResponse {
    basename: String,
    filename: String,
    data: String,
    project_id: i64,
}

#[async_trait]
impl CodeSearchApi for GitlabClient {
    async fn list_projects(&self, page: u64, per_page: u64) -> Result<ProjectPage> {
        let endpoint = "/api/v4/projects";
        let response = self
            .get(endpoint)
            .query(&[
                ("visibility", "public"),
                ("simple", "true"),
                ("page", &page.to_string()),
                ("per_page", &per_page.to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                endpoint: endpoint.to_string(),
            });
        }

        let next_page = next_page_from_headers(response.headers());
        let projects: Vec<ProjectResponse> = response.json().await?;

        tracing::debug!(
            page,
            next_page,
            count = projects.len(),
            "fetched project listing page"
        );

        Ok(ProjectPage {
            projects: projects
                .into_iter()
                .map(|p| RemoteProject {
                    id: p.id,
                    web_url: p.web_url,
                    path_with_namespace: p.path_with_namespace,
                })
                .collect(),
            next_page,
        })
    }

    async fn search_blobs(&self, project_id: i64, keyword: &str) -> Result<Vec<BlobMatch>> {
        let endpoint = format!("/api/v4/projects/{project_id}/search");
        let response = self
            .get(&endpoint)
            .query(&[("scope", "blobs"), ("search", keyword)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                endpoint,
            });
        }

        let blobs: Vec<BlobResponse> = response.json().await?;

        Ok(blobs
            .into_iter()
            .map(|b| BlobMatch {
                basename: b.basename,
                filename: b.filename,
                data: b.data,
                project_id: b.project_id,
            })
            .collect())
    }

    fn set_token(&self, token: String) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = token;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn test_next_page_header_parsing() {
        let mut headers = HeaderMap::new();
        assert_eq!(next_page_from_headers(&headers), 0);

        headers.insert("x-next-page", HeaderValue::from_static(""));
        assert_eq!(next_page_from_headers(&headers), 0);

        headers.insert("x-next-page", HeaderValue::from_static("3"));
        assert_eq!(next_page_from_headers(&headers), 3);

        headers.insert("x-next-page", HeaderValue::from_static("not-a-number"));
        assert_eq!(next_page_from_headers(&headers), 0);
    }

    #[test]
    fn test_base_url_is_normalized() {
        let client =
            GitlabClient::with_base_url("https://gitlab.example.com/", "glpat-x").expect("client");
        assert_eq!(client.base_url, "https://gitlab.example.com");
    }

    #[test]
    fn test_set_token_replaces_credential() {
        let client =
            GitlabClient::with_base_url("https://gitlab.example.com", "glpat-old").expect("client");
        client.set_token("glpat-new".to_string());
        assert_eq!(*client.token.read().expect("read token"), "glpat-new");
    }

    #[test]
    fn test_project_response_decoding() {
        let body = r#"[
            {"id": 1, "web_url": "https://gitlab.com/acme/repo",
             "path_with_namespace": "acme/repo", "default_branch": "main"}
        ]"#;

        let projects: Vec<ProjectResponse> = serde_json::from_str(body).expect("decode listing");
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].id, 1);
        assert_eq!(projects[0].path_with_namespace, "acme/repo");
    }

    #[test]
    fn test_blob_response_decoding() {
        let body = r#"[
            {"basename": "settings", "filename": "settings.py",
             "data": "aws_secret = \"AKIA...\"", "project_id": 6,
             "ref": "main", "startline": 1}
        ]"#;

        let blobs: Vec<BlobResponse> = serde_json::from_str(body).expect("decode search");
        assert_eq!(blobs.len(), 1);
        assert_eq!(blobs[0].filename, "settings.py");
        assert_eq!(blobs[0].project_id, 6);
    }
}
