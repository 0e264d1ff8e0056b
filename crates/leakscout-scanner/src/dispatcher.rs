//! Search dispatcher.
//!
//! Runs one full dispatch cycle: refresh the project catalog, then work
//! through the rule batches in index order. Each batch fans out one task per
//! rule and joins on all of them before the pacing floor is applied, so no
//! batch finishes faster than the configured wall-clock window.

use crate::{catalog, sink};
use futures::stream::{FuturesUnordered, StreamExt};
use leakscout_core::SourceType;
use leakscout_db::code_results::{NewCodeResult, TextMatch};
use leakscout_db::projects::Project;
use leakscout_db::{tokens, Rule};
use leakscout_gitlab::{BlobMatch, CodeSearchApi};
use sqlx::{Pool, Sqlite};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Minimum wall-clock duration of one batch, to respect API rate limits.
pub const PACING_FLOOR: Duration = Duration::from_secs(60);

/// Dispatches batched rule searches across all known projects.
pub struct SearchDispatcher {
    /// Search API shared read-only by all concurrent rule tasks
    api: Arc<dyn CodeSearchApi>,
    /// Store for projects and results
    pool: Pool<Sqlite>,
    /// Source platform this dispatcher scans
    source_type: SourceType,
    /// Pacing floor per batch
    pacing_floor: Duration,
}

impl SearchDispatcher {
    /// Create a dispatcher with the default 60 second pacing floor.
    #[must_use]
    pub fn new(api: Arc<dyn CodeSearchApi>, pool: Pool<Sqlite>, source_type: SourceType) -> Self {
        Self {
            api,
            pool,
            source_type,
            pacing_floor: PACING_FLOOR,
        }
    }

    /// Override the pacing floor (tests use a short one).
    #[must_use]
    pub fn with_pacing_floor(mut self, pacing_floor: Duration) -> Self {
        self.pacing_floor = pacing_floor;
        self
    }

    /// Run one dispatch cycle over `batches`.
    ///
    /// The current credential is read from the token store and installed on
    /// the API client, and the project catalog is refreshed, once per cycle,
    /// not once per batch. Within a batch every rule search is spawned before
    /// any is awaited and the join barrier completes before pacing; errors
    /// inside rule tasks are logged and never abort the cycle.
    pub async fn run_cycle(&self, batches: BTreeMap<usize, Vec<Rule>>) {
        self.api
            .set_token(client_token(&self.pool, self.source_type).await);
        catalog::refresh_projects(self.api.as_ref(), &self.pool, self.source_type).await;

        for (index, rules) in batches {
            let started = Instant::now();
            let rule_count = rules.len();

            let mut tasks = FuturesUnordered::new();
            for rule in rules {
                let api = Arc::clone(&self.api);
                let pool = self.pool.clone();
                let source_type = self.source_type;
                tasks.push(tokio::spawn(async move {
                    search_one_rule(api.as_ref(), &pool, source_type, &rule.pattern).await;
                }));
            }

            while let Some(joined) = tasks.next().await {
                if let Err(e) = joined {
                    tracing::error!("rule search task failed: {}", e);
                }
            }

            let elapsed = started.elapsed();
            tracing::debug!(batch = index, rules = rule_count, ?elapsed, "batch complete");

            if elapsed < self.pacing_floor {
                tokio::time::sleep(self.pacing_floor - elapsed).await;
            }
        }
    }
}

/// Search every not-yet-scanned project for `pattern`, sequentially.
///
/// Concurrency exists only at the rule level; within a rule the projects are
/// walked one by one, each search immediately followed by the scanned mark
/// and result persistence.
async fn search_one_rule(
    api: &dyn CodeSearchApi,
    pool: &Pool<Sqlite>,
    source_type: SourceType,
    pattern: &str,
) {
    let projects = match catalog::list_valid_projects(pool, source_type).await {
        Ok(projects) => projects,
        Err(e) => {
            tracing::error!("failed to load projects for {}: {}", pattern, e);
            return;
        }
    };

    for project in projects {
        let results = search_project(api, &project, pattern).await;
        sink::mark_scanned(pool, project.project_id).await;
        sink::persist_results(pool, results, pattern).await;
    }
}

/// Run one blob search against `project`.
///
/// Any API failure is logged and yields an empty result set; the caller
/// continues with the next project.
async fn search_project(
    api: &dyn CodeSearchApi,
    project: &Project,
    keyword: &str,
) -> Vec<NewCodeResult> {
    let matches = match api.search_blobs(project.project_id, keyword).await {
        Ok(matches) => matches,
        Err(e) => {
            tracing::error!("blob search failed for {}: {}", project.path, e);
            return Vec::new();
        }
    };

    matches
        .into_iter()
        .map(|blob| build_result(project, blob))
        .collect()
}

fn build_result(project: &Project, blob: BlobMatch) -> NewCodeResult {
    let html_url = format!(
        "{}/{}",
        project.url.trim_end_matches('/'),
        blob.filename
    );

    NewCodeResult {
        name: blob.filename,
        path: blob.basename,
        repo_name: project.path.clone(),
        html_url,
        text_matches: vec![TextMatch {
            fragment: blob.data,
        }],
        keyword: None,
        source: project.source_type.clone(),
        project_id: project.project_id,
    }
}

/// Select the credential for the current cycle: the first valid token for
/// the source type. Re-read each cycle so tokens added or rotated in the
/// store are picked up without a restart.
///
/// A missing token (or a token store failure) is a configuration problem
/// upstream; it is logged and an empty credential is returned so the cycle
/// can still run. Downstream API calls then fail per call.
pub async fn client_token(pool: &Pool<Sqlite>, source_type: SourceType) -> String {
    match tokens::list_valid_tokens(pool, source_type).await {
        Ok(tokens) => match tokens.into_iter().next() {
            Some(token) => token.token,
            None => {
                tracing::warn!(
                    "no valid token for {}, API requests will be unauthenticated",
                    source_type
                );
                String::new()
            }
        },
        Err(e) => {
            tracing::error!("failed to load tokens for {}: {}", source_type, e);
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_project() -> Project {
        Project {
            id: 1,
            url: "https://gitlab.com/acme/repo/".to_string(),
            path: "acme/repo".to_string(),
            source_type: "GITLAB".to_string(),
            project_id: 6,
            status: 0,
        }
    }

    #[test]
    fn test_build_result_fields() {
        let blob = BlobMatch {
            basename: "config".to_string(),
            filename: "settings.py".to_string(),
            data: "aws_secret = \"AKIA...\"".to_string(),
            project_id: 6,
        };

        let result = build_result(&sample_project(), blob);

        assert_eq!(result.name, "settings.py");
        assert_eq!(result.path, "config");
        assert_eq!(result.repo_name, "acme/repo");
        assert_eq!(result.html_url, "https://gitlab.com/acme/repo/settings.py");
        assert_eq!(result.project_id, 6);
        assert_eq!(result.source, "GITLAB");
        assert!(result.keyword.is_none());
        assert_eq!(result.text_matches.len(), 1);
        assert_eq!(result.text_matches[0].fragment, "aws_secret = \"AKIA...\"");
    }
}
