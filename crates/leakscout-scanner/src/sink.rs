//! Result sink.
//!
//! Deduplicates and persists code matches, and flips a project's scan status
//! once a search request has been issued against it. Store failures are
//! logged and never abort the surrounding batch.

use leakscout_db::code_results::{self, NewCodeResult};
use leakscout_db::projects::{self, STATUS_SCANNED};
use sqlx::{Pool, Sqlite};

/// Persist `results` for `keyword`, skipping matches already stored.
///
/// A failing existence check is treated as "not stored" and the insert is
/// attempted anyway; the total insert count for the call is logged.
pub async fn persist_results(pool: &Pool<Sqlite>, results: Vec<NewCodeResult>, keyword: &str) {
    if results.is_empty() {
        return;
    }

    let mut inserted = 0;
    for mut result in results {
        let known = code_results::exists(pool, result.project_id, &result.path, &result.name, keyword)
            .await
            .unwrap_or_else(|e| {
                tracing::error!("result existence check failed: {}", e);
                false
            });

        if !known {
            result.keyword = Some(keyword.to_string());
            match code_results::insert(pool, &result).await {
                Ok(_) => inserted += 1,
                Err(e) => tracing::error!("failed to insert code result: {}", e),
            }
        }
    }

    tracing::info!("inserted {} results for keyword {}", inserted, keyword);
}

/// Mark a project as scanned.
///
/// Called right after a search request was issued, whether or not it found
/// anything. Scanned means "a search was attempted", not "results were
/// persisted".
pub async fn mark_scanned(pool: &Pool<Sqlite>, project_id: i64) {
    if let Err(e) = projects::update_status_by_project_id(pool, STATUS_SCANNED, project_id).await {
        tracing::error!("failed to mark project {} as scanned: {}", project_id, e);
    }
}
