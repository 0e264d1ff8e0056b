//! Tracked project storage.
//!
//! One row per discovered repository, unique on `(source_type, project_id)`.
//! The scan status transitions 0 -> 1 once a search request has been issued
//! against the project; rows are never deleted by the scanner.

use crate::error::Result;
use sqlx::{Pool, Sqlite};

use leakscout_core::SourceType;

/// Scan status: the project has not been searched yet.
pub const STATUS_UNSCANNED: i64 = 0;
/// Scan status: a search request has been issued against the project.
pub const STATUS_SCANNED: i64 = 1;

/// A source-control repository tracked for scanning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    /// Row id
    pub id: i64,
    /// Web URL of the repository
    pub url: String,
    /// Namespaced path, e.g. `group/repo`
    pub path: String,
    /// Source platform the repository lives on
    pub source_type: String,
    /// The platform's own project identifier
    pub project_id: i64,
    /// Scan status, [`STATUS_UNSCANNED`] or [`STATUS_SCANNED`]
    pub status: i64,
}

/// A newly discovered repository, not yet persisted.
#[derive(Debug, Clone)]
pub struct NewProject {
    /// Web URL of the repository
    pub url: String,
    /// Namespaced path, e.g. `group/repo`
    pub path: String,
    /// Source platform the repository lives on
    pub source_type: SourceType,
    /// The platform's own project identifier
    pub project_id: i64,
}

/// Load all projects of a source type, in natural (row id) order.
pub async fn list_by_type(pool: &Pool<Sqlite>, source_type: SourceType) -> Result<Vec<Project>> {
    let rows = sqlx::query_as::<_, (i64, String, String, String, i64, i64)>(
        "SELECT id, url, path, source_type, project_id, status
         FROM projects
         WHERE source_type = ?
         ORDER BY id",
    )
    .bind(source_type.as_str())
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(id, url, path, source_type, project_id, status)| Project {
            id,
            url,
            path,
            source_type,
            project_id,
            status,
        })
        .collect())
}

/// Check whether a project already exists by its natural key.
pub async fn exists(
    pool: &Pool<Sqlite>,
    source_type: SourceType,
    project_id: i64,
) -> Result<bool> {
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM projects WHERE source_type = ? AND project_id = ?",
    )
    .bind(source_type.as_str())
    .bind(project_id)
    .fetch_one(pool)
    .await?;

    Ok(count > 0)
}

/// Insert a newly discovered project with status unscanned, returning its row id.
pub async fn insert(pool: &Pool<Sqlite>, project: &NewProject) -> Result<i64> {
    let result = sqlx::query(
        "INSERT INTO projects (url, path, source_type, project_id, status)
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&project.url)
    .bind(&project.path)
    .bind(project.source_type.as_str())
    .bind(project.project_id)
    .bind(STATUS_UNSCANNED)
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Set the scan status of a project, addressed by the platform project id.
pub async fn update_status_by_project_id(
    pool: &Pool<Sqlite>,
    status: i64,
    project_id: i64,
) -> Result<()> {
    sqlx::query("UPDATE projects SET status = ? WHERE project_id = ?")
        .bind(status)
        .bind(project_id)
        .execute(pool)
        .await?;

    Ok(())
}
