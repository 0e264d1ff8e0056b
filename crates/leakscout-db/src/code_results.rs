//! Code result storage.
//!
//! A code result is one matched file from a blob search. Results are
//! deduplicated on `(project_id, path, name, keyword)` before insert and
//! never updated afterwards. The matched fragments are stored as a JSON
//! array in the `text_matches` column.

use crate::error::{DatabaseError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Pool, Row, Sqlite};

/// A matched code snippet from a search response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextMatch {
    /// The raw matched fragment
    pub fragment: String,
}

/// A persisted code match.
#[derive(Debug, Clone)]
pub struct CodeResult {
    /// Row id
    pub id: i64,
    /// File name of the matched blob
    pub name: String,
    /// Path of the matched blob within the repository
    pub path: String,
    /// Namespaced repository path
    pub repo_name: String,
    /// Link to the matched file
    pub html_url: String,
    /// Matched fragments, in response order
    pub text_matches: Vec<TextMatch>,
    /// Triage status (0 = new)
    pub status: i64,
    /// The rule pattern that produced this match
    pub keyword: Option<String>,
    /// Source platform tag
    pub source: String,
    /// Platform project id the match was found in
    pub project_id: i64,
    /// When the match was persisted
    pub discovered_at: DateTime<Utc>,
}

/// A freshly discovered code match, not yet persisted.
///
/// The keyword is filled in by the result sink just before insert.
#[derive(Debug, Clone)]
pub struct NewCodeResult {
    /// File name of the matched blob
    pub name: String,
    /// Path of the matched blob within the repository
    pub path: String,
    /// Namespaced repository path
    pub repo_name: String,
    /// Link to the matched file
    pub html_url: String,
    /// Matched fragments, in response order
    pub text_matches: Vec<TextMatch>,
    /// The rule pattern that produced this match
    pub keyword: Option<String>,
    /// Source platform tag
    pub source: String,
    /// Platform project id the match was found in
    pub project_id: i64,
}

/// Check whether an equal result is already stored.
///
/// Identity is `(project_id, path, name, keyword)`.
pub async fn exists(
    pool: &Pool<Sqlite>,
    project_id: i64,
    path: &str,
    name: &str,
    keyword: &str,
) -> Result<bool> {
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM code_results
         WHERE project_id = ? AND path = ? AND name = ? AND keyword = ?",
    )
    .bind(project_id)
    .bind(path)
    .bind(name)
    .bind(keyword)
    .fetch_one(pool)
    .await?;

    Ok(count > 0)
}

/// Insert a code result, returning its row id.
pub async fn insert(pool: &Pool<Sqlite>, result: &NewCodeResult) -> Result<i64> {
    let text_matches = serde_json::to_string(&result.text_matches)
        .map_err(|e| DatabaseError::Decode(format!("failed to encode text matches: {e}")))?;
    let discovered_at = Utc::now();

    let row = sqlx::query(
        "INSERT INTO code_results
             (name, path, repo_name, html_url, text_matches, status, keyword, source,
              project_id, discovered_at)
         VALUES (?, ?, ?, ?, ?, 0, ?, ?, ?, ?)",
    )
    .bind(&result.name)
    .bind(&result.path)
    .bind(&result.repo_name)
    .bind(&result.html_url)
    .bind(&text_matches)
    .bind(&result.keyword)
    .bind(&result.source)
    .bind(result.project_id)
    .bind(discovered_at.to_rfc3339())
    .execute(pool)
    .await?;

    Ok(row.last_insert_rowid())
}

/// Load all results for a keyword, newest first.
pub async fn list_by_keyword(pool: &Pool<Sqlite>, keyword: &str) -> Result<Vec<CodeResult>> {
    let rows = sqlx::query(
        "SELECT id, name, path, repo_name, html_url, text_matches, status, keyword, source,
                project_id, discovered_at
         FROM code_results
         WHERE keyword = ?
         ORDER BY discovered_at DESC, id DESC",
    )
    .bind(keyword)
    .fetch_all(pool)
    .await?;

    let mut results = Vec::new();
    for row in rows {
        let text_matches_str: String = row.try_get("text_matches")?;
        let text_matches = serde_json::from_str(&text_matches_str)
            .map_err(|e| DatabaseError::Decode(format!("invalid text_matches column: {e}")))?;

        let discovered_at_str: String = row.try_get("discovered_at")?;
        let discovered_at = DateTime::parse_from_rfc3339(&discovered_at_str)
            .map_or_else(|_| Utc::now(), |dt| dt.with_timezone(&Utc));

        results.push(CodeResult {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            path: row.try_get("path")?,
            repo_name: row.try_get("repo_name")?,
            html_url: row.try_get("html_url")?,
            text_matches,
            status: row.try_get("status")?,
            keyword: row.try_get("keyword")?,
            source: row.try_get("source")?,
            project_id: row.try_get("project_id")?,
            discovered_at,
        });
    }

    Ok(results)
}

/// Count all stored code results.
pub async fn count(pool: &Pool<Sqlite>) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM code_results")
        .fetch_one(pool)
        .await?;

    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;

    async fn setup_test_db() -> Database {
        let db = Database::new(":memory:").await.expect("create database");
        db.run_migrations().await.expect("run migrations");
        db
    }

    fn sample_result(project_id: i64, name: &str) -> NewCodeResult {
        NewCodeResult {
            name: name.to_string(),
            path: "config".to_string(),
            repo_name: "acme/repo".to_string(),
            html_url: format!("https://gitlab.com/acme/repo/{name}"),
            text_matches: vec![TextMatch {
                fragment: "aws_secret = \"AKIA...\"".to_string(),
            }],
            keyword: Some("aws_secret".to_string()),
            source: "GITLAB".to_string(),
            project_id,
        }
    }

    #[tokio::test]
    async fn test_insert_and_list() {
        let db = setup_test_db().await;

        insert(db.pool(), &sample_result(1, "settings.py"))
            .await
            .expect("insert result");

        let results = list_by_keyword(db.pool(), "aws_secret")
            .await
            .expect("list results");

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "settings.py");
        assert_eq!(results[0].text_matches.len(), 1);
        assert_eq!(
            results[0].text_matches[0].fragment,
            "aws_secret = \"AKIA...\""
        );
    }

    #[tokio::test]
    async fn test_exists_on_match_identity() {
        let db = setup_test_db().await;

        insert(db.pool(), &sample_result(1, "settings.py"))
            .await
            .expect("insert result");

        assert!(exists(db.pool(), 1, "config", "settings.py", "aws_secret")
            .await
            .expect("exists"));
        // Different keyword on the same file is a distinct result
        assert!(!exists(db.pool(), 1, "config", "settings.py", "api_key")
            .await
            .expect("exists"));
        assert!(!exists(db.pool(), 2, "config", "settings.py", "aws_secret")
            .await
            .expect("exists"));
    }

    #[tokio::test]
    async fn test_count() {
        let db = setup_test_db().await;

        assert_eq!(count(db.pool()).await.expect("count"), 0);

        insert(db.pool(), &sample_result(1, "a.py"))
            .await
            .expect("insert");
        insert(db.pool(), &sample_result(1, "b.py"))
            .await
            .expect("insert");

        assert_eq!(count(db.pool()).await.expect("count"), 2);
    }
}
