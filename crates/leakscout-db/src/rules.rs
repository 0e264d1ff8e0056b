//! Search rule storage.
//!
//! Rules are the keyword patterns the scanner searches for. They are loaded
//! read-only at the start of each scan cycle; CRUD beyond seeding lives in
//! external tooling.

use crate::error::Result;
use sqlx::{Pool, Sqlite};

use leakscout_core::SourceType;

/// A keyword pattern searched across project source code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    /// Row id
    pub id: i64,
    /// The search pattern, e.g. `aws_secret_access_key`
    pub pattern: String,
    /// Source platform this rule applies to
    pub source_type: String,
    /// Whether the rule participates in scan cycles
    pub enabled: bool,
}

/// Load all enabled rules for a source type, in insertion order.
pub async fn get_valid_rules_by_type(
    pool: &Pool<Sqlite>,
    source_type: SourceType,
) -> Result<Vec<Rule>> {
    let rows = sqlx::query_as::<_, (i64, String, String, i64)>(
        "SELECT id, pattern, source_type, enabled
         FROM rules
         WHERE source_type = ? AND enabled = 1
         ORDER BY id",
    )
    .bind(source_type.as_str())
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(id, pattern, source_type, enabled)| Rule {
            id,
            pattern,
            source_type,
            enabled: enabled != 0,
        })
        .collect())
}

/// Insert a new enabled rule, returning its row id.
pub async fn insert_rule(
    pool: &Pool<Sqlite>,
    pattern: &str,
    source_type: SourceType,
) -> Result<i64> {
    let result = sqlx::query("INSERT INTO rules (pattern, source_type, enabled) VALUES (?, ?, 1)")
        .bind(pattern)
        .bind(source_type.as_str())
        .execute(pool)
        .await?;

    Ok(result.last_insert_rowid())
}

/// List every rule regardless of enabled state.
pub async fn list_rules(pool: &Pool<Sqlite>) -> Result<Vec<Rule>> {
    let rows = sqlx::query_as::<_, (i64, String, String, i64)>(
        "SELECT id, pattern, source_type, enabled FROM rules ORDER BY id",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(id, pattern, source_type, enabled)| Rule {
            id,
            pattern,
            source_type,
            enabled: enabled != 0,
        })
        .collect())
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

    #[tokio::test]
    async fn test_insert_and_get_rules() {
        let db = setup_test_db().await;

        insert_rule(db.pool(), "aws_secret", SourceType::Gitlab)
            .await
            .expect("insert rule");
        insert_rule(db.pool(), "api_key", SourceType::Gitlab)
            .await
            .expect("insert rule");

        let rules = get_valid_rules_by_type(db.pool(), SourceType::Gitlab)
            .await
            .expect("load rules");

        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].pattern, "aws_secret");
        assert_eq!(rules[1].pattern, "api_key");
        assert!(rules.iter().all(|r| r.enabled));
    }

    #[tokio::test]
    async fn test_disabled_rules_are_excluded() {
        let db = setup_test_db().await;

        let id = insert_rule(db.pool(), "password", SourceType::Gitlab)
            .await
            .expect("insert rule");

        sqlx::query("UPDATE rules SET enabled = 0 WHERE id = ?")
            .bind(id)
            .execute(db.pool())
            .await
            .expect("disable rule");

        let valid = get_valid_rules_by_type(db.pool(), SourceType::Gitlab)
            .await
            .expect("load rules");
        assert!(valid.is_empty());

        let all = list_rules(db.pool()).await.expect("list rules");
        assert_eq!(all.len(), 1);
        assert!(!all[0].enabled);
    }
}
