//! API token storage.
//!
//! The scanner always uses the first enabled token for a source type; there
//! is no rotation strategy.

use crate::error::Result;
use sqlx::{Pool, Sqlite};

use leakscout_core::SourceType;

/// An API credential for a source platform.
#[derive(Debug, Clone)]
pub struct Token {
    /// Row id
    pub id: i64,
    /// Source platform this token authenticates against
    pub source_type: String,
    /// The raw token value
    pub token: String,
    /// Whether the token may be used
    pub enabled: bool,
}

/// Load all enabled tokens for a source type, in insertion order.
pub async fn list_valid_tokens(
    pool: &Pool<Sqlite>,
    source_type: SourceType,
) -> Result<Vec<Token>> {
    let rows = sqlx::query_as::<_, (i64, String, String, i64)>(
        "SELECT id, source_type, token, enabled
         FROM tokens
         WHERE source_type = ? AND enabled = 1
         ORDER BY id",
    )
    .bind(source_type.as_str())
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(id, source_type, token, enabled)| Token {
            id,
            source_type,
            token,
            enabled: enabled != 0,
        })
        .collect())
}

/// Insert a new enabled token, returning its row id.
pub async fn insert_token(
    pool: &Pool<Sqlite>,
    token: &str,
    source_type: SourceType,
) -> Result<i64> {
    let result = sqlx::query("INSERT INTO tokens (source_type, token, enabled) VALUES (?, ?, 1)")
        .bind(source_type.as_str())
        .bind(token)
        .execute(pool)
        .await?;

    Ok(result.last_insert_rowid())
}
