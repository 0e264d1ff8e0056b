//! Shared domain types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Source-control platform a rule, token or project belongs to.
///
/// Stored in the database as an uppercase tag (`"GITLAB"`). Only GitLab is
/// supported today; the enum exists so stores and the orchestrator stay
/// source-agnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceType {
    /// GitLab-hosted repositories.
    Gitlab,
}

impl SourceType {
    /// The database / wire tag for this source.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Gitlab => "GITLAB",
        }
    }

    /// Parse a stored tag back into a `SourceType`.
    #[must_use]
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "GITLAB" => Some(Self::Gitlab),
            _ => None,
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
