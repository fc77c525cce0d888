//! Keyword classification of errors into a fixed taxonomy.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::Finding;

// ── Known error categories ────────────────────────────────────

/// Error category. Declaration order is the match priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCategory {
    Database,
    Network,
    Authentication,
    FileSystem,
    Memory,
    Validation,
    Other,
}

impl ErrorCategory {
    pub const ALL: [ErrorCategory; 7] = [
        Self::Database,
        Self::Network,
        Self::Authentication,
        Self::FileSystem,
        Self::Memory,
        Self::Validation,
        Self::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Database => "DATABASE",
            Self::Network => "NETWORK",
            Self::Authentication => "AUTHENTICATION",
            Self::FileSystem => "FILE_SYSTEM",
            Self::Memory => "MEMORY",
            Self::Validation => "VALIDATION",
            Self::Other => "OTHER",
        }
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Keywords are matched as lower-case substrings; overlapping keywords
/// (e.g. "connection", "permission") go to the earlier category.
const CATEGORY_KEYWORDS: &[(ErrorCategory, &[&str])] = &[
    (
        ErrorCategory::Database,
        &[
            "database", "db", "sql", "query", "connection", "timeout", "mysql", "postgres",
            "mongodb",
        ],
    ),
    (
        ErrorCategory::Network,
        &[
            "network", "socket", "connection", "timeout", "dns", "http", "request", "api",
        ],
    ),
    (
        ErrorCategory::Authentication,
        &[
            "auth", "login", "token", "permission", "denied", "forbidden", "unauthorized",
        ],
    ),
    (
        ErrorCategory::FileSystem,
        &[
            "file", "directory", "path", "not found", "permission", "disk", "storage",
        ],
    ),
    (
        ErrorCategory::Memory,
        &["memory", "heap", "out of memory", "oom", "allocation"],
    ),
    (
        ErrorCategory::Validation,
        &["validation", "invalid", "format", "type", "schema", "required"],
    ),
];

/// Category for a single message.
pub fn classify_message(message: &str) -> ErrorCategory {
    let lower = message.to_lowercase();
    CATEGORY_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)))
        .map_or(ErrorCategory::Other, |(category, _)| *category)
}

// ── Classification ────────────────────────────────────────────

/// Errors bucketed by category; every category is present, possibly empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Classification(BTreeMap<ErrorCategory, Vec<Finding>>);

impl Default for Classification {
    fn default() -> Self {
        Self(ErrorCategory::ALL.iter().map(|c| (*c, Vec::new())).collect())
    }
}

impl Classification {
    pub fn get(&self, category: ErrorCategory) -> &[Finding] {
        self.0.get(&category).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Categories in priority order with their findings.
    pub fn iter(&self) -> impl Iterator<Item = (ErrorCategory, &[Finding])> {
        self.0.iter().map(|(c, v)| (*c, v.as_slice()))
    }

    /// Number of classified findings across all categories.
    pub fn total(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }
}

/// Assign each error to exactly one category.
pub fn classify_errors(errors: &[Finding]) -> Classification {
    let mut classification = Classification::default();
    for error in errors {
        classification
            .0
            .entry(classify_message(&error.message))
            .or_default()
            .push(error.clone());
    }
    classification
}
