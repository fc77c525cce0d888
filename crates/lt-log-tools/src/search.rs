//! Case-insensitive substring search over raw log text.

use serde::{Deserialize, Serialize};

use crate::parsers;
use crate::types::LogLevel;

/// One matching line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    /// 1-based position in the raw text, blank lines included.
    pub line_number: usize,
    pub timestamp: Option<String>,
    pub level: Option<LogLevel>,
    pub message: String,
}

/// Return every line containing `query`, ignoring case.
pub fn search(text: &str, query: &str) -> Vec<SearchHit> {
    let needle = query.to_lowercase();
    text.split('\n')
        .enumerate()
        .filter(|(_, line)| line.to_lowercase().contains(&needle))
        .map(|(i, line)| {
            let record = parsers::parse_line(line, i + 1);
            SearchHit {
                line_number: record.line_number,
                timestamp: record.timestamp,
                level: record.level,
                message: record.message,
            }
        })
        .collect()
}
