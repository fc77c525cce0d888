//! Core log triage types: levels, parsed records, findings and statistics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::timestamp;

// ── Log Level ─────────────────────────────────────────────────

/// Normalized (upper-cased) level captured by the line parser.
///
/// Anything outside the known names is kept verbatim in `Other`; the
/// syslog rule puts the host token there.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum LogLevel {
    Error,
    Warn,
    Warning,
    Info,
    Debug,
    Other(String),
}

impl LogLevel {
    /// Normalize raw level text (case-insensitive).
    pub fn from_raw(raw: &str) -> Self {
        let upper = raw.trim().to_uppercase();
        match upper.as_str() {
            "ERROR" => Self::Error,
            "WARN" => Self::Warn,
            "WARNING" => Self::Warning,
            "INFO" => Self::Info,
            "DEBUG" => Self::Debug,
            _ => Self::Other(upper),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Error => "ERROR",
            Self::Warn => "WARN",
            Self::Warning => "WARNING",
            Self::Info => "INFO",
            Self::Debug => "DEBUG",
            Self::Other(s) => s,
        }
    }

    /// Routed to the error list (prefix match, so `ERRORS` counts too).
    pub fn is_error(&self) -> bool {
        self.as_str().starts_with("ERROR")
    }

    /// Routed to the warning list; covers both `WARN` and `WARNING`.
    pub fn is_warning(&self) -> bool {
        self.as_str().starts_with("WARN")
    }

    /// Metadata from the level table, `None` for unknown levels.
    pub fn info(&self) -> Option<&'static LevelInfo> {
        level_info(self.as_str())
    }

    /// Severity weight (1 = most severe); 0 when the level is unknown.
    pub fn weight(&self) -> u8 {
        self.info().map_or(0, |i| i.weight)
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for LogLevel {
    fn from(s: String) -> Self {
        Self::from_raw(&s)
    }
}

impl From<LogLevel> for String {
    fn from(level: LogLevel) -> Self {
        level.as_str().to_string()
    }
}

// ── Level Table ───────────────────────────────────────────────

/// Display colour associated with a level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelColor {
    Red,
    Yellow,
    Cyan,
    Gray,
}

/// Static metadata for a known level name.
#[derive(Debug, PartialEq, Eq)]
pub struct LevelInfo {
    pub name: &'static str,
    pub weight: u8,
    pub color: LevelColor,
}

/// Known levels, looked up in this order.
pub static LEVEL_TABLE: [LevelInfo; 5] = [
    LevelInfo { name: "ERROR", weight: 1, color: LevelColor::Red },
    LevelInfo { name: "WARN", weight: 2, color: LevelColor::Yellow },
    LevelInfo { name: "WARNING", weight: 2, color: LevelColor::Yellow },
    LevelInfo { name: "INFO", weight: 3, color: LevelColor::Cyan },
    LevelInfo { name: "DEBUG", weight: 4, color: LevelColor::Gray },
];

/// Exact-or-prefix lookup of an upper-case level name.
pub fn level_info(name: &str) -> Option<&'static LevelInfo> {
    LEVEL_TABLE
        .iter()
        .find(|info| name == info.name || name.starts_with(info.name))
}

// ── Line Format ───────────────────────────────────────────────

/// Which line rule produced a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineFormat {
    /// `[2024-02-11 18:00:00] [INFO] message`
    Bracketed,
    /// `2024/02/11 18:00:00 [info] message` (nginx error log style)
    SlashDated,
    /// `Feb 11 18:00:00 host message`
    Syslog,
    /// `ERROR: message`
    BarePrefix,
    /// No rule matched.
    Unparsed,
}

// ── Log Record ────────────────────────────────────────────────

/// One parsed line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogRecord {
    /// Timestamp text as it appeared in the line.
    pub timestamp: Option<String>,
    pub level: Option<LogLevel>,
    pub message: String,
    /// 1-based line number.
    pub line_number: usize,
    pub format: LineFormat,
}

impl LogRecord {
    /// The timestamp as an instant, if it parses.
    pub fn instant(&self) -> Option<DateTime<Utc>> {
        self.timestamp.as_deref().and_then(timestamp::parse_instant)
    }
}

// ── Finding ───────────────────────────────────────────────────

/// An extracted error or warning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    #[serde(rename = "line")]
    pub line_number: usize,
    pub timestamp: Option<String>,
    pub message: String,
    /// Originating source, attached during aggregation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl Finding {
    pub(crate) fn from_record(record: &LogRecord) -> Self {
        Self {
            line_number: record.line_number,
            timestamp: record.timestamp.clone(),
            message: record.message.clone(),
            source: None,
        }
    }

    pub fn instant(&self) -> Option<DateTime<Utc>> {
        self.timestamp.as_deref().and_then(timestamp::parse_instant)
    }
}

// ── Time Range ────────────────────────────────────────────────

/// Span covered by the valid timestamps of a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// `end - start` in milliseconds.
    #[serde(rename = "duration")]
    pub duration_ms: i64,
}

impl TimeRange {
    /// Min/max over `instants`; `None` when empty.
    pub fn spanning<I>(instants: I) -> Option<Self>
    where
        I: IntoIterator<Item = DateTime<Utc>>,
    {
        let mut iter = instants.into_iter();
        let first = iter.next()?;
        let (start, end) = iter.fold((first, first), |(lo, hi), t| (lo.min(t), hi.max(t)));
        Some(Self {
            start,
            end,
            duration_ms: (end - start).num_milliseconds(),
        })
    }

    pub fn duration(&self) -> chrono::Duration {
        self.end - self.start
    }
}

// ── Stats ─────────────────────────────────────────────────────

/// Per-source analysis result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub total_lines: usize,
    /// Occurrences per normalized level name.
    pub levels: BTreeMap<String, usize>,
    pub errors: Vec<Finding>,
    pub warnings: Vec<Finding>,
    /// Matching line count per literal pattern (only patterns that hit).
    pub patterns: BTreeMap<String, usize>,
    pub time_range: Option<TimeRange>,
}

impl Stats {
    pub fn level_count(&self, level: &str) -> usize {
        self.levels.get(level).copied().unwrap_or(0)
    }
}
