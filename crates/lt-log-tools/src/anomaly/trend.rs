//! Level trend detection: compare ERROR/WARN counts between the first
//! and second half of a chronologically sorted record set.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Severity;
use crate::types::{LogLevel, LogRecord};

/// Fewer timestamped records than this produce no trends.
pub const MIN_TREND_RECORDS: usize = 10;

/// Absolute percentage change a level must exceed to be reported.
pub const TREND_CHANGE_THRESHOLD: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TrendLevel {
    Error,
    Warn,
}

impl TrendLevel {
    fn matches(&self, level: Option<&LogLevel>) -> bool {
        matches!(
            (self, level),
            (Self::Error, Some(LogLevel::Error)) | (Self::Warn, Some(LogLevel::Warn))
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trend {
    pub level: TrendLevel,
    pub direction: TrendDirection,
    /// Rising errors are `HIGH`; every other trend is `MEDIUM`.
    pub severity: Severity,
    /// Absolute change, rounded to two decimals.
    pub change_percent: f64,
    pub first_half: usize,
    pub second_half: usize,
    pub message: String,
}

/// Detect ERROR and WARN trends over records with parseable timestamps.
///
/// Records are stably sorted by time and split at `len / 2`; on odd
/// counts the extra record goes to the second half. Only the exact
/// `ERROR` and `WARN` levels are counted.
pub fn detect_level_trends(records: &[LogRecord]) -> Vec<Trend> {
    let mut timed: Vec<_> = records
        .iter()
        .filter_map(|r| r.instant().map(|t| (t, r)))
        .collect();
    if timed.len() < MIN_TREND_RECORDS {
        return Vec::new();
    }
    timed.sort_by_key(|(t, _)| *t);

    let mid = timed.len() / 2;
    let (first, second) = timed.split_at(mid);

    [TrendLevel::Error, TrendLevel::Warn]
        .into_iter()
        .filter_map(|level| trend_for(level, count_level(first, level), count_level(second, level)))
        .collect()
}

fn count_level(half: &[(DateTime<Utc>, &LogRecord)], level: TrendLevel) -> usize {
    half.iter()
        .filter(|(_, r)| level.matches(r.level.as_ref()))
        .count()
}

fn trend_for(level: TrendLevel, first_half: usize, second_half: usize) -> Option<Trend> {
    let change = (second_half as f64 - first_half as f64) / first_half.max(1) as f64 * 100.0;
    if change.abs() <= TREND_CHANGE_THRESHOLD {
        return None;
    }

    let direction = if change > 0.0 {
        TrendDirection::Increasing
    } else {
        TrendDirection::Decreasing
    };
    let change_percent = (change.abs() * 100.0).round() / 100.0;
    let noun = match level {
        TrendLevel::Error => "error",
        TrendLevel::Warn => "warning",
    };
    let verb = match direction {
        TrendDirection::Increasing => "rose",
        TrendDirection::Decreasing => "fell",
    };
    let severity = match (level, direction) {
        (TrendLevel::Error, TrendDirection::Increasing) => Severity::High,
        _ => Severity::Medium,
    };

    Some(Trend {
        level,
        direction,
        severity,
        change_percent,
        first_half,
        second_half,
        message: format!("{noun} rate {verb} {change_percent:.2}% ({first_half} -> {second_half})"),
    })
}
