//! Bracketed-level formats: application logs and nginx-style error logs.

use regex::Regex;
use std::sync::LazyLock;

use super::record_from_captures;
use crate::types::{LineFormat, LogRecord};

// [2024-02-11 18:00:00] [INFO] message
static RE_BRACKETED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\[(?P<ts>\d{4}-\d{2}-\d{2}[^\]]+)\]\s+\[(?P<level>[A-Z]+)\]\s+(?P<msg>.+)")
        .unwrap()
});

// 2024/02/11 18:00:00 [info] message
static RE_SLASH_DATED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?P<ts>\d{4}/\d{2}/\d{2}(?:[ T]\d{2}:\d{2}(?::\d{2}(?:[.,]\d+)?)?)?)\s+\[(?P<level>[a-z]+)\]\s+(?P<msg>.+)",
    )
    .unwrap()
});

/// `[<date-time>] [<LEVEL>] <message>`; the level must be upper case.
pub fn parse_bracketed(line: &str, line_number: usize) -> Option<LogRecord> {
    let caps = RE_BRACKETED.captures(line)?;
    Some(record_from_captures(&caps, line_number, LineFormat::Bracketed))
}

/// `<yyyy/mm/dd ...> [<level>] <message>`; level in any case.
pub fn parse_slash_dated(line: &str, line_number: usize) -> Option<LogRecord> {
    let caps = RE_SLASH_DATED.captures(line)?;
    Some(record_from_captures(&caps, line_number, LineFormat::SlashDated))
}
