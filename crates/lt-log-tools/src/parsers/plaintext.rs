//! Bare `LEVEL: message` lines and the unparsed fallback.

use regex::Regex;
use std::sync::LazyLock;

use super::record_from_captures;
use crate::types::{LineFormat, LogRecord};

static RE_BARE_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?P<level>ERROR|WARN|INFO|DEBUG):\s*(?P<msg>.+)").unwrap());

/// `ERROR: message` (case-insensitive); carries no timestamp.
pub fn parse_bare_prefix(line: &str, line_number: usize) -> Option<LogRecord> {
    let caps = RE_BARE_PREFIX.captures(line)?;
    Some(record_from_captures(&caps, line_number, LineFormat::BarePrefix))
}

/// Fallback record for lines no rule understands.
pub fn unparsed(line: &str, line_number: usize) -> LogRecord {
    LogRecord {
        timestamp: None,
        level: None,
        message: line.trim().to_string(),
        line_number,
        format: LineFormat::Unparsed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LogLevel;

    #[test]
    fn bare_prefix_any_case() {
        let r = parse_bare_prefix("Warn: low disk", 2).unwrap();
        assert_eq!(r.level, Some(LogLevel::Warn));
        assert_eq!(r.message, "low disk");
        assert_eq!(r.timestamp, None);
    }

    #[test]
    fn warning_word_is_not_a_bare_prefix() {
        assert!(parse_bare_prefix("WARNING: deprecated flag", 1).is_none());
    }

    #[test]
    fn prefix_needs_colon() {
        assert!(parse_bare_prefix("ERROR something", 1).is_none());
    }

    #[test]
    fn unparsed_fallback() {
        let r = unparsed("\tstack frame 3\t", 5);
        assert_eq!(r.message, "stack frame 3");
        assert_eq!(r.format, LineFormat::Unparsed);
    }
}
