//! Line parsing with an ordered set of format rules.
//!
//! Rules are tried in priority order and the first match wins. A line
//! that matches nothing still yields a record carrying the trimmed text.

pub mod bracketed;
pub mod plaintext;
pub mod syslog;

use regex::Captures;

use crate::types::{LineFormat, LogLevel, LogRecord};

type LineRule = fn(&str, usize) -> Option<LogRecord>;

/// Priority order matters: a bracketed line can also look like a bare
/// prefix line further down the message.
const RULES: &[LineRule] = &[
    bracketed::parse_bracketed,
    bracketed::parse_slash_dated,
    syslog::parse,
    plaintext::parse_bare_prefix,
];

/// Parse a single line. Never fails.
pub fn parse_line(line: &str, line_number: usize) -> LogRecord {
    RULES
        .iter()
        .find_map(|rule| rule(line, line_number))
        .unwrap_or_else(|| plaintext::unparsed(line, line_number))
}

/// Parse every non-blank line of `text`, numbering them 1, 2, 3, …
///
/// Blank lines are dropped before numbering, matching the line numbers
/// the analyzer assigns to findings.
pub fn parse_text(text: &str) -> Vec<LogRecord> {
    text.split('\n')
        .filter(|l| !l.trim().is_empty())
        .enumerate()
        .map(|(i, line)| parse_line(line, i + 1))
        .collect()
}

/// Build a record from a rule regex using the `ts`, `level` and `msg` groups.
pub(crate) fn record_from_captures(
    caps: &Captures<'_>,
    line_number: usize,
    format: LineFormat,
) -> LogRecord {
    LogRecord {
        timestamp: caps.name("ts").map(|m| m.as_str().to_string()),
        level: caps.name("level").map(|m| LogLevel::from_raw(m.as_str())),
        message: caps
            .name("msg")
            .map(|m| m.as_str().trim_end().to_string())
            .unwrap_or_default(),
        line_number,
        format,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bracketed_wins_over_bare_prefix() {
        let r = parse_line("[2024-02-11 18:00:00] [INFO] ERROR: nested", 1);
        assert_eq!(r.format, LineFormat::Bracketed);
        assert_eq!(r.level, Some(LogLevel::Info));
        assert_eq!(r.message, "ERROR: nested");
    }

    #[test]
    fn each_rule_is_reachable() {
        let cases = [
            ("[2024-02-11 18:00:00] [WARN] disk", LineFormat::Bracketed),
            ("2024/02/11 18:00:00 [error] 12#0: upstream", LineFormat::SlashDated),
            ("Feb 11 18:00:00 web01 sshd started", LineFormat::Syslog),
            ("debug: cache warm", LineFormat::BarePrefix),
            ("free text", LineFormat::Unparsed),
        ];
        for (line, expected) in cases {
            assert_eq!(parse_line(line, 1).format, expected, "line: {line}");
        }
    }

    #[test]
    fn unparsed_keeps_trimmed_line() {
        let r = parse_line("   just text   ", 4);
        assert_eq!(r.timestamp, None);
        assert_eq!(r.level, None);
        assert_eq!(r.message, "just text");
        assert_eq!(r.line_number, 4);
    }

    #[test]
    fn parsing_is_idempotent() {
        let line = "2024/02/11 18:00:00 [warn] slow upstream";
        assert_eq!(parse_line(line, 7), parse_line(line, 7));
    }

    #[test]
    fn parse_text_skips_blank_lines() {
        let records = parse_text("INFO: a\n\n   \nERROR: b\r\n");
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].line_number, 2);
        assert_eq!(records[1].message, "b");
    }
}
