//! BSD syslog lines without a priority prefix.
//!
//! The host token lands in the level slot. Downstream counting treats it
//! like any other unknown level name.

use regex::Regex;
use std::sync::LazyLock;

use super::record_from_captures;
use crate::types::{LineFormat, LogRecord};

// Mmm dd HH:MM:SS HOSTNAME MSG
static RE_SYSLOG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<ts>[A-Za-z]{3}\s+\d{1,2}\s+\d{2}:\d{2}:\d{2})\s+(?P<level>\S+)\s+(?P<msg>.+)")
        .unwrap()
});

/// Try to parse a line as syslog.
pub fn parse(line: &str, line_number: usize) -> Option<LogRecord> {
    let caps = RE_SYSLOG.captures(line)?;
    Some(record_from_captures(&caps, line_number, LineFormat::Syslog))
}
