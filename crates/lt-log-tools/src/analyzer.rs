//! Single-source analysis: level counts, findings, pattern hits and time range.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::parsers;
use crate::types::{Finding, LogRecord, Stats, TimeRange};

/// Options for [`analyze`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalyzeOptions {
    /// Literal substrings counted per line (not regexes).
    #[serde(default)]
    pub patterns: BTreeSet<String>,
}

impl AnalyzeOptions {
    pub fn with_patterns<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            patterns: patterns.into_iter().map(Into::into).collect(),
        }
    }
}

/// Analyze the full text of one source.
pub fn analyze(text: &str, options: &AnalyzeOptions) -> Stats {
    let mut stats = Stats::default();
    let mut instants = Vec::new();

    for line in text.split('\n') {
        if line.trim().is_empty() {
            continue;
        }
        stats.total_lines += 1;
        let record = parsers::parse_line(line, stats.total_lines);

        if let Some(level) = &record.level {
            *stats.levels.entry(level.as_str().to_string()).or_default() += 1;
            if level.is_error() {
                stats.errors.push(Finding::from_record(&record));
            } else if level.is_warning() {
                stats.warnings.push(Finding::from_record(&record));
            }
        }

        if let Some(ts) = record.instant() {
            instants.push(ts);
        }

        for pattern in &options.patterns {
            if line.contains(pattern.as_str()) {
                *stats.patterns.entry(pattern.clone()).or_default() += 1;
            }
        }
    }

    stats.time_range = TimeRange::spanning(instants);

    tracing::debug!(
        total_lines = stats.total_lines,
        errors = stats.errors.len(),
        warnings = stats.warnings.len(),
        has_time_range = stats.time_range.is_some(),
        "source analyzed"
    );
    stats
}

/// The numbered records `analyze` sees, for callers that need trends.
pub fn records(text: &str) -> Vec<LogRecord> {
    parsers::parse_text(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
[2024-02-11 18:00:00] [INFO] service started
[2024-02-11 18:00:05] [WARNING] cache miss ratio high

[2024-02-11 18:01:00] [ERROR] db timeout on orders
2024/02/11 18:02:00 [warn] upstream slow
just some text
ERROR: disk full
[2024-02-11 18:03:30] [DEBUG] gc pause
";

    #[test]
    fn counts_lines_and_levels() {
        let stats = analyze(SAMPLE, &AnalyzeOptions::default());
        assert_eq!(stats.total_lines, 7);
        assert_eq!(stats.level_count("INFO"), 1);
        assert_eq!(stats.level_count("WARNING"), 1);
        assert_eq!(stats.level_count("WARN"), 1);
        assert_eq!(stats.level_count("ERROR"), 2);
        assert_eq!(stats.level_count("DEBUG"), 1);
    }

    #[test]
    fn routes_findings_by_prefix() {
        let stats = analyze(SAMPLE, &AnalyzeOptions::default());
        let error_lines: Vec<_> = stats.errors.iter().map(|f| f.line_number).collect();
        assert_eq!(error_lines, vec![3, 6]);
        let warn_lines: Vec<_> = stats.warnings.iter().map(|f| f.line_number).collect();
        assert_eq!(warn_lines, vec![2, 4]);
        assert_eq!(stats.errors[1].message, "disk full");
        assert_eq!(stats.errors[1].timestamp, None);
    }

    #[test]
    fn time_range_spans_valid_timestamps() {
        let stats = analyze(SAMPLE, &AnalyzeOptions::default());
        let range = stats.time_range.unwrap();
        assert_eq!(range.start.to_rfc3339(), "2024-02-11T18:00:00+00:00");
        assert_eq!(range.end.to_rfc3339(), "2024-02-11T18:03:30+00:00");
        assert_eq!(range.duration_ms, 210_000);
    }

    #[test]
    fn invalid_timestamp_keeps_finding_but_not_range() {
        let text = "[2024-99-99 xx] [ERROR] broken clock\n[2024-01-01 00:00:00] [INFO] ok";
        let stats = analyze(text, &AnalyzeOptions::default());
        assert_eq!(stats.errors.len(), 1);
        assert_eq!(stats.errors[0].timestamp.as_deref(), Some("2024-99-99 xx"));
        let range = stats.time_range.unwrap();
        assert_eq!(range.start, range.end);
        assert_eq!(range.duration_ms, 0);
    }

    #[test]
    fn no_timestamps_means_no_range() {
        let stats = analyze("ERROR: a\nINFO: b", &AnalyzeOptions::default());
        assert!(stats.time_range.is_none());
    }

    #[test]
    fn pattern_counts_are_substring_per_line() {
        let opts = AnalyzeOptions::with_patterns(["timeout", "db", "a.b"]);
        let text = "ERROR: db timeout\nINFO: db ok\nINFO: timeout timeout\nINFO: axb";
        let stats = analyze(text, &opts);
        assert_eq!(stats.patterns.get("timeout"), Some(&2));
        assert_eq!(stats.patterns.get("db"), Some(&2));
        assert_eq!(stats.patterns.get("a.b"), None);
    }

    #[test]
    fn syslog_host_counts_as_level() {
        let stats = analyze(
            "Feb 11 18:00:00 web01 sshd: accepted\nFeb 11 18:00:01 web01 cron: run",
            &AnalyzeOptions::default(),
        );
        assert_eq!(stats.level_count("WEB01"), 2);
        assert!(stats.errors.is_empty());
    }

    #[test]
    fn blank_input() {
        let stats = analyze("\n  \n\t\n", &AnalyzeOptions::default());
        assert_eq!(stats, Stats::default());
    }

    #[test]
    fn records_share_line_numbers_with_findings() {
        let stats = analyze(SAMPLE, &AnalyzeOptions::default());
        let recs = records(SAMPLE);
        assert_eq!(recs.len(), stats.total_lines);
        for finding in &stats.errors {
            assert_eq!(recs[finding.line_number - 1].message, finding.message);
        }
    }
}
