//! Property tests over generated log text.

use proptest::prelude::*;

use lt_log_tools::anomaly::{ErrorCategory, classify_errors};
use lt_log_tools::{
    AnalyzeOptions, Finding, LineFormat, LogLevel, SourceStats, aggregate, analyze, parse_line,
};

fn level() -> impl Strategy<Value = &'static str> {
    prop_oneof![Just("ERROR"), Just("WARN"), Just("INFO"), Just("DEBUG")]
}

/// Messages without leading/trailing whitespace.
fn message() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9 ]{0,30}[a-z0-9]"
}

/// One line in one of the recognized shapes, or free text.
fn log_line() -> impl Strategy<Value = String> {
    prop_oneof![
        (0u32..24, 0u32..60, level(), message())
            .prop_map(|(h, m, l, msg)| format!("[2024-05-01 {h:02}:{m:02}:00] [{l}] {msg}")),
        (0u32..24, level(), message()).prop_map(|(h, l, msg)| format!(
            "2024/05/01 {h:02}:00:00 [{}] {msg}",
            l.to_lowercase()
        )),
        (level(), message()).prop_map(|(l, msg)| format!("{l}: {msg}")),
        message(),
    ]
}

fn log_text() -> impl Strategy<Value = String> {
    prop::collection::vec(log_line(), 0..40).prop_map(|lines| lines.join("\n"))
}

/// Line numbers restart per chunk, so compare findings by message.
fn messages(findings: &[Finding]) -> Vec<&str> {
    findings.iter().map(|f| f.message.as_str()).collect()
}

proptest! {
    /// Rendering a bracketed record back to text reproduces it.
    #[test]
    fn bracketed_reparse_is_stable(h in 0u32..24, m in 0u32..60, l in level(), msg in message()) {
        let line = format!("[2024-05-01 {h:02}:{m:02}:00] [{l}] {msg}");
        let record = parse_line(&line, 1);
        prop_assert_eq!(record.format, LineFormat::Bracketed);
        prop_assert_eq!(record.level.clone(), Some(LogLevel::from_raw(l)));
        prop_assert_eq!(&record.message, &msg);

        let rendered = format!(
            "[{}] [{}] {}",
            record.timestamp.as_deref().unwrap(),
            record.level.as_ref().unwrap(),
            record.message
        );
        prop_assert_eq!(parse_line(&rendered, 1), record);
    }

    /// Parsing never panics and always keeps the line number.
    #[test]
    fn parse_is_total(line in "\\PC{0,80}", n in 1usize..10_000) {
        let record = parse_line(&line, n);
        prop_assert_eq!(record.line_number, n);
    }

    /// Findings point at existing lines, in increasing order.
    #[test]
    fn findings_are_ordered_and_bounded(text in log_text()) {
        let stats = analyze(&text, &AnalyzeOptions::default());
        for list in [&stats.errors, &stats.warnings] {
            prop_assert!(list.iter().all(|f| f.line_number >= 1 && f.line_number <= stats.total_lines));
            prop_assert!(list.windows(2).all(|w| w[0].line_number < w[1].line_number));
        }
        prop_assert!(stats.levels.values().sum::<usize>() <= stats.total_lines);
    }

    /// Aggregated counts are the sums of the per-source counts.
    #[test]
    fn aggregation_is_additive(texts in prop::collection::vec(log_text(), 0..5)) {
        let options = AnalyzeOptions::with_patterns(["a", "e"]);
        let sources: Vec<SourceStats> = texts
            .iter()
            .enumerate()
            .map(|(i, t)| SourceStats::analyze(format!("src{i}.log"), t, t.len() as u64, &options))
            .collect();
        let agg = aggregate(&sources);

        prop_assert_eq!(agg.file_count(), sources.len());
        prop_assert_eq!(agg.stats.total_lines, sources.iter().map(|s| s.stats.total_lines).sum::<usize>());
        prop_assert_eq!(agg.stats.errors.len(), sources.iter().map(|s| s.stats.errors.len()).sum::<usize>());
        prop_assert_eq!(agg.stats.warnings.len(), sources.iter().map(|s| s.stats.warnings.len()).sum::<usize>());
        prop_assert_eq!(agg.total_size, sources.iter().map(|s| s.byte_size).sum::<u64>());
        for (level, count) in &agg.stats.levels {
            let expected: usize = sources.iter().map(|s| s.stats.level_count(level)).sum();
            prop_assert_eq!(*count, expected);
        }
        for (pattern, count) in &agg.stats.patterns {
            let expected: usize = sources
                .iter()
                .map(|s| s.stats.patterns.get(pattern).copied().unwrap_or(0))
                .sum();
            prop_assert_eq!(*count, expected);
        }
        prop_assert!(agg.stats.errors.iter().all(|f| f.source.is_some()));
    }

    /// Analyzing a log in two chunks and merging matches analyzing it whole.
    #[test]
    fn split_analysis_matches_whole(
        lines in prop::collection::vec(log_line(), 0..40),
        cut in any::<prop::sample::Index>(),
    ) {
        let at = cut.index(lines.len() + 1);
        let whole_text = lines.join("\n");
        let head = lines[..at].join("\n");
        let tail = lines[at..].join("\n");
        let options = AnalyzeOptions::with_patterns(["a", "e", "0"]);

        let whole = analyze(&whole_text, &options);
        let merged = aggregate(&[
            SourceStats::analyze("head.log", &head, head.len() as u64, &options),
            SourceStats::analyze("tail.log", &tail, tail.len() as u64, &options),
        ]);

        prop_assert_eq!(merged.stats.total_lines, whole.total_lines);
        prop_assert_eq!(&merged.stats.levels, &whole.levels);
        prop_assert_eq!(&merged.stats.patterns, &whole.patterns);
        prop_assert_eq!(messages(&merged.stats.errors), messages(&whole.errors));
        prop_assert_eq!(messages(&merged.stats.warnings), messages(&whole.warnings));
        prop_assert_eq!(merged.stats.time_range, whole.time_range);
    }

    /// Every error lands in exactly one category.
    #[test]
    fn classification_is_exclusive(messages in prop::collection::vec("\\PC{0,40}", 0..30)) {
        let errors: Vec<Finding> = messages
            .iter()
            .enumerate()
            .map(|(i, m)| Finding {
                line_number: i + 1,
                timestamp: None,
                message: m.clone(),
                source: None,
            })
            .collect();
        let classification = classify_errors(&errors);

        prop_assert_eq!(classification.total(), errors.len());
        prop_assert_eq!(classification.iter().count(), ErrorCategory::ALL.len());
        for error in &errors {
            let homes = classification
                .iter()
                .filter(|(_, findings)| findings.iter().any(|f| f.line_number == error.line_number))
                .count();
            prop_assert_eq!(homes, 1);
        }
    }
}
