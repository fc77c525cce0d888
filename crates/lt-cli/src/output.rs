//! Human-readable terminal rendering.
//!
//! Every renderer returns a `String` so callers decide where it goes;
//! colour follows `colored`'s global override (disabled when stdout is
//! not a terminal or `NO_COLOR` is set).

use std::fmt::Write;

use colored::{ColoredString, Colorize};
use lt_log_tools::types::{LevelColor, level_info};
use lt_log_tools::{AggregatedStats, Anomaly, AnomalyReport, Finding, LogRecord, SearchHit, Stats};

use crate::archive::{ArchiveStats, ArchiveSummary};

fn paint(text: &str, color: LevelColor) -> ColoredString {
    match color {
        LevelColor::Red => text.red(),
        LevelColor::Yellow => text.yellow(),
        LevelColor::Cyan => text.cyan(),
        LevelColor::Gray => text.bright_black(),
    }
}

/// Colour a level name by the level table; unknown levels are gray.
fn level_label(level: &str) -> ColoredString {
    let color = level_info(level).map_or(LevelColor::Gray, |i| i.color);
    paint(level, color)
}

/// `1h 2m 3s` style duration; sub-second spans print in milliseconds.
pub fn humanize(duration: chrono::Duration) -> String {
    let ms = duration.num_milliseconds();
    if ms < 1000 {
        return format!("{ms}ms");
    }
    let secs = ms / 1000;
    let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    match (h, m) {
        (0, 0) => format!("{s}s"),
        (0, _) => format!("{m}m {s}s"),
        _ => format!("{h}h {m}m {s}s"),
    }
}

/// Byte count in the largest binary unit that keeps it at or above 1.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.1} {}", UNITS[unit])
}

fn limited<T>(items: &[T], limit: Option<usize>) -> &[T] {
    match limit {
        Some(n) if n < items.len() => &items[..n],
        _ => items,
    }
}

fn findings_section(
    out: &mut String,
    title: &str,
    findings: &[Finding],
    color: LevelColor,
    limit: Option<usize>,
) {
    if findings.is_empty() {
        return;
    }
    let _ = writeln!(out, "{}", paint(&format!("{title} ({}):", findings.len()), color).bold());
    for f in limited(findings, limit) {
        let location = match &f.source {
            Some(src) => format!("{src}:{}", f.line_number),
            None => f.line_number.to_string(),
        };
        let _ = writeln!(out, "  {} {}", format!("[{location}]").dimmed(), paint(&f.message, color));
    }
    if let Some(hidden) = limit.and_then(|n| findings.len().checked_sub(n)).filter(|&h| h > 0) {
        let _ = writeln!(out, "  {}", format!("... {hidden} more").dimmed());
    }
    out.push('\n');
}

/// Summary of one analyzed source.
pub fn render_stats(stats: &Stats, limit: Option<usize>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} {}", "Total lines:".bold(), stats.total_lines);
    if let Some(range) = &stats.time_range {
        let _ = writeln!(
            out,
            "{} {} .. {} ({})",
            "Time range:".bold(),
            range.start.format("%Y-%m-%d %H:%M:%S"),
            range.end.format("%Y-%m-%d %H:%M:%S"),
            humanize(range.duration())
        );
    }
    out.push('\n');

    if !stats.levels.is_empty() {
        let _ = writeln!(out, "{}", "Levels:".cyan().bold());
        let mut levels: Vec<_> = stats.levels.iter().collect();
        levels.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
        for (level, count) in levels {
            let _ = writeln!(out, "  {} {count}", level_label(&format!("{level:<10}")));
        }
        out.push('\n');
    }

    findings_section(&mut out, "Errors", &stats.errors, LevelColor::Red, limit);
    findings_section(&mut out, "Warnings", &stats.warnings, LevelColor::Yellow, limit);

    if !stats.patterns.is_empty() {
        let _ = writeln!(out, "{}", "Patterns:".cyan().bold());
        for (pattern, count) in &stats.patterns {
            let _ = writeln!(out, "  \"{pattern}\": {count}");
        }
        out.push('\n');
    }
    out
}

/// Per-file table followed by the merged summary.
pub fn render_aggregate(agg: &AggregatedStats, limit: Option<usize>) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} {} files, {} bytes",
        "Aggregated:".bold(),
        agg.file_count(),
        agg.total_size
    );
    for file in &agg.files {
        let _ = writeln!(
            out,
            "  {}  lines={} errors={} warnings={} size={}",
            file.source_id,
            file.stats.total_lines,
            file.stats.errors.len().to_string().red(),
            file.stats.warnings.len().to_string().yellow(),
            file.byte_size
        );
    }
    out.push('\n');
    out.push_str(&render_stats(&agg.stats, limit));
    out
}

/// Search hits, one per line.
pub fn render_search(query: &str, hits: &[SearchHit], limit: Option<usize>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", format!("Search \"{query}\": {} hits", hits.len()).cyan());
    for hit in limited(hits, limit) {
        let level = hit
            .level
            .as_ref()
            .map(|l| level_label(l.as_str()).to_string())
            .unwrap_or_default();
        let _ = writeln!(
            out,
            "{} {} {level} {}",
            format!("[{}]", hit.line_number).dimmed(),
            hit.timestamp.as_deref().unwrap_or("-").dimmed(),
            hit.message
        );
    }
    if let Some(hidden) = limit.and_then(|n| hits.len().checked_sub(n)).filter(|&h| h > 0) {
        let _ = writeln!(out, "{}", format!("... {hidden} more").dimmed());
    }
    out
}

/// Anomalies and, when present, the error classification.
pub fn render_report(report: &AnomalyReport) -> String {
    let mut out = String::new();
    if report.is_empty() {
        let _ = writeln!(out, "{}", "No anomalies detected".green());
    } else {
        let _ = writeln!(
            out,
            "{}",
            format!(
                "Anomalies ({}, {} high):",
                report.anomalies.len(),
                report.high_severity_count()
            )
            .bold()
        );
        for anomaly in &report.anomalies {
            let severity = anomaly.severity().as_str();
            let badge = match anomaly.severity() {
                lt_log_tools::Severity::High => severity.red().bold(),
                lt_log_tools::Severity::Medium => severity.yellow(),
            };
            let kind = match anomaly {
                Anomaly::ErrorSpike(_) => "spike",
                Anomaly::RepeatedError(_) => "repeat",
                Anomaly::Trend(_) => "trend",
            };
            let _ = writeln!(out, "  [{badge}] {kind:<6} {}", anomaly.message());
            let lines = anomaly.affected_lines();
            if !lines.is_empty() {
                let joined: Vec<String> = lines.iter().map(ToString::to_string).collect();
                let _ = writeln!(out, "           {}", format!("lines {}", joined.join(",")).dimmed());
            }
        }
    }

    if let Some(classification) = &report.classification {
        out.push('\n');
        let _ = writeln!(out, "{}", "Error categories:".cyan().bold());
        for (category, findings) in classification.iter().filter(|(_, f)| !f.is_empty()) {
            let _ = writeln!(out, "  {:<16} {}", category.as_str(), findings.len());
        }
    }
    out
}

/// One tailed record: timestamp, coloured level, message.
pub fn render_record(record: &LogRecord) -> String {
    let level = record
        .level
        .as_ref()
        .map(|l| level_label(l.as_str()).to_string())
        .unwrap_or_default();
    format!(
        "{} {level} {}",
        record.timestamp.as_deref().unwrap_or("-").dimmed(),
        record.message
    )
}

pub fn render_archive_summary(summary: &ArchiveSummary) -> String {
    let mut out = String::new();
    let verb = if summary.dry_run { "Would archive" } else { "Archived" };
    for entry in &summary.archived {
        let _ = writeln!(
            out,
            "  {} -> {} ({})",
            entry.original.display(),
            entry.archive_path.display(),
            format_bytes(entry.original_size)
        );
    }
    for (path, reason) in &summary.skipped {
        let _ = writeln!(out, "  {} {} ({reason})", "skipped".yellow(), path.display());
    }
    for (path, error) in &summary.failed {
        let _ = writeln!(out, "  {} {}: {error:#}", "failed".red(), path.display());
    }

    let _ = writeln!(
        out,
        "{} {} files, {}",
        format!("{verb}:").as_str().bold(),
        summary.archived.len(),
        format_bytes(summary.original_size())
    );
    if let Some(ratio) = summary.compression_ratio() {
        let _ = writeln!(
            out,
            "Archive size: {} ({ratio:.1}% saved)",
            format_bytes(summary.archive_size())
        );
    }
    if !summary.dry_run {
        let removed = summary.archived.iter().filter(|a| a.original_removed).count();
        if removed > 0 {
            let _ = writeln!(out, "Removed {removed} original files");
        }
    }
    out
}

/// `stats` is `None` when the directory does not exist.
pub fn render_archive_stats(dir: &std::path::Path, stats: Option<&ArchiveStats>) -> String {
    let Some(stats) = stats else {
        return format!("No archive directory at {}\n", dir.display());
    };
    let mut out = String::new();
    let _ = writeln!(out, "{} {}", "Archive:".bold(), dir.display());
    let _ = writeln!(out, "  Files:      {} ({} compressed)", stats.file_count, stats.compressed_count);
    let _ = writeln!(out, "  Total size: {}", format_bytes(stats.total_size));
    let _ = writeln!(out, "  Average:    {}", format_bytes(stats.average_size()));
    out
}
