//! Machine-readable export of analysis results.

use std::path::Path;

use anyhow::Context;
use clap::ValueEnum;
use lt_log_tools::{Anomaly, AnomalyReport, Finding, Stats};
use serde::Serialize;

/// Export format for `--format`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum ExportFormat {
    /// Pretty-printed JSON
    #[default]
    Json,
    /// Comma-separated blocks: levels, findings, patterns
    Csv,
}

impl ExportFormat {
    /// Format implied by an output file name: `.csv` is CSV, anything else JSON.
    pub fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => Self::Csv,
            _ => Self::Json,
        }
    }
}

/// Stats (or aggregated stats) with the anomaly report alongside.
#[derive(Debug, Serialize)]
pub struct AnalysisExport<'a, T: Serialize> {
    #[serde(flatten)]
    pub stats: &'a T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anomalies: Option<&'a AnomalyReport>,
}

/// Pretty JSON of any serializable result.
pub fn to_json<T: Serialize>(value: &T) -> anyhow::Result<String> {
    serde_json::to_string_pretty(value).context("serializing export")
}

/// CSV rendition of `stats`.
///
/// Three blocks separated by a blank line: `Type,Count` with one
/// `Level_<name>` row per level, then every error and warning, then
/// pattern counts when any pattern matched. Findings get a `Source`
/// column when they were aggregated from several files.
pub fn stats_to_csv(stats: &Stats) -> String {
    let mut lines = vec!["Type,Count".to_string()];
    for (level, count) in &stats.levels {
        lines.push(format!("Level_{level},{count}"));
    }

    let with_source = stats
        .errors
        .iter()
        .chain(&stats.warnings)
        .any(|f| f.source.is_some());

    lines.push(String::new());
    lines.push(if with_source {
        "Type,Source,Line,Timestamp,Message".to_string()
    } else {
        "Type,Line,Timestamp,Message".to_string()
    });
    for finding in &stats.errors {
        lines.push(finding_row("ERROR", finding, with_source));
    }
    for finding in &stats.warnings {
        lines.push(finding_row("WARNING", finding, with_source));
    }

    if !stats.patterns.is_empty() {
        lines.push(String::new());
        lines.push("Pattern,Count".to_string());
        for (pattern, count) in &stats.patterns {
            lines.push(format!("{},{count}", quote(pattern)));
        }
    }

    lines.join("\n")
}

/// CSV block listing anomalies, appended after the stats blocks.
pub fn report_to_csv(report: &AnomalyReport) -> String {
    let mut lines = vec!["Anomaly,Severity,Message,Lines".to_string()];
    for anomaly in &report.anomalies {
        let kind = match anomaly {
            Anomaly::ErrorSpike(_) => "ERROR_SPIKE",
            Anomaly::RepeatedError(_) => "REPEATED_ERROR",
            Anomaly::Trend(_) => "TREND",
        };
        let affected: Vec<String> = anomaly.affected_lines().iter().map(ToString::to_string).collect();
        lines.push(format!(
            "{kind},{},{},{}",
            anomaly.severity(),
            quote(anomaly.message()),
            affected.join(" ")
        ));
    }
    lines.join("\n")
}

fn finding_row(kind: &str, finding: &Finding, with_source: bool) -> String {
    let timestamp = finding.timestamp.as_deref().map(quote_if_needed).unwrap_or_default();
    let message = quote(&finding.message);
    if with_source {
        let source = finding.source.as_deref().map(quote_if_needed).unwrap_or_default();
        format!("{kind},{source},{},{timestamp},{message}", finding.line_number)
    } else {
        format!("{kind},{},{timestamp},{message}", finding.line_number)
    }
}

fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

fn quote_if_needed(field: &str) -> String {
    if field.contains([',', '"', '\n']) {
        quote(field)
    } else {
        field.to_string()
    }
}

/// Write `content` to `path`, or to stdout when no path is given.
pub fn write_output(content: &str, path: Option<&Path>) -> anyhow::Result<()> {
    match path {
        Some(p) => {
            std::fs::write(p, content).with_context(|| format!("writing {}", p.display()))?;
            tracing::info!(path = %p.display(), bytes = content.len(), "export written");
        }
        None => println!("{content}"),
    }
    Ok(())
}
