//! Anomaly detection over analyzed statistics.
//!
//! Four independent detectors: error spikes, repeated errors, level
//! trends and keyword classification. All of them are pure and fail
//! closed, returning nothing when the input is too small.

pub mod classify;
pub mod repeat;
pub mod spike;
pub mod trend;

use serde::{Deserialize, Serialize};

use crate::types::{LogRecord, Stats};

pub use classify::{Classification, ErrorCategory, classify_errors};
pub use repeat::{RepeatedError, detect_repeated_errors};
pub use spike::{ErrorSpike, detect_error_spikes};
pub use trend::{Trend, TrendDirection, TrendLevel, detect_level_trends};

// ── Severity ──────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Medium,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Anomaly ───────────────────────────────────────────────────

/// A detected signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Anomaly {
    ErrorSpike(ErrorSpike),
    RepeatedError(RepeatedError),
    Trend(Trend),
}

impl Anomaly {
    pub fn severity(&self) -> Severity {
        match self {
            Self::ErrorSpike(s) => s.severity,
            Self::RepeatedError(r) => r.severity,
            Self::Trend(t) => t.severity,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::ErrorSpike(s) => &s.message,
            Self::RepeatedError(r) => &r.message,
            Self::Trend(t) => &t.message,
        }
    }

    /// Line numbers backing the signal; trends have none.
    pub fn affected_lines(&self) -> &[usize] {
        match self {
            Self::ErrorSpike(s) => &s.affected_lines,
            Self::RepeatedError(r) => &r.affected_lines,
            Self::Trend(_) => &[],
        }
    }
}

// ── Options ───────────────────────────────────────────────────

/// Detector thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnomalyOptions {
    /// Errors inside one window needed to call a spike.
    pub error_spike_threshold: usize,
    pub error_spike_window_minutes: u32,
    /// Occurrences of one message needed to call it repeated.
    pub repeat_threshold: usize,
}

impl Default for AnomalyOptions {
    fn default() -> Self {
        Self {
            error_spike_threshold: 5,
            error_spike_window_minutes: 1,
            repeat_threshold: 3,
        }
    }
}

// ── Report ────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnomalyReport {
    pub anomalies: Vec<Anomaly>,
    /// Present whenever the input had at least one error.
    pub classification: Option<Classification>,
}

impl AnomalyReport {
    pub fn is_empty(&self) -> bool {
        self.anomalies.is_empty()
    }

    pub fn trends(&self) -> impl Iterator<Item = &Trend> {
        self.anomalies.iter().filter_map(|a| match a {
            Anomaly::Trend(t) => Some(t),
            _ => None,
        })
    }

    pub fn high_severity_count(&self) -> usize {
        self.anomalies
            .iter()
            .filter(|a| a.severity() == Severity::High)
            .count()
    }
}

/// Spike, repeat and classification over `stats.errors`.
///
/// Trends need the full record stream, which `Stats` does not keep; use
/// [`detect_anomalies_with_records`] for those.
pub fn detect_anomalies(stats: &Stats, options: &AnomalyOptions) -> AnomalyReport {
    let mut report = AnomalyReport::default();
    if stats.errors.is_empty() {
        return report;
    }

    report.anomalies.extend(
        detect_error_spikes(
            &stats.errors,
            options.error_spike_threshold,
            options.error_spike_window_minutes,
        )
        .into_iter()
        .map(Anomaly::ErrorSpike),
    );
    report.anomalies.extend(
        detect_repeated_errors(&stats.errors, options.repeat_threshold)
            .into_iter()
            .map(Anomaly::RepeatedError),
    );
    report.classification = Some(classify_errors(&stats.errors));

    tracing::debug!(
        anomalies = report.anomalies.len(),
        high = report.high_severity_count(),
        "anomaly detection complete"
    );
    report
}

/// [`detect_anomalies`] plus trend detection over `records`.
pub fn detect_anomalies_with_records(
    stats: &Stats,
    records: &[LogRecord],
    options: &AnomalyOptions,
) -> AnomalyReport {
    let mut report = detect_anomalies(stats, options);
    report
        .anomalies
        .extend(detect_level_trends(records).into_iter().map(Anomaly::Trend));
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::{AnalyzeOptions, analyze, records};

    const DB_TIMEOUTS: &str = "[2024-01-01 00:00:00] [ERROR] db timeout\n\
                               [2024-01-01 00:00:10] [ERROR] db timeout\n\
                               [2024-01-01 00:00:20] [ERROR] db timeout";

    #[test]
    fn db_timeout_scenario() {
        let stats = analyze(DB_TIMEOUTS, &AnalyzeOptions::default());
        let opts = AnomalyOptions {
            error_spike_threshold: 3,
            error_spike_window_minutes: 1,
            repeat_threshold: 3,
        };
        let report = detect_anomalies(&stats, &opts);

        assert_eq!(report.anomalies.len(), 2);
        let Anomaly::ErrorSpike(spike) = &report.anomalies[0] else {
            panic!("expected spike first, got {:?}", report.anomalies[0]);
        };
        assert_eq!(spike.severity, Severity::High);
        assert_eq!(spike.affected_lines, vec![1, 2, 3]);

        let Anomaly::RepeatedError(repeat) = &report.anomalies[1] else {
            panic!("expected repeat second");
        };
        assert_eq!(repeat.count, 3);
        assert_eq!(repeat.message, "db timeout");
        assert_eq!(repeat.severity, Severity::Medium);

        let classification = report.classification.unwrap();
        assert_eq!(classification.get(ErrorCategory::Database).len(), 3);
    }

    #[test]
    fn no_errors_yields_empty_report() {
        let stats = analyze("INFO: fine\nDEBUG: noise", &AnalyzeOptions::default());
        let report = detect_anomalies(&stats, &AnomalyOptions::default());
        assert!(report.is_empty());
        assert!(report.classification.is_none());
    }

    #[test]
    fn default_thresholds() {
        let opts = AnomalyOptions::default();
        assert_eq!(opts.error_spike_threshold, 5);
        assert_eq!(opts.error_spike_window_minutes, 1);
        assert_eq!(opts.repeat_threshold, 3);
    }

    #[test]
    fn trends_only_with_records() {
        let mut text = String::new();
        for i in 0..10 {
            let level = if i < 4 { "ERROR" } else { "INFO" };
            text.push_str(&format!("[2024-01-01 00:00:{i:02}] [{level}] event {i}\n"));
        }
        let stats = analyze(&text, &AnalyzeOptions::default());
        let without = detect_anomalies(&stats, &AnomalyOptions::default());
        assert_eq!(without.trends().count(), 0);

        let with = detect_anomalies_with_records(&stats, &records(&text), &AnomalyOptions::default());
        let trends: Vec<_> = with.trends().collect();
        assert_eq!(trends.len(), 1);
        assert_eq!(trends[0].direction, TrendDirection::Decreasing);
    }

    #[test]
    fn anomaly_json_is_tagged() {
        let stats = analyze(DB_TIMEOUTS, &AnalyzeOptions::default());
        let report = detect_anomalies(&stats, &AnomalyOptions::default());
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["anomalies"][0]["type"], "REPEATED_ERROR");
        assert_eq!(json["anomalies"][0]["severity"], "MEDIUM");
        assert!(json["classification"]["DATABASE"].is_array());
    }

    #[test]
    fn options_deserialize_with_defaults() {
        let opts: AnomalyOptions = serde_json::from_str(r#"{"repeat_threshold": 7}"#).unwrap();
        assert_eq!(opts.repeat_threshold, 7);
        assert_eq!(opts.error_spike_threshold, 5);
    }
}
