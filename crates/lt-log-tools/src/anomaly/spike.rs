//! Error spike detection: too many errors inside a sliding time window.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::Severity;
use crate::types::Finding;

/// A run of errors dense enough in time to cross the threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorSpike {
    pub severity: Severity,
    /// Timestamp of the first error in the run.
    pub timestamp: String,
    pub window_minutes: u32,
    pub count: usize,
    pub message: String,
    pub affected_lines: Vec<usize>,
}

enum Stamp {
    Missing,
    Invalid,
    At(DateTime<Utc>),
}

impl Stamp {
    fn of(finding: &Finding) -> Self {
        match finding.timestamp.as_deref() {
            None | Some("") => Self::Missing,
            Some(_) => finding.instant().map_or(Self::Invalid, Self::At),
        }
    }
}

/// Scan `errors` (already in line order) for spikes.
///
/// Each error with a valid timestamp anchors a window; following errors
/// are counted while they stay within `window_minutes` of the anchor.
/// Errors without a timestamp are stepped over, an unparseable one ends
/// the run. Once a spike is reported the scan resumes after its last
/// counted error, so runs never overlap. A `threshold` of 0 behaves as 1.
pub fn detect_error_spikes(
    errors: &[Finding],
    threshold: usize,
    window_minutes: u32,
) -> Vec<ErrorSpike> {
    let threshold = threshold.max(1);
    if errors.len() < threshold {
        return Vec::new();
    }

    let window = Duration::minutes(i64::from(window_minutes));
    let stamps: Vec<Stamp> = errors.iter().map(Stamp::of).collect();
    let mut spikes = Vec::new();

    let mut i = 0;
    while i < errors.len() {
        let Stamp::At(anchor) = stamps[i] else {
            i += 1;
            continue;
        };

        let mut lines = Vec::new();
        let mut last = i;
        for (j, stamp) in stamps.iter().enumerate().skip(i) {
            match stamp {
                Stamp::Missing => continue,
                Stamp::At(t) if *t - anchor <= window => {
                    lines.push(errors[j].line_number);
                    last = j;
                }
                _ => break,
            }
        }

        if lines.len() >= threshold {
            let count = lines.len();
            spikes.push(ErrorSpike {
                severity: Severity::High,
                timestamp: errors[i].timestamp.clone().unwrap_or_default(),
                window_minutes,
                count,
                message: format!(
                    "error spike: {count} errors within {window_minutes} minute(s)"
                ),
                affected_lines: lines,
            });
            i = last + 1;
        } else {
            i += 1;
        }
    }

    spikes
}
