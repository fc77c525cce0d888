//! Cross-source aggregation of per-file statistics.

use serde::{Deserialize, Serialize};

use crate::analyzer::{AnalyzeOptions, analyze};
use crate::types::{Finding, Stats, TimeRange};

/// Statistics of one source, as fed to [`aggregate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceStats {
    #[serde(rename = "file")]
    pub source_id: String,
    #[serde(rename = "size")]
    pub byte_size: u64,
    #[serde(flatten)]
    pub stats: Stats,
}

impl SourceStats {
    /// Analyze `text` and label the result with its source.
    pub fn analyze(
        source_id: impl Into<String>,
        text: &str,
        byte_size: u64,
        options: &AnalyzeOptions,
    ) -> Self {
        Self {
            source_id: source_id.into(),
            byte_size,
            stats: analyze(text, options),
        }
    }
}

/// Combined view over several sources.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedStats {
    /// Merged statistics; every finding carries its `source`.
    #[serde(flatten)]
    pub stats: Stats,
    pub total_size: u64,
    /// Per-source results in input order.
    pub files: Vec<SourceStats>,
}

impl AggregatedStats {
    pub fn file_count(&self) -> usize {
        self.files.len()
    }
}

/// Merge per-source statistics. Inputs are only read.
pub fn aggregate(sources: &[SourceStats]) -> AggregatedStats {
    let mut combined = Stats::default();
    let mut total_size = 0u64;
    let mut bounds = Vec::with_capacity(sources.len() * 2);

    for source in sources {
        let stats = &source.stats;
        combined.total_lines += stats.total_lines;
        total_size += source.byte_size;

        for (level, count) in &stats.levels {
            *combined.levels.entry(level.clone()).or_default() += count;
        }
        combined
            .errors
            .extend(stats.errors.iter().map(|f| tag(f, &source.source_id)));
        combined
            .warnings
            .extend(stats.warnings.iter().map(|f| tag(f, &source.source_id)));
        for (pattern, count) in &stats.patterns {
            *combined.patterns.entry(pattern.clone()).or_default() += count;
        }
        if let Some(range) = &stats.time_range {
            bounds.push(range.start);
            bounds.push(range.end);
        }
    }
    combined.time_range = TimeRange::spanning(bounds);

    tracing::debug!(
        files = sources.len(),
        total_lines = combined.total_lines,
        total_size,
        errors = combined.errors.len(),
        "sources aggregated"
    );

    AggregatedStats {
        stats: combined,
        total_size,
        files: sources.to_vec(),
    }
}

fn tag(finding: &Finding, source_id: &str) -> Finding {
    Finding {
        source: Some(source_id.to_string()),
        ..finding.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(id: &str, text: &str) -> SourceStats {
        SourceStats::analyze(id, text, text.len() as u64, &AnalyzeOptions::with_patterns(["db"]))
    }

    #[test]
    fn sums_counts_and_sizes() {
        let a = source("a.log", "ERROR: db down\nINFO: up");
        let b = source("b.log", "[2024-01-01 00:00:00] [ERROR] db again\nWARN: slow");
        let agg = aggregate(&[a.clone(), b.clone()]);

        assert_eq!(agg.stats.total_lines, 4);
        assert_eq!(agg.total_size, a.byte_size + b.byte_size);
        assert_eq!(agg.stats.level_count("ERROR"), 2);
        assert_eq!(agg.stats.level_count("INFO"), 1);
        assert_eq!(agg.stats.level_count("WARN"), 1);
        assert_eq!(agg.stats.patterns.get("db"), Some(&2));
        assert_eq!(agg.file_count(), 2);
    }

    #[test]
    fn findings_are_tagged_in_source_order() {
        let a = source("a.log", "ERROR: first\nERROR: second");
        let b = source("b.log", "ERROR: third\nWARN: w");
        let agg = aggregate(&[a, b]);

        let tagged: Vec<_> = agg
            .stats
            .errors
            .iter()
            .map(|f| (f.source.as_deref().unwrap(), f.message.as_str()))
            .collect();
        assert_eq!(
            tagged,
            vec![("a.log", "first"), ("a.log", "second"), ("b.log", "third")]
        );
        assert_eq!(agg.stats.warnings[0].source.as_deref(), Some("b.log"));
    }

    #[test]
    fn inputs_are_not_tagged() {
        let a = source("a.log", "ERROR: x");
        let agg = aggregate(std::slice::from_ref(&a));
        assert!(a.stats.errors[0].source.is_none());
        assert!(agg.files[0].stats.errors[0].source.is_none());
    }

    #[test]
    fn disjoint_time_ranges_merge() {
        let a = source(
            "a.log",
            "[2024-01-01 00:00:00] [INFO] t0\n[2024-01-01 00:10:00] [INFO] t1",
        );
        let b = source(
            "b.log",
            "[2024-01-01 01:00:00] [INFO] t2\n[2024-01-01 02:00:00] [INFO] t3",
        );
        let range = aggregate(&[a, b]).stats.time_range.unwrap();
        assert_eq!(range.start.to_rfc3339(), "2024-01-01T00:00:00+00:00");
        assert_eq!(range.end.to_rfc3339(), "2024-01-01T02:00:00+00:00");
        assert_eq!(range.duration_ms, 2 * 60 * 60 * 1000);
    }

    #[test]
    fn range_absent_without_timestamps() {
        let agg = aggregate(&[source("a.log", "INFO: x"), source("b.log", "ERROR: y")]);
        assert!(agg.stats.time_range.is_none());
    }

    #[test]
    fn empty_input() {
        let agg = aggregate(&[]);
        assert_eq!(agg, AggregatedStats::default());
    }

    #[test]
    fn json_shape() {
        let agg = aggregate(&[source("a.log", "ERROR: db")]);
        let json = serde_json::to_value(&agg).unwrap();
        assert_eq!(json["totalLines"], 1);
        assert_eq!(json["totalSize"], 9);
        assert_eq!(json["errors"][0]["source"], "a.log");
        assert_eq!(json["files"][0]["file"], "a.log");
        assert_eq!(json["files"][0]["totalLines"], 1);
    }
}
