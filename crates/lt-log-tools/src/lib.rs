//! Log triage engine.
//!
//! Parses unstructured log lines (bracketed application logs, nginx-style
//! error logs, BSD syslog, bare `LEVEL:` prefixes), computes per-source
//! statistics, detects anomalies (error spikes, repeated errors, level
//! trends, keyword classification) and merges statistics across files.
//!
//! The engine itself is pure; `source` and `follow` provide the file
//! reading and tailing around it.

pub mod aggregator;
pub mod analyzer;
pub mod anomaly;
pub mod error;
pub mod follow;
pub mod mock;
pub mod parsers;
pub mod search;
pub mod source;
pub mod timestamp;
pub mod types;

// Re-export key types for convenience
pub use aggregator::{AggregatedStats, SourceStats, aggregate};
pub use analyzer::{AnalyzeOptions, analyze, records};
pub use anomaly::{
    Anomaly, AnomalyOptions, AnomalyReport, Classification, ErrorCategory, Severity,
    detect_anomalies, detect_anomalies_with_records,
};
pub use error::{LogError, LogResult};
pub use follow::LogFollower;
pub use mock::MockLogSource;
pub use parsers::parse_line;
pub use search::{SearchHit, search};
pub use source::{FileLogSource, LoadReport, LogSource, SourceText, load_sources};
pub use types::{Finding, LineFormat, LogLevel, LogRecord, Stats, TimeRange};
