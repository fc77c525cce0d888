//! Shared fixtures for the end-to-end tests.
//!
//! Wires mock and on-disk sources through the full parse, analyze,
//! detect and aggregate pipeline.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use lt_log_tools::{
    AggregatedStats, AnalyzeOptions, LogSource, MockLogSource, SourceStats, aggregate,
    load_sources,
};

/// Paths served by [`MockLogSource::with_app_sample`].
pub const APP_LOG: &str = "/var/log/app.log";
pub const NGINX_LOG: &str = "/var/log/nginx/error.log";

/// Load `paths` from `source`, analyze each and merge the results.
pub async fn aggregate_from(
    source: &dyn LogSource,
    paths: &[&str],
    options: &AnalyzeOptions,
) -> (AggregatedStats, Vec<SourceStats>) {
    let ids: Vec<String> = paths.iter().map(|p| p.to_string()).collect();
    let report = load_sources(source, &ids).await;
    let per_source = report.analyze(options);
    (aggregate(&per_source), per_source)
}

pub fn app_sample() -> MockLogSource {
    MockLogSource::with_app_sample()
}

/// Bracketed line at `2024-03-01 10:MM:SS`, `offset_secs` after 10:00:00.
pub fn bracketed(offset_secs: u32, level: &str, message: &str) -> String {
    format!(
        "[2024-03-01 10:{:02}:{:02}] [{level}] {message}",
        offset_secs / 60,
        offset_secs % 60
    )
}

/// Write `content` to `name` inside `dir`, returning the full path.
pub fn write_log(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
    path
}
