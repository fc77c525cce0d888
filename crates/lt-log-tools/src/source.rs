//! Log source abstraction: read log text from files, mocks, or other backends.

use async_trait::async_trait;

use crate::aggregator::SourceStats;
use crate::analyzer::AnalyzeOptions;
use crate::error::{LogError, LogResult};

/// Full contents of one source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceText {
    pub content: String,
    pub byte_size: u64,
}

impl SourceText {
    pub fn new(content: impl Into<String>) -> Self {
        let content = content.into();
        let byte_size = content.len() as u64;
        Self { content, byte_size }
    }
}

/// Abstraction for reading log data.
///
/// Keeps the analysis engine free of I/O and lets tests swap in
/// [`MockLogSource`](crate::mock::MockLogSource).
#[async_trait]
pub trait LogSource: Send + Sync {
    /// Read the whole source identified by `path`.
    async fn read_text(&self, path: &str) -> LogResult<SourceText>;
}

/// Reads logs from the local filesystem.
pub struct FileLogSource;

#[async_trait]
impl LogSource for FileLogSource {
    async fn read_text(&self, path: &str) -> LogResult<SourceText> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| LogError::from_io(path, e))?;
        let byte_size = bytes.len() as u64;
        let content = match String::from_utf8(bytes) {
            Ok(s) => s,
            Err(e) => {
                tracing::debug!(path, "source is not valid UTF-8, decoding lossily");
                String::from_utf8_lossy(e.as_bytes()).into_owned()
            }
        };
        Ok(SourceText { content, byte_size })
    }
}

/// A source that could not be read.
#[derive(Debug)]
pub struct SourceFailure {
    pub path: String,
    pub error: LogError,
}

/// Outcome of loading a batch of sources.
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Successfully read sources, in request order.
    pub loaded: Vec<(String, SourceText)>,
    pub failures: Vec<SourceFailure>,
}

impl LoadReport {
    /// Analyze every loaded source, ready for aggregation.
    pub fn analyze(&self, options: &AnalyzeOptions) -> Vec<SourceStats> {
        self.loaded
            .iter()
            .map(|(path, text)| SourceStats::analyze(path, &text.content, text.byte_size, options))
            .collect()
    }
}

/// Read every path, skipping (and recording) the ones that fail.
pub async fn load_sources(source: &dyn LogSource, paths: &[String]) -> LoadReport {
    let mut report = LoadReport::default();
    for path in paths {
        match source.read_text(path).await {
            Ok(text) => {
                tracing::debug!(path = %path, bytes = text.byte_size, "source loaded");
                report.loaded.push((path.clone(), text));
            }
            Err(error) => {
                tracing::warn!(path = %path, error = %error, "skipping unreadable source");
                report.failures.push(SourceFailure {
                    path: path.clone(),
                    error,
                });
            }
        }
    }
    report
}
