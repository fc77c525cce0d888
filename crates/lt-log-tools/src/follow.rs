//! Incremental reading of a growing log file.
//!
//! Best-effort: growth is detected by file size only, so a file replaced
//! with one of equal or larger size between polls goes unnoticed.

use std::io::SeekFrom;
use std::path::{Path, PathBuf};

use tokio::io::{AsyncReadExt, AsyncSeekExt};

use crate::error::{LogError, LogResult};
use crate::parsers;
use crate::types::LogRecord;

/// Follows one file, yielding records for lines appended since the last poll.
#[derive(Debug)]
pub struct LogFollower {
    path: PathBuf,
    offset: u64,
    /// Bytes of a trailing line that has no newline yet.
    pending: Vec<u8>,
    emitted: usize,
}

impl LogFollower {
    /// Start following at the current end of `path`.
    pub async fn open(path: impl Into<PathBuf>) -> LogResult<Self> {
        let path = path.into();
        let len = file_len(&path).await?;
        tracing::debug!(path = %path.display(), offset = len, "following log file");
        Ok(Self {
            path,
            offset: len,
            pending: Vec::new(),
            emitted: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Byte offset up to which the file has been consumed.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Read whatever was appended and parse the completed lines.
    ///
    /// Records are numbered by how many non-blank lines this follower has
    /// emitted so far. A shrinking file is treated as truncated or rotated
    /// and is re-read from the start.
    pub async fn poll(&mut self) -> LogResult<Vec<LogRecord>> {
        let len = file_len(&self.path).await?;
        if len < self.offset {
            tracing::info!(
                path = %self.path.display(),
                previous = self.offset,
                current = len,
                "log file shrank, restarting from the beginning"
            );
            self.offset = 0;
            self.pending.clear();
        }
        if len == self.offset {
            return Ok(Vec::new());
        }

        let mut file = tokio::fs::File::open(&self.path)
            .await
            .map_err(|e| io_error(&self.path, e))?;
        file.seek(SeekFrom::Start(self.offset))
            .await
            .map_err(|e| io_error(&self.path, e))?;
        let mut chunk = Vec::new();
        file.take(len - self.offset)
            .read_to_end(&mut chunk)
            .await
            .map_err(|e| io_error(&self.path, e))?;
        self.offset += chunk.len() as u64;
        self.pending.extend_from_slice(&chunk);

        let Some(last_newline) = self.pending.iter().rposition(|&b| b == b'\n') else {
            return Ok(Vec::new());
        };
        let complete: Vec<u8> = self.pending.drain(..=last_newline).collect();
        let text = String::from_utf8_lossy(&complete);

        let mut records = Vec::new();
        for line in text.split('\n') {
            if line.trim().is_empty() {
                continue;
            }
            self.emitted += 1;
            records.push(parsers::parse_line(line, self.emitted));
        }
        tracing::trace!(records = records.len(), offset = self.offset, "poll complete");
        Ok(records)
    }
}

async fn file_len(path: &Path) -> LogResult<u64> {
    tokio::fs::metadata(path)
        .await
        .map(|m| m.len())
        .map_err(|e| io_error(path, e))
}

fn io_error(path: &Path, err: std::io::Error) -> LogError {
    LogError::from_io(&path.display().to_string(), err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LogLevel;
    use std::io::Write;

    fn append(path: &Path, text: &str) {
        let mut f = std::fs::OpenOptions::new().append(true).open(path).unwrap();
        f.write_all(text.as_bytes()).unwrap();
    }

    #[tokio::test]
    async fn starts_at_end_of_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        append(file.path(), "INFO: old line\n");

        let mut follower = LogFollower::open(file.path()).await.unwrap();
        assert_eq!(follower.offset(), 15);
        assert!(follower.poll().await.unwrap().is_empty());

        append(file.path(), "ERROR: new line\n");
        let records = follower.poll().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].level, Some(LogLevel::Error));
        assert_eq!(records[0].line_number, 1);
    }

    #[tokio::test]
    async fn partial_lines_wait_for_newline() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let mut follower = LogFollower::open(file.path()).await.unwrap();

        append(file.path(), "INFO: a\nERROR: b");
        let first = follower.poll().await.unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].message, "a");

        append(file.path(), "roken pipe\n\n");
        let second = follower.poll().await.unwrap();
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].message, "broken pipe");
        assert_eq!(second[0].line_number, 2);
    }

    #[tokio::test]
    async fn truncation_restarts() {
        let file = tempfile::NamedTempFile::new().unwrap();
        append(file.path(), "INFO: a long line before rotation\n");
        let mut follower = LogFollower::open(file.path()).await.unwrap();

        std::fs::write(file.path(), "WARN: fresh\n").unwrap();
        let records = follower.poll().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].message, "fresh");
        assert_eq!(follower.offset(), 12);
    }

    #[tokio::test]
    async fn missing_file_errors() {
        let err = LogFollower::open("/no/such/file.log").await.unwrap_err();
        assert!(matches!(err, LogError::NotFound(_)));
    }
}
