//! Mock log source for testing: serves pre-loaded log content.

use async_trait::async_trait;
use std::collections::HashMap;

use crate::error::{LogError, LogResult};
use crate::source::{LogSource, SourceText};

/// A mock log source that serves pre-loaded content by path.
#[derive(Default)]
pub struct MockLogSource {
    files: HashMap<String, String>,
}

impl MockLogSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file with the given content.
    pub fn add_file(&mut self, path: impl Into<String>, content: impl Into<String>) {
        self.files.insert(path.into(), content.into());
    }

    /// Application log plus an nginx error log.
    ///
    /// `app.log` holds a burst of database timeouts two minutes in.
    pub fn with_app_sample() -> Self {
        let mut m = Self::new();
        m.add_file(
            "/var/log/app.log",
            "\
[2024-02-11 18:00:00] [INFO] service started on :8080
[2024-02-11 18:00:05] [DEBUG] loaded 42 routes
[2024-02-11 18:01:00] [WARNING] cache miss ratio above 40%
[2024-02-11 18:02:00] [ERROR] db timeout after 5000ms
[2024-02-11 18:02:05] [ERROR] db timeout after 5000ms
[2024-02-11 18:02:10] [ERROR] db timeout after 5000ms
[2024-02-11 18:02:15] [ERROR] db timeout after 5000ms
[2024-02-11 18:02:20] [ERROR] db timeout after 5000ms
[2024-02-11 18:03:00] [ERROR] invalid token for user 17
[2024-02-11 18:04:00] [INFO] request served in 12ms
",
        );
        m.add_file(
            "/var/log/nginx/error.log",
            "\
2024/02/11 17:59:00 [notice] 1#1: nginx started
2024/02/11 18:02:01 [error] 7#7: *3 upstream timed out while reading response header
2024/02/11 18:02:30 [warn] 7#7: *9 an upstream response is buffered to a temporary file
2024/02/11 18:05:00 [error] 7#7: *12 open() \"/srv/static/favicon.ico\" failed (2: No such file or directory)
",
        );
        m
    }

    /// BSD syslog sample; hosts land in the level slot.
    pub fn with_syslog_sample() -> Self {
        let mut m = Self::new();
        m.add_file(
            "/var/log/syslog",
            "\
Feb 11 18:00:01 edge1 systemd[1]: Started Daily Cleanup
Feb 11 18:00:05 edge1 myapp[1234]: Failed to connect to database
Feb 11 18:00:10 edge2 kernel: eth0: link up
ERROR: watchdog restarted myapp
",
        );
        m
    }
}

#[async_trait]
impl LogSource for MockLogSource {
    async fn read_text(&self, path: &str) -> LogResult<SourceText> {
        self.files
            .get(path)
            .map(|content| SourceText::new(content.as_str()))
            .ok_or_else(|| LogError::NotFound(path.to_string()))
    }
}
