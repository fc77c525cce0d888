//! Live tailing of a log file.
//!
//! Polls a [`LogFollower`] at a fixed interval and hands every record
//! that passes the level filter to a sink.

use std::time::Duration;

use lt_log_tools::types::LEVEL_TABLE;
use lt_log_tools::{LogFollower, LogRecord};
use tokio::time::{self, MissedTickBehavior};

/// Minimum-severity filter for tailed records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LevelFilter {
    /// Highest weight allowed through; `None` passes everything.
    max_weight: Option<u8>,
}

impl LevelFilter {
    /// Filter showing `level` and anything more severe.
    ///
    /// Accepts ERROR, WARN, WARNING, INFO and DEBUG in any case.
    pub fn parse(level: &str) -> anyhow::Result<Self> {
        let upper = level.trim().to_uppercase();
        let info = LEVEL_TABLE
            .iter()
            .find(|i| i.name == upper)
            .ok_or_else(|| anyhow::anyhow!("unknown log level: {level} (expected ERROR, WARN, INFO or DEBUG)"))?;
        Ok(Self {
            max_weight: Some(info.weight),
        })
    }

    pub fn from_option(level: Option<&str>) -> anyhow::Result<Self> {
        level.map_or_else(|| Ok(Self::default()), Self::parse)
    }

    /// Records without a known level are dropped once a minimum is set.
    pub fn passes(&self, record: &LogRecord) -> bool {
        let Some(max) = self.max_weight else {
            return true;
        };
        let weight = record.level.as_ref().map_or(0, |l| l.weight());
        weight != 0 && weight <= max
    }
}

/// Tail `follower` forever, polling every `interval`.
///
/// Poll failures (file removed, permission changes) are logged and the
/// loop keeps going. Cancel by dropping the future.
pub async fn run<F>(mut follower: LogFollower, interval: Duration, filter: &LevelFilter, mut sink: F)
where
    F: FnMut(&LogRecord),
{
    let mut ticker = time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // Skip the first tick (fires immediately).
    ticker.tick().await;

    tracing::info!(
        path = %follower.path().display(),
        interval_ms = interval.as_millis() as u64,
        "watching log file"
    );

    loop {
        ticker.tick().await;

        match follower.poll().await {
            Ok(records) => {
                for record in records.iter().filter(|r| filter.passes(r)) {
                    sink(record);
                }
                tracing::trace!(offset = follower.offset(), "watch tick");
            }
            Err(e) => {
                tracing::warn!(path = %follower.path().display(), error = %e, "failed to poll log file");
            }
        }
    }
}
