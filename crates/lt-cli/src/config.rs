//! logtriage configuration, loadable from TOML.

use std::path::{Path, PathBuf};

use anyhow::Context;
use lt_log_tools::AnomalyOptions;
use serde::Deserialize;

/// Top-level configuration. Every field is optional in the file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TriageConfig {
    /// Literal substrings counted by `analyze` and `aggregate`.
    pub patterns: Vec<String>,
    /// Anomaly detector thresholds.
    pub anomaly: AnomalyOptions,
    pub watch: WatchConfig,
    pub scan: ScanConfig,
    pub output: OutputConfig,
    pub archive: ArchiveConfig,
}

/// Tailing settings for `watch`.
#[derive(Debug, Clone, Deserialize)]
pub struct WatchConfig {
    /// Poll interval in milliseconds.
    #[serde(default = "default_watch_interval")]
    pub interval_ms: u64,
    /// Minimum level to display (ERROR, WARN, INFO, DEBUG).
    #[serde(default)]
    pub level: Option<String>,
}

fn default_watch_interval() -> u64 {
    1000
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_watch_interval(),
            level: None,
        }
    }
}

/// Directory discovery settings for `aggregate --dir`.
#[derive(Debug, Clone, Deserialize)]
pub struct ScanConfig {
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
    #[serde(default = "default_recursive")]
    pub recursive: bool,
    /// Directories to skip: `*suffix` matches the directory name's end,
    /// anything else a substring of the path relative to the scan root.
    #[serde(default)]
    pub exclude: Vec<String>,
}

fn default_extensions() -> Vec<String> {
    vec![".log".to_string(), ".txt".to_string()]
}

fn default_recursive() -> bool {
    true
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            recursive: default_recursive(),
            exclude: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    /// Maximum findings/hits printed per section.
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Defaults for `archive` and `archive-stats`.
#[derive(Debug, Clone, Deserialize)]
pub struct ArchiveConfig {
    #[serde(default = "default_archive_dir")]
    pub dir: PathBuf,
    /// Gzip archived files.
    #[serde(default)]
    pub compress: bool,
    /// Only archive files at least this many days old, then delete the
    /// originals. `0` archives everything and keeps the originals.
    #[serde(default)]
    pub delete_after_days: u64,
}

fn default_archive_dir() -> PathBuf {
    PathBuf::from("./archive")
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            dir: default_archive_dir(),
            compress: false,
            delete_after_days: 0,
        }
    }
}

impl TriageConfig {
    /// Load config from a TOML file path.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: Self = toml::from_str(&contents)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(config)
    }

    /// Load `path` when given, otherwise fall back to defaults.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(p) => {
                let config = Self::from_file(p)?;
                tracing::debug!(path = %p.display(), "config loaded");
                Ok(config)
            }
            None => Ok(Self::default()),
        }
    }
}
