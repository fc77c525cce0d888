//! Archiving of log files into a separate directory.
//!
//! Each file is copied (optionally gzipped) to
//! `<archive_dir>/<stem>_<modified date>.log[.gz]`. With an age limit set,
//! younger files are skipped and the originals of archived ones removed.

use std::fmt;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use anyhow::Context;
use chrono::{DateTime, Utc};
use flate2::Compression;
use flate2::write::GzEncoder;

use crate::config::ArchiveConfig;

const SECS_PER_DAY: u64 = 24 * 60 * 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveOptions {
    pub archive_dir: PathBuf,
    pub compress: bool,
    /// Minimum age in days; `0` archives everything and keeps originals.
    pub delete_after_days: u64,
    /// Report what would happen without touching the filesystem.
    pub dry_run: bool,
}

impl From<&ArchiveConfig> for ArchiveOptions {
    fn from(config: &ArchiveConfig) -> Self {
        Self {
            archive_dir: config.dir.clone(),
            compress: config.compress,
            delete_after_days: config.delete_after_days,
            dry_run: false,
        }
    }
}

/// One file copied into the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchivedFile {
    pub original: PathBuf,
    pub archive_path: PathBuf,
    pub original_size: u64,
    /// Zero on a dry run.
    pub archive_size: u64,
    pub compressed: bool,
    pub original_removed: bool,
}

impl ArchivedFile {
    /// Bytes saved by compression; negative when gzip overhead wins.
    pub fn saved_bytes(&self) -> i64 {
        self.original_size as i64 - self.archive_size as i64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Missing,
    NotAFile,
    TooRecent { age_days: u64 },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => f.write_str("file not found"),
            Self::NotAFile => f.write_str("not a regular file"),
            Self::TooRecent { age_days } => write!(f, "only {age_days} days old"),
        }
    }
}

#[derive(Debug, Default)]
pub struct ArchiveSummary {
    pub dry_run: bool,
    pub archived: Vec<ArchivedFile>,
    pub skipped: Vec<(PathBuf, SkipReason)>,
    pub failed: Vec<(PathBuf, anyhow::Error)>,
}

impl ArchiveSummary {
    pub fn original_size(&self) -> u64 {
        self.archived.iter().map(|a| a.original_size).sum()
    }

    pub fn archive_size(&self) -> u64 {
        self.archived.iter().map(|a| a.archive_size).sum()
    }

    /// Percentage of the original size saved, `None` on a dry run or
    /// when nothing was archived.
    pub fn compression_ratio(&self) -> Option<f64> {
        let original = self.original_size();
        if self.dry_run || original == 0 {
            return None;
        }
        Some((1.0 - self.archive_size() as f64 / original as f64) * 100.0)
    }
}

enum Outcome {
    Archived(ArchivedFile),
    Skipped(SkipReason),
}

/// Archive `files`, measuring ages against `now`.
///
/// Per-file failures are collected in the summary; only failing to
/// create the archive directory aborts.
pub fn archive_files(
    files: &[PathBuf],
    options: &ArchiveOptions,
    now: SystemTime,
) -> anyhow::Result<ArchiveSummary> {
    if !options.dry_run {
        fs::create_dir_all(&options.archive_dir).with_context(|| {
            format!("creating archive directory {}", options.archive_dir.display())
        })?;
    }

    let mut summary = ArchiveSummary {
        dry_run: options.dry_run,
        ..ArchiveSummary::default()
    };
    for file in files {
        match archive_one(file, options, now) {
            Ok(Outcome::Archived(entry)) => summary.archived.push(entry),
            Ok(Outcome::Skipped(reason)) => {
                tracing::debug!(file = %file.display(), %reason, "not archived");
                summary.skipped.push((file.clone(), reason));
            }
            Err(e) => {
                tracing::warn!(file = %file.display(), error = %e, "failed to archive");
                summary.failed.push((file.clone(), e));
            }
        }
    }

    tracing::info!(
        archived = summary.archived.len(),
        skipped = summary.skipped.len(),
        failed = summary.failed.len(),
        dry_run = options.dry_run,
        "archive run complete"
    );
    Ok(summary)
}

fn archive_one(path: &Path, options: &ArchiveOptions, now: SystemTime) -> anyhow::Result<Outcome> {
    let meta = match fs::metadata(path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Outcome::Skipped(SkipReason::Missing)),
        Err(e) => return Err(e).with_context(|| format!("reading metadata of {}", path.display())),
    };
    if !meta.is_file() {
        return Ok(Outcome::Skipped(SkipReason::NotAFile));
    }

    let modified = meta
        .modified()
        .with_context(|| format!("reading modification time of {}", path.display()))?;
    let age_days = now.duration_since(modified).unwrap_or_default().as_secs() / SECS_PER_DAY;
    if options.delete_after_days > 0 && age_days < options.delete_after_days {
        return Ok(Outcome::Skipped(SkipReason::TooRecent { age_days }));
    }

    let archive_path = options
        .archive_dir
        .join(archive_name(path, modified.into(), options.compress));
    let mut entry = ArchivedFile {
        original: path.to_path_buf(),
        archive_path,
        original_size: meta.len(),
        archive_size: 0,
        compressed: options.compress,
        original_removed: false,
    };
    if options.dry_run {
        return Ok(Outcome::Archived(entry));
    }

    if options.compress {
        gzip_file(path, &entry.archive_path)?;
    } else {
        fs::copy(path, &entry.archive_path).with_context(|| {
            format!("copying {} to {}", path.display(), entry.archive_path.display())
        })?;
    }
    entry.archive_size = fs::metadata(&entry.archive_path)
        .with_context(|| format!("reading {}", entry.archive_path.display()))?
        .len();

    if options.delete_after_days > 0 {
        fs::remove_file(path).with_context(|| format!("removing {}", path.display()))?;
        entry.original_removed = true;
    }

    tracing::info!(
        file = %path.display(),
        archive = %entry.archive_path.display(),
        original_size = entry.original_size,
        archive_size = entry.archive_size,
        "file archived"
    );
    Ok(Outcome::Archived(entry))
}

/// `<stem>_<YYYY-MM-DD>.log`, with `.gz` appended when compressing.
pub fn archive_name(path: &Path, modified: DateTime<Utc>, compress: bool) -> String {
    let stem = path
        .file_stem()
        .map_or_else(|| "log".into(), |s| s.to_string_lossy());
    let suffix = if compress { ".gz" } else { "" };
    format!("{stem}_{}.log{suffix}", modified.format("%Y-%m-%d"))
}

fn gzip_file(src: &Path, dst: &Path) -> anyhow::Result<()> {
    let mut input = File::open(src).with_context(|| format!("opening {}", src.display()))?;
    let output = File::create(dst).with_context(|| format!("creating {}", dst.display()))?;
    let mut encoder = GzEncoder::new(output, Compression::default());
    io::copy(&mut input, &mut encoder).with_context(|| format!("compressing {}", src.display()))?;
    encoder
        .finish()
        .with_context(|| format!("finishing {}", dst.display()))?;
    Ok(())
}

/// Contents of an archive directory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArchiveStats {
    pub file_count: usize,
    pub compressed_count: usize,
    pub total_size: u64,
}

impl ArchiveStats {
    pub fn average_size(&self) -> u64 {
        if self.file_count == 0 {
            0
        } else {
            self.total_size / self.file_count as u64
        }
    }
}

/// Summarize the files directly inside `dir`; `None` when it does not exist.
pub fn archive_stats(dir: &Path) -> anyhow::Result<Option<ArchiveStats>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e).with_context(|| format!("reading {}", dir.display())),
    };

    let mut stats = ArchiveStats::default();
    for entry in entries {
        let entry = entry.with_context(|| format!("reading {}", dir.display()))?;
        let meta = entry
            .metadata()
            .with_context(|| format!("reading {}", entry.path().display()))?;
        if !meta.is_file() {
            continue;
        }
        stats.file_count += 1;
        stats.total_size += meta.len();
        if entry.path().extension().is_some_and(|ext| ext == "gz") {
            stats.compressed_count += 1;
        }
    }
    Ok(Some(stats))
}
