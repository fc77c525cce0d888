//! logtriage command line.
//!
//! Exposes the argument model and command dispatch as a library so the
//! end-to-end test crate can drive whole commands without spawning the
//! binary.

pub mod archive;
pub mod config;
pub mod discover;
pub mod export;
pub mod output;
pub mod watch;

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use lt_log_tools::{
    AnalyzeOptions, AnomalyOptions, AnomalyReport, FileLogSource, LogFollower, LogSource, Stats,
    aggregate, detect_anomalies, detect_anomalies_with_records, load_sources, records, search,
};
use serde::Serialize;

use archive::ArchiveOptions;
use config::{ScanConfig, TriageConfig};
use export::{AnalysisExport, ExportFormat};
use watch::LevelFilter;

/// Log file analysis: statistics, anomalies, search, live tailing and archiving.
#[derive(Debug, Parser)]
#[command(name = "logtriage", version, about, long_about = None)]
pub struct Cli {
    /// TOML config file
    #[arg(short, long, global = true, env = "LOGTRIAGE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Analyze one log file
    Analyze {
        file: PathBuf,
        #[command(flatten)]
        report: ReportArgs,
    },

    /// Case-insensitive search for a substring
    Search {
        file: PathBuf,
        query: String,
        /// Maximum hits to print
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Follow a file and print new records
    Watch {
        file: PathBuf,
        /// Poll interval in milliseconds
        #[arg(short, long)]
        interval: Option<u64>,
        /// Minimum level to show (ERROR, WARN, INFO, DEBUG)
        #[arg(short = 'L', long)]
        level: Option<String>,
    },

    /// Merge statistics across several files
    Aggregate {
        /// Files or quoted glob patterns (`logs/*.log`, `**/*.log`)
        paths: Vec<PathBuf>,
        /// Also scan this directory for log files
        #[arg(short, long)]
        dir: Option<PathBuf>,
        #[command(flatten)]
        report: ReportArgs,
    },

    /// Copy log files into an archive directory
    Archive {
        /// Files or quoted glob patterns
        paths: Vec<PathBuf>,
        /// Also archive log files found directly in this directory
        #[arg(short, long)]
        dir: Option<PathBuf>,
        /// Destination directory
        #[arg(long)]
        archive_dir: Option<PathBuf>,
        /// Gzip the archived copies
        #[arg(short = 'z', long)]
        compress: bool,
        /// Only archive files at least this many days old, then delete them
        #[arg(long, value_name = "DAYS")]
        delete_after: Option<u64>,
        /// Show what would be archived without touching any file
        #[arg(long)]
        dry_run: bool,
    },

    /// Summarize an archive directory
    ArchiveStats {
        /// Defaults to the configured archive directory
        dir: Option<PathBuf>,
    },
}

/// Options shared by `analyze` and `aggregate`.
#[derive(Debug, Clone, Default, Args)]
pub struct ReportArgs {
    /// Literal substrings to count (comma separated)
    #[arg(short, long, value_delimiter = ',')]
    pub patterns: Vec<String>,

    /// Maximum findings to print per section
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Export to this file instead of printing a summary
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Export format; inferred from the output file name when omitted
    #[arg(short, long, value_enum)]
    pub format: Option<ExportFormat>,

    /// Run anomaly detection
    #[arg(short, long)]
    pub anomalies: bool,

    #[arg(long)]
    pub spike_threshold: Option<usize>,

    /// Spike window in minutes
    #[arg(long)]
    pub spike_window: Option<u32>,

    #[arg(long)]
    pub repeat_threshold: Option<usize>,
}

impl ReportArgs {
    /// Command-line patterns win over configured ones.
    pub fn analyze_options(&self, config: &TriageConfig) -> AnalyzeOptions {
        let patterns = if self.patterns.is_empty() {
            &config.patterns
        } else {
            &self.patterns
        };
        AnalyzeOptions::with_patterns(patterns.iter().filter(|p| !p.is_empty()).cloned())
    }

    pub fn anomaly_options(&self, config: &TriageConfig) -> AnomalyOptions {
        let base = config.anomaly;
        AnomalyOptions {
            error_spike_threshold: self.spike_threshold.unwrap_or(base.error_spike_threshold),
            error_spike_window_minutes: self.spike_window.unwrap_or(base.error_spike_window_minutes),
            repeat_threshold: self.repeat_threshold.unwrap_or(base.repeat_threshold),
        }
    }

    pub fn limit(&self, config: &TriageConfig) -> Option<usize> {
        self.limit.or(config.output.limit)
    }

    /// `Some` when the result should be exported rather than summarized.
    pub fn export_format(&self) -> Option<ExportFormat> {
        match (self.format, &self.output) {
            (Some(format), _) => Some(format),
            (None, Some(path)) => Some(ExportFormat::for_path(path)),
            (None, None) => None,
        }
    }
}

/// Run one parsed command line.
pub async fn execute(cli: Cli) -> anyhow::Result<()> {
    let config = TriageConfig::load(cli.config.as_deref())?;
    match cli.command {
        Command::Analyze { file, report } => run_analyze(&file, &report, &config).await,
        Command::Search { file, query, limit } => {
            run_search(&file, &query, limit.or(config.output.limit)).await
        }
        Command::Watch {
            file,
            interval,
            level,
        } => run_watch(&file, interval, level.as_deref(), &config).await,
        Command::Aggregate { paths, dir, report } => {
            run_aggregate(&paths, dir.as_deref(), &report, &config).await
        }
        Command::Archive {
            paths,
            dir,
            archive_dir,
            compress,
            delete_after,
            dry_run,
        } => {
            let mut options = ArchiveOptions::from(&config.archive);
            if let Some(archive_dir) = archive_dir {
                options.archive_dir = archive_dir;
            }
            options.compress |= compress;
            options.delete_after_days = delete_after.unwrap_or(options.delete_after_days);
            options.dry_run = dry_run;
            run_archive(&paths, dir.as_deref(), &options, &config)
        }
        Command::ArchiveStats { dir } => {
            let dir = dir.unwrap_or_else(|| config.archive.dir.clone());
            let stats = archive::archive_stats(&dir)?;
            print!("{}", output::render_archive_stats(&dir, stats.as_ref()));
            Ok(())
        }
    }
}

async fn read_file(path: &Path) -> anyhow::Result<String> {
    let text = FileLogSource
        .read_text(&path.display().to_string())
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    Ok(text.content)
}

async fn run_analyze(file: &Path, args: &ReportArgs, config: &TriageConfig) -> anyhow::Result<()> {
    let text = read_file(file).await?;
    let stats = lt_log_tools::analyze(&text, &args.analyze_options(config));
    let report = args.anomalies.then(|| {
        detect_anomalies_with_records(&stats, &records(&text), &args.anomaly_options(config))
    });

    tracing::info!(
        file = %file.display(),
        lines = stats.total_lines,
        errors = stats.errors.len(),
        warnings = stats.warnings.len(),
        "analysis complete"
    );

    emit(&stats, &stats, report.as_ref(), args, config, |s, limit| {
        output::render_stats(s, limit)
    })
}

async fn run_aggregate(
    paths: &[PathBuf],
    dir: Option<&Path>,
    args: &ReportArgs,
    config: &TriageConfig,
) -> anyhow::Result<()> {
    let mut paths = discover::expand_paths(paths)?;
    if let Some(dir) = dir {
        paths.extend(discover::scan_log_files(dir, &config.scan)?);
    }
    if paths.is_empty() {
        anyhow::bail!("no log files given (pass paths or --dir)");
    }

    let ids: Vec<String> = paths.iter().map(|p| p.display().to_string()).collect();
    let loaded = load_sources(&FileLogSource, &ids).await;
    if loaded.loaded.is_empty() {
        anyhow::bail!("none of the {} log files could be read", ids.len());
    }
    for failure in &loaded.failures {
        eprintln!("skipped {}: {}", failure.path, failure.error);
    }

    let per_source = loaded.analyze(&args.analyze_options(config));
    let agg = aggregate(&per_source);
    let report = args
        .anomalies
        .then(|| detect_anomalies(&agg.stats, &args.anomaly_options(config)));

    tracing::info!(
        files = agg.file_count(),
        skipped = loaded.failures.len(),
        lines = agg.stats.total_lines,
        "aggregation complete"
    );

    emit(&agg, &agg.stats, report.as_ref(), args, config, |a, limit| {
        output::render_aggregate(a, limit)
    })
}

/// Export or print a result. `stats` is the part the CSV export covers.
fn emit<T, R>(
    result: &T,
    stats: &Stats,
    report: Option<&AnomalyReport>,
    args: &ReportArgs,
    config: &TriageConfig,
    render: R,
) -> anyhow::Result<()>
where
    T: Serialize,
    R: FnOnce(&T, Option<usize>) -> String,
{
    if let Some(format) = args.export_format() {
        let content = match format {
            ExportFormat::Json => export::to_json(&AnalysisExport {
                stats: result,
                anomalies: report,
            })?,
            ExportFormat::Csv => {
                let mut csv = export::stats_to_csv(stats);
                if let Some(report) = report {
                    csv.push_str("\n\n");
                    csv.push_str(&export::report_to_csv(report));
                }
                csv
            }
        };
        return export::write_output(&content, args.output.as_deref());
    }

    print!("{}", render(result, args.limit(config)));
    if let Some(report) = report {
        print!("{}", output::render_report(report));
    }
    Ok(())
}

fn run_archive(
    paths: &[PathBuf],
    dir: Option<&Path>,
    options: &ArchiveOptions,
    config: &TriageConfig,
) -> anyhow::Result<()> {
    let mut files = discover::expand_paths(paths)?;
    if let Some(dir) = dir {
        let top_level = ScanConfig {
            recursive: false,
            ..config.scan.clone()
        };
        files.extend(discover::scan_log_files(dir, &top_level)?);
    }
    if files.is_empty() {
        anyhow::bail!("no log files given (pass paths or --dir)");
    }

    let summary = archive::archive_files(&files, options, SystemTime::now())?;
    print!("{}", output::render_archive_summary(&summary));
    if summary.archived.is_empty() && !summary.failed.is_empty() {
        anyhow::bail!("none of the {} log files could be archived", files.len());
    }
    Ok(())
}

async fn run_search(file: &Path, query: &str, limit: Option<usize>) -> anyhow::Result<()> {
    let text = read_file(file).await?;
    let hits = search(&text, query);
    tracing::debug!(file = %file.display(), query, hits = hits.len(), "search complete");
    print!("{}", output::render_search(query, &hits, limit));
    Ok(())
}

async fn run_watch(
    file: &Path,
    interval: Option<u64>,
    level: Option<&str>,
    config: &TriageConfig,
) -> anyhow::Result<()> {
    let filter = LevelFilter::from_option(level.or(config.watch.level.as_deref()))?;
    let interval = Duration::from_millis(interval.unwrap_or(config.watch.interval_ms).max(1));
    let follower = LogFollower::open(file)
        .await
        .with_context(|| format!("watching {}", file.display()))?;

    eprintln!("Watching {} (Ctrl+C to stop)", file.display());

    tokio::select! {
        () = watch::run(follower, interval, &filter, |record| {
            println!("{}", output::render_record(record));
        }) => {
            tracing::error!("watch loop exited unexpectedly");
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutdown signal received");
        }
    }
    Ok(())
}
