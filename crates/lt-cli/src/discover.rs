//! Log file discovery: directory scans and glob patterns.

use std::path::{Component, Path, PathBuf};

use anyhow::Context;
use globset::GlobBuilder;
use walkdir::{DirEntry, WalkDir};

use crate::config::ScanConfig;

/// Collect log files under `root`, sorted by path.
///
/// Unreadable entries are logged and skipped.
pub fn scan_log_files(root: &Path, scan: &ScanConfig) -> anyhow::Result<Vec<PathBuf>> {
    if !root.is_dir() {
        anyhow::bail!("not a directory: {}", root.display());
    }

    let max_depth = if scan.recursive { usize::MAX } else { 1 };
    let mut files = Vec::new();

    let walker = WalkDir::new(root)
        .max_depth(max_depth)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !e.file_type().is_dir() || !is_excluded(root, e, scan));

    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                tracing::warn!(error = %e, "skipping unreadable entry");
                continue;
            }
        };
        if entry.file_type().is_file() && has_log_extension(entry.path(), &scan.extensions) {
            files.push(entry.into_path());
        }
    }

    files.sort();
    tracing::debug!(root = %root.display(), found = files.len(), "log files discovered");
    Ok(files)
}

/// True when `pattern` contains glob metacharacters.
pub fn is_glob(pattern: &str) -> bool {
    pattern.contains(['*', '?', '[', '{'])
}

/// Files matching `pattern`, sorted by path.
///
/// `*` stays within one directory and `**` crosses directories. A pattern
/// without a separator matches file names anywhere below the current
/// directory.
pub fn glob_files(pattern: &str) -> anyhow::Result<Vec<PathBuf>> {
    let matcher = GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .with_context(|| format!("invalid glob pattern: {pattern}"))?
        .compile_matcher();

    let by_name = !pattern.contains('/');
    let root = if by_name {
        PathBuf::new()
    } else {
        literal_prefix(pattern)
    };
    let implicit_root = root.as_os_str().is_empty();
    let walk_root = if implicit_root { Path::new(".") } else { root.as_path() };
    if !walk_root.is_dir() {
        tracing::debug!(pattern, root = %walk_root.display(), "glob root does not exist");
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(walk_root) {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                tracing::warn!(error = %e, "skipping unreadable entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let path = if implicit_root {
            entry.path().strip_prefix(".").unwrap_or(entry.path())
        } else {
            entry.path()
        };
        let hit = if by_name {
            matcher.is_match(entry.file_name())
        } else {
            matcher.is_match(path)
        };
        if hit {
            files.push(path.to_path_buf());
        }
    }

    files.sort();
    tracing::debug!(pattern, found = files.len(), "glob expanded");
    Ok(files)
}

/// Expand glob arguments in place, keeping plain paths as given.
pub fn expand_paths(paths: &[PathBuf]) -> anyhow::Result<Vec<PathBuf>> {
    let mut expanded = Vec::with_capacity(paths.len());
    for path in paths {
        let text = path.to_string_lossy();
        if !is_glob(&text) {
            expanded.push(path.clone());
            continue;
        }
        let matches = glob_files(&text)?;
        if matches.is_empty() {
            tracing::warn!(pattern = %text, "glob matched no files");
        }
        expanded.extend(matches);
    }
    Ok(expanded)
}

/// Leading directories of `pattern` before the first glob component.
fn literal_prefix(pattern: &str) -> PathBuf {
    let mut root = PathBuf::new();
    let mut components = Path::new(pattern).components().peekable();
    while let Some(component) = components.next() {
        // The last component names files, never the walk root.
        if components.peek().is_none() {
            break;
        }
        match component {
            Component::Normal(part) if is_glob(&part.to_string_lossy()) => break,
            _ => root.push(component),
        }
    }
    root
}

fn is_excluded(root: &Path, entry: &DirEntry, scan: &ScanConfig) -> bool {
    let name = entry.file_name().to_string_lossy();
    let relative = entry
        .path()
        .strip_prefix(root)
        .unwrap_or(entry.path())
        .to_string_lossy();
    scan.exclude.iter().any(|pattern| match pattern.strip_prefix('*') {
        Some(suffix) => name.ends_with(suffix),
        None => relative.contains(pattern.as_str()),
    })
}

fn has_log_extension(path: &Path, extensions: &[String]) -> bool {
    let Some(ext) = path.extension() else {
        return false;
    };
    let ext = format!(".{}", ext.to_string_lossy().to_lowercase());
    extensions.iter().any(|e| e.to_lowercase() == ext)
}
