// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Directory traversal and per-root fan-out.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use globset::{Glob, GlobSet, GlobSetBuilder};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

use crate::config::ResolvedConfig;
use crate::error::TransformError;
use crate::transform::Transform;

use super::runner::{Emitter, FileOutcome, FileProcessor, OutputMode};

/// Settings shared by every root of one run.
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub recursive: bool,
    pub mode: OutputMode,
    pub exclude: GlobSet,
}

impl RunSettings {
    pub fn new(recursive: bool, mode: OutputMode, exclude: &[String]) -> Self {
        Self {
            recursive,
            mode,
            exclude: build_exclude(exclude),
        }
    }

    pub fn from_config(config: &ResolvedConfig) -> Self {
        Self::new(
            config.recursive,
            OutputMode::from_flags(config.rewrite, config.dry_run, &config.output_prefix),
            &config.exclude,
        )
    }

    /// Whether an entry is excluded, by file name or by path below the root.
    fn is_excluded(&self, root: &Path, path: &Path) -> bool {
        if self.exclude.is_empty() {
            return false;
        }
        let relative = path.strip_prefix(root).unwrap_or(path);
        let by_name = path
            .file_name()
            .map(|name| self.exclude.is_match(name))
            .unwrap_or(false);
        by_name || self.exclude.is_match(relative)
    }
}

/// Compile exclude patterns; invalid patterns are logged and ignored.
fn build_exclude(patterns: &[String]) -> GlobSet {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        match Glob::new(pattern) {
            Ok(glob) => {
                builder.add(glob);
            }
            Err(e) => warn!(pattern = %pattern, error = %e, "Ignoring invalid exclude pattern"),
        }
    }
    builder.build().unwrap_or_else(|e| {
        warn!(error = %e, "Failed to build exclude patterns");
        GlobSet::empty()
    })
}

/// File counts of one or more directory walks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub written: usize,
    pub emitted: usize,
    pub skipped: usize,
    pub failed: usize,
    /// Directory arguments that could not be walked at all.
    pub failed_roots: usize,
}

impl RunSummary {
    pub fn record(&mut self, result: &Result<FileOutcome, TransformError>) {
        match result {
            Ok(FileOutcome::Written(_)) => self.written += 1,
            Ok(FileOutcome::Emitted) => self.emitted += 1,
            Ok(FileOutcome::Skipped(_)) => self.skipped += 1,
            Err(_) => self.failed += 1,
        }
    }

    pub fn merge(&mut self, other: &RunSummary) {
        self.written += other.written;
        self.emitted += other.emitted;
        self.skipped += other.skipped;
        self.failed += other.failed;
        self.failed_roots += other.failed_roots;
    }

    /// Files attempted.
    pub fn total(&self) -> usize {
        self.written + self.emitted + self.skipped + self.failed
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0 || self.failed_roots > 0
    }
}

/// Process every entry of `root` in file-name order.
///
/// Directories are descended into depth-first when recursive and ignored
/// otherwise; every other entry is handed to the processor. Only an
/// unreadable root is an error; per-entry failures are counted.
pub fn walk_root(
    root: &Path,
    settings: &RunSettings,
    processor: &mut FileProcessor,
) -> Result<RunSummary, TransformError> {
    let metadata = std::fs::metadata(root).map_err(|e| TransformError::io(root, e))?;
    if !metadata.is_dir() {
        return Err(TransformError::io(
            root,
            std::io::Error::other("not a directory"),
        ));
    }

    info!(root = %root.display(), "Processing directory");

    let max_depth = if settings.recursive { usize::MAX } else { 1 };
    // sorting makes walkdir read each directory fully before yielding it,
    // so derived files written during the walk are never picked up
    let walker = WalkDir::new(root)
        .min_depth(1)
        .max_depth(max_depth)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            let excluded = settings.is_excluded(root, entry.path());
            if excluded {
                debug!(path = %entry.path().display(), "Excluded");
            }
            !excluded
        });

    let mut summary = RunSummary::default();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let path = e
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| root.to_path_buf());
                error!(path = %path.display(), error = %e, "Failed to read directory entry");
                summary.failed += 1;
                continue;
            }
        };

        if entry.file_type().is_dir() {
            continue;
        }

        let result = processor.process(entry.path());
        summary.record(&result);
    }

    Ok(summary)
}

/// Process every root concurrently, one blocking task per root.
///
/// Waits for all tasks; a failing root never affects the others.
pub async fn run(
    roots: Vec<PathBuf>,
    settings: RunSettings,
    transform: Arc<dyn Transform>,
    emitter: Emitter,
) -> RunSummary {
    let settings = Arc::new(settings);
    let mut tasks = JoinSet::new();

    for root in roots {
        let settings = Arc::clone(&settings);
        let transform = Arc::clone(&transform);
        let emitter = Arc::clone(&emitter);
        tasks.spawn_blocking(move || {
            let result = FileProcessor::new(transform, settings.mode.clone(), emitter)
                .and_then(|mut processor| walk_root(&root, &settings, &mut processor));
            (root, result)
        });
    }

    let mut summary = RunSummary::default();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((root, Ok(dir_summary))) => {
                debug!(root = %root.display(), files = dir_summary.total(), "Directory done");
                summary.merge(&dir_summary);
            }
            Ok((root, Err(e))) => {
                error!(root = %root.display(), error = %e, "Failed to process directory");
                summary.failed_roots += 1;
            }
            Err(e) => {
                error!(error = %e, "Directory task failed");
                summary.failed_roots += 1;
            }
        }
    }

    summary
}
