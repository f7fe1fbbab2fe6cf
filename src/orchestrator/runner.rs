// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Per-file processing.
//!
//! A file moves through read, parse, transform, print and write (or emit).
//! Every step can fail; the failure ends that file only.

use std::fmt;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{error, info, warn};

#[cfg(feature = "telemetry")]
use crate::telemetry::GLOBAL_METRICS;

use crate::error::TransformError;
use crate::syntax::{print, GoParser};
use crate::telemetry::FileSpan;
use crate::timed;
use crate::transform::{SkipReason, Transform, TransformReport};

/// Where printed output goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputMode {
    /// Write `<prefix><name>` next to the input.
    Derived { prefix: String },
    /// Overwrite the input.
    InPlace,
    /// Emit to the emitter; never touch storage.
    Dry,
}

impl OutputMode {
    /// Dry run wins over rewrite.
    pub fn from_flags(rewrite: bool, dry_run: bool, prefix: impl Into<String>) -> Self {
        if dry_run {
            Self::Dry
        } else if rewrite {
            Self::InPlace
        } else {
            Self::Derived {
                prefix: prefix.into(),
            }
        }
    }

    /// File to write the output of `input` to, or `None` in dry-run mode.
    pub fn target_path(&self, input: &Path) -> Option<PathBuf> {
        match self {
            Self::Derived { prefix } => {
                let name = input.file_name()?.to_string_lossy();
                Some(input.with_file_name(format!("{}{}", prefix, name)))
            }
            Self::InPlace => Some(input.to_path_buf()),
            Self::Dry => None,
        }
    }
}

/// Terminal state of a successfully handled file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    Written(PathBuf),
    Emitted,
    Skipped(SkipReason),
}

impl FileOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Written(_) => "written",
            Self::Emitted => "emitted",
            Self::Skipped(_) => "skipped",
        }
    }
}

impl fmt::Display for FileOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Written(path) => write!(f, "written to {}", path.display()),
            Self::Emitted => write!(f, "emitted"),
            Self::Skipped(reason) => write!(f, "skipped ({})", reason),
        }
    }
}

/// Receives printed output in dry-run mode.
pub type Emitter = Arc<dyn Fn(&Path, &str) + Send + Sync>;

/// Emitter that prints each file to stdout under a `// path` header.
///
/// Stdout is locked per file so output of concurrent roots never interleaves.
pub fn stdout_emitter() -> Emitter {
    Arc::new(|path: &Path, text: &str| {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        let result = writeln!(out, "// {}", path.display())
            .and_then(|_| out.write_all(text.as_bytes()))
            .and_then(|_| out.flush());
        if let Err(e) = result {
            warn!(path = %path.display(), error = %e, "Failed to emit output");
        }
    })
}

/// Runs one transform over files, one at a time.
///
/// Owns its parser, so each worker task builds its own processor.
pub struct FileProcessor {
    parser: GoParser,
    transform: Arc<dyn Transform>,
    mode: OutputMode,
    emitter: Emitter,
}

impl FileProcessor {
    pub fn new(
        transform: Arc<dyn Transform>,
        mode: OutputMode,
        emitter: Emitter,
    ) -> Result<Self, TransformError> {
        Ok(Self {
            parser: GoParser::new()?,
            transform,
            mode,
            emitter,
        })
    }

    pub fn mode(&self) -> &OutputMode {
        &self.mode
    }

    /// Process one file, logging the outcome.
    pub fn process(&mut self, path: &Path) -> Result<FileOutcome, TransformError> {
        let span = FileSpan::start(self.transform.name(), path);
        let result = {
            let _entered = span.enter();
            self.run(path)
        };

        match &result {
            Ok(outcome) => {
                info!(path = %path.display(), transform = self.transform.name(), "{}", outcome);
                span.finish(outcome.label());
            }
            Err(e) => {
                error!(
                    path = %path.display(),
                    transform = self.transform.name(),
                    error = %e,
                    "Failed to process file"
                );
                span.finish("failed");
            }
        }

        result
    }

    fn run(&mut self, path: &Path) -> Result<FileOutcome, TransformError> {
        let text = std::fs::read_to_string(path).map_err(|e| TransformError::io(path, e))?;
        let mut unit = self.parser.parse(&text)?;

        let report = {
            let _timer = timed!(Transform);
            self.transform
                .apply(&mut unit)
                .map_err(|e| e.with_file(path))?
        };

        // a file with nothing to rewrite is still printed and written
        let rewritten = match report {
            TransformReport::Skipped(reason) => return Ok(FileOutcome::Skipped(reason)),
            TransformReport::Applied { rewritten, .. } => rewritten,
        };

        #[cfg(feature = "telemetry")]
        GLOBAL_METRICS.record_rewrites(rewritten as u64);
        #[cfg(not(feature = "telemetry"))]
        let _ = rewritten;

        let output = print(&unit);
        match self.mode.target_path(path) {
            Some(target) => {
                let _timer = timed!(Write);
                std::fs::write(&target, output).map_err(|e| TransformError::io(&target, e))?;
                Ok(FileOutcome::Written(target))
            }
            None => {
                (self.emitter)(path, &output);
                Ok(FileOutcome::Emitted)
            }
        }
    }
}
