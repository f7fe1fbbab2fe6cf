// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Per-file spans and stage timers.

use std::path::Path;
use std::time::{Duration, Instant};

use tracing::{info_span, Span};

use super::metrics::Stage;

/// Tracing span covering one source file from read to write.
///
/// `finish` records the elapsed time and terminal state on the span and
/// counts the state in the global metrics.
pub struct FileSpan {
    span: Span,
    opened: Instant,
}

impl FileSpan {
    pub fn start(transform: &'static str, path: &Path) -> Self {
        Self {
            span: info_span!(
                "file",
                transform,
                path = %path.display(),
                outcome = tracing::field::Empty,
                elapsed_ms = tracing::field::Empty,
            ),
            opened: Instant::now(),
        }
    }

    pub fn enter(&self) -> tracing::span::Entered<'_> {
        self.span.enter()
    }

    pub fn finish(self, outcome: &'static str) {
        self.span.record("outcome", outcome);
        self.span
            .record("elapsed_ms", self.opened.elapsed().as_secs_f64() * 1000.0);

        #[cfg(feature = "telemetry")]
        super::metrics::GLOBAL_METRICS.record_outcome(outcome);
    }
}

/// Times one pipeline stage and records it when stopped or dropped.
///
/// Dropping records too, so a stage left through `?` is still counted.
pub struct StageTimer {
    stage: Stage,
    started: Instant,
    recorded: bool,
}

impl StageTimer {
    pub fn start(stage: Stage) -> Self {
        Self {
            stage,
            started: Instant::now(),
            recorded: false,
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn stop(mut self) -> Duration {
        self.record()
    }

    fn record(&mut self) -> Duration {
        let elapsed = self.started.elapsed();
        if !self.recorded {
            self.recorded = true;
            #[cfg(feature = "telemetry")]
            super::metrics::GLOBAL_METRICS.record_stage(self.stage, elapsed);
        }
        elapsed
    }
}

impl Drop for StageTimer {
    fn drop(&mut self) {
        self.record();
    }
}

/// Start a [`StageTimer`] for the named stage.
///
/// ```rust,ignore
/// let _timer = timed!(Write);
/// std::fs::write(&target, output)?;
/// ```
#[macro_export]
macro_rules! timed {
    ($stage:ident) => {
        $crate::telemetry::StageTimer::start($crate::telemetry::Stage::$stage)
    };
}
