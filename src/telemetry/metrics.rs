// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Process-wide pipeline metrics.
//!
//! Counts per-file terminal states and rewritten declarations, and keeps a
//! latency histogram for each pipeline [`Stage`]. Worker tasks record into
//! [`GLOBAL_METRICS`]; the binary prints a report at the end of a run.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use once_cell::sync::Lazy;

/// Global metrics instance.
pub static GLOBAL_METRICS: Lazy<Metrics> = Lazy::new(Metrics::new);

/// A timed step of the per-file pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    Parse,
    Transform,
    Print,
    Write,
}

impl Stage {
    pub const ALL: [Stage; 4] = [Stage::Parse, Stage::Transform, Stage::Print, Stage::Write];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Parse => "parse",
            Stage::Transform => "transform",
            Stage::Print => "print",
            Stage::Write => "write",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Default)]
struct Counters {
    stages: [StageTimings; 4],
    outcomes: BTreeMap<&'static str, u64>,
}

/// Metrics registry shared by all worker tasks.
#[derive(Debug)]
pub struct Metrics {
    counters: Mutex<Counters>,
    rewrites: AtomicU64,
    started: Instant,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            counters: Mutex::new(Counters::default()),
            rewrites: AtomicU64::new(0),
            started: Instant::now(),
        }
    }

    // a panicking worker must not take the report down with it
    fn lock(&self) -> MutexGuard<'_, Counters> {
        self.counters
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Count one file reaching a terminal state.
    pub fn record_outcome(&self, label: &'static str) {
        *self.lock().outcomes.entry(label).or_insert(0) += 1;
    }

    pub fn record_stage(&self, stage: Stage, elapsed: Duration) {
        self.lock().stages[stage.index()].record(elapsed);
    }

    /// Count rewritten declarations.
    pub fn record_rewrites(&self, count: u64) {
        self.rewrites.fetch_add(count, Ordering::Relaxed);
    }

    /// Number of files that reached the given terminal state.
    pub fn outcome_count(&self, label: &str) -> u64 {
        self.lock().outcomes.get(label).copied().unwrap_or(0)
    }

    pub fn stage_timings(&self, stage: Stage) -> StageTimings {
        self.lock().stages[stage.index()].clone()
    }

    pub fn rewrites(&self) -> u64 {
        self.rewrites.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let counters = self.lock();
        MetricsSnapshot {
            stages: Stage::ALL
                .iter()
                .map(|stage| (*stage, counters.stages[stage.index()].clone()))
                .filter(|(_, timings)| timings.count > 0)
                .collect(),
            outcomes: counters.outcomes.clone(),
            rewrites: self.rewrites(),
            elapsed: self.started.elapsed(),
        }
    }

    pub fn reset(&self) {
        *self.lock() = Counters::default();
        self.rewrites.store(0, Ordering::Relaxed);
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Timings of one stage across all files.
#[derive(Debug, Clone, Default)]
pub struct StageTimings {
    pub count: u64,
    pub total: Duration,
    pub slowest: Duration,
    pub histogram: LatencyHistogram,
}

impl StageTimings {
    fn record(&mut self, elapsed: Duration) {
        self.count += 1;
        self.total += elapsed;
        self.slowest = self.slowest.max(elapsed);
        self.histogram.record(elapsed);
    }

    pub fn mean(&self) -> Duration {
        match u32::try_from(self.count) {
            Ok(0) | Err(_) => Duration::ZERO,
            Ok(count) => self.total / count,
        }
    }
}

/// Upper bounds of the latency buckets in microseconds.
///
/// A Go file parses or prints in tens of microseconds to a few milliseconds;
/// writes can take longer.
const BUCKET_BOUNDS_US: [u64; 7] = [50, 250, 1_000, 5_000, 25_000, 100_000, 1_000_000];

/// Fixed-bucket latency histogram with one overflow bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LatencyHistogram {
    counts: [u64; BUCKET_BOUNDS_US.len() + 1],
}

impl LatencyHistogram {
    pub fn record(&mut self, elapsed: Duration) {
        let micros = u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX);
        let bucket = BUCKET_BOUNDS_US
            .iter()
            .position(|bound| micros <= *bound)
            .unwrap_or(BUCKET_BOUNDS_US.len());
        self.counts[bucket] += 1;
    }

    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    /// Upper bound of the bucket holding the `p`th percentile.
    ///
    /// The overflow bucket reports ten times the largest bound.
    pub fn percentile(&self, p: f64) -> Duration {
        let total: u64 = self.counts.iter().sum();
        if total == 0 {
            return Duration::ZERO;
        }
        let rank = ((total as f64) * p / 100.0).ceil().max(1.0) as u64;

        let mut seen = 0;
        for (bucket, count) in self.counts.iter().enumerate() {
            seen += count;
            if seen >= rank {
                let micros = BUCKET_BOUNDS_US
                    .get(bucket)
                    .copied()
                    .unwrap_or(BUCKET_BOUNDS_US[BUCKET_BOUNDS_US.len() - 1] * 10);
                return Duration::from_micros(micros);
            }
        }
        Duration::ZERO
    }

    pub fn p50(&self) -> Duration {
        self.percentile(50.0)
    }

    pub fn p99(&self) -> Duration {
        self.percentile(99.0)
    }
}

/// Point-in-time copy of the registry.
#[derive(Debug, Clone)]
pub struct MetricsSnapshot {
    /// Stages that recorded at least once, in pipeline order.
    pub stages: Vec<(Stage, StageTimings)>,
    pub outcomes: BTreeMap<&'static str, u64>,
    pub rewrites: u64,
    pub elapsed: Duration,
}

impl MetricsSnapshot {
    pub fn format_report(&self) -> String {
        let mut report = format!(
            "=== Metrics Report ===\n\nElapsed: {:.2?}\nDeclarations rewritten: {}\n",
            self.elapsed, self.rewrites
        );

        if !self.outcomes.is_empty() {
            report.push_str("\nFiles:\n");
            for (label, count) in &self.outcomes {
                report.push_str(&format!("  {}: {}\n", label, count));
            }
        }

        if !self.stages.is_empty() {
            report.push_str("\nStages:\n");
            for (stage, timings) in &self.stages {
                report.push_str(&format!(
                    "  {}: {} runs, mean {:.2?}, p50 {:.2?}, p99 {:.2?}, slowest {:.2?}\n",
                    stage,
                    timings.count,
                    timings.mean(),
                    timings.histogram.p50(),
                    timings.histogram.p99(),
                    timings.slowest
                ));
            }
        }

        report
    }
}
