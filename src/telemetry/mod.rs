// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Logging and pipeline metrics.
//!
//! - **Logging**: `tracing` events on stderr, one span per processed file
//! - **Metrics**: stage latencies, file outcome counters and rewrite counts
//!
//! # Usage
//!
//! ```rust,ignore
//! use ctxweave::telemetry::{init_telemetry, TelemetryConfig};
//!
//! let _guard = init_telemetry(&TelemetryConfig::from_flags(verbose, debug))?;
//! ```
//!
//! Log levels: `debug` for per-declaration decisions, `info` for per-file
//! outcomes, `warn`/`error` for files that could not be processed.

mod init;
pub mod metrics;
mod spans;

pub use init::{init_telemetry, TelemetryConfig, TelemetryGuard};
pub use metrics::{
    LatencyHistogram, Metrics, MetricsSnapshot, Stage, StageTimings, GLOBAL_METRICS,
};
pub use spans::{FileSpan, StageTimer};
