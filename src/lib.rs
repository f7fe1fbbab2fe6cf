// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! ctxweave - Source-to-source rewriting of Go packages.
//!
//! Two transforms are provided:
//!
//! - **context**: every function declaration and interface method gains a
//!   leading `ctx context.Context` parameter unless it already has one
//! - **trace**: every function with a named context parameter opens a tracing
//!   span on entry and closes it on exit
//!
//! # Architecture
//!
//! - [`syntax`] - Lossless Go source model, parser and printer
//! - [`transform`] - Declaration classification, import handling and the transforms
//! - [`orchestrator`] - Directory traversal, per-file pipeline and output modes
//! - [`config`] - Configuration loading and merging
//! - [`telemetry`] - Tracing, metrics, and observability infrastructure
//! - [`error`] - Error types and result aliases
//!
//! # Example
//!
//! ```rust,ignore
//! use ctxweave::config::{load_config, CliOptions};
//! use ctxweave::orchestrator::{run, stdout_emitter, RunSettings};
//! use ctxweave::transform::TransformKind;
//!
//! let config = load_config(Path::new("."), CliOptions::default())?;
//! let transform = TransformKind::Trace.build(&config);
//! let summary = run(vec!["./pkg".into()], RunSettings::from_config(&config), transform, stdout_emitter()).await;
//! ```

pub mod config;
pub mod error;
pub mod orchestrator;
pub mod syntax;
pub mod telemetry;
pub mod transform;

// Re-export commonly used types at crate root
pub use config::{load_config, CliOptions, ResolvedConfig};
pub use error::{ConfigError, Result, TransformError};
pub use orchestrator::{FileOutcome, OutputMode, RunSettings, RunSummary};
pub use syntax::{print, GoParser, SourceUnit};
pub use transform::{ContextInjector, SpanInjector, Transform, TransformKind, TransformReport};

/// ctxweave version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
