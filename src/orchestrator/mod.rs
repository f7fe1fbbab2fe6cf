// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Traversal orchestration.
//!
//! Drives a transform over directory trees:
//!
//! - [`run`] spawns one blocking task per directory argument and waits for all
//! - [`walk_root`] visits a directory in file-name order, optionally recursing
//! - [`FileProcessor`] takes one file from read to write or emit
//!
//! Failures are logged per file and never stop siblings.
//!
//! # Example
//!
//! ```rust,ignore
//! use ctxweave::orchestrator::{run, stdout_emitter, RunSettings};
//! use ctxweave::transform::TransformKind;
//!
//! let transform = TransformKind::Context.build(&config);
//! let summary = run(roots, RunSettings::from_config(&config), transform, stdout_emitter()).await;
//! ```

mod runner;
mod walker;

pub use runner::{stdout_emitter, Emitter, FileOutcome, FileProcessor, OutputMode};
pub use walker::{run, walk_root, RunSettings, RunSummary};
