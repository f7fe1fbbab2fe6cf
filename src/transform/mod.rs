// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Source transforms.
//!
//! A transform mutates one parsed [`SourceUnit`] in place and reports what it
//! did. Two transforms exist:
//!
//! - [`ContextInjector`] - Ensures every function carries a context parameter
//! - [`SpanInjector`] - Opens and closes a tracing span at the top of every
//!   function that has one
//!
//! Both are built from their configuration and shared across worker tasks as
//! `Arc<dyn Transform>`.

pub mod classify;
pub mod imports;
pub mod instrument;
pub mod signature;

pub use classify::{classify, classify_node, Classified, DeclKind, NodeShape};
pub use imports::{
    ensure_bound_import, ensure_import, import_local_name, resolve_aliases, sort_imports,
    AliasSet, ImportOutcome,
};
pub use instrument::{instrument, InstrumentOutcome, SpanInjector, SpanStyle};
pub use signature::{has_context_parameter, rewrite_signature, ContextInjector};

use std::fmt;
use std::sync::Arc;

use crate::config::ResolvedConfig;
use crate::error::TransformError;
use crate::syntax::SourceUnit;

/// Why a transform left a file alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkipReason {
    /// The file does not import the context package.
    NoContextImport,
    /// The file already imports the tracing package.
    AlreadyInstrumented,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoContextImport => "no context import",
            Self::AlreadyInstrumented => "already instrumented",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What a transform did to a unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransformReport {
    Applied {
        /// Declarations whose parameters or body changed.
        rewritten: usize,
        import_added: bool,
    },
    Skipped(SkipReason),
}

impl TransformReport {
    /// Whether the unit needs to be printed and written.
    pub fn changed(&self) -> bool {
        match self {
            Self::Applied {
                rewritten,
                import_added,
            } => *rewritten > 0 || *import_added,
            Self::Skipped(_) => false,
        }
    }
}

/// A source-to-source transform over one parsed file.
pub trait Transform: Send + Sync {
    /// Short name used in logs and metrics.
    fn name(&self) -> &'static str;

    /// Apply the transform to a unit in place.
    fn apply(&self, unit: &mut SourceUnit) -> Result<TransformReport, TransformError>;
}

/// The two transforms the command line can select.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformKind {
    Context,
    Trace,
}

impl TransformKind {
    /// Build the transform with its settings from `config`.
    pub fn build(self, config: &ResolvedConfig) -> Arc<dyn Transform> {
        match self {
            Self::Context => Arc::new(ContextInjector::new(config.context.clone())),
            Self::Trace => Arc::new(SpanInjector::new(
                config.tracing.clone(),
                config.context.clone(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_changed() {
        assert!(TransformReport::Applied {
            rewritten: 2,
            import_added: false
        }
        .changed());
        assert!(TransformReport::Applied {
            rewritten: 0,
            import_added: true
        }
        .changed());
        assert!(!TransformReport::Applied {
            rewritten: 0,
            import_added: false
        }
        .changed());
        assert!(!TransformReport::Skipped(SkipReason::NoContextImport).changed());
    }

    #[test]
    fn test_kind_builds_named_transform() {
        let config = ResolvedConfig::default();
        assert_eq!(TransformKind::Context.build(&config).name(), "context");
        assert_eq!(TransformKind::Trace.build(&config).name(), "trace");
    }

    #[test]
    fn test_skip_reason_display() {
        assert_eq!(SkipReason::NoContextImport.to_string(), "no context import");
        assert_eq!(
            SkipReason::AlreadyInstrumented.to_string(),
            "already instrumented"
        );
    }
}
