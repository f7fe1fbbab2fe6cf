// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Subscriber setup.

use std::io::{self, IsTerminal};

use tracing::Level;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

/// How log output is filtered and formatted.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Level for ctxweave's own events when `RUST_LOG` is unset.
    pub level: Level,

    /// Explicit filter; takes precedence over `RUST_LOG` and `level`.
    pub directive: Option<String>,

    /// Log each file span when it closes, with its timing.
    pub show_spans: bool,

    /// Prefix events with target, file and line.
    pub show_source: bool,

    pub ansi: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            level: Level::WARN,
            directive: None,
            show_spans: false,
            show_source: false,
            ansi: io::stderr().is_terminal(),
        }
    }
}

impl TelemetryConfig {
    /// `-v` logs one line per file; `--debug` adds per-declaration decisions,
    /// closed file spans and source locations.
    pub fn from_flags(verbose: bool, debug: bool) -> Self {
        let base = Self::default();
        if debug {
            Self {
                level: Level::DEBUG,
                show_spans: true,
                show_source: true,
                ..base
            }
        } else if verbose {
            Self {
                level: Level::INFO,
                ..base
            }
        } else {
            base
        }
    }

    pub fn with_directive(mut self, directive: impl Into<String>) -> Self {
        self.directive = Some(directive.into());
        self
    }

    pub fn with_ansi(mut self, ansi: bool) -> Self {
        self.ansi = ansi;
        self
    }

    fn default_directive(&self) -> String {
        format!("ctxweave={}", self.level)
    }

    fn filter(&self) -> EnvFilter {
        let fallback = || EnvFilter::new(self.default_directive());
        match &self.directive {
            Some(directive) => EnvFilter::try_new(directive).unwrap_or_else(|_| fallback()),
            None => EnvFilter::try_from_default_env().unwrap_or_else(|_| fallback()),
        }
    }
}

/// Keeps the subscriber installed; hold it for the life of the program.
pub struct TelemetryGuard {
    _private: (),
}

/// Install the global subscriber.
///
/// Everything goes to stderr; stdout carries dry-run output only.
pub fn init_telemetry(config: &TelemetryConfig) -> io::Result<TelemetryGuard> {
    let layer = fmt::layer()
        .with_writer(io::stderr)
        .with_ansi(config.ansi)
        .with_target(config.show_source)
        .with_file(config.show_source)
        .with_line_number(config.show_source)
        .with_span_events(if config.show_spans {
            FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        });

    let layer: Box<dyn Layer<Registry> + Send + Sync> = if config.show_source {
        layer.boxed()
    } else {
        layer.compact().boxed()
    };

    tracing_subscriber::registry()
        .with(layer)
        .with(config.filter())
        .try_init()
        .map_err(io::Error::other)?;

    Ok(TelemetryGuard { _private: () })
}
