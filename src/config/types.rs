// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Configuration type definitions.
//!
//! Defines the structure of workspace and resolved configuration,
//! supporting JSON and YAML formats.

use serde::{Deserialize, Serialize};

/// Workspace configuration for ctxweave.
/// Can be defined in .ctxweave.json, .ctxweave.yaml or ctxweave.config.json.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceConfig {
    /// Descend into subdirectories
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recursive: Option<bool>,

    /// Overwrite input files instead of writing derived files
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rewrite: Option<bool>,

    /// Print results instead of writing them
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dry_run: Option<bool>,

    /// File name prefix of derived output files
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_prefix: Option<String>,

    /// Glob patterns of entries to leave alone
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude: Option<Vec<String>>,

    /// Context parameter settings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<ContextConfigPartial>,

    /// Span instrumentation settings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracing: Option<TracingConfigPartial>,
}

/// Context parameter settings (partial, for workspace config).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextConfigPartial {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub import_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub param_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub add_missing_import: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_imports: Option<bool>,
}

/// Span instrumentation settings (partial, for workspace config).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TracingConfigPartial {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub import_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_function: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span_var: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub close_method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rebind_context: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_if_imported: Option<bool>,
}

/// Context parameter settings (resolved).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextConfig {
    /// Import path of the context package
    pub import_path: String,
    /// Selector of the context type inside the package
    pub type_name: String,
    /// Name of a synthesized context parameter
    pub param_name: String,
    /// Import the context package into files that lack it
    pub add_missing_import: bool,
    /// Sort an import declaration after adding to it
    pub sort_imports: bool,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            import_path: "context".to_string(),
            type_name: "Context".to_string(),
            param_name: "ctx".to_string(),
            add_missing_import: false,
            sort_imports: true,
        }
    }
}

/// Span instrumentation settings (resolved).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TracingConfig {
    /// Import path of the tracing package
    pub import_path: String,
    /// Package name used when the import has no alias
    pub package: String,
    /// Function that opens a span from a context
    pub start_function: String,
    /// Local bound to the opened span
    pub span_var: String,
    /// Method that closes the span
    pub close_method: String,
    /// Bind the derived context too: `span, ctx := ...`
    pub rebind_context: bool,
    /// Leave files that already import the tracing package alone
    pub skip_if_imported: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            import_path: "github.com/opentracing/opentracing-go".to_string(),
            package: "opentracing".to_string(),
            start_function: "StartSpanFromContext".to_string(),
            span_var: "span".to_string(),
            close_method: "Close".to_string(),
            rebind_context: false,
            skip_if_imported: true,
        }
    }
}

/// Resolved configuration with all values set.
/// This is the merged result of global, workspace, local, and CLI configs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedConfig {
    pub recursive: bool,
    pub rewrite: bool,
    pub dry_run: bool,
    pub output_prefix: String,
    pub exclude: Vec<String>,
    pub context: ContextConfig,
    pub tracing: TracingConfig,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            recursive: false,
            rewrite: false,
            dry_run: false,
            output_prefix: "gen_".to_string(),
            exclude: Vec::new(),
            context: ContextConfig::default(),
            tracing: TracingConfig::default(),
        }
    }
}
