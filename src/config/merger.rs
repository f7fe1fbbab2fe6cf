// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Configuration merging.
//!
//! Handles merging configurations from different sources with proper precedence.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::ConfigError;

use super::types::{ResolvedConfig, WorkspaceConfig};

/// CLI options that can override configuration.
#[derive(Debug, Clone, Default)]
pub struct CliOptions {
    pub recursive: Option<bool>,
    pub rewrite: Option<bool>,
    pub dry_run: Option<bool>,
}

/// Default configuration values.
pub fn default_config() -> ResolvedConfig {
    ResolvedConfig::default()
}

/// Merge multiple configurations with precedence.
///
/// Precedence (highest to lowest):
/// 1. CLI options
/// 2. Local config (.ctxweave.local.json)
/// 3. Workspace config (.ctxweave.json)
/// 4. Global config (~/.ctxweave/config.json)
/// 5. Default values
pub fn merge_config(
    global: Option<WorkspaceConfig>,
    workspace: Option<WorkspaceConfig>,
    local: Option<WorkspaceConfig>,
    cli: CliOptions,
) -> ResolvedConfig {
    let mut result = default_config();

    for config in [global, workspace, local].into_iter().flatten() {
        apply_workspace_config(&mut result, &config);
    }

    apply_cli_options(&mut result, &cli);

    result
}

fn apply_workspace_config(result: &mut ResolvedConfig, config: &WorkspaceConfig) {
    if let Some(recursive) = config.recursive {
        result.recursive = recursive;
    }

    if let Some(rewrite) = config.rewrite {
        result.rewrite = rewrite;
    }

    if let Some(dry_run) = config.dry_run {
        result.dry_run = dry_run;
    }

    if let Some(ref prefix) = config.output_prefix {
        result.output_prefix = prefix.clone();
    }

    if let Some(ref exclude) = config.exclude {
        for pattern in exclude {
            if !result.exclude.contains(pattern) {
                result.exclude.push(pattern.clone());
            }
        }
    }

    if let Some(ref context) = config.context {
        let target = &mut result.context;
        if let Some(ref path) = context.import_path {
            target.import_path = path.clone();
        }
        if let Some(ref name) = context.type_name {
            target.type_name = name.clone();
        }
        if let Some(ref name) = context.param_name {
            target.param_name = name.clone();
        }
        if let Some(add) = context.add_missing_import {
            target.add_missing_import = add;
        }
        if let Some(sort) = context.sort_imports {
            target.sort_imports = sort;
        }
    }

    if let Some(ref tracing) = config.tracing {
        let target = &mut result.tracing;
        if let Some(ref path) = tracing.import_path {
            target.import_path = path.clone();
        }
        if let Some(ref package) = tracing.package {
            target.package = package.clone();
        }
        if let Some(ref function) = tracing.start_function {
            target.start_function = function.clone();
        }
        if let Some(ref var) = tracing.span_var {
            target.span_var = var.clone();
        }
        if let Some(ref method) = tracing.close_method {
            target.close_method = method.clone();
        }
        if let Some(rebind) = tracing.rebind_context {
            target.rebind_context = rebind;
        }
        if let Some(skip) = tracing.skip_if_imported {
            target.skip_if_imported = skip;
        }
    }
}

fn apply_cli_options(result: &mut ResolvedConfig, cli: &CliOptions) {
    if let Some(recursive) = cli.recursive {
        result.recursive = recursive;
    }

    if let Some(rewrite) = cli.rewrite {
        result.rewrite = rewrite;
    }

    if let Some(dry_run) = cli.dry_run {
        result.dry_run = dry_run;
    }
}

/// Check that every name the transforms write into Go source is usable there.
pub fn validate(config: &ResolvedConfig) -> Result<(), ConfigError> {
    let identifiers = [
        ("context.typeName", &config.context.type_name),
        ("context.paramName", &config.context.param_name),
        ("tracing.package", &config.tracing.package),
        ("tracing.startFunction", &config.tracing.start_function),
        ("tracing.spanVar", &config.tracing.span_var),
        ("tracing.closeMethod", &config.tracing.close_method),
    ];
    for (field, value) in identifiers {
        if !is_go_identifier(value) {
            return Err(ConfigError::InvalidValue {
                field: field.to_string(),
                message: format!("'{}' is not a Go identifier", value),
            });
        }
    }

    let paths = [
        ("context.importPath", &config.context.import_path),
        ("tracing.importPath", &config.tracing.import_path),
    ];
    for (field, value) in paths {
        if !IMPORT_PATH.is_match(value) {
            return Err(ConfigError::InvalidValue {
                field: field.to_string(),
                message: format!("'{}' is not an import path", value),
            });
        }
    }

    // an empty prefix would make derived output overwrite its input
    if config.output_prefix.is_empty() {
        return Err(ConfigError::InvalidValue {
            field: "outputPrefix".to_string(),
            message: "must not be empty".to_string(),
        });
    }

    if config.output_prefix.contains(['/', '\\']) {
        return Err(ConfigError::InvalidValue {
            field: "outputPrefix".to_string(),
            message: "must not contain path separators".to_string(),
        });
    }

    Ok(())
}

static GO_IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\p{L}_][\p{L}\p{Nd}_]*$").unwrap());

/// Non-empty, no whitespace, quotes or backslashes.
static IMPORT_PATH: Lazy<Regex> = Lazy::new(|| Regex::new(r#"^[^\s"\\]+$"#).unwrap());

/// `_` is a valid identifier but names nothing, so it is rejected.
fn is_go_identifier(name: &str) -> bool {
    name != "_" && GO_IDENTIFIER.is_match(name)
}
