// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Configuration module for ctxweave.
//!
//! Handles loading, merging, and validation of configuration from multiple sources:
//! - Global config: ~/.ctxweave/config.json
//! - Workspace config: .ctxweave.json, .ctxweave.yaml, or ctxweave.config.json
//! - Local config: .ctxweave.local.json (gitignored, for personal overrides)
//! - CLI options: command-line flags
//!
//! Configuration is merged with precedence (CLI > local > workspace > global > defaults).

mod loader;
mod merger;
mod types;

pub use loader::{
    find_workspace_root, global_config_path, load_config_file, load_global_config,
    load_local_config, load_workspace_config, workspace_config_path, ConfigFormat, CONFIG_FILES,
    GLOBAL_CONFIG_DIR, GLOBAL_CONFIG_FILE, LOCAL_CONFIG_FILE,
};

pub use merger::{default_config, merge_config, validate, CliOptions};

pub use types::{
    ContextConfig, ContextConfigPartial, ResolvedConfig, TracingConfig, TracingConfigPartial,
    WorkspaceConfig,
};

use crate::error::ConfigError;
use std::path::Path;

/// Load, merge and validate all configuration sources for a workspace.
///
/// This is the main entry point for configuration loading.
pub fn load_config(
    workspace_root: &Path,
    cli_options: CliOptions,
) -> Result<ResolvedConfig, ConfigError> {
    let global = load_global_config()?;
    let workspace = load_workspace_config(workspace_root)?;
    let local = load_local_config(workspace_root)?;

    let config = merge_config(global, workspace, local, cli_options);
    validate(&config)?;
    Ok(config)
}
