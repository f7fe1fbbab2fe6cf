// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Locating and reading configuration files.

use std::path::{Path, PathBuf};

use crate::error::ConfigError;

use super::types::WorkspaceConfig;

/// Workspace config file names, in lookup order.
pub const CONFIG_FILES: &[&str] = &[".ctxweave.json", ".ctxweave.yaml", "ctxweave.config.json"];

/// Personal overrides next to the workspace config; usually gitignored.
pub const LOCAL_CONFIG_FILE: &str = ".ctxweave.local.json";

/// Directory under the home directory holding the global config.
pub const GLOBAL_CONFIG_DIR: &str = ".ctxweave";

pub const GLOBAL_CONFIG_FILE: &str = "config.json";

/// Serialization format of a config file, chosen by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Yaml,
}

impl ConfigFormat {
    /// `.yaml` and `.yml` are YAML; anything else is read as JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                Self::Yaml
            }
            _ => Self::Json,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "JSON",
            Self::Yaml => "YAML",
        }
    }

    /// Parse `content`, read from `path`.
    pub fn parse(self, path: &Path, content: &str) -> Result<WorkspaceConfig, ConfigError> {
        let parsed = match self {
            Self::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
            Self::Yaml => serde_yaml::from_str(content).map_err(|e| e.to_string()),
        };
        parsed.map_err(|message| ConfigError::malformed(path, self.as_str(), message))
    }
}

/// `~/.ctxweave/config.json`, if a home directory is known.
pub fn global_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(GLOBAL_CONFIG_DIR).join(GLOBAL_CONFIG_FILE))
}

/// Read and parse one config file.
pub fn load_config_file(path: &Path) -> Result<WorkspaceConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::read(path, e))?;
    ConfigFormat::from_path(path).parse(path, &content)
}

fn load_if_present(path: &Path) -> Result<Option<WorkspaceConfig>, ConfigError> {
    if path.is_file() {
        load_config_file(path).map(Some)
    } else {
        Ok(None)
    }
}

pub fn load_global_config() -> Result<Option<WorkspaceConfig>, ConfigError> {
    match global_config_path() {
        Some(path) => load_if_present(&path),
        None => Ok(None),
    }
}

/// The workspace config file in `workspace_root`, first match of [`CONFIG_FILES`].
pub fn workspace_config_path(workspace_root: &Path) -> Option<PathBuf> {
    CONFIG_FILES
        .iter()
        .map(|name| workspace_root.join(name))
        .find(|path| path.is_file())
}

pub fn load_workspace_config(workspace_root: &Path) -> Result<Option<WorkspaceConfig>, ConfigError> {
    match workspace_config_path(workspace_root) {
        Some(path) => load_config_file(&path).map(Some),
        None => Ok(None),
    }
}

pub fn load_local_config(workspace_root: &Path) -> Result<Option<WorkspaceConfig>, ConfigError> {
    load_if_present(&workspace_root.join(LOCAL_CONFIG_FILE))
}

/// Nearest ancestor of `start` (itself included) holding a workspace or
/// local config file.
pub fn find_workspace_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| {
            workspace_config_path(dir).is_some() || dir.join(LOCAL_CONFIG_FILE).is_file()
        })
        .map(Path::to_path_buf)
}
