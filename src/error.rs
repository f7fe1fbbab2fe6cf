// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Error types for ctxweave.
//!
//! Strongly-typed errors for the transform pipeline and configuration loading,
//! defined with `thiserror`. The binary boundary propagates them through `anyhow`.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors that abort the processing of a single source file.
#[derive(Error, Debug)]
pub enum TransformError {
    #[error("IO error on {}: {message}", path.display())]
    Io { path: PathBuf, message: String },

    #[error("Parse error at {line}:{column}: {message}")]
    Parse {
        line: usize,
        column: usize,
        message: String,
    },

    #[error("No import declaration in {}: cannot add import {path}", file.display())]
    MissingImportBlock { file: PathBuf, path: String },

    #[error("Language setup failed: {0}")]
    Language(String),
}

impl TransformError {
    /// Create an IO error for a path.
    pub fn io(path: impl AsRef<Path>, err: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            message: err.to_string(),
        }
    }

    /// Create a parse error at a zero-based tree-sitter position.
    pub fn parse_at(row: usize, column: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line: row + 1,
            column: column + 1,
            message: message.into(),
        }
    }

    /// Attach the file being processed to errors raised before it was known.
    pub fn with_file(self, file: &Path) -> Self {
        match self {
            Self::MissingImportBlock { path, .. } => Self::MissingImportBlock {
                file: file.to_path_buf(),
                path,
            },
            other => other,
        }
    }

    /// Check if this error comes from violating a structural precondition
    /// rather than from IO or syntax.
    pub fn is_structural(&self) -> bool {
        matches!(self, Self::MissingImportBlock { .. })
    }
}

/// Errors from reading or validating configuration files.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read config {}: {message}", path.display())]
    Read { path: PathBuf, message: String },

    #[error("Malformed {format} in {}: {message}", path.display())]
    Malformed {
        path: PathBuf,
        format: &'static str,
        message: String,
    },

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

impl ConfigError {
    pub fn read(path: impl AsRef<Path>, err: std::io::Error) -> Self {
        Self::Read {
            path: path.as_ref().to_path_buf(),
            message: err.to_string(),
        }
    }

    pub fn malformed(
        path: impl AsRef<Path>,
        format: &'static str,
        err: impl std::fmt::Display,
    ) -> Self {
        Self::Malformed {
            path: path.as_ref().to_path_buf(),
            format,
            message: err.to_string(),
        }
    }
}

/// Result type alias using anyhow for flexible error handling.
pub type Result<T> = anyhow::Result<T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_is_one_based() {
        let err = TransformError::parse_at(0, 4, "unexpected token");
        match err {
            TransformError::Parse { line, column, .. } => {
                assert_eq!(line, 1);
                assert_eq!(column, 5);
            }
            _ => panic!("Expected Parse"),
        }
    }

    #[test]
    fn test_missing_import_block_with_file() {
        let err = TransformError::MissingImportBlock {
            file: PathBuf::new(),
            path: "context".to_string(),
        }
        .with_file(Path::new("pkg/a.go"));
        assert!(err.is_structural());
        let display = err.to_string();
        assert!(display.contains("pkg/a.go"));
        assert!(display.contains("context"));
    }

    #[test]
    fn test_io_error_display() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = TransformError::io("missing.go", io_err);
        assert!(!err.is_structural());
        assert!(err.to_string().contains("missing.go"));
    }

    #[test]
    fn test_config_errors_name_the_file() {
        let err = ConfigError::malformed(".ctxweave.yaml", "YAML", "expected a mapping");
        assert_eq!(
            err.to_string(),
            "Malformed YAML in .ctxweave.yaml: expected a mapping"
        );

        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = ConfigError::read("/home/u/.ctxweave/config.json", io_err);
        assert!(err.to_string().starts_with("Cannot read config /home/u/.ctxweave/config.json"));
    }
}
