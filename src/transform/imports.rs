// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Import list maintenance.
//!
//! Ensures a path is imported exactly once, resolves the local names an
//! import binds, and sorts modified import declarations.

use std::path::PathBuf;

use tracing::debug;

use crate::error::TransformError;
use crate::syntax::{ImportSpec, SourceUnit};

/// Result of [`ensure_import`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportOutcome {
    AlreadyPresent,
    Added,
}

/// Make sure `path` is imported.
///
/// Any import declaration listing `path`, under any alias, counts as present.
/// Otherwise an unaliased entry is appended to the first import declaration.
/// A unit without any import declaration is a structural precondition
/// failure, never a silent skip.
pub fn ensure_import(unit: &mut SourceUnit, path: &str) -> Result<ImportOutcome, TransformError> {
    if unit.imports.contains(path) {
        debug!(path, "import already present");
        return Ok(ImportOutcome::AlreadyPresent);
    }
    append_import(unit, path)
}

/// Make sure `path` is reachable under some name.
///
/// Like [`ensure_import`], except that blank imports do not count: a file
/// importing `path` only as `_` gets an unaliased entry added.
pub fn ensure_bound_import(
    unit: &mut SourceUnit,
    path: &str,
) -> Result<ImportOutcome, TransformError> {
    if resolve_aliases(unit, path).is_some() {
        debug!(path, "import already bound");
        return Ok(ImportOutcome::AlreadyPresent);
    }
    append_import(unit, path)
}

fn append_import(unit: &mut SourceUnit, path: &str) -> Result<ImportOutcome, TransformError> {
    let decl = unit
        .imports
        .decls
        .first_mut()
        .ok_or_else(|| TransformError::MissingImportBlock {
            file: PathBuf::new(),
            path: path.to_string(),
        })?;
    decl.push(ImportSpec::new(path));

    debug!(path, "import added");
    Ok(ImportOutcome::Added)
}

/// Sort each run of consecutive specs by path in every modified import
/// declaration, dropping exact duplicates inside a run.
pub fn sort_imports(unit: &mut SourceUnit) {
    for decl in unit.imports.decls.iter_mut().filter(|d| d.dirty) {
        for group in &mut decl.groups {
            group.sort_by(|a, b| a.path.cmp(&b.path));
            group.dedup_by(|a, b| a.path == b.path && a.alias == b.alias);
        }
    }
}

/// Default package name of an import path: its last element.
pub fn default_package_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Local names under which a package is reachable in one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasSet {
    bound: Vec<String>,
    dot: bool,
    fallback: String,
}

impl AliasSet {
    /// An alias set with no import bindings, matching only `fallback`.
    pub fn fallback_only(fallback: impl Into<String>) -> Self {
        Self {
            bound: Vec::new(),
            dot: false,
            fallback: fallback.into(),
        }
    }

    /// Whether `qualifier.Name` refers to the package.
    pub fn contains(&self, qualifier: &str) -> bool {
        qualifier == self.fallback || self.bound.iter().any(|b| b == qualifier)
    }

    /// Whether the package is dot-imported, making its names unqualified.
    pub fn is_dot_imported(&self) -> bool {
        self.dot
    }

    /// Qualifier to use for newly written references, if any.
    ///
    /// `None` means the package is only dot-imported and references are bare.
    pub fn qualifier(&self) -> Option<&str> {
        match self.bound.first() {
            Some(name) => Some(name),
            None if self.dot => None,
            None => Some(&self.fallback),
        }
    }

    /// All accepted qualifiers, bound names first.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.bound
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(self.fallback.as_str()))
    }
}

/// Resolve every local name the imports of `path` bind in `unit`.
///
/// Returns `None` when no import of `path` binds a name: the unit does not
/// import it at all, or only as `_`.
pub fn resolve_aliases(unit: &SourceUnit, path: &str) -> Option<AliasSet> {
    let default = default_package_name(path);
    let mut set = AliasSet::fallback_only(default);

    for spec in unit.imports.specs().filter(|s| s.path == path) {
        match spec.alias.as_deref() {
            None => push_unique(&mut set.bound, default),
            Some(".") => set.dot = true,
            Some("_") => {}
            Some(alias) => push_unique(&mut set.bound, alias),
        }
    }

    (!set.bound.is_empty() || set.dot).then_some(set)
}

/// Qualifier to spell references into `path` with.
///
/// `None` when the package is only dot-imported and references are bare.
/// When no import binds a name, `default` is returned; the caller is
/// expected to add the import with [`ensure_bound_import`].
pub fn import_local_name(unit: &SourceUnit, path: &str, default: &str) -> Option<String> {
    match resolve_aliases(unit, path) {
        Some(aliases) => aliases.qualifier().map(str::to_string),
        None => Some(default.to_string()),
    }
}

fn push_unique(names: &mut Vec<String>, name: &str) {
    if !names.iter().any(|n| n == name) {
        names.push(name.to_string());
    }
}
