// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Context parameter matching and signature rewriting.
//!
//! A parameter carries the context capability when its type is
//! `<alias>.Context` for some local name bound to the context package, or a
//! bare `Context` when that package is dot-imported. Functions and signatures
//! without one get a synthesized parameter prepended.

use tracing::debug;

use crate::config::ContextConfig;
use crate::error::TransformError;
use crate::syntax::{Parameter, ParameterList, SourceUnit, TypeRef};

use super::classify::{classify, Classified};
use super::imports::{
    default_package_name, ensure_bound_import, resolve_aliases, sort_imports, AliasSet,
    ImportOutcome,
};
use super::{SkipReason, Transform, TransformReport};

/// Whether a single parameter has the context type.
///
/// Variadic parameters never match: `...context.Context` is a slice.
pub fn is_context_parameter(param: &Parameter, aliases: &AliasSet, type_name: &str) -> bool {
    if param.variadic {
        return false;
    }
    match &param.ty {
        TypeRef::Qualified { package, name } => name == type_name && aliases.contains(package),
        TypeRef::Named(name) => aliases.is_dot_imported() && name == type_name,
        TypeRef::Other(_) => false,
    }
}

/// First parameter with the context type, if any.
pub fn find_context_parameter<'p>(
    list: &'p ParameterList,
    aliases: &AliasSet,
    type_name: &str,
) -> Option<&'p Parameter> {
    list.iter()
        .find(|p| is_context_parameter(p, aliases, type_name))
}

pub fn has_context_parameter(list: &ParameterList, aliases: &AliasSet, type_name: &str) -> bool {
    find_context_parameter(list, aliases, type_name).is_some()
}

/// Return a copy of `list` with a context parameter prepended.
///
/// The new parameter is named `param_name` unless every existing parameter is
/// unnamed; Go rejects lists that mix named and unnamed parameters.
pub fn rewrite_signature(
    list: &ParameterList,
    aliases: &AliasSet,
    param_name: &str,
    type_name: &str,
) -> ParameterList {
    let ty = match aliases.qualifier() {
        Some(package) => TypeRef::Qualified {
            package: package.to_string(),
            name: type_name.to_string(),
        },
        None => TypeRef::Named(type_name.to_string()),
    };
    let unnamed = !list.is_empty() && list.iter().all(|p| !p.is_named());
    let name = if unnamed { None } else { Some(param_name) };

    let mut params = Vec::with_capacity(list.len() + 1);
    params.push(Parameter::synthetic(name, ty));
    params.extend(list.iter().cloned());

    ParameterList {
        params,
        span: list.span,
        layout: list.layout.clone(),
    }
}

/// Ensures every function declaration and signature takes a context.
pub struct ContextInjector {
    config: ContextConfig,
}

impl ContextInjector {
    pub fn new(config: ContextConfig) -> Self {
        Self { config }
    }

    /// Alias set to match against, and whether the import still has to be added.
    fn aliases(&self, unit: &SourceUnit) -> Result<Option<(AliasSet, bool)>, TransformError> {
        let path = &self.config.import_path;
        if let Some(aliases) = resolve_aliases(unit, path) {
            return Ok(Some((aliases, false)));
        }
        if !self.config.add_missing_import {
            return Ok(None);
        }
        if unit.imports.is_empty() {
            return Err(TransformError::MissingImportBlock {
                file: Default::default(),
                path: path.clone(),
            });
        }
        Ok(Some((AliasSet::fallback_only(default_package_name(path)), true)))
    }
}

impl Transform for ContextInjector {
    fn name(&self) -> &'static str {
        "context"
    }

    fn apply(&self, unit: &mut SourceUnit) -> Result<TransformReport, TransformError> {
        let Some((aliases, needs_import)) = self.aliases(unit)? else {
            debug!(import = %self.config.import_path, "no context import, skipping file");
            return Ok(TransformReport::Skipped(SkipReason::NoContextImport));
        };

        let type_name = &self.config.type_name;
        let mut rewritten = 0;
        for decl in classify(unit) {
            let kind = decl.kind();
            let (params, name) = match decl {
                Classified::FunctionDeclaration(f) => (&mut f.params, f.name.as_str()),
                Classified::FunctionSignature(s) => (&mut s.params, s.name.as_str()),
                Classified::Other => continue,
            };

            if has_context_parameter(params, &aliases, type_name) {
                debug!(function = name, %kind, "context parameter present");
                continue;
            }

            *params = rewrite_signature(params, &aliases, &self.config.param_name, type_name);
            debug!(function = name, %kind, "context parameter added");
            rewritten += 1;
        }

        let mut import_added = false;
        if needs_import && rewritten > 0 {
            import_added =
                ensure_bound_import(unit, &self.config.import_path)? == ImportOutcome::Added;
            if import_added && self.config.sort_imports {
                sort_imports(unit);
            }
        }

        Ok(TransformReport::Applied {
            rewritten,
            import_added,
        })
    }
}
