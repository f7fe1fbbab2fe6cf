// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Declaration classification.
//!
//! Two levels: [`classify_node`] maps tree-sitter node kinds to the shapes the
//! lowering cares about, and [`classify`] walks a parsed unit and yields each
//! declaration together with its kind. Both are purely structural; names
//! never influence the result.

use std::fmt;

use crate::syntax::{Decl, FunctionDecl, FunctionSignature, SourceUnit};

/// Shape of a tree-sitter node at the declaration level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeShape {
    Package,
    Import,
    /// Function or method declaration (with or without a body).
    Function,
    /// `type ...` declaration; may hold interfaces or function types.
    TypeDeclaration,
    /// `name Type` or `name = Type` inside a type declaration.
    TypeSpec,
    Interface,
    /// Method element inside an interface type.
    InterfaceMethod,
    FunctionType,
    Comment,
    Other,
}

/// Classify a tree-sitter node kind from the Go grammar.
pub fn classify_node(kind: &str) -> NodeShape {
    match kind {
        "package_clause" => NodeShape::Package,
        "import_declaration" => NodeShape::Import,
        "function_declaration" | "method_declaration" => NodeShape::Function,
        "type_declaration" => NodeShape::TypeDeclaration,
        "type_spec" | "type_alias" => NodeShape::TypeSpec,
        "interface_type" => NodeShape::Interface,
        // `method_spec` in older grammar releases
        "method_elem" | "method_spec" => NodeShape::InterfaceMethod,
        "function_type" => NodeShape::FunctionType,
        "comment" => NodeShape::Comment,
        _ => NodeShape::Other,
    }
}

/// Kind of a declaration in a [`SourceUnit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclKind {
    /// Has a body.
    FunctionDeclaration,
    /// Interface method, function type or body-less prototype.
    FunctionSignature,
    Other,
}

impl DeclKind {
    pub fn of(decl: &Decl) -> Self {
        match decl {
            Decl::Function(_) => Self::FunctionDeclaration,
            Decl::Signature(_) => Self::FunctionSignature,
            Decl::Other(_) => Self::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FunctionDeclaration => "function",
            Self::FunctionSignature => "signature",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for DeclKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A declaration paired with its kind, borrowed mutably from its unit.
#[derive(Debug)]
pub enum Classified<'u> {
    FunctionDeclaration(&'u mut FunctionDecl),
    FunctionSignature(&'u mut FunctionSignature),
    Other,
}

impl Classified<'_> {
    pub fn kind(&self) -> DeclKind {
        match self {
            Self::FunctionDeclaration(_) => DeclKind::FunctionDeclaration,
            Self::FunctionSignature(_) => DeclKind::FunctionSignature,
            Self::Other => DeclKind::Other,
        }
    }
}

/// Lazily classify every declaration of a unit, in source order.
pub fn classify(unit: &mut SourceUnit) -> impl Iterator<Item = Classified<'_>> {
    unit.decls.iter_mut().map(|decl| match decl {
        Decl::Function(f) => Classified::FunctionDeclaration(f),
        Decl::Signature(s) => Classified::FunctionSignature(s),
        Decl::Other(_) => Classified::Other,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::GoParser;

    #[test]
    fn test_classify_node_kinds() {
        assert_eq!(classify_node("function_declaration"), NodeShape::Function);
        assert_eq!(classify_node("method_declaration"), NodeShape::Function);
        assert_eq!(classify_node("method_elem"), NodeShape::InterfaceMethod);
        assert_eq!(classify_node("method_spec"), NodeShape::InterfaceMethod);
        assert_eq!(classify_node("function_type"), NodeShape::FunctionType);
        assert_eq!(classify_node("var_declaration"), NodeShape::Other);
        assert_eq!(classify_node("func_literal"), NodeShape::Other);
    }

    #[test]
    fn test_classify_unit() {
        let mut parser = GoParser::new().unwrap();
        let mut unit = parser
            .parse(
                r#"package example

type Fn func(string) error

type Store interface {
	Get(id string) error
	Put(id string) error
}

type Plain struct{}

var x = 1

func Run(id string) {}

func (p *Plain) Close() error { return nil }
"#,
            )
            .unwrap();

        let kinds: Vec<DeclKind> = classify(&mut unit).map(|c| c.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                DeclKind::FunctionSignature,
                DeclKind::FunctionSignature,
                DeclKind::FunctionSignature,
                DeclKind::Other,
                DeclKind::Other,
                DeclKind::FunctionDeclaration,
                DeclKind::FunctionDeclaration,
            ]
        );
    }

    #[test]
    fn test_classify_ignores_function_literals() {
        let mut parser = GoParser::new().unwrap();
        let mut unit = parser
            .parse("package p\n\nvar handler = func(id string) {}\n")
            .unwrap();

        let kinds: Vec<DeclKind> = classify(&mut unit).map(|c| c.kind()).collect();
        assert_eq!(kinds, vec![DeclKind::Other]);
    }

    #[test]
    fn test_decl_kind_display() {
        assert_eq!(DeclKind::FunctionDeclaration.to_string(), "function");
        assert_eq!(DeclKind::FunctionSignature.to_string(), "signature");
    }
}
