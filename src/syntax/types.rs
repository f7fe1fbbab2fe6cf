// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Types for the Go source model.
//!
//! The model keeps the original text alongside a structured view of the parts
//! the transforms touch: imports, parameter lists and function bodies. Every
//! node records whether it was parsed (with its byte span) or synthesized, so
//! the printer can copy untouched regions verbatim.

use std::fmt;

/// Byte range in the original source (end exclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Slice the source text covered by this span.
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        source.get(self.start..self.end).unwrap_or("")
    }
}

/// Where a node came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Parsed(Span),
    Synthetic,
}

impl Origin {
    pub fn span(&self) -> Option<Span> {
        match self {
            Self::Parsed(span) => Some(*span),
            Self::Synthetic => None,
        }
    }

    pub fn is_synthetic(&self) -> bool {
        matches!(self, Self::Synthetic)
    }
}

/// A type reference as written in a parameter declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeRef {
    /// `pkg.Name`
    Qualified { package: String, name: String },
    /// A bare type name, e.g. `string` or a dot-imported `Context`.
    Named(String),
    /// Any other type expression, kept as source text.
    Other(String),
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Qualified { package, name } => write!(f, "{}.{}", package, name),
            Self::Named(name) => write!(f, "{}", name),
            Self::Other(text) => write!(f, "{}", text),
        }
    }
}

/// One parameter declaration: `a, b int`, `ctx context.Context`, `string`, `args ...any`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    /// Declared names; empty for unnamed parameters.
    pub names: Vec<String>,
    pub ty: TypeRef,
    pub variadic: bool,
    pub origin: Origin,
}

impl Parameter {
    /// Build a parameter that does not exist in the source yet.
    pub fn synthetic(name: Option<&str>, ty: TypeRef) -> Self {
        Self {
            names: name.map(|n| vec![n.to_string()]).unwrap_or_default(),
            ty,
            variadic: false,
            origin: Origin::Synthetic,
        }
    }

    pub fn first_name(&self) -> Option<&str> {
        self.names.first().map(String::as_str)
    }

    pub fn is_named(&self) -> bool {
        !self.names.is_empty()
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_named() {
            write!(f, "{} ", self.names.join(", "))?;
        }
        if self.variadic {
            write!(f, "...")?;
        }
        write!(f, "{}", self.ty)
    }
}

/// How a parameter list is laid out in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListLayout {
    /// All parameters on the line of the opening parenthesis.
    Inline,
    /// One parameter per line, indented with `indent`.
    Multiline { indent: String },
}

/// A parenthesized parameter list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterList {
    pub params: Vec<Parameter>,
    /// Span from `(` to `)` inclusive.
    pub span: Span,
    pub layout: ListLayout,
}

impl ParameterList {
    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Parameter> {
        self.params.iter()
    }

    /// Whether any parameter was added after parsing.
    pub fn is_modified(&self) -> bool {
        self.params.iter().any(|p| p.origin.is_synthetic())
    }
}

/// Expression nodes the transforms build or recognize.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Ident(String),
    Selector { operand: Box<Expr>, field: String },
    Call { callee: Box<Expr>, args: Vec<Expr> },
    /// Interpreted string literal; holds the unescaped value.
    StringLit(String),
    /// Anything else, kept as source text.
    Verbatim(String),
}

impl Expr {
    pub fn ident(name: impl Into<String>) -> Self {
        Self::Ident(name.into())
    }

    pub fn selector(operand: Expr, field: impl Into<String>) -> Self {
        Self::Selector {
            operand: Box::new(operand),
            field: field.into(),
        }
    }

    pub fn call(callee: Expr, args: Vec<Expr>) -> Self {
        Self::Call {
            callee: Box::new(callee),
            args,
        }
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::StringLit(value.into())
    }

    pub fn as_ident(&self) -> Option<&str> {
        match self {
            Self::Ident(name) => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ident(name) => write!(f, "{}", name),
            Self::Selector { operand, field } => write!(f, "{}.{}", operand, field),
            Self::Call { callee, args } => {
                write!(f, "{}(", callee)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
            Self::StringLit(value) => write!(f, "{}", quote_go(value)),
            Self::Verbatim(text) => write!(f, "{}", text),
        }
    }
}

/// Quote a value as a Go interpreted string literal.
pub fn quote_go(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => out.push_str(&format!("\\x{:02x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Statement shapes inside a function body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StmtKind {
    /// `a, b := x, y`
    ShortVarDecl { lhs: Vec<String>, rhs: Vec<Expr> },
    /// `defer f(x)`
    Defer { call: Expr },
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub origin: Origin,
}

impl Stmt {
    pub fn synthetic(kind: StmtKind) -> Self {
        Self {
            kind,
            origin: Origin::Synthetic,
        }
    }

    /// Render the statement: parsed statements come back verbatim.
    pub fn render(&self, source: &str) -> String {
        if let Origin::Parsed(span) = self.origin {
            return span.text(source).to_string();
        }
        match &self.kind {
            StmtKind::ShortVarDecl { lhs, rhs } => {
                let rhs: Vec<String> = rhs.iter().map(|e| e.to_string()).collect();
                format!("{} := {}", lhs.join(", "), rhs.join(", "))
            }
            StmtKind::Defer { call } => format!("defer {}", call),
            StmtKind::Other => String::new(),
        }
    }
}

/// A function body block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Body {
    pub stmts: Vec<Stmt>,
    /// Span from `{` to `}` inclusive.
    pub span: Span,
    /// Indentation of the line holding the enclosing declaration.
    pub indent: String,
}

impl Body {
    pub fn is_modified(&self) -> bool {
        self.stmts.iter().any(|s| s.origin.is_synthetic())
    }
}

/// `func Name(...) ... { ... }` or `func (r T) Name(...) ... { ... }`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDecl {
    pub name: String,
    /// Receiver list text for methods, e.g. `(s *Struct)`.
    pub receiver: Option<String>,
    pub params: ParameterList,
    pub body: Body,
    pub span: Span,
}

/// Where a body-less signature appears.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureShape {
    /// A method inside an interface type.
    InterfaceMethod,
    /// `type F func(...)`
    FunctionType,
    /// A function declaration without a body.
    Prototype,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSignature {
    /// Method, type or function name.
    pub name: String,
    /// Enclosing interface name for interface methods.
    pub owner: Option<String>,
    pub shape: SignatureShape,
    pub params: ParameterList,
    pub span: Span,
}

/// A declaration in a source unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decl {
    Function(FunctionDecl),
    Signature(FunctionSignature),
    Other(Span),
}

/// One import: `alias "path" // comment`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSpec {
    /// Local name, `.` or `_` when present.
    pub alias: Option<String>,
    /// Unquoted import path.
    pub path: String,
    /// Path literal as written, quotes included.
    pub literal: String,
    /// Comment on the same line.
    pub comment: Option<String>,
    /// Comment lines directly above the spec.
    pub leading: Vec<String>,
    pub origin: Origin,
}

impl ImportSpec {
    /// Build an unaliased import entry.
    pub fn new(path: &str) -> Self {
        Self {
            alias: None,
            path: path.to_string(),
            literal: quote_go(path),
            comment: None,
            leading: Vec::new(),
            origin: Origin::Synthetic,
        }
    }
}

impl fmt::Display for ImportSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(alias) = &self.alias {
            write!(f, "{} ", alias)?;
        }
        write!(f, "{}", self.literal)?;
        if let Some(comment) = &self.comment {
            write!(f, " {}", comment)?;
        }
        Ok(())
    }
}

/// One `import` declaration, single or parenthesized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportDecl {
    /// Runs of specs separated by blank lines.
    pub groups: Vec<Vec<ImportSpec>>,
    /// Comments after the last spec, before `)`.
    pub footer: Vec<String>,
    pub grouped: bool,
    pub span: Span,
    /// Set when the declaration must be re-rendered.
    pub dirty: bool,
}

impl ImportDecl {
    pub fn specs(&self) -> impl Iterator<Item = &ImportSpec> {
        self.groups.iter().flatten()
    }

    /// Append a spec to the last run and mark the declaration for re-rendering.
    pub fn push(&mut self, spec: ImportSpec) {
        match self.groups.last_mut() {
            Some(group) => group.push(spec),
            None => self.groups.push(vec![spec]),
        }
        self.grouped = true;
        self.dirty = true;
    }
}

/// All import declarations of a file, in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportList {
    pub decls: Vec<ImportDecl>,
}

impl ImportList {
    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }

    pub fn specs(&self) -> impl Iterator<Item = &ImportSpec> {
        self.decls.iter().flat_map(|d| d.specs())
    }

    pub fn contains(&self, path: &str) -> bool {
        self.specs().any(|s| s.path == path)
    }
}

/// One parsed Go file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceUnit {
    source: String,
    package: String,
    pub imports: ImportList,
    pub decls: Vec<Decl>,
}

impl SourceUnit {
    pub fn new(source: String, package: String, imports: ImportList, decls: Vec<Decl>) -> Self {
        Self {
            source,
            package,
            imports,
            decls,
        }
    }

    /// The original text the unit was parsed from.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn package(&self) -> &str {
        &self.package
    }

    /// Whether any transform changed the unit since parsing.
    pub fn is_modified(&self) -> bool {
        self.imports.decls.iter().any(|d| d.dirty)
            || self.decls.iter().any(|decl| match decl {
                Decl::Function(f) => f.params.is_modified() || f.body.is_modified(),
                Decl::Signature(s) => s.params.is_modified(),
                Decl::Other(_) => false,
            })
    }
}
