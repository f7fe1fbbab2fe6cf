// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Tree-sitter based Go parsing.
//!
//! Parses Go source with the tree-sitter grammar and lowers the concrete tree
//! into the [`SourceUnit`] model. Only imports, function declarations and
//! function signatures are modelled in detail; every other declaration is
//! kept as a span.

use tree_sitter::{Node, Parser};

use crate::error::TransformError;
use crate::timed;
use crate::transform::classify::{classify_node, NodeShape};

use super::types::{
    Body, Decl, Expr, FunctionDecl, FunctionSignature, ImportDecl, ImportList, ImportSpec,
    ListLayout, Origin, Parameter, ParameterList, SignatureShape, SourceUnit, Span, Stmt,
    StmtKind, TypeRef,
};

/// Go parser using tree-sitter.
pub struct GoParser {
    parser: Parser,
}

impl GoParser {
    /// Create a new parser for Go.
    pub fn new() -> Result<Self, TransformError> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_go::LANGUAGE.into())
            .map_err(|e| TransformError::Language(format!("Failed to set Go language: {}", e)))?;
        Ok(Self { parser })
    }

    /// Parse Go source text into a source unit.
    ///
    /// Malformed input is reported, never recovered: any error or missing
    /// node in the tree fails the parse.
    pub fn parse(&mut self, text: &str) -> Result<SourceUnit, TransformError> {
        let _timer = timed!(Parse);

        let tree = self
            .parser
            .parse(text, None)
            .ok_or_else(|| TransformError::parse_at(0, 0, "parser produced no tree"))?;
        let root = tree.root_node();

        if root.has_error() {
            return Err(first_error(&root));
        }

        let unit = Lowering { source: text }.source_unit(&root)?;
        Ok(unit)
    }
}

/// Locate the first error or missing node for reporting.
fn first_error(root: &Node) -> TransformError {
    let mut found = None;
    walk_tree(root, &mut |node| {
        if found.is_none() && (node.is_error() || node.is_missing()) {
            let pos = node.start_position();
            let message = if node.is_missing() {
                format!("missing {}", node.kind())
            } else {
                "unexpected syntax".to_string()
            };
            found = Some(TransformError::parse_at(pos.row, pos.column, message));
        }
    });
    found.unwrap_or_else(|| TransformError::parse_at(0, 0, "syntax error"))
}

/// Walk the tree depth-first, calling the callback for each node.
fn walk_tree<F>(node: &Node, callback: &mut F)
where
    F: FnMut(&Node),
{
    callback(node);
    for i in 0..node.child_count() {
        if let Some(child) = node.child(i) {
            walk_tree(&child, callback);
        }
    }
}

/// Lowers a tree-sitter tree into the source model.
struct Lowering<'a> {
    source: &'a str,
}

impl<'a> Lowering<'a> {
    fn text(&self, node: &Node) -> &'a str {
        node.utf8_text(self.source.as_bytes()).unwrap_or("")
    }

    fn span(node: &Node) -> Span {
        Span::new(node.start_byte(), node.end_byte())
    }

    /// Whitespace at the start of the line containing `pos`.
    fn line_indent(&self, pos: usize) -> String {
        let line_start = self.source[..pos].rfind('\n').map(|i| i + 1).unwrap_or(0);
        self.source[line_start..]
            .chars()
            .take_while(|c| *c == ' ' || *c == '\t')
            .collect()
    }

    fn source_unit(&self, root: &Node) -> Result<SourceUnit, TransformError> {
        let mut package = None;
        let mut imports = ImportList::default();
        let mut decls = Vec::new();

        let mut cursor = root.walk();
        for child in root.named_children(&mut cursor) {
            match classify_node(child.kind()) {
                NodeShape::Package => {
                    let mut inner = child.walk();
                    package = child
                        .named_children(&mut inner)
                        .find(|n| n.kind() == "package_identifier")
                        .map(|n| self.text(&n).to_string());
                }
                NodeShape::Import => imports.decls.push(self.import_decl(&child)),
                NodeShape::Function => decls.push(self.function(&child)),
                NodeShape::TypeDeclaration => self.type_declaration(&child, &mut decls),
                NodeShape::Comment => {}
                _ => decls.push(Decl::Other(Self::span(&child))),
            }
        }

        let package =
            package.ok_or_else(|| TransformError::parse_at(0, 0, "missing package clause"))?;

        Ok(SourceUnit::new(
            self.source.to_string(),
            package,
            imports,
            decls,
        ))
    }

    fn import_decl(&self, node: &Node) -> ImportDecl {
        let mut decl = ImportDecl {
            groups: vec![Vec::new()],
            footer: Vec::new(),
            grouped: false,
            span: Self::span(node),
            dirty: false,
        };

        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            match child.kind() {
                "import_spec" => {
                    let spec = self.import_spec(&child, Vec::new());
                    decl.push_parsed(spec);
                }
                "import_spec_list" => {
                    decl.grouped = true;
                    self.import_spec_list(&child, &mut decl);
                }
                _ => {}
            }
        }

        decl
    }

    /// Collect specs and comments of a parenthesized import list, splitting
    /// runs at blank lines.
    fn import_spec_list(&self, list: &Node, decl: &mut ImportDecl) {
        let mut pending: Vec<String> = Vec::new();
        let mut last_row: Option<usize> = None;
        let mut last_was_spec = false;

        let mut cursor = list.walk();
        for child in list.named_children(&mut cursor) {
            let start_row = child.start_position().row;
            match child.kind() {
                "comment" => {
                    let text = self.text(&child).to_string();
                    let trailing = last_was_spec && last_row == Some(start_row);
                    if trailing {
                        if let Some(spec) = decl.groups.last_mut().and_then(|g| g.last_mut()) {
                            spec.comment = Some(text);
                        }
                    } else {
                        if pending.is_empty() {
                            Self::split_group(decl, last_row, start_row);
                        }
                        pending.push(text);
                    }
                    last_was_spec = false;
                }
                "import_spec" => {
                    if pending.is_empty() {
                        Self::split_group(decl, last_row, start_row);
                    }
                    let spec = self.import_spec(&child, std::mem::take(&mut pending));
                    decl.push_parsed(spec);
                    last_was_spec = true;
                }
                _ => continue,
            }
            last_row = Some(child.end_position().row);
        }

        decl.footer = pending;
    }

    fn split_group(decl: &mut ImportDecl, last_row: Option<usize>, start_row: usize) {
        let gap = matches!(last_row, Some(row) if start_row > row + 1);
        let current_empty = decl.groups.last().map(|g| g.is_empty()).unwrap_or(true);
        if gap && !current_empty {
            decl.groups.push(Vec::new());
        }
    }

    fn import_spec(&self, node: &Node, leading: Vec<String>) -> ImportSpec {
        let alias = node
            .child_by_field_name("name")
            .map(|n| self.text(&n).to_string());
        let literal = node
            .child_by_field_name("path")
            .map(|n| self.text(&n).to_string())
            .unwrap_or_default();

        ImportSpec {
            alias,
            path: unquote(&literal),
            literal,
            comment: None,
            leading,
            origin: Origin::Parsed(Self::span(node)),
        }
    }

    fn function(&self, node: &Node) -> Decl {
        let span = Self::span(node);
        let name = node
            .child_by_field_name("name")
            .map(|n| self.text(&n).to_string())
            .unwrap_or_default();
        let Some(params) = node.child_by_field_name("parameters") else {
            return Decl::Other(span);
        };
        let params = self.parameter_list(&params);

        match node.child_by_field_name("body") {
            Some(block) => Decl::Function(FunctionDecl {
                name,
                receiver: node
                    .child_by_field_name("receiver")
                    .map(|r| self.text(&r).to_string()),
                params,
                body: self.body(&block, self.line_indent(span.start)),
                span,
            }),
            None => Decl::Signature(FunctionSignature {
                name,
                owner: None,
                shape: SignatureShape::Prototype,
                params,
                span,
            }),
        }
    }

    fn type_declaration(&self, node: &Node, decls: &mut Vec<Decl>) {
        let mut cursor = node.walk();
        for spec in node.named_children(&mut cursor) {
            if classify_node(spec.kind()) != NodeShape::TypeSpec {
                continue;
            }
            let name = spec
                .child_by_field_name("name")
                .map(|n| self.text(&n).to_string())
                .unwrap_or_default();
            let Some(ty) = spec.child_by_field_name("type") else {
                decls.push(Decl::Other(Self::span(&spec)));
                continue;
            };

            match classify_node(ty.kind()) {
                NodeShape::Interface => {
                    let before = decls.len();
                    let mut inner = ty.walk();
                    for elem in ty.named_children(&mut inner) {
                        if classify_node(elem.kind()) != NodeShape::InterfaceMethod {
                            continue;
                        }
                        let Some(params) = elem.child_by_field_name("parameters") else {
                            continue;
                        };
                        decls.push(Decl::Signature(FunctionSignature {
                            name: elem
                                .child_by_field_name("name")
                                .map(|n| self.text(&n).to_string())
                                .unwrap_or_default(),
                            owner: Some(name.clone()),
                            shape: SignatureShape::InterfaceMethod,
                            params: self.parameter_list(&params),
                            span: Self::span(&elem),
                        }));
                    }
                    if decls.len() == before {
                        decls.push(Decl::Other(Self::span(&spec)));
                    }
                }
                NodeShape::FunctionType => match ty.child_by_field_name("parameters") {
                    Some(params) => decls.push(Decl::Signature(FunctionSignature {
                        name,
                        owner: None,
                        shape: SignatureShape::FunctionType,
                        params: self.parameter_list(&params),
                        span: Self::span(&spec),
                    })),
                    None => decls.push(Decl::Other(Self::span(&spec))),
                },
                _ => decls.push(Decl::Other(Self::span(&spec))),
            }
        }
    }

    fn parameter_list(&self, node: &Node) -> ParameterList {
        let mut params = Vec::new();
        let mut first_start = None;

        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            match child.kind() {
                "parameter_declaration" | "variadic_parameter_declaration" => {
                    first_start.get_or_insert(child.start_byte());
                    params.push(self.parameter(&child));
                }
                _ => {}
            }
        }

        let layout = match first_start {
            Some(start) if self.source[node.start_byte() + 1..start].contains('\n') => {
                ListLayout::Multiline {
                    indent: self.line_indent(start),
                }
            }
            _ => ListLayout::Inline,
        };

        ParameterList {
            params,
            span: Self::span(node),
            layout,
        }
    }

    fn parameter(&self, node: &Node) -> Parameter {
        let mut cursor = node.walk();
        let names = node
            .children_by_field_name("name", &mut cursor)
            .map(|n| self.text(&n).to_string())
            .collect();
        let ty = node
            .child_by_field_name("type")
            .map(|t| self.type_ref(&t))
            .unwrap_or_else(|| TypeRef::Other(String::new()));

        Parameter {
            names,
            ty,
            variadic: node.kind() == "variadic_parameter_declaration",
            origin: Origin::Parsed(Self::span(node)),
        }
    }

    fn type_ref(&self, node: &Node) -> TypeRef {
        match node.kind() {
            "qualified_type" => {
                let package = node.child_by_field_name("package");
                let name = node.child_by_field_name("name");
                match (package, name) {
                    (Some(package), Some(name)) => TypeRef::Qualified {
                        package: self.text(&package).to_string(),
                        name: self.text(&name).to_string(),
                    },
                    _ => TypeRef::Other(self.text(node).to_string()),
                }
            }
            "type_identifier" => TypeRef::Named(self.text(node).to_string()),
            _ => TypeRef::Other(self.text(node).to_string()),
        }
    }

    fn body(&self, block: &Node, indent: String) -> Body {
        let mut stmts = Vec::new();

        let mut cursor = block.walk();
        for child in block.named_children(&mut cursor) {
            match child.kind() {
                "comment" => {}
                // newer grammar releases wrap statements in a list node
                "statement_list" => {
                    let mut inner = child.walk();
                    for stmt in child.named_children(&mut inner) {
                        if stmt.kind() != "comment" {
                            stmts.push(self.statement(&stmt));
                        }
                    }
                }
                _ => stmts.push(self.statement(&child)),
            }
        }

        Body {
            stmts,
            span: Self::span(block),
            indent,
        }
    }

    fn statement(&self, node: &Node) -> Stmt {
        let kind = match node.kind() {
            "short_var_declaration" => {
                let lhs = node
                    .child_by_field_name("left")
                    .map(|l| self.expression_list(&l))
                    .unwrap_or_default()
                    .into_iter()
                    .map(|e| e.to_string())
                    .collect();
                let rhs = node
                    .child_by_field_name("right")
                    .map(|r| self.expression_list(&r))
                    .unwrap_or_default();
                StmtKind::ShortVarDecl { lhs, rhs }
            }
            "defer_statement" => {
                let mut cursor = node.walk();
                let call = node
                    .named_children(&mut cursor)
                    .find(|n| n.kind() != "comment")
                    .map(|n| self.expr(&n));
                match call {
                    Some(call) => StmtKind::Defer { call },
                    None => StmtKind::Other,
                }
            }
            _ => StmtKind::Other,
        };

        Stmt {
            kind,
            origin: Origin::Parsed(Self::span(node)),
        }
    }

    fn expression_list(&self, node: &Node) -> Vec<Expr> {
        let mut cursor = node.walk();
        node.named_children(&mut cursor)
            .filter(|n| n.kind() != "comment")
            .map(|n| self.expr(&n))
            .collect()
    }

    fn expr(&self, node: &Node) -> Expr {
        match node.kind() {
            "identifier" | "field_identifier" | "package_identifier" => {
                Expr::Ident(self.text(node).to_string())
            }
            "selector_expression" => {
                match (
                    node.child_by_field_name("operand"),
                    node.child_by_field_name("field"),
                ) {
                    (Some(operand), Some(field)) => {
                        Expr::selector(self.expr(&operand), self.text(&field))
                    }
                    _ => Expr::Verbatim(self.text(node).to_string()),
                }
            }
            "call_expression" => {
                match (
                    node.child_by_field_name("function"),
                    node.child_by_field_name("arguments"),
                ) {
                    (Some(function), Some(arguments)) => {
                        Expr::call(self.expr(&function), self.expression_list(&arguments))
                    }
                    _ => Expr::Verbatim(self.text(node).to_string()),
                }
            }
            "interpreted_string_literal" => Expr::StringLit(unquote(self.text(node))),
            _ => Expr::Verbatim(self.text(node).to_string()),
        }
    }
}

impl ImportDecl {
    fn push_parsed(&mut self, spec: ImportSpec) {
        match self.groups.last_mut() {
            Some(group) => group.push(spec),
            None => self.groups.push(vec![spec]),
        }
    }
}

/// Strip the quotes of a Go string literal and resolve simple escapes.
fn unquote(literal: &str) -> String {
    if let Some(raw) = literal
        .strip_prefix('`')
        .and_then(|s| s.strip_suffix('`'))
    {
        return raw.to_string();
    }
    let inner = literal
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(literal);

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
