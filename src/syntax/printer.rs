// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Source printing.
//!
//! The printer never re-emits the whole tree. It collects one splice per node
//! that a transform changed and applies them to the original text, so every
//! untouched byte survives as written.

use crate::timed;

use super::types::{Body, Decl, ImportDecl, ListLayout, ParameterList, SourceUnit, Span};

/// Replace `start..end` of the original text with `text`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Splice {
    start: usize,
    end: usize,
    text: String,
}

impl Splice {
    fn insert(at: usize, text: String) -> Self {
        Self {
            start: at,
            end: at,
            text,
        }
    }

    fn replace(span: Span, text: String) -> Self {
        Self {
            start: span.start,
            end: span.end,
            text,
        }
    }
}

/// Serialize a source unit back to Go source text.
pub fn print(unit: &SourceUnit) -> String {
    let _timer = timed!(Print);
    let source = unit.source();
    let mut splices = Vec::new();

    for decl in unit.imports.decls.iter().filter(|d| d.dirty) {
        splices.push(Splice::replace(decl.span, render_import_decl(decl)));
    }

    for decl in &unit.decls {
        match decl {
            Decl::Function(func) => {
                splices.extend(parameter_splice(&func.params, source));
                splices.extend(body_splice(&func.body, source));
            }
            Decl::Signature(sig) => splices.extend(parameter_splice(&sig.params, source)),
            Decl::Other(_) => {}
        }
    }

    splices.sort_by_key(|s| (s.start, s.end));

    let added: usize = splices.iter().map(|s| s.text.len()).sum();
    let mut out = String::with_capacity(source.len() + added);
    let mut cursor = 0;
    for splice in splices {
        if splice.start < cursor {
            // overlapping splices cannot come from disjoint nodes
            continue;
        }
        out.push_str(&source[cursor..splice.start]);
        out.push_str(&splice.text);
        cursor = splice.end;
    }
    out.push_str(&source[cursor..]);
    out
}

/// Render an import declaration as a parenthesized block.
fn render_import_decl(decl: &ImportDecl) -> String {
    let groups: Vec<String> = decl
        .groups
        .iter()
        .filter(|g| !g.is_empty())
        .map(|group| {
            let mut text = String::new();
            for spec in group {
                for comment in &spec.leading {
                    text.push_str(&format!("\t{}\n", comment));
                }
                text.push_str(&format!("\t{}\n", spec));
            }
            text
        })
        .collect();

    let mut out = String::from("import (\n");
    out.push_str(&groups.join("\n"));
    for comment in &decl.footer {
        out.push_str(&format!("\t{}\n", comment));
    }
    out.push(')');
    out
}

/// Insert synthetic parameters that precede every parsed one.
fn parameter_splice(list: &ParameterList, source: &str) -> Option<Splice> {
    if !list.is_modified() {
        return None;
    }

    let leading = list
        .params
        .iter()
        .take_while(|p| p.origin.is_synthetic())
        .count();

    if list.params[leading..].iter().any(|p| p.origin.is_synthetic()) {
        // synthetic parameters between parsed ones: re-render the list on one line
        let rendered: Vec<String> = list
            .params
            .iter()
            .map(|p| match p.origin.span() {
                Some(span) => span.text(source).to_string(),
                None => p.to_string(),
            })
            .collect();
        return Some(Splice::replace(list.span, format!("({})", rendered.join(", "))));
    }

    let open = list.span.start + 1;
    let inserted = &list.params[..leading];
    let text = if leading == list.params.len() {
        let rendered: Vec<String> = inserted.iter().map(|p| p.to_string()).collect();
        rendered.join(", ")
    } else {
        match &list.layout {
            ListLayout::Inline => inserted.iter().map(|p| format!("{}, ", p)).collect(),
            ListLayout::Multiline { indent } => inserted
                .iter()
                .map(|p| format!("\n{}{},", indent, p))
                .collect(),
        }
    };

    Some(Splice::insert(open, text))
}

/// Insert synthetic statements at the top of a body.
fn body_splice(body: &Body, source: &str) -> Option<Splice> {
    let leading: Vec<String> = body
        .stmts
        .iter()
        .take_while(|s| s.origin.is_synthetic())
        .map(|s| s.render(source))
        .collect();
    if leading.is_empty() {
        return None;
    }

    let open = body.span.start + 1;
    let close = body.span.end.saturating_sub(1).max(open);
    let first_parsed = body.stmts.iter().find_map(|s| s.origin.span());
    let brace_line_end = source[open..close].find('\n').map(|i| open + i);

    match brace_line_end {
        // statements start on their own lines: insert after the `{` line
        Some(at) if first_parsed.map(|s| s.start > at).unwrap_or(true) => {
            let indent = match first_parsed {
                Some(span) => line_indent(source, span.start),
                None => format!("{}\t", body.indent),
            };
            let text = leading
                .iter()
                .map(|stmt| format!("\n{}{}", indent, stmt))
                .collect();
            Some(Splice::insert(at, text))
        }
        _ => {
            let indent = format!("{}\t", body.indent);
            let mut text = String::from("{\n");
            for stmt in &leading {
                text.push_str(&format!("{}{}\n", indent, stmt));
            }
            let inner = source[open..close].trim();
            if !inner.is_empty() {
                text.push_str(&format!("{}{}\n", indent, inner));
            }
            text.push_str(&format!("{}}}", body.indent));
            Some(Splice::replace(body.span, text))
        }
    }
}

fn line_indent(source: &str, pos: usize) -> String {
    let line_start = source[..pos].rfind('\n').map(|i| i + 1).unwrap_or(0);
    source[line_start..]
        .chars()
        .take_while(|c| *c == ' ' || *c == '\t')
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::types::{Expr, ImportSpec, Parameter, Stmt, StmtKind, TypeRef};
    use crate::syntax::GoParser;

    fn parse(source: &str) -> SourceUnit {
        GoParser::new().unwrap().parse(source).unwrap()
    }

    fn ctx_param() -> Parameter {
        Parameter::synthetic(
            Some("ctx"),
            TypeRef::Qualified {
                package: "context".to_string(),
                name: "Context".to_string(),
            },
        )
    }

    fn prepend_ctx(unit: &mut SourceUnit) {
        for decl in &mut unit.decls {
            match decl {
                Decl::Function(f) => f.params.params.insert(0, ctx_param()),
                Decl::Signature(s) => s.params.params.insert(0, ctx_param()),
                Decl::Other(_) => {}
            }
        }
    }

    fn prepend_marker(unit: &mut SourceUnit) {
        for decl in &mut unit.decls {
            if let Decl::Function(f) = decl {
                f.body.stmts.insert(
                    0,
                    Stmt::synthetic(StmtKind::Defer {
                        call: Expr::call(Expr::ident("mark"), vec![]),
                    }),
                );
            }
        }
    }

    #[test]
    fn test_print_unmodified_is_identity() {
        let source = "package p\n\nimport \"fmt\"\n\n// Run runs.\nfunc Run(a int)   {\n    fmt.Println(a)\n}\n";
        let unit = parse(source);
        assert_eq!(print(&unit), source);
    }

    #[test]
    fn test_print_inline_parameter_insert() {
        let mut unit = parse("package p\n\nfunc Test2(id, name string) {}\n");
        prepend_ctx(&mut unit);
        assert_eq!(
            print(&unit),
            "package p\n\nfunc Test2(ctx context.Context, id, name string) {}\n"
        );
    }

    #[test]
    fn test_print_empty_parameter_list() {
        let mut unit = parse("package p\n\ntype Fn func()\n");
        prepend_ctx(&mut unit);
        assert_eq!(print(&unit), "package p\n\ntype Fn func(ctx context.Context)\n");
    }

    #[test]
    fn test_print_multiline_parameter_insert() {
        let mut unit = parse("package p\n\nfunc Long(\n\tid string,\n\tcount int,\n) {\n}\n");
        prepend_ctx(&mut unit);
        assert_eq!(
            print(&unit),
            "package p\n\nfunc Long(\n\tctx context.Context,\n\tid string,\n\tcount int,\n) {\n}\n"
        );
    }

    #[test]
    fn test_print_body_insert_multiline() {
        let mut unit = parse("package p\n\nfunc Run() {\n\tfmt.Println(\"test\")\n}\n");
        prepend_marker(&mut unit);
        assert_eq!(
            print(&unit),
            "package p\n\nfunc Run() {\n\tdefer mark()\n\tfmt.Println(\"test\")\n}\n"
        );
    }

    #[test]
    fn test_print_body_insert_single_line() {
        let mut unit = parse("package p\n\nfunc Run() error { return nil }\n\nfunc Empty() {}\n");
        prepend_marker(&mut unit);
        assert_eq!(
            print(&unit),
            "package p\n\nfunc Run() error {\n\tdefer mark()\n\treturn nil\n}\n\nfunc Empty() {\n\tdefer mark()\n}\n"
        );
    }

    #[test]
    fn test_print_body_insert_keeps_brace_comment() {
        let mut unit = parse("package p\n\nfunc Run() { // entry\n\twork()\n}\n");
        prepend_marker(&mut unit);
        assert_eq!(
            print(&unit),
            "package p\n\nfunc Run() { // entry\n\tdefer mark()\n\twork()\n}\n"
        );
    }

    #[test]
    fn test_print_single_import_becomes_block() {
        let mut unit = parse("package p\n\nimport \"fmt\"\n");
        unit.imports.decls[0].push(ImportSpec::new("context"));
        assert_eq!(
            print(&unit),
            "package p\n\nimport (\n\t\"fmt\"\n\t\"context\"\n)\n"
        );
    }

    #[test]
    fn test_print_import_groups_and_comments() {
        let source = "package p\n\nimport (\n\t// std\n\t\"fmt\" // print\n\n\tlog \"github.com/sirupsen/logrus\"\n)\n";
        let mut unit = parse(source);
        unit.imports.decls[0].push(ImportSpec::new("context"));
        assert_eq!(
            print(&unit),
            "package p\n\nimport (\n\t// std\n\t\"fmt\" // print\n\n\tlog \"github.com/sirupsen/logrus\"\n\t\"context\"\n)\n"
        );
    }

    #[test]
    fn test_print_round_trip_is_stable() {
        let mut unit = parse("package p\n\nimport \"fmt\"\n\nfunc Run(id string) { fmt.Println(id) }\n");
        unit.imports.decls[0].push(ImportSpec::new("context"));
        prepend_ctx(&mut unit);
        prepend_marker(&mut unit);

        let first = print(&unit);
        let second = print(&parse(&first));
        assert_eq!(first, second);
    }
}
