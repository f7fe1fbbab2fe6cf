// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Span instrumentation of function bodies.
//!
//! Every function declaration whose parameters carry a context gets two
//! statements at the top of its body:
//!
//! ```go
//! span := opentracing.StartSpanFromContext(ctx, "Name")
//! defer span.Close()
//! ```
//!
//! The statements are built as expression nodes, so the tracing package local
//! name, the start function, the span variable and the close method all come
//! from [`SpanStyle`].

use tracing::debug;

use crate::config::{ContextConfig, TracingConfig};
use crate::error::TransformError;
use crate::syntax::{Expr, FunctionDecl, SourceUnit, Stmt, StmtKind};

use super::classify::{classify, Classified};
use super::imports::{
    ensure_bound_import, import_local_name, resolve_aliases, AliasSet, ImportOutcome,
};
use super::signature::find_context_parameter;
use super::{SkipReason, Transform, TransformReport};

/// How the span statements are spelled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpanStyle {
    /// Local name of the tracing package in the file; `None` when it is
    /// dot-imported and the start function is called bare.
    pub tracer: Option<String>,
    pub start_function: String,
    pub span_var: String,
    pub close_method: String,
    /// Also rebind the context: `span, ctx := ...`.
    pub rebind_context: bool,
}

impl SpanStyle {
    pub fn from_config(config: &TracingConfig, tracer: Option<String>) -> Self {
        Self {
            tracer,
            start_function: config.start_function.clone(),
            span_var: config.span_var.clone(),
            close_method: config.close_method.clone(),
            rebind_context: config.rebind_context,
        }
    }

    /// `span := tracer.Start(ctx, "Name")`
    pub fn open_stmt(&self, ctx: &str, function: &str) -> Stmt {
        let mut lhs = vec![self.span_var.clone()];
        if self.rebind_context {
            lhs.push(ctx.to_string());
        }
        let start = match &self.tracer {
            Some(tracer) => Expr::selector(Expr::ident(tracer), &self.start_function),
            None => Expr::ident(&self.start_function),
        };
        let call = Expr::call(start, vec![Expr::ident(ctx), Expr::string(function)]);
        Stmt::synthetic(StmtKind::ShortVarDecl {
            lhs,
            rhs: vec![call],
        })
    }

    /// `defer span.Close()`
    pub fn close_stmt(&self) -> Stmt {
        Stmt::synthetic(StmtKind::Defer {
            call: Expr::call(
                Expr::selector(Expr::ident(&self.span_var), &self.close_method),
                vec![],
            ),
        })
    }

    /// Whether `stmt` already opens a span the way this style would.
    pub fn is_span_open(&self, stmt: &Stmt) -> bool {
        let StmtKind::ShortVarDecl { rhs, .. } = &stmt.kind else {
            return false;
        };
        let Some(Expr::Call { callee, .. }) = rhs.first() else {
            return false;
        };
        match (callee.as_ref(), self.tracer.as_deref()) {
            (Expr::Selector { operand, field }, Some(tracer)) => {
                field == &self.start_function && operand.as_ident() == Some(tracer)
            }
            (Expr::Ident(name), None) => name == &self.start_function,
            _ => false,
        }
    }
}

/// Result of instrumenting one function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstrumentOutcome {
    Instrumented,
    /// No parameter has the context type.
    NoContext,
    /// The context parameter is unnamed or `_`.
    UnnamedContext,
    /// The body already starts with a span-open statement.
    AlreadyInstrumented,
}

/// Prepend the span statements to `func`'s body.
pub fn instrument(
    func: &mut FunctionDecl,
    aliases: &AliasSet,
    type_name: &str,
    style: &SpanStyle,
) -> InstrumentOutcome {
    let Some(param) = find_context_parameter(&func.params, aliases, type_name) else {
        return InstrumentOutcome::NoContext;
    };
    let ctx = match param.first_name() {
        Some(name) if name != "_" => name.to_string(),
        _ => return InstrumentOutcome::UnnamedContext,
    };

    if func.body.stmts.first().is_some_and(|s| style.is_span_open(s)) {
        return InstrumentOutcome::AlreadyInstrumented;
    }

    let open = style.open_stmt(&ctx, &func.name);
    func.body.stmts.splice(0..0, [open, style.close_stmt()]);
    InstrumentOutcome::Instrumented
}

/// Adds span statements to every function that receives a context.
pub struct SpanInjector {
    tracing: TracingConfig,
    context: ContextConfig,
}

impl SpanInjector {
    pub fn new(tracing: TracingConfig, context: ContextConfig) -> Self {
        Self { tracing, context }
    }
}

impl Transform for SpanInjector {
    fn name(&self) -> &'static str {
        "trace"
    }

    fn apply(&self, unit: &mut SourceUnit) -> Result<TransformReport, TransformError> {
        let import_path = &self.tracing.import_path;
        if unit.imports.is_empty() {
            return Err(TransformError::MissingImportBlock {
                file: Default::default(),
                path: import_path.clone(),
            });
        }

        let imported = unit.imports.contains(import_path);
        if imported && self.tracing.skip_if_imported {
            debug!(import = %import_path, "tracing import present, skipping file");
            return Ok(TransformReport::Skipped(SkipReason::AlreadyInstrumented));
        }

        let Some(aliases) = resolve_aliases(unit, &self.context.import_path) else {
            debug!(import = %self.context.import_path, "no context import, skipping file");
            return Ok(TransformReport::Skipped(SkipReason::NoContextImport));
        };

        let tracer = import_local_name(unit, import_path, &self.tracing.package);
        let style = SpanStyle::from_config(&self.tracing, tracer);
        // a blank tracing import binds no name, so one is added like a missing import
        let bound = resolve_aliases(unit, import_path).is_some();

        let mut rewritten = 0;
        for decl in classify(unit) {
            let Classified::FunctionDeclaration(func) = decl else {
                continue;
            };
            match instrument(func, &aliases, &self.context.type_name, &style) {
                InstrumentOutcome::Instrumented => {
                    debug!(function = %func.name, "span added");
                    rewritten += 1;
                }
                InstrumentOutcome::UnnamedContext => {
                    debug!(function = %func.name, "context parameter has no usable name");
                }
                InstrumentOutcome::AlreadyInstrumented => {
                    debug!(function = %func.name, "span already present");
                }
                InstrumentOutcome::NoContext => {}
            }
        }

        let import_added = rewritten > 0
            && !bound
            && ensure_bound_import(unit, import_path)? == ImportOutcome::Added;

        Ok(TransformReport::Applied {
            rewritten,
            import_added,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::{print, Decl, GoParser};

    const OPENTRACING: &str = "github.com/opentracing/opentracing-go";

    fn parse(source: &str) -> SourceUnit {
        GoParser::new().unwrap().parse(source).unwrap()
    }

    fn run(tracing: TracingConfig, source: &str) -> (TransformReport, String) {
        let mut unit = parse(source);
        let report = SpanInjector::new(tracing, ContextConfig::default())
            .apply(&mut unit)
            .unwrap();
        (report, print(&unit))
    }

    fn default_style() -> SpanStyle {
        SpanStyle::from_config(&TracingConfig::default(), Some("opentracing".to_string()))
    }

    #[test]
    fn test_method_with_context_gets_span() {
        let source = "package example\n\nimport (\n\t\"context\"\n)\n\nfunc (s *Struct) Test1(ctx context.Context, id string) {}\n";
        let (report, output) = run(TracingConfig::default(), source);

        assert_eq!(
            report,
            TransformReport::Applied {
                rewritten: 1,
                import_added: true
            }
        );
        assert_eq!(
            output,
            "package example\n\nimport (\n\t\"context\"\n\t\"github.com/opentracing/opentracing-go\"\n)\n\nfunc (s *Struct) Test1(ctx context.Context, id string) {\n\tspan := opentracing.StartSpanFromContext(ctx, \"Test1\")\n\tdefer span.Close()\n}\n"
        );
    }

    #[test]
    fn test_existing_statements_follow_span() {
        let source = r#"package example

import (
	"context"
	"fmt"
)

func Test1(ctx context.Context, id string) {
	fmt.Println("test")
}

func Test2(id, name string) {}
"#;
        let (_, output) = run(TracingConfig::default(), source);
        assert_eq!(
            output,
            r#"package example

import (
	"context"
	"fmt"
	"github.com/opentracing/opentracing-go"
)

func Test1(ctx context.Context, id string) {
	span := opentracing.StartSpanFromContext(ctx, "Test1")
	defer span.Close()
	fmt.Println("test")
}

func Test2(id, name string) {}
"#
        );
    }

    #[test]
    fn test_file_without_context_import_is_skipped() {
        let source = "package p\n\nimport \"fmt\"\n\nfunc Run(id string) { fmt.Println(id) }\n";
        let (report, output) = run(TracingConfig::default(), source);
        assert_eq!(report, TransformReport::Skipped(SkipReason::NoContextImport));
        assert_eq!(output, source);
    }

    #[test]
    fn test_file_with_tracing_import_is_skipped() {
        let source = "package p\n\nimport (\n\t\"context\"\n\n\t\"github.com/opentracing/opentracing-go\"\n)\n\nfunc Run(ctx context.Context) {}\n";
        let (report, output) = run(TracingConfig::default(), source);
        assert_eq!(report, TransformReport::Skipped(SkipReason::AlreadyInstrumented));
        assert_eq!(output, source);
    }

    #[test]
    fn test_missing_import_block_fails() {
        let mut unit = parse("package p\n\nfunc Run() {}\n");
        let err = SpanInjector::new(TracingConfig::default(), ContextConfig::default())
            .apply(&mut unit)
            .unwrap_err();
        assert!(err.is_structural());
    }

    #[test]
    fn test_no_import_added_when_nothing_instrumented() {
        let source = "package p\n\nimport \"context\"\n\nfunc Run(id string) {}\n\nvar _ = context.Background\n";
        let (report, output) = run(TracingConfig::default(), source);
        assert_eq!(
            report,
            TransformReport::Applied {
                rewritten: 0,
                import_added: false
            }
        );
        assert_eq!(output, source);
    }

    #[test]
    fn test_guard_skips_instrumented_function() {
        let tracing = TracingConfig {
            skip_if_imported: false,
            ..Default::default()
        };
        let source = "package p\n\nimport (\n\t\"context\"\n\n\t\"github.com/opentracing/opentracing-go\"\n)\n\nfunc Run(ctx context.Context) {\n\tspan := opentracing.StartSpanFromContext(ctx, \"Run\")\n\tdefer span.Close()\n}\n";
        let (report, output) = run(tracing, source);
        assert_eq!(
            report,
            TransformReport::Applied {
                rewritten: 0,
                import_added: false
            }
        );
        assert_eq!(output, source);
    }

    #[test]
    fn test_second_pass_is_a_no_op() {
        let tracing = TracingConfig {
            skip_if_imported: false,
            ..Default::default()
        };
        let source = "package p\n\nimport \"context\"\n\nfunc Run(ctx context.Context) error { return nil }\n";
        let (_, first) = run(tracing.clone(), source);
        let (report, second) = run(tracing, &first);
        assert!(!report.changed());
        assert_eq!(first, second);
    }

    #[test]
    fn test_aliased_tracer_is_used() {
        let tracing = TracingConfig {
            skip_if_imported: false,
            ..Default::default()
        };
        let source = "package p\n\nimport (\n\tgocontext \"context\"\n\tot \"github.com/opentracing/opentracing-go\"\n)\n\nfunc Run(c gocontext.Context) {\n\twork()\n}\n";
        let (_, output) = run(tracing, source);
        assert!(output.contains("\tspan := ot.StartSpanFromContext(c, \"Run\")\n\tdefer span.Close()\n\twork()\n"));
    }

    #[test]
    fn test_dot_imported_tracer_is_called_bare() {
        let tracing = TracingConfig {
            skip_if_imported: false,
            ..Default::default()
        };
        let source = "package p\n\nimport (\n\t\"context\"\n\t. \"github.com/opentracing/opentracing-go\"\n)\n\nfunc Run(ctx context.Context) {\n\twork()\n}\n";
        let (report, output) = run(tracing.clone(), source);
        assert_eq!(
            report,
            TransformReport::Applied {
                rewritten: 1,
                import_added: false
            }
        );
        assert_eq!(
            output,
            "package p\n\nimport (\n\t\"context\"\n\t. \"github.com/opentracing/opentracing-go\"\n)\n\nfunc Run(ctx context.Context) {\n\tspan := StartSpanFromContext(ctx, \"Run\")\n\tdefer span.Close()\n\twork()\n}\n"
        );

        let (report, second) = run(tracing, &output);
        assert!(!report.changed());
        assert_eq!(second, output);
    }

    #[test]
    fn test_blank_tracer_import_gets_named_import() {
        let tracing = TracingConfig {
            skip_if_imported: false,
            ..Default::default()
        };
        let source = "package p\n\nimport (\n\t\"context\"\n\t_ \"github.com/opentracing/opentracing-go\"\n)\n\nfunc Run(ctx context.Context) {}\n";
        let (report, output) = run(tracing, source);
        assert_eq!(
            report,
            TransformReport::Applied {
                rewritten: 1,
                import_added: true
            }
        );
        assert_eq!(
            output,
            "package p\n\nimport (\n\t\"context\"\n\t_ \"github.com/opentracing/opentracing-go\"\n\t\"github.com/opentracing/opentracing-go\"\n)\n\nfunc Run(ctx context.Context) {\n\tspan := opentracing.StartSpanFromContext(ctx, \"Run\")\n\tdefer span.Close()\n}\n"
        );
    }

    #[test]
    fn test_rebind_and_custom_names() {
        let tracing = TracingConfig {
            span_var: "sp".to_string(),
            close_method: "Finish".to_string(),
            rebind_context: true,
            ..Default::default()
        };
        let source = "package p\n\nimport \"context\"\n\nfunc Run(ctx context.Context) {}\n";
        let (_, output) = run(tracing, source);
        assert_eq!(
            output,
            "package p\n\nimport (\n\t\"context\"\n\t\"github.com/opentracing/opentracing-go\"\n)\n\nfunc Run(ctx context.Context) {\n\tsp, ctx := opentracing.StartSpanFromContext(ctx, \"Run\")\n\tdefer sp.Finish()\n}\n"
        );
    }

    #[test]
    fn test_unnamed_context_is_skipped() {
        let mut unit = parse("package p\n\nimport \"context\"\n\nfunc Run(context.Context) {}\n\nfunc Skip(_ context.Context) {}\n");
        let aliases = resolve_aliases(&unit, "context").unwrap();
        let style = default_style();
        for decl in &mut unit.decls {
            if let Decl::Function(func) = decl {
                assert_eq!(
                    instrument(func, &aliases, "Context", &style),
                    InstrumentOutcome::UnnamedContext
                );
            }
        }
        assert!(!unit.is_modified());
    }

    #[test]
    fn test_instrument_prepends_in_order() {
        let mut unit = parse("package p\n\nimport \"context\"\n\nfunc Run(ctx context.Context) {\n\ta()\n\tb()\n}\n");
        let aliases = resolve_aliases(&unit, "context").unwrap();
        let style = default_style();
        let Decl::Function(func) = &mut unit.decls[0] else {
            panic!("Expected function");
        };

        assert_eq!(
            instrument(func, &aliases, "Context", &style),
            InstrumentOutcome::Instrumented
        );
        assert_eq!(func.body.stmts.len(), 4);
        assert!(style.is_span_open(&func.body.stmts[0]));
        assert!(matches!(func.body.stmts[1].kind, StmtKind::Defer { .. }));
        assert!(!func.body.stmts[2].origin.is_synthetic());
        assert!(!func.body.stmts[3].origin.is_synthetic());

        assert_eq!(
            instrument(func, &aliases, "Context", &style),
            InstrumentOutcome::AlreadyInstrumented
        );
    }

    #[test]
    fn test_span_statements_render() {
        let style = default_style();
        let source = "";
        assert_eq!(
            style.open_stmt("ctx", "Test1").render(source),
            "span := opentracing.StartSpanFromContext(ctx, \"Test1\")"
        );
        assert_eq!(style.close_stmt().render(source), "defer span.Close()");
        assert_eq!(OPENTRACING, TracingConfig::default().import_path);
    }
}
