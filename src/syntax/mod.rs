// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Go syntax adapter.
//!
//! Turns Go source text into a mutable [`SourceUnit`] and back:
//!
//! - **Parsing**: tree-sitter with the Go grammar; malformed input is an error
//! - **Model**: imports, function declarations and signatures with their
//!   parameter lists and bodies; everything else is kept as spans
//! - **Printing**: deterministic; untouched text is copied byte for byte and
//!   only changed nodes are re-rendered
//!
//! # Example
//!
//! ```rust,ignore
//! use ctxweave::syntax::{print, GoParser};
//!
//! let mut parser = GoParser::new()?;
//! let unit = parser.parse("package main\n\nfunc main() {}\n")?;
//! assert_eq!(print(&unit), "package main\n\nfunc main() {}\n");
//! ```

pub mod parser;
pub mod printer;
pub mod types;

pub use parser::GoParser;
pub use printer::print;
pub use types::{
    quote_go, Body, Decl, Expr, FunctionDecl, FunctionSignature, ImportDecl, ImportList,
    ImportSpec, ListLayout, Origin, Parameter, ParameterList, SignatureShape, SourceUnit, Span,
    Stmt, StmtKind, TypeRef,
};
