//! Recursive descent parser for the expression language.
//!
//! Produces a flat tree in an `ExprArena`. Every call shape, global
//! `f(args)` or receiver `t.f(args)`, is offered to the macro registry
//! before a `Call` node is built, so the tree handed to later phases already
//! has its macros expanded.
//!
//! Syntax errors stop the parse with a single diagnostic. Macro misuse does
//! not: expanders leave `Error` nodes, and all of them are collected from the
//! finished tree at once.

mod cursor;
mod grammar;
pub mod lexer;

use cel_diagnostic::{macro_error, Diagnostic};
use cel_ir::visitor::collect_errors;
use cel_ir::{ExprArena, ExprId};
use cel_macros::MacroRegistry;

use crate::cursor::Cursor;

/// Maximum nesting of parenthesised, list, map and call argument
/// expressions.
pub const MAX_NESTING_DEPTH: usize = 250;

/// Output of one parse.
#[derive(Debug)]
pub struct ParseOutput {
    pub arena: ExprArena,
    /// Root of the tree; `None` when a syntax error stopped the parse.
    pub root: Option<ExprId>,
    pub diagnostics: Vec<Diagnostic>,
}

impl ParseOutput {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }
}

/// Parse `source`, expanding macros from `macros` as calls are recognised.
#[tracing::instrument(level = "trace", skip(macros))]
pub fn parse(source: &str, macros: &MacroRegistry) -> ParseOutput {
    let mut arena = ExprArena::new();
    let tokens = match lexer::lex(source) {
        Ok(tokens) => tokens,
        Err(diag) => {
            return ParseOutput {
                arena,
                root: None,
                diagnostics: vec![diag],
            }
        }
    };

    let mut parser = Parser {
        cursor: Cursor::new(tokens),
        arena: &mut arena,
        macros,
        depth: 0,
    };
    match parser.parse_root() {
        Ok(root) => {
            let diagnostics = collect_errors(&arena, root)
                .into_iter()
                .map(|(id, message)| macro_error(arena.span(id), &message))
                .collect();
            ParseOutput {
                arena,
                root: Some(root),
                diagnostics,
            }
        }
        Err(diag) => ParseOutput {
            arena,
            root: None,
            diagnostics: vec![diag],
        },
    }
}

/// Parser state.
pub(crate) struct Parser<'a> {
    cursor: Cursor,
    arena: &'a mut ExprArena,
    macros: &'a MacroRegistry,
    depth: usize,
}

#[cfg(test)]
mod tests;
