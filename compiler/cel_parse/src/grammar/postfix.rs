//! Member access, calls, indexing, and the macro hook.

use cel_diagnostic::Diagnostic;
use cel_ir::operators::{INDEX, OPT_INDEX, OPT_SELECT};
use cel_ir::{ExprFactory, ExprId, ExprKind, Literal, Span};
use cel_macros::MacroStyle;

use crate::lexer::TokenKind;
use crate::Parser;

impl Parser<'_> {
    pub(super) fn parse_member(&mut self) -> Result<ExprId, Diagnostic> {
        let primary = self.parse_primary()?;
        self.parse_postfix(primary)
    }

    /// Apply `.f`, `.f(args)`, `.?f`, `[i]`, `[?i]` and `T{...}` suffixes.
    pub(super) fn parse_postfix(&mut self, mut expr: ExprId) -> Result<ExprId, Diagnostic> {
        loop {
            match self.cursor.current_kind() {
                TokenKind::Dot => {
                    self.cursor.advance();
                    if self.cursor.eat(&TokenKind::Question) {
                        let (field, field_span) = self.cursor.expect_ident()?;
                        let name = self
                            .arena
                            .alloc(ExprKind::Literal(Literal::String(field)), field_span);
                        let span = self.span_of(expr).merge(field_span);
                        expr = self.alloc_call(OPT_SELECT, None, vec![expr, name], span);
                        continue;
                    }
                    let (field, field_span) = self.cursor.expect_ident()?;
                    if self.cursor.check(&TokenKind::LParen) {
                        let args = self.parse_call_args()?;
                        let span = self.span_of(expr).merge(self.cursor.previous_span());
                        expr = self.call(&field, Some(expr), args, span);
                    } else {
                        let span = self.span_of(expr).merge(field_span);
                        expr = self.arena.alloc(
                            ExprKind::Select {
                                operand: expr,
                                field,
                                test_only: false,
                            },
                            span,
                        );
                    }
                }
                TokenKind::LBracket => {
                    self.cursor.advance();
                    let function = if self.cursor.eat(&TokenKind::Question) {
                        OPT_INDEX
                    } else {
                        INDEX
                    };
                    let index = self.parse_expr()?;
                    let close = self.cursor.expect(&TokenKind::RBracket)?.span;
                    let span = self.span_of(expr).merge(close);
                    expr = self.alloc_call(function, None, vec![expr, index], span);
                }
                TokenKind::LBrace => match self.qualified_name(expr) {
                    Some(type_name) => expr = self.parse_struct(type_name, self.span_of(expr))?,
                    None => return Ok(expr),
                },
                _ => return Ok(expr),
            }
        }
    }

    /// `(a, b, ...)` after a function name.
    pub(super) fn parse_call_args(&mut self) -> Result<Vec<ExprId>, Diagnostic> {
        self.cursor.expect(&TokenKind::LParen)?;
        let mut args = Vec::new();
        if !self.cursor.check(&TokenKind::RParen) {
            loop {
                args.push(self.parse_expr()?);
                if !self.cursor.eat(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.cursor.expect(&TokenKind::RParen)?;
        Ok(args)
    }

    /// Build a call, giving a matching macro the chance to replace it.
    pub(super) fn call(
        &mut self,
        function: &str,
        target: Option<ExprId>,
        args: Vec<ExprId>,
        span: Span,
    ) -> ExprId {
        let style = if target.is_some() {
            MacroStyle::Receiver
        } else {
            MacroStyle::Global
        };
        let macros = self.macros;
        if let Some(mac) = macros.lookup(function, style, args.len()) {
            let mut factory = ExprFactory::new(self.arena, span);
            if let Some(expanded) = mac.expand(&mut factory, target, &args) {
                tracing::trace!(function, argc = args.len(), "expanded macro");
                return expanded;
            }
        }
        self.alloc_call(function, target, args, span)
    }

    /// Dotted name spelled by an identifier/selection chain, if `id` is one.
    fn qualified_name(&self, id: ExprId) -> Option<String> {
        match self.arena.kind(id) {
            ExprKind::Ident(name) => Some(name.clone()),
            ExprKind::Select {
                operand,
                field,
                test_only: false,
            } => {
                let mut prefix = self.qualified_name(*operand)?;
                prefix.push('.');
                prefix.push_str(field);
                Some(prefix)
            }
            _ => None,
        }
    }
}
