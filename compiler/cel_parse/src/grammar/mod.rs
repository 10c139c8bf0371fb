//! Expression grammar.
//!
//! Precedence, lowest first:
//! `?:`, `||`, `&&`, relations (`< <= > >= == != in`), `+ -`, `* / %`,
//! unary `! -`, then member access and primaries.
//!
//! - `mod.rs`: entry point and the binary operator chain
//! - `postfix.rs`: selection, calls, indexing and the macro hook
//! - `primary.rs`: literals, identifiers, list/map/struct literals

mod postfix;
mod primary;

use cel_diagnostic::{Diagnostic, ErrorCode};
use cel_ir::operators::{
    ADD, CONDITIONAL, DIVIDE, EQUALS, GREATER, GREATER_EQUALS, IN, LESS, LESS_EQUALS,
    LOGICAL_AND, LOGICAL_NOT, LOGICAL_OR, MODULO, MULTIPLY, NEGATE, NOT_EQUALS, SUBTRACT,
};
use cel_ir::{ExprId, ExprKind, Literal, Span};
use cel_stack::ensure_sufficient_stack;

use crate::lexer::TokenKind;
use crate::{Parser, MAX_NESTING_DEPTH};

impl Parser<'_> {
    /// Parse a complete expression followed by end of input.
    pub(crate) fn parse_root(&mut self) -> Result<ExprId, Diagnostic> {
        let root = self.parse_expr()?;
        if !self.cursor.is_at_end() {
            return Err(cel_diagnostic::unexpected_token(
                self.cursor.current_span(),
                "end of input",
                &self.cursor.current_kind().to_string(),
            ));
        }
        Ok(root)
    }

    /// Parse an expression, tracking nesting depth.
    pub(crate) fn parse_expr(&mut self) -> Result<ExprId, Diagnostic> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(Diagnostic::error(ErrorCode::E1003)
                .with_message(format!(
                    "expression nested more than {MAX_NESTING_DEPTH} levels deep"
                ))
                .with_label(self.cursor.current_span(), "nesting limit reached here"));
        }
        self.depth += 1;
        let result = ensure_sufficient_stack(|| self.parse_conditional());
        self.depth -= 1;
        result
    }

    fn parse_conditional(&mut self) -> Result<ExprId, Diagnostic> {
        let cond = self.parse_or()?;
        if !self.cursor.eat(&TokenKind::Question) {
            return Ok(cond);
        }
        let then = self.parse_or()?;
        self.cursor.expect(&TokenKind::Colon)?;
        let otherwise = self.parse_expr()?;
        let span = self.span_of(cond).merge(self.span_of(otherwise));
        Ok(self.alloc_call(CONDITIONAL, None, vec![cond, then, otherwise], span))
    }

    fn parse_or(&mut self) -> Result<ExprId, Diagnostic> {
        let mut left = self.parse_and()?;
        while self.cursor.eat(&TokenKind::PipePipe) {
            let right = self.parse_and()?;
            left = self.binary(LOGICAL_OR, left, right);
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<ExprId, Diagnostic> {
        let mut left = self.parse_relation()?;
        while self.cursor.eat(&TokenKind::AmpAmp) {
            let right = self.parse_relation()?;
            left = self.binary(LOGICAL_AND, left, right);
        }
        Ok(left)
    }

    fn parse_relation(&mut self) -> Result<ExprId, Diagnostic> {
        let mut left = self.parse_additive()?;
        loop {
            let op = match self.cursor.current_kind() {
                TokenKind::Lt => LESS,
                TokenKind::LtEq => LESS_EQUALS,
                TokenKind::Gt => GREATER,
                TokenKind::GtEq => GREATER_EQUALS,
                TokenKind::EqEq => EQUALS,
                TokenKind::NotEq => NOT_EQUALS,
                TokenKind::In => IN,
                _ => return Ok(left),
            };
            self.cursor.advance();
            let right = self.parse_additive()?;
            left = self.binary(op, left, right);
        }
    }

    fn parse_additive(&mut self) -> Result<ExprId, Diagnostic> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match self.cursor.current_kind() {
                TokenKind::Plus => ADD,
                TokenKind::Minus => SUBTRACT,
                _ => return Ok(left),
            };
            self.cursor.advance();
            let right = self.parse_multiplicative()?;
            left = self.binary(op, left, right);
        }
    }

    fn parse_multiplicative(&mut self) -> Result<ExprId, Diagnostic> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.cursor.current_kind() {
                TokenKind::Star => MULTIPLY,
                TokenKind::Slash => DIVIDE,
                TokenKind::Percent => MODULO,
                _ => return Ok(left),
            };
            self.cursor.advance();
            let right = self.parse_unary()?;
            left = self.binary(op, left, right);
        }
    }

    /// Prefix `!` and `-`, applied innermost first.
    ///
    /// A minus directly in front of a numeric literal folds into the literal,
    /// which is the only way to write `-9223372036854775808`.
    fn parse_unary(&mut self) -> Result<ExprId, Diagnostic> {
        let mut ops = Vec::new();
        let mut operand = loop {
            match self.cursor.current_kind() {
                TokenKind::Bang => ops.push((LOGICAL_NOT, self.cursor.advance().span)),
                TokenKind::Minus => {
                    if let Some(lit) = self.try_negative_literal()? {
                        break self.parse_postfix(lit)?;
                    }
                    ops.push((NEGATE, self.cursor.advance().span));
                }
                _ => break self.parse_member()?,
            }
        };

        for (op, span) in ops.into_iter().rev() {
            let span = span.merge(self.span_of(operand));
            operand = self.alloc_call(op, None, vec![operand], span);
        }
        Ok(operand)
    }

    /// `-` followed by an int or double literal: one negative literal.
    fn try_negative_literal(&mut self) -> Result<Option<ExprId>, Diagnostic> {
        let literal = match self.cursor.peek_kind() {
            TokenKind::Int(magnitude) => {
                let value = 0i64.checked_sub_unsigned(*magnitude).ok_or_else(|| {
                    Diagnostic::error(ErrorCode::E0003)
                        .with_message(format!("integer literal -{magnitude} overflows int"))
                        .with_label(self.cursor.current_span(), "out of range")
                })?;
                Literal::Int(value)
            }
            TokenKind::Double(d) => Literal::Double(-d),
            _ => return Ok(None),
        };
        let start = self.cursor.advance().span;
        let end = self.cursor.advance().span;
        Ok(Some(self.arena.alloc(ExprKind::Literal(literal), start.merge(end))))
    }

    pub(crate) fn span_of(&self, id: ExprId) -> Span {
        self.arena.span(id)
    }

    fn binary(&mut self, op: &str, left: ExprId, right: ExprId) -> ExprId {
        let span = self.span_of(left).merge(self.span_of(right));
        self.alloc_call(op, None, vec![left, right], span)
    }

    /// Build a plain `Call` node without consulting macros.
    pub(crate) fn alloc_call(
        &mut self,
        function: &str,
        target: Option<ExprId>,
        args: Vec<ExprId>,
        span: Span,
    ) -> ExprId {
        let args = self.arena.alloc_expr_list(args);
        self.arena.alloc(
            ExprKind::Call {
                function: function.to_owned(),
                target,
                args,
            },
            span,
        )
    }
}
