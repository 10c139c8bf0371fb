//! Primary expressions.

use cel_diagnostic::{expected_expression, Diagnostic};
use cel_ir::{ExprId, ExprKind, FieldInit, Literal, MapEntry, Span};

use crate::lexer::TokenKind;
use crate::Parser;

impl Parser<'_> {
    pub(super) fn parse_primary(&mut self) -> Result<ExprId, Diagnostic> {
        let span = self.cursor.current_span();
        let literal = match self.cursor.current_kind() {
            TokenKind::Int(magnitude) => match i64::try_from(*magnitude) {
                Ok(value) => Literal::Int(value),
                Err(_) => {
                    return Err(Diagnostic::error(cel_diagnostic::ErrorCode::E0003)
                        .with_message(format!("integer literal {magnitude} overflows int"))
                        .with_label(span, "out of range"))
                }
            },
            TokenKind::Uint(value) => Literal::Uint(*value),
            TokenKind::Double(value) => Literal::Double(*value),
            TokenKind::String(value) => Literal::String(value.clone()),
            TokenKind::Bytes(value) => Literal::Bytes(value.clone()),
            TokenKind::True => Literal::Bool(true),
            TokenKind::False => Literal::Bool(false),
            TokenKind::Null => Literal::Null,
            TokenKind::Ident(_) => return self.parse_ident_or_call(),
            TokenKind::Dot => {
                // Leading dot: root-scoped name, resolved like a plain one.
                self.cursor.advance();
                return self.parse_ident_or_call();
            }
            TokenKind::LParen => {
                self.cursor.advance();
                let inner = self.parse_expr()?;
                self.cursor.expect(&TokenKind::RParen)?;
                return Ok(inner);
            }
            TokenKind::LBracket => return self.parse_list(),
            TokenKind::LBrace => return self.parse_map(),
            other => return Err(expected_expression(span, &other.to_string())),
        };
        self.cursor.advance();
        Ok(self.arena.alloc(ExprKind::Literal(literal), span))
    }

    fn parse_ident_or_call(&mut self) -> Result<ExprId, Diagnostic> {
        let (name, span) = self.cursor.expect_ident()?;
        if self.cursor.check(&TokenKind::LParen) {
            let args = self.parse_call_args()?;
            let span = span.merge(self.cursor.previous_span());
            return Ok(self.call(&name, None, args, span));
        }
        Ok(self.arena.alloc(ExprKind::Ident(name), span))
    }

    fn parse_list(&mut self) -> Result<ExprId, Diagnostic> {
        let open = self.cursor.expect(&TokenKind::LBracket)?.span;
        let mut items = Vec::new();
        while !self.cursor.check(&TokenKind::RBracket) {
            items.push(self.parse_expr()?);
            if !self.cursor.eat(&TokenKind::Comma) {
                break;
            }
        }
        let close = self.cursor.expect(&TokenKind::RBracket)?.span;
        let range = self.arena.alloc_expr_list(items);
        Ok(self.arena.alloc(ExprKind::List(range), open.merge(close)))
    }

    fn parse_map(&mut self) -> Result<ExprId, Diagnostic> {
        let open = self.cursor.expect(&TokenKind::LBrace)?.span;
        let mut entries = Vec::new();
        while !self.cursor.check(&TokenKind::RBrace) {
            let key = self.parse_expr()?;
            self.cursor.expect(&TokenKind::Colon)?;
            let value = self.parse_expr()?;
            let span = self.span_of(key).merge(self.span_of(value));
            entries.push(MapEntry { key, value, span });
            if !self.cursor.eat(&TokenKind::Comma) {
                break;
            }
        }
        let close = self.cursor.expect(&TokenKind::RBrace)?.span;
        let range = self.arena.alloc_map_entries(entries);
        Ok(self.arena.alloc(ExprKind::Map(range), open.merge(close)))
    }

    /// `Type{field: value, ...}`; the type name has already been parsed.
    pub(super) fn parse_struct(
        &mut self,
        type_name: String,
        name_span: Span,
    ) -> Result<ExprId, Diagnostic> {
        self.cursor.expect(&TokenKind::LBrace)?;
        let mut fields = Vec::new();
        while !self.cursor.check(&TokenKind::RBrace) {
            let (name, field_span) = self.cursor.expect_ident()?;
            self.cursor.expect(&TokenKind::Colon)?;
            let value = self.parse_expr()?;
            let span = field_span.merge(self.span_of(value));
            fields.push(FieldInit { name, value, span });
            if !self.cursor.eat(&TokenKind::Comma) {
                break;
            }
        }
        let close = self.cursor.expect(&TokenKind::RBrace)?.span;
        let fields = self.arena.alloc_field_inits(fields);
        Ok(self
            .arena
            .alloc(ExprKind::Struct { type_name, fields }, name_span.merge(close)))
    }
}
