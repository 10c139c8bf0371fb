//! Node construction interface handed to macro expanders.
//!
//! Expanders build their replacement trees exclusively through this type, so
//! they never depend on parser internals. Every node created here takes the
//! span of the call being expanded unless it is a copy of an existing node.

use crate::operators::ACCUMULATOR_VAR;
use crate::{Comprehension, ExprArena, ExprId, ExprKind, FieldInit, Literal, MapEntry, Span};

/// Tree-construction factory bound to one arena and one macro call site.
pub struct ExprFactory<'a> {
    arena: &'a mut ExprArena,
    span: Span,
}

impl<'a> ExprFactory<'a> {
    /// Create a factory for a call whose source location is `span`.
    pub fn new(arena: &'a mut ExprArena, span: Span) -> Self {
        ExprFactory { arena, span }
    }

    /// Span of the call being expanded.
    #[inline]
    pub fn call_span(&self) -> Span {
        self.span
    }

    #[inline]
    pub fn arena(&self) -> &ExprArena {
        self.arena
    }

    #[inline]
    pub fn kind(&self, id: ExprId) -> &ExprKind {
        self.arena.kind(id)
    }

    /// Source location of an existing node.
    #[inline]
    pub fn location_of(&self, id: ExprId) -> Span {
        self.arena.span(id)
    }

    /// Name of a bare identifier node, if `id` is one.
    pub fn ident_name(&self, id: ExprId) -> Option<&str> {
        match self.arena.kind(id) {
            ExprKind::Ident(name) => Some(name),
            _ => None,
        }
    }

    /// Literal value of a literal node, if `id` is one.
    pub fn literal(&self, id: ExprId) -> Option<&Literal> {
        match self.arena.kind(id) {
            ExprKind::Literal(lit) => Some(lit),
            _ => None,
        }
    }

    /// Elements of a list literal, if `id` is one.
    pub fn list_elements(&self, id: ExprId) -> Option<&[ExprId]> {
        match self.arena.kind(id) {
            ExprKind::List(range) => Some(self.arena.get_expr_list(*range)),
            _ => None,
        }
    }

    fn alloc(&mut self, kind: ExprKind) -> ExprId {
        self.arena.alloc(kind, self.span)
    }

    pub fn new_literal(&mut self, literal: Literal) -> ExprId {
        self.alloc(ExprKind::Literal(literal))
    }

    pub fn new_bool(&mut self, value: bool) -> ExprId {
        self.new_literal(Literal::Bool(value))
    }

    pub fn new_int(&mut self, value: i64) -> ExprId {
        self.new_literal(Literal::Int(value))
    }

    pub fn new_ident(&mut self, name: impl Into<String>) -> ExprId {
        self.alloc(ExprKind::Ident(name.into()))
    }

    /// Reference to the reserved accumulator variable.
    pub fn new_accu_ident(&mut self) -> ExprId {
        self.new_ident(ACCUMULATOR_VAR)
    }

    pub fn new_list(&mut self, items: impl IntoIterator<Item = ExprId>) -> ExprId {
        let range = self.arena.alloc_expr_list(items);
        self.alloc(ExprKind::List(range))
    }

    pub fn new_map(&mut self, entries: impl IntoIterator<Item = (ExprId, ExprId)>) -> ExprId {
        let span = self.span;
        let range = self
            .arena
            .alloc_map_entries(entries.into_iter().map(|(key, value)| MapEntry {
                key,
                value,
                span,
            }));
        self.alloc(ExprKind::Map(range))
    }

    pub fn new_global_call(
        &mut self,
        function: &str,
        args: impl IntoIterator<Item = ExprId>,
    ) -> ExprId {
        let args = self.arena.alloc_expr_list(args);
        self.alloc(ExprKind::Call {
            function: function.to_owned(),
            target: None,
            args,
        })
    }

    pub fn new_member_call(
        &mut self,
        function: &str,
        target: ExprId,
        args: impl IntoIterator<Item = ExprId>,
    ) -> ExprId {
        let args = self.arena.alloc_expr_list(args);
        self.alloc(ExprKind::Call {
            function: function.to_owned(),
            target: Some(target),
            args,
        })
    }

    pub fn new_select(&mut self, operand: ExprId, field: impl Into<String>) -> ExprId {
        self.alloc(ExprKind::Select {
            operand,
            field: field.into(),
            test_only: false,
        })
    }

    /// Presence test `has(operand.field)`.
    pub fn new_presence_test(&mut self, operand: ExprId, field: impl Into<String>) -> ExprId {
        self.alloc(ExprKind::Select {
            operand,
            field: field.into(),
            test_only: true,
        })
    }

    pub fn new_comprehension(&mut self, comprehension: Comprehension) -> ExprId {
        self.alloc(ExprKind::Comprehension(Box::new(comprehension)))
    }

    /// Record a macro misuse at the location of `at`.
    ///
    /// Returns an `Error` node the expander hands back in place of its
    /// expansion; the error is collected together with every other one after
    /// parsing.
    pub fn report_error(&mut self, at: ExprId, message: impl Into<String>) -> ExprId {
        let span = self.arena.span(at);
        self.arena.alloc(ExprKind::Error(message.into()), span)
    }

    /// Record a macro misuse at the call site itself.
    pub fn report_call_error(&mut self, message: impl Into<String>) -> ExprId {
        self.alloc(ExprKind::Error(message.into()))
    }

    /// Deep-copy a subtree, giving every copied node a fresh id.
    ///
    /// Needed whenever an expansion references the same input expression
    /// more than once.
    pub fn copy(&mut self, id: ExprId) -> ExprId {
        let expr = self.arena.get_expr(id).clone();
        let kind = match expr.kind {
            kind @ (ExprKind::Literal(_) | ExprKind::Ident(_) | ExprKind::Error(_)) => kind,
            ExprKind::List(range) => {
                let items = self.arena.get_expr_list(range).to_vec();
                let copied: Vec<ExprId> = items.into_iter().map(|item| self.copy(item)).collect();
                ExprKind::List(self.arena.alloc_expr_list(copied))
            }
            ExprKind::Map(range) => {
                let entries = self.arena.get_map_entries(range).to_vec();
                let copied: Vec<MapEntry> = entries
                    .into_iter()
                    .map(|entry| MapEntry {
                        key: self.copy(entry.key),
                        value: self.copy(entry.value),
                        span: entry.span,
                    })
                    .collect();
                ExprKind::Map(self.arena.alloc_map_entries(copied))
            }
            ExprKind::Struct { type_name, fields } => {
                let inits = self.arena.get_field_inits(fields).to_vec();
                let copied: Vec<FieldInit> = inits
                    .into_iter()
                    .map(|init| FieldInit {
                        value: self.copy(init.value),
                        ..init
                    })
                    .collect();
                ExprKind::Struct {
                    type_name,
                    fields: self.arena.alloc_field_inits(copied),
                }
            }
            ExprKind::Select {
                operand,
                field,
                test_only,
            } => ExprKind::Select {
                operand: self.copy(operand),
                field,
                test_only,
            },
            ExprKind::Call {
                function,
                target,
                args,
            } => {
                let target = target.map(|t| self.copy(t));
                let arg_ids = self.arena.get_expr_list(args).to_vec();
                let copied: Vec<ExprId> = arg_ids.into_iter().map(|a| self.copy(a)).collect();
                ExprKind::Call {
                    function,
                    target,
                    args: self.arena.alloc_expr_list(copied),
                }
            }
            ExprKind::Comprehension(c) => {
                let c = *c;
                ExprKind::Comprehension(Box::new(Comprehension {
                    iter_range: self.copy(c.iter_range),
                    accu_init: self.copy(c.accu_init),
                    loop_condition: self.copy(c.loop_condition),
                    loop_step: self.copy(c.loop_step),
                    result: self.copy(c.result),
                    ..c
                }))
            }
        };
        self.arena.alloc(kind, expr.span)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::printer::print_expr;

    #[test]
    fn generated_nodes_take_call_span() {
        let mut arena = ExprArena::new();
        let call_span = Span::new(10, 20);
        let mut f = ExprFactory::new(&mut arena, call_span);
        let x = f.new_ident("x");
        let call = f.new_global_call("size", [x]);
        assert_eq!(arena.span(call), call_span);
        assert_eq!(arena.span(x), call_span);
    }

    #[test]
    fn report_error_uses_argument_location() {
        let mut arena = ExprArena::new();
        let arg = arena.alloc(ExprKind::Literal(Literal::Int(1)), Span::new(4, 5));
        let mut f = ExprFactory::new(&mut arena, Span::new(0, 9));
        let err = f.report_error(arg, "argument must be a simple name");
        assert_eq!(arena.span(err), Span::new(4, 5));
        assert_eq!(
            arena.kind(err),
            &ExprKind::Error("argument must be a simple name".into())
        );
    }

    #[test]
    fn copy_allocates_fresh_ids() {
        let mut arena = ExprArena::new();
        let mut f = ExprFactory::new(&mut arena, Span::DUMMY);
        let a = f.new_ident("a");
        let sel = f.new_select(a, "b");
        let one = f.new_int(1);
        let list = f.new_list([sel, one]);
        let copy = f.copy(list);

        assert_ne!(copy, list);
        assert_eq!(print_expr(&arena, copy), print_expr(&arena, list));
        let (ExprKind::List(orig), ExprKind::List(copied)) = (arena.kind(list), arena.kind(copy))
        else {
            panic!("expected lists");
        };
        let orig = arena.get_expr_list(*orig);
        let copied = arena.get_expr_list(*copied);
        assert!(orig.iter().zip(copied).all(|(o, c)| o != c));
    }
}
