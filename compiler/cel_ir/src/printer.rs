//! Stable textual rendering of expression trees.
//!
//! Operators print in call form (`_&&_(a, b)`), which keeps the output
//! unambiguous and makes lowered macro shapes easy to assert on.

use std::fmt::Write;

use crate::{ExprArena, ExprId, ExprKind, Literal};

/// Render the tree rooted at `root`.
pub fn print_expr(arena: &ExprArena, root: ExprId) -> String {
    let mut out = String::new();
    Printer { arena, out: &mut out }.expr(root);
    out
}

struct Printer<'a> {
    arena: &'a ExprArena,
    out: &'a mut String,
}

impl Printer<'_> {
    fn expr(&mut self, id: ExprId) {
        match self.arena.kind(id) {
            ExprKind::Literal(lit) => self.literal(lit),
            ExprKind::Ident(name) => self.out.push_str(name),
            ExprKind::List(range) => {
                self.out.push('[');
                self.comma_separated(self.arena.get_expr_list(*range));
                self.out.push(']');
            }
            ExprKind::Map(range) => {
                self.out.push('{');
                for (i, entry) in self.arena.get_map_entries(*range).iter().enumerate() {
                    if i > 0 {
                        self.out.push_str(", ");
                    }
                    self.expr(entry.key);
                    self.out.push_str(": ");
                    self.expr(entry.value);
                }
                self.out.push('}');
            }
            ExprKind::Struct { type_name, fields } => {
                self.out.push_str(type_name);
                self.out.push('{');
                for (i, init) in self.arena.get_field_inits(*fields).iter().enumerate() {
                    if i > 0 {
                        self.out.push_str(", ");
                    }
                    self.out.push_str(&init.name);
                    self.out.push_str(": ");
                    self.expr(init.value);
                }
                self.out.push('}');
            }
            ExprKind::Select {
                operand,
                field,
                test_only,
            } => {
                if *test_only {
                    self.out.push_str("has(");
                }
                self.expr(*operand);
                self.out.push('.');
                self.out.push_str(field);
                if *test_only {
                    self.out.push(')');
                }
            }
            ExprKind::Call {
                function,
                target,
                args,
            } => {
                if let Some(target) = target {
                    self.expr(*target);
                    self.out.push('.');
                }
                self.out.push_str(function);
                self.out.push('(');
                self.comma_separated(self.arena.get_expr_list(*args));
                self.out.push(')');
            }
            ExprKind::Comprehension(c) => {
                self.out.push_str("__comprehension__(");
                self.out.push_str(&c.iter_var);
                if let Some(second) = &c.iter_var2 {
                    self.out.push_str(", ");
                    self.out.push_str(second);
                }
                self.out.push_str(", ");
                self.expr(c.iter_range);
                self.out.push_str(", ");
                self.out.push_str(&c.accu_var);
                for part in [c.accu_init, c.loop_condition, c.loop_step, c.result] {
                    self.out.push_str(", ");
                    self.expr(part);
                }
                self.out.push(')');
            }
            ExprKind::Error(message) => {
                let _ = write!(self.out, "<error: {message}>");
            }
        }
    }

    fn comma_separated(&mut self, ids: &[ExprId]) {
        for (i, id) in ids.iter().enumerate() {
            if i > 0 {
                self.out.push_str(", ");
            }
            self.expr(*id);
        }
    }

    fn literal(&mut self, lit: &Literal) {
        let _ = match lit {
            Literal::Null => write!(self.out, "null"),
            Literal::Bool(b) => write!(self.out, "{b}"),
            Literal::Int(i) => write!(self.out, "{i}"),
            Literal::Uint(u) => write!(self.out, "{u}u"),
            Literal::Double(d) => write!(self.out, "{d:?}"),
            Literal::String(s) => write!(self.out, "{s:?}"),
            Literal::Bytes(b) => write!(self.out, "b{:?}", String::from_utf8_lossy(b)),
        };
    }
}
