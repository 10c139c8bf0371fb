//! The checker: one walk over a macro-expanded tree.
//!
//! Assigns a [`Type`] to every node and a [`CallReference`] to every call,
//! accumulating diagnostics instead of stopping at the first problem. Nodes
//! that failed to check get [`Type::Error`], which unifies with anything, so
//! one mistake does not cascade into a diagnostic per enclosing call.

mod calls;

use cel_diagnostic::{undeclared_reference, Diagnostic, ErrorCode};
use cel_ir::{Comprehension, ExprArena, ExprId, ExprKind, Literal};
use cel_stack::ensure_sufficient_stack;
use rustc_hash::FxHashMap;

use crate::{Declarations, Type};

/// Overload resolution outcome attached to a call node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallReference {
    /// Resolved function name, namespace included (`math.ceil`).
    pub function: String,
    /// Every candidate that unified, in declaration order.
    pub overload_ids: Vec<String>,
    /// The receiver was a namespace, not a value; it is not evaluated.
    pub qualified: bool,
    /// One candidate matched with no `dyn` among the argument types, so a
    /// binding for it must exist for every runtime representation.
    pub exact: bool,
}

/// Types and references for a checked tree.
#[derive(Debug, Default)]
pub struct CheckResult {
    pub types: FxHashMap<ExprId, Type>,
    pub references: FxHashMap<ExprId, CallReference>,
    pub diagnostics: Vec<Diagnostic>,
}

impl CheckResult {
    pub fn type_of(&self, id: ExprId) -> Option<&Type> {
        self.types.get(&id)
    }

    pub fn reference(&self, id: ExprId) -> Option<&CallReference> {
        self.references.get(&id)
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }
}

/// Check the tree rooted at `root` against `decls`.
#[tracing::instrument(level = "debug", skip_all)]
pub fn check(arena: &ExprArena, root: ExprId, decls: &Declarations) -> CheckResult {
    let mut checker = Checker {
        arena,
        decls,
        scopes: Vec::new(),
        result: CheckResult::default(),
    };
    checker.infer(root);
    tracing::debug!(
        nodes = checker.result.types.len(),
        errors = checker.result.diagnostics.len(),
        "checked expression"
    );
    checker.result
}

struct Checker<'a> {
    arena: &'a ExprArena,
    decls: &'a Declarations,
    /// Comprehension variables, innermost last.
    scopes: Vec<(String, Type)>,
    result: CheckResult,
}

impl Checker<'_> {
    fn infer(&mut self, id: ExprId) -> Type {
        let ty = ensure_sufficient_stack(|| self.infer_kind(id));
        self.result.types.insert(id, ty.clone());
        ty
    }

    fn infer_kind(&mut self, id: ExprId) -> Type {
        let arena = self.arena;
        match arena.kind(id) {
            ExprKind::Literal(lit) => literal_type(lit),
            ExprKind::Ident(name) => self.ident(id, name),
            ExprKind::List(range) => {
                let elems: Vec<Type> = arena
                    .get_expr_list(*range)
                    .iter()
                    .map(|&e| self.infer(e))
                    .collect();
                Type::list(Type::join(&elems))
            }
            ExprKind::Map(range) => {
                let mut keys = Vec::new();
                let mut values = Vec::new();
                for entry in arena.get_map_entries(*range) {
                    keys.push(self.infer(entry.key));
                    values.push(self.infer(entry.value));
                }
                Type::map(Type::join(&keys), Type::join(&values))
            }
            ExprKind::Struct { type_name, fields } => {
                for init in arena.get_field_inits(*fields) {
                    self.infer(init.value);
                }
                self.error(
                    Diagnostic::error(ErrorCode::E2005)
                        .with_message(format!(
                            "cannot construct `{type_name}`: struct literals are not supported"
                        ))
                        .with_label(arena.span(id), "struct literal"),
                )
            }
            ExprKind::Select {
                operand,
                field,
                test_only,
            } => self.select(id, *operand, field, *test_only),
            ExprKind::Call {
                function,
                target,
                args,
            } => self.call(id, function, *target, arena.get_expr_list(*args)),
            ExprKind::Comprehension(c) => self.comprehension(c),
            ExprKind::Error(_) => Type::Error,
        }
    }

    fn ident(&mut self, id: ExprId, name: &str) -> Type {
        if let Some(ty) = self.lookup_local(name) {
            return ty.clone();
        }
        if let Some(ty) = self.decls.variable(name) {
            return ty.clone();
        }
        self.error(undeclared_reference(self.arena.span(id), name))
    }

    fn lookup_local(&self, name: &str) -> Option<&Type> {
        self.scopes
            .iter()
            .rev()
            .find_map(|(n, ty)| (n == name).then_some(ty))
    }

    fn select(&mut self, id: ExprId, operand: ExprId, field: &str, test_only: bool) -> Type {
        let field_ty = match self.infer(operand) {
            Type::Map(_, value) => *value,
            Type::Dyn => Type::Dyn,
            Type::Error => Type::Error,
            other => self.error(
                Diagnostic::error(ErrorCode::E2004)
                    .with_message(format!("type `{other}` does not support field selection"))
                    .with_label(self.arena.span(id), format!("cannot select `{field}` here")),
            ),
        };
        if test_only {
            Type::Bool
        } else {
            field_ty
        }
    }

    fn comprehension(&mut self, c: &Comprehension) -> Type {
        let two_vars = c.iter_var2.is_some();
        let (first, second) = match self.infer(c.iter_range) {
            Type::List(elem) if two_vars => (Type::Int, *elem),
            Type::List(elem) => (*elem, Type::Dyn),
            Type::Map(key, value) => (*key, *value),
            Type::Dyn => (Type::Dyn, Type::Dyn),
            Type::Error => (Type::Error, Type::Error),
            other => {
                self.error(
                    Diagnostic::error(ErrorCode::E2003)
                        .with_message(format!(
                            "expression of type `{other}` cannot be the range of a comprehension"
                        ))
                        .with_label(self.arena.span(c.iter_range), "expected a list or map"),
                );
                (Type::Error, Type::Error)
            }
        };

        let accu_ty = self.infer(c.accu_init);
        self.scopes.push((c.accu_var.clone(), accu_ty));
        let mark = self.scopes.len();
        self.scopes.push((c.iter_var.clone(), first));
        if let Some(var2) = &c.iter_var2 {
            self.scopes.push((var2.clone(), second));
        }
        self.infer(c.loop_condition);
        self.infer(c.loop_step);
        self.scopes.truncate(mark);
        let result = self.infer(c.result);
        self.scopes.pop();
        result
    }

    fn error(&mut self, diag: Diagnostic) -> Type {
        self.result.diagnostics.push(diag);
        Type::Error
    }
}

fn literal_type(lit: &Literal) -> Type {
    match lit {
        Literal::Null => Type::Null,
        Literal::Bool(_) => Type::Bool,
        Literal::Int(_) => Type::Int,
        Literal::Uint(_) => Type::Uint,
        Literal::Double(_) => Type::Double,
        Literal::String(_) => Type::String,
        Literal::Bytes(_) => Type::Bytes,
    }
}

/// Dotted name spelled by an identifier/selection chain.
fn qualified_name(arena: &ExprArena, id: ExprId) -> Option<String> {
    match arena.kind(id) {
        ExprKind::Ident(name) => Some(name.clone()),
        ExprKind::Select {
            operand,
            field,
            test_only: false,
        } => {
            let mut prefix = qualified_name(arena, *operand)?;
            prefix.push('.');
            prefix.push_str(field);
            Some(prefix)
        }
        _ => None,
    }
}
