//! Intrinsic special forms.
//!
//! These functions have declarations (so they type-check like any call) but
//! no native bindings: their operands are evaluated here, lazily.
//!
//! `_&&_` and `_||_` are commutative with respect to errors: a decisive
//! operand (`false` for and, `true` for or) on either side wins over an
//! error on the other. `@not_strictly_false` is the loop condition hook of
//! the `all`/`exists` folds: errors and non-booleans count as `true`, so
//! iteration continues past an erroring predicate.

use cel_ir::operators::{CONDITIONAL, LOGICAL_AND, LOGICAL_OR, NOT_STRICTLY_FALSE};
use cel_ir::ExprId;

use super::Interpreter;
use crate::errors::{internal, no_matching_overload, EvalResult};
use crate::value::Value;

/// Whether `function` is evaluated by the interpreter rather than
/// dispatched to a native binding.
pub fn is_intrinsic(function: &str) -> bool {
    matches!(
        function,
        LOGICAL_AND | LOGICAL_OR | CONDITIONAL | NOT_STRICTLY_FALSE
    )
}

impl Interpreter<'_> {
    /// A `handoff` slot passes through to the chosen branch of `_?_:_`.
    pub(super) fn intrinsic(
        &mut self,
        function: &str,
        args: &[ExprId],
        handoff: Option<usize>,
    ) -> EvalResult {
        match (function, args) {
            (LOGICAL_AND, &[left, right]) => self.logical(function, left, right, false),
            (LOGICAL_OR, &[left, right]) => self.logical(function, left, right, true),
            (CONDITIONAL, &[cond, then, otherwise]) => {
                let branch = match self.eval(cond)? {
                    Value::Bool(true) => then,
                    Value::Bool(false) => otherwise,
                    other => return Err(no_matching_overload(function, &[other])),
                };
                self.handoff = handoff;
                self.eval(branch)
            }
            (NOT_STRICTLY_FALSE, &[arg]) => Ok(Value::Bool(match self.eval(arg) {
                Ok(Value::Bool(b)) => b,
                Err(err) if err.is_fatal() => return Err(err),
                _ => true,
            })),
            _ => Err(internal(format!(
                "intrinsic `{function}` called with {} arguments",
                args.len()
            ))),
        }
    }

    /// `_&&_` (`decisive == false`) and `_||_` (`decisive == true`).
    fn logical(
        &mut self,
        function: &str,
        left: ExprId,
        right: ExprId,
        decisive: bool,
    ) -> EvalResult {
        let lhs = self.eval(left);
        if matches!(lhs, Ok(Value::Bool(b)) if b == decisive) {
            return lhs;
        }
        if let Err(err) = &lhs {
            if err.is_fatal() {
                return lhs;
            }
        }
        let rhs = self.eval(right);
        match (lhs, rhs) {
            (_, Err(err)) if err.is_fatal() => Err(err),
            (_, Ok(Value::Bool(b))) if b == decisive => Ok(Value::Bool(b)),
            (Ok(Value::Bool(_)), Ok(Value::Bool(b))) => Ok(Value::Bool(b)),
            (Err(err), _) | (_, Err(err)) => Err(err),
            (Ok(l), Ok(r)) => Err(no_matching_overload(function, &[l, r])),
        }
    }
}
