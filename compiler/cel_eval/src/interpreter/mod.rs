//! Tree-walking evaluator over a checked expression.
//!
//! Evaluation is strict except for the intrinsic special forms in
//! `logic.rs`, which decide for themselves which operands to evaluate and
//! how to treat operand errors. Comprehensions are in `comprehension.rs`.
//!
//! Errors are carried as `Err` values. Local bindings hold an
//! [`EvalResult`] rather than a [`Value`] because a comprehension
//! accumulator may legitimately hold an error that a later step absorbs.

mod comprehension;
mod logic;

use cel_ir::{ExprArena, ExprId, ExprKind, Literal};
use cel_stack::ensure_sufficient_stack;
use cel_types::CheckResult;

use crate::activation::Activation;
use crate::dispatch::Dispatcher;
use crate::errors::{
    internal, no_such_field, no_such_key, unbound_variable, unsupported, EvalResult,
};
use crate::native::{CallContext, UintRepr};
use crate::numeric::comparator;
use crate::value::{Value, ValueMap};

pub use logic::is_intrinsic;

/// Work done by one evaluation, for tests and tracing.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct EvalCounters {
    /// Comprehensions entered.
    pub comprehensions: u64,
    /// `loop_step` evaluations, summed over all comprehensions.
    pub loop_steps: u64,
    /// `result` evaluations, summed over all comprehensions.
    pub result_evals: u64,
}

/// Everything one evaluation reads; shared, never mutated.
#[derive(Copy, Clone)]
pub struct Program<'a> {
    pub arena: &'a ExprArena,
    pub root: ExprId,
    pub checked: &'a CheckResult,
    pub dispatcher: &'a Dispatcher,
    pub repr: UintRepr,
}

/// Evaluate `program` against `activation`.
pub fn evaluate(program: Program<'_>, activation: &Activation) -> (EvalResult, EvalCounters) {
    let mut interp = Interpreter::new(program, activation);
    let result = interp.eval(program.root);
    (result, interp.counters)
}

pub(crate) struct Interpreter<'a> {
    program: Program<'a>,
    ctx: CallContext<'a>,
    activation: &'a Activation,
    /// Comprehension variables, innermost last.
    locals: Vec<(&'a str, EvalResult)>,
    /// Accumulator slot the expression about to be evaluated may move out
    /// of `locals`. Cleared on entry to every evaluation.
    handoff: Option<usize>,
    counters: EvalCounters,
}

impl<'a> Interpreter<'a> {
    fn new(program: Program<'a>, activation: &'a Activation) -> Self {
        Interpreter {
            program,
            ctx: CallContext::new(program.repr, comparator()),
            activation,
            locals: Vec::new(),
            handoff: None,
            counters: EvalCounters::default(),
        }
    }

    pub(crate) fn eval(&mut self, id: ExprId) -> EvalResult {
        ensure_sufficient_stack(|| self.eval_inner(id))
    }

    fn eval_inner(&mut self, id: ExprId) -> EvalResult {
        let arena = self.program.arena;
        let handoff = self.handoff.take();
        match arena.kind(id) {
            ExprKind::Literal(lit) => self.literal(lit),
            ExprKind::Ident(name) => self.ident(name),
            ExprKind::List(range) => {
                let items = arena
                    .get_expr_list(*range)
                    .iter()
                    .map(|&e| self.eval(e))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Value::list(items))
            }
            ExprKind::Map(range) => {
                let mut map = ValueMap::new();
                for entry in arena.get_map_entries(*range) {
                    let key = self.eval(entry.key)?;
                    let value = self.eval(entry.value)?;
                    map.insert(key, value)?;
                }
                Ok(Value::map(map))
            }
            ExprKind::Struct { type_name, .. } => {
                Err(unsupported(&format!("constructing `{type_name}`")))
            }
            ExprKind::Select {
                operand,
                field,
                test_only,
            } => {
                let operand = self.eval(*operand)?;
                select(&operand, field, *test_only)
            }
            ExprKind::Call {
                function,
                target,
                args,
            } => {
                let args = arena.get_expr_list(*args);
                if is_intrinsic(function) {
                    return self.intrinsic(function, args, handoff);
                }
                self.call(id, *target, args, handoff)
            }
            ExprKind::Comprehension(c) => self.comprehension(c),
            ExprKind::Error(message) => {
                Err(internal(format!("evaluated an error node: {message}")))
            }
        }
    }

    fn literal(&self, lit: &Literal) -> EvalResult {
        Ok(match lit {
            Literal::Null => Value::Null,
            Literal::Bool(b) => Value::Bool(*b),
            Literal::Int(i) => Value::Int(*i),
            Literal::Uint(u) => return self.ctx.uint(*u),
            Literal::Double(d) => Value::Double(*d),
            Literal::String(s) => Value::string(s.as_str()),
            Literal::Bytes(b) => Value::bytes(b.as_slice()),
        })
    }

    fn ident(&self, name: &str) -> EvalResult {
        if let Some((_, value)) = self.locals.iter().rev().find(|(n, _)| *n == name) {
            return value.clone();
        }
        self.activation
            .get(name)
            .cloned()
            .ok_or_else(|| unbound_variable(name))
    }

    fn call(
        &mut self,
        id: ExprId,
        target: Option<ExprId>,
        args: &[ExprId],
        handoff: Option<usize>,
    ) -> EvalResult {
        let program = self.program;
        let Some(reference) = program.checked.reference(id) else {
            return Err(internal("call without a resolved overload"));
        };
        let operands: Vec<ExprId> = target
            .filter(|_| !reference.qualified)
            .into_iter()
            .chain(args.iter().copied())
            .collect();
        let mut values = Vec::with_capacity(operands.len());
        match handoff.filter(|&slot| self.names_slot(operands.first().copied(), slot)) {
            // The remaining operands are read first; the accumulator is
            // moved out last so the binding can own it.
            Some(slot) => {
                values.push(Value::Null);
                for &operand in &operands[1..] {
                    values.push(self.eval(operand)?);
                }
                values[0] = std::mem::replace(&mut self.locals[slot].1, Ok(Value::Null))?;
            }
            None => {
                for &operand in &operands {
                    values.push(self.eval(operand)?);
                }
            }
        }
        program.dispatcher.dispatch_owned(&self.ctx, reference, values)
    }

    /// Whether `operand` reads the successful value held in `locals[slot]`.
    fn names_slot(&self, operand: Option<ExprId>, slot: usize) -> bool {
        let Some(ExprKind::Ident(name)) = operand.map(|e| self.program.arena.kind(e)) else {
            return false;
        };
        self.locals.iter().rposition(|(n, _)| *n == name.as_str()) == Some(slot)
            && self.locals[slot].1.is_ok()
    }
}

fn select(operand: &Value, field: &str, test_only: bool) -> EvalResult {
    let Value::Map(map) = operand else {
        return Err(no_such_field(field, operand));
    };
    let key = Value::string(field);
    if test_only {
        return Ok(Value::Bool(map.contains_key(&key)));
    }
    map.get(&key).cloned().ok_or_else(|| no_such_key(&key))
}

#[cfg(test)]
mod tests;
