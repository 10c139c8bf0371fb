//! The fold primitive.

use cel_ir::Comprehension;

use super::Interpreter;
use crate::errors::{no_matching_overload, unsupported_range, EvalResult};
use crate::value::Value;

impl<'a> Interpreter<'a> {
    /// Iterate `iter_range`, threading the accumulator through
    /// `loop_step` until the range is exhausted or `loop_condition` is
    /// `false`, then evaluate `result` with the accumulator in scope.
    ///
    /// A step call whose first operand is the accumulator receives it by
    /// value, so a consuming binding can extend it in place.
    pub(super) fn comprehension(&mut self, c: &'a Comprehension) -> EvalResult {
        let range = self.eval(c.iter_range)?;
        let two_vars = c.iter_var2.is_some();
        let items: Vec<(Value, Value)> = match &range {
            Value::List(items) if two_vars => items
                .iter()
                .enumerate()
                .map(|(i, v)| (Value::Int(i64::try_from(i).unwrap_or(i64::MAX)), v.clone()))
                .collect(),
            Value::List(items) => items.iter().map(|v| (v.clone(), Value::Null)).collect(),
            Value::Map(map) => map.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
            other => return Err(unsupported_range(other)),
        };
        self.counters.comprehensions += 1;

        let accu = self.eval(c.accu_init);
        self.locals.push((c.accu_var.as_str(), accu));
        let accu_slot = self.locals.len() - 1;

        for (first, second) in items {
            self.locals.push((c.iter_var.as_str(), Ok(first)));
            if let Some(var2) = &c.iter_var2 {
                self.locals.push((var2.as_str(), Ok(second)));
            }
            let proceed = match self.eval(c.loop_condition) {
                Ok(Value::Bool(b)) => Ok(b),
                Ok(other) => Err(no_matching_overload("loop condition", &[other])),
                Err(err) => Err(err),
            };
            let step = match proceed {
                Ok(true) => {
                    self.counters.loop_steps += 1;
                    self.handoff = Some(accu_slot);
                    Some(self.eval(c.loop_step))
                }
                Ok(false) => None,
                Err(err) => {
                    self.locals.truncate(accu_slot);
                    return Err(err);
                }
            };
            self.locals.truncate(accu_slot + 1);
            match step {
                Some(next) => self.locals[accu_slot].1 = next,
                None => break,
            }
        }

        self.counters.result_evals += 1;
        let result = self.eval(c.result);
        self.locals.truncate(accu_slot);
        tracing::trace!(accu = %c.accu_var, "comprehension finished");
        result
    }
}
