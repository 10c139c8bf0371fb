//! Fold lowering shared by every iterating macro.
//!
//! Each builder produces one `Comprehension` node:
//!
//! | macro                 | accu_init | loop_condition                 | loop_step                  | result      |
//! |-----------------------|-----------|--------------------------------|----------------------------|-------------|
//! | `all(x, p)`           | `true`    | `@not_strictly_false(accu)`    | `accu && p`                | `accu`      |
//! | `exists(x, p)`        | `false`   | `@not_strictly_false(!accu)`   | `accu \|\| p`              | `accu`      |
//! | `exists_one(x, p)`    | `0`       | `true`                         | `p ? accu + 1 : accu`      | `accu == 1` |
//! | `transformList(x, t)` | `[]`      | `true`                         | `accu + [t]`               | `accu`      |
//! | `filter(x, p)`        | `[]`      | `true`                         | `p ? accu + [x] : accu`    | `accu`      |
//! | `transformMap(k,v,t)` | `{}`      | `true`                         | `cel.@mapInsert(accu,k,t)` | `accu`      |
//! | `bind(n, init, r)`    | `init`    | `false`                        | `n`                        | `r`         |
//!
//! Validation helpers return the error node to splice into the tree as the
//! `Err` side of [`Expansion`].

use cel_ir::operators::{
    ACCUMULATOR_VAR, ADD, CONDITIONAL, EQUALS, LOGICAL_AND, LOGICAL_NOT, LOGICAL_OR, MAP_INSERT,
    NOT_STRICTLY_FALSE, UNUSED_ITER_VAR,
};
use cel_ir::{Comprehension, ExprFactory, ExprId};

/// Outcome of an expander that has decided to handle a call: the
/// replacement on success, an `Error` node on misuse.
pub type Expansion = Result<ExprId, ExprId>;

/// Collapse an [`Expansion`] into the expander return value.
pub fn finish(expansion: Expansion) -> Option<ExprId> {
    match expansion {
        Ok(id) | Err(id) => Some(id),
    }
}

/// Iteration variables bound by a fold.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IterVars {
    pub first: String,
    pub second: Option<String>,
}

impl IterVars {
    pub fn one(name: String) -> Self {
        IterVars {
            first: name,
            second: None,
        }
    }

    pub fn two(first: String, second: String) -> Self {
        IterVars {
            first,
            second: Some(second),
        }
    }
}

/// Name of a bare identifier argument.
pub fn simple_name(f: &mut ExprFactory<'_>, arg: ExprId) -> Result<String, ExprId> {
    match f.ident_name(arg) {
        Some(name) => Ok(name.to_owned()),
        None => Err(f.report_error(arg, "argument must be a simple name")),
    }
}

/// A single iteration variable, checked against the accumulator name.
pub fn iter_var(f: &mut ExprFactory<'_>, arg: ExprId) -> Result<IterVars, ExprId> {
    let name = checked_iter_name(f, arg)?;
    Ok(IterVars::one(name))
}

/// The two variables of a two-variable fold, which must differ.
pub fn iter_var_pair(
    f: &mut ExprFactory<'_>,
    first: ExprId,
    second: ExprId,
) -> Result<IterVars, ExprId> {
    let a = checked_iter_name(f, first)?;
    let b = checked_iter_name(f, second)?;
    if a == b {
        return Err(f.report_error(second, "duplicate variable name"));
    }
    Ok(IterVars::two(a, b))
}

fn checked_iter_name(f: &mut ExprFactory<'_>, arg: ExprId) -> Result<String, ExprId> {
    let name = simple_name(f, arg)?;
    if name == ACCUMULATOR_VAR {
        return Err(f.report_error(arg, "iteration variable overwrites accumulator variable"));
    }
    Ok(name)
}

/// Whether `target` is the bare identifier `namespace`.
///
/// Namespaced macro families decline any call whose receiver is not their
/// namespace, so the same name stays usable as an ordinary variable.
pub fn in_namespace(f: &ExprFactory<'_>, target: Option<ExprId>, namespace: &str) -> bool {
    target.is_some_and(|t| f.ident_name(t) == Some(namespace))
}

/// Whether `id` is a list literal with no elements.
pub fn is_empty_list(f: &ExprFactory<'_>, id: ExprId) -> bool {
    f.list_elements(id).is_some_and(<[ExprId]>::is_empty)
}

#[allow(clippy::too_many_arguments)]
fn fold(
    f: &mut ExprFactory<'_>,
    vars: IterVars,
    accu_var: &str,
    iter_range: ExprId,
    accu_init: ExprId,
    loop_condition: ExprId,
    loop_step: ExprId,
    result: ExprId,
) -> ExprId {
    tracing::trace!(iter_var = %vars.first, accu_var, "lowering fold");
    f.new_comprehension(Comprehension {
        iter_var: vars.first,
        iter_var2: vars.second,
        accu_var: accu_var.to_owned(),
        iter_range,
        accu_init,
        loop_condition,
        loop_step,
        result,
    })
}

fn not_strictly_false(f: &mut ExprFactory<'_>, operand: ExprId) -> ExprId {
    f.new_global_call(NOT_STRICTLY_FALSE, [operand])
}

fn ternary(f: &mut ExprFactory<'_>, cond: ExprId, then: ExprId, otherwise: ExprId) -> ExprId {
    f.new_global_call(CONDITIONAL, [cond, then, otherwise])
}

/// Wrap `step` in `filter ? step : accu` when a filter is present.
fn filtered(f: &mut ExprFactory<'_>, filter: Option<ExprId>, step: ExprId) -> ExprId {
    match filter {
        Some(cond) => {
            let accu = f.new_accu_ident();
            ternary(f, cond, step, accu)
        }
        None => step,
    }
}

/// `range.all(x, p)`: true unless some element makes `p` false.
pub fn all(f: &mut ExprFactory<'_>, range: ExprId, vars: IterVars, pred: ExprId) -> ExprId {
    let init = f.new_bool(true);
    let accu = f.new_accu_ident();
    let cond = not_strictly_false(f, accu);
    let accu = f.new_accu_ident();
    let step = f.new_global_call(LOGICAL_AND, [accu, pred]);
    let result = f.new_accu_ident();
    fold(f, vars, ACCUMULATOR_VAR, range, init, cond, step, result)
}

/// `range.exists(x, p)`: true once some element makes `p` true.
pub fn exists(f: &mut ExprFactory<'_>, range: ExprId, vars: IterVars, pred: ExprId) -> ExprId {
    let init = f.new_bool(false);
    let accu = f.new_accu_ident();
    let not_accu = f.new_global_call(LOGICAL_NOT, [accu]);
    let cond = not_strictly_false(f, not_accu);
    let accu = f.new_accu_ident();
    let step = f.new_global_call(LOGICAL_OR, [accu, pred]);
    let result = f.new_accu_ident();
    fold(f, vars, ACCUMULATOR_VAR, range, init, cond, step, result)
}

/// `range.exists_one(x, p)`: exactly one element satisfies `p`.
pub fn exists_one(f: &mut ExprFactory<'_>, range: ExprId, vars: IterVars, pred: ExprId) -> ExprId {
    let init = f.new_int(0);
    let cond = f.new_bool(true);
    let accu = f.new_accu_ident();
    let one = f.new_int(1);
    let incremented = f.new_global_call(ADD, [accu, one]);
    let unchanged = f.new_accu_ident();
    let step = ternary(f, pred, incremented, unchanged);
    let accu = f.new_accu_ident();
    let one = f.new_int(1);
    let result = f.new_global_call(EQUALS, [accu, one]);
    fold(f, vars, ACCUMULATOR_VAR, range, init, cond, step, result)
}

/// `range.transformList(x, [filter,] t)` and `range.map(x, [filter,] t)`.
pub fn transform_list(
    f: &mut ExprFactory<'_>,
    range: ExprId,
    vars: IterVars,
    filter: Option<ExprId>,
    transform: ExprId,
) -> ExprId {
    let init = f.new_list([]);
    let cond = f.new_bool(true);
    let accu = f.new_accu_ident();
    let single = f.new_list([transform]);
    let appended = f.new_global_call(ADD, [accu, single]);
    let step = filtered(f, filter, appended);
    let result = f.new_accu_ident();
    fold(f, vars, ACCUMULATOR_VAR, range, init, cond, step, result)
}

/// `range.filter(x, p)`: the elements for which `p` holds.
pub fn filter(f: &mut ExprFactory<'_>, range: ExprId, vars: IterVars, pred: ExprId) -> ExprId {
    let element = f.new_ident(vars.first.clone());
    transform_list(f, range, vars, Some(pred), element)
}

/// `range.transformMap(k, v, [filter,] t)`: map from each key to `t`.
pub fn transform_map(
    f: &mut ExprFactory<'_>,
    range: ExprId,
    vars: IterVars,
    filter: Option<ExprId>,
    transform: ExprId,
) -> ExprId {
    let init = f.new_map([]);
    let cond = f.new_bool(true);
    let accu = f.new_accu_ident();
    let key = f.new_ident(vars.first.clone());
    let inserted = f.new_global_call(MAP_INSERT, [accu, key, transform]);
    let step = filtered(f, filter, inserted);
    let result = f.new_accu_ident();
    fold(f, vars, ACCUMULATOR_VAR, range, init, cond, step, result)
}

/// `range.transformMapEntry(k, v, [filter,] e)`: merge the single-entry maps
/// produced by `e`.
pub fn transform_map_entry(
    f: &mut ExprFactory<'_>,
    range: ExprId,
    vars: IterVars,
    filter: Option<ExprId>,
    entry: ExprId,
) -> ExprId {
    let init = f.new_map([]);
    let cond = f.new_bool(true);
    let accu = f.new_accu_ident();
    let merged = f.new_global_call(MAP_INSERT, [accu, entry]);
    let step = filtered(f, filter, merged);
    let result = f.new_accu_ident();
    fold(f, vars, ACCUMULATOR_VAR, range, init, cond, step, result)
}

/// `cel.bind(name, init, result)`: evaluate `result` with `name` bound to
/// `init`, which is evaluated once.
///
/// Lowered as a fold over an empty list whose accumulator is `name`.
pub fn bind(f: &mut ExprFactory<'_>, name: &str, init: ExprId, result: ExprId) -> ExprId {
    let range = f.new_list([]);
    let cond = f.new_bool(false);
    let step = f.new_ident(name);
    fold(
        f,
        IterVars::one(UNUSED_ITER_VAR.to_owned()),
        name,
        range,
        init,
        cond,
        step,
        result,
    )
}

#[cfg(test)]
mod tests;
