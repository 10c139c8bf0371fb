//! Macros every environment has.

use cel_ir::{ExprFactory, ExprId, ExprKind};

use crate::lowering::{self, finish, Expansion, IterVars};
use crate::Macro;

/// `has`, `all`, `exists`, `exists_one`, `map` (two and three arguments)
/// and `filter`.
pub fn standard_macros() -> Vec<Macro> {
    vec![
        Macro::global("has", 1, |f, _, args| finish(expand_has(f, args[0]))),
        Macro::receiver("all", 2, |f, target, args| {
            single_var(f, target, args, lowering::all)
        }),
        Macro::receiver("exists", 2, |f, target, args| {
            single_var(f, target, args, lowering::exists)
        }),
        Macro::receiver("exists_one", 2, |f, target, args| {
            single_var(f, target, args, lowering::exists_one)
        }),
        Macro::receiver("map", 2, |f, target, args| {
            single_var(f, target, args, |f, range, vars, t| {
                lowering::transform_list(f, range, vars, None, t)
            })
        }),
        Macro::receiver("map", 3, |f, target, args| {
            let range = target?;
            finish(lowering::iter_var(f, args[0]).map(|vars| {
                lowering::transform_list(f, range, vars, Some(args[1]), args[2])
            }))
        }),
        Macro::receiver("filter", 2, |f, target, args| {
            single_var(f, target, args, lowering::filter)
        }),
    ]
}

/// `has(e.f)` becomes a presence test on `e`.
fn expand_has(f: &mut ExprFactory<'_>, arg: ExprId) -> Expansion {
    match f.kind(arg) {
        ExprKind::Select {
            operand,
            field,
            test_only: false,
        } => {
            let (operand, field) = (*operand, field.clone());
            Ok(f.new_presence_test(operand, field))
        }
        _ => Err(f.report_error(arg, "invalid argument to has() macro")),
    }
}

/// Shared shape of `target.m(x, e)` macros: validate `x`, then lower.
pub(crate) fn single_var(
    f: &mut ExprFactory<'_>,
    target: Option<ExprId>,
    args: &[ExprId],
    lower: impl FnOnce(&mut ExprFactory<'_>, ExprId, IterVars, ExprId) -> ExprId,
) -> Option<ExprId> {
    let range = target?;
    finish(lowering::iter_var(f, args[0]).map(|vars| lower(f, range, vars, args[1])))
}

#[cfg(test)]
mod tests;
