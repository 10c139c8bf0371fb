//! Equality and ordering.
//!
//! Every overload routes through the shared numeric comparator, so mixed
//! numeric comparisons are exact and agree with equality.

use std::cmp::Ordering;

use cel_eval::errors::no_matching_overload;
use cel_eval::{CallContext, EvalResult, Value};
use cel_ir::operators::{EQUALS, GREATER, GREATER_EQUALS, LESS, LESS_EQUALS, NOT_EQUALS};
use cel_types::{Overload, Type};

use crate::params::{param_a, param_b};
use crate::{Feature, FunctionDef};

const ORDERINGS: [(&str, &str, fn(Ordering) -> bool); 4] = [
    (LESS, "less", Ordering::is_lt),
    (LESS_EQUALS, "less_equals", Ordering::is_le),
    (GREATER, "greater", Ordering::is_gt),
    (GREATER_EQUALS, "greater_equals", Ordering::is_ge),
];

pub(super) fn features() -> Vec<Feature> {
    let mut features = vec![
        Feature::new(EQUALS, 0).function(FunctionDef::new(EQUALS).overload(
            Overload::global("equals", vec![param_a(), param_b()], Type::Bool),
            |ctx, args| Ok(Value::Bool(ctx.comparator().equals(&args[0], &args[1]))),
        )),
        Feature::new(NOT_EQUALS, 0).function(FunctionDef::new(NOT_EQUALS).overload(
            Overload::global("not_equals", vec![param_a(), param_b()], Type::Bool),
            |ctx, args| Ok(Value::Bool(!ctx.comparator().equals(&args[0], &args[1]))),
        )),
    ];
    for (function, prefix, accept) in ORDERINGS {
        features.push(Feature::new(function, 0).function(ordering(function, prefix, accept)));
    }
    features
}

/// Operand pairs an ordering operator is declared for, with their overload
/// id suffixes.
fn ordered_pairs() -> Vec<(String, Type, Type)> {
    let same = [
        ("bool", Type::Bool),
        ("int64", Type::Int),
        ("uint64", Type::Uint),
        ("double", Type::Double),
        ("string", Type::String),
        ("bytes", Type::Bytes),
    ];
    let numeric = [
        ("int64", Type::Int),
        ("uint64", Type::Uint),
        ("double", Type::Double),
    ];
    let mut pairs: Vec<(String, Type, Type)> = same
        .into_iter()
        .map(|(name, ty)| (name.to_owned(), ty.clone(), ty))
        .collect();
    for (left_name, left) in &numeric {
        for (right_name, right) in &numeric {
            if left != right {
                pairs.push((format!("{left_name}_{right_name}"), left.clone(), right.clone()));
            }
        }
    }
    pairs
}

fn ordering(function: &'static str, prefix: &str, accept: fn(Ordering) -> bool) -> FunctionDef {
    ordered_pairs()
        .into_iter()
        .fold(FunctionDef::new(function), |def, (suffix, left, right)| {
            def.overload(
                Overload::global(format!("{prefix}_{suffix}"), vec![left, right], Type::Bool),
                move |ctx, args| compare_with(ctx, function, args, accept),
            )
        })
}

fn compare_with(
    ctx: &CallContext<'_>,
    function: &str,
    args: &[Value],
    accept: fn(Ordering) -> bool,
) -> EvalResult {
    match ctx.comparator().compare(&args[0], &args[1]) {
        Some(ordering) => Ok(Value::Bool(accept(ordering))),
        // NaN is unordered with everything.
        None if args[0].is_numeric() && args[1].is_numeric() => Ok(Value::Bool(false)),
        None => Err(no_matching_overload(function, args)),
    }
}
