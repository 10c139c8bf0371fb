//! The `math` library.
//!
//! | version | adds |
//! |---|---|
//! | 0 | `math.greatest`, `math.least` |
//! | 1 | rounding, `abs`, `sign`, the float classifiers and bit operations |
//! | 2 | `math.sqrt` |
//!
//! `greatest` and `least` are variadic namespaced macros lowering to the
//! internal `math.@max` and `math.@min` functions, so that one declared
//! overload covers any argument count.

use std::cmp::Ordering;

use cel_eval::errors::{integer_overflow, invalid_argument};
use cel_eval::{CallContext, EvalError, EvalResult, Value};
use cel_ir::{ExprFactory, ExprId, ExprKind};
use cel_macros::lowering::{finish, in_namespace, is_empty_list, Expansion};
use cel_macros::Macro;
use cel_types::{Overload, Type};

use crate::args::{require_double, require_int, require_list, require_uint};
use crate::params::param_a;
use crate::{Feature, FunctionDef, Library};

const NAMESPACE: &str = "math";
const MAX: &str = "math.@max";
const MIN: &str = "math.@min";

/// `math`, versions 0 through 2.
#[derive(Copy, Clone, Debug, Default)]
pub struct MathLib;

impl Library for MathLib {
    fn name(&self) -> &str {
        NAMESPACE
    }

    fn features(&self) -> Vec<Feature> {
        let mut features = vec![
            Feature::new("math.greatest", 0)
                .function(extremum_function(MAX, "math_@max", Ordering::Greater))
                .with_macros([min_max_macro("greatest", MAX)]),
            Feature::new("math.least", 0)
                .function(extremum_function(MIN, "math_@min", Ordering::Less))
                .with_macros([min_max_macro("least", MIN)]),
        ];
        let rounding: [(&str, fn(f64) -> f64); 4] = [
            ("ceil", f64::ceil),
            ("floor", f64::floor),
            ("round", f64::round),
            ("trunc", f64::trunc),
        ];
        for (name, op) in rounding {
            features.push(double_unary(name, Type::Double, move |d| Value::Double(op(d))));
        }
        features.push(Feature::new("math.abs", 1).function(abs()));
        features.push(Feature::new("math.sign", 1).function(sign()));
        let classifiers: [(&str, fn(f64) -> bool); 3] = [
            ("isInf", f64::is_infinite),
            ("isNaN", f64::is_nan),
            ("isFinite", f64::is_finite),
        ];
        for (name, test) in classifiers {
            features.push(double_unary(name, Type::Bool, move |d| Value::Bool(test(d))));
        }
        features.extend(bit_features());
        features.push(Feature::new("math.sqrt", 2).function(sqrt()));
        features
    }
}

// Macros

fn min_max_macro(name: &'static str, function: &'static str) -> Macro {
    Macro::receiver_variadic(name, move |f, target, args| {
        if !in_namespace(f, target, NAMESPACE) {
            return None;
        }
        finish(expand_min_max(f, name, function, args))
    })
}

/// One argument: `@max(x)`; two: `@max(a, b)`; more: `@max([a, b, ...])`.
fn expand_min_max(
    f: &mut ExprFactory<'_>,
    name: &str,
    function: &str,
    args: &[ExprId],
) -> Expansion {
    match args {
        [] => Err(f.report_call_error(format!(
            "math.{name}() requires at least one argument"
        ))),
        &[single] => {
            if is_empty_list(f, single) {
                return Err(f.report_error(
                    single,
                    format!("math.{name}() requires at least one argument"),
                ));
            }
            if let Some(items) = f.list_elements(single).map(<[ExprId]>::to_vec) {
                check_arguments(f, name, &items)?;
            } else if !valid_single_argument(f, single) {
                return Err(f.report_error(
                    single,
                    format!("math.{name}() invalid single argument value"),
                ));
            }
            Ok(f.new_global_call(function, [single]))
        }
        &[a, b] => {
            check_arguments(f, name, &[a, b])?;
            Ok(f.new_global_call(function, [a, b]))
        }
        many => {
            check_arguments(f, name, many)?;
            let list = f.new_list(many.iter().copied());
            Ok(f.new_global_call(function, [list]))
        }
    }
}

/// A lone argument must be a numeric literal or something whose value is
/// only known at runtime.
fn valid_single_argument(f: &ExprFactory<'_>, arg: ExprId) -> bool {
    match f.kind(arg) {
        ExprKind::Literal(lit) => lit.is_numeric(),
        ExprKind::Map(_) | ExprKind::Struct { .. } => false,
        _ => true,
    }
}

/// Among several arguments, literals must be numeric and aggregate
/// literals are never valid.
fn check_arguments(f: &mut ExprFactory<'_>, name: &str, args: &[ExprId]) -> Result<(), ExprId> {
    let invalid = args.iter().copied().find(|&arg| match f.kind(arg) {
        ExprKind::Literal(lit) => !lit.is_numeric(),
        ExprKind::List(_) | ExprKind::Map(_) | ExprKind::Struct { .. } => true,
        _ => false,
    });
    match invalid {
        Some(arg) => Err(f.report_error(arg, format!("math.{name}() invalid argument value"))),
        None => Ok(()),
    }
}

// math.@max / math.@min

const NUMERIC: [(&str, Type); 3] = [
    ("int64", Type::Int),
    ("uint64", Type::Uint),
    ("double", Type::Double),
];

/// Declarations and bindings of `math.@max` (`want == Greater`) or
/// `math.@min` (`want == Less`).
fn extremum_function(function: &'static str, prefix: &str, want: Ordering) -> FunctionDef {
    let pick = move |ctx: &CallContext<'_>, values: &[Value]| extremum(ctx, function, values, want);
    let mut def = FunctionDef::new(function);
    for (name, ty) in &NUMERIC {
        def = def.overload(
            Overload::global(format!("{prefix}_{name}"), vec![ty.clone()], ty.clone()),
            move |ctx, args| pick(ctx, args),
        );
    }
    for (left_name, left) in &NUMERIC {
        for (right_name, right) in &NUMERIC {
            let result = if left == right { left.clone() } else { Type::Dyn };
            def = def.overload(
                Overload::global(
                    format!("{prefix}_{left_name}_{right_name}"),
                    vec![left.clone(), right.clone()],
                    result,
                ),
                move |ctx, args| pick(ctx, args),
            );
        }
    }
    def.overload(
        Overload::global(format!("{prefix}_list"), vec![Type::list(param_a())], param_a()),
        move |ctx, args| pick(ctx, require_list(function, args, 0)?),
    )
}

/// The greatest (or least) of `values`, keeping its representation. NaN
/// wins over every other value.
fn extremum(ctx: &CallContext<'_>, function: &str, values: &[Value], want: Ordering) -> EvalResult {
    let mut best: Option<&Value> = None;
    for value in values {
        if !value.is_numeric() {
            return Err(invalid_argument(format!(
                "{function}() expected numeric arguments, got {}",
                value.type_name()
            )));
        }
        best = match best {
            None => Some(value),
            Some(current) if is_nan(current) => Some(current),
            Some(current) => match ctx.comparator().compare_numeric(value, current) {
                Some(ordering) if ordering == want => Some(value),
                Some(_) => Some(current),
                None => Some(value),
            },
        };
    }
    best.cloned()
        .ok_or_else(|| invalid_argument(format!("{function}() requires at least one argument")))
}

fn is_nan(value: &Value) -> bool {
    matches!(value, Value::Double(d) if d.is_nan())
}

// Version 1

/// A `math.<name>(double)` function introduced at version 1.
fn double_unary(
    name: &str,
    result: Type,
    op: impl Fn(f64) -> Value + Send + Sync + 'static,
) -> Feature {
    let function = format!("math.{name}");
    let def = FunctionDef::new(function.clone()).overload(
        Overload::global(format!("math_{name}_double"), vec![Type::Double], result),
        move |_, args| Ok(op(require_double("math", args, 0)?)),
    );
    Feature::new(function, 1).function(def)
}

fn abs() -> FunctionDef {
    FunctionDef::new("math.abs")
        .overload(
            Overload::global("math_abs_int64", vec![Type::Int], Type::Int),
            |_, args| {
                require_int("math.abs", args, 0)?
                    .checked_abs()
                    .map(Value::Int)
                    .ok_or_else(|| integer_overflow("math.abs"))
            },
        )
        .overload(
            Overload::global("math_abs_uint64", vec![Type::Uint], Type::Uint),
            |ctx, args| ctx.uint(require_uint(ctx, args, 0)?),
        )
        .overload(
            Overload::global("math_abs_double", vec![Type::Double], Type::Double),
            |_, args| Ok(Value::Double(require_double("math.abs", args, 0)?.abs())),
        )
}

fn sign() -> FunctionDef {
    FunctionDef::new("math.sign")
        .overload(
            Overload::global("math_sign_int64", vec![Type::Int], Type::Int),
            |_, args| Ok(Value::Int(require_int("math.sign", args, 0)?.signum())),
        )
        .overload(
            Overload::global("math_sign_uint64", vec![Type::Uint], Type::Uint),
            |ctx, args| ctx.uint(u64::from(require_uint(ctx, args, 0)? != 0)),
        )
        .overload(
            Overload::global("math_sign_double", vec![Type::Double], Type::Double),
            |_, args| {
                let d = require_double("math.sign", args, 0)?;
                let sign = if d == 0.0 || d.is_nan() { d } else { d.signum() };
                Ok(Value::Double(sign))
            },
        )
}

type IntOp = fn(i64, i64) -> i64;
type UintOp = fn(u64, u64) -> u64;

fn bit_features() -> Vec<Feature> {
    let binary: [(&str, IntOp, UintOp); 3] = [
        ("bitAnd", |a, b| a & b, |a, b| a & b),
        ("bitOr", |a, b| a | b, |a, b| a | b),
        ("bitXor", |a, b| a ^ b, |a, b| a ^ b),
    ];
    let mut features: Vec<Feature> = binary
        .into_iter()
        .map(|(name, int_op, uint_op)| {
            let function = format!("math.{name}");
            let def = FunctionDef::new(function.clone())
                .overload(
                    Overload::global(
                        format!("math_{name}_int64_int64"),
                        vec![Type::Int, Type::Int],
                        Type::Int,
                    ),
                    move |_, args| {
                        let a = require_int("math", args, 0)?;
                        let b = require_int("math", args, 1)?;
                        Ok(Value::Int(int_op(a, b)))
                    },
                )
                .overload(
                    Overload::global(
                        format!("math_{name}_uint64_uint64"),
                        vec![Type::Uint, Type::Uint],
                        Type::Uint,
                    ),
                    move |ctx, args| {
                        let a = require_uint(ctx, args, 0)?;
                        let b = require_uint(ctx, args, 1)?;
                        ctx.uint(uint_op(a, b))
                    },
                );
            Feature::new(function, 1).function(def)
        })
        .collect();

    features.push(
        Feature::new("math.bitNot", 1).function(
            FunctionDef::new("math.bitNot")
                .overload(
                    Overload::global("math_bitNot_int64", vec![Type::Int], Type::Int),
                    |_, args| Ok(Value::Int(!require_int("math.bitNot", args, 0)?)),
                )
                .overload(
                    Overload::global("math_bitNot_uint64", vec![Type::Uint], Type::Uint),
                    |ctx, args| ctx.uint(!require_uint(ctx, args, 0)?),
                ),
        ),
    );
    features.push(Feature::new("math.bitShiftLeft", 1).function(shift("bitShiftLeft", true)));
    features.push(Feature::new("math.bitShiftRight", 1).function(shift("bitShiftRight", false)));
    features
}

/// Shift offset; offsets of 64 or more shift every bit out.
fn shift_offset(function: &str, args: &[Value]) -> Result<Option<u32>, EvalError> {
    let offset = require_int(function, args, 1)?;
    if offset < 0 {
        return Err(invalid_argument(format!(
            "{function}() negative offset: {offset}"
        )));
    }
    Ok(u32::try_from(offset).ok().filter(|&o| o < 64))
}

/// Right shifts are logical for both `int` and `uint`.
fn shift(name: &'static str, left: bool) -> FunctionDef {
    let function = format!("math.{name}");
    let int_fn = function.clone();
    let uint_fn = function.clone();
    FunctionDef::new(function)
        .overload(
            Overload::global(
                format!("math_{name}_int64_int64"),
                vec![Type::Int, Type::Int],
                Type::Int,
            ),
            move |_, args| {
                let value = require_int(&int_fn, args, 0)?;
                let bits = u64::from_ne_bytes(value.to_ne_bytes());
                let shifted = match shift_offset(&int_fn, args)? {
                    Some(o) if left => bits << o,
                    Some(o) => bits >> o,
                    None => 0,
                };
                Ok(Value::Int(i64::from_ne_bytes(shifted.to_ne_bytes())))
            },
        )
        .overload(
            Overload::global(
                format!("math_{name}_uint64_int64"),
                vec![Type::Uint, Type::Int],
                Type::Uint,
            ),
            move |ctx, args| {
                let value = require_uint(ctx, args, 0)?;
                let shifted = match shift_offset(&uint_fn, args)? {
                    Some(o) if left => value << o,
                    Some(o) => value >> o,
                    None => 0,
                };
                ctx.uint(shifted)
            },
        )
}

// Version 2

#[expect(clippy::cast_precision_loss, reason = "square roots are doubles")]
fn sqrt() -> FunctionDef {
    FunctionDef::new("math.sqrt")
        .overload(
            Overload::global("math_sqrt_double", vec![Type::Double], Type::Double),
            |_, args| Ok(Value::Double(require_double("math.sqrt", args, 0)?.sqrt())),
        )
        .overload(
            Overload::global("math_sqrt_int64", vec![Type::Int], Type::Double),
            |_, args| Ok(Value::Double((require_int("math.sqrt", args, 0)? as f64).sqrt())),
        )
        .overload(
            Overload::global("math_sqrt_uint64", vec![Type::Uint], Type::Double),
            |ctx, args| Ok(Value::Double((require_uint(ctx, args, 0)? as f64).sqrt())),
        )
}

#[cfg(test)]
mod tests;
