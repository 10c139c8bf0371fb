//! The `lists` library.
//!
//! | version | adds |
//! |---|---|
//! | 0 | `slice` |
//! | 1 | `flatten()`, `flatten(depth)` |
//! | 2 | `lists.range`, `distinct`, `reverse`, `sort`, `sortBy`, `first`, `last` |

use std::cmp::Ordering;

use cel_eval::errors::invalid_argument;
use cel_eval::{CallContext, EvalError, Value};
use cel_ir::{ExprFactory, ExprId};
use cel_macros::lowering::{self, finish, iter_var, Expansion};
use cel_macros::Macro;
use cel_types::{Overload, Type};

use crate::args::{int_len, require_index, require_int, require_list};
use crate::params::{param_a, param_b};
use crate::{Feature, FunctionDef, Library};

const SORT_BY_KEYS: &str = "@sortByAssociatedKeys";
/// Name the `sortBy` expansion binds its receiver to.
const SORT_BY_INPUT: &str = "@__sortBy_input__";

/// `lists`, versions 0 through 2.
#[derive(Copy, Clone, Debug, Default)]
pub struct ListsLib;

impl Library for ListsLib {
    fn name(&self) -> &str {
        "lists"
    }

    fn features(&self) -> Vec<Feature> {
        vec![
            Feature::new("slice", 0).function(slice()),
            Feature::new("flatten", 1).function(flatten()),
            Feature::new("lists.range", 2).function(range()),
            Feature::new("distinct", 2).function(list_unary("distinct", distinct)),
            Feature::new("reverse", 2).function(list_unary("reverse", |_, items| {
                Ok(items.iter().rev().cloned().collect())
            })),
            Feature::new("sort", 2).function(list_unary("sort", sort)),
            Feature::new("sortBy", 2)
                .function(sort_by_keys())
                .with_macros([Macro::receiver("sortBy", 2, |f, target, args| {
                    let input = target?;
                    finish(expand_sort_by(f, input, args[0], args[1]))
                })]),
            Feature::new("first", 2).function(list_end("first", <[Value]>::first)),
            Feature::new("last", 2).function(list_end("last", <[Value]>::last)),
        ]
    }
}

/// `xs.slice(start, end)`: elements `start..end`.
fn slice() -> FunctionDef {
    FunctionDef::new("slice").overload(
        Overload::member(
            "list_slice",
            vec![Type::list(param_a()), Type::Int, Type::Int],
            Type::list(param_a()),
        ),
        |_, args| {
            let items = require_list("slice", args, 0)?;
            let start = require_int("slice", args, 1)?;
            let end = require_int("slice", args, 2)?;
            let fail = |reason: String| {
                invalid_argument(format!("cannot slice({start}, {end}), {reason}"))
            };
            if start < 0 || end < 0 {
                return Err(fail("negative indexes not supported".to_owned()));
            }
            if start > end {
                return Err(fail(
                    "start index must be less than or equal to end index".to_owned(),
                ));
            }
            let (Ok(from), Ok(to)) = (usize::try_from(start), usize::try_from(end)) else {
                return Err(fail("negative indexes not supported".to_owned()));
            };
            match items.get(from..to) {
                Some(part) => Ok(Value::list(part.to_vec())),
                None => Err(fail(format!("list is length {}", items.len()))),
            }
        },
    )
}

/// `xs.flatten()` removes one level of nesting, `xs.flatten(n)` up to `n`.
fn flatten() -> FunctionDef {
    FunctionDef::new("flatten")
        .overload(
            Overload::member(
                "list_flatten",
                vec![Type::list(Type::list(param_a()))],
                Type::list(param_a()),
            ),
            |_, args| {
                let mut out = Vec::new();
                flatten_into(&mut out, require_list("flatten", args, 0)?, 1);
                Ok(Value::list(out))
            },
        )
        .overload(
            Overload::member(
                "list_flatten_int",
                vec![Type::list(Type::Dyn), Type::Int],
                Type::list(Type::Dyn),
            ),
            |_, args| {
                let items = require_list("flatten", args, 0)?;
                let depth = require_int("flatten", args, 1)?;
                let depth = usize::try_from(depth)
                    .map_err(|_| invalid_argument("flatten(): level must be non-negative"))?;
                let mut out = Vec::new();
                flatten_into(&mut out, items, depth);
                Ok(Value::list(out))
            },
        )
}

fn flatten_into(out: &mut Vec<Value>, items: &[Value], depth: usize) {
    for item in items {
        match item {
            Value::List(inner) if depth > 0 => flatten_into(out, inner, depth - 1),
            other => out.push(other.clone()),
        }
    }
}

/// `lists.range(n)`: `[0, 1, ..., n - 1]`.
fn range() -> FunctionDef {
    FunctionDef::new("lists.range").overload(
        Overload::global("lists_range", vec![Type::Int], Type::list(Type::Int)),
        |_, args| {
            let n = require_index("lists.range", args, 0)?;
            Ok(Value::list((0..n).map(int_len).collect()))
        },
    )
}

type ListOp = fn(&CallContext<'_>, &[Value]) -> Result<Vec<Value>, EvalError>;

/// A member function from `list(A)` to `list(A)`.
fn list_unary(name: &'static str, op: ListOp) -> FunctionDef {
    FunctionDef::new(name).overload(
        Overload::member(
            format!("list_{name}"),
            vec![Type::list(param_a())],
            Type::list(param_a()),
        ),
        move |ctx, args| op(ctx, require_list(name, args, 0)?).map(Value::list),
    )
}

/// First occurrences only, by language equality.
fn distinct(ctx: &CallContext<'_>, items: &[Value]) -> Result<Vec<Value>, EvalError> {
    let mut out: Vec<Value> = Vec::with_capacity(items.len());
    for item in items {
        if !out.iter().any(|seen| ctx.comparator().equals(seen, item)) {
            out.push(item.clone());
        }
    }
    Ok(out)
}

/// Elements that may be sorted together: numbers of any representation,
/// or values of one other orderable kind.
fn sort_class(value: &Value) -> Option<u8> {
    match value {
        Value::Int(_) | Value::Uint(_) | Value::Double(_) => Some(0),
        Value::String(_) => Some(1),
        Value::Bytes(_) => Some(2),
        Value::Bool(_) => Some(3),
        _ => None,
    }
}

fn check_sortable(function: &str, items: &[Value]) -> Result<(), EvalError> {
    let Some(first) = items.first() else {
        return Ok(());
    };
    let class = sort_class(first);
    for item in items {
        if class.is_none() || sort_class(item) != class {
            return Err(invalid_argument(format!(
                "{function}() list elements are not comparable: {} and {}",
                first.type_name(),
                item.type_name()
            )));
        }
    }
    Ok(())
}

/// Total order over one sort class; NaN sorts after every number.
fn total_order(ctx: &CallContext<'_>, a: &Value, b: &Value) -> Ordering {
    let is_nan = |v: &Value| matches!(v, Value::Double(d) if d.is_nan());
    ctx.comparator()
        .compare(a, b)
        .unwrap_or_else(|| is_nan(a).cmp(&is_nan(b)))
}

fn sort(ctx: &CallContext<'_>, items: &[Value]) -> Result<Vec<Value>, EvalError> {
    check_sortable("sort", items)?;
    let mut sorted = items.to_vec();
    sorted.sort_by(|a, b| total_order(ctx, a, b));
    Ok(sorted)
}

/// `xs.sortBy(e, key)` becomes
/// `cel.bind(@input, xs, @input.@sortByAssociatedKeys(@input.map(e, key)))`.
fn expand_sort_by(
    f: &mut ExprFactory<'_>,
    input: ExprId,
    var: ExprId,
    key: ExprId,
) -> Expansion {
    let vars = iter_var(f, var)?;
    let range = f.new_ident(SORT_BY_INPUT);
    let keys = lowering::transform_list(f, range, vars, None, key);
    let receiver = f.new_ident(SORT_BY_INPUT);
    let sorted = f.new_member_call(SORT_BY_KEYS, receiver, [keys]);
    Ok(lowering::bind(f, SORT_BY_INPUT, input, sorted))
}

/// `xs.@sortByAssociatedKeys(keys)`: `xs` stably ordered by `keys`.
fn sort_by_keys() -> FunctionDef {
    FunctionDef::new(SORT_BY_KEYS).overload(
        Overload::member(
            "list_sortByAssociatedKeys",
            vec![Type::list(param_a()), Type::list(param_b())],
            Type::list(param_a()),
        ),
        |ctx, args| {
            let items = require_list("sortBy", args, 0)?;
            let keys = require_list("sortBy", args, 1)?;
            if items.len() != keys.len() {
                return Err(invalid_argument(format!(
                    "sortBy() expected {} keys, got {}",
                    items.len(),
                    keys.len()
                )));
            }
            check_sortable("sortBy", keys)?;
            let mut order: Vec<usize> = (0..items.len()).collect();
            order.sort_by(|&a, &b| total_order(ctx, &keys[a], &keys[b]));
            Ok(Value::list(order.into_iter().map(|i| items[i].clone()).collect()))
        },
    )
}

/// `xs.first()` or `xs.last()` as an optional.
fn list_end(name: &'static str, pick: fn(&[Value]) -> Option<&Value>) -> FunctionDef {
    FunctionDef::new(name).overload(
        Overload::member(
            format!("list_{name}"),
            vec![Type::list(param_a())],
            Type::optional(param_a()),
        ),
        move |_, args| {
            let items = require_list(name, args, 0)?;
            Ok(pick(items).cloned().map_or_else(Value::none, Value::some))
        },
    )
}
