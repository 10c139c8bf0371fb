//! The `sets` library: list-as-set predicates.
//!
//! Membership uses language equality, so `sets.contains([1], [1u, 1.0])` is
//! true.

use cel_eval::{CallContext, Value};
use cel_types::{Overload, Type};

use crate::args::require_list;
use crate::params::param_a;
use crate::{Feature, FunctionDef, Library};

/// `sets`, version 0.
#[derive(Copy, Clone, Debug, Default)]
pub struct SetsLib;

impl Library for SetsLib {
    fn name(&self) -> &str {
        "sets"
    }

    fn features(&self) -> Vec<Feature> {
        vec![
            set_predicate("contains", |ctx, a, b| contains_all(ctx, a, b)),
            set_predicate("equivalent", |ctx, a, b| {
                contains_all(ctx, a, b) && contains_all(ctx, b, a)
            }),
            set_predicate("intersects", |ctx, a, b| {
                a.iter().any(|x| contains(ctx, b, x))
            }),
        ]
    }
}

type SetTest = fn(&CallContext<'_>, &[Value], &[Value]) -> bool;

fn set_predicate(name: &'static str, test: SetTest) -> Feature {
    let function = format!("sets.{name}");
    let def = FunctionDef::new(function.clone()).overload(
        Overload::global(
            format!("list_sets_{name}_list"),
            vec![Type::list(param_a()), Type::list(param_a())],
            Type::Bool,
        ),
        move |ctx, args| {
            let a = require_list(name, args, 0)?;
            let b = require_list(name, args, 1)?;
            Ok(Value::Bool(test(ctx, a, b)))
        },
    );
    Feature::new(function, 0).function(def)
}

fn contains(ctx: &CallContext<'_>, list: &[Value], value: &Value) -> bool {
    list.iter().any(|item| ctx.comparator().equals(item, value))
}

/// Every element of `sub` occurs in `list`.
fn contains_all(ctx: &CallContext<'_>, list: &[Value], sub: &[Value]) -> bool {
    sub.iter().all(|x| contains(ctx, list, x))
}
