//! `size`, indexing, membership and the string predicates.

use cel_eval::errors::{index_out_of_bounds, invalid_argument, no_such_key};
use cel_eval::{EvalResult, Value};
use cel_ir::operators::{IN, INDEX};
use cel_types::{Overload, Type};

use crate::args::{int_len, require_int, require_list, require_map, require_str, require_uint};
use crate::params::{param_a, param_b};
use crate::{Feature, FunctionDef};

pub(super) fn features() -> Vec<Feature> {
    vec![
        Feature::new("size", 0).function(size()),
        Feature::new(INDEX, 0).function(index()),
        Feature::new(IN, 0).function(membership()),
        Feature::new("contains", 0).function(string_predicate(
            "contains",
            "contains_string",
            |s, sub| s.contains(sub),
        )),
        Feature::new("startsWith", 0).function(string_predicate(
            "startsWith",
            "starts_with_string",
            |s, prefix| s.starts_with(prefix),
        )),
        Feature::new("endsWith", 0).function(string_predicate(
            "endsWith",
            "ends_with_string",
            |s, suffix| s.ends_with(suffix),
        )),
    ]
}

fn size_of(value: &Value) -> EvalResult {
    let len = match value {
        Value::String(s) => s.chars().count(),
        Value::Bytes(b) => b.len(),
        Value::List(items) => items.len(),
        Value::Map(map) => map.len(),
        other => {
            return Err(invalid_argument(format!(
                "size() is not defined for {}",
                other.type_name()
            )))
        }
    };
    Ok(int_len(len))
}

/// `size(x)` and `x.size()` for strings (in code points), bytes, lists and
/// maps.
fn size() -> FunctionDef {
    let operands = [
        ("string", Type::String),
        ("bytes", Type::Bytes),
        ("list", Type::list(param_a())),
        ("map", Type::map(param_a(), param_b())),
    ];
    let mut def = FunctionDef::new("size");
    for (name, ty) in &operands {
        def = def.overload(
            Overload::global(format!("size_{name}"), vec![ty.clone()], Type::Int),
            |_, args| size_of(&args[0]),
        );
    }
    for (name, ty) in operands {
        def = def.overload(
            Overload::member(format!("{name}_size"), vec![ty], Type::Int),
            |_, args| size_of(&args[0]),
        );
    }
    def
}

/// `list[index]`; `shown` is the index as written, for the error.
fn list_element(list: &[Value], index: i128, shown: &Value) -> EvalResult {
    usize::try_from(index)
        .ok()
        .and_then(|i| list.get(i))
        .cloned()
        .ok_or_else(|| index_out_of_bounds(shown, list.len()))
}

/// `list[i]` by `int` or `uint`, and `map[key]`.
fn index() -> FunctionDef {
    FunctionDef::new(INDEX)
        .overload(
            Overload::global("index_list", vec![Type::list(param_a()), Type::Int], param_a()),
            |_, args| {
                let list = require_list(INDEX, args, 0)?;
                list_element(list, i128::from(require_int(INDEX, args, 1)?), &args[1])
            },
        )
        .overload(
            Overload::global(
                "index_list_uint",
                vec![Type::list(param_a()), Type::Uint],
                param_a(),
            ),
            |ctx, args| {
                let list = require_list(INDEX, args, 0)?;
                list_element(list, i128::from(require_uint(ctx, args, 1)?), &args[1])
            },
        )
        .overload(
            Overload::global(
                "index_map",
                vec![Type::map(param_a(), param_b()), param_a()],
                param_b(),
            ),
            |_, args| {
                let map = require_map(INDEX, args, 0)?;
                map.get(&args[1])
                    .cloned()
                    .ok_or_else(|| no_such_key(&args[1]))
            },
        )
}

/// `x in list` by language equality, `k in map` by key.
fn membership() -> FunctionDef {
    FunctionDef::new(IN)
        .overload(
            Overload::global("in_list", vec![param_a(), Type::list(param_a())], Type::Bool),
            |ctx, args| {
                let list = require_list(IN, args, 1)?;
                let found = list.iter().any(|item| ctx.comparator().equals(&args[0], item));
                Ok(Value::Bool(found))
            },
        )
        .overload(
            Overload::global(
                "in_map",
                vec![param_a(), Type::map(param_a(), param_b())],
                Type::Bool,
            ),
            |_, args| Ok(Value::Bool(require_map(IN, args, 1)?.contains_key(&args[0]))),
        )
}

fn string_predicate(
    function: &'static str,
    id: &str,
    test: fn(&str, &str) -> bool,
) -> FunctionDef {
    FunctionDef::new(function).overload(
        Overload::member(id, vec![Type::String, Type::String], Type::Bool),
        move |_, args| {
            let s = require_str(function, args, 0)?;
            let arg = require_str(function, args, 1)?;
            Ok(Value::Bool(test(s, arg)))
        },
    )
}
