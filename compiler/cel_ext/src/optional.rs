//! The `optional` library: optional values, optional field selection
//! (`m.?f`) and optional indexing (`xs[?i]`, `m[?k]`).
//!
//! | version | adds |
//! |---|---|
//! | 0 | constructors, accessors, `.?`, `[?]`, `optMap`, `optFlatMap` |
//! | 1 | `optional.unwrap` |

use cel_eval::errors::invalid_argument;
use cel_eval::{EvalResult, Value};
use cel_ir::operators::{CONDITIONAL, OPT_INDEX, OPT_SELECT};
use cel_ir::{ExprFactory, ExprId};
use cel_macros::lowering::{bind, finish, simple_name, Expansion};
use cel_macros::Macro;
use cel_types::{Overload, Type};

use crate::args::{require_int, require_list, require_map, require_optional, require_str};
use crate::params::{param_a, param_b};
use crate::{Feature, FunctionDef, Library};

const OF: &str = "optional.of";
const NONE: &str = "optional.none";
const HAS_VALUE: &str = "hasValue";
const VALUE: &str = "value";

/// `optional`, versions 0 and 1.
#[derive(Copy, Clone, Debug, Default)]
pub struct OptionalLib;

impl Library for OptionalLib {
    fn name(&self) -> &str {
        "optional"
    }

    fn features(&self) -> Vec<Feature> {
        vec![
            Feature::new(OF, 0).function(of()),
            Feature::new("optional.ofNonZeroValue", 0).function(of_non_zero_value()),
            Feature::new(NONE, 0).function(none()),
            Feature::new(HAS_VALUE, 0).function(has_value()),
            Feature::new(VALUE, 0).function(value()),
            Feature::new("or", 0).function(or()),
            Feature::new("orValue", 0).function(or_value()),
            Feature::new(OPT_SELECT, 0).function(select_field()),
            Feature::new(OPT_INDEX, 0).function(index()),
            macro_feature("optMap", expand_opt_map),
            macro_feature("optFlatMap", expand_opt_flat_map),
            Feature::new("optional.unwrap", 1).function(unwrap()),
        ]
    }
}

/// Zero value of its type: `null`, `false`, `0`, `0u`, `0.0`, `''`, `b''`,
/// an empty list or map, or an empty optional.
fn is_zero(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Int(i) => *i == 0,
        Value::Uint(u) => *u == 0,
        Value::Double(d) => *d == 0.0,
        Value::String(s) => s.is_empty(),
        Value::Bytes(b) => b.is_empty(),
        Value::List(items) => items.is_empty(),
        Value::Map(map) => map.is_empty(),
        Value::Optional(inner) => inner.is_none(),
    }
}

fn optional_of(value: Option<&Value>) -> Value {
    value.cloned().map_or_else(Value::none, Value::some)
}

fn of() -> FunctionDef {
    FunctionDef::new(OF).overload(
        Overload::global("optional_of", vec![param_a()], Type::optional(param_a())),
        |_, args| Ok(Value::some(args[0].clone())),
    )
}

fn of_non_zero_value() -> FunctionDef {
    FunctionDef::new("optional.ofNonZeroValue").overload(
        Overload::global(
            "optional_ofNonZeroValue",
            vec![param_a()],
            Type::optional(param_a()),
        ),
        |_, args| {
            let value = &args[0];
            Ok(if is_zero(value) {
                Value::none()
            } else {
                Value::some(value.clone())
            })
        },
    )
}

fn none() -> FunctionDef {
    FunctionDef::new(NONE).overload(
        Overload::global("optional_none", Vec::new(), Type::optional(Type::Dyn)),
        |_, _| Ok(Value::none()),
    )
}

fn has_value() -> FunctionDef {
    FunctionDef::new(HAS_VALUE).overload(
        Overload::member(
            "optional_hasValue",
            vec![Type::optional(param_a())],
            Type::Bool,
        ),
        |_, args| Ok(Value::Bool(require_optional(HAS_VALUE, args, 0)?.is_some())),
    )
}

fn value() -> FunctionDef {
    FunctionDef::new(VALUE).overload(
        Overload::member("optional_value", vec![Type::optional(param_a())], param_a()),
        |_, args| {
            require_optional(VALUE, args, 0)?
                .cloned()
                .ok_or_else(|| invalid_argument("optional.none() dereference"))
        },
    )
}

fn or() -> FunctionDef {
    FunctionDef::new("or").overload(
        Overload::member(
            "optional_or_optional",
            vec![Type::optional(param_a()), Type::optional(param_a())],
            Type::optional(param_a()),
        ),
        |_, args| match require_optional("or", args, 0)? {
            Some(_) => Ok(args[0].clone()),
            None => {
                require_optional("or", args, 1)?;
                Ok(args[1].clone())
            }
        },
    )
}

fn or_value() -> FunctionDef {
    FunctionDef::new("orValue").overload(
        Overload::member(
            "optional_orValue_value",
            vec![Type::optional(param_a()), param_a()],
            param_a(),
        ),
        |_, args| Ok(require_optional("orValue", args, 0)?.unwrap_or(&args[1]).clone()),
    )
}

/// `m.?f`: the field when present, otherwise `optional.none()`.
fn select_field() -> FunctionDef {
    let string_map = || Type::map(Type::String, param_b());
    FunctionDef::new(OPT_SELECT)
        .overload(
            Overload::global(
                "select_optional_field",
                vec![string_map(), Type::String],
                Type::optional(param_b()),
            ),
            |_, args| {
                let map = require_map(OPT_SELECT, args, 0)?;
                Ok(optional_of(map.get(&args[1])))
            },
        )
        .overload(
            Overload::global(
                "select_optional_field_optional",
                vec![Type::optional(string_map()), Type::String],
                Type::optional(param_b()),
            ),
            |_, args| {
                let field = require_str(OPT_SELECT, args, 1)?;
                match require_optional(OPT_SELECT, args, 0)? {
                    Some(Value::Map(map)) => Ok(optional_of(map.get(&Value::from(field)))),
                    Some(other) => Err(invalid_argument(format!(
                        "cannot select `{field}` on {}",
                        other.type_name()
                    ))),
                    None => Ok(Value::none()),
                }
            },
        )
}

/// Element of `container` at `key`, as an optional.
fn optional_element(container: &Value, key: &Value) -> EvalResult {
    match container {
        Value::List(items) => {
            let Value::Int(i) = key else {
                return Err(invalid_argument(format!(
                    "list index must be int, got {}",
                    key.type_name()
                )));
            };
            Ok(optional_of(usize::try_from(*i).ok().and_then(|i| items.get(i))))
        }
        Value::Map(map) => Ok(optional_of(map.get(key))),
        other => Err(invalid_argument(format!(
            "cannot index {} with [?]",
            other.type_name()
        ))),
    }
}

/// `xs[?i]` and `m[?k]`, also through an optional container.
fn index() -> FunctionDef {
    let list = || Type::list(param_a());
    let map = || Type::map(param_a(), param_b());
    FunctionDef::new(OPT_INDEX)
        .overload(
            Overload::global(
                "list_optindex_optional_int",
                vec![list(), Type::Int],
                Type::optional(param_a()),
            ),
            |_, args| {
                require_list(OPT_INDEX, args, 0)?;
                require_int(OPT_INDEX, args, 1)?;
                optional_element(&args[0], &args[1])
            },
        )
        .overload(
            Overload::global(
                "map_optindex_optional_value",
                vec![map(), param_a()],
                Type::optional(param_b()),
            ),
            |_, args| {
                require_map(OPT_INDEX, args, 0)?;
                optional_element(&args[0], &args[1])
            },
        )
        .overload(
            Overload::global(
                "optional_list_optindex_optional_int",
                vec![Type::optional(list()), Type::Int],
                Type::optional(param_a()),
            ),
            |_, args| match require_optional(OPT_INDEX, args, 0)? {
                Some(container) => optional_element(container, &args[1]),
                None => Ok(Value::none()),
            },
        )
        .overload(
            Overload::global(
                "optional_map_optindex_optional_value",
                vec![Type::optional(map()), param_a()],
                Type::optional(param_b()),
            ),
            |_, args| match require_optional(OPT_INDEX, args, 0)? {
                Some(container) => optional_element(container, &args[1]),
                None => Ok(Value::none()),
            },
        )
}

/// `optional.unwrap(list)`: the values of the non-empty optionals.
fn unwrap() -> FunctionDef {
    FunctionDef::new("optional.unwrap").overload(
        Overload::global(
            "optional_unwrap_list",
            vec![Type::list(Type::optional(param_a()))],
            Type::list(param_a()),
        ),
        |_, args| {
            let mut values = Vec::new();
            for item in require_list("optional.unwrap", args, 0)? {
                match item {
                    Value::Optional(Some(inner)) => values.push(Value::clone(inner)),
                    Value::Optional(None) => {}
                    other => {
                        return Err(invalid_argument(format!(
                            "optional.unwrap() expected a list of optionals, found {}",
                            other.type_name()
                        )))
                    }
                }
            }
            Ok(Value::list(values))
        },
    )
}

// Macros

type OptExpander = fn(&mut ExprFactory<'_>, ExprId, ExprId, ExprId) -> Expansion;

/// A receiver macro together with every function its expansion calls, so
/// that enabling the macro alone still yields a checkable program.
fn macro_feature(name: &'static str, expand: OptExpander) -> Feature {
    Feature::new(name, 0)
        .function(has_value())
        .function(value())
        .function(of())
        .function(none())
        .with_macros([Macro::receiver(name, 2, move |f, target, args| {
            let target = target?;
            finish(expand(f, target, args[0], args[1]))
        })])
}

/// `target.hasValue() ? wrap(cel.bind(var, target.value(), body)) : optional.none()`.
fn guarded(
    f: &mut ExprFactory<'_>,
    target: ExprId,
    var: ExprId,
    body: ExprId,
    wrap: bool,
) -> Expansion {
    let name = simple_name(f, var)?;
    let test = f.new_member_call(HAS_VALUE, target, []);
    let copied = f.copy(target);
    let unwrapped = f.new_member_call(VALUE, copied, []);
    let mut then = bind(f, &name, unwrapped, body);
    if wrap {
        then = f.new_global_call(OF, [then]);
    }
    let otherwise = f.new_global_call(NONE, []);
    Ok(f.new_global_call(CONDITIONAL, [test, then, otherwise]))
}

/// `opt.optMap(x, t)`: `optional.of(t)` with `x` bound to the value.
fn expand_opt_map(f: &mut ExprFactory<'_>, target: ExprId, var: ExprId, body: ExprId) -> Expansion {
    guarded(f, target, var, body, true)
}

/// `opt.optFlatMap(x, t)`: like `optMap`, but `t` is itself an optional.
fn expand_opt_flat_map(
    f: &mut ExprFactory<'_>,
    target: ExprId,
    var: ExprId,
    body: ExprId,
) -> Expansion {
    guarded(f, target, var, body, false)
}
