//! The `comprehensions` library: two-variable quantifiers and the
//! `transformList`, `transformMap` and `transformMapEntry` macros.
//!
//! Over a list the two variables are the index and the element; over a map
//! they are the key and the value.

use std::sync::Arc;

use cel_eval::errors::invalid_argument;
use cel_eval::{EvalError, NativeBinding, NativeTag, Value, ValueMap};
use cel_ir::operators::MAP_INSERT;
use cel_ir::{ExprFactory, ExprId};
use cel_macros::lowering::{self, finish, iter_var, iter_var_pair, IterVars};
use cel_macros::Macro;
use cel_types::{Overload, Type};

use crate::params::{param_a, param_b};
use crate::{Feature, FunctionDef, Library};

/// `comprehensions`, version 0.
#[derive(Copy, Clone, Debug, Default)]
pub struct ComprehensionsLib;

impl Library for ComprehensionsLib {
    fn name(&self) -> &str {
        "comprehensions"
    }

    fn features(&self) -> Vec<Feature> {
        vec![
            Feature::new("all", 0).with_macros([two_var("all", lowering::all)]),
            Feature::new("exists", 0).with_macros([two_var("exists", lowering::exists)]),
            Feature::new("existsOne", 0).with_macros([
                two_var("existsOne", lowering::exists_one),
                two_var("exists_one", lowering::exists_one),
            ]),
            Feature::new("transformList", 0).with_macros([
                Macro::receiver("transformList", 2, |f, target, args| {
                    let range = target?;
                    finish(iter_var(f, args[0]).map(|vars| {
                        lowering::transform_list(f, range, vars, None, args[1])
                    }))
                }),
                Macro::receiver("transformList", 3, |f, target, args| {
                    let range = target?;
                    finish(iter_var(f, args[0]).map(|vars| {
                        lowering::transform_list(f, range, vars, Some(args[1]), args[2])
                    }))
                }),
            ]),
            Feature::new("transformMap", 0)
                .function(map_insert())
                .with_macros(map_builders("transformMap", lowering::transform_map)),
            Feature::new("transformMapEntry", 0)
                .function(map_insert())
                .with_macros(map_builders(
                    "transformMapEntry",
                    lowering::transform_map_entry,
                )),
        ]
    }
}

type Quantifier = fn(&mut ExprFactory<'_>, ExprId, IterVars, ExprId) -> ExprId;
type MapBuilder = fn(&mut ExprFactory<'_>, ExprId, IterVars, Option<ExprId>, ExprId) -> ExprId;

/// `range.name(a, b, pred)`.
fn two_var(name: &str, lower: Quantifier) -> Macro {
    Macro::receiver(name, 3, move |f, target, args| {
        let range = target?;
        finish(iter_var_pair(f, args[0], args[1]).map(|vars| lower(f, range, vars, args[2])))
    })
}

/// `range.name(k, v, t)` and `range.name(k, v, filter, t)`.
fn map_builders(name: &str, lower: MapBuilder) -> [Macro; 2] {
    [
        Macro::receiver(name, 3, move |f, target, args| {
            let range = target?;
            finish(
                iter_var_pair(f, args[0], args[1])
                    .map(|vars| lower(f, range, vars, None, args[2])),
            )
        }),
        Macro::receiver(name, 4, move |f, target, args| {
            let range = target?;
            finish(
                iter_var_pair(f, args[0], args[1])
                    .map(|vars| lower(f, range, vars, Some(args[2]), args[3])),
            )
        }),
    ]
}

/// Take the accumulator map out of an owned argument.
fn owned_map(value: Value) -> Result<Arc<ValueMap>, EvalError> {
    match value {
        Value::Map(map) => Ok(map),
        other => Err(invalid_argument(format!(
            "{MAP_INSERT}() expected map, got {}",
            other.type_name()
        ))),
    }
}

fn arity_error(expected: usize) -> EvalError {
    invalid_argument(format!("{MAP_INSERT}() expects {expected} arguments"))
}

/// The accumulator step of map-producing folds.
///
/// The fold hands over its accumulator, so the map is extended in place
/// unless another value still shares it. An existing key is an error.
fn map_insert() -> FunctionDef {
    let map_type = || Type::map(param_a(), param_b());
    let entry = NativeBinding::consuming(
        "cel_@mapInsert_map_key_value",
        [NativeTag::Map, NativeTag::Any, NativeTag::Any],
        |_, args| {
            let mut args = args.into_iter();
            let (Some(accu), Some(key), Some(value)) = (args.next(), args.next(), args.next())
            else {
                return Err(arity_error(3));
            };
            let mut map = owned_map(accu)?;
            Arc::make_mut(&mut map).insert(key, value)?;
            Ok(Value::Map(map))
        },
    );
    let merge = NativeBinding::consuming(
        "cel_@mapInsert_map_map",
        [NativeTag::Map, NativeTag::Map],
        |_, args| {
            let mut args = args.into_iter();
            let (Some(accu), Some(entries)) = (args.next(), args.next()) else {
                return Err(arity_error(2));
            };
            let mut map = owned_map(accu)?;
            let entries = owned_map(entries)?;
            let target = Arc::make_mut(&mut map);
            for (key, value) in entries.iter() {
                target.insert(key.clone(), value.clone())?;
            }
            Ok(Value::Map(map))
        },
    );
    FunctionDef::new(MAP_INSERT)
        .overload_with(
            Overload::global(
                "cel_@mapInsert_map_key_value",
                vec![map_type(), param_a(), param_b()],
                map_type(),
            ),
            [entry],
        )
        .overload_with(
            Overload::global(
                "cel_@mapInsert_map_map",
                vec![map_type(), map_type()],
                map_type(),
            ),
            [merge],
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::TestEnv;
    use cel_eval::EvalErrorKind;
    use pretty_assertions::assert_eq;

    fn env() -> TestEnv {
        TestEnv::with(&ComprehensionsLib)
    }

    fn eval(source: &str) -> Value {
        env().eval(source).unwrap()
    }

    fn map(entries: Vec<(Value, Value)>) -> Value {
        Value::map(ValueMap::try_from(entries).unwrap())
    }

    #[test]
    fn two_variable_quantifiers() {
        assert_eq!(eval("{'a': 1, 'b': 2}.all(k, v, v > 0)"), Value::Bool(true));
        assert_eq!(eval("[10, 20].exists(i, v, i == 1 && v == 20)"), Value::Bool(true));
        assert_eq!(eval("[10, 20].all(i, v, v > i * 25)"), Value::Bool(false));
        assert_eq!(eval("{'a': 1, 'b': 1}.existsOne(k, v, v == 1)"), Value::Bool(false));
        assert_eq!(eval("{'a': 1, 'b': 2}.exists_one(k, v, v == 1)"), Value::Bool(true));
    }

    #[test]
    fn single_variable_macros_still_apply() {
        assert_eq!(eval("[1, 2].all(x, x > 0)"), Value::Bool(true));
    }

    #[test]
    fn transform_list() {
        assert_eq!(
            eval("[1, 2, 3].transformList(x, x * 2)"),
            Value::list(vec![Value::Int(2), Value::Int(4), Value::Int(6)])
        );
        assert_eq!(
            eval("[1, 2, 3].transformList(x, x > 1, x)"),
            Value::list(vec![Value::Int(2), Value::Int(3)])
        );
    }

    #[test]
    fn transform_map() {
        assert_eq!(
            eval("{'a': 1, 'b': 2}.transformMap(k, v, v * 10)"),
            map(vec![("a".into(), Value::Int(10)), ("b".into(), Value::Int(20))])
        );
        assert_eq!(
            eval("[5, 6].transformMap(i, v, v + i)"),
            map(vec![(Value::Int(0), Value::Int(5)), (Value::Int(1), Value::Int(7))])
        );
        assert_eq!(
            eval("{'a': 1, 'b': 2}.transformMap(k, v, v > 1, k + k)"),
            map(vec![("b".into(), "bb".into())])
        );
    }

    #[test]
    fn transform_map_entry() {
        assert_eq!(
            eval("{'a': 'x', 'b': 'y'}.transformMapEntry(k, v, {v: k})"),
            map(vec![("x".into(), "a".into()), ("y".into(), "b".into())])
        );
        assert_eq!(
            eval("{'a': 'x', 'b': 'y'}.transformMapEntry(k, v, k == 'a', {v: k})"),
            map(vec![("x".into(), "a".into())])
        );
        let err = env()
            .eval("{'a': 'x', 'b': 'x'}.transformMapEntry(k, v, {v: k})")
            .unwrap_err();
        assert_eq!(
            err.kind,
            EvalErrorKind::DuplicateMapKey {
                key: "\"x\"".into()
            }
        );
    }

    #[test]
    fn transform_map_over_a_long_range() {
        let items = (0..2000).map(|i| i.to_string()).collect::<Vec<_>>().join(", ");
        let env = env();
        let built = env
            .eval(&format!("[{items}].transformMap(i, v, v * 2)"))
            .unwrap();
        let Value::Map(built) = built else {
            panic!("expected a map, got {built:?}");
        };
        assert_eq!(built.len(), 2000);
        assert_eq!(built.get(&Value::Int(1999)), Some(&Value::Int(3998)));

        let evens = env
            .eval(&format!("[{items}].transformMap(i, v, v % 2 == 0, v)"))
            .unwrap();
        assert_eq!(evens.as_map().map(ValueMap::len), Some(1000));
    }

    #[test]
    fn variable_validation() {
        let env = env();
        assert_eq!(
            env.parse_errors("[1].all(x, x, true)"),
            ["duplicate variable name"]
        );
        assert_eq!(
            env.parse_errors("[1].exists(__result__, v, true)"),
            ["iteration variable overwrites accumulator variable"]
        );
        assert_eq!(
            env.parse_errors("{}.transformMap(k, 1, k)"),
            ["argument must be a simple name"]
        );
    }

    #[test]
    fn map_insert_is_shared_between_features() {
        let enabled = ["transformMap".to_owned(), "transformMapEntry".to_owned()]
            .into_iter()
            .collect();
        let set = crate::feature_set(&ComprehensionsLib, None, Some(&enabled)).unwrap();
        assert_eq!(set.functions.len(), 1);
        assert_eq!(set.macros.len(), 4);
    }
}
