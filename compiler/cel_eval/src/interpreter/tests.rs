use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use cel_macros::{standard_macros, MacroRegistry};
use cel_parse::parse;
use cel_types::{check, Declarations, FunctionDecl, Overload, Type};
use pretty_assertions::assert_eq;

use super::*;
use crate::errors::{division_by_zero, EvalErrorKind};
use crate::native::{NativeBinding, NativeTag};

fn decls() -> Declarations {
    let a = || Type::param("A");
    let b = || Type::param("B");
    let mut decls = Declarations::new();
    let functions = [
        FunctionDecl::new(
            "_&&_",
            vec![Overload::global("logical_and", vec![Type::Bool, Type::Bool], Type::Bool)],
        ),
        FunctionDecl::new(
            "_||_",
            vec![Overload::global("logical_or", vec![Type::Bool, Type::Bool], Type::Bool)],
        ),
        FunctionDecl::new(
            "!_",
            vec![Overload::global("logical_not", vec![Type::Bool], Type::Bool)],
        ),
        FunctionDecl::new(
            "@not_strictly_false",
            vec![Overload::global("not_strictly_false", vec![Type::Bool], Type::Bool)],
        ),
        FunctionDecl::new(
            "_?_:_",
            vec![Overload::global("conditional", vec![Type::Bool, a(), a()], a())],
        ),
        FunctionDecl::new(
            "_==_",
            vec![Overload::global("equals", vec![a(), b()], Type::Bool)],
        ),
        FunctionDecl::new(
            "_>_",
            vec![Overload::global("greater_int64", vec![Type::Int, Type::Int], Type::Bool)],
        ),
        FunctionDecl::new(
            "_/_",
            vec![Overload::global("divide_int64", vec![Type::Int, Type::Int], Type::Int)],
        ),
        FunctionDecl::new(
            "_-_",
            vec![Overload::global("subtract_int64", vec![Type::Int, Type::Int], Type::Int)],
        ),
        FunctionDecl::new(
            "_+_",
            vec![
                Overload::global("add_int64", vec![Type::Int, Type::Int], Type::Int),
                Overload::global(
                    "add_list",
                    vec![Type::list(a()), Type::list(a())],
                    Type::list(a()),
                ),
            ],
        ),
    ];
    for f in functions {
        decls.declare_function(f).unwrap();
    }
    decls.declare_variable("m", Type::map(Type::String, Type::Int)).unwrap();
    decls.declare_variable("xs", Type::list(Type::Int)).unwrap();
    decls.declare_variable("d", Type::Dyn).unwrap();
    decls
}

fn int_pair(args: &[Value]) -> (i64, i64) {
    match (&args[0], &args[1]) {
        (Value::Int(a), Value::Int(b)) => (*a, *b),
        _ => unreachable!(),
    }
}

/// Bindings for everything in [`decls`] except `_-_`.
fn dispatcher() -> Dispatcher {
    let mut d = Dispatcher::new();
    d.register(NativeBinding::new("logical_not", [NativeTag::Bool], |_, args| {
        Ok(Value::Bool(!matches!(args[0], Value::Bool(true))))
    }));
    d.register(NativeBinding::new(
        "equals",
        [NativeTag::Any, NativeTag::Any],
        |ctx, args| Ok(Value::Bool(ctx.comparator().equals(&args[0], &args[1]))),
    ));
    d.register(NativeBinding::new(
        "greater_int64",
        [NativeTag::Int, NativeTag::Int],
        |_, args| {
            let (a, b) = int_pair(args);
            Ok(Value::Bool(a > b))
        },
    ));
    d.register(NativeBinding::new(
        "divide_int64",
        [NativeTag::Int, NativeTag::Int],
        |_, args| {
            let (a, b) = int_pair(args);
            a.checked_div(b).map(Value::Int).ok_or_else(division_by_zero)
        },
    ));
    d.register(NativeBinding::new(
        "add_int64",
        [NativeTag::Int, NativeTag::Int],
        |_, args| {
            let (a, b) = int_pair(args);
            Ok(Value::Int(a + b))
        },
    ));
    d.register(NativeBinding::new(
        "add_list",
        [NativeTag::List, NativeTag::List],
        |_, args| {
            let mut items = args[0].as_list().unwrap_or_default().to_vec();
            items.extend_from_slice(args[1].as_list().unwrap_or_default());
            Ok(Value::list(items))
        },
    ));
    d
}

fn run_with(source: &str, activation: &Activation, repr: UintRepr) -> (EvalResult, EvalCounters) {
    run_on(source, activation, repr, &dispatcher())
}

fn run_on(
    source: &str,
    activation: &Activation,
    repr: UintRepr,
    dispatcher: &Dispatcher,
) -> (EvalResult, EvalCounters) {
    let mut macros = MacroRegistry::new();
    macros.register_all(standard_macros()).unwrap();
    let parsed = parse(source, &macros);
    assert!(!parsed.has_errors(), "{:?}", parsed.diagnostics);
    let root = parsed.root.unwrap();
    let checked = check(&parsed.arena, root, &decls());
    assert!(!checked.has_errors(), "{:?}", checked.diagnostics);
    let program = Program {
        arena: &parsed.arena,
        root,
        checked: &checked,
        dispatcher,
        repr,
    };
    evaluate(program, activation)
}

fn run(source: &str) -> EvalResult {
    run_with(source, &Activation::new(), UintRepr::Lossless).0
}

fn err_kind(source: &str) -> EvalErrorKind {
    run(source).unwrap_err().kind
}

#[test]
fn logical_operators_absorb_errors_from_either_side() {
    assert_eq!(run("1 / 0 > 0 || true").unwrap(), Value::Bool(true));
    assert_eq!(run("true || 1 / 0 > 0").unwrap(), Value::Bool(true));
    assert_eq!(run("1 / 0 > 0 && false").unwrap(), Value::Bool(false));
    assert_eq!(run("false && 1 / 0 > 0").unwrap(), Value::Bool(false));
    assert_eq!(err_kind("1 / 0 > 0 && true"), EvalErrorKind::DivisionByZero);
    assert_eq!(err_kind("false || 1 / 0 > 0"), EvalErrorKind::DivisionByZero);
}

#[test]
fn logical_operators_on_plain_booleans() {
    assert_eq!(run("true && true").unwrap(), Value::Bool(true));
    assert_eq!(run("true && false").unwrap(), Value::Bool(false));
    assert_eq!(run("false || false").unwrap(), Value::Bool(false));
    assert_eq!(run("!false").unwrap(), Value::Bool(true));
}

#[test]
fn conditional_evaluates_one_branch() {
    assert_eq!(run("true ? 1 : 1 / 0").unwrap(), Value::Int(1));
    assert_eq!(run("false ? 1 / 0 : 2").unwrap(), Value::Int(2));
    assert_eq!(err_kind("1 / 0 > 0 ? 1 : 2"), EvalErrorKind::DivisionByZero);
}

#[test]
fn quantifiers_over_an_empty_range() {
    assert_eq!(run("[].all(x, x > 0)").unwrap(), Value::Bool(true));
    assert_eq!(run("[].exists(x, x > 0)").unwrap(), Value::Bool(false));
    assert_eq!(run("[].exists_one(x, x > 0)").unwrap(), Value::Bool(false));
}

#[test]
fn exists_absorbs_an_error_when_another_element_matches() {
    assert_eq!(run("[0, 1].exists(x, 1 / x > 0)").unwrap(), Value::Bool(true));
    assert_eq!(run("[1, 0].exists(x, 1 / x > 0)").unwrap(), Value::Bool(true));
}

#[test]
fn all_reports_an_error_when_no_element_is_false() {
    assert_eq!(
        err_kind("[1, 0, 2].all(x, 10 / x > 0)"),
        EvalErrorKind::DivisionByZero
    );
    assert_eq!(
        run("[1, 0, -1].all(x, 10 / x > 0)").unwrap(),
        Value::Bool(false)
    );
}

#[test]
fn exists_one_counts_matches() {
    assert_eq!(run("[1, 2, 3].exists_one(x, x > 2)").unwrap(), Value::Bool(true));
    assert_eq!(run("[1, 2, 3].exists_one(x, x > 1)").unwrap(), Value::Bool(false));
}

#[test]
fn short_circuit_stops_iteration() {
    let (result, counters) = run_with(
        "[1, 2, 3, 4].exists(x, x > 1)",
        &Activation::new(),
        UintRepr::Lossless,
    );
    assert_eq!(result.unwrap(), Value::Bool(true));
    assert_eq!(counters.loop_steps, 2);
}

#[test]
fn map_and_filter_step_once_per_element() {
    let (result, counters) = run_with("[1, 2, 3].map(x, x + 1)", &Activation::new(), UintRepr::Lossless);
    assert_eq!(
        result.unwrap(),
        Value::list(vec![Value::Int(2), Value::Int(3), Value::Int(4)])
    );
    assert_eq!(
        counters,
        EvalCounters {
            comprehensions: 1,
            loop_steps: 3,
            result_evals: 1,
        }
    );

    assert_eq!(
        run("[1, 2, 3, 4].filter(x, x > 2)").unwrap(),
        Value::list(vec![Value::Int(3), Value::Int(4)])
    );
    assert_eq!(
        run("[1, 2, 3].map(x, x > 1, x + 10)").unwrap(),
        Value::list(vec![Value::Int(12), Value::Int(13)])
    );
}

#[test]
fn nested_comprehensions_shadow_the_accumulator() {
    assert_eq!(
        run("[1, 2].all(x, [3, 4].exists(y, y > x))").unwrap(),
        Value::Bool(true)
    );
    let (_, counters) = run_with(
        "[1, 2].map(x, [x].map(y, y + 1))",
        &Activation::new(),
        UintRepr::Lossless,
    );
    assert_eq!(counters.comprehensions, 3);
    assert_eq!(counters.result_evals, 3);
}

#[test]
fn iterating_a_map_binds_keys() {
    let m = ValueMap::try_from(vec![
        (Value::from("a"), Value::Int(1)),
        (Value::from("b"), Value::Int(2)),
    ])
    .unwrap();
    let activation = Activation::new().with("m", Value::map(m));
    let (result, _) = run_with("m.exists(k, k == 'b')", &activation, UintRepr::Lossless);
    assert_eq!(result.unwrap(), Value::Bool(true));
}

#[test]
fn iterating_a_scalar_is_an_error() {
    let activation = Activation::new().with("d", 3_i64);
    let (result, _) = run_with("d.all(x, x)", &activation, UintRepr::Lossless);
    assert_eq!(
        result.unwrap_err().kind,
        EvalErrorKind::UnsupportedRange {
            type_name: "int".into()
        }
    );
}

#[test]
fn field_selection_and_presence() {
    let m = ValueMap::try_from(vec![(Value::from("a"), Value::Int(1))]).unwrap();
    let activation = Activation::new().with("m", Value::map(m));
    let eval = |src: &str| run_with(src, &activation, UintRepr::Lossless).0;
    assert_eq!(eval("m.a").unwrap(), Value::Int(1));
    assert_eq!(eval("has(m.a)").unwrap(), Value::Bool(true));
    assert_eq!(eval("has(m.z)").unwrap(), Value::Bool(false));
    assert!(matches!(
        eval("m.z").unwrap_err().kind,
        EvalErrorKind::NoSuchKey { .. }
    ));
}

#[test]
fn unbound_variable() {
    let (result, _) = run_with("xs", &Activation::new(), UintRepr::Lossless);
    assert_eq!(result.unwrap_err().message, "no such attribute: xs");
}

#[test]
fn map_literal_keys_share_one_numeric_space() {
    assert_eq!(
        err_kind("{1: 'a', 1u: 'b'}"),
        EvalErrorKind::DuplicateMapKey { key: "1u".into() }
    );
    assert!(run("{1: 'a', 2u: 'b'}").is_ok());
}

#[test]
fn uint_literals_follow_the_repr() {
    let eval = |src: &str| run_with(src, &Activation::new(), UintRepr::Signed).0;
    assert_eq!(eval("5u").unwrap(), Value::Int(5));
    assert!(matches!(
        eval("18446744073709551615u").unwrap_err().kind,
        EvalErrorKind::IntegerOverflow { .. }
    ));
    assert_eq!(run("18446744073709551615u").unwrap(), Value::Uint(u64::MAX));
}

#[test]
fn equality_is_heterogeneous() {
    assert_eq!(run("1 == 1u").unwrap(), Value::Bool(true));
    assert_eq!(run("1 == 1.0").unwrap(), Value::Bool(true));
    assert_eq!(run("1 == 'a'").unwrap(), Value::Bool(false));
}

#[test]
fn missing_binding_is_fatal_and_not_absorbed() {
    let err = run("3 - 1 > 0 || true").unwrap_err();
    assert!(err.is_fatal());
    assert_eq!(
        err.kind,
        EvalErrorKind::MissingBinding {
            overload_id: "subtract_int64".into(),
            tags: "i64, i64".into(),
        }
    );

    let err = run("[1].exists(x, x - 1 > 0)").unwrap_err();
    assert!(err.is_fatal());
}

#[test]
fn fold_step_receives_the_accumulator_by_value() {
    let shared = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&shared);
    let mut d = Dispatcher::new();
    d.register(NativeBinding::consuming(
        "add_list",
        [NativeTag::List, NativeTag::List],
        move |_, args| {
            let mut args = args.into_iter();
            let (Some(Value::List(mut items)), Some(Value::List(tail))) = (args.next(), args.next())
            else {
                unreachable!()
            };
            if Arc::get_mut(&mut items).is_none() {
                seen.fetch_add(1, Ordering::Relaxed);
            }
            let mut out = items.to_vec();
            out.extend_from_slice(&tail);
            Ok(Value::list(out))
        },
    ));
    d.register(NativeBinding::new(
        "greater_int64",
        [NativeTag::Int, NativeTag::Int],
        |_, args| {
            let (a, b) = int_pair(args);
            Ok(Value::Bool(a > b))
        },
    ));

    let run = |source: &str| run_on(source, &Activation::new(), UintRepr::Lossless, &d).0;
    assert_eq!(
        run("[1, 2, 3].map(x, x)").unwrap(),
        Value::list(vec![Value::Int(1), Value::Int(2), Value::Int(3)])
    );
    assert_eq!(
        run("[1, 2, 3].filter(x, x > 1)").unwrap(),
        Value::list(vec![Value::Int(2), Value::Int(3)])
    );
    assert_eq!(
        run("[[1], [2]].map(x, [1, 2].map(y, y) + x)").unwrap(),
        Value::list(vec![
            Value::list(vec![Value::Int(1), Value::Int(2), Value::Int(1)]),
            Value::list(vec![Value::Int(1), Value::Int(2), Value::Int(2)]),
        ])
    );
    assert_eq!(shared.load(Ordering::Relaxed), 0);
}
