use cel_ir::printer::print_expr;
use cel_ir::{ExprArena, ExprKind, Span};
use pretty_assertions::assert_eq;

use super::*;

fn lowered(build: impl FnOnce(&mut ExprFactory<'_>) -> ExprId) -> String {
    let mut arena = ExprArena::new();
    let root = build(&mut ExprFactory::new(&mut arena, Span::new(0, 10)));
    print_expr(&arena, root)
}

#[test]
fn all_shape() {
    let out = lowered(|f| {
        let range = f.new_ident("xs");
        let x = f.new_ident("x");
        let pred = f.new_global_call("p", [x]);
        all(f, range, IterVars::one("x".into()), pred)
    });
    assert_eq!(
        out,
        "__comprehension__(x, xs, __result__, true, @not_strictly_false(__result__), \
         _&&_(__result__, p(x)), __result__)"
    );
}

#[test]
fn exists_shape() {
    let out = lowered(|f| {
        let range = f.new_ident("xs");
        let pred = f.new_ident("p");
        exists(f, range, IterVars::one("x".into()), pred)
    });
    assert_eq!(
        out,
        "__comprehension__(x, xs, __result__, false, @not_strictly_false(!_(__result__)), \
         _||_(__result__, p), __result__)"
    );
}

#[test]
fn exists_one_shape() {
    let out = lowered(|f| {
        let range = f.new_ident("xs");
        let pred = f.new_ident("p");
        exists_one(f, range, IterVars::one("x".into()), pred)
    });
    assert_eq!(
        out,
        "__comprehension__(x, xs, __result__, 0, true, \
         _?_:_(p, _+_(__result__, 1), __result__), _==_(__result__, 1))"
    );
}

#[test]
fn transform_list_with_and_without_filter() {
    let plain = lowered(|f| {
        let range = f.new_ident("xs");
        let t = f.new_ident("t");
        transform_list(f, range, IterVars::one("x".into()), None, t)
    });
    assert_eq!(
        plain,
        "__comprehension__(x, xs, __result__, [], true, _+_(__result__, [t]), __result__)"
    );

    let filtered = lowered(|f| {
        let range = f.new_ident("xs");
        let cond = f.new_ident("c");
        let t = f.new_ident("t");
        transform_list(f, range, IterVars::one("x".into()), Some(cond), t)
    });
    assert_eq!(
        filtered,
        "__comprehension__(x, xs, __result__, [], true, \
         _?_:_(c, _+_(__result__, [t]), __result__), __result__)"
    );
}

#[test]
fn filter_appends_the_element() {
    let out = lowered(|f| {
        let range = f.new_ident("xs");
        let pred = f.new_ident("p");
        filter(f, range, IterVars::one("x".into()), pred)
    });
    assert_eq!(
        out,
        "__comprehension__(x, xs, __result__, [], true, \
         _?_:_(p, _+_(__result__, [x]), __result__), __result__)"
    );
}

#[test]
fn transform_map_binds_two_variables() {
    let out = lowered(|f| {
        let range = f.new_ident("m");
        let t = f.new_ident("t");
        transform_map(f, range, IterVars::two("k".into(), "v".into()), None, t)
    });
    assert_eq!(
        out,
        "__comprehension__(k, v, m, __result__, {}, true, \
         cel.@mapInsert(__result__, k, t), __result__)"
    );
}

#[test]
fn bind_uses_name_as_accumulator() {
    let out = lowered(|f| {
        let init = f.new_int(3);
        let result = f.new_ident("y");
        bind(f, "y", init, result)
    });
    assert_eq!(out, "__comprehension__(#unused, [], y, 3, false, y, y)");
}

#[test]
fn iteration_variable_must_be_simple_name() {
    let mut arena = ExprArena::new();
    let mut f = ExprFactory::new(&mut arena, Span::DUMMY);
    let one = f.new_int(1);
    let err = iter_var(&mut f, one).unwrap_err();
    assert_eq!(
        arena.kind(err),
        &ExprKind::Error("argument must be a simple name".into())
    );
}

#[test]
fn accumulator_collision_is_rejected() {
    let mut arena = ExprArena::new();
    let mut f = ExprFactory::new(&mut arena, Span::DUMMY);
    let accu = f.new_accu_ident();
    let err = iter_var(&mut f, accu).unwrap_err();
    assert_eq!(
        arena.kind(err),
        &ExprKind::Error("iteration variable overwrites accumulator variable".into())
    );
}

#[test]
fn duplicate_pair_is_rejected() {
    let mut arena = ExprArena::new();
    let mut f = ExprFactory::new(&mut arena, Span::DUMMY);
    let a = f.new_ident("k");
    let b = f.new_ident("k");
    let err = iter_var_pair(&mut f, a, b).unwrap_err();
    assert_eq!(arena.kind(err), &ExprKind::Error("duplicate variable name".into()));
}

#[test]
fn namespace_check() {
    let mut arena = ExprArena::new();
    let mut f = ExprFactory::new(&mut arena, Span::DUMMY);
    let math = f.new_ident("math");
    let other = f.new_ident("m");
    assert!(in_namespace(&f, Some(math), "math"));
    assert!(!in_namespace(&f, Some(other), "math"));
    assert!(!in_namespace(&f, None, "math"));
}
