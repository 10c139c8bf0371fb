use cel_diagnostic::ErrorCode;
use cel_ir::printer::print_expr;
use cel_ir::{ExprKind, Span};
use cel_macros::{standard_macros, Macro, MacroRegistry};
use pretty_assertions::assert_eq;

use super::*;

fn std_registry() -> MacroRegistry {
    let mut registry = MacroRegistry::new();
    registry.register_all(standard_macros()).unwrap();
    registry
}

fn printed(source: &str) -> String {
    let out = parse(source, &std_registry());
    assert!(!out.has_errors(), "unexpected errors: {:?}", out.diagnostics);
    print_expr(&out.arena, out.root.unwrap())
}

#[test]
fn operator_precedence() {
    assert_eq!(
        printed("a || b && c == 1 + 2 * 3"),
        "_||_(a, _&&_(b, _==_(c, _+_(1, _*_(2, 3)))))"
    );
    assert_eq!(printed("a ? b : c ? d : e"), "_?_:_(a, b, _?_:_(c, d, e))");
    assert_eq!(printed("x in [1, 2,]"), "@in(x, [1, 2])");
}

#[test]
fn unary_operators() {
    assert_eq!(printed("!!a"), "!_(!_(a))");
    assert_eq!(printed("-x"), "-_(x)");
    assert_eq!(printed("-1"), "-1");
    assert_eq!(printed("--1"), "-_(-1)");
    assert_eq!(printed("-9223372036854775808"), "-9223372036854775808");
}

#[test]
fn member_chains() {
    assert_eq!(printed("a.b.c"), "a.b.c");
    assert_eq!(printed("a.f(1)[0]"), "_[_](a.f(1), 0)");
    assert_eq!(printed("m.?k"), r#"_?._(m, "k")"#);
    assert_eq!(printed("l[?0]"), "_[?_](l, 0)");
    assert_eq!(printed("math.ceil(1.5)"), "math.ceil(1.5)");
}

#[test]
fn literals() {
    assert_eq!(
        printed(r#"{"a": 1u, 2: null}"#),
        r#"{"a": 1u, 2: null}"#
    );
    assert_eq!(printed("pkg.Msg{f: 1}"), "pkg.Msg{f: 1}");
}

#[test]
fn macros_expand_during_parse() {
    assert_eq!(
        printed("[1, 2].exists(x, x > 1)"),
        "__comprehension__(x, [1, 2], __result__, false, \
         @not_strictly_false(!_(__result__)), _||_(__result__, _>_(x, 1)), __result__)"
    );
    assert_eq!(printed("has(a.b)"), "has(a.b)");
}

#[test]
fn non_matching_arity_is_an_ordinary_call() {
    assert_eq!(printed("xs.all(x)"), "xs.all(x)");
    assert_eq!(printed("all(x, y)"), "all(x, y)");
}

#[test]
fn nested_macros_expand_inside_out() {
    let out = printed("[[1]].all(l, l.exists(x, x == 1))");
    assert!(out.starts_with("__comprehension__(l, [[1]]"));
    assert!(out.contains("__comprehension__(x, l, __result__, false"));
}

#[test]
fn accumulator_name_collision_is_an_expansion_error() {
    let out = parse("[1, 2].all(__result__, __result__ > 0)", &std_registry());
    assert_eq!(out.diagnostics.len(), 1);
    assert_eq!(out.diagnostics[0].code, ErrorCode::E1100);
    assert_eq!(
        out.diagnostics[0].message,
        "iteration variable overwrites accumulator variable"
    );
    assert_eq!(out.diagnostics[0].primary_span(), Some(Span::new(11, 21)));
}

#[test]
fn all_macro_errors_are_collected() {
    let out = parse(
        "[1].all(1, true) && [2].map(y.z, y) && has(x)",
        &std_registry(),
    );
    let messages: Vec<&str> = out.diagnostics.iter().map(|d| d.message.as_str()).collect();
    assert_eq!(
        messages,
        vec![
            "argument must be a simple name",
            "argument must be a simple name",
            "invalid argument to has() macro",
        ]
    );
    assert!(out.root.is_some());
}

#[test]
fn custom_macro_can_decline() {
    let mut registry = std_registry();
    registry
        .register(Macro::receiver("twice", 0, |f, target, _| {
            let target = target?;
            if f.ident_name(target) != Some("ns") {
                return None;
            }
            Some(f.new_int(2))
        }))
        .unwrap();
    let out = parse("ns.twice() + other.twice()", &registry);
    assert_eq!(
        print_expr(&out.arena, out.root.unwrap()),
        "_+_(2, other.twice())"
    );
}

#[test]
fn syntax_errors_abort_with_one_diagnostic() {
    let out = parse("1 +", &std_registry());
    assert!(out.root.is_none());
    assert_eq!(out.diagnostics.len(), 1);
    assert_eq!(out.diagnostics[0].code, ErrorCode::E1002);

    let out = parse("(1", &std_registry());
    assert_eq!(out.diagnostics[0].code, ErrorCode::E1001);

    let out = parse("1 2", &std_registry());
    assert_eq!(out.diagnostics[0].code, ErrorCode::E1001);
}

#[test]
fn nesting_limit() {
    let deep = format!("{}1{}", "(".repeat(300), ")".repeat(300));
    let out = parse(&deep, &std_registry());
    assert_eq!(out.diagnostics[0].code, ErrorCode::E1003);

    let ok = format!("{}1{}", "[".repeat(100), "]".repeat(100));
    assert!(!parse(&ok, &std_registry()).has_errors());
}

#[test]
fn spans_cover_calls() {
    let out = parse("size(xs)", &std_registry());
    let root = out.root.unwrap();
    assert!(matches!(out.arena.kind(root), ExprKind::Call { .. }));
    assert_eq!(out.arena.span(root), Span::new(0, 8));
}
