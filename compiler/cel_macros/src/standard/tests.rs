use cel_ir::printer::print_expr;
use cel_ir::{ExprArena, Span};
use pretty_assertions::assert_eq;

use super::*;
use crate::{MacroRegistry, MacroStyle};

fn registry() -> MacroRegistry {
    let mut registry = MacroRegistry::new();
    registry.register_all(standard_macros()).unwrap();
    registry
}

#[test]
fn standard_set_registers_cleanly() {
    let registry = registry();
    assert_eq!(registry.len(), 7);
    assert!(registry.lookup("map", MacroStyle::Receiver, 2).is_some());
    assert!(registry.lookup("map", MacroStyle::Receiver, 3).is_some());
    assert!(registry.lookup("map", MacroStyle::Receiver, 4).is_none());
    assert!(registry.lookup("has", MacroStyle::Global, 1).is_some());
}

#[test]
fn has_rewrites_select_to_presence_test() {
    let registry = registry();
    let mut arena = ExprArena::new();
    let mut f = ExprFactory::new(&mut arena, Span::DUMMY);
    let a = f.new_ident("a");
    let sel = f.new_select(a, "b");
    let has = registry.lookup("has", MacroStyle::Global, 1).unwrap();
    let out = has.expand(&mut f, None, &[sel]).unwrap();
    assert_eq!(print_expr(&arena, out), "has(a.b)");
}

#[test]
fn has_rejects_non_select() {
    let registry = registry();
    let mut arena = ExprArena::new();
    let mut f = ExprFactory::new(&mut arena, Span::DUMMY);
    let a = f.new_ident("a");
    let has = registry.lookup("has", MacroStyle::Global, 1).unwrap();
    let out = has.expand(&mut f, None, &[a]).unwrap();
    assert_eq!(
        print_expr(&arena, out),
        "<error: invalid argument to has() macro>"
    );
}

#[test]
fn all_with_accumulator_name_is_an_error() {
    let registry = registry();
    let mut arena = ExprArena::new();
    let mut f = ExprFactory::new(&mut arena, Span::DUMMY);
    let range = f.new_ident("xs");
    let var = f.new_accu_ident();
    let pred = f.new_bool(true);
    let all = registry.lookup("all", MacroStyle::Receiver, 2).unwrap();
    let out = all.expand(&mut f, Some(range), &[var, pred]).unwrap();
    assert_eq!(
        print_expr(&arena, out),
        "<error: iteration variable overwrites accumulator variable>"
    );
}

#[test]
fn map_with_filter() {
    let registry = registry();
    let mut arena = ExprArena::new();
    let mut f = ExprFactory::new(&mut arena, Span::DUMMY);
    let range = f.new_ident("xs");
    let var = f.new_ident("x");
    let cond = f.new_ident("c");
    let t = f.new_ident("t");
    let map = registry.lookup("map", MacroStyle::Receiver, 3).unwrap();
    let out = map.expand(&mut f, Some(range), &[var, cond, t]).unwrap();
    assert_eq!(
        print_expr(&arena, out),
        "__comprehension__(x, xs, __result__, [], true, \
         _?_:_(c, _+_(__result__, [t]), __result__), __result__)"
    );
}
