use cel_eval::{EvalErrorKind, UintRepr, Value};
use cel_types::Type;
use pretty_assertions::assert_eq;

use super::MathLib;
use crate::test_helpers::TestEnv;

fn env() -> TestEnv {
    TestEnv::with(&MathLib)
}

#[test]
fn greatest_and_least_over_any_arity() {
    let env = env();
    assert_eq!(env.eval("math.greatest(3)").unwrap(), Value::Int(3));
    assert_eq!(env.eval("math.greatest(1, 5)").unwrap(), Value::Int(5));
    assert_eq!(env.eval("math.least(4, 2, 9, 3)").unwrap(), Value::Int(2));
    assert_eq!(env.eval("math.greatest([1, 7, 3])").unwrap(), Value::Int(7));
    assert_eq!(env.eval("math.least(1.5, 0.25)").unwrap(), Value::Double(0.25));
}

#[test]
fn mixed_numeric_arguments_keep_their_representation() {
    let env = env();
    assert_eq!(env.eval("math.greatest(1, 2u)").unwrap(), Value::Uint(2));
    assert_eq!(env.eval("math.greatest(1, 2u, 1.5)").unwrap(), Value::Uint(2));
    assert_eq!(env.eval("math.least(-1, 2u, 1.5)").unwrap(), Value::Int(-1));
    assert_eq!(env.type_of("math.greatest(1, 2u)"), Type::Dyn);
    assert_eq!(env.type_of("math.greatest(1, 2)"), Type::Int);
}

#[test]
fn greatest_is_exact_beyond_double_precision() {
    assert_eq!(
        env().eval("math.greatest(9007199254740993, 9007199254740992.0)").unwrap(),
        Value::Int(9_007_199_254_740_993)
    );
}

#[test]
fn macro_argument_validation() {
    let env = env();
    assert_eq!(
        env.parse_errors("math.greatest()"),
        ["math.greatest() requires at least one argument"]
    );
    assert_eq!(
        env.parse_errors("math.least([])"),
        ["math.least() requires at least one argument"]
    );
    assert_eq!(
        env.parse_errors("math.greatest('a')"),
        ["math.greatest() invalid single argument value"]
    );
    assert_eq!(
        env.parse_errors("math.greatest({1: 2})"),
        ["math.greatest() invalid single argument value"]
    );
    assert_eq!(
        env.parse_errors("math.greatest(1, 'a')"),
        ["math.greatest() invalid argument value"]
    );
    assert_eq!(
        env.parse_errors("math.least([1, true])"),
        ["math.least() invalid argument value"]
    );
    assert_eq!(
        env.parse_errors("math.least(1, [2])"),
        ["math.least() invalid argument value"]
    );
}

#[test]
fn non_namespace_receivers_are_ordinary_calls() {
    let env = env().var("m", Type::Dyn);
    let errors = env.check_errors("m.greatest(1)");
    assert_eq!(errors.len(), 1);
    assert!(errors[0].starts_with("undeclared reference to `greatest`"), "{errors:?}");
}

#[test]
fn list_arguments_are_checked_at_runtime() {
    let env = env().var("xs", Type::list(Type::Dyn));
    let activation = cel_eval::Activation::new().with("xs", Value::list(vec![Value::from("a")]));
    let err = env.eval_with("math.greatest(xs)", &activation).unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::InvalidArgument { .. }));
    let activation = cel_eval::Activation::new().with("xs", Value::list(vec![]));
    assert!(env.eval_with("math.greatest(xs)", &activation).is_err());
}

#[test]
fn nan_wins() {
    let result = env().eval("math.greatest(1.0, double('NaN'), 2.0)").unwrap();
    assert!(matches!(result, Value::Double(d) if d.is_nan()));
}

#[test]
fn rounding_and_classification() {
    let env = env();
    assert_eq!(env.eval("math.ceil(1.2)").unwrap(), Value::Double(2.0));
    assert_eq!(env.eval("math.floor(-1.2)").unwrap(), Value::Double(-2.0));
    assert_eq!(env.eval("math.round(2.5)").unwrap(), Value::Double(3.0));
    assert_eq!(env.eval("math.round(-2.5)").unwrap(), Value::Double(-3.0));
    assert_eq!(env.eval("math.trunc(-1.7)").unwrap(), Value::Double(-1.0));
    assert_eq!(env.eval("math.isNaN(double('NaN'))").unwrap(), Value::Bool(true));
    assert_eq!(env.eval("math.isInf(1.0 / 0.0)").unwrap(), Value::Bool(true));
    assert_eq!(env.eval("math.isFinite(1.0)").unwrap(), Value::Bool(true));
}

#[test]
fn abs_and_sign() {
    let env = env();
    assert_eq!(env.eval("math.abs(-5)").unwrap(), Value::Int(5));
    assert_eq!(env.eval("math.abs(-2.5)").unwrap(), Value::Double(2.5));
    assert_eq!(env.eval("math.abs(3u)").unwrap(), Value::Uint(3));
    assert!(matches!(
        env.eval("math.abs(-9223372036854775808)").unwrap_err().kind,
        EvalErrorKind::IntegerOverflow { .. }
    ));
    assert_eq!(env.eval("math.sign(-7)").unwrap(), Value::Int(-1));
    assert_eq!(env.eval("math.sign(0u)").unwrap(), Value::Uint(0));
    assert_eq!(env.eval("math.sign(0.0)").unwrap(), Value::Double(0.0));
    assert_eq!(env.eval("math.sign(4.5)").unwrap(), Value::Double(1.0));
}

#[test]
fn bit_operations() {
    let env = env();
    assert_eq!(env.eval("math.bitAnd(6, 3)").unwrap(), Value::Int(2));
    assert_eq!(env.eval("math.bitOr(6u, 3u)").unwrap(), Value::Uint(7));
    assert_eq!(env.eval("math.bitXor(6, 3)").unwrap(), Value::Int(5));
    assert_eq!(env.eval("math.bitNot(0)").unwrap(), Value::Int(-1));
    assert_eq!(env.eval("math.bitShiftLeft(1, 4)").unwrap(), Value::Int(16));
    assert_eq!(env.eval("math.bitShiftLeft(1u, 64)").unwrap(), Value::Uint(0));
    assert_eq!(env.eval("math.bitShiftRight(-1, 63)").unwrap(), Value::Int(1));
    assert_eq!(env.eval("math.bitShiftRight(16u, 2)").unwrap(), Value::Uint(4));
    assert_eq!(
        env.eval("math.bitShiftLeft(1, -1)").unwrap_err().message,
        "math.bitShiftLeft() negative offset: -1"
    );
}

#[test]
fn uint_overloads_work_under_both_reprs() {
    let signed = env().repr(UintRepr::Signed);
    assert_eq!(signed.eval("math.bitOr(6u, 3u)").unwrap(), Value::Int(7));
    assert_eq!(signed.eval("math.greatest(1u, 2u)").unwrap(), Value::Int(2));
    assert!(signed.eval("math.bitNot(0u)").is_err());
}

#[test]
fn sqrt_arrives_in_version_two() {
    assert_eq!(env().eval("math.sqrt(16)").unwrap(), Value::Double(4.0));
    let v1 = TestEnv::versioned(&MathLib, Some(1));
    let errors = v1.check_errors("math.sqrt(16.0)");
    assert!(
        errors.iter().any(|e| e == "undeclared reference to `sqrt`"),
        "{errors:?}"
    );
}
