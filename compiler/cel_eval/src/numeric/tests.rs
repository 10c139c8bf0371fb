use std::cmp::Ordering;

use proptest::prelude::*;

use super::*;

fn cmp(a: Value, b: Value) -> Option<Ordering> {
    comparator().compare_numeric(&a, &b)
}

#[test]
fn no_precision_loss_at_two_pow_53() {
    let big = 9_007_199_254_740_993_i64;
    // Nearest double is 2^53.
    #[allow(clippy::cast_precision_loss, reason = "rounding is the point")]
    let nearest = big as f64;
    assert!(!comparator().equals(&Value::Int(big), &Value::Double(nearest)));
    assert_eq!(cmp(Value::Int(big), Value::Double(nearest)), Some(Ordering::Greater));
    assert_eq!(cmp(Value::Double(nearest), Value::Int(big)), Some(Ordering::Less));
    assert_eq!(
        cmp(Value::Uint(9_007_199_254_740_993), Value::Double(nearest)),
        Some(Ordering::Greater)
    );
}

#[test]
fn small_values_compare_equal_across_reprs() {
    assert!(comparator().equals(&Value::Int(2), &Value::Double(2.0)));
    assert!(comparator().equals(&Value::Uint(2), &Value::Double(2.0)));
    assert!(comparator().equals(&Value::Int(2), &Value::Uint(2)));
    assert!(!comparator().equals(&Value::Int(-1), &Value::Uint(u64::MAX)));
}

#[test]
fn out_of_range_doubles() {
    assert_eq!(cmp(Value::Int(i64::MAX), Value::Double(1e19)), Some(Ordering::Less));
    assert_eq!(cmp(Value::Int(i64::MIN), Value::Double(-1e19)), Some(Ordering::Greater));
    assert_eq!(cmp(Value::Uint(0), Value::Double(-0.5)), Some(Ordering::Greater));
    assert_eq!(cmp(Value::Uint(u64::MAX), Value::Double(1.9e19)), Some(Ordering::Less));
    assert_eq!(
        cmp(Value::Int(i64::MIN), Value::Double(-9_223_372_036_854_775_808.0)),
        Some(Ordering::Equal)
    );
}

#[test]
fn nan_is_unordered() {
    assert_eq!(cmp(Value::Int(1), Value::Double(f64::NAN)), None);
    assert_eq!(cmp(Value::Double(f64::NAN), Value::Double(f64::NAN)), None);
    assert!(!comparator().equals(&Value::Double(f64::NAN), &Value::Double(f64::NAN)));
}

#[test]
fn numeric_never_equals_non_numeric() {
    assert!(!comparator().equals(&Value::Int(1), &Value::from("1")));
    assert!(!comparator().equals(&Value::Bool(true), &Value::Int(1)));
    assert_eq!(comparator().compare(&Value::Int(1), &Value::from("1")), None);
}

#[test]
fn containers_compare_elementwise() {
    let a = Value::list(vec![Value::Int(1), Value::Double(2.0)]);
    let b = Value::list(vec![Value::Uint(1), Value::Int(2)]);
    assert!(comparator().equals(&a, &b));
    assert!(!comparator().equals(&a, &Value::list(vec![Value::Int(1)])));
}

proptest! {
    #[test]
    fn int_double_agrees_with_exact_arithmetic(x in any::<i64>(), y in -1e20f64..1e20f64) {
        // i128 holds both sides exactly once the double is integral.
        #[allow(clippy::cast_possible_truncation, reason = "integral and in range")]
        let floor = y.floor() as i128;
        let expected = if y.fract() == 0.0 {
            i128::from(x).cmp(&floor)
        } else if i128::from(x) <= floor {
            Ordering::Less
        } else {
            Ordering::Greater
        };
        prop_assert_eq!(cmp(Value::Int(x), Value::Double(y)), Some(expected));
        prop_assert_eq!(cmp(Value::Double(y), Value::Int(x)), Some(expected.reverse()));
    }

    #[test]
    fn int_uint_is_antisymmetric(x in any::<i64>(), y in any::<u64>()) {
        let forward = cmp(Value::Int(x), Value::Uint(y));
        let backward = cmp(Value::Uint(y), Value::Int(x));
        prop_assert_eq!(forward.map(Ordering::reverse), backward);
        prop_assert_eq!(forward, Some(i128::from(x).cmp(&i128::from(y))));
    }

    #[test]
    fn same_repr_is_native(x in any::<u64>(), y in any::<u64>()) {
        prop_assert_eq!(cmp(Value::Uint(x), Value::Uint(y)), Some(x.cmp(&y)));
    }
}
