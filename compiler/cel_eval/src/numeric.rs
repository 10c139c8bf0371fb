//! Heterogeneous numeric comparison.
//!
//! Values of the same numeric representation compare natively. Mixed pairs
//! go through a table of pairwise comparison functions keyed by the ordered
//! pair of representations. The cross comparisons are exact: an integer is
//! never rounded to the nearest double, so `2^53 + 1` and `2^53 as f64`
//! compare unequal. NaN is unordered with everything.
//!
//! The table is built once, lazily, and shared by reference through
//! [`crate::CallContext`]; nothing rebuilds it per call.

use std::cmp::Ordering;
use std::sync::LazyLock;

use rustc_hash::FxHashMap;

use crate::value::Value;

/// Numeric representation of a value.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum NumericRepr {
    Int,
    Uint,
    Double,
}

impl NumericRepr {
    pub fn of(value: &Value) -> Option<NumericRepr> {
        match value {
            Value::Int(_) => Some(NumericRepr::Int),
            Value::Uint(_) => Some(NumericRepr::Uint),
            Value::Double(_) => Some(NumericRepr::Double),
            _ => None,
        }
    }
}

type CompareFn = fn(&Value, &Value) -> Option<Ordering>;

/// Pairwise comparison table for the numeric tower.
pub struct NumericComparator {
    table: FxHashMap<(NumericRepr, NumericRepr), CompareFn>,
}

static COMPARATOR: LazyLock<NumericComparator> = LazyLock::new(NumericComparator::build);

/// The shared comparator.
pub fn comparator() -> &'static NumericComparator {
    &COMPARATOR
}

impl NumericComparator {
    fn build() -> Self {
        use NumericRepr::{Double, Int, Uint};

        let mut table: FxHashMap<(NumericRepr, NumericRepr), CompareFn> = FxHashMap::default();
        table.insert((Int, Int), |a, b| match (a, b) {
            (Value::Int(x), Value::Int(y)) => Some(x.cmp(y)),
            _ => None,
        });
        table.insert((Uint, Uint), |a, b| match (a, b) {
            (Value::Uint(x), Value::Uint(y)) => Some(x.cmp(y)),
            _ => None,
        });
        table.insert((Double, Double), |a, b| match (a, b) {
            (Value::Double(x), Value::Double(y)) => x.partial_cmp(y),
            _ => None,
        });
        table.insert((Int, Uint), |a, b| match (a, b) {
            (Value::Int(x), Value::Uint(y)) => Some(cmp_int_uint(*x, *y)),
            _ => None,
        });
        table.insert((Uint, Int), |a, b| match (a, b) {
            (Value::Uint(x), Value::Int(y)) => Some(cmp_int_uint(*y, *x).reverse()),
            _ => None,
        });
        table.insert((Int, Double), |a, b| match (a, b) {
            (Value::Int(x), Value::Double(y)) => cmp_int_double(*x, *y),
            _ => None,
        });
        table.insert((Double, Int), |a, b| match (a, b) {
            (Value::Double(x), Value::Int(y)) => cmp_int_double(*y, *x).map(Ordering::reverse),
            _ => None,
        });
        table.insert((Uint, Double), |a, b| match (a, b) {
            (Value::Uint(x), Value::Double(y)) => cmp_uint_double(*x, *y),
            _ => None,
        });
        table.insert((Double, Uint), |a, b| match (a, b) {
            (Value::Double(x), Value::Uint(y)) => cmp_uint_double(*y, *x).map(Ordering::reverse),
            _ => None,
        });
        tracing::trace!(pairs = table.len(), "built numeric comparator");
        NumericComparator { table }
    }

    /// Order two numeric values; `None` if either is not numeric or NaN is
    /// involved.
    pub fn compare_numeric(&self, a: &Value, b: &Value) -> Option<Ordering> {
        let key = (NumericRepr::of(a)?, NumericRepr::of(b)?);
        self.table.get(&key).and_then(|cmp| cmp(a, b))
    }

    /// Order two values of the same comparable kind, numerics across
    /// representations.
    pub fn compare(&self, a: &Value, b: &Value) -> Option<Ordering> {
        match (a, b) {
            (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
            (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
            (Value::Bytes(x), Value::Bytes(y)) => Some(x.cmp(y)),
            _ => self.compare_numeric(a, b),
        }
    }

    /// Language equality: numeric values are equal when they compare
    /// equal, containers compare element-wise, and a numeric value never
    /// equals a non-numeric one.
    pub fn equals(&self, a: &Value, b: &Value) -> bool {
        if a.is_numeric() || b.is_numeric() {
            return self.compare_numeric(a, b) == Some(Ordering::Equal);
        }
        match (a, b) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(x), Value::Bool(y)) => x == y,
            (Value::String(x), Value::String(y)) => x == y,
            (Value::Bytes(x), Value::Bytes(y)) => x == y,
            (Value::List(x), Value::List(y)) => {
                x.len() == y.len() && x.iter().zip(y.iter()).all(|(p, q)| self.equals(p, q))
            }
            (Value::Map(x), Value::Map(y)) => {
                x.len() == y.len()
                    && x
                        .iter()
                        .all(|(k, v)| y.get(k).is_some_and(|w| self.equals(v, w)))
            }
            (Value::Optional(x), Value::Optional(y)) => match (x, y) {
                (Some(p), Some(q)) => self.equals(p, q),
                (None, None) => true,
                _ => false,
            },
            _ => false,
        }
    }
}

fn cmp_int_uint(x: i64, y: u64) -> Ordering {
    match u64::try_from(x) {
        Ok(x) => x.cmp(&y),
        Err(_) => Ordering::Less,
    }
}

/// 2^63 and 2^64 as doubles; both are exactly representable.
const TWO_POW_63: f64 = 9_223_372_036_854_775_808.0;
const TWO_POW_64: f64 = 18_446_744_073_709_551_616.0;

/// Compare the integer part first, then break ties with the fraction.
#[expect(
    clippy::cast_possible_truncation,
    reason = "the truncated double is range-checked to fit i64 exactly"
)]
fn cmp_int_double(x: i64, y: f64) -> Option<Ordering> {
    if y.is_nan() {
        return None;
    }
    if y >= TWO_POW_63 {
        return Some(Ordering::Less);
    }
    if y < -TWO_POW_63 {
        return Some(Ordering::Greater);
    }
    let whole = y.trunc();
    Some(x.cmp(&(whole as i64)).then_with(|| fraction_order(y - whole)))
}

#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "the truncated double is range-checked to fit u64 exactly"
)]
fn cmp_uint_double(x: u64, y: f64) -> Option<Ordering> {
    if y.is_nan() {
        return None;
    }
    if y < 0.0 {
        return Some(Ordering::Greater);
    }
    if y >= TWO_POW_64 {
        return Some(Ordering::Less);
    }
    let whole = y.trunc();
    Some(x.cmp(&(whole as u64)).then_with(|| fraction_order(y - whole)))
}

/// How an integer equal to `trunc(y)` orders against `y`, given
/// `y - trunc(y)`.
fn fraction_order(fraction: f64) -> Ordering {
    if fraction > 0.0 {
        Ordering::Less
    } else if fraction < 0.0 {
        Ordering::Greater
    } else {
        Ordering::Equal
    }
}

#[cfg(test)]
mod tests;
