//! Argument extraction for native bindings.
//!
//! Bindings are selected by representation tag, so these only fail when a
//! binding is invoked directly with the wrong arguments.

use cel_eval::errors::invalid_argument;
use cel_eval::{CallContext, EvalError, Value, ValueMap};

fn arg<'v, T>(
    function: &str,
    args: &'v [Value],
    index: usize,
    expected: &str,
    pick: impl FnOnce(&'v Value) -> Option<T>,
) -> Result<T, EvalError> {
    let Some(value) = args.get(index) else {
        return Err(invalid_argument(format!(
            "{function}() missing argument {index}"
        )));
    };
    pick(value).ok_or_else(|| {
        invalid_argument(format!(
            "{function}() expected {expected} at argument {index}, got {}",
            value.type_name()
        ))
    })
}

pub(crate) fn require_bool(function: &str, args: &[Value], index: usize) -> Result<bool, EvalError> {
    arg(function, args, index, "bool", Value::as_bool)
}

pub(crate) fn require_int(function: &str, args: &[Value], index: usize) -> Result<i64, EvalError> {
    arg(function, args, index, "int", |v| match v {
        Value::Int(i) => Some(*i),
        _ => None,
    })
}

/// An unsigned argument in the active representation.
pub(crate) fn require_uint(
    ctx: &CallContext<'_>,
    args: &[Value],
    index: usize,
) -> Result<u64, EvalError> {
    match args.get(index) {
        Some(value) => ctx.as_uint(value),
        None => Err(invalid_argument(format!("missing argument {index}"))),
    }
}

pub(crate) fn require_double(function: &str, args: &[Value], index: usize) -> Result<f64, EvalError> {
    arg(function, args, index, "double", |v| match v {
        Value::Double(d) => Some(*d),
        _ => None,
    })
}

pub(crate) fn require_str<'v>(
    function: &str,
    args: &'v [Value],
    index: usize,
) -> Result<&'v str, EvalError> {
    arg(function, args, index, "string", Value::as_str)
}

pub(crate) fn require_bytes<'v>(
    function: &str,
    args: &'v [Value],
    index: usize,
) -> Result<&'v [u8], EvalError> {
    arg(function, args, index, "bytes", |v| match v {
        Value::Bytes(b) => Some(&b[..]),
        _ => None,
    })
}

pub(crate) fn require_list<'v>(
    function: &str,
    args: &'v [Value],
    index: usize,
) -> Result<&'v [Value], EvalError> {
    arg(function, args, index, "list", Value::as_list)
}

pub(crate) fn require_map<'v>(
    function: &str,
    args: &'v [Value],
    index: usize,
) -> Result<&'v ValueMap, EvalError> {
    arg(function, args, index, "map", Value::as_map)
}

/// The contents of an optional argument; `None` for `optional.none()`.
pub(crate) fn require_optional<'v>(
    function: &str,
    args: &'v [Value],
    index: usize,
) -> Result<Option<&'v Value>, EvalError> {
    arg(function, args, index, "optional", |v| match v {
        Value::Optional(inner) => Some(inner.as_deref()),
        _ => None,
    })
}

/// A list length or index as an `int` value.
pub(crate) fn int_len(len: usize) -> Value {
    Value::Int(i64::try_from(len).unwrap_or(i64::MAX))
}

/// A non-negative `int` argument as an index.
pub(crate) fn require_index(function: &str, args: &[Value], index: usize) -> Result<usize, EvalError> {
    let i = require_int(function, args, index)?;
    usize::try_from(i).map_err(|_| invalid_argument(format!("{function}() negative index: {i}")))
}
