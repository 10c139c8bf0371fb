//! Type conversion functions: `int`, `uint`, `double`, `string`, `bytes`,
//! `bool` and `dyn`.

use cel_eval::errors::{integer_overflow, invalid_argument};
use cel_eval::{EvalResult, Value};
use cel_types::{Overload, Type};

use crate::args::{require_bool, require_bytes, require_double, require_int, require_str, require_uint};
use crate::params::param_a;
use crate::{Feature, FunctionDef};

/// 2^63 as a double; the first double above the `i64` range.
const TWO_POW_63: f64 = 9_223_372_036_854_775_808.0;
/// 2^64 as a double; the first double above the `u64` range.
const TWO_POW_64: f64 = 18_446_744_073_709_551_616.0;

pub(super) fn features() -> Vec<Feature> {
    vec![
        Feature::new("int", 0).function(to_int()),
        Feature::new("uint", 0).function(to_uint()),
        Feature::new("double", 0).function(to_double()),
        Feature::new("string", 0).function(to_string()),
        Feature::new("bytes", 0).function(to_bytes()),
        Feature::new("bool", 0).function(to_bool()),
        Feature::new("dyn", 0).function(FunctionDef::new("dyn").overload(
            Overload::global("to_dyn", vec![param_a()], Type::Dyn),
            |_, args| Ok(args[0].clone()),
        )),
    ]
}

fn unary(id: &str, from: Type, to: Type) -> Overload {
    Overload::global(id, vec![from], to)
}

fn parse_error(text: &str, target: &str) -> cel_eval::EvalError {
    invalid_argument(format!("cannot convert '{text}' to {target}"))
}

/// `int(x)`; doubles truncate toward zero and must be in range.
fn to_int() -> FunctionDef {
    FunctionDef::new("int")
        .overload(unary("int64_to_int64", Type::Int, Type::Int), |_, args| {
            Ok(Value::Int(require_int("int", args, 0)?))
        })
        .overload(unary("uint64_to_int64", Type::Uint, Type::Int), |ctx, args| {
            let u = require_uint(ctx, args, 0)?;
            i64::try_from(u)
                .map(Value::Int)
                .map_err(|_| integer_overflow("int conversion"))
        })
        .overload(unary("double_to_int64", Type::Double, Type::Int), |_, args| {
            let t = require_double("int", args, 0)?.trunc();
            if !(-TWO_POW_63..TWO_POW_63).contains(&t) {
                return Err(integer_overflow("int conversion"));
            }
            #[expect(clippy::cast_possible_truncation, reason = "range checked above")]
            let i = t as i64;
            Ok(Value::Int(i))
        })
        .overload(unary("string_to_int64", Type::String, Type::Int), |_, args| {
            let s = require_str("int", args, 0)?;
            s.parse::<i64>()
                .map(Value::Int)
                .map_err(|_| parse_error(s, "int"))
        })
}

/// `uint(x)`; the result follows the active unsigned representation.
fn to_uint() -> FunctionDef {
    FunctionDef::new("uint")
        .overload(unary("uint64_to_uint64", Type::Uint, Type::Uint), |ctx, args| {
            ctx.uint(require_uint(ctx, args, 0)?)
        })
        .overload(unary("int64_to_uint64", Type::Int, Type::Uint), |ctx, args| {
            let i = require_int("uint", args, 0)?;
            let u = u64::try_from(i).map_err(|_| integer_overflow("uint conversion"))?;
            ctx.uint(u)
        })
        .overload(unary("double_to_uint64", Type::Double, Type::Uint), |ctx, args| {
            let t = require_double("uint", args, 0)?.trunc();
            if !(0.0..TWO_POW_64).contains(&t) {
                return Err(integer_overflow("uint conversion"));
            }
            #[expect(
                clippy::cast_possible_truncation,
                clippy::cast_sign_loss,
                reason = "range checked above"
            )]
            let u = t as u64;
            ctx.uint(u)
        })
        .overload(unary("string_to_uint64", Type::String, Type::Uint), |ctx, args| {
            let s = require_str("uint", args, 0)?;
            let u = s.parse::<u64>().map_err(|_| parse_error(s, "uint"))?;
            ctx.uint(u)
        })
}

#[expect(clippy::cast_precision_loss, reason = "int to double rounds to nearest")]
fn to_double() -> FunctionDef {
    FunctionDef::new("double")
        .overload(unary("double_to_double", Type::Double, Type::Double), |_, args| {
            Ok(Value::Double(require_double("double", args, 0)?))
        })
        .overload(unary("int64_to_double", Type::Int, Type::Double), |_, args| {
            Ok(Value::Double(require_int("double", args, 0)? as f64))
        })
        .overload(unary("uint64_to_double", Type::Uint, Type::Double), |ctx, args| {
            Ok(Value::Double(require_uint(ctx, args, 0)? as f64))
        })
        .overload(unary("string_to_double", Type::String, Type::Double), |_, args| {
            let s = require_str("double", args, 0)?;
            s.parse::<f64>()
                .map(Value::Double)
                .map_err(|_| parse_error(s, "double"))
        })
}

fn to_string() -> FunctionDef {
    FunctionDef::new("string")
        .overload(unary("string_to_string", Type::String, Type::String), |_, args| {
            Ok(args[0].clone())
        })
        .overload(unary("int64_to_string", Type::Int, Type::String), |_, args| {
            Ok(Value::string(require_int("string", args, 0)?.to_string()))
        })
        .overload(unary("uint64_to_string", Type::Uint, Type::String), |ctx, args| {
            Ok(Value::string(require_uint(ctx, args, 0)?.to_string()))
        })
        .overload(unary("double_to_string", Type::Double, Type::String), |_, args| {
            Ok(Value::string(require_double("string", args, 0)?.to_string()))
        })
        .overload(unary("bytes_to_string", Type::Bytes, Type::String), |_, args| {
            let bytes = require_bytes("string", args, 0)?;
            std::str::from_utf8(bytes)
                .map(Value::string)
                .map_err(|_| invalid_argument("invalid UTF-8 in bytes, cannot convert to string"))
        })
        .overload(unary("bool_to_string", Type::Bool, Type::String), |_, args| {
            Ok(Value::string(require_bool("string", args, 0)?.to_string()))
        })
}

fn to_bytes() -> FunctionDef {
    FunctionDef::new("bytes")
        .overload(unary("bytes_to_bytes", Type::Bytes, Type::Bytes), |_, args| {
            Ok(args[0].clone())
        })
        .overload(unary("string_to_bytes", Type::String, Type::Bytes), |_, args| {
            Ok(Value::bytes(require_str("bytes", args, 0)?.as_bytes()))
        })
}

fn to_bool() -> FunctionDef {
    FunctionDef::new("bool")
        .overload(unary("bool_to_bool", Type::Bool, Type::Bool), |_, args| {
            Ok(Value::Bool(require_bool("bool", args, 0)?))
        })
        .overload(unary("string_to_bool", Type::String, Type::Bool), |_, args| {
            parse_bool(require_str("bool", args, 0)?)
        })
}

fn parse_bool(s: &str) -> EvalResult {
    match s {
        "1" | "t" | "true" | "TRUE" | "True" => Ok(Value::Bool(true)),
        "0" | "f" | "false" | "FALSE" | "False" => Ok(Value::Bool(false)),
        _ => Err(parse_error(s, "bool")),
    }
}
