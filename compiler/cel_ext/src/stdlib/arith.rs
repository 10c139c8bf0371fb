//! Arithmetic operators and concatenation.
//!
//! Integer arithmetic is checked: overflow is an evaluation error, never a
//! wrapped result. Double arithmetic follows IEEE 754.

use cel_eval::errors::{division_by_zero, integer_overflow, modulo_by_zero};
use cel_eval::{EvalError, Value};
use cel_ir::operators::{ADD, DIVIDE, MODULO, MULTIPLY, NEGATE, SUBTRACT};
use cel_types::{Overload, Type};

use crate::args::{
    require_bytes, require_double, require_int, require_list, require_str, require_uint,
};
use crate::params::param_a;
use crate::{Feature, FunctionDef};

/// One arithmetic operator over the numeric tower.
struct NumericOp {
    function: &'static str,
    prefix: &'static str,
    int: fn(i64, i64) -> Result<i64, EvalError>,
    uint: fn(u64, u64) -> Result<u64, EvalError>,
    double: Option<fn(f64, f64) -> f64>,
}

impl NumericOp {
    fn define(self) -> FunctionDef {
        let NumericOp {
            function,
            prefix,
            int,
            uint,
            double,
        } = self;
        let def = FunctionDef::new(function)
            .overload(
                Overload::global(
                    format!("{prefix}_int64"),
                    vec![Type::Int, Type::Int],
                    Type::Int,
                ),
                move |_, args| {
                    let a = require_int(function, args, 0)?;
                    let b = require_int(function, args, 1)?;
                    int(a, b).map(Value::Int)
                },
            )
            .overload(
                Overload::global(
                    format!("{prefix}_uint64"),
                    vec![Type::Uint, Type::Uint],
                    Type::Uint,
                ),
                move |ctx, args| {
                    let a = require_uint(ctx, args, 0)?;
                    let b = require_uint(ctx, args, 1)?;
                    ctx.uint(uint(a, b)?)
                },
            );
        match double {
            Some(op) => def.overload(
                Overload::global(
                    format!("{prefix}_double"),
                    vec![Type::Double, Type::Double],
                    Type::Double,
                ),
                move |_, args| {
                    let a = require_double(function, args, 0)?;
                    let b = require_double(function, args, 1)?;
                    Ok(Value::Double(op(a, b)))
                },
            ),
            None => def,
        }
    }
}

pub(super) fn features() -> Vec<Feature> {
    vec![
        Feature::new(ADD, 0).function(add()),
        Feature::new(SUBTRACT, 0).function(
            NumericOp {
                function: SUBTRACT,
                prefix: "subtract",
                int: |a, b| a.checked_sub(b).ok_or_else(|| integer_overflow("subtraction")),
                uint: |a, b| a.checked_sub(b).ok_or_else(|| integer_overflow("subtraction")),
                double: Some(|a, b| a - b),
            }
            .define(),
        ),
        Feature::new(MULTIPLY, 0).function(
            NumericOp {
                function: MULTIPLY,
                prefix: "multiply",
                int: |a, b| a.checked_mul(b).ok_or_else(|| integer_overflow("multiplication")),
                uint: |a, b| a.checked_mul(b).ok_or_else(|| integer_overflow("multiplication")),
                double: Some(|a, b| a * b),
            }
            .define(),
        ),
        Feature::new(DIVIDE, 0).function(
            NumericOp {
                function: DIVIDE,
                prefix: "divide",
                int: |a, b| {
                    if b == 0 {
                        return Err(division_by_zero());
                    }
                    a.checked_div(b).ok_or_else(|| integer_overflow("division"))
                },
                uint: |a, b| a.checked_div(b).ok_or_else(division_by_zero),
                double: Some(|a, b| a / b),
            }
            .define(),
        ),
        Feature::new(MODULO, 0).function(
            NumericOp {
                function: MODULO,
                prefix: "modulo",
                int: |a, b| {
                    if b == 0 {
                        return Err(modulo_by_zero());
                    }
                    a.checked_rem(b).ok_or_else(|| integer_overflow("modulus"))
                },
                uint: |a, b| a.checked_rem(b).ok_or_else(modulo_by_zero),
                double: None,
            }
            .define(),
        ),
        Feature::new(NEGATE, 0).function(negate()),
    ]
}

/// `+`: numeric addition plus string, bytes and list concatenation.
fn add() -> FunctionDef {
    let numeric = NumericOp {
        function: ADD,
        prefix: "add",
        int: |a, b| a.checked_add(b).ok_or_else(|| integer_overflow("addition")),
        uint: |a, b| a.checked_add(b).ok_or_else(|| integer_overflow("addition")),
        double: Some(|a, b| a + b),
    }
    .define();
    numeric
        .overload(
            Overload::global("add_string", vec![Type::String, Type::String], Type::String),
            |_, args| {
                let a = require_str(ADD, args, 0)?;
                let b = require_str(ADD, args, 1)?;
                Ok(Value::string(format!("{a}{b}")))
            },
        )
        .overload(
            Overload::global("add_bytes", vec![Type::Bytes, Type::Bytes], Type::Bytes),
            |_, args| {
                let a = require_bytes(ADD, args, 0)?;
                let b = require_bytes(ADD, args, 1)?;
                Ok(Value::bytes([a, b].concat()))
            },
        )
        .overload(
            Overload::global(
                "add_list",
                vec![Type::list(param_a()), Type::list(param_a())],
                Type::list(param_a()),
            ),
            |_, args| {
                let a = require_list(ADD, args, 0)?;
                let b = require_list(ADD, args, 1)?;
                Ok(Value::list([a, b].concat()))
            },
        )
}

fn negate() -> FunctionDef {
    FunctionDef::new(NEGATE)
        .overload(
            Overload::global("negate_int64", vec![Type::Int], Type::Int),
            |_, args| {
                let a = require_int(NEGATE, args, 0)?;
                a.checked_neg()
                    .map(Value::Int)
                    .ok_or_else(|| integer_overflow("negation"))
            },
        )
        .overload(
            Overload::global("negate_double", vec![Type::Double], Type::Double),
            |_, args| Ok(Value::Double(-require_double(NEGATE, args, 0)?)),
        )
}
