//! The standard library every environment starts with.
//!
//! Operators, conversions, `size`, indexing, membership, the string
//! predicates and the standard macros. Logical operators and the
//! conditional are declared here but evaluated by the interpreter.

mod arith;
mod collections;
mod compare;
mod convert;

use cel_eval::Value;
use cel_ir::operators::{
    ADD, CONDITIONAL, EQUALS, LOGICAL_AND, LOGICAL_NOT, LOGICAL_OR, NOT_STRICTLY_FALSE,
};
use cel_macros::standard_macros;
use cel_types::{Overload, Type};

use crate::args::require_bool;
use crate::params::param_a;
use crate::{Feature, FunctionDef, Library};

/// `std`, version 0.
#[derive(Copy, Clone, Debug, Default)]
pub struct StdLib;

impl Library for StdLib {
    fn name(&self) -> &str {
        "std"
    }

    fn features(&self) -> Vec<Feature> {
        let mut features = logic();
        features.extend(compare::features());
        features.extend(arith::features());
        features.extend(collections::features());
        features.extend(convert::features());

        let support: Vec<FunctionDef> = features
            .iter()
            .filter(|f| FOLD_SUPPORT.contains(&f.name.as_str()))
            .flat_map(|f| f.functions.iter().cloned())
            .collect();
        features.extend(standard_macros().into_iter().map(|m| {
            support
                .iter()
                .cloned()
                .fold(Feature::new(m.name(), 0), Feature::function)
                .with_macros([m])
        }));
        features
    }
}

/// Functions the standard macros expand to. Every macro feature carries
/// them, so a subset naming only a macro still checks.
const FOLD_SUPPORT: [&str; 7] = [
    LOGICAL_AND,
    LOGICAL_OR,
    LOGICAL_NOT,
    NOT_STRICTLY_FALSE,
    CONDITIONAL,
    ADD,
    EQUALS,
];

fn logic() -> Vec<Feature> {
    let bool_binary = |id: &str| Overload::global(id, vec![Type::Bool, Type::Bool], Type::Bool);
    vec![
        Feature::new(LOGICAL_AND, 0).function(FunctionDef::intrinsic(
            LOGICAL_AND,
            vec![bool_binary("logical_and")],
        )),
        Feature::new(LOGICAL_OR, 0).function(FunctionDef::intrinsic(
            LOGICAL_OR,
            vec![bool_binary("logical_or")],
        )),
        Feature::new(CONDITIONAL, 0).function(FunctionDef::intrinsic(
            CONDITIONAL,
            vec![Overload::global(
                "conditional",
                vec![Type::Bool, param_a(), param_a()],
                param_a(),
            )],
        )),
        Feature::new(NOT_STRICTLY_FALSE, 0).function(FunctionDef::intrinsic(
            NOT_STRICTLY_FALSE,
            vec![Overload::global("not_strictly_false", vec![Type::Bool], Type::Bool)],
        )),
        Feature::new(LOGICAL_NOT, 0).function(FunctionDef::new(LOGICAL_NOT).overload(
            Overload::global("logical_not", vec![Type::Bool], Type::Bool),
            |_, args| Ok(Value::Bool(!require_bool(LOGICAL_NOT, args, 0)?)),
        )),
    ]
}
