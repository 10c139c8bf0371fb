//! Canonical names of operators and internal functions.
//!
//! The parser turns operators into calls using these names, macro expanders
//! emit them, and the standard library declares overloads under them.

pub const LOGICAL_AND: &str = "_&&_";
pub const LOGICAL_OR: &str = "_||_";
pub const LOGICAL_NOT: &str = "!_";
pub const CONDITIONAL: &str = "_?_:_";
/// Loop-condition hook of error-tolerant folds: booleans pass through,
/// errors count as `true`.
pub const NOT_STRICTLY_FALSE: &str = "@not_strictly_false";

pub const EQUALS: &str = "_==_";
pub const NOT_EQUALS: &str = "_!=_";
pub const LESS: &str = "_<_";
pub const LESS_EQUALS: &str = "_<=_";
pub const GREATER: &str = "_>_";
pub const GREATER_EQUALS: &str = "_>=_";

pub const ADD: &str = "_+_";
pub const SUBTRACT: &str = "_-_";
pub const MULTIPLY: &str = "_*_";
pub const DIVIDE: &str = "_/_";
pub const MODULO: &str = "_%_";
pub const NEGATE: &str = "-_";

pub const INDEX: &str = "_[_]";
pub const OPT_INDEX: &str = "_[?_]";
pub const OPT_SELECT: &str = "_?._";
pub const IN: &str = "@in";

/// Insert into the accumulator of a map-producing fold.
pub const MAP_INSERT: &str = "cel.@mapInsert";

/// Reserved accumulator variable of iterating macros.
pub const ACCUMULATOR_VAR: &str = "__result__";

/// Placeholder bound in the iteration slot a macro does not use.
pub const UNUSED_ITER_VAR: &str = "#unused";
