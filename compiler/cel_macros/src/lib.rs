//! Parse-time macros.
//!
//! A macro rewrites call-shaped syntax (`xs.all(x, p)`, `has(a.b)`,
//! `math.greatest(1, 2)`) into other expressions while the tree is being
//! built, before anything is type checked. Iterating macros all lower to the
//! single `Comprehension` fold shape built in [`lowering`].
//!
//! - [`Macro`]: one macro, identified by `(name, ArgCount)`
//! - [`MacroRegistry`]: the table the parser consults for every call
//! - [`standard_macros`]: `has`, `all`, `exists`, `exists_one`, `map`, `filter`
//!
//! Expanders never fail with an `Err`: malformed usage becomes an `Error`
//! node inside the tree so every macro error is reported in one pass.

pub mod lowering;
mod macro_def;
mod registry;
mod standard;

pub use macro_def::{ArgCount, Expander, Macro, MacroKey, MacroStyle};
pub use registry::{MacroError, MacroRegistry};
pub use standard::standard_macros;
