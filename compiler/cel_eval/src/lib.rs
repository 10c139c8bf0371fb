//! Runtime values, native bindings and the evaluator.
//!
//! A checked program is evaluated by walking its tree. Every non-intrinsic
//! call carries the candidate overload ids the checker recorded, and the
//! [`Dispatcher`] picks the first [`NativeBinding`] whose runtime
//! representation tags accept the argument values.
//!
//! Unsigned integers have two runtime representations, selected per
//! environment by [`UintRepr`]. Numeric comparison across `int`, `uint` and
//! `double` goes through the shared [`NumericComparator`], which is exact.

mod activation;
mod dispatch;
pub mod errors;
pub mod interpreter;
mod native;
pub mod numeric;
mod value;

pub use activation::Activation;
pub use dispatch::Dispatcher;
pub use errors::{EvalError, EvalErrorKind, EvalResult};
pub use interpreter::{evaluate, is_intrinsic, EvalCounters, Program};
pub use native::{CallContext, ConsumingFn, NativeBinding, NativeFn, NativeTag, UintRepr};
pub use numeric::{comparator, NumericComparator, NumericRepr};
pub use value::{MapKey, Value, ValueMap};
