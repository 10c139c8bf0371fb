//! Static types, overload declarations and the checker.
//!
//! Libraries populate a [`Declarations`] registry with [`FunctionDecl`]s.
//! The registry rejects duplicate overload ids and overload sets that would
//! be ambiguous for some concrete argument list, so that overload resolution
//! in the checker never has to break ties between two declared signatures.
//!
//! Resolution is plain first-order unification of formal against actual
//! parameter types with a per-candidate [`Substitution`]; see [`unify`].

pub mod check;
mod decl;
mod registry;
mod types;
pub mod unify;

pub use check::{check, CallReference, CheckResult};
pub use decl::{FunctionDecl, Overload, OverloadKind};
pub use registry::{DeclError, Declarations};
pub use types::Type;
pub use unify::Substitution;
