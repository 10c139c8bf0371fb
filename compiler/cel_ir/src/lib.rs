//! CEL IR - expression tree types for the extension core.
//!
//! This crate contains the data model shared by every phase:
//! - Spans for source locations
//! - `ExprId` / range types for the flat tree
//! - Expression nodes (`Expr`, `ExprKind`, `Comprehension`)
//! - `ExprArena` for node storage
//! - `ExprFactory`, the node-construction interface used by macro expanders
//! - Canonical names for operators and internal functions
//!
//! # Design
//!
//! - **Flatten everything**: no `Box<Expr>` children, nodes refer to each
//!   other through `ExprId(u32)` indices into an arena.
//! - **Append only**: the arena never mutates a node after allocation. Macro
//!   rewrites allocate replacement nodes; a subtree that must appear twice is
//!   deep-copied so that no node is shared.

mod arena;
mod ast;
mod expr_id;
mod factory;
pub mod operators;
pub mod printer;
mod span;
pub mod visitor;

pub use arena::ExprArena;
pub use ast::{Comprehension, Expr, ExprKind, FieldInit, Literal, MapEntry};
pub use expr_id::{ExprId, ExprRange, FieldInitRange, MapEntryRange};
pub use factory::ExprFactory;
pub use span::{Span, SpanError};
