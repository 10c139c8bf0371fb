//! Diagnostic system for parse, macro and check errors.
//!
//! Every problem found before evaluation is a [`Diagnostic`]:
//! - an error code for searchability
//! - a message (what went wrong)
//! - a primary span (where it went wrong)
//! - optional notes
//!
//! Phases accumulate diagnostics across the whole expression instead of
//! stopping at the first one.

mod diagnostic;
mod error_code;
pub mod span_utils;

pub use diagnostic::{
    expected_expression, macro_error, no_matching_overload, undeclared_reference,
    unexpected_token, Diagnostic, Label, Severity,
};
pub use error_code::ErrorCode;
