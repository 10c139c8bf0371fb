//! Evaluation errors.
//!
//! Errors are values of [`EvalError`], built through the factory functions
//! below so every message for a given condition reads the same. Ordinary
//! errors flow through the evaluator like values (logical operators and
//! comprehension conditions may absorb them). Fatal ones signal a
//! misconfigured environment rather than a problem with the input.

use std::fmt;

use crate::value::Value;

/// Result of evaluation.
pub type EvalResult = Result<Value, EvalError>;

/// Typed error category.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EvalErrorKind {
    // Arithmetic
    DivisionByZero,
    ModuloByZero,
    IntegerOverflow { operation: String },

    // Access
    UnboundVariable { name: String },
    NoSuchKey { key: String },
    NoSuchField { field: String, type_name: String },
    IndexOutOfBounds { index: String, len: usize },
    InvalidMapKey { type_name: String },
    DuplicateMapKey { key: String },

    // Calls
    NoMatchingOverload { function: String, args: String },
    /// No binding accepts the runtime representation of a call the checker
    /// resolved exactly. Fatal: the environment is misconfigured.
    MissingBinding { overload_id: String, tags: String },
    InvalidArgument { message: String },

    // Comprehensions
    UnsupportedRange { type_name: String },

    Unsupported { feature: String },
    /// Tree shape the evaluator cannot have been handed by a checked program.
    Internal { message: String },
}

impl EvalErrorKind {
    /// Whether this error indicates a broken environment rather than bad
    /// input; fatal errors are never absorbed by logical operators.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            EvalErrorKind::MissingBinding { .. } | EvalErrorKind::Internal { .. }
        )
    }
}

impl fmt::Display for EvalErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DivisionByZero => write!(f, "division by zero"),
            Self::ModuloByZero => write!(f, "modulus by zero"),
            Self::IntegerOverflow { operation } => write!(f, "integer overflow in {operation}"),

            Self::UnboundVariable { name } => write!(f, "no such attribute: {name}"),
            Self::NoSuchKey { key } => write!(f, "no such key: {key}"),
            Self::NoSuchField { field, type_name } => {
                write!(f, "no such field `{field}` on {type_name}")
            }
            Self::IndexOutOfBounds { index, len } => {
                write!(f, "index {index} out of range for list of size {len}")
            }
            Self::InvalidMapKey { type_name } => write!(f, "unsupported map key type: {type_name}"),
            Self::DuplicateMapKey { key } => write!(f, "duplicate map key: {key}"),

            Self::NoMatchingOverload { function, args } => {
                write!(f, "no matching overload for `{function}` applied to ({args})")
            }
            Self::MissingBinding { overload_id, tags } => write!(
                f,
                "no native binding for overload `{overload_id}` accepts runtime representation ({tags})"
            ),
            Self::InvalidArgument { message } => write!(f, "{message}"),

            Self::UnsupportedRange { type_name } => {
                write!(f, "cannot iterate over a value of type {type_name}")
            }

            Self::Unsupported { feature } => write!(f, "{feature} is not supported"),
            Self::Internal { message } => write!(f, "internal error: {message}"),
        }
    }
}

/// Evaluation error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EvalError {
    pub kind: EvalErrorKind,
    /// Human-readable message; equals `kind.to_string()`.
    pub message: String,
}

impl EvalError {
    fn from_kind(kind: EvalErrorKind) -> Self {
        let message = kind.to_string();
        EvalError { kind, message }
    }

    pub fn is_fatal(&self) -> bool {
        self.kind.is_fatal()
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for EvalError {}

fn render_args(args: &[Value]) -> String {
    args.iter()
        .map(Value::type_name)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cold]
pub fn division_by_zero() -> EvalError {
    EvalError::from_kind(EvalErrorKind::DivisionByZero)
}

#[cold]
pub fn modulo_by_zero() -> EvalError {
    EvalError::from_kind(EvalErrorKind::ModuloByZero)
}

#[cold]
pub fn integer_overflow(operation: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::IntegerOverflow {
        operation: operation.to_owned(),
    })
}

#[cold]
pub fn unbound_variable(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UnboundVariable {
        name: name.to_owned(),
    })
}

#[cold]
pub fn no_such_key(key: &Value) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NoSuchKey {
        key: key.to_string(),
    })
}

#[cold]
pub fn no_such_field(field: &str, value: &Value) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NoSuchField {
        field: field.to_owned(),
        type_name: value.type_name().to_owned(),
    })
}

#[cold]
pub fn index_out_of_bounds(index: &Value, len: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::IndexOutOfBounds {
        index: index.to_string(),
        len,
    })
}

#[cold]
pub fn invalid_map_key(type_name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::InvalidMapKey {
        type_name: type_name.to_owned(),
    })
}

#[cold]
pub fn duplicate_map_key(key: &Value) -> EvalError {
    EvalError::from_kind(EvalErrorKind::DuplicateMapKey {
        key: key.to_string(),
    })
}

#[cold]
pub fn no_matching_overload(function: &str, args: &[Value]) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NoMatchingOverload {
        function: function.to_owned(),
        args: render_args(args),
    })
}

#[cold]
pub fn missing_binding(overload_id: &str, args: &[Value]) -> EvalError {
    let tags = args
        .iter()
        .map(|a| a.tag().to_string())
        .collect::<Vec<_>>()
        .join(", ");
    EvalError::from_kind(EvalErrorKind::MissingBinding {
        overload_id: overload_id.to_owned(),
        tags,
    })
}

#[cold]
pub fn invalid_argument(message: impl Into<String>) -> EvalError {
    EvalError::from_kind(EvalErrorKind::InvalidArgument {
        message: message.into(),
    })
}

#[cold]
pub fn unsupported_range(value: &Value) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UnsupportedRange {
        type_name: value.type_name().to_owned(),
    })
}

#[cold]
pub fn unsupported(feature: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::Unsupported {
        feature: feature.to_owned(),
    })
}

#[cold]
pub fn internal(message: impl Into<String>) -> EvalError {
    EvalError::from_kind(EvalErrorKind::Internal {
        message: message.into(),
    })
}
