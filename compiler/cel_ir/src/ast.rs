//! Expression nodes.

use crate::{ExprId, ExprRange, FieldInitRange, MapEntryRange, Span};

/// Constant value written directly in the source.
#[derive(Clone, Debug, PartialEq)]
pub enum Literal {
    Null,
    Bool(bool),
    Int(i64),
    Uint(u64),
    Double(f64),
    String(String),
    Bytes(Vec<u8>),
}

impl Literal {
    /// Whether the literal is one of the numeric kinds.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Literal::Int(_) | Literal::Uint(_) | Literal::Double(_))
    }
}

/// One `key: value` entry of a map literal.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MapEntry {
    pub key: ExprId,
    pub value: ExprId,
    pub span: Span,
}

/// One `field: value` initializer of a struct literal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldInit {
    pub name: String,
    pub value: ExprId,
    pub span: Span,
}

/// The generalized fold every iterating macro lowers to.
///
/// Evaluation: bind `accu_var` to `accu_init`; for each element of
/// `iter_range` bind the iteration variable(s), stop if `loop_condition` is
/// `false`, otherwise rebind the accumulator to `loop_step`. Finally evaluate
/// `result` with only the accumulator in scope.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Comprehension {
    pub iter_var: String,
    /// Second iteration variable of the two-variable form (index/value for
    /// lists, key/value for maps).
    pub iter_var2: Option<String>,
    pub accu_var: String,
    pub iter_range: ExprId,
    pub accu_init: ExprId,
    pub loop_condition: ExprId,
    pub loop_step: ExprId,
    pub result: ExprId,
}

/// Expression kinds.
#[derive(Clone, Debug, PartialEq)]
pub enum ExprKind {
    Literal(Literal),
    Ident(String),
    List(ExprRange),
    Map(MapEntryRange),
    Struct {
        type_name: String,
        fields: FieldInitRange,
    },
    /// Field selection; `test_only` marks a presence test (`has(a.b)`).
    Select {
        operand: ExprId,
        field: String,
        test_only: bool,
    },
    /// Function call. Operators are calls with internal names
    /// (see [`crate::operators`]); receiver-style calls carry a `target`.
    Call {
        function: String,
        target: Option<ExprId>,
        args: ExprRange,
    },
    Comprehension(Box<Comprehension>),
    /// Inline diagnostic left by a failed macro expansion or a syntax error.
    Error(String),
}

/// A node: kind plus source location.
#[derive(Clone, Debug, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    #[inline]
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Expr { kind, span }
    }
}
