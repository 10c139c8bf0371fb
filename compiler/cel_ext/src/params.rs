//! Type parameters shared by generic overload signatures.

use cel_types::Type;

pub(crate) fn param_a() -> Type {
    Type::param("A")
}

pub(crate) fn param_b() -> Type {
    Type::param("B")
}
