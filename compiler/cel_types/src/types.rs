//! The static type language.

use std::fmt;

/// Static type of an expression or formal parameter.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Type {
    /// Unknown until runtime; unifies with everything.
    Dyn,
    Null,
    Bool,
    Int,
    Uint,
    Double,
    String,
    Bytes,
    List(Box<Type>),
    Map(Box<Type>, Box<Type>),
    Optional(Box<Type>),
    /// Placeholder bound during overload resolution.
    TypeParam(String),
    /// Type of an expression that already failed to check.
    Error,
}

impl Type {
    pub fn list(elem: Type) -> Type {
        Type::List(Box::new(elem))
    }

    pub fn map(key: Type, value: Type) -> Type {
        Type::Map(Box::new(key), Box::new(value))
    }

    pub fn optional(inner: Type) -> Type {
        Type::Optional(Box::new(inner))
    }

    pub fn param(name: &str) -> Type {
        Type::TypeParam(name.to_owned())
    }

    /// `dyn` or `error`: types that unify with anything as actuals.
    pub fn is_dyn_like(&self) -> bool {
        matches!(self, Type::Dyn | Type::Error)
    }

    /// Whether `dyn` occurs anywhere in the type.
    pub fn contains_dyn(&self) -> bool {
        match self {
            Type::Dyn => true,
            Type::List(elem) | Type::Optional(elem) => elem.contains_dyn(),
            Type::Map(key, value) => key.contains_dyn() || value.contains_dyn(),
            _ => false,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Type::Int | Type::Uint | Type::Double)
    }

    /// Common type of several element types: the type itself when all
    /// agree, `dyn` otherwise (and for an empty set).
    pub fn join<'a>(types: impl IntoIterator<Item = &'a Type>) -> Type {
        let mut iter = types.into_iter();
        let Some(first) = iter.next() else {
            return Type::Dyn;
        };
        if iter.all(|t| t == first) {
            first.clone()
        } else {
            Type::Dyn
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Dyn => f.write_str("dyn"),
            Type::Null => f.write_str("null_type"),
            Type::Bool => f.write_str("bool"),
            Type::Int => f.write_str("int"),
            Type::Uint => f.write_str("uint"),
            Type::Double => f.write_str("double"),
            Type::String => f.write_str("string"),
            Type::Bytes => f.write_str("bytes"),
            Type::List(elem) => write!(f, "list({elem})"),
            Type::Map(key, value) => write!(f, "map({key}, {value})"),
            Type::Optional(inner) => write!(f, "optional_type({inner})"),
            Type::TypeParam(name) => f.write_str(name),
            Type::Error => f.write_str("*error*"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn display() {
        assert_eq!(Type::list(Type::Int).to_string(), "list(int)");
        assert_eq!(
            Type::map(Type::String, Type::list(Type::param("T"))).to_string(),
            "map(string, list(T))"
        );
        assert_eq!(Type::optional(Type::Dyn).to_string(), "optional_type(dyn)");
    }

    #[test]
    fn join_prefers_agreement() {
        assert_eq!(Type::join(&[Type::Int, Type::Int]), Type::Int);
        assert_eq!(Type::join(&[Type::Int, Type::Double]), Type::Dyn);
        assert_eq!(Type::join(std::iter::empty()), Type::Dyn);
    }

    #[test]
    fn contains_dyn_is_deep() {
        assert!(Type::map(Type::String, Type::list(Type::Dyn)).contains_dyn());
        assert!(!Type::optional(Type::Int).contains_dyn());
    }
}
