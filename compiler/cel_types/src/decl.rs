//! Function and overload declarations.

use crate::Type;

/// Call shape an overload applies to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum OverloadKind {
    /// `f(a, b)`
    Global,
    /// `a.f(b)`; the receiver is the first parameter.
    Member,
}

/// One statically typed signature of a function.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Overload {
    /// Globally unique id; native bindings are keyed by it.
    pub id: String,
    pub kind: OverloadKind,
    pub params: Vec<Type>,
    pub result: Type,
    /// The last parameter may repeat.
    pub variadic: bool,
}

impl Overload {
    pub fn global(id: impl Into<String>, params: Vec<Type>, result: Type) -> Self {
        Overload {
            id: id.into(),
            kind: OverloadKind::Global,
            params,
            result,
            variadic: false,
        }
    }

    pub fn member(id: impl Into<String>, params: Vec<Type>, result: Type) -> Self {
        Overload {
            id: id.into(),
            kind: OverloadKind::Member,
            params,
            result,
            variadic: false,
        }
    }

    #[must_use]
    pub fn variadic(mut self) -> Self {
        self.variadic = true;
        self
    }

    /// Whether the overload takes `argc` arguments (receiver included).
    pub fn accepts_arity(&self, argc: usize) -> bool {
        if self.variadic {
            argc >= self.params.len()
        } else {
            argc == self.params.len()
        }
    }

    /// Formal type at argument position `index`.
    pub fn param(&self, index: usize) -> Option<&Type> {
        match self.params.get(index) {
            Some(ty) => Some(ty),
            None if self.variadic => self.params.last(),
            None => None,
        }
    }
}

/// A named function and every overload declared for it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FunctionDecl {
    pub name: String,
    pub overloads: Vec<Overload>,
}

impl FunctionDecl {
    pub fn new(name: impl Into<String>, overloads: Vec<Overload>) -> Self {
        FunctionDecl {
            name: name.into(),
            overloads,
        }
    }

    pub fn overload(&self, id: &str) -> Option<&Overload> {
        self.overloads.iter().find(|o| o.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variadic_arity() {
        let o = Overload::global("max_int", vec![Type::Int], Type::Int).variadic();
        assert!(!o.accepts_arity(0));
        assert!(o.accepts_arity(1));
        assert!(o.accepts_arity(5));
        assert_eq!(o.param(4), Some(&Type::Int));
    }

    #[test]
    fn fixed_arity() {
        let o = Overload::member("contains_string", vec![Type::String, Type::String], Type::Bool);
        assert!(o.accepts_arity(2));
        assert!(!o.accepts_arity(3));
        assert_eq!(o.param(2), None);
    }
}
