//! The declaration registry consulted by the checker.

use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::decl::{FunctionDecl, Overload};
use crate::unify::overlaps;
use crate::Type;

/// Declaration conflicts, detected when a library is merged in.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeclError {
    #[error("overload id `{id}` of `{function}` is already declared by `{existing}`")]
    DuplicateOverloadId {
        id: String,
        function: String,
        existing: String,
    },
    #[error("overloads `{first}` and `{second}` of `{function}` are ambiguous for some argument types")]
    AmbiguousOverloads {
        function: String,
        first: String,
        second: String,
    },
    #[error("variable `{0}` is already declared")]
    DuplicateVariable(String),
}

/// Functions and variables visible to the checker.
#[derive(Clone, Debug, Default)]
pub struct Declarations {
    functions: FxHashMap<String, FunctionDecl>,
    /// Overload id to the name of the function that owns it.
    overload_owners: FxHashMap<String, String>,
    variables: FxHashMap<String, Type>,
}

impl Declarations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge `decl` into the function of the same name.
    ///
    /// Fails without modifying the registry when an overload id is already
    /// used anywhere, or when a new overload is ambiguous with an existing
    /// or sibling overload of the same function.
    pub fn declare_function(&mut self, decl: FunctionDecl) -> Result<(), DeclError> {
        let existing = self.functions.get(&decl.name).map_or(&[][..], |f| &f.overloads[..]);

        for (i, overload) in decl.overloads.iter().enumerate() {
            let earlier = decl.overloads[..i].iter().find(|o| o.id == overload.id);
            if let Some(owner) = self.overload_owners.get(&overload.id) {
                return Err(DeclError::DuplicateOverloadId {
                    id: overload.id.clone(),
                    function: decl.name.clone(),
                    existing: owner.clone(),
                });
            }
            if earlier.is_some() {
                return Err(DeclError::DuplicateOverloadId {
                    id: overload.id.clone(),
                    function: decl.name.clone(),
                    existing: decl.name.clone(),
                });
            }
            let clash = existing
                .iter()
                .chain(&decl.overloads[..i])
                .find(|other| ambiguous(other, overload));
            if let Some(other) = clash {
                return Err(DeclError::AmbiguousOverloads {
                    function: decl.name.clone(),
                    first: other.id.clone(),
                    second: overload.id.clone(),
                });
            }
        }

        tracing::trace!(function = %decl.name, overloads = decl.overloads.len(), "declared function");
        for overload in &decl.overloads {
            self.overload_owners
                .insert(overload.id.clone(), decl.name.clone());
        }
        match self.functions.get_mut(&decl.name) {
            Some(function) => function.overloads.extend(decl.overloads),
            None => {
                self.functions.insert(decl.name.clone(), decl);
            }
        }
        Ok(())
    }

    pub fn declare_variable(&mut self, name: impl Into<String>, ty: Type) -> Result<(), DeclError> {
        let name = name.into();
        if self.variables.contains_key(&name) {
            return Err(DeclError::DuplicateVariable(name));
        }
        self.variables.insert(name, ty);
        Ok(())
    }

    pub fn function(&self, name: &str) -> Option<&FunctionDecl> {
        self.functions.get(name)
    }

    pub fn variable(&self, name: &str) -> Option<&Type> {
        self.variables.get(name)
    }

    /// Find an overload by id.
    pub fn overload(&self, id: &str) -> Option<&Overload> {
        let owner = self.overload_owners.get(id)?;
        self.functions.get(owner)?.overload(id)
    }

    pub fn functions(&self) -> impl Iterator<Item = &FunctionDecl> {
        self.functions.values()
    }

    /// Every declared overload, in no particular order.
    pub fn overloads(&self) -> impl Iterator<Item = &Overload> {
        self.functions.values().flat_map(|f| f.overloads.iter())
    }
}

/// Two overloads of one function that some call could match both of.
fn ambiguous(a: &Overload, b: &Overload) -> bool {
    if a.kind != b.kind {
        return false;
    }
    let argc = a.params.len().max(b.params.len());
    if !a.accepts_arity(argc) || !b.accepts_arity(argc) {
        return false;
    }
    (0..argc).all(|i| match (a.param(i), b.param(i)) {
        (Some(x), Some(y)) => overlaps(x, y),
        _ => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::OverloadKind;
    use pretty_assertions::assert_eq;

    fn size_decl() -> FunctionDecl {
        FunctionDecl::new(
            "size",
            vec![
                Overload::global("size_string", vec![Type::String], Type::Int),
                Overload::global("size_list", vec![Type::list(Type::param("T"))], Type::Int),
            ],
        )
    }

    #[test]
    fn merges_by_name() {
        let mut decls = Declarations::new();
        decls.declare_function(size_decl()).unwrap();
        decls
            .declare_function(FunctionDecl::new(
                "size",
                vec![Overload::member("string_size", vec![Type::String], Type::Int)],
            ))
            .unwrap();
        assert_eq!(decls.function("size").unwrap().overloads.len(), 3);
        assert_eq!(decls.overload("string_size").unwrap().kind, OverloadKind::Member);
    }

    #[test]
    fn duplicate_id_across_functions() {
        let mut decls = Declarations::new();
        decls.declare_function(size_decl()).unwrap();
        let err = decls
            .declare_function(FunctionDecl::new(
                "length",
                vec![Overload::global("size_string", vec![Type::Bytes], Type::Int)],
            ))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "overload id `size_string` of `length` is already declared by `size`"
        );
        assert!(decls.function("length").is_none());
    }

    #[test]
    fn ambiguous_generic_overload_is_rejected() {
        let mut decls = Declarations::new();
        decls.declare_function(size_decl()).unwrap();
        let err = decls
            .declare_function(FunctionDecl::new(
                "size",
                vec![Overload::global("size_any", vec![Type::param("A")], Type::Int)],
            ))
            .unwrap_err();
        assert!(matches!(err, DeclError::AmbiguousOverloads { .. }));
    }

    #[test]
    fn different_kind_or_arity_is_not_ambiguous() {
        let mut decls = Declarations::new();
        decls
            .declare_function(FunctionDecl::new(
                "f",
                vec![
                    Overload::global("f_a", vec![Type::param("A")], Type::Int),
                    Overload::member("a_f", vec![Type::param("A")], Type::Int),
                    Overload::global("f_a_b", vec![Type::param("A"), Type::Int], Type::Int),
                ],
            ))
            .unwrap();
    }

    #[test]
    fn variadic_overlaps_fixed_arity() {
        let mut decls = Declarations::new();
        let err = decls
            .declare_function(FunctionDecl::new(
                "max",
                vec![
                    Overload::global("max_ints", vec![Type::Int], Type::Int).variadic(),
                    Overload::global("max_int_int", vec![Type::Int, Type::Int], Type::Int),
                ],
            ))
            .unwrap_err();
        assert_eq!(
            err,
            DeclError::AmbiguousOverloads {
                function: "max".into(),
                first: "max_ints".into(),
                second: "max_int_int".into(),
            }
        );
    }

    #[test]
    fn duplicate_variable() {
        let mut decls = Declarations::new();
        decls.declare_variable("x", Type::Int).unwrap();
        assert_eq!(
            decls.declare_variable("x", Type::String),
            Err(DeclError::DuplicateVariable("x".into()))
        );
    }
}
