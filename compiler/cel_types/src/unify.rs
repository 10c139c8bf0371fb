//! Formal/actual unification for overload resolution.
//!
//! Each candidate overload gets a fresh [`Substitution`]. Unifying a formal
//! parameter type against an actual argument type either succeeds (possibly
//! binding type parameters) or fails the candidate:
//!
//! - an actual `dyn` or `error` always unifies; type parameters it meets are
//!   bound to `dyn` if still free
//! - a free type parameter binds to the actual type on first use
//! - a bound type parameter unifies as the type it is bound to
//! - a formal `dyn` accepts anything
//! - constructors unify component-wise; everything else must be equal

use rustc_hash::FxHashMap;

use crate::Type;

/// Type parameter bindings for one candidate overload.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Substitution {
    bindings: FxHashMap<String, Type>,
}

impl Substitution {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, param: &str) -> Option<&Type> {
        self.bindings.get(param)
    }

    /// Unify `formal` with `actual`, extending the bindings.
    ///
    /// On failure the substitution may hold partial bindings; the candidate
    /// is discarded anyway.
    pub fn unify(&mut self, formal: &Type, actual: &Type) -> bool {
        if actual.is_dyn_like() {
            self.bind_free(formal);
            return true;
        }
        match (formal, actual) {
            (Type::TypeParam(name), _) => match self.bindings.get(name).cloned() {
                Some(bound) => self.unify(&bound, actual),
                None => {
                    self.bindings.insert(name.clone(), actual.clone());
                    true
                }
            },
            (Type::Dyn, _) => true,
            (Type::List(f), Type::List(a)) | (Type::Optional(f), Type::Optional(a)) => {
                self.unify(f, a)
            }
            (Type::Map(fk, fv), Type::Map(ak, av)) => self.unify(fk, ak) && self.unify(fv, av),
            _ => formal == actual,
        }
    }

    /// Replace bound parameters; parameters left free become `dyn`.
    pub fn apply(&self, ty: &Type) -> Type {
        match ty {
            Type::TypeParam(name) => self.bindings.get(name).cloned().unwrap_or(Type::Dyn),
            Type::List(elem) => Type::list(self.apply(elem)),
            Type::Optional(inner) => Type::optional(self.apply(inner)),
            Type::Map(key, value) => Type::map(self.apply(key), self.apply(value)),
            other => other.clone(),
        }
    }

    fn bind_free(&mut self, formal: &Type) {
        match formal {
            Type::TypeParam(name) => {
                self.bindings.entry(name.clone()).or_insert(Type::Dyn);
            }
            Type::List(inner) | Type::Optional(inner) => self.bind_free(inner),
            Type::Map(key, value) => {
                self.bind_free(key);
                self.bind_free(value);
            }
            _ => {}
        }
    }
}

/// Whether some concrete type satisfies both `a` and `b`.
///
/// Used at declaration time to reject overload sets that would make a call
/// ambiguous. Type parameters and `dyn` overlap with anything.
pub fn overlaps(a: &Type, b: &Type) -> bool {
    match (a, b) {
        (Type::TypeParam(_) | Type::Dyn | Type::Error, _)
        | (_, Type::TypeParam(_) | Type::Dyn | Type::Error) => true,
        (Type::List(x), Type::List(y)) | (Type::Optional(x), Type::Optional(y)) => overlaps(x, y),
        (Type::Map(xk, xv), Type::Map(yk, yv)) => overlaps(xk, yk) && overlaps(xv, yv),
        _ => a == b,
    }
}
