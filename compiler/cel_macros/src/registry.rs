//! Macro table keyed by `(name, arity class)`.

use rustc_hash::FxHashMap;

use crate::{ArgCount, Macro, MacroKey, MacroStyle};

/// Failure to register a macro.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MacroError {
    #[error("macro `{0}` is already registered")]
    Duplicate(MacroKey),
}

/// Set of macros active for one environment.
///
/// Built once while the environment is assembled; read-only afterwards and
/// safe to share across concurrent parses.
#[derive(Clone, Debug, Default)]
pub struct MacroRegistry {
    macros: FxHashMap<MacroKey, Macro>,
}

impl MacroRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a macro; fails if one with the same identity is present.
    pub fn register(&mut self, mac: Macro) -> Result<(), MacroError> {
        let key = mac.key();
        if self.macros.contains_key(&key) {
            return Err(MacroError::Duplicate(key));
        }
        tracing::trace!(macro_key = %key, "registered macro");
        self.macros.insert(key, mac);
        Ok(())
    }

    /// Register every macro, stopping at the first collision.
    pub fn register_all(&mut self, macros: impl IntoIterator<Item = Macro>) -> Result<(), MacroError> {
        macros.into_iter().try_for_each(|m| self.register(m))
    }

    /// Find the macro for a call shape.
    ///
    /// Exact arity wins over variadic. A macro whose style differs from the
    /// call shape does not apply; when neither candidate matches the style
    /// the call is treated as ordinary.
    pub fn lookup(&self, name: &str, style: MacroStyle, argc: usize) -> Option<&Macro> {
        let with_style = |count: ArgCount| {
            self.macros
                .get(&MacroKey::new(name, count))
                .filter(|m| m.style() == style)
        };
        with_style(ArgCount::Fixed(argc)).or_else(|| with_style(ArgCount::Variadic))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Macro> {
        self.macros.values()
    }

    pub fn len(&self) -> usize {
        self.macros.len()
    }

    pub fn is_empty(&self) -> bool {
        self.macros.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn noop(name: &str, style: MacroStyle, arg_count: ArgCount) -> Macro {
        Macro::new(name, style, arg_count, |_, _, _| None)
    }

    #[test]
    fn duplicate_identity_is_rejected() {
        let mut registry = MacroRegistry::new();
        registry
            .register(noop("all", MacroStyle::Receiver, ArgCount::Fixed(2)))
            .unwrap();
        let err = registry
            .register(noop("all", MacroStyle::Global, ArgCount::Fixed(2)))
            .unwrap_err();
        assert_eq!(
            err,
            MacroError::Duplicate(MacroKey::new("all", ArgCount::Fixed(2)))
        );
        assert_eq!(err.to_string(), "macro `all/2` is already registered");
    }

    #[test]
    fn same_name_different_arity_coexist() {
        let mut registry = MacroRegistry::new();
        registry
            .register_all([
                noop("all", MacroStyle::Receiver, ArgCount::Fixed(2)),
                noop("all", MacroStyle::Receiver, ArgCount::Fixed(3)),
                noop("all", MacroStyle::Receiver, ArgCount::Variadic),
            ])
            .unwrap();
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn exact_arity_before_variadic() {
        let mut registry = MacroRegistry::new();
        registry
            .register_all([
                noop("greatest", MacroStyle::Receiver, ArgCount::Variadic),
                noop("greatest", MacroStyle::Receiver, ArgCount::Fixed(1)),
            ])
            .unwrap();

        let one = registry.lookup("greatest", MacroStyle::Receiver, 1).unwrap();
        assert_eq!(one.arg_count(), ArgCount::Fixed(1));
        let many = registry.lookup("greatest", MacroStyle::Receiver, 5).unwrap();
        assert_eq!(many.arg_count(), ArgCount::Variadic);
    }

    #[test]
    fn style_must_match() {
        let mut registry = MacroRegistry::new();
        registry
            .register(noop("has", MacroStyle::Global, ArgCount::Fixed(1)))
            .unwrap();
        assert!(registry.lookup("has", MacroStyle::Global, 1).is_some());
        assert!(registry.lookup("has", MacroStyle::Receiver, 1).is_none());
        assert!(registry.lookup("has", MacroStyle::Global, 2).is_none());
    }

    #[test]
    fn variadic_applies_when_fixed_arity_has_other_style() {
        let mut registry = MacroRegistry::new();
        registry
            .register_all([
                noop("least", MacroStyle::Global, ArgCount::Fixed(2)),
                noop("least", MacroStyle::Receiver, ArgCount::Variadic),
            ])
            .unwrap();

        let receiver = registry.lookup("least", MacroStyle::Receiver, 2).unwrap();
        assert_eq!(receiver.arg_count(), ArgCount::Variadic);
        let global = registry.lookup("least", MacroStyle::Global, 2).unwrap();
        assert_eq!(global.arg_count(), ArgCount::Fixed(2));
        assert!(registry.lookup("least", MacroStyle::Global, 3).is_none());
    }
}
