//! Environment assembly.

use std::sync::Arc;

use cel_eval::{is_intrinsic, Dispatcher, UintRepr};
use cel_ext::{builtin_library, feature_set, FeatureSet, Library, LibraryError};
use cel_macros::{MacroError, MacroRegistry};
use cel_parse::{parse, ParseOutput};
use cel_types::{DeclError, Declarations};
use rustc_hash::FxHashSet;

use crate::config::{EnvConfig, LibraryConfig};
use crate::program::{CompileError, Program};

const STD: &str = "std";

/// Environment construction failure. Reported once, naming the offending
/// library and identifiers.
#[derive(Debug, thiserror::Error)]
pub enum EnvError {
    #[error(transparent)]
    Library(#[from] LibraryError),
    #[error("library `{0}` is configured more than once")]
    DuplicateLibrary(String),
    #[error("library `{library}`: {source}")]
    Macro {
        library: String,
        #[source]
        source: MacroError,
    },
    #[error("library `{library}`: {source}")]
    Declaration {
        library: String,
        #[source]
        source: DeclError,
    },
    #[error(transparent)]
    Variable(DeclError),
    #[error(
        "library `{library}`: overload `{overload_id}` of `{function}` has no native binding \
         for its {repr:?} representation"
    )]
    MissingBinding {
        library: String,
        function: String,
        overload_id: String,
        repr: UintRepr,
    },
    #[error(
        "library `{library}`: `{function}` is not evaluated by the interpreter and needs \
         native bindings"
    )]
    UnknownIntrinsic { library: String, function: String },
}

/// Registries of one environment; immutable once built.
#[derive(Debug)]
pub(crate) struct Registries {
    pub(crate) macros: MacroRegistry,
    pub(crate) decls: Declarations,
    pub(crate) dispatcher: Dispatcher,
    pub(crate) repr: UintRepr,
}

/// A configured environment. Cheap to clone; clones share registries.
#[derive(Clone, Debug)]
pub struct Env {
    registries: Arc<Registries>,
    libraries: Arc<[(String, u32)]>,
}

impl Env {
    /// Assemble an environment from `config`.
    ///
    /// Libraries are resolved (host libraries first, then built-ins) and
    /// merged in order, `std` first. Every overload that is not evaluated
    /// by the interpreter itself must have a native binding for each
    /// argument representation `config.uint_repr` can produce.
    #[tracing::instrument(level = "debug", skip_all, fields(repr = ?config.uint_repr))]
    pub fn new(config: EnvConfig) -> Result<Env, EnvError> {
        let mut registries = Registries {
            macros: MacroRegistry::new(),
            decls: Declarations::new(),
            dispatcher: Dispatcher::new(),
            repr: config.uint_repr,
        };
        let mut libraries = Vec::new();
        for (library, library_config) in resolve(&config)? {
            let set = feature_set(
                library.as_ref(),
                library_config.version,
                library_config.enabled_functions.as_ref(),
            )?;
            libraries.push((set.library.clone(), set.version));
            merge(&mut registries, set)?;
        }
        for (name, ty) in config.variables {
            registries
                .decls
                .declare_variable(name, ty)
                .map_err(EnvError::Variable)?;
        }
        tracing::debug!(
            libraries = libraries.len(),
            macros = registries.macros.len(),
            "environment ready"
        );
        Ok(Env {
            registries: Arc::new(registries),
            libraries: libraries.into(),
        })
    }

    /// The standard library alone.
    pub fn standard() -> Result<Env, EnvError> {
        Env::new(EnvConfig::default())
    }

    /// Parse `source`, expanding macros. Nothing is checked.
    pub fn parse(&self, source: &str) -> ParseOutput {
        parse(source, &self.registries.macros)
    }

    /// Parse, expand and check `source`.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn compile(&self, source: &str) -> Result<Program, CompileError> {
        Program::compile(Arc::clone(&self.registries), source)
    }

    /// Libraries in registration order, with the version selected.
    pub fn libraries(&self) -> &[(String, u32)] {
        &self.libraries
    }

    pub fn declarations(&self) -> &Declarations {
        &self.registries.decls
    }

    pub fn macros(&self) -> &MacroRegistry {
        &self.registries.macros
    }

    pub fn uint_repr(&self) -> UintRepr {
        self.registries.repr
    }
}

/// Pair each configured library with its definition, `std` first.
fn resolve(config: &EnvConfig) -> Result<Vec<(Arc<dyn Library>, LibraryConfig)>, EnvError> {
    let mut seen = FxHashSet::default();
    for library in &config.libraries {
        if !seen.insert(library.name.as_str()) {
            return Err(EnvError::DuplicateLibrary(library.name.clone()));
        }
    }

    let std_config = config
        .libraries
        .iter()
        .find(|l| l.name == STD)
        .cloned()
        .unwrap_or_else(|| LibraryConfig::new(STD));
    let ordered = std::iter::once(std_config)
        .chain(config.libraries.iter().filter(|l| l.name != STD).cloned());

    let mut resolved = Vec::new();
    for library_config in ordered {
        let library = config
            .custom_libraries
            .iter()
            .find(|l| l.name() == library_config.name)
            .cloned()
            .or_else(|| builtin_library(&library_config.name))
            .ok_or_else(|| LibraryError::UnknownLibrary(library_config.name.clone()))?;
        resolved.push((library, library_config));
    }
    Ok(resolved)
}

/// Register one library's macros, declarations and bindings, then confirm
/// every overload it declares can be dispatched.
fn merge(registries: &mut Registries, set: FeatureSet) -> Result<(), EnvError> {
    let library = set.library;
    registries
        .macros
        .register_all(set.macros)
        .map_err(|source| EnvError::Macro {
            library: library.clone(),
            source,
        })?;

    let mut dispatched = Vec::new();
    for function in set.functions {
        if function.intrinsic && !is_intrinsic(&function.decl.name) {
            tracing::error!(%library, function = %function.decl.name, "unknown intrinsic");
            return Err(EnvError::UnknownIntrinsic {
                library,
                function: function.decl.name,
            });
        }
        if !function.intrinsic {
            let name = &function.decl.name;
            dispatched.extend(
                function
                    .decl
                    .overloads
                    .iter()
                    .map(|overload| (name.clone(), overload.clone())),
            );
        }
        for binding in function.bindings {
            registries.dispatcher.register(binding);
        }
        registries
            .decls
            .declare_function(function.decl)
            .map_err(|source| EnvError::Declaration {
                library: library.clone(),
                source,
            })?;
    }

    let repr = registries.repr;
    if let Some((function, overload)) = dispatched
        .into_iter()
        .find(|(_, overload)| !registries.dispatcher.covers(overload, repr))
    {
        tracing::error!(%library, overload = %overload.id, "missing native binding");
        return Err(EnvError::MissingBinding {
            library,
            function,
            overload_id: overload.id,
            repr,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn env_and_program_are_shareable() {
        assert_send_sync::<Env>();
        assert_send_sync::<Program>();
    }

    #[test]
    fn std_is_always_first() {
        let config = EnvConfig::new().library(LibraryConfig::new("math").version(1));
        let env = Env::new(config).unwrap();
        assert_eq!(
            env.libraries(),
            [("std".to_owned(), 0), ("math".to_owned(), 1)]
        );
    }

    #[test]
    fn duplicate_library_is_rejected() {
        let config = EnvConfig::new()
            .library(LibraryConfig::new("sets"))
            .library(LibraryConfig::new("sets"));
        assert!(matches!(
            Env::new(config),
            Err(EnvError::DuplicateLibrary(name)) if name == "sets"
        ));
    }

    #[test]
    fn unknown_library_is_rejected() {
        let config = EnvConfig::new().library(LibraryConfig::new("nope"));
        assert!(matches!(
            Env::new(config),
            Err(EnvError::Library(LibraryError::UnknownLibrary(name))) if name == "nope"
        ));
    }

    #[test]
    fn duplicate_variable_is_rejected() {
        let config = EnvConfig::new()
            .variable("x", cel_types::Type::Int)
            .variable("x", cel_types::Type::String);
        assert!(matches!(
            Env::new(config),
            Err(EnvError::Variable(DeclError::DuplicateVariable(name))) if name == "x"
        ));
    }
}
