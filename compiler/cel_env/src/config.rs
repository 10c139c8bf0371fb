//! Environment configuration.

use std::sync::Arc;

use cel_eval::UintRepr;
use cel_ext::Library;
use cel_types::Type;
use rustc_hash::FxHashSet;

/// One library to enable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LibraryConfig {
    pub name: String,
    /// `None` selects the latest version.
    pub version: Option<u32>,
    /// Public names of the functions and macros to enable; `None` enables
    /// all of them.
    pub enabled_functions: Option<FxHashSet<String>>,
}

impl LibraryConfig {
    /// The latest version of `name`, in full.
    pub fn new(name: impl Into<String>) -> Self {
        LibraryConfig {
            name: name.into(),
            version: None,
            enabled_functions: None,
        }
    }

    #[must_use]
    pub fn version(mut self, version: u32) -> Self {
        self.version = Some(version);
        self
    }

    #[must_use]
    pub fn only<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enabled_functions = Some(names.into_iter().map(Into::into).collect());
        self
    }
}

/// Everything [`crate::Env::new`] needs.
///
/// `std` is always enabled and always first; listing it explicitly only
/// selects its version or a subset.
#[derive(Clone, Default)]
pub struct EnvConfig {
    pub libraries: Vec<LibraryConfig>,
    /// Host libraries, selectable by name in `libraries`. They shadow
    /// built-in libraries of the same name.
    pub custom_libraries: Vec<Arc<dyn Library>>,
    pub variables: Vec<(String, Type)>,
    pub uint_repr: UintRepr,
}

impl EnvConfig {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn library(mut self, library: LibraryConfig) -> Self {
        self.libraries.push(library);
        self
    }

    /// Register `library` and enable its latest version.
    #[must_use]
    pub fn custom_library(mut self, library: Arc<dyn Library>) -> Self {
        self.libraries.push(LibraryConfig::new(library.name()));
        self.custom_libraries.push(library);
        self
    }

    #[must_use]
    pub fn variable(mut self, name: impl Into<String>, ty: Type) -> Self {
        self.variables.push((name.into(), ty));
        self
    }

    #[must_use]
    pub fn uint_repr(mut self, repr: UintRepr) -> Self {
        self.uint_repr = repr;
        self
    }
}

impl std::fmt::Debug for EnvConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let custom: Vec<&str> = self.custom_libraries.iter().map(|l| l.name()).collect();
        f.debug_struct("EnvConfig")
            .field("libraries", &self.libraries)
            .field("custom_libraries", &custom)
            .field("variables", &self.variables)
            .field("uint_repr", &self.uint_repr)
            .finish()
    }
}
