//! Library, feature and versioning model.
//!
//! A library is an ordered list of [`Feature`]s, each introduced at some
//! version. Version `N` of a library is every feature with `since <= N`, so
//! later versions only ever add overload ids. Function subsetting selects
//! features by their public name.

use std::sync::Arc;

use cel_eval::{CallContext, EvalResult, NativeBinding, NativeFn, NativeTag, UintRepr, Value};
use cel_macros::Macro;
use cel_types::{FunctionDecl, Overload};
use rustc_hash::FxHashSet;

/// A declared function together with its native bindings.
#[derive(Clone, Debug)]
pub struct FunctionDef {
    pub decl: FunctionDecl,
    pub bindings: Vec<NativeBinding>,
    /// Evaluated by the interpreter itself; has no bindings.
    pub intrinsic: bool,
}

impl FunctionDef {
    pub fn new(name: impl Into<String>) -> Self {
        FunctionDef {
            decl: FunctionDecl::new(name, Vec::new()),
            bindings: Vec::new(),
            intrinsic: false,
        }
    }

    pub fn intrinsic(name: impl Into<String>, overloads: Vec<Overload>) -> Self {
        FunctionDef {
            decl: FunctionDecl::new(name, overloads),
            bindings: Vec::new(),
            intrinsic: true,
        }
    }

    /// Add `overload`, implemented by `func` under every [`UintRepr`].
    #[must_use]
    pub fn overload(
        self,
        overload: Overload,
        func: impl Fn(&CallContext<'_>, &[Value]) -> EvalResult + Send + Sync + 'static,
    ) -> Self {
        let bindings = impls_for_all_reprs(&overload, func);
        self.overload_with(overload, bindings)
    }

    /// Add `overload` with explicitly constructed bindings.
    #[must_use]
    pub fn overload_with(
        mut self,
        overload: Overload,
        bindings: impl IntoIterator<Item = NativeBinding>,
    ) -> Self {
        self.bindings.extend(bindings);
        self.decl.overloads.push(overload);
        self
    }

    pub fn name(&self) -> &str {
        &self.decl.name
    }
}

/// Bindings implementing `overload` with `func` under every [`UintRepr`].
///
/// When the overload's parameters realise to the same tags under both
/// representations a single unrestricted binding is produced; otherwise one
/// binding per representation, each restricted to its configuration.
/// `func` must read unsigned arguments with [`CallContext::as_uint`] and
/// build unsigned results with [`CallContext::uint`].
pub fn impls_for_all_reprs(
    overload: &Overload,
    func: impl Fn(&CallContext<'_>, &[Value]) -> EvalResult + Send + Sync + 'static,
) -> Vec<NativeBinding> {
    let func: NativeFn = Arc::new(func);
    let realized: Vec<(UintRepr, Vec<NativeTag>)> = UintRepr::ALL
        .iter()
        .map(|&repr| {
            let tags = overload
                .params
                .iter()
                .map(|ty| NativeTag::realizing(ty, repr))
                .collect();
            (repr, tags)
        })
        .collect();

    let uniform = realized.windows(2).all(|w| w[0].1 == w[1].1);
    let make = |tags: Vec<NativeTag>| {
        let func = Arc::clone(&func);
        let binding = NativeBinding::new(overload.id.clone(), tags, move |ctx, args| func(ctx, args));
        if overload.variadic {
            binding.variadic()
        } else {
            binding
        }
    };
    if uniform {
        realized
            .into_iter()
            .next()
            .map(|(_, tags)| make(tags))
            .into_iter()
            .collect()
    } else {
        realized
            .into_iter()
            .map(|(repr, tags)| make(tags).under(repr))
            .collect()
    }
}

/// Unit of versioning and subsetting.
#[derive(Clone, Debug)]
pub struct Feature {
    /// Public name used for subsetting, e.g. `math.greatest` or `charAt`.
    pub name: String,
    /// First library version that includes this feature.
    pub since: u32,
    pub functions: Vec<FunctionDef>,
    pub macros: Vec<Macro>,
}

impl Feature {
    pub fn new(name: impl Into<String>, since: u32) -> Self {
        Feature {
            name: name.into(),
            since,
            functions: Vec::new(),
            macros: Vec::new(),
        }
    }

    #[must_use]
    pub fn function(mut self, function: FunctionDef) -> Self {
        self.functions.push(function);
        self
    }

    #[must_use]
    pub fn with_macros(mut self, macros: impl IntoIterator<Item = Macro>) -> Self {
        self.macros.extend(macros);
        self
    }
}

/// A named, versioned bundle of functions and macros.
pub trait Library: Send + Sync {
    fn name(&self) -> &str;

    /// Every feature of every version, in registration order.
    fn features(&self) -> Vec<Feature>;

    fn latest_version(&self) -> u32 {
        self.features().iter().map(|f| f.since).max().unwrap_or(0)
    }
}

/// Library configuration failure.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum LibraryError {
    #[error("library `{library}` has no version {version} (latest is {latest})")]
    UnknownVersion {
        library: String,
        version: u32,
        latest: u32,
    },
    #[error("library `{library}` version {version} has no function or macro named `{name}`")]
    UnknownFeature {
        library: String,
        version: u32,
        name: String,
    },
    #[error("unknown library `{0}`")]
    UnknownLibrary(String),
}

/// What one library contributes to an environment.
#[derive(Clone, Debug)]
pub struct FeatureSet {
    pub library: String,
    pub version: u32,
    pub functions: Vec<FunctionDef>,
    pub macros: Vec<Macro>,
}

impl FeatureSet {
    pub fn overload_ids(&self) -> impl Iterator<Item = &str> {
        self.functions
            .iter()
            .flat_map(|f| f.decl.overloads.iter().map(|o| o.id.as_str()))
    }
}

/// Accumulate the features of `library` through `version` (latest when
/// `None`), keeping only the features named in `enabled` when given.
///
/// Functions shared by several features are included once.
pub fn feature_set(
    library: &dyn Library,
    version: Option<u32>,
    enabled: Option<&FxHashSet<String>>,
) -> Result<FeatureSet, LibraryError> {
    let name = library.name().to_owned();
    let latest = library.latest_version();
    let version = version.unwrap_or(latest);
    if version > latest {
        return Err(LibraryError::UnknownVersion {
            library: name,
            version,
            latest,
        });
    }

    let available: Vec<Feature> = library
        .features()
        .into_iter()
        .filter(|f| f.since <= version)
        .collect();
    if let Some(enabled) = enabled {
        let mut missing: Vec<&String> = enabled
            .iter()
            .filter(|n| !available.iter().any(|f| &f.name == *n))
            .collect();
        missing.sort();
        if let Some(unknown) = missing.first() {
            return Err(LibraryError::UnknownFeature {
                library: name,
                version,
                name: (*unknown).clone(),
            });
        }
    }

    let mut set = FeatureSet {
        library: name,
        version,
        functions: Vec::new(),
        macros: Vec::new(),
    };
    let mut seen: FxHashSet<String> = FxHashSet::default();
    for feature in available {
        if enabled.is_some_and(|e| !e.contains(&feature.name)) {
            continue;
        }
        for function in feature.functions {
            let ids: Vec<&String> = function.decl.overloads.iter().map(|o| &o.id).collect();
            if !ids.is_empty() && ids.iter().all(|id| seen.contains(*id)) {
                continue;
            }
            seen.extend(ids.into_iter().cloned());
            set.functions.push(function);
        }
        set.macros.extend(feature.macros);
    }
    tracing::debug!(
        library = %set.library,
        version = set.version,
        functions = set.functions.len(),
        macros = set.macros.len(),
        "selected features"
    );
    Ok(set)
}
