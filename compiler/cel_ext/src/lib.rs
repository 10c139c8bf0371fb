//! Versioned extension libraries.
//!
//! Every library is a [`Library`]: an ordered list of [`Feature`]s, each
//! bundling the declarations, native bindings and macros behind one public
//! name. An environment selects a version (and optionally a subset of
//! features) with [`feature_set`] and merges the result into its registries.
//!
//! Built-in libraries:
//!
//! | name | latest | |
//! |---|---|---|
//! | `std` | 0 | operators, conversions, `size`, standard macros |
//! | `math` | 2 | `math.greatest`/`least`, rounding, bit operations, `sqrt` |
//! | `sets` | 0 | `sets.contains`, `equivalent`, `intersects` |
//! | `lists` | 2 | `slice`, `flatten`, `lists.range`, sorting |
//! | `strings` | 2 | character and substring operations |
//! | `bindings` | 0 | `cel.bind` |
//! | `comprehensions` | 0 | two-variable folds, `transformList`/`Map`/`MapEntry` |
//! | `optional` | 1 | optional values, `.?` and `[?]` |

mod args;
mod bindings;
mod comprehensions;
mod library;
mod lists;
mod math;
mod optional;
mod params;
mod sets;
mod stdlib;
mod strings;

#[cfg(test)]
mod test_helpers;

use std::sync::Arc;

pub use bindings::BindingsLib;
pub use comprehensions::ComprehensionsLib;
pub use library::{
    feature_set, impls_for_all_reprs, Feature, FeatureSet, FunctionDef, Library, LibraryError,
};
pub use lists::ListsLib;
pub use math::MathLib;
pub use optional::OptionalLib;
pub use sets::SetsLib;
pub use stdlib::StdLib;
pub use strings::StringsLib;

/// Every built-in library, `std` first.
pub fn builtin_libraries() -> Vec<Arc<dyn Library>> {
    vec![
        Arc::new(StdLib),
        Arc::new(MathLib),
        Arc::new(SetsLib),
        Arc::new(ListsLib),
        Arc::new(StringsLib),
        Arc::new(BindingsLib),
        Arc::new(ComprehensionsLib),
        Arc::new(OptionalLib),
    ]
}

/// The built-in library called `name`.
pub fn builtin_library(name: &str) -> Option<Arc<dyn Library>> {
    builtin_libraries().into_iter().find(|lib| lib.name() == name)
}
