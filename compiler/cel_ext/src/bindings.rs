//! The `bindings` library: `cel.bind(name, init, result)`.

use cel_macros::lowering::{bind, finish, in_namespace, simple_name};
use cel_macros::Macro;

use crate::{Feature, Library};

/// `bindings`, version 0.
#[derive(Copy, Clone, Debug, Default)]
pub struct BindingsLib;

impl Library for BindingsLib {
    fn name(&self) -> &str {
        "bindings"
    }

    fn features(&self) -> Vec<Feature> {
        vec![Feature::new("cel.bind", 0).with_macros([bind_macro()])]
    }
}

/// `cel.bind(x, init, result)` evaluates `init` once and `result` with `x`
/// bound to it. Any receiver other than `cel` is an ordinary call.
fn bind_macro() -> Macro {
    Macro::receiver("bind", 3, |f, target, args| {
        if !in_namespace(f, target, "cel") {
            return None;
        }
        finish(simple_name(f, args[0]).map(|name| bind(f, &name, args[1], args[2])))
    })
}
