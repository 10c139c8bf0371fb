//! Native binding dispatch.

use cel_types::{CallReference, Overload};
use rustc_hash::FxHashMap;

use crate::errors::{missing_binding, no_matching_overload, EvalError, EvalResult};
use crate::native::{CallContext, NativeBinding, NativeTag, UintRepr};
use crate::value::Value;

/// Per overload id, the ordered list of native bindings.
///
/// Filled once while an environment is assembled; read-only afterwards.
#[derive(Debug, Default)]
pub struct Dispatcher {
    bindings: FxHashMap<String, Vec<NativeBinding>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a binding; earlier bindings take precedence.
    pub fn register(&mut self, binding: NativeBinding) {
        self.bindings
            .entry(binding.overload_id.clone())
            .or_default()
            .push(binding);
    }

    pub fn bindings(&self, overload_id: &str) -> &[NativeBinding] {
        self.bindings.get(overload_id).map_or(&[][..], Vec::as_slice)
    }

    /// Whether some binding applicable under `repr` accepts every value
    /// `overload` admits.
    pub fn covers(&self, overload: &Overload, repr: UintRepr) -> bool {
        let realized: Vec<NativeTag> = overload
            .params
            .iter()
            .map(|ty| NativeTag::realizing(ty, repr))
            .collect();
        self.bindings(&overload.id)
            .iter()
            .any(|b| b.applies(repr) && b.covers(&realized))
    }

    /// Invoke the first binding, over the reference's candidates in order,
    /// that applies under the active [`UintRepr`] and accepts the
    /// arguments' representations.
    ///
    /// Binding errors propagate unchanged. When nothing matches, an exactly
    /// resolved call is a fatal [`MissingBinding`]; a call resolved through
    /// `dyn` arguments is an ordinary no-matching-overload error.
    ///
    /// [`MissingBinding`]: crate::EvalErrorKind::MissingBinding
    pub fn dispatch(
        &self,
        ctx: &CallContext<'_>,
        reference: &CallReference,
        args: &[Value],
    ) -> EvalResult {
        let binding = self.select(ctx.repr(), reference, args)?;
        (binding.func)(ctx, args)
    }

    /// Like [`dispatch`](Self::dispatch), handing the arguments to a
    /// consuming binding by value.
    pub fn dispatch_owned(
        &self,
        ctx: &CallContext<'_>,
        reference: &CallReference,
        args: Vec<Value>,
    ) -> EvalResult {
        self.select(ctx.repr(), reference, &args)?.call(ctx, args)
    }

    fn select(
        &self,
        repr: UintRepr,
        reference: &CallReference,
        args: &[Value],
    ) -> Result<&NativeBinding, EvalError> {
        for id in &reference.overload_ids {
            let mut applicable = self.bindings(id).iter().filter(|b| b.applies(repr));
            if let Some(binding) = applicable.find(|b| b.accepts(args)) {
                tracing::trace!(function = %reference.function, overload = %id, "dispatch");
                return Ok(binding);
            }
        }
        match reference.overload_ids.first() {
            Some(id) if reference.exact => {
                tracing::error!(overload = %id, "no native binding for runtime representation");
                Err(missing_binding(id, args))
            }
            _ => Err(no_matching_overload(&reference.function, args)),
        }
    }
}
