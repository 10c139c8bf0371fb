//! Native representation tags and native bindings.
//!
//! Every runtime representation a value can have is enumerated up front in
//! [`NativeTag`]. A [`NativeBinding`] declares, per argument position, the
//! tag it expects; the dispatcher picks bindings by comparing those tags to
//! the tags of the evaluated arguments, never by inspecting values further.

use std::fmt;
use std::sync::Arc;

use cel_types::Type;
use smallvec::SmallVec;

use crate::errors::{integer_overflow, invalid_argument, EvalError, EvalResult};
use crate::numeric::NumericComparator;
use crate::value::Value;

/// Runtime representation of a value.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum NativeTag {
    Null,
    Bool,
    Int,
    Uint,
    Double,
    String,
    Bytes,
    List,
    Map,
    Optional,
    /// Matches every representation.
    Any,
}

impl NativeTag {
    /// Whether a value with representation `actual` satisfies this tag.
    #[inline]
    pub fn accepts(self, actual: NativeTag) -> bool {
        self == NativeTag::Any || self == actual
    }

    /// Tag that values of the declared type `ty` carry at runtime under
    /// `repr`. Types that do not fix one representation realise as `Any`.
    pub fn realizing(ty: &Type, repr: UintRepr) -> NativeTag {
        match ty {
            Type::Null => NativeTag::Null,
            Type::Bool => NativeTag::Bool,
            Type::Int => NativeTag::Int,
            Type::Uint => match repr {
                UintRepr::Lossless => NativeTag::Uint,
                UintRepr::Signed => NativeTag::Int,
            },
            Type::Double => NativeTag::Double,
            Type::String => NativeTag::String,
            Type::Bytes => NativeTag::Bytes,
            Type::List(_) => NativeTag::List,
            Type::Map(..) => NativeTag::Map,
            Type::Optional(_) => NativeTag::Optional,
            Type::Dyn | Type::TypeParam(_) | Type::Error => NativeTag::Any,
        }
    }
}

impl fmt::Display for NativeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NativeTag::Null => "null",
            NativeTag::Bool => "bool",
            NativeTag::Int => "i64",
            NativeTag::Uint => "u64",
            NativeTag::Double => "f64",
            NativeTag::String => "string",
            NativeTag::Bytes => "bytes",
            NativeTag::List => "list",
            NativeTag::Map => "map",
            NativeTag::Optional => "optional",
            NativeTag::Any => "any",
        };
        f.write_str(name)
    }
}

/// How the declared `uint` type is represented at runtime.
///
/// Host-wide: chosen once per environment.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum UintRepr {
    /// `uint` values are `Value::Uint` and cover the full `u64` range.
    #[default]
    Lossless,
    /// `uint` values are non-negative `Value::Int`s; anything above
    /// `i64::MAX` is an overflow.
    Signed,
}

impl UintRepr {
    pub const ALL: [UintRepr; 2] = [UintRepr::Lossless, UintRepr::Signed];
}

/// Native implementation signature.
pub type NativeFn = Arc<dyn Fn(&CallContext<'_>, &[Value]) -> EvalResult + Send + Sync>;

/// Native implementation that owns its arguments.
pub type ConsumingFn = Arc<dyn Fn(&CallContext<'_>, Vec<Value>) -> EvalResult + Send + Sync>;

/// One native implementation of an overload for one argument representation.
#[derive(Clone)]
pub struct NativeBinding {
    pub overload_id: String,
    pub tags: SmallVec<[NativeTag; 4]>,
    /// The last tag repeats.
    pub variadic: bool,
    /// Configuration this binding is restricted to; `None` applies under
    /// every [`UintRepr`].
    pub repr: Option<UintRepr>,
    pub func: NativeFn,
    /// Preferred over `func` when the caller can give up its arguments.
    pub consume: Option<ConsumingFn>,
}

impl NativeBinding {
    pub fn new(
        overload_id: impl Into<String>,
        tags: impl IntoIterator<Item = NativeTag>,
        func: impl Fn(&CallContext<'_>, &[Value]) -> EvalResult + Send + Sync + 'static,
    ) -> Self {
        NativeBinding {
            overload_id: overload_id.into(),
            tags: tags.into_iter().collect(),
            variadic: false,
            repr: None,
            func: Arc::new(func),
            consume: None,
        }
    }

    /// A binding that takes its arguments by value, so it can update an
    /// argument in place when it holds the only reference to it.
    pub fn consuming(
        overload_id: impl Into<String>,
        tags: impl IntoIterator<Item = NativeTag>,
        func: impl Fn(&CallContext<'_>, Vec<Value>) -> EvalResult + Send + Sync + 'static,
    ) -> Self {
        let consume: ConsumingFn = Arc::new(func);
        let borrowed = Arc::clone(&consume);
        NativeBinding {
            consume: Some(consume),
            ..NativeBinding::new(overload_id, tags, move |ctx, args| {
                borrowed(ctx, args.to_vec())
            })
        }
    }

    /// Invoke with owned arguments.
    pub fn call(&self, ctx: &CallContext<'_>, args: Vec<Value>) -> EvalResult {
        match &self.consume {
            Some(consume) => consume(ctx, args),
            None => (self.func)(ctx, &args),
        }
    }

    #[must_use]
    pub fn variadic(mut self) -> Self {
        self.variadic = true;
        self
    }

    /// Restrict the binding to environments configured with `repr`.
    #[must_use]
    pub fn under(mut self, repr: UintRepr) -> Self {
        self.repr = Some(repr);
        self
    }

    #[inline]
    pub fn applies(&self, repr: UintRepr) -> bool {
        self.repr.map_or(true, |r| r == repr)
    }

    fn tag_at(&self, index: usize) -> Option<NativeTag> {
        match self.tags.get(index) {
            Some(tag) => Some(*tag),
            None if self.variadic => self.tags.last().copied(),
            None => None,
        }
    }

    fn accepts_arity(&self, argc: usize) -> bool {
        if self.variadic {
            argc >= self.tags.len()
        } else {
            argc == self.tags.len()
        }
    }

    /// Whether every argument's representation matches this binding.
    pub fn accepts(&self, args: &[Value]) -> bool {
        self.accepts_arity(args.len())
            && args
                .iter()
                .enumerate()
                .all(|(i, arg)| self.tag_at(i).is_some_and(|tag| tag.accepts(arg.tag())))
    }

    /// Whether this binding accepts every value whose representations are
    /// `realized`.
    pub fn covers(&self, realized: &[NativeTag]) -> bool {
        self.accepts_arity(realized.len())
            && realized
                .iter()
                .enumerate()
                .all(|(i, &actual)| self.tag_at(i).is_some_and(|tag| tag.accepts(actual)))
    }
}

impl fmt::Debug for NativeBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeBinding")
            .field("overload_id", &self.overload_id)
            .field("tags", &self.tags)
            .field("variadic", &self.variadic)
            .field("repr", &self.repr)
            .field("consuming", &self.consume.is_some())
            .finish_non_exhaustive()
    }
}

/// What a native binding may consult besides its arguments.
#[derive(Copy, Clone)]
pub struct CallContext<'a> {
    repr: UintRepr,
    comparator: &'a NumericComparator,
}

impl<'a> CallContext<'a> {
    pub fn new(repr: UintRepr, comparator: &'a NumericComparator) -> Self {
        CallContext { repr, comparator }
    }

    pub fn repr(&self) -> UintRepr {
        self.repr
    }

    pub fn comparator(&self) -> &'a NumericComparator {
        self.comparator
    }

    /// An unsigned result in the active representation.
    pub fn uint(&self, value: u64) -> EvalResult {
        match self.repr {
            UintRepr::Lossless => Ok(Value::Uint(value)),
            UintRepr::Signed => i64::try_from(value)
                .map(Value::Int)
                .map_err(|_| integer_overflow("unsigned representation")),
        }
    }

    /// Read an unsigned argument in either representation.
    pub fn as_uint(&self, value: &Value) -> Result<u64, EvalError> {
        match value {
            Value::Uint(u) => Ok(*u),
            Value::Int(i) if self.repr == UintRepr::Signed => u64::try_from(*i)
                .map_err(|_| invalid_argument(format!("expected an unsigned value, got {i}"))),
            other => Err(invalid_argument(format!(
                "expected an unsigned value, got {}",
                other.type_name()
            ))),
        }
    }
}
