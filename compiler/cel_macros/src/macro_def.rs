use std::fmt;
use std::sync::Arc;

use cel_ir::{ExprFactory, ExprId};

/// Whether a macro applies to `name(args)` or `target.name(args)`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum MacroStyle {
    Global,
    Receiver,
}

/// Arity class of a macro.
///
/// `Variadic` macros match any argument count that has no fixed-arity macro
/// of the same name and style; the expander validates the count itself.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ArgCount {
    Fixed(usize),
    Variadic,
}

impl fmt::Display for ArgCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgCount::Fixed(n) => write!(f, "{n}"),
            ArgCount::Variadic => write!(f, "variadic"),
        }
    }
}

/// Identity of a macro: two macros with equal keys conflict.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MacroKey {
    pub name: String,
    pub arg_count: ArgCount,
}

impl MacroKey {
    pub fn new(name: impl Into<String>, arg_count: ArgCount) -> Self {
        MacroKey {
            name: name.into(),
            arg_count,
        }
    }
}

impl fmt::Display for MacroKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.arg_count)
    }
}

/// Expansion function.
///
/// Receives the node factory, the receiver (`None` for global calls) and the
/// already-parsed arguments. Returns `None` to decline, in which case the
/// parser builds an ordinary call; otherwise the replacement node, which may
/// be an `Error` node describing the misuse.
pub type Expander =
    Arc<dyn Fn(&mut ExprFactory<'_>, Option<ExprId>, &[ExprId]) -> Option<ExprId> + Send + Sync>;

/// A parse-time macro.
#[derive(Clone)]
pub struct Macro {
    name: String,
    style: MacroStyle,
    arg_count: ArgCount,
    expander: Expander,
}

impl Macro {
    pub fn new(
        name: impl Into<String>,
        style: MacroStyle,
        arg_count: ArgCount,
        expander: impl Fn(&mut ExprFactory<'_>, Option<ExprId>, &[ExprId]) -> Option<ExprId>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        Macro {
            name: name.into(),
            style,
            arg_count,
            expander: Arc::new(expander),
        }
    }

    /// Global macro taking exactly `argc` arguments.
    pub fn global(
        name: impl Into<String>,
        argc: usize,
        expander: impl Fn(&mut ExprFactory<'_>, Option<ExprId>, &[ExprId]) -> Option<ExprId>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        Self::new(name, MacroStyle::Global, ArgCount::Fixed(argc), expander)
    }

    /// Receiver macro taking exactly `argc` arguments besides the receiver.
    pub fn receiver(
        name: impl Into<String>,
        argc: usize,
        expander: impl Fn(&mut ExprFactory<'_>, Option<ExprId>, &[ExprId]) -> Option<ExprId>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        Self::new(name, MacroStyle::Receiver, ArgCount::Fixed(argc), expander)
    }

    /// Receiver macro accepting any number of arguments.
    pub fn receiver_variadic(
        name: impl Into<String>,
        expander: impl Fn(&mut ExprFactory<'_>, Option<ExprId>, &[ExprId]) -> Option<ExprId>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        Self::new(name, MacroStyle::Receiver, ArgCount::Variadic, expander)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn style(&self) -> MacroStyle {
        self.style
    }

    pub fn arg_count(&self) -> ArgCount {
        self.arg_count
    }

    pub fn key(&self) -> MacroKey {
        MacroKey::new(self.name.clone(), self.arg_count)
    }

    /// Run the expander.
    pub fn expand(
        &self,
        factory: &mut ExprFactory<'_>,
        target: Option<ExprId>,
        args: &[ExprId],
    ) -> Option<ExprId> {
        (self.expander)(factory, target, args)
    }
}

impl fmt::Debug for Macro {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Macro")
            .field("name", &self.name)
            .field("style", &self.style)
            .field("arg_count", &self.arg_count)
            .finish_non_exhaustive()
    }
}
