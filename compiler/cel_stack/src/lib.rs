//! Stack growth for recursive tree walks.
//!
//! The parser, the checker and the interpreter all recurse on expression
//! depth. Macro expansion nests comprehensions inside the user's own nesting,
//! so the depth of a lowered tree can exceed what the source suggests. Each
//! recursive step goes through [`ensure_sufficient_stack`], which grows the
//! stack on native targets when the remaining space drops below a red zone.

/// Remaining stack below which a new segment is allocated.
const RED_ZONE: usize = 64 * 1024;

/// Size of each newly allocated stack segment.
const STACK_PER_RECURSION: usize = 1024 * 1024;

/// Run `f`, first growing the stack if less than the red zone remains.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

/// WASM manages its own stack; call through.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
