//! Expression environments.
//!
//! An [`Env`] is assembled once from an [`EnvConfig`]: the configured
//! libraries contribute macros, declarations and native bindings, and the
//! result is checked for dispatch completeness before anything is compiled.
//! Afterwards the environment is immutable and may be shared across threads;
//! every [`Program`] compiled from it holds a reference to the same
//! registries.
//!
//! ```text
//! source ──parse + expand──▶ tree ──check──▶ Program ──eval──▶ Value
//! ```
//!
//! # Debugging
//!
//! - `RUST_LOG=cel_env=debug`: environment construction, compile and eval.
//! - `RUST_LOG=cel_parse=trace,cel_eval=trace`: macro expansion and dispatch.
//!
//! Output appears only once [`init_tracing`] (or a host subscriber) is
//! installed.

mod config;
mod env;
mod program;

use std::sync::Once;

pub use cel_eval::{Activation, EvalCounters, EvalError, EvalErrorKind, EvalResult, UintRepr, Value};
pub use cel_types::Type;
pub use config::{EnvConfig, LibraryConfig};
pub use env::{Env, EnvError};
pub use program::{CompileError, Program};

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Safe to call multiple times. Installs a hierarchical subscriber filtered
/// by `RUST_LOG`, and does nothing when `RUST_LOG` is unset.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            let tree = tracing_tree::HierarchicalLayer::new(2)
                .with_targets(true)
                .with_bracketed_fields(true);
            // A host may already have installed a global subscriber.
            let _ = tracing_subscriber::registry().with(filter).with(tree).try_init();
        }
    });
}
