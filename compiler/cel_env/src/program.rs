//! Compiled programs.

use std::sync::Arc;

use cel_diagnostic::span_utils::render_all;
use cel_diagnostic::Diagnostic;
use cel_eval::{evaluate, Activation, EvalCounters, EvalResult};
use cel_ir::{ExprArena, ExprId};
use cel_parse::parse;
use cel_types::{check, CheckResult, Type};

use crate::env::Registries;

/// Every parse, macro and check diagnostic of one expression.
#[derive(Clone, Debug, thiserror::Error)]
#[error("{}", render_all(.diagnostics, .expression))]
pub struct CompileError {
    pub expression: String,
    pub diagnostics: Vec<Diagnostic>,
}

/// A checked expression, ready to evaluate any number of times from any
/// number of threads.
#[derive(Debug)]
pub struct Program {
    registries: Arc<Registries>,
    arena: ExprArena,
    root: ExprId,
    checked: CheckResult,
}

impl Program {
    pub(crate) fn compile(registries: Arc<Registries>, source: &str) -> Result<Program, CompileError> {
        let parsed = parse(source, &registries.macros);
        let failed = |diagnostics| CompileError {
            expression: source.to_owned(),
            diagnostics,
        };
        if parsed.has_errors() {
            return Err(failed(parsed.diagnostics));
        }
        let Some(root) = parsed.root else {
            return Err(failed(parsed.diagnostics));
        };
        let checked = check(&parsed.arena, root, &registries.decls);
        if checked.has_errors() {
            return Err(failed(checked.diagnostics));
        }
        tracing::debug!(result = %checked.type_of(root).unwrap_or(&Type::Dyn), "compiled");
        Ok(Program {
            registries,
            arena: parsed.arena,
            root,
            checked,
        })
    }

    /// Static type of the whole expression.
    pub fn result_type(&self) -> Type {
        self.checked.type_of(self.root).cloned().unwrap_or(Type::Dyn)
    }

    pub fn eval(&self, activation: &Activation) -> EvalResult {
        self.eval_with_counters(activation).0
    }

    /// Evaluate, also reporting how often comprehension parts ran.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn eval_with_counters(&self, activation: &Activation) -> (EvalResult, EvalCounters) {
        let program = cel_eval::Program {
            arena: &self.arena,
            root: self.root,
            checked: &self.checked,
            dispatcher: &self.registries.dispatcher,
            repr: self.registries.repr,
        };
        evaluate(program, activation)
    }
}
