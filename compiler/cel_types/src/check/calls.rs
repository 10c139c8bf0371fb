//! Overload resolution for call nodes.

use cel_diagnostic::{no_matching_overload, undeclared_reference};
use cel_ir::ExprId;

use super::{qualified_name, CallReference, Checker};
use crate::{OverloadKind, Substitution, Type};

impl Checker<'_> {
    pub(super) fn call(
        &mut self,
        id: ExprId,
        function: &str,
        target: Option<ExprId>,
        args: &[ExprId],
    ) -> Type {
        if let Some(qualified) = target.and_then(|t| self.namespaced_function(t, function)) {
            let arg_types: Vec<Type> = args.iter().map(|&a| self.infer(a)).collect();
            return self.resolve(id, &qualified, OverloadKind::Global, &arg_types, true);
        }

        let mut arg_types = Vec::with_capacity(args.len() + 1);
        let kind = match target {
            Some(target) => {
                arg_types.push(self.infer(target));
                OverloadKind::Member
            }
            None => OverloadKind::Global,
        };
        for &arg in args {
            arg_types.push(self.infer(arg));
        }
        self.resolve(id, function, kind, &arg_types, false)
    }

    /// `ns.f(..)` where `ns.f` names a declared function and `ns` is not a
    /// variable in scope.
    fn namespaced_function(&self, target: ExprId, function: &str) -> Option<String> {
        let prefix = qualified_name(self.arena, target)?;
        let root = prefix.split('.').next().unwrap_or(&prefix);
        if self.lookup_local(root).is_some() || self.decls.variable(root).is_some() {
            return None;
        }
        let name = format!("{prefix}.{function}");
        self.decls.function(&name).is_some().then_some(name)
    }

    fn resolve(
        &mut self,
        id: ExprId,
        function: &str,
        kind: OverloadKind,
        arg_types: &[Type],
        qualified: bool,
    ) -> Type {
        let span = self.arena.span(id);
        let decls = self.decls;
        let Some(decl) = decls.function(function) else {
            return self.error(undeclared_reference(span, function));
        };

        let mut overload_ids = Vec::new();
        let mut results = Vec::new();
        for overload in decl
            .overloads
            .iter()
            .filter(|o| o.kind == kind && o.accepts_arity(arg_types.len()))
        {
            let mut subst = Substitution::new();
            let unified = arg_types.iter().enumerate().all(|(i, actual)| {
                overload
                    .param(i)
                    .is_some_and(|formal| subst.unify(formal, actual))
            });
            if unified {
                overload_ids.push(overload.id.clone());
                results.push(subst.apply(&overload.result));
            }
        }

        if overload_ids.is_empty() {
            let rendered = arg_types
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            return self.error(no_matching_overload(span, function, &rendered));
        }

        let exact = overload_ids.len() == 1
            && !arg_types
                .iter()
                .any(|t| t.contains_dyn() || *t == Type::Error);
        tracing::trace!(function, candidates = overload_ids.len(), exact, "resolved call");
        self.result.references.insert(
            id,
            CallReference {
                function: function.to_owned(),
                overload_ids,
                qualified,
                exact,
            },
        );
        Type::join(&results)
    }
}
