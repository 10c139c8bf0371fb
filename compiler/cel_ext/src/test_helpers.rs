//! Minimal environment assembly for library unit tests.

use cel_eval::{evaluate, Activation, Dispatcher, EvalResult, Program, UintRepr};
use cel_macros::MacroRegistry;
use cel_parse::parse;
use cel_types::{check, Declarations, Type};

use crate::{feature_set, FeatureSet, Library, StdLib};

pub(crate) struct TestEnv {
    macros: MacroRegistry,
    decls: Declarations,
    dispatcher: Dispatcher,
    repr: UintRepr,
}

impl TestEnv {
    /// `std` plus the latest version of `library`.
    pub(crate) fn with(library: &dyn Library) -> Self {
        Self::versioned(library, None)
    }

    pub(crate) fn versioned(library: &dyn Library, version: Option<u32>) -> Self {
        let mut env = Self::std_only();
        env.add(feature_set(library, version, None).unwrap());
        env
    }

    pub(crate) fn std_only() -> Self {
        let mut env = TestEnv {
            macros: MacroRegistry::new(),
            decls: Declarations::new(),
            dispatcher: Dispatcher::new(),
            repr: UintRepr::Lossless,
        };
        env.add(feature_set(&StdLib, None, None).unwrap());
        env
    }

    pub(crate) fn add(&mut self, set: FeatureSet) {
        self.macros.register_all(set.macros).unwrap();
        for function in set.functions {
            self.decls.declare_function(function.decl).unwrap();
            for binding in function.bindings {
                self.dispatcher.register(binding);
            }
        }
    }

    pub(crate) fn repr(mut self, repr: UintRepr) -> Self {
        self.repr = repr;
        self
    }

    pub(crate) fn var(mut self, name: &str, ty: Type) -> Self {
        self.decls.declare_variable(name, ty).unwrap();
        self
    }

    pub(crate) fn eval(&self, source: &str) -> EvalResult {
        self.eval_with(source, &Activation::new())
    }

    pub(crate) fn eval_with(&self, source: &str, activation: &Activation) -> EvalResult {
        let parsed = parse(source, &self.macros);
        assert!(!parsed.has_errors(), "{source}: {:?}", parsed.diagnostics);
        let root = parsed.root.unwrap();
        let checked = check(&parsed.arena, root, &self.decls);
        assert!(!checked.has_errors(), "{source}: {:?}", checked.diagnostics);
        let program = Program {
            arena: &parsed.arena,
            root,
            checked: &checked,
            dispatcher: &self.dispatcher,
            repr: self.repr,
        };
        evaluate(program, activation).0
    }

    /// Messages of every parse and macro diagnostic.
    pub(crate) fn parse_errors(&self, source: &str) -> Vec<String> {
        parse(source, &self.macros)
            .diagnostics
            .into_iter()
            .map(|d| d.message)
            .collect()
    }

    /// Static type of `source`, which must parse and check cleanly.
    pub(crate) fn type_of(&self, source: &str) -> Type {
        let parsed = parse(source, &self.macros);
        assert!(!parsed.has_errors(), "{source}: {:?}", parsed.diagnostics);
        let root = parsed.root.unwrap();
        let checked = check(&parsed.arena, root, &self.decls);
        assert!(!checked.has_errors(), "{source}: {:?}", checked.diagnostics);
        checked.type_of(root).cloned().unwrap()
    }

    /// Messages of every check diagnostic; parsing must succeed.
    pub(crate) fn check_errors(&self, source: &str) -> Vec<String> {
        let parsed = parse(source, &self.macros);
        assert!(!parsed.has_errors(), "{source}: {:?}", parsed.diagnostics);
        let root = parsed.root.unwrap();
        check(&parsed.arena, root, &self.decls)
            .diagnostics
            .into_iter()
            .map(|d| d.message)
            .collect()
    }
}
