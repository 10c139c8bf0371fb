//! Host-supplied variable values.

use rustc_hash::FxHashMap;

use crate::value::Value;

/// Variables visible to one evaluation.
#[derive(Clone, Debug, Default)]
pub struct Activation {
    vars: FxHashMap<String, Value>,
}

impl Activation {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.vars.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.vars.get(name)
    }
}
