//! Evaluation context: a chained mapping from names to values
//!
//! Lookups check the innermost scope first. A context is never mutated once
//! an evaluation starts; every nested evaluation (a `for` binding, a context
//! constructor, a function invocation) creates a child scope that is
//! discarded when that subexpression completes.

use std::collections::HashMap;
use std::sync::Arc;
use verdict_core::Value;
use verdict_compiler::CompiledExpression;

/// A late-bound user-defined function: named parameters over a compiled body.
/// Business knowledge models are surfaced to expressions through this form.
#[derive(Debug, Clone)]
pub struct UserFunction {
    pub parameters: Vec<String>,
    pub body: Arc<CompiledExpression>,
}

impl UserFunction {
    pub fn new(parameters: Vec<String>, body: Arc<CompiledExpression>) -> Self {
        Self { parameters, body }
    }
}

/// A scope in the context chain
#[derive(Debug, Default)]
pub struct EvaluationContext<'a> {
    variables: HashMap<String, Value>,
    functions: HashMap<String, UserFunction>,
    parent: Option<&'a EvaluationContext<'a>>,
}

impl<'a> EvaluationContext<'a> {
    /// Create an empty root scope
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a root scope over the given values
    pub fn from_values(variables: HashMap<String, Value>) -> Self {
        Self {
            variables,
            functions: HashMap::new(),
            parent: None,
        }
    }

    /// Create a child scope layered over this one
    pub fn child(&self) -> EvaluationContext<'_> {
        EvaluationContext {
            variables: HashMap::new(),
            functions: HashMap::new(),
            parent: Some(self),
        }
    }

    /// Bind a name in this scope (done before evaluation starts)
    pub fn bind(&mut self, name: impl Into<String>, value: Value) {
        self.variables.insert(name.into(), value);
    }

    /// Bind a function in this scope
    pub fn bind_function(&mut self, name: impl Into<String>, function: UserFunction) {
        self.functions.insert(name.into(), function);
    }

    /// Resolve a name, innermost scope first
    pub fn lookup(&self, name: &str) -> Option<&Value> {
        match self.variables.get(name) {
            Some(value) => Some(value),
            None => self.parent.and_then(|p| p.lookup(name)),
        }
    }

    /// Resolve a function name, innermost scope first
    pub fn lookup_function(&self, name: &str) -> Option<&UserFunction> {
        match self.functions.get(name) {
            Some(function) => Some(function),
            None => self.parent.and_then(|p| p.lookup_function(name)),
        }
    }
}
