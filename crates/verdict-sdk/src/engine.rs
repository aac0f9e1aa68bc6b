//! The decision engine
//!
//! Holds the model registry and per-model compiled logic; each evaluation
//! call runs the decision graph runtime against it. Compiled expressions are
//! shared across runs; per-run state never outlives its run.

use crate::builder::DecisionEngineBuilder;
use crate::config::EngineConfig;
use crate::error::{Result, SdkError};
use std::collections::HashMap;
use verdict_compiler::Compiler;
use verdict_core::model::Definitions;
use verdict_core::Value;
use verdict_runtime::{
    DecisionGraphRuntime, DecisionRunResult, EvaluationContext, EvaluationFailure,
    EvaluationResult, Evaluator, FailureKind, ModelRegistry, RuntimeListener, RuntimeOptions,
};

/// High-level decision evaluation engine
pub struct DecisionEngine {
    models: ModelRegistry,
    config: EngineConfig,
}

impl DecisionEngine {
    /// Start building an engine
    pub fn builder() -> DecisionEngineBuilder {
        DecisionEngineBuilder::new()
    }

    /// Create an engine with default configuration and no models
    pub fn new() -> Self {
        Self::with_config(EngineConfig::new())
    }

    /// Create an engine with the given configuration
    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            models: ModelRegistry::new(),
            config,
        }
    }

    /// Register an already-parsed decision model under its namespace.
    ///
    /// Builds the model's type registry (rejecting cyclic definitions) and
    /// compiles its decision and knowledge logic once for reuse across runs.
    pub fn add_model(&mut self, model: Definitions) -> Result<()> {
        if self.models.get(&model.namespace).is_some() {
            return Err(SdkError::DuplicateModel {
                namespace: model.namespace,
            });
        }
        tracing::info!(
            namespace = model.namespace.as_str(),
            decisions = model.decisions.len(),
            "registering model"
        );
        self.models.register(model)?;
        Ok(())
    }

    /// Namespaces of the registered models
    pub fn namespaces(&self) -> Vec<&str> {
        self.models.namespaces()
    }

    /// Evaluate every decision in a model against the given inputs
    pub fn evaluate_all(
        &self,
        namespace: &str,
        inputs: HashMap<String, Value>,
    ) -> Result<DecisionRunResult> {
        let runtime = DecisionGraphRuntime::new(&self.models).with_options(self.runtime_options());
        Ok(runtime.evaluate_all(namespace, inputs)?)
    }

    /// Evaluate every decision, emitting lifecycle events to the listener
    pub fn evaluate_all_with_listener(
        &self,
        namespace: &str,
        inputs: HashMap<String, Value>,
        listener: &dyn RuntimeListener,
    ) -> Result<DecisionRunResult> {
        let runtime = DecisionGraphRuntime::new(&self.models)
            .with_options(self.runtime_options())
            .with_listener(listener);
        Ok(runtime.evaluate_all(namespace, inputs)?)
    }

    /// Evaluate one decision (and the dependencies it needs) by name
    pub fn evaluate_decision(
        &self,
        namespace: &str,
        name: &str,
        inputs: HashMap<String, Value>,
    ) -> Result<EvaluationResult> {
        let runtime = DecisionGraphRuntime::new(&self.models).with_options(self.runtime_options());
        Ok(runtime.evaluate_decision(namespace, name, inputs)?)
    }

    /// Convert a JSON object into an input value map
    pub fn inputs_from_json(json: serde_json::Value) -> HashMap<String, Value> {
        match Value::from_json(json) {
            Value::Context(entries) => entries,
            _ => HashMap::new(),
        }
    }

    fn runtime_options(&self) -> RuntimeOptions {
        RuntimeOptions {
            deadline: self.config.deadline,
            strict_types: self.config.strict_types,
            validate_results: self.config.validate_results,
        }
    }
}

impl Default for DecisionEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Compile and evaluate a standalone expression against context values.
///
/// Used by validation and testing tools; parse and compile failures come
/// back as evaluation failures, never as panics or raw faults.
pub fn compile_and_evaluate(source: &str, values: HashMap<String, Value>) -> EvaluationResult {
    let ast = match verdict_parser::parse(source) {
        Ok(ast) => ast,
        Err(error) => {
            return EvaluationResult::failure(
                EvaluationFailure::new(FailureKind::Parse, error.to_string()).with_source(source),
            )
        }
    };
    let compiled = match Compiler::compile(&ast, source) {
        Ok(compiled) => compiled,
        Err(error) => {
            return EvaluationResult::failure(
                EvaluationFailure::new(FailureKind::Compile, error.to_string()).with_source(source),
            )
        }
    };
    let ctx = EvaluationContext::from_values(values);
    Evaluator::evaluate(&compiled, &ctx)
}
