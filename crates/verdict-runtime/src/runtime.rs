//! Decision graph runtime
//!
//! Walks a model's decisions in dependency order. Each node moves through
//! `Pending -> Ready -> Evaluating -> {Succeeded, Failed}`; the run itself
//! always completes, recording per-node success or failure without aborting
//! independent branches. A failed dependency propagates as a
//! dependency-unsatisfied failure downstream; nodes in a dependency cycle
//! fail structurally while unrelated branches keep evaluating; a run-scoped
//! deadline fails remaining nodes with a timeout cause instead of evaluating
//! them.

use crate::context::EvaluationContext;
use crate::error::{Result, RuntimeError};
use crate::events::RuntimeListener;
use crate::graph::DecisionGraph;
use crate::imports::{ModelHandle, ModelRegistry};
use crate::logic::{DecisionLogicEvaluator, LiteralExpressionEvaluator};
use crate::result::{
    DecisionRunResult, EvaluationFailure, EvaluationResult, FailureKind, NodeResult, NodeState,
};
use crate::types::TypeValidator;
use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};
use verdict_core::Value;

/// Per-run configuration
#[derive(Debug, Clone, Default)]
pub struct RuntimeOptions {
    /// Wall-clock budget for the whole run; nodes not reached in time fail
    /// with a timeout cause
    pub deadline: Option<Duration>,
    /// Overturn a decision's value when it violates its declared type,
    /// instead of recording warnings
    pub strict_types: bool,
    /// Validate computed values against declared result types
    pub validate_results: bool,
}

impl RuntimeOptions {
    pub fn new() -> Self {
        Self {
            deadline: None,
            strict_types: false,
            validate_results: true,
        }
    }
}

/// Runtime executing decision graphs against a model registry
pub struct DecisionGraphRuntime<'a> {
    models: &'a ModelRegistry,
    options: RuntimeOptions,
    listener: Option<&'a dyn RuntimeListener>,
}

impl<'a> DecisionGraphRuntime<'a> {
    pub fn new(models: &'a ModelRegistry) -> Self {
        Self {
            models,
            options: RuntimeOptions::new(),
            listener: None,
        }
    }

    pub fn with_options(mut self, options: RuntimeOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_listener(mut self, listener: &'a dyn RuntimeListener) -> Self {
        self.listener = Some(listener);
        self
    }

    /// Evaluate every decision of the model registered under `namespace`
    pub fn evaluate_all(
        &self,
        namespace: &str,
        inputs: HashMap<String, Value>,
    ) -> Result<DecisionRunResult> {
        let handle = self
            .models
            .get(namespace)
            .ok_or_else(|| RuntimeError::UnknownModel(namespace.to_string()))?;
        let graph = DecisionGraph::build(handle.definitions());
        self.run(handle, &graph, None, namespace, inputs)
    }

    /// Evaluate one decision and the transitive dependencies it needs
    pub fn evaluate_decision(
        &self,
        namespace: &str,
        name: &str,
        inputs: HashMap<String, Value>,
    ) -> Result<EvaluationResult> {
        let handle = self
            .models
            .get(namespace)
            .ok_or_else(|| RuntimeError::UnknownModel(namespace.to_string()))?;
        let graph = DecisionGraph::build(handle.definitions());
        let target = graph
            .index_of(name)
            .ok_or_else(|| RuntimeError::UnknownDecision {
                namespace: namespace.to_string(),
                name: name.to_string(),
            })?;

        let scope = graph.closure_of(target);
        let run = self.run(handle, &graph, Some(&scope), namespace, inputs)?;
        Ok(run
            .decision(name)
            .map(|node| node.result.clone())
            .unwrap_or_else(|| {
                EvaluationResult::failure(
                    EvaluationFailure::new(
                        FailureKind::Structural,
                        "decision was not reached by the run",
                    )
                    .with_source(name),
                )
            }))
    }

    fn run(
        &self,
        handle: &ModelHandle,
        graph: &DecisionGraph,
        scope: Option<&HashSet<usize>>,
        namespace: &str,
        inputs: HashMap<String, Value>,
    ) -> Result<DecisionRunResult> {
        let mut run = DecisionRunResult::new(namespace);
        for (name, value) in &inputs {
            run.context.insert(name.clone(), value.clone());
        }

        let deadline = self.options.deadline.map(|budget| Instant::now() + budget);
        let (order, cyclic) = graph.evaluation_order();
        let cyclic_set: HashSet<usize> = cyclic.iter().copied().collect();
        let in_scope = |node: usize| scope.map(|s| s.contains(&node)).unwrap_or(true);

        // Every node caught in a cycle fails structurally up front
        if !cyclic.is_empty() {
            let mut cycle_names: Vec<String> =
                cyclic.iter().map(|&n| graph.name(n).to_string()).collect();
            cycle_names.sort();
            for &node in &cyclic {
                if !in_scope(node) {
                    continue;
                }
                let name = graph.name(node);
                let failure = EvaluationFailure::from(RuntimeError::CyclicDependency {
                    nodes: cycle_names.clone(),
                })
                .with_source(name);
                self.notify_failed(name, &failure);
                run.record(NodeResult::failed(name, failure));
            }
        }

        let global = EvaluationContext::from_values(inputs);

        for &node in &order {
            if !in_scope(node) {
                continue;
            }
            let name = graph.name(node).to_string();

            if let Some(deadline) = deadline {
                if Instant::now() > deadline {
                    let failure = EvaluationFailure::from(RuntimeError::DeadlineExceeded)
                        .with_source(name.as_str());
                    self.notify_failed(&name, &failure);
                    run.record(NodeResult::failed(name, failure));
                    continue;
                }
            }

            let unknown = graph.unknown_dependencies_of(node);
            if !unknown.is_empty() {
                let failure = EvaluationFailure::new(
                    FailureKind::Structural,
                    format!("unknown dependency '{}'", unknown.join("', '")),
                )
                .with_source(name.as_str());
                self.notify_failed(&name, &failure);
                run.record(NodeResult::failed(name, failure));
                continue;
            }

            // A failed dependency propagates without evaluating this node
            let failed_dependency = graph.dependencies_of(node).iter().find(|&&dep| {
                cyclic_set.contains(&dep)
                    || run
                        .decision(graph.name(dep))
                        .map(|r| r.state == NodeState::Failed)
                        .unwrap_or(false)
            });
            if let Some(&dep) = failed_dependency {
                let failure = EvaluationFailure::new(
                    FailureKind::DependencyUnsatisfied,
                    format!("dependency '{}' failed", graph.name(dep)),
                )
                .with_source(name.as_str());
                self.notify_failed(&name, &failure);
                run.record(NodeResult::failed(name, failure));
                continue;
            }

            let result = self.evaluate_node(handle, graph, node, namespace, &run, &global);
            run.record(result);
        }

        run.completed = true;
        if let Some(listener) = self.listener {
            listener.on_run_completed(&run);
        }
        Ok(run)
    }

    fn evaluate_node(
        &self,
        handle: &ModelHandle,
        graph: &DecisionGraph,
        node: usize,
        namespace: &str,
        run: &DecisionRunResult,
        global: &EvaluationContext,
    ) -> NodeResult {
        let name = graph.name(node);
        let decision = match handle.definitions().decision(name) {
            Some(decision) => decision,
            None => {
                return NodeResult::failed(
                    name,
                    EvaluationFailure::new(
                        FailureKind::Structural,
                        "decision missing from model",
                    )
                    .with_source(name),
                )
            }
        };

        let logic = match handle.decision_logic(name) {
            Some(Ok(expression)) => LiteralExpressionEvaluator::new(expression.clone()),
            Some(Err(failure)) => return NodeResult::failed(name, failure.clone()),
            None => {
                return NodeResult::failed(
                    name,
                    EvaluationFailure::new(FailureKind::Structural, "decision has no logic")
                        .with_source(name),
                )
            }
        };

        let functions = match handle.knowledge_for(decision) {
            Ok(functions) => functions,
            Err(failure) => return NodeResult::failed(name, failure),
        };

        if let Some(listener) = self.listener {
            listener.on_decision_started(name);
        }
        tracing::debug!(decision = name, "evaluating");

        // Dependency values layered over the global input context
        let mut scope = global.child();
        for &dep in graph.dependencies_of(node) {
            let dep_name = graph.name(dep);
            if let Some(value) = run.context.get(dep_name) {
                scope.bind(dep_name, value.clone());
            }
        }
        for (function_name, function) in functions {
            scope.bind_function(function_name, function);
        }

        let result = logic.evaluate(&scope);

        match result {
            EvaluationResult::Success { value } => {
                let mut warnings = Vec::new();
                if self.options.validate_results {
                    if let Some(type_ref) = &decision.variable.type_ref {
                        let outcome =
                            TypeValidator::new(self.models).validate(&value, namespace, type_ref);
                        if !outcome.is_valid() {
                            if self.options.strict_types {
                                let failure = EvaluationFailure::new(
                                    FailureKind::Validation,
                                    format!(
                                        "value violates declared type '{}': {}",
                                        type_ref,
                                        outcome
                                            .violations
                                            .iter()
                                            .map(|v| v.message.as_str())
                                            .collect::<Vec<_>>()
                                            .join("; ")
                                    ),
                                )
                                .with_source(name);
                                self.notify_failed(name, &failure);
                                return NodeResult::failed(name, failure);
                            }
                            warnings = outcome.violations;
                        }
                    }
                }

                if let Some(listener) = self.listener {
                    listener.on_decision_succeeded(name, &value);
                }
                NodeResult::succeeded(name, value).with_warnings(warnings)
            }
            EvaluationResult::Failure { failure } => {
                let failure = failure.with_source(name);
                self.notify_failed(name, &failure);
                NodeResult::failed(name, failure)
            }
        }
    }

    fn notify_failed(&self, name: &str, failure: &EvaluationFailure) {
        tracing::debug!(decision = name, kind = ?failure.kind, "decision failed");
        if let Some(listener) = self.listener {
            listener.on_decision_failed(name, failure);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use verdict_core::model::{Decision, Definitions, InputData, ItemDefinition};

    fn registry_with(model: Definitions) -> ModelRegistry {
        let mut models = ModelRegistry::new();
        models.register(model).unwrap();
        models
    }

    fn chain_model() -> Definitions {
        Definitions::new("chain", "ns1")
            .with_input_data(InputData::new("base").with_type_ref("number"))
            .with_decision(Decision::literal("D1", "base + 1").requires_input("base"))
            .with_decision(Decision::literal("D2", "D1 * 2").requires_decision("D1"))
            .with_decision(Decision::literal("D3", "D2 + 10").requires_decision("D2"))
    }

    #[test]
    fn test_evaluate_all_resolves_dependency_order() {
        let models = registry_with(chain_model());
        let runtime = DecisionGraphRuntime::new(&models);

        let run = runtime
            .evaluate_all("ns1", HashMap::from([("base".to_string(), Value::number(1))]))
            .unwrap();

        assert!(run.completed);
        assert_eq!(run.context.get("D1"), Some(&Value::number(2)));
        assert_eq!(run.context.get("D2"), Some(&Value::number(4)));
        assert_eq!(run.context.get("D3"), Some(&Value::number(14)));
    }

    #[test]
    fn test_failure_propagates_downstream_only() {
        let model = Definitions::new("m", "ns1")
            .with_decision(Decision::literal("D1", "1 / 0"))
            .with_decision(Decision::literal("D2", "D1 + 1").requires_decision("D1"))
            .with_decision(Decision::literal("D3", "D2 + 1").requires_decision("D2"))
            .with_decision(Decision::literal("Solo", "42"));
        let models = registry_with(model);
        let runtime = DecisionGraphRuntime::new(&models);

        let run = runtime.evaluate_all("ns1", HashMap::new()).unwrap();

        assert_eq!(
            run.decision("D1").unwrap().result.as_failure().unwrap().kind,
            FailureKind::Evaluation
        );
        assert_eq!(
            run.decision("D2").unwrap().result.as_failure().unwrap().kind,
            FailureKind::DependencyUnsatisfied
        );
        assert_eq!(
            run.decision("D3").unwrap().result.as_failure().unwrap().kind,
            FailureKind::DependencyUnsatisfied
        );
        // The independent branch still evaluated
        assert_eq!(run.context.get("Solo"), Some(&Value::number(42)));
    }

    #[test]
    fn test_cycle_fails_members_but_not_unrelated() {
        let model = Definitions::new("m", "ns1")
            .with_decision(Decision::literal("A", "B + 1").requires_decision("B"))
            .with_decision(Decision::literal("B", "A + 1").requires_decision("A"))
            .with_decision(Decision::literal("C", "7"));
        let models = registry_with(model);
        let runtime = DecisionGraphRuntime::new(&models);

        let run = runtime.evaluate_all("ns1", HashMap::new()).unwrap();

        for name in ["A", "B"] {
            let failure = run.decision(name).unwrap().result.as_failure().unwrap();
            assert_eq!(failure.kind, FailureKind::Structural);
            assert!(failure.message.contains("Cyclic"));
        }
        assert_eq!(run.context.get("C"), Some(&Value::number(7)));
    }

    #[test]
    fn test_evaluate_decision_by_name() {
        let models = registry_with(chain_model());
        let runtime = DecisionGraphRuntime::new(&models);

        let result = runtime
            .evaluate_decision(
                "ns1",
                "D2",
                HashMap::from([("base".to_string(), Value::number(5))]),
            )
            .unwrap();
        assert_eq!(result.value(), Some(&Value::number(12)));
    }

    #[test]
    fn test_evaluate_unknown_decision() {
        let models = registry_with(chain_model());
        let runtime = DecisionGraphRuntime::new(&models);

        let error = runtime
            .evaluate_decision("ns1", "NoSuch", HashMap::new())
            .unwrap_err();
        assert!(matches!(error, RuntimeError::UnknownDecision { .. }));
    }

    #[test]
    fn test_evaluate_unknown_namespace() {
        let models = ModelRegistry::new();
        let runtime = DecisionGraphRuntime::new(&models);
        let error = runtime.evaluate_all("nowhere", HashMap::new()).unwrap_err();
        assert!(matches!(error, RuntimeError::UnknownModel(_)));
    }

    #[test]
    fn test_knowledge_model_invocation() {
        let model = Definitions::new("m", "ns1")
            .with_knowledge_model(
                verdict_core::model::BusinessKnowledgeModel::function(
                    "discount",
                    vec!["amount"],
                    "amount * 0.1",
                ),
            )
            .with_input_data(InputData::new("amount").with_type_ref("number"))
            .with_decision(
                Decision::literal("D1", "discount(amount)")
                    .requires_input("amount")
                    .requires_knowledge("discount"),
            );
        let models = registry_with(model);
        let runtime = DecisionGraphRuntime::new(&models);

        let run = runtime
            .evaluate_all(
                "ns1",
                HashMap::from([("amount".to_string(), Value::number(200))]),
            )
            .unwrap();
        assert_eq!(run.context.get("D1"), Some(&Value::number(20)));
    }

    #[test]
    fn test_missing_input_yields_null_not_failure() {
        let model = Definitions::new("m", "ns1")
            .with_input_data(InputData::new("age").with_type_ref("number"))
            .with_decision(Decision::literal("D1", "age + 1").requires_input("age"));
        let models = registry_with(model);
        let runtime = DecisionGraphRuntime::new(&models);

        let run = runtime.evaluate_all("ns1", HashMap::new()).unwrap();
        // Null propagation: age is unresolved, D1 is null but succeeded
        assert_eq!(run.context.get("D1"), Some(&Value::Null));
        assert_eq!(run.decision("D1").unwrap().state, NodeState::Succeeded);
    }

    #[test]
    fn test_result_type_validation_warns_by_default() {
        let model = Definitions::new("m", "ns1").with_decision(
            Decision::literal("D1", "\"not a number\"").with_type_ref("number"),
        );
        let models = registry_with(model);
        let runtime = DecisionGraphRuntime::new(&models);

        let run = runtime.evaluate_all("ns1", HashMap::new()).unwrap();
        let node = run.decision("D1").unwrap();
        assert_eq!(node.state, NodeState::Succeeded);
        assert_eq!(node.warnings.len(), 1);
    }

    #[test]
    fn test_result_type_validation_strict_mode_fails() {
        let model = Definitions::new("m", "ns1").with_decision(
            Decision::literal("D1", "\"not a number\"").with_type_ref("number"),
        );
        let models = registry_with(model);
        let runtime = DecisionGraphRuntime::new(&models).with_options(RuntimeOptions {
            strict_types: true,
            ..RuntimeOptions::new()
        });

        let run = runtime.evaluate_all("ns1", HashMap::new()).unwrap();
        let node = run.decision("D1").unwrap();
        assert_eq!(node.state, NodeState::Failed);
        assert_eq!(
            node.result.as_failure().unwrap().kind,
            FailureKind::Validation
        );
    }

    #[test]
    fn test_allowed_values_constraint_on_result_type() {
        let model = Definitions::new("m", "ns1")
            .with_item_definition(
                ItemDefinition::new("Rating")
                    .with_type_ref("string")
                    .with_allowed_values(r#""low", "medium", "high""#),
            )
            .with_decision(Decision::literal("D1", "\"extreme\"").with_type_ref("Rating"));
        let models = registry_with(model);
        let runtime = DecisionGraphRuntime::new(&models);

        let run = runtime.evaluate_all("ns1", HashMap::new()).unwrap();
        let node = run.decision("D1").unwrap();
        assert_eq!(node.warnings.len(), 1);
        assert!(node.warnings[0].message.contains("allowed values"));
    }

    #[test]
    fn test_expired_deadline_times_out_remaining_nodes() {
        let models = registry_with(chain_model());
        let runtime = DecisionGraphRuntime::new(&models).with_options(RuntimeOptions {
            deadline: Some(Duration::from_secs(0)),
            ..RuntimeOptions::new()
        });

        let run = runtime
            .evaluate_all("ns1", HashMap::from([("base".to_string(), Value::number(1))]))
            .unwrap();

        assert!(run.completed);
        for name in ["D1", "D2", "D3"] {
            assert_eq!(
                run.decision(name).unwrap().result.as_failure().unwrap().kind,
                FailureKind::Timeout
            );
        }
    }

    #[test]
    fn test_unknown_dependency_is_structural_failure() {
        let model = Definitions::new("m", "ns1").with_decision(
            Decision::literal("D1", "X + 1").requires_decision("NoSuch"),
        );
        let models = registry_with(model);
        let runtime = DecisionGraphRuntime::new(&models);

        let run = runtime.evaluate_all("ns1", HashMap::new()).unwrap();
        assert_eq!(
            run.decision("D1").unwrap().result.as_failure().unwrap().kind,
            FailureKind::Structural
        );
    }

    #[test]
    fn test_listener_receives_lifecycle_events() {
        use std::cell::RefCell;

        #[derive(Default)]
        struct Recorder {
            events: RefCell<Vec<String>>,
        }
        impl RuntimeListener for Recorder {
            fn on_decision_started(&self, name: &str) {
                self.events.borrow_mut().push(format!("start:{}", name));
            }
            fn on_decision_succeeded(&self, name: &str, _value: &Value) {
                self.events.borrow_mut().push(format!("ok:{}", name));
            }
            fn on_run_completed(&self, _result: &DecisionRunResult) {
                self.events.borrow_mut().push("done".to_string());
            }
        }

        let models = registry_with(chain_model());
        let recorder = Recorder::default();
        let runtime = DecisionGraphRuntime::new(&models).with_listener(&recorder);

        runtime
            .evaluate_all("ns1", HashMap::from([("base".to_string(), Value::number(1))]))
            .unwrap();

        let events = recorder.events.borrow();
        assert!(events.contains(&"start:D1".to_string()));
        assert!(events.contains(&"ok:D3".to_string()));
        assert_eq!(events.last(), Some(&"done".to_string()));
    }

    #[test]
    fn test_deterministic_runs() {
        let models = registry_with(chain_model());
        let runtime = DecisionGraphRuntime::new(&models);
        let inputs = HashMap::from([("base".to_string(), Value::number(3))]);

        let first = runtime.evaluate_all("ns1", inputs.clone()).unwrap();
        let second = runtime.evaluate_all("ns1", inputs).unwrap();
        assert_eq!(first.context, second.context);
    }
}
