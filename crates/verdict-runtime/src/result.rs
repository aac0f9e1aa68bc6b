//! Evaluation and decision-run result types

use crate::error::RuntimeError;
use crate::types::Violation;
use serde::Serialize;
use std::collections::HashMap;
use uuid::Uuid;
use verdict_core::Value;

/// Failure taxonomy for evaluation and run results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Malformed source text
    Parse,
    /// Structurally invalid AST
    Compile,
    /// Runtime evaluation failure (unknown function, type mismatch, range error)
    Evaluation,
    /// Value violates a type or allowed-value constraint
    Validation,
    /// Cyclic dependency or unresolved reference
    Structural,
    /// Run-scoped deadline exceeded
    Timeout,
    /// A transitive dependency failed; this node was never evaluated
    DependencyUnsatisfied,
}

/// Failure payload carried by an evaluation result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationFailure {
    pub kind: FailureKind,
    pub message: String,
    /// Originating node name or expression source, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl EvaluationFailure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Attach the originating node or expression reference
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

impl From<RuntimeError> for EvaluationFailure {
    fn from(error: RuntimeError) -> Self {
        let kind = match &error {
            RuntimeError::CyclicDependency { .. }
            | RuntimeError::CyclicTypeDefinition { .. }
            | RuntimeError::InvalidAllowedValues { .. }
            | RuntimeError::UnknownModel(_)
            | RuntimeError::UnknownDecision { .. } => FailureKind::Structural,
            RuntimeError::DeadlineExceeded => FailureKind::Timeout,
            _ => FailureKind::Evaluation,
        };
        EvaluationFailure::new(kind, error.to_string())
    }
}

/// Result of one compiled-expression invocation: a success value or a
/// structured failure, never a raw internal fault
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EvaluationResult {
    Success { value: Value },
    Failure { failure: EvaluationFailure },
}

impl EvaluationResult {
    pub fn success(value: Value) -> Self {
        EvaluationResult::Success { value }
    }

    pub fn failure(failure: EvaluationFailure) -> Self {
        EvaluationResult::Failure { failure }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, EvaluationResult::Success { .. })
    }

    /// The success value, if any
    pub fn value(&self) -> Option<&Value> {
        match self {
            EvaluationResult::Success { value } => Some(value),
            EvaluationResult::Failure { .. } => None,
        }
    }

    /// The failure payload, if any
    pub fn as_failure(&self) -> Option<&EvaluationFailure> {
        match self {
            EvaluationResult::Success { .. } => None,
            EvaluationResult::Failure { failure } => Some(failure),
        }
    }
}

/// Per-decision lifecycle state during a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeState {
    Pending,
    Ready,
    Evaluating,
    Succeeded,
    Failed,
}

/// One decision's outcome within a run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeResult {
    pub name: String,
    pub state: NodeState,
    pub result: EvaluationResult,
    /// Constraint violations recorded without overturning the value
    /// (unless the run is configured strict)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<Violation>,
}

impl NodeResult {
    pub fn succeeded(name: impl Into<String>, value: Value) -> Self {
        Self {
            name: name.into(),
            state: NodeState::Succeeded,
            result: EvaluationResult::success(value),
            warnings: Vec::new(),
        }
    }

    pub fn failed(name: impl Into<String>, failure: EvaluationFailure) -> Self {
        Self {
            name: name.into(),
            state: NodeState::Failed,
            result: EvaluationResult::failure(failure),
            warnings: Vec::new(),
        }
    }

    pub fn with_warnings(mut self, warnings: Vec<Violation>) -> Self {
        self.warnings = warnings;
        self
    }
}

/// Accumulator for one decision-graph run: per-node results plus the global
/// context of every resolved value. Owned by a single run and never shared
/// across runs.
#[derive(Debug, Clone, Serialize)]
pub struct DecisionRunResult {
    pub run_id: String,
    pub namespace: String,
    pub decisions: HashMap<String, NodeResult>,
    /// All resolved values: external inputs plus every succeeded decision
    pub context: HashMap<String, Value>,
    /// Set once the run has walked every node
    pub completed: bool,
}

impl DecisionRunResult {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            run_id: Uuid::new_v4().to_string(),
            namespace: namespace.into(),
            decisions: HashMap::new(),
            context: HashMap::new(),
            completed: false,
        }
    }

    /// Record a node outcome, publishing its value to the global context on
    /// success
    pub fn record(&mut self, node: NodeResult) {
        if let Some(value) = node.result.value() {
            self.context.insert(node.name.clone(), value.clone());
        }
        self.decisions.insert(node.name.clone(), node);
    }

    /// A decision's recorded outcome
    pub fn decision(&self, name: &str) -> Option<&NodeResult> {
        self.decisions.get(name)
    }

    /// Names of decisions that failed
    pub fn failed_decisions(&self) -> Vec<&str> {
        self.decisions
            .values()
            .filter(|n| n.state == NodeState::Failed)
            .map(|n| n.name.as_str())
            .collect()
    }
}
