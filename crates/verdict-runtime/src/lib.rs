//! Verdict Runtime - Evaluation engine for compiled expressions and decision
//! graphs
//!
//! This crate owns the tree-walking evaluator with its three-valued
//! semantics, the chained evaluation context, the structural type system,
//! the cross-model import resolver, and the decision graph runtime that
//! computes a dependency-respecting evaluation order and accumulates
//! per-node results without aborting on individual failures.

pub mod context;
pub mod error;
pub mod eval;
pub mod events;
pub mod graph;
pub mod imports;
pub mod logic;
pub mod result;
pub mod runtime;
pub mod types;

// Re-export main types
pub use context::{EvaluationContext, UserFunction};
pub use error::{Result, RuntimeError};
pub use eval::Evaluator;
pub use events::{NoopListener, RuntimeListener};
pub use graph::DecisionGraph;
pub use imports::{ModelHandle, ModelRegistry};
pub use logic::{DecisionLogicEvaluator, LiteralExpressionEvaluator};
pub use result::{
    DecisionRunResult, EvaluationFailure, EvaluationResult, FailureKind, NodeResult, NodeState,
};
pub use runtime::{DecisionGraphRuntime, RuntimeOptions};
pub use types::{TypeRegistry, TypeValidator, ValidationOutcome, Violation};
