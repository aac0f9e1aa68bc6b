//! Runtime error types

use thiserror::Error;

/// Runtime error raised while evaluating expressions or walking a decision
/// graph. Most anomalies are absorbed by null propagation; only genuinely
/// invalid operations surface here.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RuntimeError {
    #[error("Unknown function '{name}' with {arity} argument(s)")]
    UnknownFunction { name: String, arity: usize },

    #[error("Function '{name}' failed: {message}")]
    FunctionFailed { name: String, message: String },

    #[error("Type error: {0}")]
    TypeError(String),

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Arithmetic overflow")]
    ArithmeticOverflow,

    #[error("Recursion limit exceeded while invoking '{name}'")]
    RecursionLimit { name: String },

    #[error("Cyclic dependency among decisions: {}", nodes.join(" -> "))]
    CyclicDependency { nodes: Vec<String> },

    #[error("Cyclic type definition involving '{name}'")]
    CyclicTypeDefinition { name: String },

    #[error("Invalid allowed-values constraint on '{name}': {message}")]
    InvalidAllowedValues { name: String, message: String },

    #[error("Unknown model namespace '{0}'")]
    UnknownModel(String),

    #[error("Unknown decision '{name}' in namespace '{namespace}'")]
    UnknownDecision { namespace: String, name: String },

    #[error("Evaluation deadline exceeded")]
    DeadlineExceeded,
}

/// Result type for runtime operations
pub type Result<T> = std::result::Result<T, RuntimeError>;
