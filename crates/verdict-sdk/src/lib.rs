//! Verdict SDK - High-level API for decision model evaluation
//!
//! Register already-parsed decision models, then evaluate every decision or
//! a single one against externally supplied input values. Expression-only
//! evaluation is exposed for validation and testing tools.

pub mod builder;
pub mod config;
pub mod engine;
pub mod error;

// Re-export main types
pub use builder::DecisionEngineBuilder;
pub use config::EngineConfig;
pub use engine::{compile_and_evaluate, DecisionEngine};
pub use error::{Result, SdkError};

// Re-export commonly used types from dependencies
pub use verdict_core::model::{
    BusinessKnowledgeModel, Decision, Definitions, Import, InputData, ItemDefinition,
};
pub use verdict_core::Value;
pub use verdict_runtime::{
    DecisionRunResult, EvaluationResult, NoopListener, RuntimeListener,
};
