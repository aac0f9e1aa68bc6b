//! Structural type system
//!
//! Resolves type references against a per-model registry of item
//! definitions, interprets collection markers, validates structural record
//! types recursively, and evaluates allowed-value constraints through the
//! expression evaluator.

pub mod registry;
pub mod validator;

pub use registry::{BuiltInType, TypeRegistry, TypeResolution};
pub use validator::{TypeValidator, ValidationOutcome, Violation};
