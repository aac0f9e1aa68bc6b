//! Verdict Core - Core types and definitions for the Verdict decision engine
//!
//! This crate provides the fundamental types used across the Verdict ecosystem:
//! - Value types for runtime data
//! - AST (Abstract Syntax Tree) definitions for the expression language
//! - Decision model definitions (inputs, decisions, item definitions, imports)
//! - Error types

pub mod ast;
pub mod error;
pub mod model;
pub mod types;

// Re-export commonly used types
pub use error::CoreError;
pub use types::Value;
