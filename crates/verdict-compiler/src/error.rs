//! Compiler error types

use thiserror::Error;

/// Compile error.
///
/// Compilation fails only for structurally invalid ASTs; everything else is
/// deferred to evaluation time.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    #[error("Function '{name}' expects {expected} argument(s), got {got}")]
    ArityMismatch {
        name: String,
        expected: String,
        got: usize,
    },

    #[error("Duplicate context key '{key}'")]
    DuplicateContextKey { key: String },
}

pub type Result<T> = std::result::Result<T, CompileError>;
