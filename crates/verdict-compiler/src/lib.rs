//! Verdict Compiler - AST to compiled-expression pass
//!
//! Walks an expression AST once and produces a `CompiledExpression`: an
//! immutable, reusable executable form. The pass resolves built-in function
//! identities by name and arity; every other name lookup is deferred to
//! evaluation time, which is what makes late-bound user-defined functions
//! possible. The built-in function library lives here so the binding table
//! and the implementations stay together; the evaluator invokes them through
//! the resolved bindings.

pub mod builtins;
pub mod compiler;
pub mod error;

pub use builtins::{Builtin, BuiltinFn};
pub use compiler::{
    CompiledExpression, CompiledNode, CompiledTest, CompiledTests, Compiler, CANDIDATE_NAME,
};
pub use error::{CompileError, Result};
