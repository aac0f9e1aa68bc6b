//! Verdict Parser - Expression language front end
//!
//! Turns source text of one expression into an AST of typed nodes. Covers
//! literals (including date/time forms), name references, qualified names,
//! arithmetic and comparison operators, `in`/`between`, list and context
//! constructors, function invocation, `if/then/else`, quantified expressions,
//! `for ... in ... return ...`, and the restricted unary-test sub-grammar used
//! for allowed-value and decision-table constraints.

pub mod error;
pub mod lexer;
pub mod parser;

pub use error::{ParseError, Result};
pub use lexer::{Lexer, Token};
pub use parser::Parser;

use verdict_core::ast::{Expression, UnaryTests};

/// Parse a full expression from source text
pub fn parse(source: &str) -> Result<Expression> {
    log::trace!("parsing expression: {}", source);
    Parser::new(source)?.parse_expression_source()
}

/// Parse a unary-test list from source text
pub fn parse_unary_tests(source: &str) -> Result<UnaryTests> {
    log::trace!("parsing unary tests: {}", source);
    Parser::new(source)?.parse_unary_tests_source()
}
