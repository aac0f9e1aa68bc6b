//! Expression AST nodes
//!
//! The abstract syntax tree produced by the parser. Name lookups are not
//! resolved here; every name is carried symbolically and bound at evaluation
//! time against the evaluation context.

use super::operator::BinaryOp;
use crate::types::Value;
use serde::{Deserialize, Serialize};

/// Expression AST node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expression {
    /// Literal value
    Literal(Value),

    /// Bare name reference, resolved against the context chain
    Name(String),

    /// Dotted name composed of ordered segments, scope-narrowing left to right
    /// (outer context to inner field)
    QualifiedName(Vec<String>),

    /// Arithmetic negation (`-x`)
    Negation(Box<Expression>),

    /// Binary operation
    Binary {
        left: Box<Expression>,
        op: BinaryOp,
        right: Box<Expression>,
    },

    /// Inclusive range test: `value between low and high`
    Between {
        value: Box<Expression>,
        low: Box<Expression>,
        high: Box<Expression>,
    },

    /// Membership test: `value in tests`
    In {
        value: Box<Expression>,
        tests: UnaryTests,
    },

    /// Conditional: `if condition then a else b`
    If {
        condition: Box<Expression>,
        then_expr: Box<Expression>,
        else_expr: Box<Expression>,
    },

    /// Iteration: `for x in xs return body`
    For {
        bindings: Vec<Binding>,
        body: Box<Expression>,
    },

    /// Quantified expression: `some x in xs satisfies p` / `every x in xs satisfies p`
    Quantified {
        quantifier: Quantifier,
        bindings: Vec<Binding>,
        satisfies: Box<Expression>,
    },

    /// Interval with per-endpoint open/closed flags: `[a..b]`, `(a..b]`, `]a..b[`
    Range {
        start_closed: bool,
        start: Box<Expression>,
        end: Box<Expression>,
        end_closed: bool,
    },

    /// List constructor: `[a, b, c]`
    List(Vec<Expression>),

    /// Context constructor: `{key: value, ...}`; entries are ordered and each
    /// entry is in scope for the entries that follow it
    Context(Vec<(String, Expression)>),

    /// Function invocation
    FunctionCall { name: String, args: Vec<Expression> },

    /// Path access into a record value: `base.segment1.segment2`
    Path {
        base: Box<Expression>,
        segments: Vec<String>,
    },

    /// Filter over a list: `base[predicate]`; a numeric predicate selects by
    /// 1-based index
    Filter {
        base: Box<Expression>,
        predicate: Box<Expression>,
    },

    /// Unary tests, evaluated against the implicit candidate value
    UnaryTests(UnaryTests),
}

/// An iteration binding: `name in source`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Binding {
    pub name: String,
    pub source: Expression,
}

/// Quantifier kind for quantified expressions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Quantifier {
    Some,
    Every,
}

/// A restricted test sub-grammar used for allowed-value constraints and
/// decision-table inputs. The candidate value is bound under the reserved
/// name `?` during evaluation; a list of tests is an implicit OR.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnaryTests {
    /// Whether the whole list is wrapped in `not(...)`
    pub negated: bool,
    pub tests: Vec<UnaryTest>,
}

/// A single unary test
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum UnaryTest {
    /// `-`: matches any candidate
    Any,
    /// A comparison against the candidate: `< 5` means `? < 5`
    Comparison { op: BinaryOp, operand: Expression },
    /// Interval membership; the expression is always `Expression::Range`
    Interval(Expression),
    /// A bare expression, compared for equality with the candidate
    Equal(Expression),
}

impl Expression {
    /// Create a literal expression
    pub fn literal(value: Value) -> Self {
        Expression::Literal(value)
    }

    /// Create a name reference
    pub fn name(name: impl Into<String>) -> Self {
        Expression::Name(name.into())
    }

    /// Create a qualified name from ordered segments
    pub fn qualified_name(segments: Vec<String>) -> Self {
        Expression::QualifiedName(segments)
    }

    /// Create a binary expression
    pub fn binary(left: Expression, op: BinaryOp, right: Expression) -> Self {
        Expression::Binary {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    /// Create a function call expression
    pub fn function_call(name: impl Into<String>, args: Vec<Expression>) -> Self {
        Expression::FunctionCall {
            name: name.into(),
            args,
        }
    }

    /// Create an if/then/else expression
    pub fn if_then_else(condition: Expression, then_expr: Expression, else_expr: Expression) -> Self {
        Expression::If {
            condition: Box::new(condition),
            then_expr: Box::new(then_expr),
            else_expr: Box::new(else_expr),
        }
    }
}

impl UnaryTests {
    /// A test list that accepts any candidate
    pub fn any() -> Self {
        UnaryTests {
            negated: false,
            tests: vec![UnaryTest::Any],
        }
    }
}
