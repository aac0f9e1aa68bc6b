//! The AST to compiled-expression pass
//!
//! A single static walk over the AST. Built-in function identities are
//! resolved here by name and arity; unresolved names become dynamic call
//! nodes looked up against the evaluation context at each invocation. No
//! constant subexpression is folded: ambient values such as the current date
//! make even literal-looking expressions context-dependent.

use crate::builtins::{self, Builtin};
use crate::error::{CompileError, Result};
use std::collections::HashSet;
use verdict_core::ast::{BinaryOp, Expression, Quantifier, UnaryTest, UnaryTests};
use verdict_core::Value;

/// The reserved name the implicit unary-test candidate is bound under
pub const CANDIDATE_NAME: &str = "?";

/// Immutable, reusable executable form of one expression.
///
/// Holds no reference back to the originating AST beyond the source text kept
/// for error location reporting. Safe to cache and share across evaluation
/// runs.
#[derive(Debug, Clone)]
pub struct CompiledExpression {
    root: CompiledNode,
    source: String,
}

impl CompiledExpression {
    /// The executable root node
    pub fn root(&self) -> &CompiledNode {
        &self.root
    }

    /// The original source text, for failure reporting
    pub fn source(&self) -> &str {
        &self.source
    }
}

/// Executable node forms
#[derive(Debug, Clone)]
pub enum CompiledNode {
    Constant(Value),
    Name(String),
    QualifiedName(Vec<String>),
    Negation(Box<CompiledNode>),
    Binary {
        left: Box<CompiledNode>,
        op: BinaryOp,
        right: Box<CompiledNode>,
    },
    Between {
        value: Box<CompiledNode>,
        low: Box<CompiledNode>,
        high: Box<CompiledNode>,
    },
    In {
        value: Box<CompiledNode>,
        tests: CompiledTests,
    },
    If {
        condition: Box<CompiledNode>,
        then_node: Box<CompiledNode>,
        else_node: Box<CompiledNode>,
    },
    For {
        bindings: Vec<(String, CompiledNode)>,
        body: Box<CompiledNode>,
    },
    Quantified {
        quantifier: Quantifier,
        bindings: Vec<(String, CompiledNode)>,
        satisfies: Box<CompiledNode>,
    },
    List(Vec<CompiledNode>),
    Context(Vec<(String, CompiledNode)>),
    /// A call bound to the built-in library at compile time
    BuiltinCall {
        builtin: &'static Builtin,
        args: Vec<CompiledNode>,
    },
    /// A call resolved against the context at evaluation time
    DynamicCall {
        name: String,
        args: Vec<CompiledNode>,
    },
    Path {
        base: Box<CompiledNode>,
        segments: Vec<String>,
    },
    Filter {
        base: Box<CompiledNode>,
        predicate: Box<CompiledNode>,
    },
    UnaryTests(CompiledTests),
}

/// Compiled unary-test list
#[derive(Debug, Clone)]
pub struct CompiledTests {
    pub negated: bool,
    pub tests: Vec<CompiledTest>,
}

/// A single compiled unary test
#[derive(Debug, Clone)]
pub enum CompiledTest {
    /// Matches any candidate
    Any,
    /// `op` applied as `candidate op operand`
    Comparison {
        op: BinaryOp,
        operand: CompiledNode,
    },
    /// Interval membership with per-endpoint open/closed flags
    Interval {
        start_closed: bool,
        start: CompiledNode,
        end: CompiledNode,
        end_closed: bool,
    },
    /// Equality against the candidate
    Equal(CompiledNode),
    /// An expression referencing the candidate explicitly, evaluated as a
    /// boolean test
    Boolean(CompiledNode),
}

/// The AST to executable-form compiler
pub struct Compiler;

impl Compiler {
    /// Compile a full expression
    pub fn compile(expression: &Expression, source: impl Into<String>) -> Result<CompiledExpression> {
        Ok(CompiledExpression {
            root: Self::compile_node(expression)?,
            source: source.into(),
        })
    }

    /// Compile a unary-test list into an executable form evaluated against
    /// the implicit candidate
    pub fn compile_unary_tests(
        tests: &UnaryTests,
        source: impl Into<String>,
    ) -> Result<CompiledExpression> {
        Ok(CompiledExpression {
            root: CompiledNode::UnaryTests(Self::compile_tests(tests)?),
            source: source.into(),
        })
    }

    fn compile_node(expression: &Expression) -> Result<CompiledNode> {
        Ok(match expression {
            Expression::Literal(value) => CompiledNode::Constant(value.clone()),
            Expression::Name(name) => CompiledNode::Name(name.clone()),
            Expression::QualifiedName(segments) => CompiledNode::QualifiedName(segments.clone()),
            Expression::Negation(operand) => {
                CompiledNode::Negation(Box::new(Self::compile_node(operand)?))
            }
            Expression::Binary { left, op, right } => CompiledNode::Binary {
                left: Box::new(Self::compile_node(left)?),
                op: *op,
                right: Box::new(Self::compile_node(right)?),
            },
            Expression::Between { value, low, high } => CompiledNode::Between {
                value: Box::new(Self::compile_node(value)?),
                low: Box::new(Self::compile_node(low)?),
                high: Box::new(Self::compile_node(high)?),
            },
            Expression::In { value, tests } => CompiledNode::In {
                value: Box::new(Self::compile_node(value)?),
                tests: Self::compile_tests(tests)?,
            },
            Expression::If {
                condition,
                then_expr,
                else_expr,
            } => CompiledNode::If {
                condition: Box::new(Self::compile_node(condition)?),
                then_node: Box::new(Self::compile_node(then_expr)?),
                else_node: Box::new(Self::compile_node(else_expr)?),
            },
            Expression::For { bindings, body } => CompiledNode::For {
                bindings: Self::compile_bindings(bindings)?,
                body: Box::new(Self::compile_node(body)?),
            },
            Expression::Quantified {
                quantifier,
                bindings,
                satisfies,
            } => CompiledNode::Quantified {
                quantifier: *quantifier,
                bindings: Self::compile_bindings(bindings)?,
                satisfies: Box::new(Self::compile_node(satisfies)?),
            },
            Expression::Range { .. } => {
                // A range outside a test position only ever appears inside
                // compiled tests; reaching one here means the expression uses
                // it as a plain value, which the evaluator rejects. Compile it
                // through the test representation for uniformity.
                let test = Self::compile_range_test(expression)?;
                CompiledNode::UnaryTests(CompiledTests {
                    negated: false,
                    tests: vec![test],
                })
            }
            Expression::List(items) => CompiledNode::List(
                items
                    .iter()
                    .map(Self::compile_node)
                    .collect::<Result<Vec<_>>>()?,
            ),
            Expression::Context(entries) => {
                let mut seen = HashSet::new();
                for (key, _) in entries {
                    if !seen.insert(key.as_str()) {
                        return Err(CompileError::DuplicateContextKey { key: key.clone() });
                    }
                }
                CompiledNode::Context(
                    entries
                        .iter()
                        .map(|(key, value)| Ok((key.clone(), Self::compile_node(value)?)))
                        .collect::<Result<Vec<_>>>()?,
                )
            }
            Expression::FunctionCall { name, args } => {
                let compiled_args = args
                    .iter()
                    .map(Self::compile_node)
                    .collect::<Result<Vec<_>>>()?;

                match builtins::lookup(name) {
                    Some(builtin) => {
                        if !builtin.accepts_arity(compiled_args.len()) {
                            return Err(CompileError::ArityMismatch {
                                name: name.clone(),
                                expected: builtin.arity_description(),
                                got: compiled_args.len(),
                            });
                        }
                        CompiledNode::BuiltinCall {
                            builtin,
                            args: compiled_args,
                        }
                    }
                    None => {
                        log::debug!("deferring resolution of function '{}' to evaluation", name);
                        CompiledNode::DynamicCall {
                            name: name.clone(),
                            args: compiled_args,
                        }
                    }
                }
            }
            Expression::Path { base, segments } => CompiledNode::Path {
                base: Box::new(Self::compile_node(base)?),
                segments: segments.clone(),
            },
            Expression::Filter { base, predicate } => CompiledNode::Filter {
                base: Box::new(Self::compile_node(base)?),
                predicate: Box::new(Self::compile_node(predicate)?),
            },
            Expression::UnaryTests(tests) => CompiledNode::UnaryTests(Self::compile_tests(tests)?),
        })
    }

    fn compile_bindings(
        bindings: &[verdict_core::ast::Binding],
    ) -> Result<Vec<(String, CompiledNode)>> {
        bindings
            .iter()
            .map(|b| Ok((b.name.clone(), Self::compile_node(&b.source)?)))
            .collect()
    }

    fn compile_tests(tests: &UnaryTests) -> Result<CompiledTests> {
        Ok(CompiledTests {
            negated: tests.negated,
            tests: tests
                .tests
                .iter()
                .map(Self::compile_test)
                .collect::<Result<Vec<_>>>()?,
        })
    }

    fn compile_test(test: &UnaryTest) -> Result<CompiledTest> {
        Ok(match test {
            UnaryTest::Any => CompiledTest::Any,
            UnaryTest::Comparison { op, operand } => CompiledTest::Comparison {
                op: *op,
                operand: Self::compile_node(operand)?,
            },
            UnaryTest::Interval(range) => Self::compile_range_test(range)?,
            UnaryTest::Equal(expression) => {
                // A test that names the candidate explicitly is a boolean
                // expression, not an equality
                if references_candidate(expression) {
                    CompiledTest::Boolean(Self::compile_node(expression)?)
                } else {
                    CompiledTest::Equal(Self::compile_node(expression)?)
                }
            }
        })
    }

    fn compile_range_test(range: &Expression) -> Result<CompiledTest> {
        match range {
            Expression::Range {
                start_closed,
                start,
                end,
                end_closed,
            } => Ok(CompiledTest::Interval {
                start_closed: *start_closed,
                start: Self::compile_node(start)?,
                end: Self::compile_node(end)?,
                end_closed: *end_closed,
            }),
            _ => unreachable!("compile_range_test is only called with Range nodes"),
        }
    }
}

/// Check whether an expression references the implicit candidate name
fn references_candidate(expression: &Expression) -> bool {
    match expression {
        Expression::Name(name) => name == CANDIDATE_NAME,
        Expression::QualifiedName(segments) => {
            segments.first().map(|s| s == CANDIDATE_NAME).unwrap_or(false)
        }
        Expression::Literal(_) => false,
        Expression::Negation(operand) => references_candidate(operand),
        Expression::Binary { left, right, .. } => {
            references_candidate(left) || references_candidate(right)
        }
        Expression::Between { value, low, high } => {
            references_candidate(value) || references_candidate(low) || references_candidate(high)
        }
        Expression::In { value, tests } => {
            references_candidate(value)
                || tests.tests.iter().any(|t| match t {
                    UnaryTest::Any => false,
                    UnaryTest::Comparison { operand, .. } => references_candidate(operand),
                    UnaryTest::Interval(range) => references_candidate(range),
                    UnaryTest::Equal(expr) => references_candidate(expr),
                })
        }
        Expression::If {
            condition,
            then_expr,
            else_expr,
        } => {
            references_candidate(condition)
                || references_candidate(then_expr)
                || references_candidate(else_expr)
        }
        Expression::For { bindings, body } => {
            bindings.iter().any(|b| references_candidate(&b.source)) || references_candidate(body)
        }
        Expression::Quantified {
            bindings,
            satisfies,
            ..
        } => {
            bindings.iter().any(|b| references_candidate(&b.source))
                || references_candidate(satisfies)
        }
        Expression::Range { start, end, .. } => {
            references_candidate(start) || references_candidate(end)
        }
        Expression::List(items) => items.iter().any(references_candidate),
        Expression::Context(entries) => entries.iter().any(|(_, v)| references_candidate(v)),
        Expression::FunctionCall { args, .. } => args.iter().any(references_candidate),
        Expression::Path { base, .. } => references_candidate(base),
        Expression::Filter { base, predicate } => {
            references_candidate(base) || references_candidate(predicate)
        }
        Expression::UnaryTests(tests) => tests.tests.iter().any(|t| match t {
            UnaryTest::Any => false,
            UnaryTest::Comparison { operand, .. } => references_candidate(operand),
            UnaryTest::Interval(range) => references_candidate(range),
            UnaryTest::Equal(expr) => references_candidate(expr),
        }),
    }
}
