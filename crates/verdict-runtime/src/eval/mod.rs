//! Tree-walking evaluator
//!
//! Executes a compiled expression against an evaluation context and returns
//! a value or a structured failure. Single-threaded per invocation, fully
//! synchronous, never mutates the input context: every nested scope (a `for`
//! binding, a context constructor, a function invocation) is an isolated
//! child mapping discarded when that subexpression completes.
//!
//! Unresolved names yield null rather than failing; only an unresolved
//! function name (or arity) at a call site is a failure.

mod operators;

use crate::context::EvaluationContext;
use chrono::{Datelike, Timelike};
use crate::error::{Result, RuntimeError};
use crate::result::{EvaluationFailure, EvaluationResult};
use operators::{arithmetic, equality, ordered, truth};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::cmp::Ordering;
use std::collections::HashMap;
use verdict_compiler::{
    CompiledExpression, CompiledNode, CompiledTest, CompiledTests, CANDIDATE_NAME,
};
use verdict_core::ast::{BinaryOp, Quantifier};
use verdict_core::Value;

/// Name each filtered element is bound under inside a filter predicate
const ITEM_NAME: &str = "item";

/// Guard against runaway user-function recursion
const MAX_CALL_DEPTH: usize = 64;

/// The expression evaluator
pub struct Evaluator;

impl Evaluator {
    /// Evaluate a compiled expression against a context
    pub fn evaluate(expression: &CompiledExpression, ctx: &EvaluationContext) -> EvaluationResult {
        match Self::eval(expression.root(), ctx, 0) {
            Ok(value) => EvaluationResult::success(value),
            Err(error) => EvaluationResult::failure(
                EvaluationFailure::from(error).with_source(expression.source()),
            ),
        }
    }

    /// Evaluate a compiled expression with the implicit candidate bound,
    /// used for allowed-value constraints and decision-table tests
    pub fn evaluate_with_candidate(
        expression: &CompiledExpression,
        candidate: &Value,
        ctx: &EvaluationContext,
    ) -> EvaluationResult {
        let mut child = ctx.child();
        child.bind(CANDIDATE_NAME, candidate.clone());
        match Self::eval(expression.root(), &child, 0) {
            Ok(value) => EvaluationResult::success(value),
            Err(error) => EvaluationResult::failure(
                EvaluationFailure::from(error).with_source(expression.source()),
            ),
        }
    }

    fn eval(node: &CompiledNode, ctx: &EvaluationContext, depth: usize) -> Result<Value> {
        match node {
            CompiledNode::Constant(value) => Ok(value.clone()),

            CompiledNode::Name(name) => Ok(ctx.lookup(name).cloned().unwrap_or(Value::Null)),

            CompiledNode::QualifiedName(segments) => {
                if let Some(base) = ctx.lookup(&segments[0]) {
                    let mut value = base.clone();
                    for segment in &segments[1..] {
                        value = Self::path_step(&value, segment);
                    }
                    Ok(value)
                } else if let Some(value) = ctx.lookup(&segments.join(".")) {
                    // Import-qualified names may be bound under their full
                    // dotted form
                    Ok(value.clone())
                } else {
                    Ok(Value::Null)
                }
            }

            CompiledNode::Negation(operand) => match Self::eval(operand, ctx, depth)? {
                Value::Null => Ok(Value::Null),
                Value::Number(n) => Ok(Value::Number(-n)),
                other => Err(RuntimeError::TypeError(format!(
                    "cannot negate {}",
                    other.type_name()
                ))),
            },

            CompiledNode::Binary { left, op, right } => match op {
                BinaryOp::And => Self::eval_and(left, right, ctx, depth),
                BinaryOp::Or => Self::eval_or(left, right, ctx, depth),
                BinaryOp::Eq => {
                    let l = Self::eval(left, ctx, depth)?;
                    let r = Self::eval(right, ctx, depth)?;
                    Ok(Value::Boolean(equality(&l, &r)))
                }
                BinaryOp::Ne => {
                    let l = Self::eval(left, ctx, depth)?;
                    let r = Self::eval(right, ctx, depth)?;
                    Ok(Value::Boolean(!equality(&l, &r)))
                }
                BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
                    let l = Self::eval(left, ctx, depth)?;
                    let r = Self::eval(right, ctx, depth)?;
                    ordered(&l, *op, &r)
                }
                BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Pow => {
                    let l = Self::eval(left, ctx, depth)?;
                    let r = Self::eval(right, ctx, depth)?;
                    arithmetic(&l, *op, &r)
                }
            },

            CompiledNode::Between { value, low, high } => {
                let v = Self::eval(value, ctx, depth)?;
                let lo = Self::eval(low, ctx, depth)?;
                let hi = Self::eval(high, ctx, depth)?;
                if v.is_null() || lo.is_null() || hi.is_null() {
                    return Ok(Value::Null);
                }
                let above = ordered(&v, BinaryOp::Ge, &lo)?;
                let below = ordered(&v, BinaryOp::Le, &hi)?;
                match (truth(&above), truth(&below)) {
                    (Some(a), Some(b)) => Ok(Value::Boolean(a && b)),
                    _ => Ok(Value::Null),
                }
            }

            CompiledNode::In { value, tests } => {
                let candidate = Self::eval(value, ctx, depth)?;
                Self::eval_tests(tests, &candidate, ctx, depth)
            }

            CompiledNode::If {
                condition,
                then_node,
                else_node,
            } => {
                let cond = Self::eval(condition, ctx, depth)?;
                // Anything but a definite true selects the else branch
                if truth(&cond) == Some(true) {
                    Self::eval(then_node, ctx, depth)
                } else {
                    Self::eval(else_node, ctx, depth)
                }
            }

            CompiledNode::For { bindings, body } => {
                let mut results = Vec::new();
                Self::iterate_bindings(bindings, ctx, depth, &mut |scope| {
                    results.push(Self::eval(body, scope, depth)?);
                    Ok(true)
                })?;
                Ok(Value::List(results))
            }

            CompiledNode::Quantified {
                quantifier,
                bindings,
                satisfies,
            } => {
                let mut decided: Option<bool> = None;
                let mut saw_unknown = false;
                Self::iterate_bindings(bindings, ctx, depth, &mut |scope| {
                    let outcome = truth(&Self::eval(satisfies, scope, depth)?);
                    match (quantifier, outcome) {
                        (Quantifier::Some, Some(true)) => {
                            decided = Some(true);
                            Ok(false)
                        }
                        (Quantifier::Every, Some(false)) => {
                            decided = Some(false);
                            Ok(false)
                        }
                        (_, None) => {
                            saw_unknown = true;
                            Ok(true)
                        }
                        _ => Ok(true),
                    }
                })?;

                Ok(match decided {
                    Some(result) => Value::Boolean(result),
                    None if saw_unknown => Value::Null,
                    None => Value::Boolean(*quantifier == Quantifier::Every),
                })
            }

            CompiledNode::List(items) => {
                let values = items
                    .iter()
                    .map(|item| Self::eval(item, ctx, depth))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Value::List(values))
            }

            CompiledNode::Context(entries) => {
                // Each entry is in scope for the entries that follow it
                let mut scope = ctx.child();
                let mut values = HashMap::new();
                for (key, node) in entries {
                    let value = Self::eval(node, &scope, depth)?;
                    scope.bind(key.clone(), value.clone());
                    values.insert(key.clone(), value);
                }
                Ok(Value::Context(values))
            }

            CompiledNode::BuiltinCall { builtin, args } => {
                let values = args
                    .iter()
                    .map(|arg| Self::eval(arg, ctx, depth))
                    .collect::<Result<Vec<_>>>()?;
                (builtin.func)(&values).map_err(|message| RuntimeError::FunctionFailed {
                    name: builtin.name.to_string(),
                    message,
                })
            }

            CompiledNode::DynamicCall { name, args } => {
                let function = match ctx.lookup_function(name) {
                    Some(function) => function.clone(),
                    None => {
                        return Err(RuntimeError::UnknownFunction {
                            name: name.clone(),
                            arity: args.len(),
                        })
                    }
                };
                if function.parameters.len() != args.len() {
                    return Err(RuntimeError::UnknownFunction {
                        name: name.clone(),
                        arity: args.len(),
                    });
                }
                if depth >= MAX_CALL_DEPTH {
                    return Err(RuntimeError::RecursionLimit { name: name.clone() });
                }

                let values = args
                    .iter()
                    .map(|arg| Self::eval(arg, ctx, depth))
                    .collect::<Result<Vec<_>>>()?;

                let mut scope = ctx.child();
                for (parameter, value) in function.parameters.iter().zip(values) {
                    scope.bind(parameter.clone(), value);
                }
                Self::eval(function.body.root(), &scope, depth + 1)
            }

            CompiledNode::Path { base, segments } => {
                let mut value = Self::eval(base, ctx, depth)?;
                for segment in segments {
                    value = Self::path_step(&value, segment);
                }
                Ok(value)
            }

            CompiledNode::Filter { base, predicate } => {
                Self::eval_filter(base, predicate, ctx, depth)
            }

            CompiledNode::UnaryTests(tests) => {
                let candidate = ctx.lookup(CANDIDATE_NAME).cloned().unwrap_or(Value::Null);
                Self::eval_tests(tests, &candidate, ctx, depth)
            }
        }
    }

    fn eval_and(
        left: &CompiledNode,
        right: &CompiledNode,
        ctx: &EvaluationContext,
        depth: usize,
    ) -> Result<Value> {
        let l = truth(&Self::eval(left, ctx, depth)?);
        if l == Some(false) {
            return Ok(Value::Boolean(false));
        }
        let r = truth(&Self::eval(right, ctx, depth)?);
        Ok(match (l, r) {
            (_, Some(false)) => Value::Boolean(false),
            (Some(true), Some(true)) => Value::Boolean(true),
            _ => Value::Null,
        })
    }

    fn eval_or(
        left: &CompiledNode,
        right: &CompiledNode,
        ctx: &EvaluationContext,
        depth: usize,
    ) -> Result<Value> {
        let l = truth(&Self::eval(left, ctx, depth)?);
        if l == Some(true) {
            return Ok(Value::Boolean(true));
        }
        let r = truth(&Self::eval(right, ctx, depth)?);
        Ok(match (l, r) {
            (_, Some(true)) => Value::Boolean(true),
            (Some(false), Some(false)) => Value::Boolean(false),
            _ => Value::Null,
        })
    }

    /// Run `body` once per combination of binding values, each combination in
    /// its own child scope. The callback returns `false` to stop early.
    fn iterate_bindings(
        bindings: &[(String, CompiledNode)],
        ctx: &EvaluationContext,
        depth: usize,
        body: &mut dyn FnMut(&EvaluationContext) -> Result<bool>,
    ) -> Result<bool> {
        match bindings.split_first() {
            None => body(ctx),
            Some(((name, source), rest)) => {
                let items = match Self::eval(source, ctx, depth)? {
                    Value::List(items) => items,
                    // A null source contributes no iterations
                    Value::Null => return Ok(true),
                    other => {
                        return Err(RuntimeError::TypeError(format!(
                            "iteration source must be a list, got {}",
                            other.type_name()
                        )))
                    }
                };
                for item in items {
                    let mut scope = ctx.child();
                    scope.bind(name.clone(), item);
                    if !Self::iterate_bindings(rest, &scope, depth, body)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
        }
    }

    fn eval_filter(
        base: &CompiledNode,
        predicate: &CompiledNode,
        ctx: &EvaluationContext,
        depth: usize,
    ) -> Result<Value> {
        let items = match Self::eval(base, ctx, depth)? {
            Value::List(items) => items,
            Value::Null => return Ok(Value::Null),
            other => {
                return Err(RuntimeError::TypeError(format!(
                    "cannot filter {}",
                    other.type_name()
                )))
            }
        };

        // A constant numeric predicate is 1-based index selection
        if let CompiledNode::Constant(Value::Number(index)) = predicate {
            return Ok(Self::index_into(&items, *index));
        }
        if let CompiledNode::Negation(inner) = predicate {
            if let CompiledNode::Constant(Value::Number(index)) = inner.as_ref() {
                return Ok(Self::index_into(&items, -*index));
            }
        }

        let mut kept = Vec::new();
        for item in &items {
            let mut scope = ctx.child();
            scope.bind(ITEM_NAME, item.clone());
            if let Value::Context(fields) = item {
                for (key, value) in fields {
                    scope.bind(key.clone(), value.clone());
                }
            }
            match Self::eval(predicate, &scope, depth)? {
                Value::Boolean(true) => kept.push(item.clone()),
                Value::Boolean(false) | Value::Null => {}
                // A predicate that computes a number selects by index
                Value::Number(index) => return Ok(Self::index_into(&items, index)),
                other => {
                    return Err(RuntimeError::TypeError(format!(
                        "filter predicate must be a boolean, got {}",
                        other.type_name()
                    )))
                }
            }
        }
        Ok(Value::List(kept))
    }

    fn index_into(items: &[Value], index: Decimal) -> Value {
        let i = match index.to_i64().filter(|_| index.is_integer()) {
            Some(i) => i,
            None => return Value::Null,
        };
        let len = items.len() as i64;
        let position = if i > 0 { i - 1 } else { len + i };
        if position < 0 || position >= len {
            return Value::Null;
        }
        items[position as usize].clone()
    }

    fn eval_tests(
        tests: &CompiledTests,
        candidate: &Value,
        ctx: &EvaluationContext,
        depth: usize,
    ) -> Result<Value> {
        let mut scope = ctx.child();
        scope.bind(CANDIDATE_NAME, candidate.clone());

        let mut matched = false;
        for test in &tests.tests {
            if Self::test_matches(test, candidate, &scope, depth)? {
                matched = true;
                break;
            }
        }

        Ok(Value::Boolean(if tests.negated { !matched } else { matched }))
    }

    fn test_matches(
        test: &CompiledTest,
        candidate: &Value,
        scope: &EvaluationContext,
        depth: usize,
    ) -> Result<bool> {
        match test {
            CompiledTest::Any => Ok(true),

            CompiledTest::Comparison { op, operand } => {
                let operand = Self::eval(operand, scope, depth)?;
                Ok(match op {
                    BinaryOp::Eq => equality(candidate, &operand),
                    BinaryOp::Ne => !equality(candidate, &operand),
                    // An incomparable candidate simply does not match
                    _ => match candidate.compare(&operand) {
                        Some(Ordering::Less) => matches!(op, BinaryOp::Lt | BinaryOp::Le),
                        Some(Ordering::Equal) => matches!(op, BinaryOp::Le | BinaryOp::Ge),
                        Some(Ordering::Greater) => matches!(op, BinaryOp::Gt | BinaryOp::Ge),
                        None => false,
                    },
                })
            }

            CompiledTest::Interval {
                start_closed,
                start,
                end,
                end_closed,
            } => {
                let start = Self::eval(start, scope, depth)?;
                let end = Self::eval(end, scope, depth)?;

                let above = match candidate.compare(&start) {
                    Some(Ordering::Greater) => true,
                    Some(Ordering::Equal) => *start_closed,
                    _ => false,
                };
                if !above {
                    return Ok(false);
                }
                Ok(match candidate.compare(&end) {
                    Some(Ordering::Less) => true,
                    Some(Ordering::Equal) => *end_closed,
                    _ => false,
                })
            }

            CompiledTest::Equal(node) => {
                let value = Self::eval(node, scope, depth)?;
                // A bare list means membership
                Ok(match &value {
                    Value::List(items) => items.contains(candidate),
                    _ => equality(candidate, &value),
                })
            }

            CompiledTest::Boolean(node) => {
                Ok(truth(&Self::eval(node, scope, depth)?) == Some(true))
            }
        }
    }

    fn path_step(value: &Value, segment: &str) -> Value {
        match value {
            Value::Context(entries) => entries.get(segment).cloned().unwrap_or(Value::Null),
            // Path access over a list projects the segment per element
            Value::List(items) => {
                Value::List(items.iter().map(|item| Self::path_step(item, segment)).collect())
            }
            Value::Date(d) => Self::date_component(segment, d.year() as i64, d.month(), d.day()),
            Value::DateTime(dt) => match segment {
                "hour" => Value::number(dt.hour() as i64),
                "minute" => Value::number(dt.minute() as i64),
                "second" => Value::number(dt.second() as i64),
                _ => Self::date_component(
                    segment,
                    dt.year() as i64,
                    dt.month(),
                    dt.day(),
                ),
            },
            Value::Time(t) => match segment {
                "hour" => Value::number(t.hour() as i64),
                "minute" => Value::number(t.minute() as i64),
                "second" => Value::number(t.second() as i64),
                _ => Value::Null,
            },
            _ => Value::Null,
        }
    }

    fn date_component(segment: &str, year: i64, month: u32, day: u32) -> Value {
        match segment {
            "year" => Value::number(year),
            "month" => Value::number(month as i64),
            "day" => Value::number(day as i64),
            _ => Value::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use verdict_compiler::Compiler;
    use verdict_parser::parse;

    fn eval_src(source: &str, ctx: &EvaluationContext) -> EvaluationResult {
        let ast = parse(source).expect("parse");
        let compiled = Compiler::compile(&ast, source).expect("compile");
        Evaluator::evaluate(&compiled, ctx)
    }

    fn value_of(source: &str, ctx: &EvaluationContext) -> Value {
        match eval_src(source, ctx) {
            EvaluationResult::Success { value } => value,
            EvaluationResult::Failure { failure } => panic!("evaluation failed: {:?}", failure),
        }
    }

    fn empty() -> EvaluationContext<'static> {
        EvaluationContext::new()
    }

    #[test]
    fn test_null_propagation_in_arithmetic() {
        assert_eq!(value_of("null + 1", &empty()), Value::Null);
        assert_eq!(value_of("missing * 2", &empty()), Value::Null);
    }

    #[test]
    fn test_three_valued_logic() {
        assert_eq!(value_of("false and null", &empty()), Value::Boolean(false));
        assert_eq!(value_of("true or null", &empty()), Value::Boolean(true));
        assert_eq!(value_of("null and null", &empty()), Value::Null);
        assert_eq!(value_of("null or null", &empty()), Value::Null);
        assert_eq!(value_of("true and null", &empty()), Value::Null);
        assert_eq!(value_of("false or null", &empty()), Value::Null);
    }

    #[test]
    fn test_short_circuit_skips_failing_operand() {
        // Division by zero on the right is never reached
        assert_eq!(
            value_of("false and 1 / 0 > 1", &empty()),
            Value::Boolean(false)
        );
        assert_eq!(
            value_of("true or 1 / 0 > 1", &empty()),
            Value::Boolean(true)
        );
    }

    #[test]
    fn test_exact_arithmetic() {
        assert_eq!(
            value_of("0.1 + 0.2", &empty()),
            Value::Number("0.3".parse().unwrap())
        );
    }

    #[test]
    fn test_division_by_zero_is_failure() {
        let result = eval_src("1 / 0", &empty());
        assert!(!result.is_success());
    }

    #[test]
    fn test_unresolved_name_is_null() {
        assert_eq!(value_of("unknown_name", &empty()), Value::Null);
        assert_eq!(value_of("a.b.c", &empty()), Value::Null);
    }

    #[test]
    fn test_name_resolution() {
        let mut ctx = EvaluationContext::new();
        ctx.bind("age", Value::number(21));
        assert_eq!(value_of("age >= 18", &ctx), Value::Boolean(true));
    }

    #[test]
    fn test_qualified_name_into_record() {
        let mut ctx = EvaluationContext::new();
        ctx.bind(
            "applicant",
            Value::Context(HashMap::from([
                ("name".to_string(), Value::string("Alice")),
                (
                    "address".to_string(),
                    Value::Context(HashMap::from([(
                        "city".to_string(),
                        Value::string("Oslo"),
                    )])),
                ),
            ])),
        );

        assert_eq!(value_of("applicant.name", &ctx), Value::string("Alice"));
        assert_eq!(value_of("applicant.address.city", &ctx), Value::string("Oslo"));
        assert_eq!(value_of("applicant.missing", &ctx), Value::Null);
    }

    #[test]
    fn test_equality_semantics() {
        assert_eq!(value_of("null = null", &empty()), Value::Boolean(true));
        assert_eq!(value_of("null = 1", &empty()), Value::Boolean(false));
        assert_eq!(value_of("1 != 2", &empty()), Value::Boolean(true));
        assert_eq!(value_of("\"a\" = \"a\"", &empty()), Value::Boolean(true));
    }

    #[test]
    fn test_if_expression() {
        assert_eq!(
            value_of("if 2 > 1 then \"yes\" else \"no\"", &empty()),
            Value::string("yes")
        );
        // A null condition selects the else branch
        assert_eq!(
            value_of("if missing then \"yes\" else \"no\"", &empty()),
            Value::string("no")
        );
    }

    #[test]
    fn test_for_expression() {
        assert_eq!(
            value_of("for x in [1, 2, 3] return x * 2", &empty()),
            Value::List(vec![Value::number(2), Value::number(4), Value::number(6)])
        );
    }

    #[test]
    fn test_for_cartesian_bindings() {
        assert_eq!(
            value_of("for x in [1, 2], y in [10, 20] return x + y", &empty()),
            Value::List(vec![
                Value::number(11),
                Value::number(21),
                Value::number(12),
                Value::number(22),
            ])
        );
    }

    #[test]
    fn test_quantified_expressions() {
        assert_eq!(
            value_of("some x in [1, 2, 3] satisfies x > 2", &empty()),
            Value::Boolean(true)
        );
        assert_eq!(
            value_of("some x in [1, 2, 3] satisfies x > 5", &empty()),
            Value::Boolean(false)
        );
        assert_eq!(
            value_of("every x in [1, 2, 3] satisfies x > 0", &empty()),
            Value::Boolean(true)
        );
        assert_eq!(
            value_of("every x in [1, 2, 3] satisfies x > 1", &empty()),
            Value::Boolean(false)
        );
    }

    #[test]
    fn test_quantified_with_unknown_satisfaction() {
        // No definite witness and one unknown: the result is unknown
        assert_eq!(
            value_of("some x in [1, 2] satisfies x + null > 1", &empty()),
            Value::Null
        );
    }

    #[test]
    fn test_in_range() {
        assert_eq!(value_of("3 in [1..5]", &empty()), Value::Boolean(true));
        assert_eq!(value_of("6 in [1..5]", &empty()), Value::Boolean(false));
        assert_eq!(value_of("1 in (1..5]", &empty()), Value::Boolean(false));
        assert_eq!(value_of("5 in (1..5]", &empty()), Value::Boolean(true));
    }

    #[test]
    fn test_in_test_list() {
        assert_eq!(value_of("3 in (2, 3, 5)", &empty()), Value::Boolean(true));
        assert_eq!(value_of("4 in (2, 3, 5)", &empty()), Value::Boolean(false));
    }

    #[test]
    fn test_between() {
        assert_eq!(value_of("3 between 1 and 5", &empty()), Value::Boolean(true));
        assert_eq!(value_of("6 between 1 and 5", &empty()), Value::Boolean(false));
        assert_eq!(value_of("null between 1 and 5", &empty()), Value::Null);
    }

    #[test]
    fn test_context_literal_sees_earlier_entries() {
        let result = value_of("{base: 10, total: base * 2}", &empty());
        let entries = result.as_context().unwrap();
        assert_eq!(entries.get("total"), Some(&Value::number(20)));
    }

    #[test]
    fn test_filter_by_predicate() {
        let mut ctx = EvaluationContext::new();
        ctx.bind(
            "orders",
            Value::List(vec![
                Value::Context(HashMap::from([("amount".to_string(), Value::number(50))])),
                Value::Context(HashMap::from([("amount".to_string(), Value::number(150))])),
            ]),
        );

        let result = value_of("orders[amount > 100]", &ctx);
        match result {
            Value::List(items) => assert_eq!(items.len(), 1),
            other => panic!("Expected list, got {:?}", other),
        }
    }

    #[test]
    fn test_filter_by_index() {
        let mut ctx = EvaluationContext::new();
        ctx.bind(
            "xs",
            Value::List(vec![Value::number(10), Value::number(20), Value::number(30)]),
        );

        assert_eq!(value_of("xs[1]", &ctx), Value::number(10));
        assert_eq!(value_of("xs[3]", &ctx), Value::number(30));
        assert_eq!(value_of("xs[-1]", &ctx), Value::number(30));
        assert_eq!(value_of("xs[9]", &ctx), Value::Null);
    }

    #[test]
    fn test_path_projection_over_list() {
        let mut ctx = EvaluationContext::new();
        ctx.bind(
            "people",
            Value::List(vec![
                Value::Context(HashMap::from([("age".to_string(), Value::number(20))])),
                Value::Context(HashMap::from([("age".to_string(), Value::number(30))])),
            ]),
        );

        assert_eq!(
            value_of("people.age", &ctx),
            Value::List(vec![Value::number(20), Value::number(30)])
        );
    }

    #[test]
    fn test_temporal_components() {
        assert_eq!(value_of("@\"2024-03-15\".year", &empty()), Value::number(2024));
        assert_eq!(value_of("@\"2024-03-15\".month", &empty()), Value::number(3));
        assert_eq!(
            value_of("@\"2024-03-15T10:30:00\".hour", &empty()),
            Value::number(10)
        );
    }

    #[test]
    fn test_temporal_comparison() {
        assert_eq!(
            value_of("@\"2024-01-01\" < @\"2024-06-01\"", &empty()),
            Value::Boolean(true)
        );
    }

    #[test]
    fn test_builtin_invocation() {
        assert_eq!(value_of("sum(1, 2, 3)", &empty()), Value::number(6));
        assert_eq!(
            value_of("upper_case(\"abc\")", &empty()),
            Value::string("ABC")
        );
        assert_eq!(value_of("not(true)", &empty()), Value::Boolean(false));
    }

    #[test]
    fn test_unknown_function_is_failure() {
        let result = eval_src("no_such_function(1)", &empty());
        let failure = result.as_failure().unwrap();
        assert!(failure.message.contains("no_such_function"));
    }

    #[test]
    fn test_user_function_invocation() {
        let ast = parse("amount * 0.1").unwrap();
        let body = Arc::new(Compiler::compile(&ast, "amount * 0.1").unwrap());

        let mut ctx = EvaluationContext::new();
        ctx.bind_function(
            "discount",
            crate::context::UserFunction::new(vec!["amount".to_string()], body),
        );

        assert_eq!(value_of("discount(200)", &ctx), Value::number(20));
    }

    #[test]
    fn test_user_function_wrong_arity_is_failure() {
        let ast = parse("x").unwrap();
        let body = Arc::new(Compiler::compile(&ast, "x").unwrap());

        let mut ctx = EvaluationContext::new();
        ctx.bind_function(
            "f",
            crate::context::UserFunction::new(vec!["x".to_string()], body),
        );

        let result = eval_src("f(1, 2)", &ctx);
        assert!(!result.is_success());
    }

    #[test]
    fn test_context_is_not_mutated_by_evaluation() {
        let mut ctx = EvaluationContext::new();
        ctx.bind("x", Value::number(1));

        let _ = value_of("for x in [9, 10] return x", &ctx);
        assert_eq!(ctx.lookup("x"), Some(&Value::number(1)));
    }

    #[test]
    fn test_evaluation_is_deterministic() {
        let mut ctx = EvaluationContext::new();
        ctx.bind("x", Value::number(7));

        let ast = parse("x * 2 + 1").unwrap();
        let compiled = Compiler::compile(&ast, "x * 2 + 1").unwrap();
        let first = Evaluator::evaluate(&compiled, &ctx);
        let second = Evaluator::evaluate(&compiled, &ctx);
        assert_eq!(first, second);
    }

    #[test]
    fn test_evaluate_with_candidate() {
        let tests = verdict_parser::parse_unary_tests("[1..5]").unwrap();
        let compiled = Compiler::compile_unary_tests(&tests, "[1..5]").unwrap();

        let ctx = empty();
        let inside = Evaluator::evaluate_with_candidate(&compiled, &Value::number(3), &ctx);
        let outside = Evaluator::evaluate_with_candidate(&compiled, &Value::number(6), &ctx);

        assert_eq!(inside.value(), Some(&Value::Boolean(true)));
        assert_eq!(outside.value(), Some(&Value::Boolean(false)));
    }

    #[test]
    fn test_failure_carries_expression_source() {
        let result = eval_src("1 / 0", &empty());
        assert_eq!(result.as_failure().unwrap().source.as_deref(), Some("1 / 0"));
    }
}
