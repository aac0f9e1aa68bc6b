//! Decision logic evaluation contract
//!
//! Decisions carry different kinds of logic (literal expressions today,
//! decision tables and other boxed expressions behind the same contract).
//! The runtime only depends on this trait: given a context, produce an
//! evaluation result.

use crate::context::EvaluationContext;
use crate::eval::Evaluator;
use crate::result::EvaluationResult;
use std::sync::Arc;
use verdict_compiler::CompiledExpression;

/// Capability contract for evaluating one decision's logic
pub trait DecisionLogicEvaluator {
    fn evaluate(&self, ctx: &EvaluationContext) -> EvaluationResult;
}

/// Evaluates a decision's literal expression
pub struct LiteralExpressionEvaluator {
    expression: Arc<CompiledExpression>,
}

impl LiteralExpressionEvaluator {
    pub fn new(expression: Arc<CompiledExpression>) -> Self {
        Self { expression }
    }
}

impl DecisionLogicEvaluator for LiteralExpressionEvaluator {
    fn evaluate(&self, ctx: &EvaluationContext) -> EvaluationResult {
        Evaluator::evaluate(&self.expression, ctx)
    }
}
