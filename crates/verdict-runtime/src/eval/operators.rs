//! Binary operator semantics
//!
//! Arithmetic and comparisons propagate null operands as null. Equality is
//! null-tolerant: two nulls are equal, null never equals a value. Ordered
//! comparisons between incomparable kinds are evaluation failures, not null.

use crate::error::{Result, RuntimeError};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::cmp::Ordering;
use verdict_core::ast::BinaryOp;
use verdict_core::Value;

/// Three-valued truth of a value: booleans are known, everything else
/// (including null) is unknown
pub(crate) fn truth(value: &Value) -> Option<bool> {
    value.as_boolean()
}

/// Arithmetic with null propagation and exact decimal semantics
pub(crate) fn arithmetic(left: &Value, op: BinaryOp, right: &Value) -> Result<Value> {
    if left.is_null() || right.is_null() {
        return Ok(Value::Null);
    }

    // `+` doubles as string concatenation
    if op == BinaryOp::Add {
        if let (Value::String(l), Value::String(r)) = (left, right) {
            return Ok(Value::String(format!("{}{}", l, r)));
        }
    }

    let (l, r) = match (left, right) {
        (Value::Number(l), Value::Number(r)) => (*l, *r),
        _ => {
            return Err(RuntimeError::TypeError(format!(
                "cannot apply '{}' to {} and {}",
                op.symbol(),
                left.type_name(),
                right.type_name()
            )))
        }
    };

    let result = match op {
        BinaryOp::Add => l.checked_add(r).ok_or(RuntimeError::ArithmeticOverflow)?,
        BinaryOp::Sub => l.checked_sub(r).ok_or(RuntimeError::ArithmeticOverflow)?,
        BinaryOp::Mul => l.checked_mul(r).ok_or(RuntimeError::ArithmeticOverflow)?,
        BinaryOp::Div => {
            if r.is_zero() {
                return Err(RuntimeError::DivisionByZero);
            }
            l.checked_div(r).ok_or(RuntimeError::ArithmeticOverflow)?
        }
        BinaryOp::Pow => return pow(l, r),
        other => unreachable!("arithmetic() called with non-arithmetic operator {:?}", other),
    };

    Ok(Value::Number(result))
}

/// Exponentiation over integer exponents
fn pow(base: Decimal, exponent: Decimal) -> Result<Value> {
    let exp = exponent
        .to_i64()
        .filter(|_| exponent.is_integer())
        .ok_or_else(|| {
            RuntimeError::TypeError(format!("exponent must be an integer, got {}", exponent))
        })?;

    if exp.unsigned_abs() > 1000 {
        return Err(RuntimeError::ArithmeticOverflow);
    }

    let mut result = Decimal::ONE;
    for _ in 0..exp.unsigned_abs() {
        result = result
            .checked_mul(base)
            .ok_or(RuntimeError::ArithmeticOverflow)?;
    }

    if exp < 0 {
        if result.is_zero() {
            return Err(RuntimeError::DivisionByZero);
        }
        result = Decimal::ONE
            .checked_div(result)
            .ok_or(RuntimeError::ArithmeticOverflow)?;
    }

    Ok(Value::Number(result))
}

/// Null-tolerant structural equality
pub(crate) fn equality(left: &Value, right: &Value) -> bool {
    left == right
}

/// Ordered comparison with null propagation; incomparable kinds fail
pub(crate) fn ordered(left: &Value, op: BinaryOp, right: &Value) -> Result<Value> {
    if left.is_null() || right.is_null() {
        return Ok(Value::Null);
    }

    let ordering = left.compare(right).ok_or_else(|| {
        RuntimeError::TypeError(format!(
            "cannot compare {} and {} with '{}'",
            left.type_name(),
            right.type_name(),
            op.symbol()
        ))
    })?;

    let result = match op {
        BinaryOp::Lt => ordering == Ordering::Less,
        BinaryOp::Le => ordering != Ordering::Greater,
        BinaryOp::Gt => ordering == Ordering::Greater,
        BinaryOp::Ge => ordering != Ordering::Less,
        other => unreachable!("ordered() called with non-ordered operator {:?}", other),
    };

    Ok(Value::Boolean(result))
}
