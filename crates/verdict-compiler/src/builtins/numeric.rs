//! Numeric built-ins
//!
//! All arithmetic uses exact decimal semantics; nothing here goes through
//! floating point.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::str::FromStr;
use verdict_core::Value;

fn as_number(value: &Value, func: &str) -> Result<Option<Decimal>, String> {
    match value {
        Value::Number(n) => Ok(Some(*n)),
        Value::Null => Ok(None),
        other => Err(format!(
            "{}() expects a number, got {}",
            func,
            other.type_name()
        )),
    }
}

pub(crate) fn abs(args: &[Value]) -> Result<Value, String> {
    match as_number(&args[0], "abs")? {
        Some(n) => Ok(Value::Number(n.abs())),
        None => Ok(Value::Null),
    }
}

pub(crate) fn floor(args: &[Value]) -> Result<Value, String> {
    match as_number(&args[0], "floor")? {
        Some(n) => Ok(Value::Number(n.floor())),
        None => Ok(Value::Null),
    }
}

pub(crate) fn ceiling(args: &[Value]) -> Result<Value, String> {
    match as_number(&args[0], "ceiling")? {
        Some(n) => Ok(Value::Number(n.ceil())),
        None => Ok(Value::Null),
    }
}

/// `decimal(n, scale)`: round to the given number of fractional digits
pub(crate) fn decimal(args: &[Value]) -> Result<Value, String> {
    let n = match as_number(&args[0], "decimal")? {
        Some(n) => n,
        None => return Ok(Value::Null),
    };
    let scale = match as_number(&args[1], "decimal")? {
        Some(s) => s
            .to_u32()
            .ok_or_else(|| "decimal() scale must be a non-negative integer".to_string())?,
        None => return Ok(Value::Null),
    };
    Ok(Value::Number(n.round_dp(scale)))
}

/// `modulo(dividend, divisor)`; the result takes the sign of the divisor
pub(crate) fn modulo(args: &[Value]) -> Result<Value, String> {
    let dividend = match as_number(&args[0], "modulo")? {
        Some(n) => n,
        None => return Ok(Value::Null),
    };
    let divisor = match as_number(&args[1], "modulo")? {
        Some(n) => n,
        None => return Ok(Value::Null),
    };
    if divisor.is_zero() {
        return Err("modulo() by zero".to_string());
    }

    let mut rem = dividend % divisor;
    if !rem.is_zero() && (rem.is_sign_negative() != divisor.is_sign_negative()) {
        rem += divisor;
    }
    Ok(Value::Number(rem))
}

/// `number(string)`: parse a decimal literal
pub(crate) fn number(args: &[Value]) -> Result<Value, String> {
    match &args[0] {
        Value::String(s) => Decimal::from_str(s.trim())
            .map(Value::Number)
            .map_err(|_| format!("number() cannot parse '{}'", s)),
        Value::Number(n) => Ok(Value::Number(*n)),
        Value::Null => Ok(Value::Null),
        other => Err(format!(
            "number() expects a string, got {}",
            other.type_name()
        )),
    }
}
