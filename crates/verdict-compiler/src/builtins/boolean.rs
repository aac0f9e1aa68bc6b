//! Boolean built-ins

use verdict_core::Value;

/// Three-valued negation: `not(null)` is null
pub(crate) fn not(args: &[Value]) -> Result<Value, String> {
    match &args[0] {
        Value::Boolean(b) => Ok(Value::Boolean(!b)),
        Value::Null => Ok(Value::Null),
        other => Err(format!("not() expects a boolean, got {}", other.type_name())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not() {
        assert_eq!(not(&[Value::Boolean(true)]).unwrap(), Value::Boolean(false));
        assert_eq!(not(&[Value::Boolean(false)]).unwrap(), Value::Boolean(true));
        assert_eq!(not(&[Value::Null]).unwrap(), Value::Null);
        assert!(not(&[Value::number(1)]).is_err());
    }
}
