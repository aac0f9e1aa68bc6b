//! Context built-ins

use std::collections::HashMap;
use verdict_core::Value;

/// `get_value(context, key)`: the entry value, or null when absent
pub(crate) fn get_value(args: &[Value]) -> Result<Value, String> {
    let entries = match &args[0] {
        Value::Context(entries) => entries,
        Value::Null => return Ok(Value::Null),
        other => {
            return Err(format!(
                "get_value() expects a context, got {}",
                other.type_name()
            ))
        }
    };
    let key = match &args[1] {
        Value::String(key) => key,
        Value::Null => return Ok(Value::Null),
        other => {
            return Err(format!(
                "get_value() expects a string key, got {}",
                other.type_name()
            ))
        }
    };
    Ok(entries.get(key).cloned().unwrap_or(Value::Null))
}

/// `get_entries(context)`: a list of `{key, value}` records, ordered by key
/// so repeated evaluation is deterministic
pub(crate) fn get_entries(args: &[Value]) -> Result<Value, String> {
    let entries = match &args[0] {
        Value::Context(entries) => entries,
        Value::Null => return Ok(Value::Null),
        other => {
            return Err(format!(
                "get_entries() expects a context, got {}",
                other.type_name()
            ))
        }
    };

    let mut keys: Vec<&String> = entries.keys().collect();
    keys.sort();

    Ok(Value::List(
        keys.into_iter()
            .map(|key| {
                Value::Context(HashMap::from([
                    ("key".to_string(), Value::String(key.clone())),
                    ("value".to_string(), entries[key].clone()),
                ]))
            })
            .collect(),
    ))
}
