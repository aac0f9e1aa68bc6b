//! List built-ins

use super::gather_list;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::cmp::Ordering;
use verdict_core::Value;

pub(crate) fn count(args: &[Value]) -> Result<Value, String> {
    match gather_list(args) {
        Some(items) => Ok(Value::number(items.len() as i64)),
        None => Ok(Value::Null),
    }
}

fn extreme(args: &[Value], func: &str, keep: Ordering) -> Result<Value, String> {
    let items = match gather_list(args) {
        Some(items) => items,
        None => return Ok(Value::Null),
    };

    let mut best: Option<Value> = None;
    for item in items {
        if item.is_null() {
            return Ok(Value::Null);
        }
        match &best {
            None => best = Some(item),
            Some(current) => match item.compare(current) {
                Some(ordering) if ordering == keep => best = Some(item),
                Some(_) => {}
                None => {
                    return Err(format!(
                        "{}() cannot compare {} and {}",
                        func,
                        current.type_name(),
                        item.type_name()
                    ))
                }
            },
        }
    }
    Ok(best.unwrap_or(Value::Null))
}

pub(crate) fn min(args: &[Value]) -> Result<Value, String> {
    extreme(args, "min", Ordering::Less)
}

pub(crate) fn max(args: &[Value]) -> Result<Value, String> {
    extreme(args, "max", Ordering::Greater)
}

fn numeric_items(args: &[Value], func: &str) -> Result<Option<Vec<Decimal>>, String> {
    let items = match gather_list(args) {
        Some(items) => items,
        None => return Ok(None),
    };
    let mut numbers = Vec::with_capacity(items.len());
    for item in items {
        match item {
            Value::Number(n) => numbers.push(n),
            Value::Null => return Ok(None),
            other => {
                return Err(format!(
                    "{}() expects numbers, got {}",
                    func,
                    other.type_name()
                ))
            }
        }
    }
    Ok(Some(numbers))
}

pub(crate) fn sum(args: &[Value]) -> Result<Value, String> {
    match numeric_items(args, "sum")? {
        Some(numbers) if !numbers.is_empty() => {
            Ok(Value::Number(numbers.into_iter().sum::<Decimal>()))
        }
        _ => Ok(Value::Null),
    }
}

pub(crate) fn mean(args: &[Value]) -> Result<Value, String> {
    match numeric_items(args, "mean")? {
        Some(numbers) if !numbers.is_empty() => {
            let len = Decimal::from(numbers.len() as i64);
            let total: Decimal = numbers.into_iter().sum();
            Ok(Value::Number(total / len))
        }
        _ => Ok(Value::Null),
    }
}

/// `append(list, item...)`: a new list with the items added at the end
pub(crate) fn append(args: &[Value]) -> Result<Value, String> {
    let mut items = match &args[0] {
        Value::List(items) => items.clone(),
        Value::Null => return Ok(Value::Null),
        other => {
            return Err(format!(
                "append() expects a list, got {}",
                other.type_name()
            ))
        }
    };
    items.extend(args[1..].iter().cloned());
    Ok(Value::List(items))
}

/// `concatenate(list...)`: a new list holding every argument's elements
pub(crate) fn concatenate(args: &[Value]) -> Result<Value, String> {
    let mut result = Vec::new();
    for arg in args {
        match arg {
            Value::List(items) => result.extend(items.iter().cloned()),
            Value::Null => return Ok(Value::Null),
            other => {
                return Err(format!(
                    "concatenate() expects lists, got {}",
                    other.type_name()
                ))
            }
        }
    }
    Ok(Value::List(result))
}

/// `sublist(list, start [, length])` with a 1-based start position;
/// a negative start counts from the end
pub(crate) fn sublist(args: &[Value]) -> Result<Value, String> {
    let items = match &args[0] {
        Value::List(items) => items,
        Value::Null => return Ok(Value::Null),
        other => {
            return Err(format!(
                "sublist() expects a list, got {}",
                other.type_name()
            ))
        }
    };

    let start = match &args[1] {
        Value::Number(n) => n
            .to_i64()
            .ok_or_else(|| "sublist() start position out of range".to_string())?,
        Value::Null => return Ok(Value::Null),
        other => {
            return Err(format!(
                "sublist() expects a numeric start, got {}",
                other.type_name()
            ))
        }
    };

    let len = items.len() as i64;
    let from = if start > 0 {
        start - 1
    } else if start < 0 {
        len + start
    } else {
        return Err("sublist() start position is 1-based, got 0".to_string());
    };
    if from < 0 || from >= len {
        return Ok(Value::List(Vec::new()));
    }

    let take = match args.get(2) {
        None => len - from,
        Some(Value::Number(n)) => n
            .to_i64()
            .ok_or_else(|| "sublist() length out of range".to_string())?,
        Some(Value::Null) => return Ok(Value::Null),
        Some(other) => {
            return Err(format!(
                "sublist() expects a numeric length, got {}",
                other.type_name()
            ))
        }
    };
    if take <= 0 {
        return Ok(Value::List(Vec::new()));
    }

    Ok(Value::List(
        items
            .iter()
            .skip(from as usize)
            .take(take as usize)
            .cloned()
            .collect(),
    ))
}

pub(crate) fn reverse(args: &[Value]) -> Result<Value, String> {
    match &args[0] {
        Value::List(items) => Ok(Value::List(items.iter().rev().cloned().collect())),
        Value::Null => Ok(Value::Null),
        other => Err(format!(
            "reverse() expects a list, got {}",
            other.type_name()
        )),
    }
}

/// `index_of(list, match)`: every 1-based position holding an equal element
pub(crate) fn index_of(args: &[Value]) -> Result<Value, String> {
    match &args[0] {
        Value::List(items) => {
            let positions: Vec<Value> = items
                .iter()
                .enumerate()
                .filter(|(_, item)| *item == &args[1])
                .map(|(i, _)| Value::number(i as i64 + 1))
                .collect();
            Ok(Value::List(positions))
        }
        Value::Null => Ok(Value::Null),
        other => Err(format!(
            "index_of() expects a list, got {}",
            other.type_name()
        )),
    }
}

/// `distinct_values(list)`: first occurrence of each value, order preserved
pub(crate) fn distinct_values(args: &[Value]) -> Result<Value, String> {
    match &args[0] {
        Value::List(items) => {
            let mut seen: Vec<Value> = Vec::new();
            for item in items {
                if !seen.contains(item) {
                    seen.push(item.clone());
                }
            }
            Ok(Value::List(seen))
        }
        Value::Null => Ok(Value::Null),
        other => Err(format!(
            "distinct_values() expects a list, got {}",
            other.type_name()
        )),
    }
}

/// `flatten(list...)`: recursively flatten nested lists into one
pub(crate) fn flatten(args: &[Value]) -> Result<Value, String> {
    fn push_flat(value: &Value, out: &mut Vec<Value>) {
        match value {
            Value::List(items) => {
                for item in items {
                    push_flat(item, out);
                }
            }
            other => out.push(other.clone()),
        }
    }

    let mut result = Vec::new();
    for arg in args {
        push_flat(arg, &mut result);
    }
    Ok(Value::List(result))
}

/// `list_contains(list, element)`: membership by structural equality;
/// a null element is found if the list holds a null
pub(crate) fn list_contains(args: &[Value]) -> Result<Value, String> {
    match &args[0] {
        Value::List(items) => Ok(Value::Boolean(items.contains(&args[1]))),
        Value::Null => Ok(Value::Null),
        other => Err(format!(
            "list_contains() expects a list, got {}",
            other.type_name()
        )),
    }
}
