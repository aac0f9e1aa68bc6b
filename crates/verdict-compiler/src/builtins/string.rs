//! String built-ins

use regex::Regex;
use rust_decimal::prelude::ToPrimitive;
use verdict_core::Value;

fn as_str<'a>(value: &'a Value, func: &str) -> Result<Option<&'a str>, String> {
    match value {
        Value::String(s) => Ok(Some(s)),
        Value::Null => Ok(None),
        other => Err(format!(
            "{}() expects a string, got {}",
            func,
            other.type_name()
        )),
    }
}

/// `substring(string, start [, length])` with a 1-based start position;
/// a negative start counts from the end of the string
pub(crate) fn substring(args: &[Value]) -> Result<Value, String> {
    let s = match as_str(&args[0], "substring")? {
        Some(s) => s,
        None => return Ok(Value::Null),
    };

    let start = match &args[1] {
        Value::Number(n) => n
            .to_i64()
            .ok_or_else(|| "substring() start position out of range".to_string())?,
        Value::Null => return Ok(Value::Null),
        other => {
            return Err(format!(
                "substring() expects a numeric start, got {}",
                other.type_name()
            ))
        }
    };

    let chars: Vec<char> = s.chars().collect();
    let len = chars.len() as i64;

    let from = if start > 0 {
        start - 1
    } else if start < 0 {
        len + start
    } else {
        return Err("substring() start position is 1-based, got 0".to_string());
    };
    if from < 0 || from >= len {
        return Ok(Value::String(String::new()));
    }

    let take = match args.get(2) {
        None => len - from,
        Some(Value::Number(n)) => n
            .to_i64()
            .ok_or_else(|| "substring() length out of range".to_string())?,
        Some(Value::Null) => return Ok(Value::Null),
        Some(other) => {
            return Err(format!(
                "substring() expects a numeric length, got {}",
                other.type_name()
            ))
        }
    };
    if take <= 0 {
        return Ok(Value::String(String::new()));
    }

    let result: String = chars
        .into_iter()
        .skip(from as usize)
        .take(take as usize)
        .collect();
    Ok(Value::String(result))
}

pub(crate) fn string_length(args: &[Value]) -> Result<Value, String> {
    match as_str(&args[0], "string_length")? {
        Some(s) => Ok(Value::number(s.chars().count() as i64)),
        None => Ok(Value::Null),
    }
}

pub(crate) fn upper_case(args: &[Value]) -> Result<Value, String> {
    match as_str(&args[0], "upper_case")? {
        Some(s) => Ok(Value::String(s.to_uppercase())),
        None => Ok(Value::Null),
    }
}

pub(crate) fn lower_case(args: &[Value]) -> Result<Value, String> {
    match as_str(&args[0], "lower_case")? {
        Some(s) => Ok(Value::String(s.to_lowercase())),
        None => Ok(Value::Null),
    }
}

pub(crate) fn contains(args: &[Value]) -> Result<Value, String> {
    match (as_str(&args[0], "contains")?, as_str(&args[1], "contains")?) {
        (Some(s), Some(pattern)) => Ok(Value::Boolean(s.contains(pattern))),
        _ => Ok(Value::Null),
    }
}

pub(crate) fn starts_with(args: &[Value]) -> Result<Value, String> {
    match (
        as_str(&args[0], "starts_with")?,
        as_str(&args[1], "starts_with")?,
    ) {
        (Some(s), Some(prefix)) => Ok(Value::Boolean(s.starts_with(prefix))),
        _ => Ok(Value::Null),
    }
}

pub(crate) fn ends_with(args: &[Value]) -> Result<Value, String> {
    match (
        as_str(&args[0], "ends_with")?,
        as_str(&args[1], "ends_with")?,
    ) {
        (Some(s), Some(suffix)) => Ok(Value::Boolean(s.ends_with(suffix))),
        _ => Ok(Value::Null),
    }
}

/// `matches(string, pattern)` with full regex syntax
pub(crate) fn matches(args: &[Value]) -> Result<Value, String> {
    match (as_str(&args[0], "matches")?, as_str(&args[1], "matches")?) {
        (Some(s), Some(pattern)) => {
            let re = Regex::new(pattern)
                .map_err(|e| format!("matches() invalid pattern '{}': {}", pattern, e))?;
            Ok(Value::Boolean(re.is_match(s)))
        }
        _ => Ok(Value::Null),
    }
}

/// `replace(string, pattern, replacement)` replacing every regex match
pub(crate) fn replace(args: &[Value]) -> Result<Value, String> {
    match (
        as_str(&args[0], "replace")?,
        as_str(&args[1], "replace")?,
        as_str(&args[2], "replace")?,
    ) {
        (Some(s), Some(pattern), Some(replacement)) => {
            let re = Regex::new(pattern)
                .map_err(|e| format!("replace() invalid pattern '{}': {}", pattern, e))?;
            Ok(Value::String(re.replace_all(s, replacement).into_owned()))
        }
        _ => Ok(Value::Null),
    }
}

/// `string(value)`: render any value in its source-literal form
pub(crate) fn string(args: &[Value]) -> Result<Value, String> {
    Ok(Value::String(render(&args[0])))
}

fn render(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Boolean(b) => b.to_string(),
        Value::Number(n) => n.normalize().to_string(),
        Value::String(s) => s.clone(),
        Value::Date(d) => d.format("%Y-%m-%d").to_string(),
        Value::Time(t) => t.format("%H:%M:%S").to_string(),
        Value::DateTime(dt) => dt.format("%Y-%m-%dT%H:%M:%S").to_string(),
        Value::List(items) => {
            let rendered: Vec<String> = items.iter().map(render).collect();
            format!("[{}]", rendered.join(", "))
        }
        Value::Context(entries) => {
            let mut keys: Vec<&String> = entries.keys().collect();
            keys.sort();
            let rendered: Vec<String> = keys
                .into_iter()
                .map(|k| format!("{}: {}", k, render(&entries[k])))
                .collect();
            format!("{{{}}}", rendered.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substring() {
        let s = Value::string("decision");
        assert_eq!(
            substring(&[s.clone(), Value::number(1), Value::number(4)]).unwrap(),
            Value::string("deci")
        );
        assert_eq!(
            substring(&[s.clone(), Value::number(5)]).unwrap(),
            Value::string("sion")
        );
        assert_eq!(
            substring(&[s.clone(), Value::number(-4)]).unwrap(),
            Value::string("sion")
        );
        assert_eq!(
            substring(&[Value::Null, Value::number(1)]).unwrap(),
            Value::Null
        );
    }

    #[test]
    fn test_substring_rejects_zero_start() {
        assert!(substring(&[Value::string("abc"), Value::number(0)]).is_err());
    }

    #[test]
    fn test_string_length_counts_chars() {
        assert_eq!(
            string_length(&[Value::string("héllo")]).unwrap(),
            Value::number(5)
        );
    }

    #[test]
    fn test_case_functions() {
        assert_eq!(
            upper_case(&[Value::string("abc")]).unwrap(),
            Value::string("ABC")
        );
        assert_eq!(
            lower_case(&[Value::string("ABC")]).unwrap(),
            Value::string("abc")
        );
    }

    #[test]
    fn test_contains_and_affixes() {
        let s = Value::string("risk level");
        assert_eq!(
            contains(&[s.clone(), Value::string("k le")]).unwrap(),
            Value::Boolean(true)
        );
        assert_eq!(
            starts_with(&[s.clone(), Value::string("risk")]).unwrap(),
            Value::Boolean(true)
        );
        assert_eq!(
            ends_with(&[s.clone(), Value::string("level")]).unwrap(),
            Value::Boolean(true)
        );
        assert_eq!(
            contains(&[s, Value::Null]).unwrap(),
            Value::Null
        );
    }

    #[test]
    fn test_matches_regex() {
        assert_eq!(
            matches(&[Value::string("card-1234"), Value::string(r"^card-\d+$")]).unwrap(),
            Value::Boolean(true)
        );
        assert!(matches(&[Value::string("x"), Value::string("(")]).is_err());
    }

    #[test]
    fn test_replace_regex() {
        assert_eq!(
            replace(&[
                Value::string("a1b2"),
                Value::string(r"\d"),
                Value::string("-")
            ])
            .unwrap(),
            Value::string("a-b-")
        );
    }

    #[test]
    fn test_string_rendering() {
        assert_eq!(string(&[Value::number(42)]).unwrap(), Value::string("42"));
        assert_eq!(string(&[Value::Null]).unwrap(), Value::string("null"));
        assert_eq!(
            string(&[Value::List(vec![Value::number(1), Value::number(2)])]).unwrap(),
            Value::string("[1, 2]")
        );
    }
}
