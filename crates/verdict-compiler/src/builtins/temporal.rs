//! Date and time built-ins
//!
//! `today()` and `now()` read the ambient clock, which is why the compiler
//! never folds constant subexpressions.

use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::prelude::ToPrimitive;
use verdict_core::Value;

fn as_component(value: &Value, func: &str) -> Result<Option<u32>, String> {
    match value {
        Value::Number(n) => n
            .to_u32()
            .map(Some)
            .ok_or_else(|| format!("{}() component out of range", func)),
        Value::Null => Ok(None),
        other => Err(format!(
            "{}() expects a numeric component, got {}",
            func,
            other.type_name()
        )),
    }
}

/// `date(string)`, `date(year, month, day)` or `date(datetime)`
pub(crate) fn date(args: &[Value]) -> Result<Value, String> {
    match args {
        [Value::String(s)] => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Value::Date)
            .map_err(|_| format!("date() cannot parse '{}'", s)),
        [Value::DateTime(dt)] => Ok(Value::Date(dt.date())),
        [Value::Date(d)] => Ok(Value::Date(*d)),
        [Value::Null] => Ok(Value::Null),
        [year, month, day] => {
            let (y, m, d) = match (
                as_component(year, "date")?,
                as_component(month, "date")?,
                as_component(day, "date")?,
            ) {
                (Some(y), Some(m), Some(d)) => (y, m, d),
                _ => return Ok(Value::Null),
            };
            NaiveDate::from_ymd_opt(y as i32, m, d)
                .map(Value::Date)
                .ok_or_else(|| format!("date() invalid calendar date {}-{}-{}", y, m, d))
        }
        [other] => Err(format!(
            "date() expects a string or datetime, got {}",
            other.type_name()
        )),
        _ => Err("date() expects 1 or 3 arguments".to_string()),
    }
}

/// `time(string)`, `time(hour, minute, second)` or `time(datetime)`
pub(crate) fn time(args: &[Value]) -> Result<Value, String> {
    match args {
        [Value::String(s)] => NaiveTime::parse_from_str(s, "%H:%M:%S")
            .map(Value::Time)
            .map_err(|_| format!("time() cannot parse '{}'", s)),
        [Value::DateTime(dt)] => Ok(Value::Time(dt.time())),
        [Value::Time(t)] => Ok(Value::Time(*t)),
        [Value::Null] => Ok(Value::Null),
        [hour, minute, second] => {
            let (h, m, s) = match (
                as_component(hour, "time")?,
                as_component(minute, "time")?,
                as_component(second, "time")?,
            ) {
                (Some(h), Some(m), Some(s)) => (h, m, s),
                _ => return Ok(Value::Null),
            };
            NaiveTime::from_hms_opt(h, m, s)
                .map(Value::Time)
                .ok_or_else(|| format!("time() invalid time {}:{}:{}", h, m, s))
        }
        [other] => Err(format!(
            "time() expects a string or datetime, got {}",
            other.type_name()
        )),
        _ => Err("time() expects 1 or 3 arguments".to_string()),
    }
}

/// `date_and_time(string)` or `date_and_time(date, time)`
pub(crate) fn date_and_time(args: &[Value]) -> Result<Value, String> {
    match args {
        [Value::String(s)] => NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
            .map(Value::DateTime)
            .map_err(|_| format!("date_and_time() cannot parse '{}'", s)),
        [Value::DateTime(dt)] => Ok(Value::DateTime(*dt)),
        [Value::Null] => Ok(Value::Null),
        [Value::Date(d), Value::Time(t)] => Ok(Value::DateTime(d.and_time(*t))),
        [Value::Null, _] | [_, Value::Null] => Ok(Value::Null),
        [other] => Err(format!(
            "date_and_time() expects a string, got {}",
            other.type_name()
        )),
        [l, r] => Err(format!(
            "date_and_time() expects a date and a time, got {} and {}",
            l.type_name(),
            r.type_name()
        )),
        _ => Err("date_and_time() expects 1 or 2 arguments".to_string()),
    }
}

/// `today()`: the current calendar date
pub(crate) fn today(_args: &[Value]) -> Result<Value, String> {
    Ok(Value::Date(Local::now().date_naive()))
}

/// `now()`: the current local date and time
pub(crate) fn now(_args: &[Value]) -> Result<Value, String> {
    Ok(Value::DateTime(Local::now().naive_local()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_from_string() {
        assert_eq!(
            date(&[Value::string("2024-03-15")]).unwrap(),
            Value::Date(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap())
        );
        assert!(date(&[Value::string("not-a-date")]).is_err());
    }

    #[test]
    fn test_date_from_components() {
        assert_eq!(
            date(&[Value::number(2024), Value::number(2), Value::number(29)]).unwrap(),
            Value::Date(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap())
        );
        // Not a leap year
        assert!(date(&[Value::number(2023), Value::number(2), Value::number(29)]).is_err());
    }

    #[test]
    fn test_time_from_string() {
        assert_eq!(
            time(&[Value::string("10:30:00")]).unwrap(),
            Value::Time(NaiveTime::from_hms_opt(10, 30, 0).unwrap())
        );
    }

    #[test]
    fn test_date_and_time_combines() {
        let d = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let t = NaiveTime::from_hms_opt(10, 30, 0).unwrap();
        assert_eq!(
            date_and_time(&[Value::Date(d), Value::Time(t)]).unwrap(),
            Value::DateTime(d.and_time(t))
        );
    }

    #[test]
    fn test_null_propagation() {
        assert_eq!(date(&[Value::Null]).unwrap(), Value::Null);
        assert_eq!(date_and_time(&[Value::Null]).unwrap(), Value::Null);
    }

    #[test]
    fn test_today_and_now_produce_temporal_values() {
        assert!(matches!(today(&[]).unwrap(), Value::Date(_)));
        assert!(matches!(now(&[]).unwrap(), Value::DateTime(_)));
    }
}
