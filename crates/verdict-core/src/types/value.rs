//! Runtime value types for Verdict expressions
//!
//! The `Value` enum represents all possible runtime values in the expression
//! language: null, booleans, exact decimal numbers, strings, date/time values,
//! lists and structural records (contexts).

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Runtime value type
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Null value
    Null,
    /// Boolean value
    Boolean(bool),
    /// Number value (exact decimal arithmetic, no floating point rounding)
    Number(Decimal),
    /// String value
    String(String),
    /// Calendar date
    Date(NaiveDate),
    /// Time of day
    Time(NaiveTime),
    /// Combined date and time
    DateTime(NaiveDateTime),
    /// List of values
    List(Vec<Value>),
    /// Structural record (key-value map)
    Context(HashMap<String, Value>),
}

impl Value {
    /// Human-readable name of this value's kind
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Date(_) => "date",
            Value::Time(_) => "time",
            Value::DateTime(_) => "datetime",
            Value::List(_) => "list",
            Value::Context(_) => "context",
        }
    }

    /// Check if this value is null
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Get the boolean value, if this is a boolean
    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Get the number value, if this is a number
    pub fn as_number(&self) -> Option<Decimal> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Get the string value, if this is a string
    pub fn as_string(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get the list elements, if this is a list
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Get the context entries, if this is a context
    pub fn as_context(&self) -> Option<&HashMap<String, Value>> {
        match self {
            Value::Context(entries) => Some(entries),
            _ => None,
        }
    }

    /// Create a number value from an integer
    pub fn number(n: i64) -> Self {
        Value::Number(Decimal::from(n))
    }

    /// Create a string value
    pub fn string(s: impl Into<String>) -> Self {
        Value::String(s.into())
    }

    /// Total-order comparison for comparable value pairs.
    ///
    /// Defined for number/number, string/string and temporal pairs of the same
    /// kind. Returns `None` for every other combination, including any
    /// comparison involving null.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Number(l), Value::Number(r)) => Some(l.cmp(r)),
            (Value::String(l), Value::String(r)) => Some(l.cmp(r)),
            (Value::Date(l), Value::Date(r)) => Some(l.cmp(r)),
            (Value::Time(l), Value::Time(r)) => Some(l.cmp(r)),
            (Value::DateTime(l), Value::DateTime(r)) => Some(l.cmp(r)),
            _ => None,
        }
    }

    /// Convert a JSON value into a runtime value.
    ///
    /// Numbers become exact decimals; strings stay strings (date/time values
    /// are only produced by temporal literals and constructor functions).
    pub fn from_json(json: serde_json::Value) -> Value {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Boolean(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Number(Decimal::from(i))
                } else if let Some(u) = n.as_u64() {
                    Value::Number(Decimal::from(u))
                } else {
                    n.as_f64()
                        .and_then(Decimal::from_f64)
                        .map(Value::Number)
                        .unwrap_or(Value::Null)
                }
            }
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from_json).collect())
            }
            serde_json::Value::Object(entries) => Value::Context(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, Value::from_json(v)))
                    .collect(),
            ),
        }
    }

    /// Convert this value to JSON for result reporting.
    ///
    /// Temporal values serialize as ISO-8601 strings; numbers lose arbitrary
    /// precision only at this boundary.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Boolean(b) => serde_json::Value::Bool(*b),
            Value::Number(n) => {
                use rust_decimal::prelude::ToPrimitive;
                if n.is_integer() {
                    n.to_i64()
                        .map(serde_json::Value::from)
                        .unwrap_or_else(|| serde_json::Value::String(n.to_string()))
                } else {
                    n.to_f64()
                        .map(serde_json::Value::from)
                        .unwrap_or_else(|| serde_json::Value::String(n.to_string()))
                }
            }
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Date(d) => serde_json::Value::String(d.format("%Y-%m-%d").to_string()),
            Value::Time(t) => serde_json::Value::String(t.format("%H:%M:%S").to_string()),
            Value::DateTime(dt) => {
                serde_json::Value::String(dt.format("%Y-%m-%dT%H:%M:%S").to_string())
            }
            Value::List(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Context(entries) => serde_json::Value::Object(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        Value::from_json(json)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Value::from_json)
    }
}
