//! Typed setting values and best-effort coercion between them.

use std::collections::BTreeMap;
use std::time::Duration;

use toml::value::Datetime;

use super::duration::{format_duration, parse_duration};

/// A nested table of settings, keyed by lowercase segment names.
pub type Table = BTreeMap<String, Value>;

/// A single setting value.
///
/// There is no schema: any key may hold any variant. The `coerce_*` methods
/// convert between variants the way a caller reading a config file expects
/// (`"10s"` is a duration, `1` is `true`, `6.2` prints as `"6.2"`).
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Duration(Duration),
    String(String),
    Datetime(Datetime),
    Array(Vec<Value>),
    Table(Table),
}

impl Value {
    /// Name of the variant, for logs and error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::Duration(_) => "duration",
            Value::String(_) => "string",
            Value::Datetime(_) => "datetime",
            Value::Array(_) => "array",
            Value::Table(_) => "table",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_table(&self) -> Option<&Table> {
        match self {
            Value::Table(table) => Some(table),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn coerce_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            Value::Integer(i) => Some(*i != 0),
            Value::Float(f) => Some(*f != 0.0),
            Value::Duration(d) => Some(!d.is_zero()),
            Value::String(s) => parse_bool(s.trim()),
            _ => None,
        }
    }

    pub fn coerce_int(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            Value::Bool(b) => Some(i64::from(*b)),
            Value::Float(f) if f.is_finite() && *f >= i64::MIN as f64 && *f <= i64::MAX as f64 => {
                Some(f.trunc() as i64)
            }
            Value::Duration(d) => i64::try_from(d.as_nanos()).ok(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn coerce_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Integer(i) => Some(*i as f64),
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Value::Duration(d) => Some(d.as_nanos() as f64),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Canonical string form. Arrays and tables have none.
    pub fn coerce_string(&self) -> Option<String> {
        match self {
            Value::String(s) => Some(s.clone()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Integer(i) => Some(i.to_string()),
            Value::Float(f) => Some(f.to_string()),
            Value::Duration(d) => Some(format_duration(*d)),
            Value::Datetime(dt) => Some(dt.to_string()),
            Value::Array(_) | Value::Table(_) => None,
        }
    }

    /// Integers and floats are read as nanoseconds, strings as duration text.
    pub fn coerce_duration(&self) -> Option<Duration> {
        match self {
            Value::Duration(d) => Some(*d),
            Value::Integer(i) => Some(Duration::from_nanos(u64::try_from(*i).unwrap_or(0))),
            Value::Float(f) if f.is_finite() => {
                Some(Duration::from_nanos(if *f > 0.0 { *f as u64 } else { 0 }))
            }
            Value::String(s) => parse_duration(s),
            _ => None,
        }
    }

    /// Fails as a whole if any element has no integer form.
    pub fn coerce_int_slice(&self) -> Option<Vec<i64>> {
        match self {
            Value::Array(items) => items.iter().map(Value::coerce_int).collect(),
            _ => None,
        }
    }

    /// Array elements without a string form become empty strings; a plain
    /// string is split on whitespace.
    pub fn coerce_string_slice(&self) -> Option<Vec<String>> {
        match self {
            Value::Array(items) => Some(
                items
                    .iter()
                    .map(|item| item.coerce_string().unwrap_or_default())
                    .collect(),
            ),
            Value::String(s) => Some(s.split_whitespace().map(str::to_string).collect()),
            _ => None,
        }
    }

    /// Convert to a TOML value for serialization. Durations become their
    /// text form.
    pub fn to_toml(&self) -> toml::Value {
        match self {
            Value::Bool(b) => toml::Value::Boolean(*b),
            Value::Integer(i) => toml::Value::Integer(*i),
            Value::Float(f) => toml::Value::Float(*f),
            Value::Duration(d) => toml::Value::String(format_duration(*d)),
            Value::String(s) => toml::Value::String(s.clone()),
            Value::Datetime(dt) => toml::Value::Datetime(*dt),
            Value::Array(items) => toml::Value::Array(items.iter().map(Value::to_toml).collect()),
            Value::Table(table) => toml::Value::Table(table_to_toml(table)),
        }
    }
}

/// Convert a settings table to a TOML table.
pub fn table_to_toml(table: &Table) -> toml::Table {
    table
        .iter()
        .map(|(key, value)| (key.clone(), value.to_toml()))
        .collect()
}

/// Convert a parsed TOML table into a settings table.
pub fn table_from_toml(table: toml::Table) -> Table {
    table
        .into_iter()
        .map(|(key, value)| (key, Value::from(value)))
        .collect()
}

fn parse_bool(s: &str) -> Option<bool> {
    match s {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}

impl From<toml::Value> for Value {
    fn from(value: toml::Value) -> Self {
        match value {
            toml::Value::String(s) => Value::String(s),
            toml::Value::Integer(i) => Value::Integer(i),
            toml::Value::Float(f) => Value::Float(f),
            toml::Value::Boolean(b) => Value::Bool(b),
            toml::Value::Datetime(dt) => Value::Datetime(dt),
            toml::Value::Array(items) => Value::Array(items.into_iter().map(Value::from).collect()),
            toml::Value::Table(table) => Value::Table(table_from_toml(table)),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Integer(i64::from(value))
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Integer(i64::from(value))
    }
}

impl From<u16> for Value {
    fn from(value: u16) -> Self {
        Value::Integer(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Float(f64::from(value))
    }
}

impl From<Duration> for Value {
    fn from(value: Duration) -> Self {
        Value::Duration(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<Datetime> for Value {
    fn from(value: Datetime) -> Self {
        Value::Datetime(value)
    }
}

impl From<Table> for Value {
    fn from(value: Table) -> Self {
        Value::Table(value)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::Array(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Clone + Into<Value>> From<&[T]> for Value {
    fn from(items: &[T]) -> Self {
        Value::Array(items.iter().cloned().map(Into::into).collect())
    }
}

impl<T: Into<Value>, const N: usize> From<[T; N]> for Value {
    fn from(items: [T; N]) -> Self {
        Value::Array(items.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_strings() {
        assert_eq!(Value::Bool(false).coerce_string().as_deref(), Some("false"));
        assert_eq!(Value::Integer(2600).coerce_string().as_deref(), Some("2600"));
        assert_eq!(Value::Float(6.2).coerce_string().as_deref(), Some("6.2"));
        assert_eq!(
            Value::Duration(Duration::from_secs(15))
                .coerce_string()
                .as_deref(),
            Some("15s")
        );
        assert_eq!(Value::from(vec![1, 2]).coerce_string(), None);
    }

    #[test]
    fn test_bool_coercion() {
        assert_eq!(Value::from("true").coerce_bool(), Some(true));
        assert_eq!(Value::from("F").coerce_bool(), Some(false));
        assert_eq!(Value::from("yes").coerce_bool(), None);
        assert_eq!(Value::Integer(0).coerce_bool(), Some(false));
        assert_eq!(Value::Float(0.5).coerce_bool(), Some(true));
    }

    #[test]
    fn test_int_coercion() {
        assert_eq!(Value::from(" 42 ").coerce_int(), Some(42));
        assert_eq!(Value::Float(3.9).coerce_int(), Some(3));
        assert_eq!(Value::Bool(true).coerce_int(), Some(1));
        assert_eq!(Value::from("3.5").coerce_int(), None);
        assert_eq!(Value::Float(f64::NAN).coerce_int(), None);
    }

    #[test]
    fn test_float_coercion() {
        assert_eq!(Value::Integer(3).coerce_float(), Some(3.0));
        assert_eq!(Value::from("3.1415").coerce_float(), Some(3.1415));
        assert_eq!(Value::from(vec!["a"]).coerce_float(), None);
    }

    #[test]
    fn test_duration_coercion() {
        assert_eq!(
            Value::from("30s").coerce_duration(),
            Some(Duration::from_secs(30))
        );
        assert_eq!(
            Value::Integer(1_000_000_000).coerce_duration(),
            Some(Duration::from_secs(1))
        );
        assert_eq!(Value::Integer(-5).coerce_duration(), Some(Duration::ZERO));
        assert_eq!(Value::from("soon").coerce_duration(), None);
    }

    #[test]
    fn test_slice_coercion() {
        assert_eq!(
            Value::from(vec![100, 200, 50]).coerce_int_slice(),
            Some(vec![100, 200, 50])
        );
        assert_eq!(
            Value::from(vec!["1", "2"]).coerce_int_slice(),
            Some(vec![1, 2])
        );
        assert_eq!(Value::from(vec!["1", "two"]).coerce_int_slice(), None);
        assert_eq!(
            Value::from("one two  three").coerce_string_slice(),
            Some(vec!["one".to_string(), "two".to_string(), "three".to_string()])
        );
        assert_eq!(
            Value::from(vec![Value::Integer(1), Value::from("x")]).coerce_string_slice(),
            Some(vec!["1".to_string(), "x".to_string()])
        );
    }

    #[test]
    fn test_duration_serializes_as_text() {
        let value = Value::Duration(Duration::from_secs(90));
        assert_eq!(value.to_toml(), toml::Value::String("1m30s".to_string()));
    }

    #[test]
    fn test_from_toml_nested() {
        let parsed: toml::Table = toml::from_str("[server]\nports = [80, 443]\n").unwrap();
        let table = table_from_toml(parsed);
        let server = table["server"].as_table().unwrap();
        assert_eq!(server["ports"].coerce_int_slice(), Some(vec![80, 443]));
    }
}
