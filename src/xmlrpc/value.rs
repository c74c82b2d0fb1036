// src/xmlrpc/value.rs

//! XML-RPC value model
//!
//! Values are decoded once at the protocol boundary. Timestamps arrive as
//! `dateTime.iso8601` (`20120131T10:15:00`) and are converted to
//! [`NaiveDateTime`] here, so the cache model never sees the wire format.

use chrono::NaiveDateTime;
use std::collections::BTreeMap;
use std::fmt;

/// Wire format of `dateTime.iso8601` values
pub const DATETIME_FORMAT: &str = "%Y%m%dT%H:%M:%S";

/// Alternative timestamp layout some servers send inside plain strings
const DATETIME_FORMAT_DASHED: &str = "%Y-%m-%dT%H:%M:%S";

/// Members of an XML-RPC `struct`, ordered by name
pub type Fields = BTreeMap<String, Value>;

/// A decoded XML-RPC value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Bool(bool),
    String(String),
    Double(f64),
    DateTime(NaiveDateTime),
    Base64(Vec<u8>),
    Struct(Fields),
    Array(Vec<Value>),
    Nil,
}

impl Value {
    /// Borrow the string payload
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Integer payload, accepting numeric strings
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Boolean payload, accepting 0/1 integers
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            Value::Int(0) => Some(false),
            Value::Int(1) => Some(true),
            _ => None,
        }
    }

    /// Timestamp payload, accepting strings in either supported layout
    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            Value::DateTime(dt) => Some(*dt),
            Value::String(s) => parse_datetime(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<&Fields> {
        match self {
            Value::Struct(fields) => Some(fields),
            _ => None,
        }
    }

    /// XML-RPC type tag, used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Bool(_) => "boolean",
            Value::String(_) => "string",
            Value::Double(_) => "double",
            Value::DateTime(_) => "dateTime.iso8601",
            Value::Base64(_) => "base64",
            Value::Struct(_) => "struct",
            Value::Array(_) => "array",
            Value::Nil => "nil",
        }
    }
}

/// Parse an XML-RPC timestamp
pub fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    NaiveDateTime::parse_from_str(text, DATETIME_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(text, DATETIME_FORMAT_DASHED))
        .ok()
}

/// Build a [`Fields`] map from literal pairs
pub fn fields<const N: usize>(pairs: [(&str, Value); N]) -> Fields {
    pairs
        .into_iter()
        .map(|(name, value)| (name.to_string(), value))
        .collect()
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{i}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::String(s) => write!(f, "{s}"),
            Value::Double(d) => write!(f, "{d}"),
            Value::DateTime(dt) => write!(f, "{}", dt.format(DATETIME_FORMAT)),
            Value::Base64(bytes) => write!(f, "<{} bytes>", bytes.len()),
            Value::Struct(fields) => write!(f, "<struct with {} members>", fields.len()),
            Value::Array(items) => write!(f, "<array of {}>", items.len()),
            Value::Nil => write!(f, "nil"),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(dt: NaiveDateTime) -> Self {
        Value::DateTime(dt)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl From<Fields> for Value {
    fn from(fields: Fields) -> Self {
        Value::Struct(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_parse_datetime_formats() {
        let expected = NaiveDate::from_ymd_opt(2012, 1, 31)
            .unwrap()
            .and_hms_opt(10, 15, 0)
            .unwrap();

        assert_eq!(parse_datetime("20120131T10:15:00"), Some(expected));
        assert_eq!(parse_datetime("2012-01-31T10:15:00"), Some(expected));
        assert_eq!(parse_datetime("yesterday"), None);
    }

    #[test]
    fn test_lenient_accessors() {
        assert_eq!(Value::from("42").as_i64(), Some(42));
        assert_eq!(Value::Int(1).as_bool(), Some(true));
        assert_eq!(Value::Int(7).as_bool(), None);
        assert!(Value::from("20120131T10:15:00").as_datetime().is_some());
        assert_eq!(Value::Nil.as_str(), None);
    }
}
