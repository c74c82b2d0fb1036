// src/cache/fields.rs

//! Schema-driven field merging
//!
//! Every cached record declares which remote field names it knows and how to
//! store them ([`FieldSchema`]). [`merge_fields`] walks an incoming struct,
//! skips identity fields, ignores names the record doesn't declare and only
//! counts a field as updated when the decoded value differs from the stored
//! one. Merging the same struct twice therefore reports no change the second
//! time. Ignored fields are reported at debug level.

use chrono::NaiveDateTime;

use crate::report::Reporter;
use crate::xmlrpc::{Fields, Value};

/// Field mapping of a record that can absorb remote structs
pub trait FieldSchema {
    /// Field names that identify the record; a merge never overwrites them
    const IDENTITY: &'static [&'static str];

    /// Store `value` into the field called `name`
    ///
    /// Returns `None` when the record has no such field or the value can't be
    /// decoded to the field's type, otherwise whether the stored value changed.
    fn assign(&mut self, name: &str, value: &Value) -> Option<bool>;
}

/// Merge `values` into `record`, returning whether any field changed
pub fn merge_fields<R: FieldSchema>(
    record: &mut R,
    values: &Fields,
    reporter: &dyn Reporter,
) -> bool {
    let mut updated = false;
    for (name, value) in values {
        if R::IDENTITY.contains(&name.as_str()) {
            continue;
        }
        match record.assign(name, value) {
            Some(changed) => updated |= changed,
            None => reporter.debug(&format!(
                "merge_fields(): ignoring remote field '{}' ({})",
                name,
                value.type_name()
            )),
        }
    }
    updated
}

/// Overwrite `slot` with the decoded `value` unless they are already equal
pub fn assign<T: FromValue + PartialEq>(slot: &mut T, value: &Value) -> Option<bool> {
    let decoded = T::from_value(value)?;
    if *slot == decoded {
        return Some(false);
    }
    *slot = decoded;
    Some(true)
}

/// Conversion from a remote value into a cached field type
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Option<Self>;
}

impl FromValue for String {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(s.clone()),
            Value::Nil => Some(String::new()),
            _ => None,
        }
    }
}

impl FromValue for Option<String> {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(Some(s.clone())),
            Value::Nil => Some(None),
            _ => None,
        }
    }
}

impl FromValue for i64 {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_i64()
    }
}

impl FromValue for bool {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_bool()
    }
}

impl FromValue for Option<NaiveDateTime> {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Nil => Some(None),
            other => other.as_datetime().map(Some),
        }
    }
}

impl FromValue for Vec<String> {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Array(items) => items
                .iter()
                .map(|item| item.as_str().map(str::to_string))
                .collect(),
            Value::Nil => Some(Vec::new()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{MemoryReporter, ReportLevel, SilentReporter};
    use crate::xmlrpc::fields;

    #[derive(Debug, Default)]
    struct Sample {
        key: String,
        title: String,
        count: i64,
        stamp: Option<NaiveDateTime>,
        tags: Vec<String>,
    }

    impl FieldSchema for Sample {
        const IDENTITY: &'static [&'static str] = &["key"];

        fn assign(&mut self, name: &str, value: &Value) -> Option<bool> {
            match name {
                "key" => assign(&mut self.key, value),
                "title" => assign(&mut self.title, value),
                "count" => assign(&mut self.count, value),
                "stamp" => assign(&mut self.stamp, value),
                "tags" => assign(&mut self.tags, value),
                _ => None,
            }
        }
    }

    #[test]
    fn test_merge_is_idempotent() {
        let values = fields([
            ("title", Value::from("Hello")),
            ("count", Value::Int(3)),
            ("stamp", Value::from("20120131T10:15:00")),
            ("tags", Value::Array(vec![Value::from("a"), Value::from("b")])),
        ]);
        let mut sample = Sample::default();

        assert!(merge_fields(&mut sample, &values, &SilentReporter));
        assert!(!merge_fields(&mut sample, &values, &SilentReporter));
        assert_eq!(sample.title, "Hello");
        assert_eq!(sample.count, 3);
        assert!(sample.stamp.is_some());
        assert_eq!(sample.tags, vec!["a", "b"]);
    }

    #[test]
    fn test_identity_and_unknown_fields_are_skipped() {
        let mut sample = Sample {
            key: "k1".to_string(),
            ..Default::default()
        };
        let values = fields([("key", Value::from("k2")), ("colour", Value::from("red"))]);

        let reporter = MemoryReporter::new();
        assert!(!merge_fields(&mut sample, &values, &reporter));
        assert_eq!(sample.key, "k1");

        // identity fields are skipped silently, unknown ones are reported
        let ignored = reporter.at(ReportLevel::Debug);
        assert_eq!(ignored.len(), 1);
        assert!(ignored[0].contains("'colour'"));
    }

    #[test]
    fn test_undecodable_values_are_ignored() {
        let mut sample = Sample::default();
        let values = fields([
            ("count", Value::from("many")),
            ("tags", Value::Array(vec![Value::Int(1)])),
        ]);

        assert!(!merge_fields(&mut sample, &values, &SilentReporter));
        assert_eq!(sample.count, 0);
        assert!(sample.tags.is_empty());
    }

    #[test]
    fn test_equal_empty_value_is_not_a_change() {
        let mut sample = Sample::default();
        assert!(!merge_fields(&mut sample, &fields([("title", Value::from(""))]), &SilentReporter));
        assert!(!merge_fields(&mut sample, &fields([("title", Value::Nil)]), &SilentReporter));
    }
}
