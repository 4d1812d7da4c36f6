use chrono::{DateTime, Utc};
use serde_json::Value;

use super::schema::FieldKind;
use super::upload::UploadDescriptor;
use crate::util::date;

/// A single form field value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FieldValue {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    Date(DateTime<Utc>),
    List(Vec<String>),
    /// Upload widget state after the user picked a file.
    Upload(UploadDescriptor),
}

impl FieldValue {
    /// Reads a backend document field according to the declared kind.
    pub fn from_json(kind: FieldKind, value: Option<&Value>) -> Self {
        let Some(value) = value else {
            return FieldValue::Empty;
        };

        match (kind, value) {
            (_, Value::Null) => FieldValue::Empty,
            (FieldKind::Bool, Value::Bool(b)) => FieldValue::Bool(*b),
            (FieldKind::Number, Value::Number(n)) => {
                n.as_f64().map(FieldValue::Number).unwrap_or_default()
            }
            (FieldKind::Number, Value::String(s)) => {
                s.trim().parse().map(FieldValue::Number).unwrap_or_default()
            }
            (FieldKind::Date, Value::String(s)) => {
                date::parse_instant(s).map(FieldValue::Date).unwrap_or_default()
            }
            (FieldKind::MultiChoice(_), Value::Array(items)) => {
                FieldValue::List(items.iter().filter_map(reference_id).collect())
            }
            (FieldKind::Text | FieldKind::Upload(_), Value::String(s)) => FieldValue::Text(s.clone()),
            (FieldKind::Choice(_), other) => reference_id(other).map(FieldValue::Text).unwrap_or_default(),
            (FieldKind::Text, Value::Number(n)) => FieldValue::Text(n.to_string()),
            _ => FieldValue::Empty,
        }
    }

    /// No value at all: empty, blank text and empty selections are the same.
    pub fn is_blank(&self) -> bool {
        match self {
            FieldValue::Empty => true,
            FieldValue::Text(s) => s.is_empty(),
            FieldValue::List(items) => items.is_empty(),
            _ => false,
        }
    }

    /// Equality used for change detection. Dates compare by instant.
    pub fn same_as(&self, other: &FieldValue) -> bool {
        if self.is_blank() && other.is_blank() {
            return true;
        }

        match (self, other) {
            // Backend timestamps carry milliseconds; finer digits are not compared.
            (FieldValue::Date(a), FieldValue::Date(b)) => a.timestamp_millis() == b.timestamp_millis(),
            (FieldValue::Number(a), FieldValue::Number(b)) => (a - b).abs() < f64::EPSILON,
            (a, b) => a == b,
        }
    }

    /// Outgoing JSON. Upload values must be resolved to a path beforehand.
    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Empty => Value::Null,
            FieldValue::Text(s) => Value::String(s.clone()),
            FieldValue::Number(n) if n.fract() == 0.0 && n.abs() < i64::MAX as f64 => {
                Value::from(*n as i64)
            }
            FieldValue::Number(n) => Value::from(*n),
            FieldValue::Bool(b) => Value::Bool(*b),
            FieldValue::Date(d) => Value::String(d.to_rfc3339()),
            FieldValue::List(items) => Value::from(items.clone()),
            FieldValue::Upload(upload) => upload
                .storage_path()
                .map(|p| Value::String(p.to_string()))
                .unwrap_or(Value::Null),
        }
    }

    pub fn display(&self) -> String {
        match self {
            FieldValue::Empty => String::new(),
            FieldValue::Text(s) => s.clone(),
            FieldValue::Number(_) => self.to_json().to_string(),
            FieldValue::Bool(true) => "active".to_string(),
            FieldValue::Bool(false) => "inactive".to_string(),
            FieldValue::Date(d) => date::display_date(d),
            FieldValue::List(items) => items.join(", "),
            FieldValue::Upload(upload) => match upload.last() {
                Some(file) => format!("{} ({})", file.name, file.status),
                None => String::new(),
            },
        }
    }
}

/// A reference may arrive as a bare id or as a populated document.
fn reference_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Object(map) => map.get("_id").and_then(|v| v.as_str()).map(str::to_string),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::list::reference::ReferenceKey;
    use serde_json::json;

    #[test]
    fn blank_values_are_equal() {
        assert!(FieldValue::Empty.same_as(&FieldValue::Text(String::new())));
        assert!(FieldValue::List(vec![]).same_as(&FieldValue::Empty));
        assert!(!FieldValue::Empty.same_as(&FieldValue::Bool(false)));
    }

    #[test]
    fn dates_compare_by_instant() {
        let a = FieldValue::from_json(FieldKind::Date, Some(&json!("2024-05-01T12:00:00+02:00")));
        let b = FieldValue::from_json(FieldKind::Date, Some(&json!("2024-05-01T10:00:00.000Z")));
        assert!(a.same_as(&b));
    }

    #[test]
    fn dates_compare_to_the_millisecond() {
        let a = FieldValue::from_json(FieldKind::Date, Some(&json!("2024-05-01T10:00:00.123456Z")));
        let b = FieldValue::from_json(FieldKind::Date, Some(&json!("2024-05-01T10:00:00.123Z")));
        let c = FieldValue::from_json(FieldKind::Date, Some(&json!("2024-05-01T10:00:00.124Z")));
        assert!(a.same_as(&b));
        assert!(!a.same_as(&c));
    }

    #[test]
    fn populated_references_read_as_ids() {
        let value = FieldValue::from_json(
            FieldKind::MultiChoice(ReferenceKey::Songs),
            Some(&json!([{ "_id": "s1", "name": "x" }, "s2"])),
        );
        assert_eq!(value, FieldValue::List(vec!["s1".into(), "s2".into()]));

        let value = FieldValue::from_json(
            FieldKind::Choice(ReferenceKey::Categories),
            Some(&json!({ "_id": "c1" })),
        );
        assert_eq!(value, FieldValue::Text("c1".into()));
    }

    #[test]
    fn whole_numbers_serialise_as_integers() {
        assert_eq!(FieldValue::Number(2.0).to_json(), json!(2));
        assert_eq!(FieldValue::Number(2.5).to_json(), json!(2.5));
    }

    #[test]
    fn mismatched_json_is_empty() {
        assert_eq!(FieldValue::from_json(FieldKind::Bool, Some(&json!("yes"))), FieldValue::Empty);
        assert_eq!(FieldValue::from_json(FieldKind::Date, Some(&json!("soon"))), FieldValue::Empty);
        assert_eq!(FieldValue::from_json(FieldKind::Text, None), FieldValue::Empty);
    }
}
