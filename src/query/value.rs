use chrono::{DateTime, Utc};

use crate::util::date;

/// How a filter field is coerced out of the location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    /// Free-text search, passed through as-is.
    Text,
    /// Enumerated integer code.
    Number,
    Bool,
    /// Day boundary of a date range.
    Date,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Text(String),
    Number(i64),
    Bool(bool),
    Date(DateTime<Utc>),
}

impl FilterValue {
    /// Coerces a raw location value. `None` means the field stays unset.
    pub fn decode(kind: FilterKind, raw: &str) -> Option<Self> {
        match kind {
            FilterKind::Text => (!raw.is_empty()).then(|| FilterValue::Text(raw.to_string())),
            FilterKind::Number => raw.trim().parse::<i64>().ok().map(FilterValue::Number),
            // key present: anything but the literal `false` is truthy
            FilterKind::Bool => Some(FilterValue::Bool(raw != "false")),
            FilterKind::Date => date::parse_day(raw).map(FilterValue::Date),
        }
    }

    /// Textual form written to the location.
    pub fn encode(&self) -> String {
        match self {
            FilterValue::Text(s) => s.clone(),
            FilterValue::Number(n) => n.to_string(),
            FilterValue::Bool(b) => b.to_string(),
            FilterValue::Date(d) => date::format_day(d),
        }
    }

    /// Textual form sent to the backend list endpoint.
    pub fn to_request_value(&self) -> String {
        match self {
            FilterValue::Date(d) => d.to_rfc3339(),
            other => other.encode(),
        }
    }
}

/// The filter fields a list page understands.
#[derive(Debug, Clone, Copy)]
pub struct FilterSchema {
    pub fields: &'static [(&'static str, FilterKind)],
}

impl FilterSchema {
    pub const fn new(fields: &'static [(&'static str, FilterKind)]) -> Self {
        Self { fields }
    }

    pub fn kind_of(&self, name: &str) -> Option<FilterKind> {
        self.fields
            .iter()
            .find(|(field, _)| *field == name)
            .map(|(_, kind)| *kind)
    }

    /// Kind used when decoding `name`; unknown keys pass through as text.
    pub fn coercion_for(&self, name: &str) -> FilterKind {
        self.kind_of(name).unwrap_or(FilterKind::Text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bool_is_true_unless_literal_false() {
        assert_eq!(FilterValue::decode(FilterKind::Bool, "false"), Some(FilterValue::Bool(false)));
        assert_eq!(FilterValue::decode(FilterKind::Bool, "true"), Some(FilterValue::Bool(true)));
        assert_eq!(FilterValue::decode(FilterKind::Bool, ""), Some(FilterValue::Bool(true)));
        assert_eq!(FilterValue::decode(FilterKind::Bool, "0"), Some(FilterValue::Bool(true)));
        assert_eq!(FilterValue::decode(FilterKind::Bool, "False"), Some(FilterValue::Bool(true)));
    }

    #[test]
    fn malformed_numbers_and_dates_are_unset() {
        assert_eq!(FilterValue::decode(FilterKind::Number, "abc"), None);
        assert_eq!(FilterValue::decode(FilterKind::Number, ""), None);
        assert_eq!(FilterValue::decode(FilterKind::Date, "31/31/2020"), None);
        assert_eq!(FilterValue::decode(FilterKind::Number, "2"), Some(FilterValue::Number(2)));
    }

    #[test]
    fn empty_text_is_unset() {
        assert_eq!(FilterValue::decode(FilterKind::Text, ""), None);
        assert_eq!(
            FilterValue::decode(FilterKind::Text, "lofi beats"),
            Some(FilterValue::Text("lofi beats".into()))
        );
    }

    #[test]
    fn dates_encode_as_day_and_request_as_instant() {
        let value = FilterValue::decode(FilterKind::Date, "2024-02-01").unwrap();
        assert_eq!(value.encode(), "2024-02-01");
        assert_eq!(value.to_request_value(), "2024-02-01T00:00:00+00:00");
    }
}
