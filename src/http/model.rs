use serde::Deserialize;
use serde_json::Value;

use super::error::ApiError;

/// One page of a list endpoint, normalised.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub rows: Vec<Value>,
    /// Server-side row count across all pages.
    pub total: u64,
}

#[derive(Debug, Deserialize)]
struct ListEnvelope {
    #[serde(default)]
    data: Vec<Value>,
    #[serde(default)]
    pagination: Option<ListPagination>,
}

#[derive(Debug, Deserialize)]
struct ListPagination {
    count: u64,
}

impl Page {
    /// `{data: [...], pagination: {count}}`; a bare array is also accepted.
    pub fn from_body(body: Value) -> Result<Self, ApiError> {
        if let Value::Array(rows) = body {
            let total = rows.len() as u64;
            return Ok(Self { rows, total });
        }

        let envelope: ListEnvelope = serde_json::from_value(body)?;
        let total = envelope
            .pagination
            .map(|p| p.count)
            .unwrap_or(envelope.data.len() as u64);

        Ok(Self {
            rows: envelope.data,
            total,
        })
    }
}

/// The document carried by a detail or mutation response: either the bare
/// object or a `{data: {...}}` envelope.
pub fn document(body: Value) -> Option<Value> {
    match body {
        Value::Object(mut map) => match map.remove("data") {
            Some(inner @ Value::Object(_)) => Some(inner),
            Some(other) => {
                map.insert("data".to_string(), other);
                Some(Value::Object(map))
            }
            None => Some(Value::Object(map)),
        },
        _ => None,
    }
}
