use serde_json::{Map, Value};

use super::upload::UploadKind;
use crate::{entity::Resource, list::reference::ReferenceKey};

/// Outgoing request body of a create or update.
pub type Payload = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Number,
    Bool,
    Date,
    /// Single id picked from a reference list.
    Choice(ReferenceKey),
    /// Several ids picked from a reference list.
    MultiChoice(ReferenceKey),
    Upload(UploadKind),
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    /// Records on which the field is read-only.
    pub locked_when: Option<fn(&Value) -> bool>,
}

impl FieldSpec {
    pub const fn required(name: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            label,
            kind,
            required: true,
            locked_when: None,
        }
    }

    pub const fn optional(name: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            label,
            kind,
            required: false,
            locked_when: None,
        }
    }

    pub const fn locked_when(self, predicate: fn(&Value) -> bool) -> Self {
        Self {
            locked_when: Some(predicate),
            ..self
        }
    }

    pub fn is_locked_on(&self, record: &Value) -> bool {
        self.locked_when.is_some_and(|locked| locked(record))
    }
}

/// Editable fields of a resource and how its payload leaves the client.
pub struct FormSchema {
    pub resource: Resource,
    pub fields: &'static [FieldSpec],
    pub outbound: fn(&mut Payload),
}

impl FormSchema {
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn upload_fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields
            .iter()
            .filter(|f| matches!(f.kind, FieldKind::Upload(_)))
    }

    /// Reference lists the form needs for its selection fields.
    pub fn references(&self) -> Vec<ReferenceKey> {
        let mut keys = Vec::new();
        for field in self.fields {
            if let FieldKind::Choice(key) | FieldKind::MultiChoice(key) = field.kind {
                if !keys.contains(&key) {
                    keys.push(key);
                }
            }
        }
        keys
    }
}

/// Outbound transform for resources that send fields as loaded.
pub fn unchanged(_payload: &mut Payload) {}
