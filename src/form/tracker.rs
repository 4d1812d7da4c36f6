use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::debug;

use super::{
    error::FormError,
    schema::{FieldKind, FormSchema, Payload},
    value::FieldValue,
};
use crate::{entity::record_id, util::date};

pub type FormValues = BTreeMap<String, FieldValue>;

/// Fields whose current value differs from the snapshot.
pub type ChangeSet = BTreeMap<String, FieldValue>;

/// Baseline of one loaded entity. Only ever replaced as a whole.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntitySnapshot {
    pub id: Option<String>,
    pub values: FormValues,
    /// Stored URLs of upload fields, shown as previews.
    pub previews: BTreeMap<String, String>,
    /// Fields that are read-only on this record.
    pub locked: BTreeSet<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl EntitySnapshot {
    /// Baseline of a create form: every field empty.
    pub fn blank(schema: &FormSchema) -> Self {
        Self {
            values: schema
                .fields
                .iter()
                .map(|f| (f.name.to_string(), FieldValue::Empty))
                .collect(),
            ..Self::default()
        }
    }

    pub fn from_record(schema: &FormSchema, record: &Value) -> Self {
        let mut values = FormValues::new();
        let mut previews = BTreeMap::new();
        let mut locked = BTreeSet::new();

        for field in schema.fields {
            if field.is_locked_on(record) {
                locked.insert(field.name.to_string());
            }
            let raw = record.get(field.name);
            let value = FieldValue::from_json(field.kind, raw);
            if let (FieldKind::Upload(_), FieldValue::Text(url)) = (field.kind, &value) {
                previews.insert(field.name.to_string(), url.clone());
            }
            values.insert(field.name.to_string(), value);
        }

        let stamp = |key: &str| {
            record
                .get(key)
                .and_then(|v| v.as_str())
                .and_then(date::parse_instant)
        };

        Self {
            id: record_id(record).map(str::to_string),
            values,
            previews,
            locked,
            created_at: stamp("createdAt"),
            updated_at: stamp("updatedAt"),
        }
    }
}

/// Fields of `values` that differ from `snapshot`. Missing snapshot fields
/// count as empty.
pub fn diff(values: &FormValues, snapshot: &FormValues) -> ChangeSet {
    values
        .iter()
        .filter(|(field, value)| {
            let before = snapshot.get(*field).unwrap_or(&FieldValue::Empty);
            !value.same_as(before)
        })
        .map(|(field, value)| (field.clone(), value.clone()))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitMode {
    Create,
    Update(String),
}

/// A payload ready to send, plus the changes it was built from.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub mode: SubmitMode,
    pub payload: Payload,
    pub changes: ChangeSet,
}

/// Change tracking for one detail form.
pub struct ChangeTracker {
    schema: &'static FormSchema,
    snapshot: EntitySnapshot,
    values: FormValues,
    changes: ChangeSet,
    previews: BTreeMap<String, String>,
    in_flight: Option<ChangeSet>,
    /// A create went through but the backend did not say which id it got.
    created_without_id: bool,
}

impl ChangeTracker {
    /// Tracker for a create form.
    pub fn new(schema: &'static FormSchema) -> Self {
        let snapshot = EntitySnapshot::blank(schema);
        Self {
            schema,
            values: snapshot.values.clone(),
            previews: snapshot.previews.clone(),
            snapshot,
            changes: ChangeSet::new(),
            in_flight: None,
            created_without_id: false,
        }
    }

    pub fn with_snapshot(schema: &'static FormSchema, snapshot: EntitySnapshot) -> Self {
        let mut tracker = Self::new(schema);
        tracker.load(snapshot);
        tracker
    }

    /// A freshly loaded entity replaces the baseline, the displayed values
    /// and the previews in one step, and drops every tracked change.
    pub fn load(&mut self, snapshot: EntitySnapshot) {
        self.values = snapshot.values.clone();
        self.previews = snapshot.previews.clone();
        self.snapshot = snapshot;
        self.changes.clear();
        self.in_flight = None;
        self.created_without_id = false;
    }

    pub fn load_record(&mut self, record: &Value) {
        self.load(EntitySnapshot::from_record(self.schema, record));
    }

    pub fn schema(&self) -> &'static FormSchema {
        self.schema
    }

    pub fn snapshot(&self) -> &EntitySnapshot {
        &self.snapshot
    }

    pub fn values(&self) -> &FormValues {
        &self.values
    }

    pub fn value(&self, field: &str) -> &FieldValue {
        self.values.get(field).unwrap_or(&FieldValue::Empty)
    }

    pub fn changes(&self) -> &ChangeSet {
        &self.changes
    }

    pub fn preview(&self, field: &str) -> Option<&str> {
        self.previews.get(field).map(String::as_str)
    }

    pub fn is_creating(&self) -> bool {
        self.snapshot.id.is_none()
    }

    pub fn is_submitting(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn is_locked(&self, field: &str) -> bool {
        self.snapshot.locked.contains(field)
    }

    /// The record exists on the backend but this form cannot address it.
    pub fn created_without_id(&self) -> bool {
        self.created_without_id
    }

    /// Save/cancel controls are shown only while something changed.
    pub fn controls_visible(&self) -> bool {
        !self.changes.is_empty()
    }

    /// Recomputes the change set from scratch against the snapshot.
    /// `changed` only drives upload previews. Locked fields keep their
    /// snapshot value.
    pub fn on_values_change(&mut self, changed: &FormValues, all: &FormValues) {
        for (field, value) in changed {
            if self.is_locked(field) {
                continue;
            }
            if let FieldValue::Upload(upload) = value {
                if let Some(path) = upload.storage_path() {
                    self.previews.insert(field.clone(), path.to_string());
                }
            }
        }

        self.values = all.clone();
        for field in &self.snapshot.locked {
            if let Some(value) = self.snapshot.values.get(field) {
                self.values.insert(field.clone(), value.clone());
            }
        }
        self.changes = diff(&self.values, &self.snapshot.values);
        debug!(
            resource = %self.schema.resource,
            changed = self.changes.len(),
            "form values changed"
        );
    }

    pub fn set_field(&mut self, field: &str, value: FieldValue) -> Result<(), FormError> {
        let Some(spec) = self.schema.field(field) else {
            return Err(FormError::UnknownField(field.to_string()));
        };
        if self.is_locked(field) {
            return Err(FormError::Locked {
                field: field.to_string(),
                label: spec.label.to_string(),
            });
        }

        let mut all = self.values.clone();
        all.insert(field.to_string(), value.clone());
        let changed = FormValues::from([(field.to_string(), value)]);
        self.on_values_change(&changed, &all);
        Ok(())
    }

    /// Required-field check over the displayed values. Locked fields are
    /// not the user's to fill.
    pub fn validate(&self) -> Result<(), FormError> {
        for field in self
            .schema
            .fields
            .iter()
            .filter(|f| f.required && !self.is_locked(f.name))
        {
            if self.value(field.name).is_blank() {
                return Err(FormError::Required {
                    field: field.name.to_string(),
                    label: field.label.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Builds the outgoing payload from the change set.
    ///
    /// Returns `Ok(None)` when nothing changed or a submission is already in
    /// flight; no request must be made then. The change set stays in place
    /// until [`ChangeTracker::submit_succeeded`] or
    /// [`ChangeTracker::submit_failed`] is called.
    pub fn submit(&mut self) -> Result<Option<Submission>, FormError> {
        if self.changes.is_empty() || self.in_flight.is_some() {
            return Ok(None);
        }
        if self.created_without_id {
            return Err(FormError::CreatedWithoutId);
        }

        self.validate()?;

        let mut payload = Payload::new();
        for (field, value) in &self.changes {
            let json = match value {
                FieldValue::Upload(upload) => {
                    let path = upload.storage_path().ok_or_else(|| FormError::UploadIncomplete {
                        field: field.clone(),
                    })?;
                    Value::String(path.to_string())
                }
                other => other.to_json(),
            };
            payload.insert(field.clone(), json);
        }
        (self.schema.outbound)(&mut payload);

        let mode = match &self.snapshot.id {
            Some(id) => SubmitMode::Update(id.clone()),
            None => SubmitMode::Create,
        };

        self.in_flight = Some(self.changes.clone());
        Ok(Some(Submission {
            mode,
            payload,
            changes: self.changes.clone(),
        }))
    }

    /// The backend accepted the submission. When it echoed the saved record
    /// the form reloads from it; otherwise the submitted values become the
    /// new baseline and edits made meanwhile stay tracked.
    pub fn submit_succeeded(&mut self, saved: Option<&Value>) {
        if let Some(record) = saved.filter(|r| self.is_saved_record(r)) {
            self.load_record(record);
            return;
        }

        let Some(submitted) = self.in_flight.take() else {
            return;
        };
        if self.snapshot.id.is_none() {
            self.created_without_id = true;
        }

        for (field, value) in submitted {
            let stored = match value {
                FieldValue::Upload(upload) => match upload.storage_path() {
                    Some(path) => {
                        self.snapshot.previews.insert(field.clone(), path.to_string());
                        FieldValue::Text(path.to_string())
                    }
                    None => continue,
                },
                other => other,
            };
            self.snapshot.values.insert(field, stored);
        }

        self.changes = diff(&self.values, &self.snapshot.values);
    }

    /// A reply is the saved record only if it carries the record's id, or
    /// any id after a create.
    fn is_saved_record(&self, reply: &Value) -> bool {
        match (record_id(reply), &self.snapshot.id) {
            (Some(id), Some(current)) => id == current.as_str(),
            (Some(_), None) => true,
            (None, _) => false,
        }
    }

    /// The backend rejected the submission; the change set is kept so the
    /// same edit can be retried.
    pub fn submit_failed(&mut self) {
        self.in_flight = None;
    }

    /// Drops every edit and shows the snapshot again.
    pub fn reset(&mut self) {
        self.values = self.snapshot.values.clone();
        self.previews = self.snapshot.previews.clone();
        self.changes.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        entity::Resource,
        form::{
            schema::{FieldSpec, unchanged},
            upload::{UploadDescriptor, UploadKind, UploadResponse, UploadedPath},
        },
    };
    use assert_matches::assert_matches;
    use serde_json::json;

    static FIELDS: [FieldSpec; 4] = [
        FieldSpec::required("name", "Name", FieldKind::Text),
        FieldSpec::required("isActive", "Status", FieldKind::Bool),
        FieldSpec::optional("releasedAt", "Released", FieldKind::Date),
        FieldSpec::optional("bannerURL", "Banner", FieldKind::Upload(UploadKind::Image)),
    ];

    static SCHEMA: FormSchema = FormSchema {
        resource: Resource::Categories,
        fields: &FIELDS,
        outbound: unchanged,
    };

    fn loaded() -> ChangeTracker {
        let record = json!({
            "_id": "c1",
            "name": "A",
            "isActive": true,
            "releasedAt": "2024-01-01T00:00:00.000Z",
            "bannerURL": "https://cdn/banner.png",
            "createdAt": "2023-12-01T00:00:00Z",
        });
        ChangeTracker::with_snapshot(&SCHEMA, EntitySnapshot::from_record(&SCHEMA, &record))
    }

    fn uploaded(path: &str) -> FieldValue {
        let mut upload = UploadDescriptor::default();
        let uid = upload.begin("banner.png");
        upload.complete(
            uid,
            UploadResponse {
                data: UploadedPath { path: path.into() },
            },
        );
        FieldValue::Upload(upload)
    }

    // -- snapshot -----------------------------------------------------------

    #[test]
    fn snapshot_reads_id_stamps_and_previews() {
        let tracker = loaded();
        let snapshot = tracker.snapshot();
        assert_eq!(snapshot.id.as_deref(), Some("c1"));
        assert!(snapshot.created_at.is_some());
        assert!(snapshot.updated_at.is_none());
        assert_eq!(tracker.preview("bannerURL"), Some("https://cdn/banner.png"));
        assert!(!tracker.controls_visible());
    }

    // -- change tracking --------------------------------------------------------

    #[test]
    fn edit_and_revert_leaves_no_changes() {
        let mut tracker = loaded();
        tracker.set_field("name", FieldValue::Text("B".into())).unwrap();
        assert!(tracker.controls_visible());
        assert_eq!(tracker.changes().len(), 1);

        tracker.set_field("name", FieldValue::Text("A".into())).unwrap();
        assert!(tracker.changes().is_empty());
        assert!(!tracker.controls_visible());
    }

    #[test]
    fn reselecting_same_instant_is_not_a_change() {
        let mut tracker = loaded();
        let same = date::parse_instant("2024-01-01T07:00:00+07:00").unwrap();
        tracker.set_field("releasedAt", FieldValue::Date(same)).unwrap();
        assert!(tracker.changes().is_empty());
    }

    #[test]
    fn change_set_is_recomputed_not_merged() {
        let mut tracker = loaded();
        tracker.set_field("name", FieldValue::Text("B".into())).unwrap();

        let mut all = tracker.values().clone();
        all.insert("name".into(), FieldValue::Text("A".into()));
        all.insert("isActive".into(), FieldValue::Bool(false));
        tracker.on_values_change(&FormValues::new(), &all);

        assert_eq!(tracker.changes().keys().collect::<Vec<_>>(), vec!["isActive"]);
    }

    #[test]
    fn unknown_field_is_rejected() {
        let mut tracker = loaded();
        assert_matches!(
            tracker.set_field("nope", FieldValue::Empty),
            Err(FormError::UnknownField(_))
        );
    }

    // -- submit -------------------------------------------------------------

    #[test]
    fn empty_change_set_submits_nothing() {
        let mut tracker = loaded();
        assert_eq!(tracker.submit().unwrap(), None);
        assert!(!tracker.is_submitting());
    }

    #[test]
    fn upload_is_sent_as_storage_path() {
        let mut tracker = loaded();
        tracker.set_field("bannerURL", uploaded("/images/new.png")).unwrap();
        assert_eq!(tracker.preview("bannerURL"), Some("/images/new.png"));

        let submission = tracker.submit().unwrap().unwrap();
        assert_eq!(submission.mode, SubmitMode::Update("c1".into()));
        assert_eq!(submission.payload["bannerURL"], json!("/images/new.png"));
        assert_eq!(submission.payload.len(), 1);
    }

    #[test]
    fn unfinished_upload_blocks_submit() {
        let mut tracker = loaded();
        let mut upload = UploadDescriptor::default();
        upload.begin("banner.png");
        tracker.set_field("bannerURL", FieldValue::Upload(upload)).unwrap();

        assert_matches!(tracker.submit(), Err(FormError::UploadIncomplete { .. }));
        assert!(!tracker.is_submitting());
    }

    #[test]
    fn missing_required_field_blocks_submit() {
        let mut tracker = loaded();
        tracker.set_field("name", FieldValue::Text(String::new())).unwrap();
        assert_matches!(tracker.submit(), Err(FormError::Required { ref field, .. }) if field == "name");
    }

    #[test]
    fn failed_submit_keeps_changes_for_retry() {
        let mut tracker = loaded();
        tracker.set_field("name", FieldValue::Text("B".into())).unwrap();

        let first = tracker.submit().unwrap().unwrap();
        assert!(tracker.is_submitting());
        assert_eq!(tracker.submit().unwrap(), None);

        tracker.submit_failed();
        assert!(tracker.controls_visible());
        let retry = tracker.submit().unwrap().unwrap();
        assert_eq!(retry.payload, first.payload);
    }

    #[test]
    fn successful_submit_moves_baseline() {
        let mut tracker = loaded();
        tracker.set_field("name", FieldValue::Text("B".into())).unwrap();
        tracker.submit().unwrap();

        // edited again while the request was running
        tracker.set_field("isActive", FieldValue::Bool(false)).unwrap();
        tracker.submit_succeeded(None);

        assert_eq!(tracker.snapshot().values["name"], FieldValue::Text("B".into()));
        assert_eq!(tracker.changes().keys().collect::<Vec<_>>(), vec!["isActive"]);
        assert!(!tracker.is_submitting());
    }

    #[test]
    fn successful_submit_with_document_reloads() {
        let mut tracker = loaded();
        tracker.set_field("name", FieldValue::Text("B".into())).unwrap();
        tracker.submit().unwrap();
        tracker.submit_succeeded(Some(&json!({ "_id": "c1", "name": "B", "isActive": true })));

        assert!(tracker.changes().is_empty());
        assert_eq!(tracker.value("name"), &FieldValue::Text("B".into()));
        assert_eq!(tracker.preview("bannerURL"), None);
    }

    #[test]
    fn status_reply_is_not_taken_for_the_record() {
        let mut tracker = loaded();
        tracker.set_field("name", FieldValue::Text("B".into())).unwrap();
        tracker.submit().unwrap();
        tracker.submit_succeeded(Some(&json!({ "message": "Updated successfully" })));

        assert_eq!(tracker.snapshot().id.as_deref(), Some("c1"));
        assert_eq!(tracker.value("name"), &FieldValue::Text("B".into()));
        assert_eq!(tracker.preview("bannerURL"), Some("https://cdn/banner.png"));
        assert!(tracker.changes().is_empty());

        tracker.set_field("name", FieldValue::Text("C".into())).unwrap();
        let next = tracker.submit().unwrap().unwrap();
        assert_eq!(next.mode, SubmitMode::Update("c1".into()));
    }

    #[test]
    fn reply_for_another_record_is_ignored() {
        let mut tracker = loaded();
        tracker.set_field("name", FieldValue::Text("B".into())).unwrap();
        tracker.submit().unwrap();
        tracker.submit_succeeded(Some(&json!({ "_id": "c2", "name": "Other" })));

        assert_eq!(tracker.snapshot().id.as_deref(), Some("c1"));
        assert_eq!(tracker.snapshot().values["name"], FieldValue::Text("B".into()));
    }

    // -- locked fields ----------------------------------------------------------

    fn locked_when_archived(record: &Value) -> bool {
        record.get("archived") == Some(&Value::Bool(true))
    }

    static LOCKING_FIELDS: [FieldSpec; 2] = [
        FieldSpec::required("name", "Name", FieldKind::Text).locked_when(locked_when_archived),
        FieldSpec::required("isActive", "Status", FieldKind::Bool),
    ];

    static LOCKING: FormSchema = FormSchema {
        resource: Resource::Songs,
        fields: &LOCKING_FIELDS,
        outbound: unchanged,
    };

    #[test]
    fn locked_field_rejects_edits_and_skips_validation() {
        let record = json!({ "_id": "s1", "archived": true, "isActive": true });
        let mut tracker = ChangeTracker::with_snapshot(&LOCKING, EntitySnapshot::from_record(&LOCKING, &record));
        assert!(tracker.is_locked("name"));

        assert_matches!(
            tracker.set_field("name", FieldValue::Text("B".into())),
            Err(FormError::Locked { ref field, .. }) if field == "name"
        );

        let mut all = tracker.values().clone();
        all.insert("name".into(), FieldValue::Text("B".into()));
        all.insert("isActive".into(), FieldValue::Bool(false));
        tracker.on_values_change(&FormValues::new(), &all);
        assert_eq!(tracker.changes().keys().collect::<Vec<_>>(), vec!["isActive"]);

        // name is empty on the record but not required of the user
        let submission = tracker.submit().unwrap().unwrap();
        assert_eq!(submission.payload, json!({ "isActive": false }).as_object().unwrap().clone());
    }

    #[test]
    fn unlocked_record_edits_normally() {
        let record = json!({ "_id": "s1", "archived": false, "name": "A", "isActive": true });
        let mut tracker = ChangeTracker::with_snapshot(&LOCKING, EntitySnapshot::from_record(&LOCKING, &record));
        assert!(!tracker.is_locked("name"));
        tracker.set_field("name", FieldValue::Text("B".into())).unwrap();
        assert!(tracker.controls_visible());
    }

    // -- reset / create ---------------------------------------------------------

    #[test]
    fn reset_restores_values_and_previews() {
        let mut tracker = loaded();
        tracker.set_field("bannerURL", uploaded("/images/new.png")).unwrap();
        tracker.set_field("name", FieldValue::Text("B".into())).unwrap();

        tracker.reset();
        assert!(tracker.changes().is_empty());
        assert_eq!(tracker.value("name"), &FieldValue::Text("A".into()));
        assert_eq!(tracker.preview("bannerURL"), Some("https://cdn/banner.png"));
    }

    #[test]
    fn create_form_submits_every_filled_field() {
        let mut tracker = ChangeTracker::new(&SCHEMA);
        assert!(tracker.is_creating());
        tracker.set_field("name", FieldValue::Text("New".into())).unwrap();
        assert_matches!(tracker.submit(), Err(FormError::Required { .. }));

        tracker.set_field("isActive", FieldValue::Bool(true)).unwrap();
        let submission = tracker.submit().unwrap().unwrap();
        assert_eq!(submission.mode, SubmitMode::Create);
        assert_eq!(submission.payload, json!({ "name": "New", "isActive": true }).as_object().unwrap().clone());
    }

    #[test]
    fn create_without_returned_id_cannot_be_saved_again() {
        let mut tracker = ChangeTracker::new(&SCHEMA);
        tracker.set_field("name", FieldValue::Text("New".into())).unwrap();
        tracker.set_field("isActive", FieldValue::Bool(true)).unwrap();
        assert_eq!(tracker.submit().unwrap().unwrap().mode, SubmitMode::Create);
        tracker.submit_succeeded(None);
        assert!(tracker.created_without_id());

        tracker.set_field("name", FieldValue::Text("Renamed".into())).unwrap();
        assert_matches!(tracker.submit(), Err(FormError::CreatedWithoutId));
        assert!(!tracker.is_submitting());
    }

    #[test]
    fn create_with_returned_id_switches_to_update() {
        let mut tracker = ChangeTracker::new(&SCHEMA);
        tracker.set_field("name", FieldValue::Text("New".into())).unwrap();
        tracker.set_field("isActive", FieldValue::Bool(true)).unwrap();
        tracker.submit().unwrap();
        tracker.submit_succeeded(Some(&json!({ "_id": "c9", "name": "New", "isActive": true })));

        assert!(!tracker.created_without_id());
        tracker.set_field("name", FieldValue::Text("Renamed".into())).unwrap();
        assert_eq!(tracker.submit().unwrap().unwrap().mode, SubmitMode::Update("c9".into()));
    }
}
