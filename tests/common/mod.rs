#![allow(dead_code)]

use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{Value, json};
use tunedesk::{
    entity::Resource,
    form::{LocalFile, Payload, UploadKind, UploadResponse},
    http::{ApiError, Backend, Page},
};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    List(Resource, Vec<(String, String)>),
    Get(Resource, String),
    Create(Resource, Payload),
    Update(Resource, String, Payload),
    Delete(Resource, String),
    Upload(UploadKind, String),
}

/// In-memory backend that records every call and answers from fixtures.
pub struct FakeBackend {
    pub calls: Mutex<Vec<Call>>,
    pub rows: Vec<Value>,
    pub fail_with: Option<ApiError>,
    pub echo_saved: bool,
}

impl FakeBackend {
    pub fn with_rows(rows: Vec<Value>) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            rows,
            fail_with: None,
            echo_saved: false,
        }
    }

    pub fn failing(error: ApiError) -> Self {
        Self {
            fail_with: Some(error),
            ..Self::with_rows(Vec::new())
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|c| pred(c)).count()
    }

    fn record(&self, call: Call) -> Result<(), ApiError> {
        self.calls.lock().unwrap().push(call);
        match &self.fail_with {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl Backend for FakeBackend {
    async fn list(&self, resource: Resource, params: &[(String, String)]) -> Result<Page, ApiError> {
        self.record(Call::List(resource, params.to_vec()))?;
        Ok(Page {
            total: self.rows.len() as u64,
            rows: self.rows.clone(),
        })
    }

    async fn get(&self, resource: Resource, id: &str) -> Result<Value, ApiError> {
        self.record(Call::Get(resource, id.to_string()))?;
        self.rows
            .iter()
            .find(|r| r["_id"] == id)
            .cloned()
            .ok_or(ApiError::Status {
                status: 404,
                message: "Not found".into(),
            })
    }

    async fn create(&self, resource: Resource, payload: &Payload) -> Result<Option<Value>, ApiError> {
        self.record(Call::Create(resource, payload.clone()))?;
        if !self.echo_saved {
            return Ok(None);
        }
        let mut saved = payload.clone();
        saved.insert("_id".into(), json!("new-id"));
        Ok(Some(Value::Object(saved)))
    }

    async fn update(
        &self,
        resource: Resource,
        id: &str,
        payload: &Payload,
    ) -> Result<Option<Value>, ApiError> {
        self.record(Call::Update(resource, id.to_string(), payload.clone()))?;
        Ok(None)
    }

    async fn delete(&self, resource: Resource, id: &str) -> Result<(), ApiError> {
        self.record(Call::Delete(resource, id.to_string()))
    }

    async fn upload(&self, kind: UploadKind, file: &LocalFile) -> Result<UploadResponse, ApiError> {
        self.record(Call::Upload(kind, file.name.clone()))?;
        Ok(serde_json::from_value(json!({ "data": { "path": format!("uploads/{}", file.name) } }))?)
    }
}

pub fn record(id: &str, name: &str) -> Value {
    json!({
        "_id": id,
        "name": name,
        "isActive": true,
        "createdAt": "2024-01-02T10:00:00.000Z",
        "updatedAt": "2024-01-03T10:00:00.000Z"
    })
}
