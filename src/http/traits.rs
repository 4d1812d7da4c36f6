use async_trait::async_trait;
use serde_json::Value;

use super::{error::ApiError, model::Page};
use crate::{
    entity::Resource,
    form::{LocalFile, Payload, UploadKind, UploadResponse},
};

/// Everything the console needs from the catalog backend.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn list(&self, resource: Resource, params: &[(String, String)]) -> Result<Page, ApiError>;

    async fn get(&self, resource: Resource, id: &str) -> Result<Value, ApiError>;

    /// Returns the stored document when the backend sends one back.
    async fn create(&self, resource: Resource, payload: &Payload) -> Result<Option<Value>, ApiError>;

    async fn update(
        &self,
        resource: Resource,
        id: &str,
        payload: &Payload,
    ) -> Result<Option<Value>, ApiError>;

    async fn delete(&self, resource: Resource, id: &str) -> Result<(), ApiError>;

    async fn upload(&self, kind: UploadKind, file: &LocalFile) -> Result<UploadResponse, ApiError>;
}
