pub mod error;
pub mod model;
pub mod traits;

use async_trait::async_trait;
use reqwest::{
    Client, RequestBuilder,
    multipart::{Form, Part},
};
use serde_json::Value;
use tracing::{debug, warn};

use crate::{
    config::AdminConfig,
    entity::Resource,
    form::{LocalFile, Payload, UploadKind, UploadResponse},
};

pub use error::ApiError;
pub use model::Page;
pub use traits::Backend;

/// reqwest-backed client for the catalog and upload services.
pub struct ApiService {
    client: Client,
    api_url: String,
    image_api_url: String,
    upload_song_api_url: String,
}

impl ApiService {
    pub fn new(config: &AdminConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            image_api_url: config.image_api_url.clone(),
            upload_song_api_url: config.upload_song_api_url.clone(),
        })
    }

    fn collection_url(&self, resource: Resource) -> String {
        format!("{}{}", self.api_url, resource.path())
    }

    fn item_url(&self, resource: Resource, id: &str) -> String {
        format!(
            "{}{}/{}",
            self.api_url,
            resource.path(),
            urlencoding::encode(id)
        )
    }

    fn upload_url(&self, kind: UploadKind) -> String {
        match kind {
            UploadKind::Image => format!("{}images", self.image_api_url),
            UploadKind::Audio => format!("{}upload-song", self.upload_song_api_url),
        }
    }

    /// Sends the request and returns the JSON body; an empty body reads as
    /// `null`.
    async fn send(&self, request: RequestBuilder) -> Result<Value, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<Value>(&body)
                .ok()
                .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("error").to_string());
            warn!(status = status.as_u16(), %message, "request failed");
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }

        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&body)?)
    }
}

fn query_string(params: &[(String, String)]) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

#[async_trait]
impl Backend for ApiService {
    async fn list(&self, resource: Resource, params: &[(String, String)]) -> Result<Page, ApiError> {
        let mut url = self.collection_url(resource);
        if !params.is_empty() {
            url.push('?');
            url.push_str(&query_string(params));
        }
        debug!(%url, "list");

        let body = self.send(self.client.get(url)).await?;
        Page::from_body(body)
    }

    async fn get(&self, resource: Resource, id: &str) -> Result<Value, ApiError> {
        let body = self.send(self.client.get(self.item_url(resource, id))).await?;
        model::document(body)
            .ok_or_else(|| ApiError::Decode(format!("{} {id} is not an object", resource.singular())))
    }

    async fn create(&self, resource: Resource, payload: &Payload) -> Result<Option<Value>, ApiError> {
        let body = self
            .send(self.client.post(self.collection_url(resource)).json(payload))
            .await?;
        Ok(model::document(body))
    }

    async fn update(
        &self,
        resource: Resource,
        id: &str,
        payload: &Payload,
    ) -> Result<Option<Value>, ApiError> {
        let body = self
            .send(self.client.patch(self.item_url(resource, id)).json(payload))
            .await?;
        Ok(model::document(body))
    }

    async fn delete(&self, resource: Resource, id: &str) -> Result<(), ApiError> {
        self.send(self.client.delete(self.item_url(resource, id)))
            .await
            .map(|_| ())
    }

    async fn upload(&self, kind: UploadKind, file: &LocalFile) -> Result<UploadResponse, ApiError> {
        let mut part = Part::bytes(file.bytes.clone()).file_name(file.name.clone());
        if let Some(mime) = &file.mime {
            part = part.mime_str(mime)?;
        }
        let form = Form::new().part(kind.form_field(), part);

        let body = self
            .send(self.client.post(self.upload_url(kind)).multipart(form))
            .await?;
        Ok(serde_json::from_value(body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> ApiService {
        let config = AdminConfig {
            api_url: "https://api.test/api/".into(),
            image_api_url: "https://img.test/".into(),
            upload_song_api_url: "https://media.test/".into(),
            ..AdminConfig::default()
        };
        ApiService::new(&config).unwrap()
    }

    #[test]
    fn urls_are_resource_oriented() {
        let api = service();
        assert_eq!(api.collection_url(Resource::Songs), "https://api.test/api/songs");
        assert_eq!(api.item_url(Resource::Users, "u 1"), "https://api.test/api/users/u%201");
        assert_eq!(api.upload_url(UploadKind::Image), "https://img.test/images");
        assert_eq!(api.upload_url(UploadKind::Audio), "https://media.test/upload-song");
    }

    #[test]
    fn query_string_is_encoded() {
        let params = vec![("q".to_string(), "a&b".to_string()), ("page".to_string(), "1".to_string())];
        assert_eq!(query_string(&params), "q=a%26b&page=1");
    }
}
