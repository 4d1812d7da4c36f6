use serde_json::Value;
use tracing::{info, warn};

use super::{
    tracker::{SubmitMode, Submission},
    upload::{LocalFile, UploadKind, UploadResponse},
};
use crate::{
    entity::Resource,
    http::{ApiError, Backend},
};

/// Sends a submission as a create (POST) or a partial update (PATCH) and
/// returns the stored document when the backend echoes one.
pub async fn send_submission(
    backend: &dyn Backend,
    resource: Resource,
    submission: &Submission,
) -> Result<Option<Value>, ApiError> {
    let result = match &submission.mode {
        SubmitMode::Create => backend.create(resource, &submission.payload).await,
        SubmitMode::Update(id) => backend.update(resource, id, &submission.payload).await,
    };

    match &result {
        Ok(_) => info!(%resource, fields = submission.payload.len(), "record saved"),
        Err(err) => warn!(%resource, error = %err, "save failed"),
    }
    result
}

/// Checks a picked file against the field's rules and uploads it. Errors
/// come back as user-facing text.
pub async fn upload_file(
    backend: &dyn Backend,
    kind: UploadKind,
    file: &LocalFile,
) -> Result<UploadResponse, String> {
    kind.check(file).map_err(|rejection| rejection.to_string())?;
    backend
        .upload(kind, file)
        .await
        .map_err(|err| format!("Upload of {} failed: {err}", file.name))
}
