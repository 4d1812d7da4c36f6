use serde_json::Value;
use uuid::Uuid;

use crate::{
    entity::Resource,
    form::UploadResponse,
    http::{ApiError, Page},
    list::FetchTicket,
};

#[derive(Debug, Clone)]
#[allow(clippy::large_enum_variant)]
pub enum Event {
    // Events
    Initialize,
    ListFetched {
        ticket: FetchTicket,
        result: Result<Page, ApiError>,
    },
    RecordFetched {
        resource: Resource,
        id: String,
        result: Result<Value, ApiError>,
    },
    ReferencesLoaded(Resource),
    RecordSaved {
        resource: Resource,
        saved: Option<Value>,
    },
    SaveFailed {
        resource: Resource,
        error: ApiError,
    },
    RecordDeleted {
        resource: Resource,
        id: String,
    },
    DeleteFailed {
        resource: Resource,
        id: String,
    },
    UploadFinished {
        field: String,
        uid: Uuid,
        result: Result<UploadResponse, String>,
    },

    // Commands
    OpenList(Resource),
    OpenRecord { resource: Resource, id: String },
    CreateRecord(Resource),
    Back,
}
