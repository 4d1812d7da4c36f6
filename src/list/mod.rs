//! Paginated resource lists: fetch coordination, the shared result cache,
//! row deletion and the reference lists behind selection fields.

pub mod cache;
pub mod controller;
pub mod delete;
pub mod reference;

use tracing::warn;

use crate::http::{ApiError, Backend, Page};

pub use cache::{Lookup, QueryCache, QueryKey};
pub use controller::{FetchRequest, FetchTicket, ListController};
pub use delete::{DeleteFlow, DeleteState, delete_record};
pub use reference::{RefOption, ReferenceKey, label_for, search_options};

pub async fn fetch_page(backend: &dyn Backend, request: &FetchRequest) -> Result<Page, ApiError> {
    backend.list(request.ticket.resource, &request.params).await
}

/// Loads the reference lists a form needs, reusing cached ones. A list that
/// fails to load is skipped and reported in the returned errors.
pub async fn load_references(
    backend: &dyn Backend,
    cache: &QueryCache,
    keys: &[ReferenceKey],
) -> Vec<(ReferenceKey, ApiError)> {
    let mut errors = Vec::new();
    for &key in keys {
        if cache.reference(key).is_some() {
            continue;
        }
        match backend.list(key.resource(), &key.request_params()).await {
            Ok(page) => cache.set_reference(key, key.options(&page.rows)),
            Err(err) => {
                warn!(key = key.cache_key(), error = %err, "reference list failed");
                errors.push((key, err));
            }
        }
    }
    errors
}
