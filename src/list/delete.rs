use tracing::{info, warn};

use super::cache::QueryCache;
use crate::{
    entity::Resource,
    http::{ApiError, Backend},
    util::notify::Notifier,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteState {
    Idle,
    /// Waiting for the user to confirm removal of this id.
    Confirming(String),
    InFlight(String),
}

/// Confirm-then-delete for a single row of a list.
#[derive(Debug)]
pub struct DeleteFlow {
    resource: Resource,
    state: DeleteState,
}

impl DeleteFlow {
    pub fn new(resource: Resource) -> Self {
        Self {
            resource,
            state: DeleteState::Idle,
        }
    }

    pub fn resource(&self) -> Resource {
        self.resource
    }

    pub fn state(&self) -> &DeleteState {
        &self.state
    }

    /// Asks for confirmation. Ignored while another delete is running.
    pub fn request(&mut self, id: impl Into<String>) {
        if !matches!(self.state, DeleteState::InFlight(_)) {
            self.state = DeleteState::Confirming(id.into());
        }
    }

    pub fn cancel(&mut self) {
        if matches!(self.state, DeleteState::Confirming(_)) {
            self.state = DeleteState::Idle;
        }
    }

    /// Confirms the pending request and hands back the id to delete.
    pub fn confirm(&mut self) -> Option<String> {
        match std::mem::replace(&mut self.state, DeleteState::Idle) {
            DeleteState::Confirming(id) => {
                self.state = DeleteState::InFlight(id.clone());
                Some(id)
            }
            other => {
                self.state = other;
                None
            }
        }
    }

    pub fn finish(&mut self) {
        self.state = DeleteState::Idle;
    }

    pub fn is_confirming(&self) -> bool {
        matches!(self.state, DeleteState::Confirming(_))
    }

    pub fn is_in_flight(&self) -> bool {
        matches!(self.state, DeleteState::InFlight(_))
    }
}

/// Deletes one record. On success every cached list of the resource is
/// invalidated; on failure exactly one error notification is raised and
/// the cache is left alone.
pub async fn delete_record(
    backend: &dyn Backend,
    cache: &QueryCache,
    notifier: &Notifier,
    resource: Resource,
    id: &str,
) -> Result<(), ApiError> {
    match backend.delete(resource, id).await {
        Ok(()) => {
            let invalidated = cache.invalidate(resource);
            info!(%resource, id, invalidated, "record deleted");
            notifier.success(format!("{} deleted", capitalize(resource.singular())));
            Ok(())
        }
        Err(err) => {
            warn!(%resource, id, error = %err, "delete failed");
            notifier.error(err.to_string());
            Err(err)
        }
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confirm_moves_to_in_flight() {
        let mut flow = DeleteFlow::new(Resource::Songs);
        assert_eq!(flow.confirm(), None);

        flow.request("s1");
        assert!(flow.is_confirming());
        assert_eq!(flow.confirm(), Some("s1".to_string()));
        assert!(flow.is_in_flight());

        flow.request("s2");
        assert_eq!(flow.state(), &DeleteState::InFlight("s1".into()));

        flow.finish();
        assert_eq!(flow.state(), &DeleteState::Idle);
    }

    #[test]
    fn cancel_returns_to_idle() {
        let mut flow = DeleteFlow::new(Resource::Albums);
        flow.request("a1");
        flow.cancel();
        assert_eq!(flow.confirm(), None);
    }

    #[test]
    fn capitalizes_labels() {
        assert_eq!(capitalize("song"), "Song");
        assert_eq!(capitalize(""), "");
    }
}
