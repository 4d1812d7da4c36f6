use std::sync::Arc;

use flume::Sender;

use crate::{
    config::AdminConfig, event::events::Event, http::Backend, list::QueryCache,
    util::notify::Notifier,
};

/// Shared services handed to every view.
pub struct AppContext {
    pub api: Arc<dyn Backend>,
    pub event_tx: Sender<Event>,
    pub config: AdminConfig,
    pub cache: QueryCache,
    pub notifier: Notifier,
}

impl AppContext {
    pub fn new(api: Arc<dyn Backend>, event_tx: Sender<Event>, config: AdminConfig) -> Self {
        Self {
            cache: QueryCache::new(config.cache_stale_after),
            notifier: Notifier::new(config.notification_ttl),
            api,
            event_tx,
            config,
        }
    }
}
