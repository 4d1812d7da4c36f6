use std::{
    collections::HashMap,
    sync::{Arc, PoisonError, RwLock},
    time::{Duration, Instant},
};

use tracing::debug;

use super::reference::{RefOption, ReferenceKey};
use crate::{
    entity::Resource,
    http::Page,
    query::{self, ListQuery},
};

/// Identity of a list read: the resource plus its canonical location.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    pub resource: Resource,
    pub location: String,
}

impl QueryKey {
    pub fn new(resource: Resource, query: &ListQuery) -> Self {
        Self {
            resource,
            location: query::encode(query),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    /// Recent and not invalidated: no request needed.
    Fresh(Page),
    /// Shown while a refetch runs.
    Stale(Page),
    Miss,
}

struct Entry {
    page: Page,
    fetched_at: Instant,
    invalidated: bool,
}

#[derive(Default)]
struct Store {
    lists: HashMap<QueryKey, Entry>,
    /// Bumped by every `invalidate`; reads started before the bump are
    /// not cached.
    epochs: HashMap<Resource, u64>,
    references: HashMap<ReferenceKey, Vec<RefOption>>,
}

/// Results of list reads, shared by every view of the console.
#[derive(Clone)]
pub struct QueryCache {
    store: Arc<RwLock<Store>>,
    stale_after: Duration,
}

impl QueryCache {
    pub fn new(stale_after: Duration) -> Self {
        Self {
            store: Arc::new(RwLock::new(Store::default())),
            stale_after,
        }
    }

    pub fn lookup(&self, key: &QueryKey) -> Lookup {
        let store = self.store.read().unwrap_or_else(PoisonError::into_inner);
        match store.lists.get(key) {
            Some(entry) if !entry.invalidated && entry.fetched_at.elapsed() < self.stale_after => {
                Lookup::Fresh(entry.page.clone())
            }
            Some(entry) => Lookup::Stale(entry.page.clone()),
            None => Lookup::Miss,
        }
    }

    /// Invalidation epoch of `resource`. Stamp it on a read before the
    /// request goes out and hand it back to [`QueryCache::insert`].
    pub fn epoch(&self, resource: Resource) -> u64 {
        let store = self.store.read().unwrap_or_else(PoisonError::into_inner);
        store.epochs.get(&resource).copied().unwrap_or_default()
    }

    /// Stores a page read during `epoch`. Returns `false` and keeps the
    /// current entry when the resource was invalidated after the read began.
    pub fn insert(&self, key: QueryKey, page: Page, epoch: u64) -> bool {
        let mut store = self.store.write().unwrap_or_else(PoisonError::into_inner);
        let current = store.epochs.get(&key.resource).copied().unwrap_or_default();
        if epoch < current {
            debug!(resource = %key.resource, epoch, current, "dropping page read before invalidation");
            return false;
        }
        store.lists.insert(
            key,
            Entry {
                page,
                fetched_at: Instant::now(),
                invalidated: false,
            },
        );
        true
    }

    /// Marks every cached list of `resource` stale and forgets its
    /// reference options. Returns how many lists were affected.
    pub fn invalidate(&self, resource: Resource) -> usize {
        let mut store = self.store.write().unwrap_or_else(PoisonError::into_inner);
        *store.epochs.entry(resource).or_default() += 1;
        let mut count = 0;
        for (key, entry) in store.lists.iter_mut() {
            if key.resource == resource {
                entry.invalidated = true;
                count += 1;
            }
        }
        store.references.retain(|key, _| key.resource() != resource);
        debug!(%resource, count, "invalidated cached lists");
        count
    }

    pub fn is_invalidated(&self, key: &QueryKey) -> bool {
        let store = self.store.read().unwrap_or_else(PoisonError::into_inner);
        store.lists.get(key).is_some_and(|e| e.invalidated)
    }

    pub fn set_reference(&self, key: ReferenceKey, options: Vec<RefOption>) {
        let mut store = self.store.write().unwrap_or_else(PoisonError::into_inner);
        store.references.insert(key, options);
    }

    pub fn reference(&self, key: ReferenceKey) -> Option<Vec<RefOption>> {
        let store = self.store.read().unwrap_or_else(PoisonError::into_inner);
        store.references.get(&key).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn key(resource: Resource, location: &str) -> QueryKey {
        let query = query::decode(resource.filter_schema(), location);
        QueryKey::new(resource, &query)
    }

    fn page(total: u64) -> Page {
        Page { rows: vec![], total }
    }

    #[test]
    fn equivalent_locations_share_a_key() {
        assert_eq!(key(Resource::Songs, "?q=a&page=1&limit=10"), key(Resource::Songs, "q=a"));
        assert_ne!(key(Resource::Songs, "q=a"), key(Resource::Albums, "q=a"));
    }

    #[test]
    fn fresh_then_stale_after_invalidate() {
        let cache = QueryCache::new(Duration::from_secs(60));
        let songs = key(Resource::Songs, "");
        let albums = key(Resource::Albums, "");
        assert_matches!(cache.lookup(&songs), Lookup::Miss);

        cache.insert(songs.clone(), page(3), 0);
        cache.insert(albums.clone(), page(1), 0);
        assert_matches!(cache.lookup(&songs), Lookup::Fresh(p) if p.total == 3);

        assert_eq!(cache.invalidate(Resource::Songs), 1);
        assert_matches!(cache.lookup(&songs), Lookup::Stale(_));
        assert_matches!(cache.lookup(&albums), Lookup::Fresh(_));
        assert!(cache.is_invalidated(&songs));

        assert_eq!(cache.epoch(Resource::Songs), 1);
        assert!(cache.insert(songs.clone(), page(2), 1));
        assert_matches!(cache.lookup(&songs), Lookup::Fresh(p) if p.total == 2);
    }

    #[test]
    fn reads_started_before_invalidate_are_not_cached() {
        let cache = QueryCache::new(Duration::from_secs(60));
        let songs = key(Resource::Songs, "q=a");
        let before = cache.epoch(Resource::Songs);

        cache.invalidate(Resource::Songs);
        assert!(cache.insert(songs.clone(), page(1), cache.epoch(Resource::Songs)));

        assert!(!cache.insert(songs.clone(), page(2), before));
        assert_matches!(cache.lookup(&songs), Lookup::Fresh(p) if p.total == 1);
        assert_eq!(cache.epoch(Resource::Albums), 0);
    }

    #[test]
    fn entries_age_out() {
        let cache = QueryCache::new(Duration::ZERO);
        let songs = key(Resource::Songs, "");
        cache.insert(songs.clone(), page(3), 0);
        assert_matches!(cache.lookup(&songs), Lookup::Stale(_));
    }

    #[test]
    fn invalidate_drops_reference_options() {
        let cache = QueryCache::new(Duration::from_secs(60));
        let options = vec![RefOption { value: "c1".into(), label: "Pop".into() }];
        cache.set_reference(ReferenceKey::Categories, options.clone());
        cache.set_reference(ReferenceKey::Artists, options.clone());

        cache.invalidate(Resource::Categories);
        assert_eq!(cache.reference(ReferenceKey::Categories), None);
        assert_eq!(cache.reference(ReferenceKey::Artists), Some(options));
    }
}
