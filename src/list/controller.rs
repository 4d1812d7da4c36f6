use serde_json::Value;
use tracing::debug;

use super::cache::{Lookup, QueryCache, QueryKey};
use crate::{
    entity::Resource,
    http::{ApiError, Page},
    query::{self, FilterChange, ListQuery, Pagination},
};

/// Tags an outstanding list read so late responses can be recognised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub resource: Resource,
    pub generation: u64,
    /// Cache invalidation epoch when the read was issued.
    pub epoch: u64,
    pub key: QueryKey,
}

/// A list read the caller should perform against the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchRequest {
    pub ticket: FetchTicket,
    pub params: Vec<(String, String)>,
}

/// State of one resource list page. Every navigation bumps the generation;
/// only the response for the current generation is rendered.
#[derive(Debug)]
pub struct ListController {
    resource: Resource,
    location: String,
    query: ListQuery,
    generation: u64,
    rows: Vec<Value>,
    total: Option<u64>,
    is_loading: bool,
    error: Option<String>,
}

impl ListController {
    pub fn new(resource: Resource) -> Self {
        Self {
            resource,
            location: String::new(),
            query: ListQuery::default(),
            generation: 0,
            rows: Vec::new(),
            total: None,
            is_loading: false,
            error: None,
        }
    }

    /// Moves the list to `location`. Returns the read to perform, or `None`
    /// when a fresh cached page already answers it.
    pub fn navigate(&mut self, location: &str, cache: &QueryCache) -> Option<FetchRequest> {
        self.location = location.trim_start_matches('?').to_string();
        self.query = query::decode(self.resource.filter_schema(), &self.location);
        self.generation += 1;
        self.error = None;

        let ticket = FetchTicket {
            resource: self.resource,
            generation: self.generation,
            epoch: cache.epoch(self.resource),
            key: QueryKey::new(self.resource, &self.query),
        };

        match cache.lookup(&ticket.key) {
            Lookup::Fresh(page) => {
                self.show(page);
                self.is_loading = false;
                return None;
            }
            Lookup::Stale(page) => self.show(page),
            Lookup::Miss => {
                self.rows.clear();
                self.total = None;
            }
        }

        self.is_loading = true;
        debug!(resource = %self.resource, generation = self.generation, location = %self.location, "list fetch");
        Some(FetchRequest {
            ticket,
            params: query::to_request_params(&self.query),
        })
    }

    /// Encodes the edit into a new location and navigates there.
    pub fn apply_filter(&mut self, change: &FilterChange, cache: &QueryCache) -> Option<FetchRequest> {
        let next = query::apply(&self.query, change);
        let location = query::encode(&next);
        self.navigate(&location, cache)
    }

    pub fn change_page(&mut self, page: u32, cache: &QueryCache) -> Option<FetchRequest> {
        let change = FilterChange::page(page, self.query.limit);
        self.apply_filter(&change, cache)
    }

    pub fn reset_filter(&mut self, cache: &QueryCache) -> Option<FetchRequest> {
        self.navigate(&query::reset(), cache)
    }

    /// Re-reads the current location, consulting the cache as usual.
    pub fn refresh(&mut self, cache: &QueryCache) -> Option<FetchRequest> {
        let location = self.location.clone();
        self.navigate(&location, cache)
    }

    /// Records a finished read. Returns `false` when the response belongs
    /// to an older navigation; such pages are neither rendered nor cached.
    pub fn on_fetched(
        &mut self,
        ticket: &FetchTicket,
        result: Result<Page, ApiError>,
        cache: &QueryCache,
    ) -> bool {
        if ticket.resource != self.resource || ticket.generation != self.generation {
            debug!(
                resource = %ticket.resource,
                generation = ticket.generation,
                current = self.generation,
                "discarding stale list response"
            );
            return false;
        }

        self.is_loading = false;
        match result {
            Ok(page) => {
                cache.insert(ticket.key.clone(), page.clone(), ticket.epoch);
                self.show(page);
            }
            Err(err) => self.error = Some(err.to_string()),
        }
        true
    }

    fn show(&mut self, page: Page) {
        self.total = Some(page.total);
        self.rows = page.rows;
        self.error = None;
    }

    pub fn resource(&self) -> Resource {
        self.resource
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn query(&self) -> &ListQuery {
        &self.query
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn rows(&self) -> &[Value] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&Value> {
        self.rows.get(index)
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn pagination(&self) -> Pagination {
        Pagination {
            page: self.query.page,
            limit: self.query.limit,
            total: self.total,
        }
    }
}
