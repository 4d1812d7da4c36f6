use std::collections::BTreeMap;

use super::value::{FilterSchema, FilterValue};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 10;

const PAGE_KEY: &str = "page";
const LIMIT_KEY: &str = "limit";

pub type FilterState = BTreeMap<String, FilterValue>;

/// Typed view of a list page location: filters plus the requested window.
#[derive(Debug, Clone, PartialEq)]
pub struct ListQuery {
    pub filter: FilterState,
    pub page: u32,
    pub limit: u32,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            filter: FilterState::new(),
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

/// Page, size and the server-reported row count of a list view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: Option<u64>,
}

impl Pagination {
    pub fn page_count(&self) -> u64 {
        match self.total {
            Some(total) if total > 0 => total.div_ceil(u64::from(self.limit.max(1))),
            _ => 1,
        }
    }

    pub fn has_next(&self) -> bool {
        u64::from(self.page) < self.page_count()
    }

    pub fn has_previous(&self) -> bool {
        self.page > DEFAULT_PAGE
    }
}

/// A user edit to list state. A field mapped to `None` is cleared.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterChange {
    pub fields: BTreeMap<String, Option<FilterValue>>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl FilterChange {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, name: impl Into<String>, value: FilterValue) -> Self {
        self.fields.insert(name.into(), Some(value));
        self
    }

    pub fn clear(mut self, name: impl Into<String>) -> Self {
        self.fields.insert(name.into(), None);
        self
    }

    /// Pagination move from the table footer; keeps every filter.
    pub fn page(page: u32, limit: u32) -> Self {
        Self {
            fields: BTreeMap::new(),
            page: Some(page),
            limit: Some(limit),
        }
    }
}

/// Decodes a location query string. Never fails: anything malformed is unset.
pub fn decode(schema: &FilterSchema, query: &str) -> ListQuery {
    let mut result = ListQuery::default();
    let mut seen = std::collections::BTreeSet::new();

    for (key, raw) in pairs(query) {
        if !seen.insert(key.clone()) {
            continue;
        }

        match key.as_str() {
            PAGE_KEY => result.page = positive(&raw).unwrap_or(DEFAULT_PAGE),
            LIMIT_KEY => result.limit = positive(&raw).unwrap_or(DEFAULT_LIMIT),
            _ => {
                if let Some(value) = FilterValue::decode(schema.coercion_for(&key), &raw) {
                    result.filter.insert(key, value);
                }
            }
        }
    }

    result
}

/// Serialises list state. Keys come out sorted; `page` is always written,
/// `limit` only when it is not the default.
pub fn encode(query: &ListQuery) -> String {
    let mut pairs: Vec<(&str, String)> = query
        .filter
        .iter()
        .map(|(key, value)| (key.as_str(), value.encode()))
        .collect();

    pairs.push((PAGE_KEY, query.page.to_string()));
    if query.limit != DEFAULT_LIMIT {
        pairs.push((LIMIT_KEY, query.limit.to_string()));
    }
    pairs.sort_by(|a, b| a.0.cmp(b.0));

    pairs
        .into_iter()
        .map(|(key, value)| format!("{}={}", urlencoding::encode(key), urlencoding::encode(&value)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Merges a change over the current state. Any change that does not move the
/// page itself sends the list back to the first page.
pub fn apply(current: &ListQuery, change: &FilterChange) -> ListQuery {
    let mut next = current.clone();

    for (key, value) in &change.fields {
        match value {
            Some(value) => {
                next.filter.insert(key.clone(), value.clone());
            }
            None => {
                next.filter.remove(key);
            }
        }
    }

    next.page = change.page.filter(|p| *p > 0).unwrap_or(DEFAULT_PAGE);
    if let Some(limit) = change.limit.filter(|l| *l > 0) {
        next.limit = limit;
    }

    next
}

/// Location of a list page with every filter removed.
pub fn reset() -> String {
    String::new()
}

/// Parameters for `GET /{resource}`. Dates go out as full instants.
pub fn to_request_params(query: &ListQuery) -> Vec<(String, String)> {
    let mut params: Vec<(String, String)> = query
        .filter
        .iter()
        .map(|(key, value)| (key.clone(), value.to_request_value()))
        .collect();

    params.push((PAGE_KEY.to_string(), query.page.to_string()));
    params.push((LIMIT_KEY.to_string(), query.limit.to_string()));
    params
}

fn positive(raw: &str) -> Option<u32> {
    raw.trim().parse::<u32>().ok().filter(|n| *n > 0)
}

fn pairs(query: &str) -> impl Iterator<Item = (String, String)> + '_ {
    query
        .trim_start_matches('?')
        .split('&')
        .filter(|segment| !segment.is_empty())
        .filter_map(|segment| {
            let (key, value) = segment.split_once('=').unwrap_or((segment, ""));
            let key = decode_component(key)?;
            let value = decode_component(value)?;
            (!key.is_empty()).then_some((key, value))
        })
}

fn decode_component(raw: &str) -> Option<String> {
    urlencoding::decode(&raw.replace('+', " "))
        .ok()
        .map(|s| s.into_owned())
}
