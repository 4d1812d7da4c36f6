//! Two-way mapping between a list page location and typed list state.
//!
//! The location is the only place list state lives: a filter edit is
//! encoded into a new location, and the list view decodes and fetches from
//! whatever location it is navigated to.

pub mod codec;
pub mod value;

pub use codec::{
    DEFAULT_LIMIT, DEFAULT_PAGE, FilterChange, FilterState, ListQuery, Pagination, apply, decode,
    encode, reset, to_request_params,
};
pub use value::{FilterKind, FilterSchema, FilterValue};
