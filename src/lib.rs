pub mod config;
pub mod entity;
pub mod event;
pub mod form;
pub mod http;
pub mod list;
pub mod query;
pub mod ui;
pub mod util;
