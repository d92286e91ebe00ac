//! Card search over HTTP: caching, filters, paging and failure handling.

#[path = "../support/mod.rs"]
mod support;

mod caching;
mod failures;
mod filters;
