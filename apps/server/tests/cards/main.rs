//! Card writes and their effect on cached searches.

#[path = "../support/mod.rs"]
mod support;
