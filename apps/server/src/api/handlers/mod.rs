//! Request handlers for API endpoints
//!
//! Handlers extract request data, call a service and format the response.
//! Errors convert to HTTP responses through `crate::Error`.

pub mod admin;
pub mod cards;
pub mod metrics;
pub mod search;

pub use admin::*;
pub use cards::*;
pub use metrics::*;
pub use search::*;
