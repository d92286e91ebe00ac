//! CardVault - card catalog search service
//!
//! The search core of a card-game database and deck builder:
//! - Canonical filter normalization and cache key derivation
//! - Process-wide LRU/TTL result cache with write-triggered invalidation
//! - Injection-safe query planning against PostgreSQL (or an in-memory store)
//! - Fire-and-forget search analytics drained by a background worker

#![allow(
    clippy::too_many_arguments,      // Constructors wire many collaborators together
    clippy::type_complexity,         // Complex types are acceptable when they represent domain concepts
)]

pub mod api;
pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod request_context;
pub mod services;
pub mod state;

pub use config::Config;
pub use error::{Error, Result};
pub use state::AppState;
