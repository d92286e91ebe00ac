//! Database layer - stores and search planning

pub mod analytics;
pub mod cards;
pub mod memory;
pub mod search;
pub mod traits;

pub use analytics::PostgresAnalyticsStore;
pub use cards::PostgresCardStore;
pub use memory::{InMemoryAnalyticsStore, InMemoryCardStore};
pub use traits::{AnalyticsSink, AnalyticsStore, AnalyticsSummary, CardStore, FilterUsage, SearchRows};
