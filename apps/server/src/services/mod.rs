//! Business logic services

pub mod analytics;
pub mod cards;
pub mod search;

pub use analytics::{AnalyticsRecorder, AnalyticsWorker};
pub use cards::CardService;
pub use search::{SearchOutcome, SearchService};
