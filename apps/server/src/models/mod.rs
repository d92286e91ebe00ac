//! Domain models for the card catalog search core

pub mod card;
pub mod search;

pub use card::{Card, CardInput, CardRelations};
pub use search::{SearchContext, SearchEvent, SearchResultPage};
