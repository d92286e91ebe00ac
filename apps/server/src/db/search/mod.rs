//! Card search: input normalization, cache keys and query planning

pub mod cache_key;
pub mod params;
pub mod query_builder;
pub mod string_normalization;

pub use cache_key::CacheKey;
pub use params::{
    split_query_items, NormalizedFilter, NumericRange, SearchLimits, SearchOptions, SortField,
    SortOrder,
};
pub use query_builder::{BindValue, CardColumn, Condition, OrderBy, Predicate, QueryPlan};
