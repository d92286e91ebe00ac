//! Route tables, one module per API area

pub mod admin;
pub mod cards;
pub mod metrics;
