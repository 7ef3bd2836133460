// src/filter/mod.rs
//! Client-side job search: filter state, the matching engine and its memo

pub mod cache;
pub mod engine;
pub mod state;

pub use cache::FilterCache;
pub use engine::{filter, matches};
pub use state::{FilterField, FilterState};
