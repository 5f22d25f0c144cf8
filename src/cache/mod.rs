//! Local result cache
//!
//! - [`key`] - Deterministic keys derived from a request
//! - [`store`] - Per-resource JSON files with optional expiry

pub mod key;
pub mod store;

pub use key::CacheKey;
pub use store::{CacheEntry, CacheStats, ResourceCache};
