//! Bundle cache with source-hash invalidation and single-flight builds.

mod entry;
mod store;

pub use entry::CacheEntry;
pub use store::{CacheStats, CacheStore};
