//! Cache Module
//!
//! Provides a size-bounded, thread-safe LRU cache.

mod builder;
mod ordered;
mod stats;
mod store;
mod weigher;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use builder::CacheBuilder;
pub use ordered::{Iter, OrderedStore};
pub use stats::CacheStats;
pub use store::LruCache;
pub use weigher::{FnWeigher, UnitWeigher, Weigher};

// == Public Constants ==
/// Size units per unit of capacity (1 MiB when the weigher counts bytes)
pub const UNIT_SIZE: i64 = 1024 * 1024;

/// Capacity used by `LruCache::default()`
pub const DEFAULT_CAPACITY: i64 = 10;

/// Label used in fault messages when none is configured
pub const DEFAULT_LABEL: &str = "LruCache";
