//! LRU Memcache - a bounded, thread-safe in-memory cache
//!
//! Evicts least recently used entries once the total size of cached values,
//! as measured by an injected weigher, exceeds the configured budget.

pub mod cache;
pub mod config;
pub mod error;
pub mod models;

pub use cache::{CacheBuilder, CacheStats, LruCache, UnitWeigher, Weigher};
pub use config::Config;
pub use error::{CacheError, Result};
pub use models::{bitmap_cache, Bitmap, BitmapLruCache, BitmapWeigher, PixelFormat};
