//! Cache Builder Module
//!
//! Collects the construction-time configuration of an [`LruCache`]: capacity,
//! the label used in fault messages, and the weigher.

use std::hash::Hash;

use crate::cache::{FnWeigher, LruCache, UnitWeigher, Weigher, DEFAULT_CAPACITY, DEFAULT_LABEL};
use crate::config::Config;
use crate::error::Result;

// == Cache Builder ==
/// Builder for configuring and constructing an [`LruCache`].
///
/// # Example
/// ```
/// use lru_memcache::CacheBuilder;
///
/// // Capacity of 4 MiB, sized by byte length.
/// let cache: lru_memcache::LruCache<String, Vec<u8>, _> = CacheBuilder::new(4)
///     .label("BlobCache")
///     .weigher(|v: &Vec<u8>| v.len() as i64)
///     .build()
///     .unwrap();
/// assert_eq!(cache.max_size(), 4 * 1024 * 1024);
/// ```
#[derive(Debug, Clone)]
pub struct CacheBuilder<W = UnitWeigher> {
    capacity: i64,
    label: String,
    weigher: W,
}

impl CacheBuilder<UnitWeigher> {
    /// Starts a builder with the unit weigher and the default label.
    ///
    /// Capacity is validated by [`build`](CacheBuilder::build).
    pub fn new(capacity: i64) -> Self {
        Self {
            capacity,
            label: DEFAULT_LABEL.to_string(),
            weigher: UnitWeigher,
        }
    }

    /// Starts a builder from loaded configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.capacity).label(config.label.clone())
    }
}

impl Default for CacheBuilder<UnitWeigher> {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl<W> CacheBuilder<W> {
    /// Sets the label used in fault messages and logs.
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Sets a closure as the size function.
    pub fn weigher<F>(self, f: F) -> CacheBuilder<FnWeigher<F>> {
        self.weigher_impl(FnWeigher(f))
    }

    /// Sets any [`Weigher`] implementation as the size function.
    pub fn weigher_impl<W2>(self, weigher: W2) -> CacheBuilder<W2> {
        CacheBuilder {
            capacity: self.capacity,
            label: self.label,
            weigher,
        }
    }

    /// Builds the cache.
    ///
    /// # Errors
    /// `InvalidCapacity` if the configured capacity is not positive.
    pub fn build<K, V>(self) -> Result<LruCache<K, V, W>>
    where
        K: Hash + Eq + Clone,
        V: Clone,
        W: Weigher<V>,
    {
        LruCache::with_weigher(self.capacity, self.label, self.weigher)
    }
}
