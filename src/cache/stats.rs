//! Cache Statistics Module
//!
//! Tracks cache activity (hits, misses, puts, evictions) and a size snapshot.

use serde::Serialize;

// == Cache Stats ==
/// Point-in-time view of cache activity and occupancy.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Number of `get` calls that found a value
    pub hits: u64,
    /// Number of `get` calls that found nothing
    pub misses: u64,
    /// Number of successful `put` calls
    pub puts: u64,
    /// Number of entries removed by the LRU policy (not by `remove`/`clear`)
    pub evictions: u64,
    /// Current number of entries
    pub entry_count: usize,
    /// Current running size total
    pub current_size: i64,
    /// Configured size budget
    pub max_size: i64,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 if no lookups were made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub(crate) fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub(crate) fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub(crate) fn record_put(&mut self) {
        self.puts += 1;
    }

    pub(crate) fn record_evictions(&mut self, count: u64) {
        self.evictions += count;
    }
}
