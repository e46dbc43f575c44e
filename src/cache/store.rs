//! Bounded Cache Module
//!
//! Size-bounded LRU cache combining the ordered store with a running size
//! total, an injected weigher and a single mutex guarding all state.

use std::borrow::Borrow;
use std::fmt;
use std::hash::Hash;

use parking_lot::{Mutex, MutexGuard};
use tracing::{debug, error};

use crate::cache::{
    CacheStats, OrderedStore, UnitWeigher, Weigher, DEFAULT_CAPACITY, DEFAULT_LABEL, UNIT_SIZE,
};
use crate::error::{CacheError, Result};

/// Trim threshold below any reachable size; trimming to it empties the cache.
const EVICT_ALL: i64 = -1;

// == Guarded State ==
struct Inner<K, V> {
    store: OrderedStore<K, V>,
    /// Sum of `size_of` over every stored value. Wider than a single size so
    /// that adding a value before trimming cannot overflow.
    current_size: i128,
    stats: CacheStats,
    /// Set once a consistency fault has been raised
    poisoned: bool,
}

// == LRU Cache ==
/// A thread-safe cache that evicts least recently used entries once the
/// total size of its values exceeds `max_size`.
///
/// Capacity is given in units of [`UNIT_SIZE`] (one MiB when the weigher
/// returns bytes). The cache also never holds more than `capacity` entries.
///
/// Every operation takes the same lock for its whole duration, so operations
/// are atomic with respect to each other. Share the cache with `Arc`.
///
/// # Example
/// ```
/// use lru_memcache::LruCache;
///
/// let cache: LruCache<String, String> = LruCache::new(3).unwrap();
/// cache.put("a".to_string(), "A".to_string()).unwrap();
/// assert_eq!(cache.get("a").unwrap(), Some("A".to_string()));
/// ```
pub struct LruCache<K, V, W = UnitWeigher> {
    label: String,
    max_size: i64,
    max_entries: usize,
    weigher: W,
    inner: Mutex<Inner<K, V>>,
}

impl<K, V> LruCache<K, V, UnitWeigher>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    // == Constructor ==
    /// Creates a cache where every value has size 1.
    ///
    /// # Errors
    /// `InvalidCapacity` if `capacity <= 0`.
    pub fn new(capacity: i64) -> Result<Self> {
        Self::with_weigher(capacity, DEFAULT_LABEL, UnitWeigher)
    }
}

impl<K, V> Default for LruCache<K, V, UnitWeigher>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    fn default() -> Self {
        Self::from_parts(
            DEFAULT_LABEL.to_string(),
            DEFAULT_CAPACITY * UNIT_SIZE,
            DEFAULT_CAPACITY as usize,
            UnitWeigher,
        )
    }
}

impl<K, V, W> LruCache<K, V, W>
where
    K: Hash + Eq + Clone,
    V: Clone,
    W: Weigher<V>,
{
    /// Creates a cache with a custom weigher.
    ///
    /// `label` identifies the cache in fault messages and logs.
    ///
    /// # Errors
    /// `InvalidCapacity` if `capacity <= 0` or `capacity * UNIT_SIZE`
    /// overflows.
    pub fn with_weigher(capacity: i64, label: impl Into<String>, weigher: W) -> Result<Self> {
        if capacity <= 0 {
            return Err(CacheError::InvalidCapacity(capacity));
        }
        let max_size = capacity
            .checked_mul(UNIT_SIZE)
            .ok_or(CacheError::InvalidCapacity(capacity))?;
        let max_entries =
            usize::try_from(capacity).map_err(|_| CacheError::InvalidCapacity(capacity))?;

        Ok(Self::from_parts(label.into(), max_size, max_entries, weigher))
    }

    fn from_parts(label: String, max_size: i64, max_entries: usize, weigher: W) -> Self {
        Self {
            label,
            max_size,
            max_entries,
            weigher,
            inner: Mutex::new(Inner {
                store: OrderedStore::new(),
                current_size: 0,
                stats: CacheStats::new(),
                poisoned: false,
            }),
        }
    }

    // == Get ==
    /// Returns a copy of the value for `key`, marking it most recently used.
    pub fn get<Q>(&self, key: &Q) -> Result<Option<V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let mut inner = self.lock()?;
        let value = inner.store.get(key).cloned();
        match value {
            Some(_) => inner.stats.record_hit(),
            None => inner.stats.record_miss(),
        }
        Ok(value)
    }

    // == Put ==
    /// Stores `value` under `key`, returning the value it replaced.
    ///
    /// The key becomes most recently used. Afterwards least recently used
    /// entries are evicted until the cache is back within budget; a value
    /// that alone exceeds `max_size` ends up evicting itself.
    pub fn put(&self, key: K, value: V) -> Result<Option<V>> {
        let mut inner = self.lock()?;
        let size = self.checked_size(&mut inner, &value)?;

        let previous = inner.store.put(key, value);
        let previous_size = match &previous {
            Some(old) => self.checked_size(&mut inner, old)?,
            None => 0,
        };

        inner.current_size += i128::from(size) - i128::from(previous_size);
        inner.stats.record_put();

        let evicted = self.trim_to_size(&mut inner, self.max_size, self.max_entries)?;
        inner.stats.record_evictions(evicted);
        Ok(previous)
    }

    // == Remove ==
    /// Removes `key`, returning its value. Never triggers eviction.
    pub fn remove<Q>(&self, key: &Q) -> Result<Option<V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let mut inner = self.lock()?;
        let Some(previous) = inner.store.remove(key) else {
            return Ok(None);
        };

        let size = self.checked_size(&mut inner, &previous)?;
        inner.current_size -= i128::from(size);
        self.check_invariants(&mut inner)?;
        Ok(Some(previous))
    }

    // == Clear ==
    /// Removes every entry.
    pub fn clear(&self) -> Result<()> {
        let mut inner = self.lock()?;
        let removed = self.trim_to_size(&mut inner, EVICT_ALL, 0)?;
        debug!(label = %self.label, removed, "cache cleared");
        Ok(())
    }

    // == Snapshot ==
    /// Copies every entry, least recently used first.
    ///
    /// The copy is independent of later cache mutations.
    pub fn snapshot(&self) -> Vec<(K, V)> {
        self.inner.lock().store.snapshot_in_order()
    }

    // == Current Size ==
    /// Returns the running size total of all stored values.
    pub fn current_size(&self) -> i64 {
        saturate(self.inner.lock().current_size)
    }

    // == Max Size ==
    /// Returns the size budget, `capacity * UNIT_SIZE`.
    ///
    /// Fixed at construction, so it is read without taking the lock.
    pub fn max_size(&self) -> i64 {
        self.max_size
    }

    // == Max Entries ==
    /// Maximum number of entries, equal to the construction capacity.
    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    // == Length ==
    /// Returns the number of cached entries.
    pub fn len(&self) -> usize {
        self.inner.lock().store.len()
    }

    // == Is Empty ==
    /// Returns true if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().store.is_empty()
    }

    // == Contains ==
    /// Returns true if `key` is cached, without touching its recency.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.lock().store.contains_key(key)
    }

    // == Label ==
    /// Returns the label used in fault messages and logs.
    pub fn label(&self) -> &str {
        &self.label
    }

    // == Size Of ==
    /// Size the injected weigher assigns to `value`.
    pub fn size_of(&self, value: &V) -> i64 {
        self.weigher.size_of(value)
    }

    // == Stats ==
    /// Returns counters plus the current occupancy and budget.
    pub fn stats(&self) -> CacheStats {
        let inner = self.inner.lock();
        let mut stats = inner.stats.clone();
        stats.entry_count = inner.store.len();
        stats.current_size = saturate(inner.current_size);
        stats.max_size = self.max_size;
        stats
    }

    // == Eviction ==
    /// Evicts least recently used entries until both budgets hold or the
    /// store is empty. Returns the number of entries removed.
    fn trim_to_size(
        &self,
        inner: &mut Inner<K, V>,
        max_size: i64,
        max_entries: usize,
    ) -> Result<u64> {
        let mut evicted = 0;
        loop {
            self.check_invariants(inner)?;
            if inner.store.is_empty()
                || (inner.current_size <= i128::from(max_size)
                    && inner.store.len() <= max_entries)
            {
                break;
            }

            let Some((_, value)) = inner.store.pop_least_recently_used() else {
                break;
            };
            let size = self.checked_size(inner, &value)?;
            inner.current_size -= i128::from(size);
            evicted += 1;
            debug!(
                label = %self.label,
                size,
                current_size = saturate(inner.current_size),
                "evicted least recently used entry"
            );
        }
        Ok(evicted)
    }

    // == Consistency ==
    fn lock(&self) -> Result<MutexGuard<'_, Inner<K, V>>> {
        let inner = self.inner.lock();
        if inner.poisoned {
            return Err(CacheError::Poisoned {
                label: self.label.clone(),
            });
        }
        Ok(inner)
    }

    fn checked_size(&self, inner: &mut Inner<K, V>, value: &V) -> Result<i64> {
        let size = self.weigher.size_of(value);
        if size < 0 {
            return Err(self.fault(
                inner,
                CacheError::NegativeSize {
                    label: self.label.clone(),
                    size,
                },
            ));
        }
        Ok(size)
    }

    fn check_invariants(&self, inner: &mut Inner<K, V>) -> Result<()> {
        if inner.current_size < 0 || (inner.store.is_empty() && inner.current_size != 0) {
            return Err(self.inconsistent(inner));
        }
        Ok(())
    }

    fn inconsistent(&self, inner: &mut Inner<K, V>) -> CacheError {
        let err = CacheError::Inconsistent {
            label: self.label.clone(),
            current_size: saturate(inner.current_size),
            entries: inner.store.len(),
        };
        self.fault(inner, err)
    }

    /// Poisons the instance and reports the fault.
    fn fault(&self, inner: &mut Inner<K, V>, err: CacheError) -> CacheError {
        inner.poisoned = true;
        error!(label = %self.label, error = %err, "cache consistency fault");
        err
    }
}

/// Narrows the running total for reporting. Only a faulted cache can hold a
/// total outside the `i64` range.
fn saturate(total: i128) -> i64 {
    i64::try_from(total).unwrap_or(if total < 0 { i64::MIN } else { i64::MAX })
}

impl<K, V, W> fmt::Debug for LruCache<K, V, W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruCache")
            .field("label", &self.label)
            .field("max_size", &self.max_size)
            .field("max_entries", &self.max_entries)
            .finish_non_exhaustive()
    }
}
