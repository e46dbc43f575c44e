//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the cache against a straightforward reference model.

use proptest::prelude::*;

use crate::cache::{FnWeigher, LruCache, UNIT_SIZE};

// == Test Configuration ==
const TEST_CAPACITY: i64 = 4;

type SizedCache = LruCache<u8, i64, FnWeigher<fn(&i64) -> i64>>;

fn sized_cache(capacity: i64) -> SizedCache {
    let weigh: fn(&i64) -> i64 = |v| *v;
    LruCache::with_weigher(capacity, "PropCache", FnWeigher(weigh)).unwrap()
}

// == Reference Model ==
/// Vec-backed LRU: index 0 is least recently used.
#[derive(Debug, Default)]
struct Model {
    entries: Vec<(u8, i64)>,
    evictions: u64,
}

impl Model {
    fn total(&self) -> i64 {
        self.entries.iter().map(|(_, v)| *v).sum()
    }

    fn get(&mut self, key: u8) -> Option<i64> {
        let pos = self.entries.iter().position(|(k, _)| *k == key)?;
        let entry = self.entries.remove(pos);
        self.entries.push(entry);
        Some(entry.1)
    }

    fn put(&mut self, key: u8, value: i64, max_size: i64, max_entries: usize) -> Option<i64> {
        let previous = self
            .entries
            .iter()
            .position(|(k, _)| *k == key)
            .map(|pos| self.entries.remove(pos).1);
        self.entries.push((key, value));
        while !self.entries.is_empty()
            && (self.total() > max_size || self.entries.len() > max_entries)
        {
            self.entries.remove(0);
            self.evictions += 1;
        }
        previous
    }

    fn remove(&mut self, key: u8) -> Option<i64> {
        let pos = self.entries.iter().position(|(k, _)| *k == key)?;
        Some(self.entries.remove(pos).1)
    }
}

// == Strategies ==
#[derive(Debug, Clone)]
enum CacheOp {
    Put { key: u8, value: i64 },
    Get { key: u8 },
    Remove { key: u8 },
    Clear,
}

/// Keys from a small range so operations collide often.
fn key_strategy() -> impl Strategy<Value = u8> {
    0u8..8
}

/// Sizes up to 2.5 MiB so both budgets come into play.
fn size_strategy() -> impl Strategy<Value = i64> {
    0i64..(5 * UNIT_SIZE / 2)
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        6 => (key_strategy(), size_strategy())
            .prop_map(|(key, value)| CacheOp::Put { key, value }),
        3 => key_strategy().prop_map(|key| CacheOp::Get { key }),
        2 => key_strategy().prop_map(|key| CacheOp::Remove { key }),
        1 => Just(CacheOp::Clear),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    // **Property: Model Equivalence**
    // For any sequence of operations, results, recency order, running size and
    // eviction count match a naive LRU that evicts from the front until both
    // budgets hold.
    #[test]
    fn prop_matches_reference_model(ops in prop::collection::vec(cache_op_strategy(), 1..80)) {
        let cache = sized_cache(TEST_CAPACITY);
        let mut model = Model::default();

        for op in ops {
            match op {
                CacheOp::Put { key, value } => {
                    let expected =
                        model.put(key, value, cache.max_size(), cache.max_entries());
                    prop_assert_eq!(cache.put(key, value).unwrap(), expected);
                }
                CacheOp::Get { key } => {
                    prop_assert_eq!(cache.get(&key).unwrap(), model.get(key));
                }
                CacheOp::Remove { key } => {
                    prop_assert_eq!(cache.remove(&key).unwrap(), model.remove(key));
                }
                CacheOp::Clear => {
                    cache.clear().unwrap();
                    model.entries.clear();
                }
            }

            prop_assert_eq!(cache.snapshot(), model.entries.clone());
            prop_assert_eq!(cache.current_size(), model.total());
        }

        prop_assert_eq!(cache.stats().evictions, model.evictions);
    }

    // **Property: Budget Enforcement**
    // After every put, the running size equals the sum of stored sizes and
    // stays within max_size, and the entry count stays within max_entries.
    #[test]
    fn prop_budget_holds_after_put(
        entries in prop::collection::vec((key_strategy(), size_strategy()), 1..100)
    ) {
        let cache = sized_cache(TEST_CAPACITY);

        for (key, value) in entries {
            cache.put(key, value).unwrap();
            let snapshot = cache.snapshot();
            let sum: i64 = snapshot.iter().map(|(_, v)| *v).sum();

            prop_assert_eq!(cache.current_size(), sum);
            prop_assert!(cache.current_size() <= cache.max_size());
            prop_assert!(snapshot.len() <= cache.max_entries());
        }
    }

    // **Property: Round-trip**
    // A put followed by a get returns the value unless the value alone
    // exceeds max_size, in which case it was evicted immediately.
    #[test]
    fn prop_roundtrip(key in key_strategy(), value in 0i64..(3 * UNIT_SIZE)) {
        let cache = sized_cache(2);
        cache.put(key, value).unwrap();

        let expected = (value <= cache.max_size()).then_some(value);
        prop_assert_eq!(cache.get(&key).unwrap(), expected);
    }

    // **Property: Remove Of Missing Key**
    // Removing an absent key changes neither size nor order.
    #[test]
    fn prop_remove_missing_is_noop(
        entries in prop::collection::vec((0u8..4, size_strategy()), 0..10),
        missing in 4u8..8
    ) {
        let cache = sized_cache(TEST_CAPACITY);
        for (key, value) in entries {
            cache.put(key, value).unwrap();
        }
        let before = cache.snapshot();
        let size_before = cache.current_size();

        prop_assert_eq!(cache.remove(&missing).unwrap(), None);
        prop_assert_eq!(cache.snapshot(), before);
        prop_assert_eq!(cache.current_size(), size_before);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // **Property: Fresh Cache Budget**
    // For any positive capacity, a new cache reports capacity * UNIT_SIZE as
    // its budget and holds nothing.
    #[test]
    fn prop_fresh_cache_budget(capacity in 1i64..=(i64::MAX / UNIT_SIZE)) {
        let cache: LruCache<u8, u8> = LruCache::new(capacity).unwrap();

        prop_assert_eq!(cache.max_size(), capacity * UNIT_SIZE);
        prop_assert_eq!(cache.current_size(), 0);
        prop_assert!(cache.snapshot().is_empty());
    }
}
