//! Weigher Module
//!
//! The size function injected into a cache. The cache keeps
//! `Σ size_of(value) <= max_size`, so the weigher decides what a "unit" means:
//! entries, bytes, or anything else that is cheap and deterministic to compute.
//!
//! Sizes are signed so that a broken weigher can be detected. A negative
//! result is treated by the cache as a fatal consistency fault.

// == Weigher Trait ==
/// Computes the size of a cached value.
///
/// Must return the same result for a given value for as long as it is stored;
/// the cache only asks at insertion and removal time.
pub trait Weigher<V> {
    fn size_of(&self, value: &V) -> i64;
}

// == Unit Weigher ==
/// Every value costs exactly 1, so the size budget is an entry-count budget.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnitWeigher;

impl<V> Weigher<V> for UnitWeigher {
    #[inline]
    fn size_of(&self, _value: &V) -> i64 {
        1
    }
}

// == Closure Weigher ==
/// A weigher backed by a closure.
///
/// Created via [`CacheBuilder::weigher`](crate::cache::CacheBuilder::weigher).
#[derive(Clone, Copy)]
pub struct FnWeigher<F>(pub F);

impl<V, F> Weigher<V> for FnWeigher<F>
where
    F: Fn(&V) -> i64,
{
    #[inline]
    fn size_of(&self, value: &V) -> i64 {
        (self.0)(value)
    }
}
