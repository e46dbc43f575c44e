//! Error types for the cache
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache.
///
/// `InvalidCapacity` is a caller mistake and leaves nothing behind. Every
/// other variant is an internal-consistency fault: the cache instance that
/// raised it is poisoned and must not be used further.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Capacity was zero, negative, or too large to express in size units
    #[error("Invalid capacity: {0} (must be > 0)")]
    InvalidCapacity(i64),

    /// The size function returned a negative size
    #[error("{label}.sizeOf() returned a negative size: {size}")]
    NegativeSize { label: String, size: i64 },

    /// Running total disagrees with the stored entries
    #[error(
        "{label}.sizeOf() is reporting inconsistent results \
         (current_size={current_size}, entries={entries})"
    )]
    Inconsistent {
        label: String,
        current_size: i64,
        entries: usize,
    },

    /// A previous fault left this instance unusable
    #[error("{label} is unusable after an earlier consistency fault")]
    Poisoned { label: String },
}

impl CacheError {
    /// Returns true for faults that poison the cache instance.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, CacheError::InvalidCapacity(_))
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
