//! Configuration Module
//!
//! Handles loading cache configuration from environment variables.

use std::env;

use crate::cache::{DEFAULT_CAPACITY, DEFAULT_LABEL};

/// Default number of distinct keys written by the demo binary.
const DEFAULT_DEMO_KEYS: usize = 32;

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Capacity in size units (MiB when values are sized in bytes)
    pub capacity: i64,
    /// Label reported in fault messages
    pub label: String,
    /// Number of distinct keys the demo workload writes
    pub demo_keys: usize,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_CAPACITY` - Capacity in size units (default: 10)
    /// - `CACHE_LABEL` - Label used in fault messages (default: "LruCache")
    /// - `DEMO_KEYS` - Keys written by the demo binary (default: 32)
    ///
    /// Unparseable values fall back to the default. A non-positive capacity
    /// is passed through and rejected when the cache is built.
    pub fn from_env() -> Self {
        Self {
            capacity: env::var("CACHE_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_CAPACITY),
            label: env::var("CACHE_LABEL")
                .ok()
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| DEFAULT_LABEL.to_string()),
            demo_keys: env::var("DEMO_KEYS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_DEMO_KEYS),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            label: DEFAULT_LABEL.to_string(),
            demo_keys: DEFAULT_DEMO_KEYS,
        }
    }
}
