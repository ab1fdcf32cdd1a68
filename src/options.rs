//! Construction options for a cache instance.
//!
//! With the `serde` feature, [`CacheOptions`] can be loaded from any serde
//! format; missing fields fall back to `0` (unbounded).
//!
//! ```
//! use boundcache::options::CacheOptions;
//!
//! let options = CacheOptions::default()
//!     .with_capacity(1 << 20)
//!     .with_max_elements(10_000);
//! assert_eq!(options.capacity, 1 << 20);
//! assert!(!options.is_unbounded());
//! ```

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Byte and element limits. `0` disables the corresponding limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CacheOptions {
    /// Maximum accumulated value size in bytes.
    pub capacity: u64,
    /// Maximum number of entries.
    pub max_elements: u64,
}

impl CacheOptions {
    pub fn with_capacity(mut self, capacity: u64) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_max_elements(mut self, max_elements: u64) -> Self {
        self.max_elements = max_elements;
        self
    }

    /// Returns `true` if neither limit is set.
    pub fn is_unbounded(&self) -> bool {
        self.capacity == 0 && self.max_elements == 0
    }
}
