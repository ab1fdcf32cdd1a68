//! Dual capacity limits: total bytes and element count.
//!
//! Either limit may be zero, meaning that dimension is unbounded. The tracker
//! holds no entries itself; the engine feeds it the current totals and asks
//! whether eviction has to run.
//!
//! ```text
//!   over limit:  (capacity ≠ 0 ∧ size > capacity) ∨ (max_elements ≠ 0 ∧ count > max_elements)
//!   full:        (capacity ≠ 0 ∧ size ≥ capacity) ∨ (max_elements ≠ 0 ∧ count ≥ max_elements)
//! ```

use crate::options::CacheOptions;

/// Byte and element ceilings for one cache instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CapacityTracker {
    capacity: u64,
    max_elements: u64,
}

impl CapacityTracker {
    /// Creates a tracker; `0` leaves the corresponding dimension unbounded.
    pub fn new(capacity: u64, max_elements: u64) -> Self {
        Self {
            capacity,
            max_elements,
        }
    }

    /// Byte limit, `0` when unbounded.
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Element limit, `0` when unbounded.
    pub fn max_elements(&self) -> u64 {
        self.max_elements
    }

    pub fn set_capacity(&mut self, capacity: u64) {
        self.capacity = capacity;
    }

    pub fn set_max_elements(&mut self, max_elements: u64) {
        self.max_elements = max_elements;
    }

    /// Returns `true` when at least one non-zero limit is exceeded.
    #[inline]
    pub fn is_over(&self, size: u64, count: u64) -> bool {
        (self.capacity != 0 && size > self.capacity)
            || (self.max_elements != 0 && count > self.max_elements)
    }

    /// Returns `true` when at least one non-zero limit is met or exceeded.
    #[inline]
    pub fn is_full(&self, size: u64, count: u64) -> bool {
        (self.capacity != 0 && size >= self.capacity)
            || (self.max_elements != 0 && count >= self.max_elements)
    }

    /// Returns `true` if neither dimension is bounded.
    pub fn is_unbounded(&self) -> bool {
        self.capacity == 0 && self.max_elements == 0
    }
}

impl From<CacheOptions> for CapacityTracker {
    fn from(options: CacheOptions) -> Self {
        Self::new(options.capacity, options.max_elements)
    }
}

impl From<CapacityTracker> for CacheOptions {
    fn from(tracker: CapacityTracker) -> Self {
        CacheOptions {
            capacity: tracker.capacity,
            max_elements: tracker.max_elements,
        }
    }
}
