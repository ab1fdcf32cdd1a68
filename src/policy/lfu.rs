//! # LFU (Least Frequently Used) Policy
//!
//! Frequency ordering for the cache engine, built on
//! [`FrequencyBuckets`]: every operation, including eviction, is O(1).
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────────────────┐
//!   │                            LfuPolicy<K>                                  │
//!   │                                                                          │
//!   │   FrequencyBuckets<K>                                                    │
//!   │                                                                          │
//!   │   head (min freq)                                       tail (max freq)  │
//!   │    ┌────────┐        ┌────────┐        ┌────────┐                        │
//!   │    │ f = 1  │ ◄────► │ f = 3  │ ◄────► │ f = 7  │                        │
//!   │    │ [d, c] │        │ [b]    │        │ [a]    │                        │
//!   │    └────────┘        └────────┘        └────────┘                        │
//!   │       ▲  └─ c arrived first: next victim                                 │
//!   │       └──── new keys join here                                           │
//!   └──────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## LFU vs LRU Comparison
//!
//! ```text
//!   Access pattern: A, A, B, C   Element limit: 2
//!
//!   LRU:  after A, A, B  [B, A]        insert C → A evicted (least recent)
//!   LFU:  after A, A, B  {A:2, B:1}    insert C → B evicted (least frequent)
//! ```
//!
//! ## Tie-breaking
//!
//! Keys sharing the minimum frequency leave in the order they entered that
//! bucket. A key that is touched re-enters the next bucket as its newest
//! member.

use crate::ds::{FrequencyBuckets, SlotId};
use crate::error::InvariantError;
use crate::traits::EvictionPolicy;

/// Access-count ordering of keys with FIFO tie-breaking.
#[derive(Debug)]
pub struct LfuPolicy<K> {
    buckets: FrequencyBuckets<K>,
}

impl<K> LfuPolicy<K> {
    pub fn new() -> Self {
        Self {
            buckets: FrequencyBuckets::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buckets: FrequencyBuckets::with_capacity(capacity),
        }
    }

    /// Access count of the key behind `slot`.
    pub fn frequency(&self, slot: SlotId) -> Option<u64> {
        self.buckets.frequency(slot)
    }

    /// Lowest access count currently tracked.
    pub fn min_frequency(&self) -> Option<u64> {
        self.buckets.min_freq()
    }

    pub fn key(&self, slot: SlotId) -> Option<&K> {
        self.buckets.key(slot)
    }

    /// `(frequency, key_count)` per bucket, lowest first.
    pub fn bucket_layout(&self) -> Vec<(u64, usize)> {
        self.buckets.iter_buckets().collect()
    }
}

impl<K> Default for LfuPolicy<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> EvictionPolicy<K> for LfuPolicy<K> {
    #[inline]
    fn admit(&mut self, key: K) -> SlotId {
        self.buckets.insert(key)
    }

    #[inline]
    fn touch(&mut self, slot: SlotId) {
        self.buckets.touch(slot);
    }

    #[inline]
    fn forget(&mut self, slot: SlotId) -> Option<K> {
        self.buckets.remove(slot).map(|(key, _)| key)
    }

    #[inline]
    fn pop_victim(&mut self) -> Option<K> {
        self.buckets.pop_min().map(|(key, _)| key)
    }

    fn peek_victim(&self) -> Option<&K> {
        self.buckets.peek_min().map(|(key, _)| key)
    }

    fn len(&self) -> usize {
        self.buckets.len()
    }

    fn clear(&mut self) {
        self.buckets.clear();
    }

    fn name(&self) -> &'static str {
        "lfu"
    }

    fn check_invariants(&self) -> Result<(), InvariantError> {
        self.buckets.check_invariants()
    }
}
