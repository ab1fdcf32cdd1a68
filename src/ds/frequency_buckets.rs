//! Frequency buckets for O(1) LFU tracking.
//!
//! Keys are grouped by access count into buckets, and the buckets form a
//! doubly linked chain in ascending frequency order. Both the buckets and the
//! per-key nodes live in [`SlotArena`]s, so every link is a [`SlotId`] and the
//! handle returned by [`insert`](FrequencyBuckets::insert) stays valid while
//! the key moves from bucket to bucket. There is no key index in here; the
//! owner (the LFU policy's caller) keeps the handle next to its own entry.
//!
//! ## Architecture
//!
//! ```text
//!   buckets (SlotArena<Bucket>), chained head ─► tail, ascending freq
//!
//!   head                                                tail
//!    │                                                    │
//!    ▼                                                    ▼
//!   ┌──────────┐      ┌──────────┐      ┌──────────┐
//!   │ freq = 1 │ ◄──► │ freq = 2 │ ◄──► │ freq = 5 │
//!   └────┬─────┘      └────┬─────┘      └────┬─────┘
//!        │                 │                 │
//!        ▼                 ▼                 ▼
//!    [k4] ◄─► [k1]       [k2]           [k3] ◄─► [k0]
//!    newest   oldest                    newest   oldest
//!             (victim)
//!
//!   entries (SlotArena<Entry<K>>): { key, bucket, prev, next }
//! ```
//!
//! Touch Flow (frequency f → f+1)
//! ───────────────────────────────
//!
//!   1. If the next bucket in the chain has freq f+1, reuse it;
//!      otherwise link a fresh f+1 bucket right after the current one
//!   2. Unlink the node from its bucket and push it to the front of the
//!      target bucket
//!   3. If the old bucket is now empty, unlink and free it
//!
//! Eviction Flow (pop_min)
//! ───────────────────────
//!
//!   The head bucket is the global minimum; its tail node is the key that
//!   entered that bucket first. Remove it and free the bucket if emptied.
//!
//! ## Operations
//!
//! | Operation   | Time | Notes                                  |
//! |-------------|------|----------------------------------------|
//! | `insert`    | O(1) | New key joins the freq=1 bucket        |
//! | `touch`     | O(1) | Relocates to the next bucket           |
//! | `remove`    | O(1) | Compacts an emptied bucket             |
//! | `pop_min`   | O(1) | FIFO tie-break inside the min bucket   |
//! | `frequency` | O(1) | Read through the node's bucket         |
//!
//! ## Example Usage
//!
//! ```
//! use boundcache::ds::FrequencyBuckets;
//!
//! let mut freq = FrequencyBuckets::new();
//! let a = freq.insert("a");
//! let _b = freq.insert("b");
//!
//! assert_eq!(freq.touch(a), Some(2));
//! assert_eq!(freq.min_freq(), Some(1));
//!
//! // "b" is the only key left at the minimum frequency
//! assert_eq!(freq.pop_min(), Some(("b", 1)));
//! assert_eq!(freq.min_freq(), Some(2));
//! ```

use crate::ds::slot_arena::{SlotArena, SlotId};
use crate::error::{InvariantError, ensure_invariant};

#[derive(Debug)]
struct Entry<K> {
    prev: Option<SlotId>,
    next: Option<SlotId>,
    bucket: SlotId,
    key: K,
}

#[derive(Debug)]
struct Bucket {
    freq: u64,
    len: usize,
    head: Option<SlotId>,
    tail: Option<SlotId>,
    prev: Option<SlotId>,
    next: Option<SlotId>,
}

/// O(1) LFU ordering with FIFO tie-breaking within a frequency.
#[derive(Debug)]
pub struct FrequencyBuckets<K> {
    entries: SlotArena<Entry<K>>,
    buckets: SlotArena<Bucket>,
    head: Option<SlotId>,
    tail: Option<SlotId>,
}

impl<K> FrequencyBuckets<K> {
    /// Creates an empty tracker.
    pub fn new() -> Self {
        Self {
            entries: SlotArena::new(),
            buckets: SlotArena::new(),
            head: None,
            tail: None,
        }
    }

    /// Creates an empty tracker with room for `capacity` keys.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: SlotArena::with_capacity(capacity),
            buckets: SlotArena::new(),
            head: None,
            tail: None,
        }
    }

    /// Returns the number of tracked keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no key is tracked.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the number of live buckets (distinct frequencies).
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Returns the key stored under `id`.
    pub fn key(&self, id: SlotId) -> Option<&K> {
        self.entries.get(id).map(|entry| &entry.key)
    }

    /// Returns the current frequency of the key stored under `id`.
    #[inline]
    pub fn frequency(&self, id: SlotId) -> Option<u64> {
        let bucket = self.entries.get(id)?.bucket;
        self.buckets.get(bucket).map(|bucket| bucket.freq)
    }

    /// Returns the minimum frequency currently present.
    pub fn min_freq(&self) -> Option<u64> {
        self.head
            .and_then(|id| self.buckets.get(id))
            .map(|bucket| bucket.freq)
    }

    /// Peeks the eviction candidate `(key, freq)` without removing it.
    pub fn peek_min(&self) -> Option<(&K, u64)> {
        let bucket = self.buckets.get(self.head?)?;
        let entry = self.entries.get(bucket.tail?)?;
        Some((&entry.key, bucket.freq))
    }

    /// Iterates `(freq, key_count)` per bucket, lowest frequency first.
    pub fn iter_buckets(&self) -> BucketIter<'_, K> {
        BucketIter {
            buckets: self,
            current: self.head,
        }
    }

    /// Starts tracking `key` at frequency 1 and returns its handle.
    ///
    /// The handle stays valid across [`touch`](Self::touch) calls until the
    /// key is removed or evicted.
    #[inline]
    pub fn insert(&mut self, key: K) -> SlotId {
        let bucket = match self.head {
            Some(head) if self.buckets.get(head).is_some_and(|b| b.freq == 1) => head,
            _ => self.link_bucket_after(None, 1),
        };
        let id = self.entries.insert(Entry {
            prev: None,
            next: None,
            bucket,
            key,
        });
        self.list_push_front(bucket, id);
        id
    }

    /// Increments the frequency of `id` and returns the new frequency.
    ///
    /// Returns `None` if `id` is not tracked. A key already at `u64::MAX`
    /// stays there and is only refreshed within its bucket.
    #[inline]
    pub fn touch(&mut self, id: SlotId) -> Option<u64> {
        let current = self.entries.get(id)?.bucket;
        let (freq, next) = {
            let bucket = self.buckets.get(current)?;
            (bucket.freq, bucket.next)
        };

        if freq == u64::MAX {
            self.list_remove(id)?;
            self.list_push_front(current, id);
            return Some(freq);
        }

        let next_freq = freq + 1;
        let target = match next {
            Some(next) if self.buckets.get(next).is_some_and(|b| b.freq == next_freq) => next,
            _ => self.link_bucket_after(Some(current), next_freq),
        };

        self.list_remove(id)?;
        self.list_push_front(target, id);
        self.release_if_empty(current);
        Some(next_freq)
    }

    /// Stops tracking `id`; returns its key and final frequency.
    #[inline]
    pub fn remove(&mut self, id: SlotId) -> Option<(K, u64)> {
        let freq = self.frequency(id)?;
        let bucket = self.list_remove(id)?;
        self.release_if_empty(bucket);
        self.entries.remove(id).map(|entry| (entry.key, freq))
    }

    /// Removes and returns the eviction candidate `(key, freq)`.
    ///
    /// The candidate is the oldest arrival in the lowest-frequency bucket.
    #[inline]
    pub fn pop_min(&mut self) -> Option<(K, u64)> {
        let victim = self.buckets.get(self.head?)?.tail?;
        self.remove(victim)
    }

    /// Drops every key and bucket.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.buckets.clear();
        self.head = None;
        self.tail = None;
    }

    /// Verifies chain order, bucket occupancy and node back-links.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        if self.head.is_none() || self.tail.is_none() {
            ensure_invariant!(
                self.head.is_none() && self.tail.is_none(),
                "bucket chain head/tail disagree on emptiness"
            );
            ensure_invariant!(
                self.buckets.is_empty() && self.entries.is_empty(),
                "empty bucket chain but {} buckets / {} keys allocated",
                self.buckets.len(),
                self.entries.len()
            );
            return Ok(());
        }

        let mut seen_buckets = 0usize;
        let mut seen_keys = 0usize;
        let mut prev_bucket: Option<SlotId> = None;
        let mut prev_freq: Option<u64> = None;
        let mut current = self.head;

        while let Some(bucket_id) = current {
            let Some(bucket) = self.buckets.get(bucket_id) else {
                return Err(InvariantError::new("bucket chain links to a freed bucket"));
            };
            ensure_invariant!(
                bucket.prev == prev_bucket,
                "bucket {} has a stale prev link",
                bucket.freq
            );
            if let Some(prev_freq) = prev_freq {
                ensure_invariant!(
                    bucket.freq > prev_freq,
                    "bucket frequencies not increasing: {} after {}",
                    bucket.freq,
                    prev_freq
                );
            }
            ensure_invariant!(bucket.len > 0, "bucket {} is empty", bucket.freq);

            let mut count = 0usize;
            let mut node_prev = None;
            let mut node = bucket.head;
            while let Some(entry_id) = node {
                let Some(entry) = self.entries.get(entry_id) else {
                    return Err(InvariantError::new("bucket links to a freed entry"));
                };
                ensure_invariant!(
                    entry.bucket == bucket_id,
                    "entry in bucket {} points at another bucket",
                    bucket.freq
                );
                ensure_invariant!(
                    entry.prev == node_prev,
                    "entry in bucket {} has a stale prev link",
                    bucket.freq
                );
                count += 1;
                ensure_invariant!(
                    count <= self.entries.len(),
                    "bucket {} chain is cyclic",
                    bucket.freq
                );
                node_prev = Some(entry_id);
                node = entry.next;
            }
            ensure_invariant!(
                bucket.tail == node_prev,
                "bucket {} tail does not end its chain",
                bucket.freq
            );
            ensure_invariant!(
                count == bucket.len,
                "bucket {} records {} keys but links {}",
                bucket.freq,
                bucket.len,
                count
            );

            seen_buckets += 1;
            seen_keys += count;
            prev_bucket = Some(bucket_id);
            prev_freq = Some(bucket.freq);
            current = bucket.next;
        }

        ensure_invariant!(self.tail == prev_bucket, "bucket chain tail is stale");
        ensure_invariant!(
            seen_buckets == self.buckets.len(),
            "{} buckets allocated but {} chained",
            self.buckets.len(),
            seen_buckets
        );
        ensure_invariant!(
            seen_keys == self.entries.len(),
            "{} keys allocated but {} reachable",
            self.entries.len(),
            seen_keys
        );
        Ok(())
    }

    /// Links a new bucket after `after`, or at the chain head for `None`.
    fn link_bucket_after(&mut self, after: Option<SlotId>, freq: u64) -> SlotId {
        let next = match after {
            Some(after) => self.buckets.get(after).and_then(|bucket| bucket.next),
            None => self.head,
        };
        let id = self.buckets.insert(Bucket {
            freq,
            len: 0,
            head: None,
            tail: None,
            prev: after,
            next,
        });

        match after {
            Some(after) => {
                if let Some(bucket) = self.buckets.get_mut(after) {
                    bucket.next = Some(id);
                }
            },
            None => self.head = Some(id),
        }
        match next {
            Some(next) => {
                if let Some(bucket) = self.buckets.get_mut(next) {
                    bucket.prev = Some(id);
                }
            },
            None => self.tail = Some(id),
        }
        id
    }

    fn release_if_empty(&mut self, id: SlotId) {
        if self.buckets.get(id).is_none_or(|bucket| bucket.len > 0) {
            return;
        }
        let Some(bucket) = self.buckets.remove(id) else {
            return;
        };

        match bucket.prev {
            Some(prev) => {
                if let Some(prev_bucket) = self.buckets.get_mut(prev) {
                    prev_bucket.next = bucket.next;
                }
            },
            None => self.head = bucket.next,
        }
        match bucket.next {
            Some(next) => {
                if let Some(next_bucket) = self.buckets.get_mut(next) {
                    next_bucket.prev = bucket.prev;
                }
            },
            None => self.tail = bucket.prev,
        }
    }

    fn list_push_front(&mut self, bucket_id: SlotId, id: SlotId) {
        let Some(bucket) = self.buckets.get_mut(bucket_id) else {
            return;
        };
        let old_head = bucket.head;
        bucket.head = Some(id);
        if old_head.is_none() {
            bucket.tail = Some(id);
        }
        bucket.len += 1;

        if let Some(old_head) = old_head {
            if let Some(entry) = self.entries.get_mut(old_head) {
                entry.prev = Some(id);
            }
        }
        if let Some(entry) = self.entries.get_mut(id) {
            entry.prev = None;
            entry.next = old_head;
            entry.bucket = bucket_id;
        }
    }

    /// Unlinks `id` from its bucket list and returns that bucket.
    fn list_remove(&mut self, id: SlotId) -> Option<SlotId> {
        let (prev, next, bucket_id) = {
            let entry = self.entries.get(id)?;
            (entry.prev, entry.next, entry.bucket)
        };
        let bucket = self.buckets.get_mut(bucket_id)?;

        match prev {
            Some(prev) => {
                if let Some(entry) = self.entries.get_mut(prev) {
                    entry.next = next;
                }
            },
            None => bucket.head = next,
        }
        match next {
            Some(next) => {
                if let Some(entry) = self.entries.get_mut(next) {
                    entry.prev = prev;
                }
            },
            None => bucket.tail = prev,
        }
        bucket.len -= 1;

        if let Some(entry) = self.entries.get_mut(id) {
            entry.prev = None;
            entry.next = None;
        }
        Some(bucket_id)
    }
}

impl<K> Default for FrequencyBuckets<K> {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over `(freq, key_count)` from the lowest bucket to the highest.
pub struct BucketIter<'a, K> {
    buckets: &'a FrequencyBuckets<K>,
    current: Option<SlotId>,
}

impl<K> Iterator for BucketIter<'_, K> {
    type Item = (u64, usize);

    fn next(&mut self) -> Option<Self::Item> {
        let bucket = self.buckets.buckets.get(self.current?)?;
        self.current = bucket.next;
        Some((bucket.freq, bucket.len))
    }
}
