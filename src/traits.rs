//! # Cache Capability Traits
//!
//! This module defines the seams between the cache engine and the pieces it is
//! generic over: the byte-size capability of values and the eviction policy
//! that ranks keys.
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────────────┐
//!   │                    CacheCore<K, V, P>                                │
//!   │                                                                      │
//!   │   EntryStore<K, V>            P: EvictionPolicy<K>                   │
//!   │   ┌───────────────────┐       ┌─────────────────────────────────┐    │
//!   │   │ key → CacheEntry  │       │ admit(K) → SlotId               │    │
//!   │   │   value: Arc<V>   │       │ touch(SlotId)                   │    │
//!   │   │   size:  u64 ◄────┼───────┼── V: Weighted::size()           │    │
//!   │   │   slot:  SlotId ──┼──────►│ forget(SlotId) → Option<K>      │    │
//!   │   └───────────────────┘       │ pop_victim() → Option<K>        │    │
//!   │                               └─────────────────────────────────┘    │
//!   └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Trait Summary
//!
//! | Trait             | Implemented by                          | Purpose                       |
//! |-------------------|-----------------------------------------|-------------------------------|
//! | `Weighted`        | `Vec<u8>`, `String`, `Box<[u8]>`, ...   | Byte accounting for values    |
//! | `EvictionPolicy`  | `LruPolicy`, `LfuPolicy`, `AnyPolicy`   | Rank keys, pick victims       |
//! | `ConcurrentCache` | `SyncCache`                             | Marker for shareable handles  |
//!
//! ## Policy Contract
//!
//! The policy never sees values. It owns one node per admitted key and hands
//! back a [`SlotId`] that the engine stores next to the entry, so every
//! follow-up call is O(1) without a second hash lookup.
//!
//! - `admit` is called exactly once per new key.
//! - `touch` is called on every access of an existing key (get or re-set).
//! - `forget` is called on delete; `pop_victim` on eviction.
//! - After any of these returns, `len()` equals the number of live entries.

use std::sync::Arc;

use crate::ds::SlotId;
use crate::error::InvariantError;

/// Byte-size capability used for capacity accounting.
///
/// The size is captured once, when the value is stored; the cache never
/// re-reads it, so values must not change their reported size afterwards.
///
/// # Example
///
/// ```
/// use boundcache::traits::Weighted;
///
/// struct Page {
///     bytes: [u8; 64],
/// }
///
/// impl Weighted for Page {
///     fn size(&self) -> u64 {
///         self.bytes.len() as u64
///     }
/// }
///
/// assert_eq!(Page { bytes: [0; 64] }.size(), 64);
/// assert_eq!("hello".size(), 5);
/// ```
pub trait Weighted {
    /// Returns the declared size of this value in bytes.
    fn size(&self) -> u64;
}

impl Weighted for Vec<u8> {
    fn size(&self) -> u64 {
        self.len() as u64
    }
}

impl Weighted for String {
    fn size(&self) -> u64 {
        self.len() as u64
    }
}

impl Weighted for Box<[u8]> {
    fn size(&self) -> u64 {
        self.len() as u64
    }
}

impl Weighted for str {
    fn size(&self) -> u64 {
        self.len() as u64
    }
}

impl Weighted for [u8] {
    fn size(&self) -> u64 {
        self.len() as u64
    }
}

impl<T: Weighted + ?Sized> Weighted for &T {
    fn size(&self) -> u64 {
        (**self).size()
    }
}

impl<T: Weighted + ?Sized> Weighted for Arc<T> {
    fn size(&self) -> u64 {
        (**self).size()
    }
}

/// Ranking structure driving eviction.
///
/// Implementations own the ordering nodes for every admitted key and must
/// keep them in step with the engine's entry store.
///
/// # Example
///
/// ```
/// use boundcache::policy::LruPolicy;
/// use boundcache::traits::EvictionPolicy;
///
/// let mut policy = LruPolicy::new();
/// let a = policy.admit("a");
/// let _b = policy.admit("b");
///
/// // "a" becomes the most recent; "b" is now the victim
/// policy.touch(a);
/// assert_eq!(policy.peek_victim(), Some(&"b"));
/// assert_eq!(policy.pop_victim(), Some("b"));
/// assert_eq!(policy.len(), 1);
/// ```
pub trait EvictionPolicy<K> {
    /// Starts tracking a new key and returns its node handle.
    fn admit(&mut self, key: K) -> SlotId;

    /// Records an access to the key behind `slot`.
    fn touch(&mut self, slot: SlotId);

    /// Stops tracking the key behind `slot` and returns it.
    fn forget(&mut self, slot: SlotId) -> Option<K>;

    /// Removes and returns the lowest-ranked key.
    fn pop_victim(&mut self) -> Option<K>;

    /// Returns the key [`pop_victim`](Self::pop_victim) would remove next.
    fn peek_victim(&self) -> Option<&K>;

    /// Returns the number of tracked keys.
    fn len(&self) -> usize;

    /// Returns `true` if no key is tracked.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every tracked key.
    fn clear(&mut self);

    /// Short policy name used in logs.
    fn name(&self) -> &'static str;

    /// Verifies the structure's internal invariants.
    fn check_invariants(&self) -> Result<(), InvariantError>;
}

/// Marker trait for cache handles that are safe to share across threads.
///
/// # Example
///
/// ```
/// use boundcache::engine::LruCache;
/// use boundcache::traits::ConcurrentCache;
///
/// fn assert_shareable<C: ConcurrentCache + Clone>(_cache: &C) {}
///
/// let cache: LruCache<u64, Vec<u8>> = LruCache::new(Default::default());
/// assert_shareable(&cache);
/// ```
pub trait ConcurrentCache: Send + Sync {}
