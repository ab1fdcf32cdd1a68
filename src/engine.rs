//! # Cache Engine
//!
//! Composes the [`EntryStore`], one [`EvictionPolicy`] and the
//! [`CapacityTracker`] into the public cache contract, and drives eviction
//! whenever a mutation leaves the cache over one of its limits.
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────────────────┐
//!   │                        SyncCache<K, V, P>  (Clone = shared handle)       │
//!   │                                                                          │
//!   │   ┌────────────────────────────────────────────────────────────────────┐ │
//!   │   │               Arc<parking_lot::Mutex<CacheCore<K, V, P>>>          │ │
//!   │   └────────────────────────────────────────────────────────────────────┘ │
//!   │                                  │                                       │
//!   │                                  ▼                                       │
//!   │   ┌────────────────────────────────────────────────────────────────────┐ │
//!   │   │                       CacheCore<K, V, P>                           │ │
//!   │   │                                                                    │ │
//!   │   │   EntryStore<K, V>      P: EvictionPolicy<K>    CapacityTracker    │ │
//!   │   │   key → { Arc<V>,       LruPolicy  (list)       capacity  (bytes)  │ │
//!   │   │           size,         LfuPolicy  (buckets)    max_elements       │ │
//!   │   │           slot } ─────► AnyPolicy  (runtime)                       │ │
//!   │   │                                                                    │ │
//!   │   │   CacheCounters (hits, misses, inserts, updates, removes, ...)     │ │
//!   │   └────────────────────────────────────────────────────────────────────┘ │
//!   └──────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Set Flow
//!
//! ```text
//!   set(k, v)
//!     │
//!     ├── k present?  yes ─► store.replace (size -= old, size += new)
//!     │                      policy.touch(slot)
//!     │
//!     │               no  ─► slot = policy.admit(k)
//!     │                      store.insert(k, v, slot)
//!     │
//!     └── check_capacity:
//!           while over a non-zero limit and more than one entry remains:
//!             victim = policy.pop_victim()
//!             store.remove(victim)
//! ```
//!
//! A lone entry larger than the byte capacity is left in place: with one
//! element the count limit always holds, and evicting it cannot make room
//! for itself. `evict(n)` still removes it.
//!
//! ## Locking
//!
//! | Method                        | Lock       | Notes                                 |
//! |-------------------------------|------------|---------------------------------------|
//! | `set` / `set_arc`             | Exclusive  | Includes cascading eviction           |
//! | `get`                         | Exclusive  | Bumps recency / frequency             |
//! | `delete` / `evict` / `clear`  | Exclusive  |                                       |
//! | `set_capacity` / `set_max_*`  | Exclusive  | Re-runs the capacity check            |
//! | `peek` / `contains` / sizes   | Exclusive  | Short critical section, no rank bump  |
//!
//! ## Example Usage
//!
//! ```
//! use boundcache::engine::LfuCache;
//! use boundcache::options::CacheOptions;
//!
//! let cache: LfuCache<&str, Vec<u8>> =
//!     LfuCache::new(CacheOptions::default().with_max_elements(2));
//!
//! cache.set("k1", vec![1]);
//! cache.set("k2", vec![2]);
//! cache.get(&"k1");
//! cache.get(&"k2");
//! cache.set("k3", vec![3]);
//!
//! // k3 is alone at frequency 1
//! assert_eq!(cache.elements_count(), 2);
//! assert!(cache.get(&"k3").is_none());
//! ```

use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::capacity::CapacityTracker;
use crate::error::{InvariantError, ensure_invariant};
use crate::metrics::{CacheCounters, CacheMetrics};
use crate::options::CacheOptions;
use crate::policy::{LfuPolicy, LruPolicy};
use crate::store::EntryStore;
use crate::traits::{ConcurrentCache, EvictionPolicy, Weighted};

/// Unsynchronized cache engine; see [`SyncCache`] for the shared handle.
pub struct CacheCore<K, V, P> {
    store: EntryStore<K, V>,
    policy: P,
    limits: CapacityTracker,
    counters: CacheCounters,
}

impl<K, V, P> CacheCore<K, V, P>
where
    K: Eq + Hash + Clone,
    V: Weighted,
    P: EvictionPolicy<K>,
{
    /// Creates an empty engine with a default-constructed policy.
    pub fn new(options: CacheOptions) -> Self
    where
        P: Default,
    {
        Self::with_policy(options, P::default())
    }

    /// Creates an empty engine around an existing policy instance.
    ///
    /// The policy is cleared so that it starts in step with the empty store.
    pub fn with_policy(options: CacheOptions, mut policy: P) -> Self {
        policy.clear();
        Self {
            store: EntryStore::new(),
            policy,
            limits: CapacityTracker::from(options),
            counters: CacheCounters::default(),
        }
    }

    /// Inserts or replaces `key`, then enforces the limits.
    #[inline]
    pub fn set(&mut self, key: K, value: V) {
        self.set_arc(key, Arc::new(value));
    }

    /// Like [`set`](Self::set) for a value that is already shared.
    pub fn set_arc(&mut self, key: K, value: Arc<V>) {
        match self.store.replace(&key, value) {
            Ok((_, slot)) => {
                self.policy.touch(slot);
                self.counters.inc_update();
            },
            Err(value) => {
                let slot = self.policy.admit(key.clone());
                self.store.insert(key, value, slot);
                self.counters.inc_insert();
            },
        }
        self.check_capacity();
    }

    /// Returns the value for `key`, counting it as an access.
    #[inline]
    pub fn get(&mut self, key: &K) -> Option<Arc<V>> {
        match self.store.get(key) {
            Some(entry) => {
                let value = Arc::clone(entry.value());
                self.policy.touch(entry.slot());
                self.counters.inc_hit();
                Some(value)
            },
            None => {
                self.counters.inc_miss();
                None
            },
        }
    }

    /// Returns the value for `key` without touching its rank.
    pub fn peek(&self, key: &K) -> Option<Arc<V>> {
        self.store.get(key).map(|entry| Arc::clone(entry.value()))
    }

    pub fn contains(&self, key: &K) -> bool {
        self.store.contains(key)
    }

    /// Removes `key` and returns its value; no-op if absent.
    pub fn delete(&mut self, key: &K) -> Option<Arc<V>> {
        let entry = self.store.remove(key)?;
        self.policy.forget(entry.slot());
        self.counters.inc_remove();
        Some(entry.into_value())
    }

    /// Removes up to `n` entries in eviction order; returns how many went.
    pub fn evict(&mut self, n: usize) -> usize {
        if n == 0 {
            return 0;
        }
        let mut removed = 0;
        while removed < n && self.evict_one() {
            removed += 1;
        }
        debug!(
            policy = self.policy.name(),
            requested = n,
            removed,
            remaining = self.store.len(),
            "explicit eviction"
        );
        removed
    }

    /// Drops every entry and resets the byte total.
    pub fn clear(&mut self) {
        let dropped = self.store.len();
        self.store.clear();
        self.policy.clear();
        debug!(policy = self.policy.name(), dropped, "cache cleared");
    }

    /// Accumulated declared size of all values, in bytes.
    pub fn size(&self) -> u64 {
        self.store.total_size()
    }

    pub fn elements_count(&self) -> u64 {
        self.store.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Byte limit, `0` when unbounded.
    pub fn capacity(&self) -> u64 {
        self.limits.capacity()
    }

    /// Element limit, `0` when unbounded.
    pub fn max_elements(&self) -> u64 {
        self.limits.max_elements()
    }

    /// Updates the byte limit and evicts down to it.
    pub fn set_capacity(&mut self, capacity: u64) {
        self.limits.set_capacity(capacity);
        debug!(policy = self.policy.name(), capacity, "byte capacity updated");
        self.check_capacity();
    }

    /// Updates the element limit and evicts down to it.
    pub fn set_max_elements(&mut self, max_elements: u64) {
        self.limits.set_max_elements(max_elements);
        debug!(policy = self.policy.name(), max_elements, "element limit updated");
        self.check_capacity();
    }

    /// Returns `true` when a non-zero limit is met or exceeded.
    pub fn full(&self) -> bool {
        self.limits
            .is_full(self.store.total_size(), self.store.len() as u64)
    }

    pub fn metrics(&self) -> CacheMetrics {
        self.counters.snapshot()
    }

    /// Current limits as construction options.
    pub fn options(&self) -> CacheOptions {
        CacheOptions::from(self.limits)
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }

    /// Cross-checks the store, the policy and the limits.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        ensure_invariant!(
            self.store.len() == self.policy.len(),
            "store holds {} entries but {} policy tracks {}",
            self.store.len(),
            self.policy.name(),
            self.policy.len()
        );
        let computed = self.store.computed_size();
        ensure_invariant!(
            computed == self.store.total_size(),
            "byte total drifted: recorded {} actual {}",
            self.store.total_size(),
            computed
        );
        ensure_invariant!(
            self.store.len() <= 1
                || !self
                    .limits
                    .is_over(self.store.total_size(), self.store.len() as u64),
            "over limits with {} entries / {} bytes",
            self.store.len(),
            self.store.total_size()
        );
        self.policy.check_invariants()
    }

    fn check_capacity(&mut self) {
        if self.limits.is_unbounded() {
            return;
        }
        while self.store.len() > 1
            && self
                .limits
                .is_over(self.store.total_size(), self.store.len() as u64)
        {
            if !self.evict_one() {
                break;
            }
        }
    }

    fn evict_one(&mut self) -> bool {
        let Some(victim) = self.policy.pop_victim() else {
            return false;
        };
        let entry = self.store.remove(&victim);
        debug_assert!(entry.is_some(), "policy victim missing from store");
        if let Some(entry) = entry {
            self.counters.inc_eviction();
            trace!(
                policy = self.policy.name(),
                freed = entry.size(),
                elements = self.store.len(),
                size = self.store.total_size(),
                "evicted entry"
            );
        }
        true
    }
}

impl<K, V, P> Default for CacheCore<K, V, P>
where
    K: Eq + Hash + Clone,
    V: Weighted,
    P: EvictionPolicy<K> + Default,
{
    fn default() -> Self {
        Self::new(CacheOptions::default())
    }
}

impl<K, V, P> fmt::Debug for CacheCore<K, V, P>
where
    K: Eq + Hash + Clone,
    V: Weighted,
    P: EvictionPolicy<K>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheCore")
            .field("policy", &self.policy.name())
            .field("elements", &self.store.len())
            .field("size", &self.store.total_size())
            .field("limits", &self.limits)
            .finish()
    }
}

/// Thread-safe cache handle; clones share one instance.
pub struct SyncCache<K, V, P> {
    inner: Arc<Mutex<CacheCore<K, V, P>>>,
}

/// Shared cache with least-recently-used eviction.
pub type LruCache<K, V> = SyncCache<K, V, LruPolicy<K>>;

/// Shared cache with least-frequently-used eviction.
pub type LfuCache<K, V> = SyncCache<K, V, LfuPolicy<K>>;

impl<K, V, P> SyncCache<K, V, P>
where
    K: Eq + Hash + Clone,
    V: Weighted,
    P: EvictionPolicy<K>,
{
    /// Creates an empty shared cache.
    ///
    /// # Example
    ///
    /// ```
    /// use boundcache::engine::LruCache;
    /// use boundcache::options::CacheOptions;
    ///
    /// let cache: LruCache<u32, String> =
    ///     LruCache::new(CacheOptions::default().with_capacity(1024));
    /// assert_eq!(cache.capacity(), 1024);
    /// assert!(cache.is_empty());
    /// ```
    pub fn new(options: CacheOptions) -> Self
    where
        P: Default,
    {
        Self::from_core(CacheCore::new(options))
    }

    pub fn with_policy(options: CacheOptions, policy: P) -> Self {
        Self::from_core(CacheCore::with_policy(options, policy))
    }

    /// Wraps an engine for shared use.
    pub fn from_core(core: CacheCore<K, V, P>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(core)),
        }
    }

    /// Inserts or replaces `key`.
    ///
    /// # Example
    ///
    /// ```
    /// use boundcache::engine::LruCache;
    ///
    /// let cache: LruCache<&str, String> = LruCache::new(Default::default());
    /// cache.set("a", "first".to_string());
    /// cache.set("a", "second".to_string());
    /// assert_eq!(*cache.get(&"a").unwrap(), "second");
    /// assert_eq!(cache.size(), 6);
    /// ```
    pub fn set(&self, key: K, value: V) {
        let value = Arc::new(value);
        self.inner.lock().set_arc(key, value);
    }

    /// Inserts an `Arc<V>` without re-wrapping it.
    pub fn set_arc(&self, key: K, value: Arc<V>) {
        self.inner.lock().set_arc(key, value);
    }

    /// Returns the value for `key`, counting it as an access.
    pub fn get(&self, key: &K) -> Option<Arc<V>> {
        self.inner.lock().get(key)
    }

    pub fn peek(&self, key: &K) -> Option<Arc<V>> {
        self.inner.lock().peek(key)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.inner.lock().contains(key)
    }

    pub fn delete(&self, key: &K) -> Option<Arc<V>> {
        self.inner.lock().delete(key)
    }

    pub fn evict(&self, n: usize) -> usize {
        self.inner.lock().evict(n)
    }

    pub fn clear(&self) {
        self.inner.lock().clear();
    }

    pub fn size(&self) -> u64 {
        self.inner.lock().size()
    }

    pub fn elements_count(&self) -> u64 {
        self.inner.lock().elements_count()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    pub fn capacity(&self) -> u64 {
        self.inner.lock().capacity()
    }

    pub fn max_elements(&self) -> u64 {
        self.inner.lock().max_elements()
    }

    pub fn set_capacity(&self, capacity: u64) {
        self.inner.lock().set_capacity(capacity);
    }

    pub fn set_max_elements(&self, max_elements: u64) {
        self.inner.lock().set_max_elements(max_elements);
    }

    pub fn full(&self) -> bool {
        self.inner.lock().full()
    }

    pub fn metrics(&self) -> CacheMetrics {
        self.inner.lock().metrics()
    }

    pub fn options(&self) -> CacheOptions {
        self.inner.lock().options()
    }

    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        self.inner.lock().check_invariants()
    }
}

impl<K, V, P> Clone for SyncCache<K, V, P> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K, V, P> Default for SyncCache<K, V, P>
where
    K: Eq + Hash + Clone,
    V: Weighted,
    P: EvictionPolicy<K> + Default,
{
    fn default() -> Self {
        Self::new(CacheOptions::default())
    }
}

impl<K, V, P> fmt::Debug for SyncCache<K, V, P>
where
    K: Eq + Hash + Clone,
    V: Weighted,
    P: EvictionPolicy<K>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let core = self.inner.lock();
        f.debug_struct("SyncCache")
            .field("policy", &core.policy.name())
            .field("elements", &core.store.len())
            .field("size", &core.store.total_size())
            .finish()
    }
}

impl<K, V, P> ConcurrentCache for SyncCache<K, V, P>
where
    K: Send,
    V: Send + Sync,
    P: Send,
{
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounded<P: EvictionPolicy<&'static str> + Default>(
        capacity: u64,
        max_elements: u64,
    ) -> CacheCore<&'static str, Vec<u8>, P> {
        CacheCore::new(CacheOptions {
            capacity,
            max_elements,
        })
    }

    mod basic_behavior {
        use super::*;

        #[test]
        fn set_get_delete() {
            let mut cache: CacheCore<_, _, LruPolicy<_>> = bounded(0, 0);
            cache.set("a", vec![1, 2, 3]);
            assert_eq!(cache.get(&"a").as_deref(), Some(&vec![1, 2, 3]));
            assert_eq!(cache.size(), 3);
            assert_eq!(cache.elements_count(), 1);

            assert_eq!(cache.delete(&"a").as_deref(), Some(&vec![1, 2, 3]));
            assert!(cache.get(&"a").is_none());
            assert!(cache.delete(&"a").is_none());
            assert_eq!(cache.size(), 0);
            cache.check_invariants().unwrap();
        }

        #[test]
        fn replace_adjusts_size() {
            let mut cache: CacheCore<_, _, LfuPolicy<_>> = bounded(0, 0);
            cache.set("a", vec![0; 4]);
            cache.set("a", vec![0; 10]);
            assert_eq!(cache.size(), 10);
            assert_eq!(cache.elements_count(), 1);
            assert_eq!(cache.policy().min_frequency(), Some(2));
            cache.check_invariants().unwrap();
        }

        #[test]
        fn peek_and_contains_do_not_count_as_access() {
            let mut cache: CacheCore<_, _, LruPolicy<_>> = bounded(0, 2);
            cache.set("a", vec![1]);
            cache.set("b", vec![2]);
            assert!(cache.peek(&"a").is_some());
            assert!(cache.contains(&"a"));

            cache.set("c", vec![3]);
            assert!(!cache.contains(&"a"));
            assert_eq!(cache.metrics().hits, 0);
        }

        #[test]
        fn metrics_track_operations() {
            let mut cache: CacheCore<_, _, LruPolicy<_>> = bounded(0, 1);
            cache.set("a", vec![1]);
            cache.set("a", vec![2]);
            cache.get(&"a");
            cache.get(&"missing");
            cache.set("b", vec![3]);
            cache.delete(&"b");

            let metrics = cache.metrics();
            assert_eq!(metrics.inserts, 2);
            assert_eq!(metrics.updates, 1);
            assert_eq!(metrics.hits, 1);
            assert_eq!(metrics.misses, 1);
            assert_eq!(metrics.evictions, 1);
            assert_eq!(metrics.removes, 1);
        }

        #[test]
        fn with_policy_starts_from_clean_policy() {
            let mut policy = LruPolicy::new();
            policy.admit("stale");
            let cache: CacheCore<&str, Vec<u8>, _> =
                CacheCore::with_policy(CacheOptions::default(), policy);
            assert_eq!(cache.policy().len(), 0);
            cache.check_invariants().unwrap();
        }
    }

    mod capacity_enforcement {
        use super::*;

        #[test]
        fn element_limit_evicts_lru_victim() {
            let mut cache: CacheCore<_, _, LruPolicy<_>> = bounded(0, 2);
            cache.set("k1", vec![1]);
            cache.set("k2", vec![2]);
            cache.set("k3", vec![3]);
            assert_eq!(cache.elements_count(), 2);
            assert!(!cache.contains(&"k1"));
            assert!(cache.full());
        }

        #[test]
        fn byte_limit_evicts_until_within() {
            let mut cache: CacheCore<_, _, LruPolicy<_>> = bounded(10, 0);
            cache.set("a", vec![0; 4]);
            cache.set("b", vec![0; 4]);
            cache.set("c", vec![0; 4]);
            assert_eq!(cache.size(), 8);
            assert!(!cache.contains(&"a"));
            cache.check_invariants().unwrap();
        }

        #[test]
        fn oversized_entry_is_tolerated_alone() {
            let mut cache: CacheCore<_, _, LruPolicy<_>> = bounded(10, 0);
            cache.set("a", vec![0; 4]);
            cache.set("huge", vec![0; 64]);
            assert_eq!(cache.elements_count(), 1);
            assert!(cache.contains(&"huge"));
            assert_eq!(cache.size(), 64);
            cache.check_invariants().unwrap();

            assert_eq!(cache.evict(1), 1);
            assert!(cache.is_empty());
        }

        #[test]
        fn growing_value_on_replace_triggers_eviction() {
            let mut cache: CacheCore<_, _, LfuPolicy<_>> = bounded(10, 0);
            cache.set("a", vec![0; 3]);
            cache.set("b", vec![0; 3]);
            cache.set("b", vec![0; 9]);
            assert!(!cache.contains(&"a"));
            assert_eq!(cache.size(), 9);
        }

        #[test]
        fn lowering_limits_evicts() {
            let mut cache: CacheCore<_, _, LruPolicy<_>> = bounded(0, 0);
            for key in ["a", "b", "c", "d"] {
                cache.set(key, vec![0; 5]);
            }
            assert!(!cache.full());

            cache.set_max_elements(3);
            assert_eq!(cache.elements_count(), 3);
            assert!(!cache.contains(&"a"));

            cache.set_capacity(10);
            assert_eq!(cache.size(), 10);
            assert!(cache.contains(&"d"));
            assert_eq!(
                cache.options(),
                CacheOptions {
                    capacity: 10,
                    max_elements: 3
                }
            );
        }

        #[test]
        fn evict_stops_when_empty() {
            let mut cache: CacheCore<_, _, LfuPolicy<_>> = bounded(0, 0);
            cache.set("a", vec![1]);
            cache.set("b", vec![2]);
            assert_eq!(cache.evict(0), 0);
            assert_eq!(cache.evict(5), 2);
            assert_eq!(cache.evict(1), 0);
            assert!(cache.is_empty());
        }

        #[test]
        fn clear_resets_everything() {
            let mut cache: CacheCore<_, _, LfuPolicy<_>> = bounded(100, 10);
            cache.set("a", vec![0; 10]);
            cache.set("b", vec![0; 20]);
            cache.clear();
            assert_eq!(cache.elements_count(), 0);
            assert_eq!(cache.size(), 0);
            assert!(cache.policy().is_empty());
            cache.check_invariants().unwrap();
        }

        #[test]
        fn size_is_exact_after_total_passes_u64() {
            struct Declared(u64);

            impl Weighted for Declared {
                fn size(&self) -> u64 {
                    self.0
                }
            }

            let half = u64::MAX / 2 + 1;
            let mut cache: CacheCore<&str, Declared, LruPolicy<_>> =
                CacheCore::new(CacheOptions::default());
            cache.set("a", Declared(half));
            cache.set("b", Declared(half));
            assert_eq!(cache.size(), u64::MAX);
            cache.check_invariants().unwrap();

            cache.delete(&"a");
            assert_eq!(cache.size(), half);
            cache.check_invariants().unwrap();
        }
    }

    mod sync_handle {
        use super::*;

        #[test]
        fn clones_share_one_instance() {
            let cache: LruCache<&str, String> = LruCache::new(CacheOptions::default());
            let other = cache.clone();
            cache.set("a", "x".to_string());
            assert!(other.contains(&"a"));
            other.delete(&"a");
            assert!(cache.is_empty());
        }

        #[test]
        fn set_arc_keeps_pointer_identity() {
            let cache: LfuCache<u32, String> = LfuCache::default();
            let shared = Arc::new("shared".to_string());
            cache.set_arc(1, Arc::clone(&shared));
            let fetched = cache.get(&1).unwrap();
            assert!(Arc::ptr_eq(&shared, &fetched));
        }

        #[test]
        fn debug_output_names_policy() {
            let cache: LfuCache<u32, String> = LfuCache::default();
            cache.set(1, "one".to_string());
            let rendered = format!("{cache:?}");
            assert!(rendered.contains("lfu"));
            assert!(rendered.contains("elements: 1"));
        }
    }
}
