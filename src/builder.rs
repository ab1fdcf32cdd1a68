//! Unified cache builder with runtime policy selection.
//!
//! The engine is generic over its policy, so code that knows the policy at
//! compile time can use [`LruCache`](crate::engine::LruCache) or
//! [`LfuCache`](crate::engine::LfuCache) directly. When the policy comes from
//! configuration, the builder wraps it in [`AnyPolicy`] and returns a
//! [`Cache`] whose API is identical.
//!
//! ## Example
//!
//! ```rust
//! use boundcache::builder::{CacheBuilder, CachePolicy};
//!
//! let policy: CachePolicy = "LFU".parse().unwrap();
//! let cache = CacheBuilder::new()
//!     .max_elements(100)
//!     .policy(policy)
//!     .build::<u64, String>();
//!
//! cache.set(1, "hello".to_string());
//! assert_eq!(cache.get(&1).as_deref(), Some(&"hello".to_string()));
//! ```

use std::fmt;
use std::hash::Hash;
use std::str::FromStr;

use crate::ds::SlotId;
use crate::engine::{CacheCore, SyncCache};
use crate::error::{ConfigError, InvariantError};
use crate::options::CacheOptions;
use crate::policy::{LfuPolicy, LruPolicy};
use crate::traits::{EvictionPolicy, Weighted};

/// Available eviction policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum CachePolicy {
    /// Least Recently Used eviction.
    #[default]
    Lru,
    /// Least Frequently Used eviction (O(1) frequency buckets).
    Lfu,
}

impl CachePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            CachePolicy::Lru => "lru",
            CachePolicy::Lfu => "lfu",
        }
    }
}

impl fmt::Display for CachePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CachePolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lru" => Ok(CachePolicy::Lru),
            "lfu" => Ok(CachePolicy::Lfu),
            _ => Err(ConfigError::UnknownPolicy(s.to_string())),
        }
    }
}

/// Policy chosen at runtime; dispatches to the concrete implementation.
#[derive(Debug)]
pub enum AnyPolicy<K> {
    Lru(LruPolicy<K>),
    Lfu(LfuPolicy<K>),
}

impl<K> AnyPolicy<K> {
    pub fn new(policy: CachePolicy) -> Self {
        match policy {
            CachePolicy::Lru => AnyPolicy::Lru(LruPolicy::new()),
            CachePolicy::Lfu => AnyPolicy::Lfu(LfuPolicy::new()),
        }
    }

    /// The tag this policy was built from.
    pub fn kind(&self) -> CachePolicy {
        match self {
            AnyPolicy::Lru(_) => CachePolicy::Lru,
            AnyPolicy::Lfu(_) => CachePolicy::Lfu,
        }
    }
}

impl<K> From<CachePolicy> for AnyPolicy<K> {
    fn from(policy: CachePolicy) -> Self {
        Self::new(policy)
    }
}

impl<K> Default for AnyPolicy<K> {
    fn default() -> Self {
        Self::new(CachePolicy::default())
    }
}

impl<K> EvictionPolicy<K> for AnyPolicy<K> {
    fn admit(&mut self, key: K) -> SlotId {
        match self {
            AnyPolicy::Lru(lru) => lru.admit(key),
            AnyPolicy::Lfu(lfu) => lfu.admit(key),
        }
    }

    fn touch(&mut self, slot: SlotId) {
        match self {
            AnyPolicy::Lru(lru) => lru.touch(slot),
            AnyPolicy::Lfu(lfu) => lfu.touch(slot),
        }
    }

    fn forget(&mut self, slot: SlotId) -> Option<K> {
        match self {
            AnyPolicy::Lru(lru) => lru.forget(slot),
            AnyPolicy::Lfu(lfu) => lfu.forget(slot),
        }
    }

    fn pop_victim(&mut self) -> Option<K> {
        match self {
            AnyPolicy::Lru(lru) => lru.pop_victim(),
            AnyPolicy::Lfu(lfu) => lfu.pop_victim(),
        }
    }

    fn peek_victim(&self) -> Option<&K> {
        match self {
            AnyPolicy::Lru(lru) => lru.peek_victim(),
            AnyPolicy::Lfu(lfu) => lfu.peek_victim(),
        }
    }

    fn len(&self) -> usize {
        match self {
            AnyPolicy::Lru(lru) => lru.len(),
            AnyPolicy::Lfu(lfu) => lfu.len(),
        }
    }

    fn clear(&mut self) {
        match self {
            AnyPolicy::Lru(lru) => lru.clear(),
            AnyPolicy::Lfu(lfu) => lfu.clear(),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            AnyPolicy::Lru(lru) => lru.name(),
            AnyPolicy::Lfu(lfu) => lfu.name(),
        }
    }

    fn check_invariants(&self) -> Result<(), InvariantError> {
        match self {
            AnyPolicy::Lru(lru) => lru.check_invariants(),
            AnyPolicy::Lfu(lfu) => lfu.check_invariants(),
        }
    }
}

/// Shared cache whose policy was picked at runtime.
pub type Cache<K, V> = SyncCache<K, V, AnyPolicy<K>>;

/// Builder for creating cache instances.
#[derive(Debug, Clone, Copy, Default)]
pub struct CacheBuilder {
    options: CacheOptions,
    policy: CachePolicy,
}

impl CacheBuilder {
    /// Starts from unbounded limits and the LRU policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from existing options.
    pub fn from_options(options: CacheOptions) -> Self {
        Self {
            options,
            policy: CachePolicy::default(),
        }
    }

    /// Byte limit; `0` leaves it unbounded.
    pub fn capacity(mut self, capacity: u64) -> Self {
        self.options.capacity = capacity;
        self
    }

    /// Element limit; `0` leaves it unbounded.
    pub fn max_elements(mut self, max_elements: u64) -> Self {
        self.options.max_elements = max_elements;
        self
    }

    pub fn policy(mut self, policy: CachePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Build a shared cache with the configured policy.
    ///
    /// # Example
    ///
    /// ```rust
    /// use boundcache::builder::{CacheBuilder, CachePolicy};
    ///
    /// let cache = CacheBuilder::new()
    ///     .capacity(1 << 20)
    ///     .policy(CachePolicy::Lru)
    ///     .build::<String, Vec<u8>>();
    /// assert_eq!(cache.capacity(), 1 << 20);
    /// ```
    pub fn build<K, V>(self) -> Cache<K, V>
    where
        K: Eq + Hash + Clone,
        V: Weighted,
    {
        SyncCache::from_core(self.build_core())
    }

    /// Build an unsynchronized engine for single-threaded use.
    pub fn build_core<K, V>(self) -> CacheCore<K, V, AnyPolicy<K>>
    where
        K: Eq + Hash + Clone,
        V: Weighted,
    {
        CacheCore::with_policy(self.options, AnyPolicy::new(self.policy))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_parses_case_insensitively() {
        assert_eq!("lru".parse::<CachePolicy>(), Ok(CachePolicy::Lru));
        assert_eq!("LFU".parse::<CachePolicy>(), Ok(CachePolicy::Lfu));
        assert_eq!(" Lfu ".parse::<CachePolicy>(), Ok(CachePolicy::Lfu));
        assert_eq!(
            "arc".parse::<CachePolicy>(),
            Err(ConfigError::UnknownPolicy("arc".to_string()))
        );
        assert_eq!(CachePolicy::Lfu.to_string(), "lfu");
    }

    #[test]
    fn test_all_policies_basic_ops() {
        for policy in [CachePolicy::Lru, CachePolicy::Lfu] {
            let cache = CacheBuilder::new()
                .max_elements(10)
                .policy(policy)
                .build::<u64, String>();

            cache.set(1, "one".to_string());
            cache.set(2, "two".to_string());
            assert_eq!(cache.get(&1).as_deref(), Some(&"one".to_string()));
            assert_eq!(cache.get(&3), None);
            assert!(cache.contains(&2));
            assert_eq!(cache.elements_count(), 2);
            assert_eq!(cache.size(), 6);

            cache.set(1, "ONE".to_string());
            assert_eq!(cache.peek(&1).as_deref(), Some(&"ONE".to_string()));

            cache.clear();
            assert!(cache.is_empty());
            cache.check_invariants().unwrap();
        }
    }

    #[test]
    fn test_capacity_enforcement_differs_by_policy() {
        let lru = CacheBuilder::new()
            .max_elements(2)
            .policy(CachePolicy::Lru)
            .build_core::<u64, String>();
        let lfu = CacheBuilder::new()
            .max_elements(2)
            .policy(CachePolicy::Lfu)
            .build_core::<u64, String>();

        for mut cache in [lru, lfu] {
            cache.set(1, "one".to_string());
            cache.get(&1);
            cache.set(2, "two".to_string());
            cache.set(3, "three".to_string());
            assert_eq!(cache.elements_count(), 2);

            match cache.policy().kind() {
                // 1 was accessed before 2 was inserted
                CachePolicy::Lru => assert!(!cache.contains(&1)),
                // 1 has frequency 2, 2 is the oldest at frequency 1
                CachePolicy::Lfu => assert!(!cache.contains(&2)),
            }
        }
    }

    #[test]
    fn builder_carries_options() {
        let builder = CacheBuilder::from_options(CacheOptions {
            capacity: 512,
            max_elements: 4,
        })
        .policy(CachePolicy::Lfu);
        let cache = builder.build::<&str, Vec<u8>>();
        assert_eq!(cache.capacity(), 512);
        assert_eq!(cache.max_elements(), 4);
        assert_eq!(AnyPolicy::<u8>::from(CachePolicy::Lfu).name(), "lfu");
    }
}
