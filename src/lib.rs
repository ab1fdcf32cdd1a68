//! boundcache: byte- and count-bounded in-memory cache with pluggable LRU and
//! O(1) LFU eviction.
//!
//! The engine ([`engine::CacheCore`]) is generic over an
//! [`EvictionPolicy`](traits::EvictionPolicy) and keeps the entry store, the
//! policy's ordering structure and the capacity limits consistent across
//! every call. [`engine::SyncCache`] shares one engine between threads behind
//! a single lock; [`builder::CacheBuilder`] picks the policy at runtime.
//!
//! ```
//! use boundcache::prelude::*;
//!
//! let cache: LruCache<&str, Vec<u8>> =
//!     LruCache::new(CacheOptions::default().with_max_elements(2));
//! cache.set("k1", vec![1]);
//! cache.set("k2", vec![2]);
//! cache.set("k3", vec![3]);
//!
//! assert_eq!(cache.elements_count(), 2);
//! assert!(cache.get(&"k1").is_none());
//! ```
//!
//! The crate also carries two standalone helpers: a sparse paged bitmap
//! ([`ds::SparseBitmap`]) and a weighted round-robin selector
//! ([`scheduling::RoundRobin`]).

pub mod builder;
pub mod capacity;
pub mod ds;
pub mod engine;
pub mod error;
pub mod metrics;
pub mod options;
pub mod policy;
pub mod prelude;
pub mod scheduling;
pub mod store;
pub mod traits;
pub mod util;
