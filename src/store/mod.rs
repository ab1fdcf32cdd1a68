//! Entry storage for the cache engine.
//!
//! The store owns values and their byte accounting; eviction order lives in
//! the policy. Each entry keeps the [`SlotId`](crate::ds::SlotId) of its
//! policy node so the two sides stay linked without a second lookup.

pub mod entry;

pub use entry::{CacheEntry, EntryStore};
