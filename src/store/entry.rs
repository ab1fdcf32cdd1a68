//! Keyed entry storage with byte accounting.
//!
//! [`EntryStore`] maps each key to a [`CacheEntry`]: the shared value, the
//! size captured when it was stored, and the [`SlotId`] of the key's node in
//! the active eviction policy. The running byte total is kept exact in
//! `u128` and reported clamped to `u64`.

use std::hash::Hash;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::ds::SlotId;
use crate::traits::Weighted;

/// One stored value plus its accounting and ordering back-reference.
#[derive(Debug)]
pub struct CacheEntry<V> {
    value: Arc<V>,
    size: u64,
    slot: SlotId,
}

impl<V> CacheEntry<V> {
    /// Shared handle to the stored value.
    pub fn value(&self) -> &Arc<V> {
        &self.value
    }

    /// Size captured when the value was stored.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Handle of this key's node in the active policy.
    pub fn slot(&self) -> SlotId {
        self.slot
    }

    pub fn into_value(self) -> Arc<V> {
        self.value
    }
}

/// Key → entry map that keeps a running byte total.
///
/// Every size is captured through [`Weighted::size`] on the way in and
/// subtracted again on the way out, so `total_size` never re-walks the map.
/// The sum of `u64` sizes can exceed `u64::MAX`; it is accumulated in `u128`
/// so that removals stay exact.
#[derive(Debug)]
pub struct EntryStore<K, V> {
    map: FxHashMap<K, CacheEntry<V>>,
    total_size: u128,
}

impl<K, V> EntryStore<K, V>
where
    K: Eq + Hash,
    V: Weighted,
{
    pub fn new() -> Self {
        Self {
            map: FxHashMap::default(),
            total_size: 0,
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            map: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            total_size: 0,
        }
    }

    /// Returns the accumulated declared size of all values, clamped to
    /// `u64::MAX`.
    pub fn total_size(&self) -> u64 {
        clamp_size(self.total_size)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.map.contains_key(key)
    }

    pub fn get(&self, key: &K) -> Option<&CacheEntry<V>> {
        self.map.get(key)
    }

    /// Stores a new entry. The key must not be present yet.
    pub fn insert(&mut self, key: K, value: Arc<V>, slot: SlotId) {
        let size = value.size();
        self.total_size += u128::from(size);
        let previous = self.map.insert(key, CacheEntry { value, size, slot });
        debug_assert!(previous.is_none(), "insert over a live entry");
    }

    /// Swaps the value of an existing entry, adjusting the byte total.
    ///
    /// Returns the previous value and the entry's policy slot. If the key is
    /// absent, `value` is handed back untouched.
    pub fn replace(&mut self, key: &K, value: Arc<V>) -> Result<(Arc<V>, SlotId), Arc<V>> {
        let Some(entry) = self.map.get_mut(key) else {
            return Err(value);
        };
        let size = value.size();
        self.total_size = self.total_size - u128::from(entry.size) + u128::from(size);
        entry.size = size;
        let old = std::mem::replace(&mut entry.value, value);
        Ok((old, entry.slot))
    }

    pub fn remove(&mut self, key: &K) -> Option<CacheEntry<V>> {
        let entry = self.map.remove(key)?;
        self.total_size -= u128::from(entry.size);
        Some(entry)
    }

    pub fn clear(&mut self) {
        self.map.clear();
        self.total_size = 0;
    }

    /// Recomputes the byte total from the stored sizes, clamped like
    /// [`total_size`](Self::total_size).
    pub fn computed_size(&self) -> u64 {
        clamp_size(self.map.values().map(|entry| u128::from(entry.size)).sum())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &CacheEntry<V>)> {
        self.map.iter()
    }
}

impl<K, V> Default for EntryStore<K, V>
where
    K: Eq + Hash,
    V: Weighted,
{
    fn default() -> Self {
        Self::new()
    }
}

fn clamp_size(total: u128) -> u64 {
    u64::try_from(total).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ds::SlotArena;

    fn slots(n: usize) -> Vec<SlotId> {
        let mut arena = SlotArena::new();
        (0..n).map(|i| arena.insert(i)).collect()
    }

    #[test]
    fn entry_store_tracks_size() {
        let ids = slots(2);
        let mut store = EntryStore::new();
        assert_eq!(store.total_size(), 0);

        store.insert("k1", Arc::new("aa".to_string()), ids[0]);
        assert_eq!(store.total_size(), 2);
        store.insert("k2", Arc::new("bbbb".to_string()), ids[1]);
        assert_eq!(store.total_size(), 6);
        assert_eq!(store.len(), 2);

        let removed = store.remove(&"k1").unwrap();
        assert_eq!(removed.size(), 2);
        assert_eq!(removed.slot(), ids[0]);
        assert_eq!(removed.into_value(), Arc::new("aa".to_string()));
        assert_eq!(store.total_size(), 4);
        assert!(store.remove(&"k1").is_none());
    }

    #[test]
    fn entry_store_replace_adjusts_size() {
        let ids = slots(1);
        let mut store = EntryStore::with_capacity(4);
        store.insert("k1", Arc::new(vec![0u8; 2]), ids[0]);

        let (old, slot) = store.replace(&"k1", Arc::new(vec![0u8; 10])).unwrap();
        assert_eq!(old.len(), 2);
        assert_eq!(slot, ids[0]);
        assert_eq!(store.total_size(), 10);
        assert_eq!(store.get(&"k1").map(CacheEntry::size), Some(10));

        assert!(store.replace(&"k1", Arc::new(Vec::new())).is_ok());
        assert_eq!(store.total_size(), 0);
        let rejected = store.replace(&"missing", Arc::new(vec![1])).unwrap_err();
        assert_eq!(*rejected, vec![1]);
        assert_eq!(store.computed_size(), store.total_size());
    }

    #[test]
    fn entry_store_clear_resets_total() {
        let ids = slots(3);
        let mut store = EntryStore::new();
        for (i, id) in ids.iter().enumerate() {
            store.insert(i, Arc::new(vec![0u8; 5]), *id);
        }
        assert_eq!(store.total_size(), 15);
        assert_eq!(store.iter().count(), 3);

        store.clear();
        assert!(store.is_empty());
        assert_eq!(store.total_size(), 0);
        assert!(!store.contains(&0));
    }

    #[derive(Debug)]
    struct Declared(u64);

    impl Weighted for Declared {
        fn size(&self) -> u64 {
            self.0
        }
    }

    #[test]
    fn entry_store_total_stays_exact_past_u64() {
        let ids = slots(2);
        let half = u64::MAX / 2 + 1;
        let mut store = EntryStore::new();
        store.insert("a", Arc::new(Declared(half)), ids[0]);
        store.insert("b", Arc::new(Declared(half)), ids[1]);
        assert_eq!(store.total_size(), u64::MAX);
        assert_eq!(store.computed_size(), u64::MAX);

        store.remove(&"a");
        assert_eq!(store.total_size(), half);
        assert_eq!(store.computed_size(), half);

        store.replace(&"b", Arc::new(Declared(u64::MAX))).unwrap();
        store.insert("a", Arc::new(Declared(1)), ids[0]);
        assert_eq!(store.total_size(), u64::MAX);
        store.remove(&"b");
        assert_eq!(store.total_size(), 1);
    }
}
