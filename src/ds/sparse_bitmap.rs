//! Sparse paged bitmap.
//!
//! Bits are numbered from 1. Storage is an ordered map of fixed-size pages
//! that are allocated on the first `set` landing in them, so a bitmap with a
//! handful of bits far apart costs a handful of pages.
//!
//! ```text
//!   bit n  ──►  page id = (n - 1) / BITS_PER_PAGE
//!               offset  = (n - 1) % BITS_PER_PAGE
//!               byte    = offset / 8,  mask = 1 << (offset % 8)
//!
//!   pages: BTreeMap<page id, Page>
//!     ┌──────────┐   ┌──────────┐   ┌──────────┐
//!     │ id 0     │   │ id 3     │   │ id 41    │   (ids 1, 2, 4..40 never touched)
//!     │ ones 12  │   │ ones 1   │   │ ones 0   │ ◄── kept until gc() unless
//!     └──────────┘   └──────────┘   └──────────┘     auto_recycle dropped it
//! ```
//!
//! ## Example
//!
//! ```
//! use boundcache::ds::{BitmapOptions, SparseBitmap};
//!
//! let mut bitmap = SparseBitmap::new(BitmapOptions::default());
//! bitmap.set(10);
//! assert!(bitmap.test(10));
//! assert_eq!(bitmap.len(), 1);
//! assert_eq!(bitmap.capacity(), SparseBitmap::BITS_PER_PAGE);
//!
//! bitmap.clear(10);
//! assert_eq!(bitmap.resident_pages(), 0);
//! ```

use std::collections::BTreeMap;

use parking_lot::RwLock;

/// Size of one page in bytes.
pub const PAGE_SIZE: usize = 4096;

const BITS_PER_BYTE: usize = 8;

/// Behaviour switches for a [`SparseBitmap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BitmapOptions {
    /// Accept bits above `capacity`, allocating pages as needed.
    pub auto_expand: bool,
    /// Drop a page as soon as its last set bit is cleared.
    pub auto_recycle: bool,
    /// Highest accepted bit when `auto_expand` is off.
    pub capacity: usize,
}

impl Default for BitmapOptions {
    fn default() -> Self {
        Self {
            auto_expand: true,
            auto_recycle: true,
            capacity: 0,
        }
    }
}

impl BitmapOptions {
    pub fn new(capacity: usize, auto_expand: bool, auto_recycle: bool) -> Self {
        Self {
            auto_expand,
            auto_recycle,
            capacity,
        }
    }
}

#[derive(Debug)]
struct Page {
    bits: Box<[u8]>,
    ones: usize,
}

impl Page {
    fn new() -> Self {
        Self {
            bits: vec![0; PAGE_SIZE].into_boxed_slice(),
            ones: 0,
        }
    }
}

#[derive(Debug)]
pub struct SparseBitmap {
    pages: BTreeMap<usize, Page>,
    ones: usize,
    options: BitmapOptions,
}

impl SparseBitmap {
    /// Number of bits addressed by one page.
    pub const BITS_PER_PAGE: usize = PAGE_SIZE * BITS_PER_BYTE;

    pub fn new(options: BitmapOptions) -> Self {
        Self {
            pages: BTreeMap::new(),
            ones: 0,
            options,
        }
    }

    pub fn options(&self) -> BitmapOptions {
        self.options
    }

    /// Sets bit `n`. Returns `true` if the bit changed from 0 to 1.
    ///
    /// `n == 0` and, without auto-expand, `n > capacity` are ignored.
    pub fn set(&mut self, n: usize) -> bool {
        let Some((page_id, byte, mask)) = self.locate(n) else {
            return false;
        };
        let page = self.pages.entry(page_id).or_insert_with(Page::new);
        if page.bits[byte] & mask != 0 {
            return false;
        }
        page.bits[byte] |= mask;
        page.ones += 1;
        self.ones += 1;
        true
    }

    /// Clears bit `n`. Returns `true` if the bit changed from 1 to 0.
    pub fn clear(&mut self, n: usize) -> bool {
        let Some((page_id, byte, mask)) = self.locate(n) else {
            return false;
        };
        let Some(page) = self.pages.get_mut(&page_id) else {
            return false;
        };
        if page.bits[byte] & mask == 0 {
            return false;
        }
        page.bits[byte] &= !mask;
        page.ones -= 1;
        self.ones -= 1;

        if page.ones == 0 && self.options.auto_recycle {
            self.pages.remove(&page_id);
        }
        true
    }

    /// Returns whether bit `n` is set.
    pub fn test(&self, n: usize) -> bool {
        let Some((page_id, byte, mask)) = self.locate(n) else {
            return false;
        };
        self.pages
            .get(&page_id)
            .is_some_and(|page| page.bits[byte] & mask != 0)
    }

    /// Zeroes every resident page; the pages stay allocated.
    pub fn clear_all(&mut self) {
        for page in self.pages.values_mut() {
            page.bits.fill(0);
            page.ones = 0;
        }
        self.ones = 0;
    }

    /// Drops resident pages with no set bits; returns how many were freed.
    pub fn gc(&mut self) -> usize {
        let before = self.pages.len();
        self.pages.retain(|_, page| page.ones > 0);
        before - self.pages.len()
    }

    /// Number of set bits.
    pub fn len(&self) -> usize {
        self.ones
    }

    pub fn is_empty(&self) -> bool {
        self.ones == 0
    }

    /// How many bits the bitmap can address right now.
    ///
    /// Without auto-expand this is the configured capacity. Otherwise it
    /// covers every page up to the highest resident one, clamped to
    /// `usize::MAX` when that is the last addressable page.
    pub fn capacity(&self) -> usize {
        if !self.options.auto_expand {
            return self.options.capacity;
        }
        self.pages
            .last_key_value()
            .map_or(0, |(id, _)| (id + 1).saturating_mul(Self::BITS_PER_PAGE))
    }

    pub fn resident_pages(&self) -> usize {
        self.pages.len()
    }

    /// Iterates set bits in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.pages.iter().flat_map(|(id, page)| {
            let base = id * Self::BITS_PER_PAGE;
            page.bits
                .iter()
                .enumerate()
                .filter(|(_, byte)| **byte != 0)
                .flat_map(move |(idx, byte)| {
                    (0..BITS_PER_BYTE)
                        .filter(move |bit| byte & (1 << bit) != 0)
                        .map(move |bit| base + idx * BITS_PER_BYTE + bit + 1)
                })
        })
    }

    fn locate(&self, n: usize) -> Option<(usize, usize, u8)> {
        if n == 0 || (!self.options.auto_expand && n > self.options.capacity) {
            return None;
        }
        let offset = (n - 1) % Self::BITS_PER_PAGE;
        Some((
            (n - 1) / Self::BITS_PER_PAGE,
            offset / BITS_PER_BYTE,
            1 << (offset % BITS_PER_BYTE),
        ))
    }
}

impl Default for SparseBitmap {
    fn default() -> Self {
        Self::new(BitmapOptions::default())
    }
}

/// [`SparseBitmap`] behind a `parking_lot::RwLock`.
///
/// `test`, `len` and `capacity` take the read lock; mutations take the
/// write lock.
#[derive(Debug, Default)]
pub struct ConcurrentSparseBitmap {
    inner: RwLock<SparseBitmap>,
}

impl ConcurrentSparseBitmap {
    pub fn new(options: BitmapOptions) -> Self {
        Self {
            inner: RwLock::new(SparseBitmap::new(options)),
        }
    }

    pub fn set(&self, n: usize) -> bool {
        self.inner.write().set(n)
    }

    pub fn clear(&self, n: usize) -> bool {
        self.inner.write().clear(n)
    }

    pub fn test(&self, n: usize) -> bool {
        self.inner.read().test(n)
    }

    pub fn clear_all(&self) {
        self.inner.write().clear_all();
    }

    pub fn gc(&self) -> usize {
        self.inner.write().gc()
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.inner.read().capacity()
    }

    pub fn resident_pages(&self) -> usize {
        self.inner.read().resident_pages()
    }

    pub fn into_inner(self) -> SparseBitmap {
        self.inner.into_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_clear_and_capacity() {
        let mut bitmap = SparseBitmap::default();
        assert!(bitmap.set(10));
        assert_eq!(bitmap.len(), 1);
        assert_eq!(bitmap.capacity(), SparseBitmap::BITS_PER_PAGE);

        assert!(bitmap.clear(10));
        assert_eq!(bitmap.len(), 0);
        assert_eq!(bitmap.capacity(), 0);

        bitmap.set(10);
        bitmap.clear_all();
        assert_eq!(bitmap.capacity(), SparseBitmap::BITS_PER_PAGE);
        assert!(!bitmap.test(10));
        assert_eq!(bitmap.resident_pages(), 1);
    }

    #[test]
    fn sweep_then_gc_leaves_no_pages() {
        let mut bitmap = SparseBitmap::default();
        bitmap.set(10);
        bitmap.clear_all();

        for i in 1..150_000 {
            bitmap.set(i);
            assert!(bitmap.test(i), "{i} should be set");
            assert!(!bitmap.test(i + 1), "{} should not be set", i + 1);
        }
        assert_eq!(bitmap.len(), 149_999);

        for i in 1..150_000 {
            bitmap.clear(i);
            assert!(!bitmap.test(i), "{i} should be cleared");
        }

        bitmap.gc();
        assert_eq!(bitmap.capacity(), 0);
        assert_eq!(bitmap.len(), 0);
        assert_eq!(bitmap.resident_pages(), 0);
    }

    #[test]
    fn auto_expand_disabled_ignores_high_bits() {
        let mut bitmap = SparseBitmap::new(BitmapOptions::new(10, false, false));
        assert!(!bitmap.set(100));
        assert!(!bitmap.test(100));

        assert!(bitmap.set(4));
        assert!(bitmap.test(4));
        assert!(bitmap.set(10));
        assert_eq!(bitmap.capacity(), 10);
        assert_eq!(bitmap.len(), 2);
    }

    #[test]
    fn recycle_disabled_keeps_empty_pages_until_gc() {
        let mut bitmap = SparseBitmap::new(BitmapOptions::new(0, true, false));
        bitmap.set(1);
        bitmap.set(SparseBitmap::BITS_PER_PAGE + 1);
        bitmap.clear(1);
        assert_eq!(bitmap.resident_pages(), 2);
        assert_eq!(bitmap.gc(), 1);
        assert_eq!(bitmap.resident_pages(), 1);
        assert_eq!(bitmap.capacity(), 2 * SparseBitmap::BITS_PER_PAGE);
    }

    #[test]
    fn bit_zero_and_repeats_are_ignored() {
        let mut bitmap = SparseBitmap::default();
        assert!(!bitmap.set(0));
        assert!(!bitmap.test(0));
        assert!(!bitmap.clear(0));

        assert!(bitmap.set(7));
        assert!(!bitmap.set(7));
        assert_eq!(bitmap.len(), 1);
        assert!(!bitmap.clear(8));
        assert_eq!(bitmap.len(), 1);
    }

    #[test]
    fn page_boundaries() {
        let mut bitmap = SparseBitmap::default();
        let last = SparseBitmap::BITS_PER_PAGE;
        bitmap.set(last);
        assert_eq!(bitmap.resident_pages(), 1);
        bitmap.set(last + 1);
        assert_eq!(bitmap.resident_pages(), 2);
        assert_eq!(bitmap.iter().collect::<Vec<_>>(), vec![last, last + 1]);
    }

    #[test]
    fn highest_bit_is_addressable() {
        let mut bitmap = SparseBitmap::default();
        assert!(bitmap.set(usize::MAX));
        assert!(bitmap.test(usize::MAX));
        assert!(!bitmap.test(usize::MAX - 1));
        assert_eq!(bitmap.capacity(), usize::MAX);
        assert_eq!(bitmap.iter().collect::<Vec<_>>(), vec![usize::MAX]);

        assert!(bitmap.clear(usize::MAX));
        assert_eq!(bitmap.capacity(), 0);
    }

    #[test]
    fn concurrent_wrapper_shares_state() {
        use std::sync::Arc;
        use std::thread;

        let bitmap = Arc::new(ConcurrentSparseBitmap::new(BitmapOptions::default()));
        let handles: Vec<_> = (0..4)
            .map(|t| {
                let bitmap = Arc::clone(&bitmap);
                thread::spawn(move || {
                    for i in 0..1_000 {
                        bitmap.set(t * 1_000 + i + 1);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(bitmap.len(), 4_000);
        assert!(bitmap.test(4_000));
        assert!(!bitmap.test(4_001));
        bitmap.clear_all();
        assert!(bitmap.is_empty());
        assert_eq!(bitmap.gc(), 1);
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::BTreeSet;

    proptest! {
        /// Property: set bits and count match a set model
        #[cfg_attr(miri, ignore)]
        #[test]
        fn prop_matches_set_model(ops in prop::collection::vec((any::<bool>(), 1usize..100_000), 0..200)) {
            let mut bitmap = SparseBitmap::default();
            let mut model = BTreeSet::new();
            for (set, n) in ops {
                if set {
                    prop_assert_eq!(bitmap.set(n), model.insert(n));
                } else {
                    prop_assert_eq!(bitmap.clear(n), model.remove(&n));
                }
                prop_assert_eq!(bitmap.len(), model.len());
            }
            prop_assert_eq!(bitmap.iter().collect::<BTreeSet<_>>(), model);
        }
    }
}
