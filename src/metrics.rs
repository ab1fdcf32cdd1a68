//! Per-instance operation counters.
//!
//! Counters live inside the engine and are only touched under its lock, so
//! plain integers suffice. [`CacheMetrics`] is the copyable snapshot handed
//! out to callers.

/// Snapshot of a cache's counters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheMetrics {
    /// `get` calls that found the key.
    pub hits: u64,
    /// `get` calls that did not.
    pub misses: u64,
    /// `set` calls that created a new entry.
    pub inserts: u64,
    /// `set` calls that replaced an existing value.
    pub updates: u64,
    /// Entries removed by `delete`.
    pub removes: u64,
    /// Entries removed by capacity enforcement or `evict`.
    pub evictions: u64,
}

impl CacheMetrics {
    /// Fraction of `get` calls that hit, `0.0` before any lookup.
    pub fn hit_rate(&self) -> f64 {
        let lookups = self.hits + self.misses;
        if lookups == 0 {
            0.0
        } else {
            self.hits as f64 / lookups as f64
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct CacheCounters {
    hits: u64,
    misses: u64,
    inserts: u64,
    updates: u64,
    removes: u64,
    evictions: u64,
}

impl CacheCounters {
    pub(crate) fn snapshot(&self) -> CacheMetrics {
        CacheMetrics {
            hits: self.hits,
            misses: self.misses,
            inserts: self.inserts,
            updates: self.updates,
            removes: self.removes,
            evictions: self.evictions,
        }
    }

    pub(crate) fn inc_hit(&mut self) {
        self.hits += 1;
    }

    pub(crate) fn inc_miss(&mut self) {
        self.misses += 1;
    }

    pub(crate) fn inc_insert(&mut self) {
        self.inserts += 1;
    }

    pub(crate) fn inc_update(&mut self) {
        self.updates += 1;
    }

    pub(crate) fn inc_remove(&mut self) {
        self.removes += 1;
    }

    pub(crate) fn inc_eviction(&mut self) {
        self.evictions += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_reflects_counters() {
        let mut counters = CacheCounters::default();
        counters.inc_hit();
        counters.inc_hit();
        counters.inc_miss();
        counters.inc_insert();
        counters.inc_update();
        counters.inc_remove();
        counters.inc_eviction();

        let snapshot = counters.snapshot();
        assert_eq!(
            snapshot,
            CacheMetrics {
                hits: 2,
                misses: 1,
                inserts: 1,
                updates: 1,
                removes: 1,
                evictions: 1,
            }
        );
    }

    #[test]
    fn hit_rate_handles_no_lookups() {
        assert_eq!(CacheMetrics::default().hit_rate(), 0.0);

        let metrics = CacheMetrics {
            hits: 3,
            misses: 1,
            ..Default::default()
        };
        assert!((metrics.hit_rate() - 0.75).abs() < f64::EPSILON);
    }
}
