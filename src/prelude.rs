pub use crate::builder::{AnyPolicy, Cache, CacheBuilder, CachePolicy};
pub use crate::capacity::CapacityTracker;
pub use crate::ds::{
    BitmapOptions, ConcurrentSparseBitmap, FrequencyBuckets, IntrusiveList, SlotArena, SlotId,
    SparseBitmap,
};
pub use crate::engine::{CacheCore, LfuCache, LruCache, SyncCache};
pub use crate::error::{ConfigError, InvariantError};
pub use crate::metrics::CacheMetrics;
pub use crate::options::CacheOptions;
pub use crate::policy::{LfuPolicy, LruPolicy};
pub use crate::scheduling::{RoundRobin, Weight};
pub use crate::traits::{ConcurrentCache, EvictionPolicy, Weighted};
