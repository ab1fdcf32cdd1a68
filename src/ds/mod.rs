pub mod frequency_buckets;
pub mod intrusive_list;
pub mod slot_arena;
pub mod sparse_bitmap;

pub use frequency_buckets::{BucketIter, FrequencyBuckets};
pub use intrusive_list::{IntrusiveList, IntrusiveListIter};
pub use slot_arena::{SlotArena, SlotId};
pub use sparse_bitmap::{BitmapOptions, ConcurrentSparseBitmap, SparseBitmap};
