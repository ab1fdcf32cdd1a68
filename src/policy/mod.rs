//! Eviction policies.
//!
//! | Policy       | Structure                          | Victim                          |
//! |--------------|------------------------------------|---------------------------------|
//! | `LruPolicy`  | [`IntrusiveList`](crate::ds::IntrusiveList)         | Least recently accessed         |
//! | `LfuPolicy`  | [`FrequencyBuckets`](crate::ds::FrequencyBuckets)   | Oldest key at lowest frequency  |
//!
//! The runtime-selected variant lives in [`crate::builder::AnyPolicy`].

pub mod lfu;
pub mod lru;

pub use lfu::LfuPolicy;
pub use lru::LruPolicy;
