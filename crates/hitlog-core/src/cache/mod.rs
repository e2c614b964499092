//! Partitioned response cache for offline access.
//!
//! This module provides the `CacheStorage` capability used by the cache
//! controller, along with two implementations:
//! - `MemoryCacheStorage`: in-process, used by tests and one-shot runs
//! - `DiskCacheStorage`: one JSON file per partition under the cache directory
//!
//! Partitions are named buckets of request/response pairs. Every entry records
//! when it was cached so status displays can show its age.

pub mod disk;
pub mod memory;
pub mod storage;

pub use disk::DiskCacheStorage;
pub use memory::MemoryCacheStorage;
pub use storage::{CacheEntry, CacheStorage, CachedData, MatchOptions, Partition, PartitionInfo};
