#![doc = include_str!("../README.md")]
//!
//! ---
//!
//! # Code Reference
//!
//! ## Common API
//!
//! All four caches share the same operation set:
//!
//! | Operation | Effect | Returns |
//! |-----------|--------|---------|
//! | `put(k, v)` | insert or update, evicting per policy | replaced or evicted pair |
//! | `get(&k)` | look up and touch per policy | `Option<&V>` |
//! | `get_mut(&k)` | look up and touch per policy | `Option<&mut V>` |
//! | `remove(&k)` | delete, no-op when absent | `Option<V>` |
//! | `len` / `is_empty` / `cap` / `clear` | observation and reset | |
//!
//! Lookups accept any borrowed form of the key (`Borrow<Q>`), so a
//! `LruCache<String, _>` can be queried with a `&str`. Values move into
//! the cache on insertion and out on removal or eviction; they are never
//! cloned.
//!
//! ## Construction
//!
//! LRU and LFU take a plain [`NonZeroUsize`](core::num::NonZeroUsize)
//! capacity. SLRU and LIRS split their capacity between two internal
//! structures and validate the split:
//!
//! ```
//! use cache_policies::{LirsCache, LruCache, SlruCache};
//! use cache_policies::config::SlruCacheConfig;
//! use core::num::NonZeroUsize;
//!
//! let lru: LruCache<u64, String> = LruCache::new(NonZeroUsize::new(100).unwrap());
//!
//! // Ratio constructors validate and can fail
//! let slru: SlruCache<u64, String> = SlruCache::with_ratio(100, 0.2).unwrap();
//! let lirs: LirsCache<u64, String> = LirsCache::with_ratio(100, 0.01).unwrap();
//!
//! // Or build the configuration explicitly
//! let config = SlruCacheConfig::from_capacity(100).unwrap();
//! let slru: SlruCache<u64, String> = SlruCache::new(config);
//! ```
//!
//! ## Modules
//!
//! - [`lru`]: Least Recently Used cache implementation
//! - [`slru`]: Segmented LRU cache implementation
//! - [`lfu`]: Least Frequently Used cache implementation
//! - [`lirs`]: Low Inter-reference Recency Set cache implementation
//! - [`config`]: Configuration structures for all cache algorithms
//! - [`error`]: The configuration error type

#![no_std]

extern crate alloc;

#[cfg(not(feature = "hashbrown"))]
extern crate std;

/// Doubly linked list with in-place editing and stable node addresses.
///
/// Internal infrastructure shared by all cache implementations. It exposes
/// unsafe raw pointer operations that require careful invariant
/// maintenance; use the cache types instead.
pub(crate) mod list;

/// Cache configuration structures.
pub mod config;

/// The configuration error type.
pub mod error;

/// Least Recently Used (LRU) cache implementation.
///
/// Evicts the entry that has gone unaccessed the longest.
pub mod lru;

/// Segmented LRU (SLRU) cache implementation.
///
/// Two coupled LRU segments; entries need a second hit to reach the
/// protected segment, which makes the cache scan-resistant.
pub mod slru;

/// Least Frequently Used (LFU) cache implementation.
///
/// O(1) LFU over a frequency-bucket list, with LRU tie-breaking inside
/// each bucket.
pub mod lfu;

/// Low Inter-reference Recency Set (LIRS) cache implementation.
///
/// Recency-stack based replacement with non-resident ghost entries,
/// generalized to support explicit deletion.
pub mod lirs;

// Re-export cache types
pub use lfu::LfuCache;
pub use lirs::LirsCache;
pub use lru::LruCache;
pub use slru::SlruCache;

// Re-export the error type
pub use error::ConfigError;
