//! Cache configuration structures.
//!
//! Each cache algorithm has its own configuration struct. LRU and LFU only
//! need a capacity; SLRU and LIRS split their capacity between two internal
//! structures and therefore also offer ratio-based constructors that
//! validate the split and return a [`ConfigError`](crate::ConfigError) on
//! bad input.
//!
//! # Validation
//!
//! Count capacities use [`NonZeroUsize`](core::num::NonZeroUsize), so a
//! zero capacity is unrepresentable once a config exists. The fallible
//! `from_ratio` constructors reject:
//!
//! - a total capacity of zero,
//! - a ratio outside the open interval `(0, 1)` (including NaN),
//! - a split where either share rounds down to zero.
//!
//! # Examples
//!
//! ```
//! use cache_policies::config::{LruCacheConfig, SlruCacheConfig};
//! use core::num::NonZeroUsize;
//!
//! let lru = LruCacheConfig::new(NonZeroUsize::new(100).unwrap());
//! assert_eq!(lru.capacity().get(), 100);
//!
//! // 10 entries, 20% probationary
//! let slru = SlruCacheConfig::from_ratio(10, 0.2).unwrap();
//! assert_eq!(slru.probationary_capacity().get(), 2);
//! assert_eq!(slru.protected_capacity().get(), 8);
//! ```

pub mod lfu;
pub mod lirs;
pub mod lru;
pub mod slru;

pub use lfu::LfuCacheConfig;
pub use lirs::LirsCacheConfig;
pub use lru::LruCacheConfig;
pub use slru::SlruCacheConfig;
