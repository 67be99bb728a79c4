//! Segmented Least Recently Used Cache Implementation.
//!
//! The SLRU (Segmented LRU) cache divides the cache into two segments:
//! - Probationary segment: where new entries are initially placed
//! - Protected segment: where entries hit a second time are promoted to
//!
//! Promotion requires two hits: the insert and one further access (or a
//! second insert). One-shot keys therefore churn through the probationary
//! segment without ever displacing the warm working set in the protected
//! segment, which makes SLRU resistant to one-time scans.
//!
//! ## Entry movement
//!
//! ```text
//!            put (new key)                 second hit
//!  (absent) ──────────────▶ probationary ─────────────▶ protected
//!                                ▲                          │
//!                                └──── demotion on overflow ┘
//! ```
//!
//! The probationary segment evicts its own LRU entry when a new key
//! overflows it. When a promotion overflows the protected segment, the
//! protected LRU entry is demoted back to the head of the probationary
//! segment instead of being evicted.

extern crate alloc;

use crate::config::SlruCacheConfig;
use crate::error::ConfigError;
use crate::list::ListEntry;
use crate::lru::LruSegment;
use core::borrow::Borrow;
use core::hash::{BuildHasher, Hash};
use core::mem;

#[cfg(feature = "hashbrown")]
use hashbrown::hash_map::DefaultHashBuilder;

#[cfg(not(feature = "hashbrown"))]
use std::collections::hash_map::RandomState as DefaultHashBuilder;

/// An implementation of a Segmented Least Recently Used (SLRU) cache.
///
/// New entries go to the probationary segment; a second hit promotes an
/// entry to the protected segment. Each segment is an
/// [`LruSegment`](crate::lru) with its own index, and entries are spliced
/// between them without reallocation.
///
/// # Examples
///
/// ```
/// use cache_policies::SlruCache;
///
/// // Total capacity 10, of which 2 slots are probationary
/// let mut cache = SlruCache::with_ratio(10, 0.2).unwrap();
///
/// cache.put("a", 1);
/// cache.put("b", 2);
/// cache.put("c", 3);          // probationary overflow evicts "a"
/// assert_eq!(cache.get(&"a"), None);
///
/// assert_eq!(cache.get(&"b"), Some(&2));  // promoted to protected
/// cache.put("d", 4);
/// cache.put("e", 5);          // churns probationary, "b" survives
/// assert_eq!(cache.get(&"b"), Some(&2));
/// ```
pub struct SlruCache<K, V, S = DefaultHashBuilder> {
    config: SlruCacheConfig,

    /// Holds new and demoted entries; evicts on overflow.
    probationary: LruSegment<K, V, S>,

    /// Holds entries that have been hit at least twice.
    protected: LruSegment<K, V, S>,
}

impl<K: Hash + Eq, V, S: BuildHasher + Clone> SlruCache<K, V, S> {
    /// Creates a new SLRU cache with the given configuration and hash
    /// builder.
    pub fn with_hasher(config: SlruCacheConfig, hash_builder: S) -> Self {
        SlruCache {
            config,
            probationary: LruSegment::with_hasher(
                config.probationary_capacity(),
                hash_builder.clone(),
            ),
            protected: LruSegment::with_hasher(config.protected_capacity(), hash_builder),
        }
    }
}

impl<K: Hash + Eq, V, S: BuildHasher> SlruCache<K, V, S> {
    /// Returns the total number of key-value pairs the cache can hold.
    pub fn cap(&self) -> usize {
        self.config.capacity()
    }

    /// Returns the current number of key-value pairs in the cache.
    pub fn len(&self) -> usize {
        self.probationary.len() + self.protected.len()
    }

    /// Returns `true` if the cache contains no key-value pairs.
    pub fn is_empty(&self) -> bool {
        self.probationary.is_empty() && self.protected.is_empty()
    }

    /// Returns the number of entries currently in the probationary segment.
    pub fn probationary_len(&self) -> usize {
        self.probationary.len()
    }

    /// Returns the number of entries currently in the protected segment.
    pub fn protected_len(&self) -> usize {
        self.protected.len()
    }

    /// Removes a key from the cache, returning its value if present.
    ///
    /// Looks in the probationary segment first, then in the protected one.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.probationary
            .remove(key)
            .or_else(|| self.protected.remove(key))
    }

    /// Clears the cache, removing all key-value pairs.
    pub fn clear(&mut self) {
        self.probationary.clear();
        self.protected.clear();
    }
}

impl<K: Hash + Eq + Clone, V, S: BuildHasher> SlruCache<K, V, S> {
    /// Moves an entry from the probationary segment to the head of the
    /// protected segment, demoting the protected LRU entry back to
    /// probationary if the protected segment overflows.
    ///
    /// Returns the entry's node in its new home.
    ///
    /// # Safety
    ///
    /// `node` must be a valid node in the probationary segment.
    unsafe fn promote(&mut self, node: *mut ListEntry<(K, V)>) -> *mut ListEntry<(K, V)> {
        let node = self.probationary.move_node_into(node, &mut self.protected);

        if self.protected.exceeds_cap() {
            self.protected.move_lru_into(&mut self.probationary);
        }

        node
    }

    /// Returns a reference to the value corresponding to the key.
    ///
    /// A hit in the protected segment refreshes the entry's position. A hit
    /// in the probationary segment is the entry's second hit and promotes
    /// it to the protected segment.
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        if let Some(node) = self.protected.find(key) {
            unsafe {
                // SAFETY: node comes from the protected segment's map
                self.protected.touch(node);
                return Some(&(*node).get_value().1);
            }
        }

        let node = self.probationary.find(key)?;
        unsafe {
            // SAFETY: node comes from the probationary segment's map
            let node = self.promote(node);
            Some(&(*node).get_value().1)
        }
    }

    /// Returns a mutable reference to the value corresponding to the key.
    ///
    /// Promotion behaves exactly as in [`get`](Self::get).
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        if let Some(node) = self.protected.find(key) {
            unsafe {
                // SAFETY: node comes from the protected segment's map
                self.protected.touch(node);
                return Some(&mut (*node).get_value_mut().1);
            }
        }

        let node = self.probationary.find(key)?;
        unsafe {
            // SAFETY: node comes from the probationary segment's map
            let node = self.promote(node);
            Some(&mut (*node).get_value_mut().1)
        }
    }

    /// Inserts a key-value pair into the cache.
    ///
    /// A key already in the protected segment is updated in place. A key in
    /// the probationary segment counts this insert as its second hit and is
    /// promoted, then updated. A new key lands in the probationary segment,
    /// whose LRU entry is evicted and returned on overflow.
    pub fn put(&mut self, key: K, value: V) -> Option<(K, V)> {
        if let Some(node) = self.protected.find(&key) {
            unsafe {
                // SAFETY: node comes from the protected segment's map
                self.protected.touch(node);
                let old = mem::replace(&mut (*node).get_value_mut().1, value);
                return Some((key, old));
            }
        }

        if let Some(node) = self.probationary.find(&key) {
            unsafe {
                // SAFETY: node comes from the probationary segment's map
                let node = self.promote(node);
                let old = mem::replace(&mut (*node).get_value_mut().1, value);
                return Some((key, old));
            }
        }

        self.probationary.put(key, value)
    }
}

impl<K: Hash + Eq, V> SlruCache<K, V> {
    /// Creates a new SLRU cache from a validated configuration.
    pub fn new(config: SlruCacheConfig) -> SlruCache<K, V, DefaultHashBuilder> {
        SlruCache::with_hasher(config, DefaultHashBuilder::default())
    }

    /// Creates a new SLRU cache from a total capacity and a probationary
    /// ratio.
    ///
    /// The probationary segment receives `floor(capacity * probation_ratio)`
    /// slots and the protected segment the rest.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if `capacity` is zero, the ratio is not in
    /// `(0, 1)`, or either segment share rounds down to zero.
    pub fn with_ratio(
        capacity: usize,
        probation_ratio: f64,
    ) -> Result<SlruCache<K, V, DefaultHashBuilder>, ConfigError> {
        let config = SlruCacheConfig::from_ratio(capacity, probation_ratio)?;
        Ok(SlruCache::new(config))
    }
}

impl<K, V, S> core::fmt::Debug for SlruCache<K, V, S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SlruCache")
            .field("config", &self.config)
            .field("probationary", &self.probationary)
            .field("protected", &self.protected)
            .finish()
    }
}
