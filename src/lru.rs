//! Least Recently Used (LRU) Cache Implementation
//!
//! An LRU cache evicts the least recently accessed item when capacity is
//! reached. This implementation provides O(1) time complexity for all
//! operations using a hash map combined with a doubly-linked list.
//!
//! ## Data Structure
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        LRU Cache                                │
//! │                                                                 │
//! │  HashMap<K, *Node>          Doubly-Linked List                  │
//! │  ┌──────────────┐          ┌──────────────────────────────┐     │
//! │  │ "apple" ──────────────▶ │ MRU ◀──▶ ... ◀──▶ LRU        │     │
//! │  │ "banana" ─────────────▶ │  ▲                    │      │     │
//! │  │ "cherry" ─────────────▶ │  │                    ▼      │     │
//! │  └──────────────┘          │ head              tail       │     │
//! │                            └──────────────────────────────┘     │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **HashMap**: O(1) key lookup, storing pointers to list nodes
//! - **Doubly-Linked List**: access order (most recent at head, least
//!   recent at tail)
//!
//! | Operation | Action | Time |
//! |-----------|--------|------|
//! | `get(key)` | Move accessed node to head (MRU position) | O(1) |
//! | `put(key, value)` | Insert at head, evict from tail if full | O(1) |
//! | `remove(key)` | Unlink node from list, remove from map | O(1) |
//!
//! # Thread Safety
//!
//! `LruCache` is **not thread-safe**. Wrap it with a `Mutex` or `RwLock`
//! for concurrent access.
//!
//! # Examples
//!
//! ```
//! use cache_policies::LruCache;
//! use core::num::NonZeroUsize;
//!
//! let mut cache = LruCache::new(NonZeroUsize::new(3).unwrap());
//!
//! cache.put("a", 1);
//! cache.put("b", 2);
//! cache.put("c", 3);
//!
//! assert_eq!(cache.get(&"a"), Some(&1));  // "a" is now MRU
//!
//! cache.put("d", 4);  // Evicts "b" (LRU)
//! assert_eq!(cache.get(&"b"), None);
//! ```

extern crate alloc;

use crate::config::LruCacheConfig;
use crate::list::{List, ListEntry};
use alloc::boxed::Box;
use core::borrow::Borrow;
use core::hash::{BuildHasher, Hash};
use core::mem;
use core::num::NonZeroUsize;

#[cfg(feature = "hashbrown")]
use hashbrown::hash_map::DefaultHashBuilder;
#[cfg(feature = "hashbrown")]
use hashbrown::HashMap;

#[cfg(not(feature = "hashbrown"))]
use std::collections::hash_map::RandomState as DefaultHashBuilder;
#[cfg(not(feature = "hashbrown"))]
use std::collections::HashMap;

/// Internal LRU segment containing the actual cache algorithm.
///
/// This is shared between [`LruCache`] (one segment) and
/// [`SlruCache`](crate::SlruCache) (a probationary and a protected
/// segment). All list and index bookkeeping lives here; the wrappers only
/// decide when an access moves an entry between segments.
///
/// Each segment owns its own index, so an entry spliced into another
/// segment changes hands completely: node, index slot and eviction
/// responsibility.
///
/// # Safety
///
/// The raw pointers in `map` are always valid as long as:
/// - the pointer was obtained from this segment's `list`
/// - the node has not been removed from the list
/// - the segment has not been dropped
pub(crate) struct LruSegment<K, V, S = DefaultHashBuilder> {
    cap: NonZeroUsize,
    list: List<(K, V)>,
    map: HashMap<K, *mut ListEntry<(K, V)>, S>,
}

// SAFETY: LruSegment owns all data and raw pointers point only to nodes
// owned by `list`. Concurrent access is safe when wrapped in proper
// synchronization primitives.
unsafe impl<K: Send, V: Send, S: Send> Send for LruSegment<K, V, S> {}

// SAFETY: All mutation requires &mut self; shared references cannot cause
// data races.
unsafe impl<K: Send, V: Send, S: Sync> Sync for LruSegment<K, V, S> {}

impl<K: Hash + Eq, V, S: BuildHasher> LruSegment<K, V, S> {
    pub(crate) fn with_hasher(cap: NonZeroUsize, hash_builder: S) -> Self {
        let map_capacity = cap.get().next_power_of_two();
        LruSegment {
            cap,
            list: List::new(cap),
            map: HashMap::with_capacity_and_hasher(map_capacity, hash_builder),
        }
    }

    #[inline]
    pub(crate) fn cap(&self) -> NonZeroUsize {
        self.cap
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.map.len()
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Returns true if the segment holds more entries than its capacity.
    ///
    /// Splicing in a node from another segment can push a segment one over
    /// its budget; the caller rebalances when this reports true.
    #[inline]
    pub(crate) fn exceeds_cap(&self) -> bool {
        self.map.len() > self.cap.get()
    }

    /// Looks up the node for a key without touching the access order.
    pub(crate) fn find<Q>(&self, key: &Q) -> Option<*mut ListEntry<(K, V)>>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.map.get(key).copied()
    }

    /// Moves an entry to the MRU position.
    ///
    /// # Safety
    ///
    /// `node` must be a valid node in this segment's list.
    #[inline]
    pub(crate) unsafe fn touch(&mut self, node: *mut ListEntry<(K, V)>) {
        self.list.move_to_front(node);
    }

    pub(crate) fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let node = self.map.get(key).copied()?;
        unsafe {
            // SAFETY: node comes from our map
            self.list.move_to_front(node);
            Some(&(*node).get_value().1)
        }
    }

    pub(crate) fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let node = self.map.get(key).copied()?;
        unsafe {
            // SAFETY: node comes from our map
            self.list.move_to_front(node);
            Some(&mut (*node).get_value_mut().1)
        }
    }

    pub(crate) fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let node = self.map.remove(key)?;
        // SAFETY: node comes from our map and is still linked into the list
        let entry = unsafe { self.list.remove(node) }?;
        let entry = *entry;
        // SAFETY: entry is a non-sigil node
        Some(unsafe { entry.into_value() }.1)
    }

    pub(crate) fn clear(&mut self) {
        self.map.clear();
        self.list.clear();
    }
}

impl<K: Hash + Eq + Clone, V, S: BuildHasher> LruSegment<K, V, S> {
    /// Inserts a key-value pair.
    ///
    /// An existing key is updated in place and moved to the MRU position;
    /// the previous pair is returned. A new key is inserted at the head and
    /// the LRU entry is evicted and returned if the segment overflows.
    pub(crate) fn put(&mut self, key: K, value: V) -> Option<(K, V)> {
        if let Some(&node) = self.map.get(&key) {
            unsafe {
                // SAFETY: node comes from our map
                self.list.move_to_front(node);
                let old = mem::replace(&mut (*node).get_value_mut().1, value);
                return Some((key, old));
            }
        }

        let node = self.list.add_unchecked((key.clone(), value));
        self.map.insert(key, node);

        if self.exceeds_cap() {
            self.evict_lru()
        } else {
            None
        }
    }

    /// Removes and returns the LRU entry.
    pub(crate) fn evict_lru(&mut self) -> Option<(K, V)> {
        let entry = self.list.remove_last()?;
        let entry = *entry;
        // SAFETY: entry is a non-sigil node
        let (key, value) = unsafe { entry.into_value() };
        self.map.remove(&key);
        Some((key, value))
    }

    /// Splices an entry out of this segment and into the head of `dest`.
    ///
    /// Both indexes are updated; the node keeps its address, which is also
    /// returned.
    ///
    /// # Safety
    ///
    /// `node` must be a valid node in this segment's list.
    pub(crate) unsafe fn move_node_into(
        &mut self,
        node: *mut ListEntry<(K, V)>,
        dest: &mut Self,
    ) -> *mut ListEntry<(K, V)> {
        let key = (*node).get_value().0.clone();
        self.map.remove(&key);

        let entry = self
            .list
            .remove(node)
            .expect("node should exist in the source segment");
        let raw = Box::into_raw(entry);

        dest.list.attach_from_other_list(raw);
        dest.map.insert(key, raw);

        raw
    }

    /// Splices this segment's LRU entry into the head of `dest`.
    pub(crate) fn move_lru_into(&mut self, dest: &mut Self) {
        if let Some(node) = self.list.back() {
            // SAFETY: node is the tail of our own list
            unsafe {
                self.move_node_into(node, dest);
            }
        }
    }
}

impl<K, V, S> core::fmt::Debug for LruSegment<K, V, S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LruSegment")
            .field("capacity", &self.cap)
            .field("len", &self.map.len())
            .finish()
    }
}

/// A Least Recently Used (LRU) cache with O(1) operations.
///
/// Maintains items in order of access recency. When capacity is reached,
/// the least recently accessed item is evicted to make room for new
/// entries.
///
/// # Type Parameters
///
/// - `K`: Key type. Must implement `Hash + Eq`; insertion also needs
///   `Clone` because the key is stored in both the index and the list node.
/// - `V`: Value type. Moved in on insertion and out on removal.
/// - `S`: Hash builder type. Defaults to `DefaultHashBuilder`.
///
/// # Example
///
/// ```
/// use cache_policies::LruCache;
/// use core::num::NonZeroUsize;
///
/// let mut cache = LruCache::new(NonZeroUsize::new(2).unwrap());
///
/// cache.put("apple", 1);
/// cache.put("banana", 2);
/// assert_eq!(cache.get(&"apple"), Some(&1));
///
/// // "banana" is now LRU, so it gets evicted
/// cache.put("cherry", 3);
/// assert_eq!(cache.get(&"banana"), None);
/// ```
pub struct LruCache<K, V, S = DefaultHashBuilder> {
    segment: LruSegment<K, V, S>,
}

impl<K: Hash + Eq, V, S: BuildHasher> LruCache<K, V, S> {
    /// Creates a new LRU cache with a custom hash builder.
    pub fn with_hasher(cap: NonZeroUsize, hash_builder: S) -> Self {
        Self {
            segment: LruSegment::with_hasher(cap, hash_builder),
        }
    }

    /// Returns the maximum number of entries the cache can hold.
    #[inline]
    pub fn cap(&self) -> NonZeroUsize {
        self.segment.cap()
    }

    /// Returns the current number of entries in the cache.
    #[inline]
    pub fn len(&self) -> usize {
        self.segment.len()
    }

    /// Returns `true` if the cache contains no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.segment.is_empty()
    }

    /// Retrieves a reference to the value for the given key.
    ///
    /// If the key exists, it is moved to the most-recently-used (MRU)
    /// position. Returns `None` if the key is not present.
    #[inline]
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.segment.get(key)
    }

    /// Retrieves a mutable reference to the value for the given key.
    ///
    /// If the key exists, it is moved to the MRU position.
    #[inline]
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.segment.get_mut(key)
    }

    /// Removes a key from the cache.
    ///
    /// Returns the value if the key was present, `None` otherwise.
    /// Removing a missing key is a no-op.
    #[inline]
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.segment.remove(key)
    }

    /// Removes all entries from the cache.
    #[inline]
    pub fn clear(&mut self) {
        self.segment.clear()
    }
}

impl<K: Hash + Eq + Clone, V, S: BuildHasher> LruCache<K, V, S> {
    /// Inserts a key-value pair into the cache.
    ///
    /// If the key already exists, the value is updated and the entry moves
    /// to the MRU position; the old pair is returned. If the cache is at
    /// capacity, the least recently used entry is evicted and returned.
    ///
    /// # Example
    ///
    /// ```
    /// use cache_policies::LruCache;
    /// use core::num::NonZeroUsize;
    ///
    /// let mut cache = LruCache::new(NonZeroUsize::new(2).unwrap());
    ///
    /// assert_eq!(cache.put("a", 1), None);            // New entry
    /// assert_eq!(cache.put("b", 2), None);            // New entry
    /// assert_eq!(cache.put("a", 10), Some(("a", 1))); // Update existing
    /// assert_eq!(cache.put("c", 3), Some(("b", 2)));  // Evicts "b"
    /// ```
    #[inline]
    pub fn put(&mut self, key: K, value: V) -> Option<(K, V)> {
        self.segment.put(key, value)
    }
}

impl<K: Hash + Eq, V> LruCache<K, V> {
    /// Creates a new LRU cache holding at most `cap` entries.
    ///
    /// # Example
    ///
    /// ```
    /// use cache_policies::LruCache;
    /// use core::num::NonZeroUsize;
    ///
    /// let mut cache = LruCache::new(NonZeroUsize::new(100).unwrap());
    /// cache.put("key", "value");
    /// ```
    pub fn new(cap: NonZeroUsize) -> LruCache<K, V, DefaultHashBuilder> {
        let config = LruCacheConfig::new(cap);
        LruCache::with_hasher(config.capacity(), DefaultHashBuilder::default())
    }
}

impl<K, V, S> core::fmt::Debug for LruCache<K, V, S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LruCache")
            .field("segment", &self.segment)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::String;

    #[test]
    fn test_lru_get_put() {
        let mut cache = LruCache::new(NonZeroUsize::new(2).unwrap());
        assert_eq!(cache.put("apple", 1), None);
        assert_eq!(cache.put("banana", 2), None);
        assert_eq!(cache.get(&"apple"), Some(&1));
        assert_eq!(cache.get(&"banana"), Some(&2));
        assert_eq!(cache.get(&"cherry"), None);
        assert_eq!(cache.put("apple", 3).unwrap().1, 1);
        assert_eq!(cache.get(&"apple"), Some(&3));
        assert_eq!(cache.put("cherry", 4).unwrap().1, 2);
        assert_eq!(cache.get(&"banana"), None);
        assert_eq!(cache.get(&"apple"), Some(&3));
        assert_eq!(cache.get(&"cherry"), Some(&4));
    }

    #[test]
    fn test_lru_eviction_sequence() {
        let mut cache = LruCache::new(NonZeroUsize::new(2).unwrap());
        cache.put(1, 1);
        cache.put(2, 2);
        assert_eq!(cache.get(&1), Some(&1));
        cache.put(3, 3);
        assert_eq!(cache.get(&2), None);
        cache.put(4, 4);
        assert_eq!(cache.get(&1), None);
        assert_eq!(cache.get(&3), Some(&3));
        assert_eq!(cache.get(&4), Some(&4));
    }

    #[test]
    fn test_lru_get_mut() {
        let mut cache = LruCache::new(NonZeroUsize::new(2).unwrap());
        cache.put("apple", 1);
        cache.put("banana", 2);
        if let Some(v) = cache.get_mut(&"apple") {
            *v = 3;
        }
        assert_eq!(cache.get(&"apple"), Some(&3));
        cache.put("cherry", 4);
        assert_eq!(cache.get(&"banana"), None);
        assert_eq!(cache.get(&"apple"), Some(&3));
        assert_eq!(cache.get(&"cherry"), Some(&4));
    }

    #[test]
    fn test_lru_remove() {
        let mut cache = LruCache::new(NonZeroUsize::new(2).unwrap());
        cache.put("apple", 1);
        cache.put("banana", 2);
        assert_eq!(cache.remove(&"apple"), Some(1));
        assert_eq!(cache.get(&"apple"), None);
        assert_eq!(cache.len(), 1);
        // Removing again is a no-op
        assert_eq!(cache.remove(&"apple"), None);
        assert_eq!(cache.remove(&"cherry"), None);
        let evicted = cache.put("cherry", 3);
        assert_eq!(evicted, None);
        assert_eq!(cache.get(&"banana"), Some(&2));
        assert_eq!(cache.get(&"cherry"), Some(&3));
    }

    #[test]
    fn test_lru_clear() {
        let mut cache = LruCache::new(NonZeroUsize::new(2).unwrap());
        cache.put("apple", 1);
        cache.put("banana", 2);
        assert_eq!(cache.len(), 2);
        cache.clear();
        assert_eq!(cache.len(), 0);
        assert!(cache.is_empty());
        cache.put("cherry", 3);
        assert_eq!(cache.get(&"cherry"), Some(&3));
    }

    #[test]
    fn test_lru_capacity_limits() {
        let mut cache = LruCache::new(NonZeroUsize::new(2).unwrap());
        cache.put("apple", 1);
        cache.put("banana", 2);
        cache.put("cherry", 3);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(&"apple"), None);
        assert_eq!(cache.get(&"banana"), Some(&2));
        assert_eq!(cache.get(&"cherry"), Some(&3));
    }

    #[test]
    fn test_lru_string_keys() {
        let mut cache = LruCache::new(NonZeroUsize::new(2).unwrap());
        let key1 = String::from("apple");
        let key2 = String::from("banana");
        cache.put(key1.clone(), 1);
        cache.put(key2.clone(), 2);
        assert_eq!(cache.get(&key1), Some(&1));
        assert_eq!(cache.get(&key2), Some(&2));
        // Borrowed lookups work without building a String
        assert_eq!(cache.get("apple"), Some(&1));
        assert_eq!(cache.get("banana"), Some(&2));
    }

    #[test]
    fn test_lru_non_clone_values() {
        // Values only need to be movable
        struct Opaque(u32);

        let mut cache = LruCache::new(NonZeroUsize::new(1).unwrap());
        cache.put("a", Opaque(1));
        let evicted = cache.put("b", Opaque(2)).unwrap();
        assert_eq!(evicted.0, "a");
        let removed = cache.remove(&"b").unwrap();
        assert_eq!(removed.0, 2);
    }

    #[test]
    fn test_lru_segment_directly() {
        let mut segment: LruSegment<&str, i32, DefaultHashBuilder> =
            LruSegment::with_hasher(NonZeroUsize::new(2).unwrap(), DefaultHashBuilder::default());
        assert_eq!(segment.len(), 0);
        assert!(segment.is_empty());
        assert_eq!(segment.cap().get(), 2);
        segment.put("a", 1);
        segment.put("b", 2);
        assert_eq!(segment.len(), 2);
        assert_eq!(segment.get(&"a"), Some(&1));
        assert_eq!(segment.get(&"b"), Some(&2));
    }

    #[test]
    fn test_lru_segment_splice_between_segments() {
        let mut src: LruSegment<&str, i32, DefaultHashBuilder> =
            LruSegment::with_hasher(NonZeroUsize::new(2).unwrap(), DefaultHashBuilder::default());
        let mut dest: LruSegment<&str, i32, DefaultHashBuilder> =
            LruSegment::with_hasher(NonZeroUsize::new(2).unwrap(), DefaultHashBuilder::default());

        src.put("a", 1);
        src.put("b", 2);

        let node = src.find(&"a").unwrap();
        unsafe {
            src.move_node_into(node, &mut dest);
        }
        assert_eq!(src.len(), 1);
        assert_eq!(dest.len(), 1);
        assert!(src.find(&"a").is_none());
        assert_eq!(dest.get(&"a"), Some(&1));

        src.move_lru_into(&mut dest);
        assert_eq!(src.len(), 0);
        assert_eq!(dest.len(), 2);
        assert_eq!(dest.get(&"b"), Some(&2));
    }

    #[test]
    fn test_lru_segment_exceeds_cap() {
        let mut a: LruSegment<&str, i32, DefaultHashBuilder> =
            LruSegment::with_hasher(NonZeroUsize::new(1).unwrap(), DefaultHashBuilder::default());
        let mut b: LruSegment<&str, i32, DefaultHashBuilder> =
            LruSegment::with_hasher(NonZeroUsize::new(1).unwrap(), DefaultHashBuilder::default());

        a.put("a", 1);
        b.put("b", 2);
        assert!(!b.exceeds_cap());

        a.move_lru_into(&mut b);
        assert!(b.exceeds_cap());
        assert_eq!(b.len(), 2);
    }

    #[test]
    fn test_lru_concurrent_access() {
        extern crate std;
        use std::sync::{Arc, Mutex};
        use std::thread;
        use std::vec::Vec;

        let cache = Arc::new(Mutex::new(LruCache::new(NonZeroUsize::new(100).unwrap())));
        let num_threads = 4;
        let ops_per_thread = 100;

        let mut handles: Vec<std::thread::JoinHandle<()>> = Vec::new();

        for t in 0..num_threads {
            let cache = Arc::clone(&cache);
            handles.push(thread::spawn(move || {
                for i in 0..ops_per_thread {
                    let key = std::format!("thread_{}_key_{}", t, i);
                    let mut guard = cache.lock().unwrap();
                    guard.put(key.clone(), t * 1000 + i);
                    let _ = guard.get(&key);
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        let mut guard = cache.lock().unwrap();
        assert!(guard.len() <= 100);
        assert!(!guard.is_empty());
        guard.clear();
    }
}
