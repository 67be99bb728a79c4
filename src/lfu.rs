//! Least Frequently Used Cache Implementation.
//!
//! The LFU (Least Frequently Used) cache evicts the least frequently
//! accessed item when the cache reaches capacity. The construction follows
//! the O(1) LFU scheme of Shah, Mishra and Matani
//! (<http://dhruvbird.com/lfu.pdf>): a doubly linked **frequency list**
//! whose nodes are sorted by strictly increasing frequency, where each
//! frequency node owns a doubly linked **bucket** of the entries that have
//! been accessed exactly that many times.
//!
//! ```text
//!  frequencies:  [ freq 1 ] ◀──▶ [ freq 3 ] ◀──▶ [ freq 7 ]
//!                    │               │               │
//!  buckets:        d, c             b               a
//!                 (newest           (each bucket is LRU-ordered)
//!                  at front)
//! ```
//!
//! Every entry back-references its frequency node, so a hit moves the
//! entry to the neighboring (or a freshly inserted) bucket in O(1). A
//! frequency node is unlinked the moment its bucket becomes empty, so the
//! list never holds an empty bucket and never holds two buckets with the
//! same frequency.
//!
//! The eviction victim is the least recently touched entry of the lowest
//! frequency bucket. Frequencies saturate at `usize::MAX`; once saturated,
//! further hits keep the entry in the highest bucket and only refresh its
//! position there.

extern crate alloc;

use crate::config::LfuCacheConfig;
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

/// A node of the frequency list: one frequency value and the bucket of
/// entries currently at that frequency.
struct FrequencyNode<K, V> {
    frequency: usize,
    /// Entries at this frequency, newest at the front. The LRU entry of
    /// the bucket is at the back.
    items: List<LfuEntry<K, V>>,
}

impl<K, V> FrequencyNode<K, V> {
    fn new(frequency: usize, bucket_cap: NonZeroUsize) -> Self {
        FrequencyNode {
            frequency,
            items: List::new(bucket_cap),
        }
    }
}

/// A cached entry together with the back-reference to the frequency node
/// whose bucket currently holds it.
struct LfuEntry<K, V> {
    key: K,
    value: V,
    bucket: *mut ListEntry<FrequencyNode<K, V>>,
}

/// An implementation of a Least Frequently Used (LFU) cache.
///
/// The cache counts one access for the insert and one for every further
/// `get`, `get_mut` or `put` on the key. Eviction removes the item with
/// the lowest access count; ties are broken by evicting the least recently
/// touched item within that frequency.
///
/// # Examples
///
/// ```
/// use cache_policies::LfuCache;
/// use core::num::NonZeroUsize;
///
/// let mut cache = LfuCache::new(NonZeroUsize::new(3).unwrap());
///
/// cache.put("a", 1);
/// cache.put("b", 2);
/// cache.put("c", 3);
///
/// // Raise the frequency of "a" and "b"
/// assert_eq!(cache.get(&"a"), Some(&1));
/// assert_eq!(cache.get(&"b"), Some(&2));
///
/// // "c" is the only entry left at frequency 1
/// cache.put("d", 4);
/// assert_eq!(cache.get(&"c"), None);
/// ```
pub struct LfuCache<K, V, S = DefaultHashBuilder> {
    config: LfuCacheConfig,

    /// Frequency nodes sorted by strictly increasing frequency from the
    /// front. Never contains an empty bucket.
    frequencies: List<FrequencyNode<K, V>>,

    /// Map from keys to their entry node. Entry nodes keep their address
    /// when spliced between buckets, so touches never invalidate the map.
    map: HashMap<K, *mut ListEntry<LfuEntry<K, V>>, S>,
}

// SAFETY: LfuCache owns all data and raw pointers point only to nodes
// owned by `frequencies` or the buckets inside it. Concurrent access is
// safe when wrapped in proper synchronization primitives.
unsafe impl<K: Send, V: Send, S: Send> Send for LfuCache<K, V, S> {}

// SAFETY: All mutation requires &mut self; shared references cannot cause
// data races.
unsafe impl<K: Send, V: Send, S: Sync> Sync for LfuCache<K, V, S> {}

impl<K: Hash + Eq, V, S: BuildHasher> LfuCache<K, V, S> {
    /// Creates a new LFU cache with the specified capacity and hash
    /// builder.
    pub fn with_hasher(cap: NonZeroUsize, hash_builder: S) -> Self {
        let config = LfuCacheConfig::new(cap);
        let map_capacity = config.capacity().get().next_power_of_two();
        LfuCache {
            config,
            frequencies: List::new(config.capacity()),
            map: HashMap::with_capacity_and_hasher(map_capacity, hash_builder),
        }
    }

    /// Returns the maximum number of key-value pairs the cache can hold.
    #[inline]
    pub fn cap(&self) -> NonZeroUsize {
        self.config.capacity()
    }

    /// Returns the current number of key-value pairs in the cache.
    #[inline]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns `true` if the cache contains no key-value pairs.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Returns the access count of a key without touching it.
    ///
    /// Diagnostic accessor; `get` is what callers should use to read
    /// values.
    pub fn frequency<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let node = self.map.get(key).copied()?;
        // SAFETY: node and its bucket back-reference come from our map
        unsafe { Some((*(*node).get_value().bucket).get_value().frequency) }
    }

    /// Moves an entry one frequency step up, reusing the successor bucket
    /// when its frequency matches and inserting a fresh bucket otherwise.
    ///
    /// At `usize::MAX` the entry stays put and only refreshes its position
    /// within the bucket.
    ///
    /// # Safety
    ///
    /// `node` must be a valid entry node reachable from our map.
    unsafe fn touch(&mut self, node: *mut ListEntry<LfuEntry<K, V>>) {
        let src = (*node).get_value().bucket;
        let src_frequency = (*src).get_value().frequency;
        let next_frequency = src_frequency.saturating_add(1);

        let dest = match self.frequencies.next(src) {
            None => {
                if next_frequency > src_frequency {
                    self.frequencies.add_after(
                        src,
                        FrequencyNode::new(next_frequency, self.config.capacity()),
                    )
                } else {
                    // Saturated: LRU within the highest bucket.
                    (*src).get_value_mut().items.move_to_front(node);
                    return;
                }
            }
            Some(succ) => {
                if (*succ).get_value().frequency == next_frequency {
                    succ
                } else {
                    self.frequencies.add_after(
                        src,
                        FrequencyNode::new(next_frequency, self.config.capacity()),
                    )
                }
            }
        };

        // Splice the entry to the front of the destination bucket. The
        // node allocation is reused, so its address and the map stay valid.
        let entry = (*src)
            .get_value_mut()
            .items
            .remove(node)
            .expect("entry should exist in its bucket");
        let raw = Box::into_raw(entry);
        (*dest).get_value_mut().items.attach_from_other_list(raw);
        (*raw).get_value_mut().bucket = dest;

        if (*src).get_value().items.is_empty() {
            let _ = self.frequencies.remove(src);
        }
    }

    /// Returns a reference to the value corresponding to the key.
    ///
    /// A hit counts as one access and raises the entry's frequency.
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let node = self.map.get(key).copied()?;
        unsafe {
            // SAFETY: node comes from our map
            self.touch(node);
            Some(&(*node).get_value().value)
        }
    }

    /// Returns a mutable reference to the value corresponding to the key.
    ///
    /// A hit counts as one access and raises the entry's frequency.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let node = self.map.get(key).copied()?;
        unsafe {
            // SAFETY: node comes from our map
            self.touch(node);
            Some(&mut (*node).get_value_mut().value)
        }
    }

    /// Removes a key from the cache, returning the value if it was
    /// present.
    ///
    /// The bucket is unlinked from the frequency list if this was its last
    /// entry.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let node = self.map.remove(key)?;
        unsafe {
            // SAFETY: node and its bucket back-reference come from our map
            let bucket = (*node).get_value().bucket;
            let entry = (*bucket).get_value_mut().items.remove(node)?;
            let entry = *entry;
            let entry = entry.into_value();

            if (*bucket).get_value().items.is_empty() {
                let _ = self.frequencies.remove(bucket);
            }

            Some(entry.value)
        }
    }

    /// Clears the cache, removing all key-value pairs.
    pub fn clear(&mut self) {
        self.map.clear();
        self.frequencies.clear();
    }

    /// Removes and returns the eviction victim: the least recently touched
    /// entry of the lowest frequency bucket.
    fn evict(&mut self) -> Option<(K, V)> {
        let bucket = self.frequencies.front()?;
        unsafe {
            // SAFETY: bucket is the head of the frequency list and, by
            // invariant, non-empty
            let entry = (*bucket).get_value_mut().items.remove_last()?;
            let entry = *entry;
            let entry = entry.into_value();
            self.map.remove(&entry.key);

            if (*bucket).get_value().items.is_empty() {
                let _ = self.frequencies.remove(bucket);
            }

            Some((entry.key, entry.value))
        }
    }

    /// Returns the frequency-1 bucket at the head of the frequency list,
    /// creating it if the head holds a higher frequency.
    fn first_bucket(&mut self) -> *mut ListEntry<FrequencyNode<K, V>> {
        if let Some(front) = self.frequencies.front() {
            // SAFETY: front is a valid node of the frequency list
            if unsafe { (*front).get_value().frequency } == 1 {
                return front;
            }
        }
        self.frequencies
            .add_unchecked(FrequencyNode::new(1, self.config.capacity()))
    }
}

impl<K: Hash + Eq + Clone, V, S: BuildHasher> LfuCache<K, V, S> {
    /// Inserts a key-value pair into the cache.
    ///
    /// An existing key keeps its history: the insert counts as one access
    /// and the value is overwritten; the old pair is returned. A new key is
    /// admitted at frequency 1 after evicting the least frequently used
    /// entry if the cache is full; the evicted pair is returned.
    pub fn put(&mut self, key: K, value: V) -> Option<(K, V)> {
        if let Some(&node) = self.map.get(&key) {
            unsafe {
                // SAFETY: node comes from our map
                self.touch(node);
                let old = mem::replace(&mut (*node).get_value_mut().value, value);
                return Some((key, old));
            }
        }

        let mut evicted = None;
        if self.len() >= self.config.capacity().get() {
            evicted = self.evict();
        }

        let bucket = self.first_bucket();
        // SAFETY: bucket is a valid frequency node owned by `frequencies`
        unsafe {
            let node = (*bucket).get_value_mut().items.add_unchecked(LfuEntry {
                key: key.clone(),
                value,
                bucket,
            });
            self.map.insert(key, node);
        }

        evicted
    }
}

impl<K: Hash + Eq, V> LfuCache<K, V> {
    /// Creates a new LFU cache with the specified capacity.
    ///
    /// # Examples
    ///
    /// ```
    /// use cache_policies::LfuCache;
    /// use core::num::NonZeroUsize;
    ///
    /// let cache: LfuCache<&str, u32> = LfuCache::new(NonZeroUsize::new(10).unwrap());
    /// ```
    pub fn new(cap: NonZeroUsize) -> LfuCache<K, V, DefaultHashBuilder> {
        LfuCache::with_hasher(cap, DefaultHashBuilder::default())
    }
}

impl<K, V, S> core::fmt::Debug for LfuCache<K, V, S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LfuCache")
            .field("capacity", &self.config.capacity())
            .field("len", &self.map.len())
            .field("buckets", &self.frequencies.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    extern crate std;
    use std::string::ToString;

    use super::*;
    use alloc::string::String;

    #[test]
    fn test_lfu_basic() {
        let mut cache = LfuCache::new(NonZeroUsize::new(3).unwrap());

        assert_eq!(cache.put("a", 1), None);
        assert_eq!(cache.put("b", 2), None);
        assert_eq!(cache.put("c", 3), None);

        // Raise frequencies: "a" to 3, "b" to 2
        assert_eq!(cache.get(&"a"), Some(&1));
        assert_eq!(cache.get(&"a"), Some(&1));
        assert_eq!(cache.get(&"b"), Some(&2));

        // "c" is alone at frequency 1 and gets evicted
        let evicted = cache.put("d", 4);
        assert_eq!(evicted, Some(("c", 3)));

        assert_eq!(cache.get(&"a"), Some(&1));
        assert_eq!(cache.get(&"b"), Some(&2));
        assert_eq!(cache.get(&"d"), Some(&4));
        assert_eq!(cache.get(&"c"), None);
    }

    #[test]
    fn test_lfu_frequency_counting() {
        let mut cache = LfuCache::new(NonZeroUsize::new(3).unwrap());

        cache.put("a", 1);
        assert_eq!(cache.frequency(&"a"), Some(1)); // admission counts

        cache.get(&"a");
        assert_eq!(cache.frequency(&"a"), Some(2));

        cache.put("a", 10); // update counts as an access too
        assert_eq!(cache.frequency(&"a"), Some(3));

        cache.get_mut(&"a");
        assert_eq!(cache.frequency(&"a"), Some(4));

        assert_eq!(cache.frequency(&"missing"), None);
    }

    #[test]
    fn test_lfu_tie_break_is_lru_within_bucket() {
        let mut cache = LfuCache::new(NonZeroUsize::new(2).unwrap());

        cache.put("a", 1);
        cache.put("b", 2);
        // Both at frequency 2 now, "a" touched before "b"
        cache.get(&"a");
        cache.get(&"b");

        // The least recently touched entry of the tied bucket goes first
        let evicted = cache.put("c", 3);
        assert_eq!(evicted, Some(("a", 1)));
        assert_eq!(cache.get(&"b"), Some(&2));
    }

    #[test]
    fn test_lfu_eviction_sequence() {
        let mut cache = LfuCache::new(NonZeroUsize::new(2).unwrap());

        cache.put(1, 10);
        cache.put(2, 20);
        assert_eq!(cache.get(&1), Some(&10));

        // 2 is at frequency 1, 1 at frequency 2
        let evicted = cache.put(3, 30);
        assert_eq!(evicted, Some((2, 20)));
        assert_eq!(cache.get(&2), None);

        assert_eq!(cache.get(&3), Some(&30));
        assert_eq!(cache.get(&3), Some(&30));
        assert_eq!(cache.get(&1), Some(&10));

        // 1 and 3 tie at frequency 3; 3 entered the bucket first and is
        // the bucket's LRU entry, so it is the victim.
        let evicted = cache.put(4, 40);
        assert_eq!(evicted, Some((3, 30)));
        assert_eq!(cache.get(&3), None);
        assert_eq!(cache.get(&1), Some(&10));
        assert_eq!(cache.get(&4), Some(&40));
    }

    #[test]
    fn test_lfu_update_keeps_history() {
        let mut cache = LfuCache::new(NonZeroUsize::new(2).unwrap());

        cache.put("a", 1);
        cache.get(&"a"); // frequency 2

        let old = cache.put("a", 10); // frequency 3
        assert_eq!(old, Some(("a", 1)));

        cache.put("b", 2);
        // "b" is at frequency 1, so it is the victim, not "a"
        let evicted = cache.put("c", 3);
        assert_eq!(evicted.unwrap().0, "b");

        assert_eq!(cache.get(&"a"), Some(&10));
        assert_eq!(cache.get(&"c"), Some(&3));
        assert_eq!(cache.get(&"b"), None);
    }

    #[test]
    fn test_lfu_bucket_reuse_after_gap() {
        let mut cache = LfuCache::new(NonZeroUsize::new(2).unwrap());

        cache.put("a", 1);
        cache.get(&"a");
        cache.get(&"a"); // "a" at frequency 3

        cache.put("b", 2);
        cache.get(&"b"); // "b" at frequency 2, between 1 and 3

        cache.get(&"b"); // joins the existing frequency-3 bucket
        assert_eq!(cache.frequency(&"a"), Some(3));
        assert_eq!(cache.frequency(&"b"), Some(3));

        // Both tie at frequency 3; "a" entered the bucket first, so it is
        // the bucket's LRU entry and the victim.
        let evicted = cache.put("c", 3);
        assert_eq!(evicted.unwrap().0, "a");
        assert_eq!(cache.get(&"b"), Some(&2));
    }

    #[test]
    fn test_lfu_remove() {
        let mut cache = LfuCache::new(NonZeroUsize::new(3).unwrap());

        cache.put("a", 1);
        cache.put("b", 2);
        cache.put("c", 3);

        assert_eq!(cache.remove(&"b"), Some(2));
        assert_eq!(cache.remove(&"b"), None);

        assert_eq!(cache.get(&"a"), Some(&1));
        assert_eq!(cache.get(&"c"), Some(&3));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_lfu_remove_last_entry_of_bucket() {
        let mut cache = LfuCache::new(NonZeroUsize::new(3).unwrap());

        cache.put("a", 1);
        cache.get(&"a"); // only entry of the frequency-2 bucket
        assert_eq!(cache.remove(&"a"), Some(1));
        assert!(cache.is_empty());

        // New inserts start again from a fresh frequency-1 bucket
        cache.put("b", 2);
        assert_eq!(cache.frequency(&"b"), Some(1));
    }

    #[test]
    fn test_lfu_clear() {
        let mut cache = LfuCache::new(NonZeroUsize::new(3).unwrap());

        cache.put("a", 1);
        cache.put("b", 2);
        cache.get(&"a");

        assert_eq!(cache.len(), 2);
        cache.clear();
        assert_eq!(cache.len(), 0);
        assert!(cache.is_empty());

        cache.put("d", 4);
        assert_eq!(cache.get(&"d"), Some(&4));
        assert_eq!(cache.frequency(&"d"), Some(1));
    }

    #[test]
    fn test_lfu_get_mut() {
        let mut cache = LfuCache::new(NonZeroUsize::new(2).unwrap());

        cache.put("a", 1);
        if let Some(value) = cache.get_mut(&"a") {
            *value = 10;
        }
        assert_eq!(cache.get(&"a"), Some(&10));
    }

    #[test]
    fn test_lfu_complex_values() {
        let mut cache = LfuCache::new(NonZeroUsize::new(2).unwrap());

        #[derive(Debug, PartialEq)]
        struct ComplexValue {
            id: usize,
            data: String,
        }

        cache.put(
            "a",
            ComplexValue {
                id: 1,
                data: "a-data".to_string(),
            },
        );

        if let Some(value) = cache.get_mut(&"a") {
            value.id = 100;
            value.data = "a-modified".to_string();
        }

        let a = cache.get(&"a").unwrap();
        assert_eq!(a.id, 100);
        assert_eq!(a.data, "a-modified");
    }

    #[test]
    fn test_lfu_concurrent_access() {
        extern crate std;
        use std::sync::{Arc, Mutex};
        use std::thread;
        use std::vec::Vec;

        let cache = Arc::new(Mutex::new(LfuCache::new(NonZeroUsize::new(100).unwrap())));
        let num_threads = 4;
        let ops_per_thread = 100;

        let mut handles: Vec<std::thread::JoinHandle<()>> = Vec::new();

        for t in 0..num_threads {
            let cache = Arc::clone(&cache);
            handles.push(thread::spawn(move || {
                for i in 0..ops_per_thread {
                    let key = std::format!("key_{}_{}", t, i);
                    let mut guard = cache.lock().unwrap();
                    guard.put(key.clone(), i);
                    if i % 3 == 0 {
                        let _ = guard.get(&key);
                        let _ = guard.get(&key);
                    }
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        let mut guard = cache.lock().unwrap();
        assert!(guard.len() <= 100);
        guard.clear();
    }
}
