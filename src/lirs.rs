//! Low Inter-reference Recency Set (LIRS) Cache Implementation.
//!
//! LIRS ranks blocks by their inter-reference recency (IRR): the number of
//! distinct other blocks touched between two consecutive accesses to the
//! same block. Blocks with low IRR (**LIR**) own the bulk of the capacity;
//! blocks with high IRR (**HIR**) share a small resident buffer and are
//! the first to go. The implementation follows the original paper
//! (<http://web.cse.ohio-state.edu/hpcs/WWW/HTML/publications/papers/TR-02-6.pdf>),
//! generalized with a third, non-resident state so that explicit removal
//! keeps the recency history consistent.
//!
//! ## Structures
//!
//! Two LRU-style keyed queues:
//!
//! - **Stack S** holds the recency history: LIR blocks (value inline), HIR
//!   markers (a handle to the resident block in list Q) and non-resident
//!   ghosts (key only). Its bottom entry is always LIR; anything below the
//!   last LIR is pruned.
//! - **List Q** holds the resident HIR blocks, at most `hirs_capacity` of
//!   them, in recency order. Its LRU end is the eviction point of the
//!   whole cache.
//!
//! ## Per-key state machine
//!
//! ```text
//!                   admit (free LIR slot)
//!   (absent) ────────────────────────────────▶ LIR in S
//!                   admit (LIR slots taken)
//!   (absent) ────────────────────────────────▶ HIR marker in S + resident in Q
//!
//!   HIR marker ──access──▶ LIR (block moves from Q into S; the stack's
//!                           bottom LIR is demoted into Q if needed)
//!   ghost ──put──▶ LIR with the new value
//!   ghost ──get──▶ miss, no state change
//!   bottom LIR ──demotion──▶ resident HIR at the head of Q
//!   Q's LRU ──eviction──▶ ghost if its key is still in S, gone otherwise
//! ```
//!
//! A resident block whose stack entry was pruned lives on in list Q; a hit
//! on it re-enters the stack as a fresh HIR marker.
//!
//! ## Why ghosts
//!
//! After `remove`, the resident state of a key is gone but its
//! inter-reference history may still be valuable: a key that was hot until
//! a moment ago should not re-enter on probation like a stranger. Keeping
//! the stack entry as a valueless ghost preserves exactly that recency
//! information, and a later `put` on the ghost resurrects the key directly
//! as LIR.

extern crate alloc;

use crate::config::LirsCacheConfig;
use crate::error::ConfigError;
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

/// What a queue entry currently is, together with its payload.
///
/// The first three states appear only in stack S, `Resident` only in
/// list Q. A state change is a cheap in-place replacement; the entry node
/// itself is spliced between the queues without reallocation, so the
/// `Hir` handle into list Q stays valid for as long as the resident block
/// exists.
enum LirsState<K, V> {
    /// LIR block in stack S, value stored inline.
    Lir(V),
    /// HIR marker in stack S, pointing at the resident block in list Q.
    Hir(*mut ListEntry<LirsEntry<K, V>>),
    /// Non-resident ghost in stack S: key and recency only, no value.
    NonResident,
    /// Resident HIR block in list Q, value stored inline.
    Resident(V),
}

/// One entry of stack S or list Q.
struct LirsEntry<K, V> {
    key: K,
    state: LirsState<K, V>,
}

impl<K, V> LirsEntry<K, V> {
    /// Returns the value carried by a LIR or resident block.
    fn value(&self) -> Option<&V> {
        match &self.state {
            LirsState::Lir(v) | LirsState::Resident(v) => Some(v),
            _ => None,
        }
    }

    /// Mutable variant of [`value`](Self::value).
    fn value_mut(&mut self) -> Option<&mut V> {
        match &mut self.state {
            LirsState::Lir(v) | LirsState::Resident(v) => Some(v),
            _ => None,
        }
    }

    /// Consumes the entry, keeping only the value if it carried one.
    fn into_value(self) -> Option<V> {
        match self.state {
            LirsState::Lir(v) | LirsState::Resident(v) => Some(v),
            _ => None,
        }
    }
}

/// An LRU-style keyed queue: recency-ordered entries plus a key index.
///
/// Both stack S and list Q are instances of this. The capacity is not
/// enforced on insertion (stack S legitimately holds markers and ghosts
/// beyond its LIR share); `is_full` is the knob list Q is steered by.
struct LirsQueue<K, V, S> {
    cap: NonZeroUsize,
    list: List<LirsEntry<K, V>>,
    map: HashMap<K, *mut ListEntry<LirsEntry<K, V>>, S>,
}

impl<K: Hash + Eq, V, S: BuildHasher> LirsQueue<K, V, S> {
    fn with_hasher(cap: NonZeroUsize, hash_builder: S) -> Self {
        LirsQueue {
            cap,
            list: List::new(cap),
            map: HashMap::with_capacity_and_hasher(cap.get().next_power_of_two(), hash_builder),
        }
    }

    #[inline]
    fn len(&self) -> usize {
        self.map.len()
    }

    /// Holds at least `cap` entries. Only meaningful for list Q.
    #[inline]
    fn is_full(&self) -> bool {
        self.list.len() >= self.cap.get()
    }

    fn find<Q>(&self, key: &Q) -> Option<*mut ListEntry<LirsEntry<K, V>>>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.map.get(key).copied()
    }

    #[inline]
    fn back(&self) -> Option<*mut ListEntry<LirsEntry<K, V>>> {
        self.list.back()
    }

    /// Moves an entry to the MRU position.
    ///
    /// # Safety
    ///
    /// `node` must be a valid node in this queue's list.
    #[inline]
    unsafe fn touch(&mut self, node: *mut ListEntry<LirsEntry<K, V>>) {
        self.list.move_to_front(node);
    }

    /// Removes a node and returns its entry.
    ///
    /// # Safety
    ///
    /// `node` must be a valid node in this queue's list.
    unsafe fn remove_node(&mut self, node: *mut ListEntry<LirsEntry<K, V>>) -> LirsEntry<K, V> {
        let entry = self
            .list
            .remove(node)
            .expect("node should exist in the queue");
        let entry = *entry;
        let entry = entry.into_value();
        self.map.remove(&entry.key);
        entry
    }

    /// Unlinks a node from this queue without deallocating it, so another
    /// queue can adopt it.
    ///
    /// # Safety
    ///
    /// `node` must be a valid node in this queue's list. The caller must
    /// hand the returned pointer to `adopt_front` of some queue, or leak.
    unsafe fn detach_node(
        &mut self,
        node: *mut ListEntry<LirsEntry<K, V>>,
    ) -> *mut ListEntry<LirsEntry<K, V>> {
        self.map.remove(&(*node).get_value().key);
        let entry = self
            .list
            .remove(node)
            .expect("node should exist in the queue");
        Box::into_raw(entry)
    }

    fn clear(&mut self) {
        self.map.clear();
        self.list.clear();
    }
}

impl<K: Hash + Eq + Clone, V, S: BuildHasher> LirsQueue<K, V, S> {
    /// Inserts an entry at the MRU position and indexes it.
    fn push_front(&mut self, entry: LirsEntry<K, V>) -> *mut ListEntry<LirsEntry<K, V>> {
        let key = entry.key.clone();
        let node = self.list.add_unchecked(entry);
        self.map.insert(key, node);
        node
    }

    /// Adopts a node detached from the other queue at the MRU position.
    ///
    /// # Safety
    ///
    /// `node` must come from `detach_node` and not be linked anywhere.
    unsafe fn adopt_front(&mut self, node: *mut ListEntry<LirsEntry<K, V>>) {
        let key = (*node).get_value().key.clone();
        self.list.attach_from_other_list(node);
        self.map.insert(key, node);
    }
}

/// An implementation of a Low Inter-reference Recency Set (LIRS) cache.
///
/// Keys with short inter-reference gaps occupy the LIR share of the
/// capacity and are effectively shielded from eviction; everything else
/// competes for the small resident HIR buffer, whose LRU entry is the
/// eviction victim. This keeps one-time scans and long loops from flushing
/// the working set.
///
/// Removal is supported through non-resident ghost entries that preserve a
/// removed or evicted key's recency standing (see the module docs).
///
/// # Examples
///
/// ```
/// use cache_policies::LirsCache;
///
/// // capacity 3: 2 LIR slots, 1 resident HIR slot
/// let mut cache = LirsCache::with_ratio(3, 0.34).unwrap();
///
/// cache.put("a", 1);
/// cache.put("b", 2);   // "a" and "b" hold the LIR slots
/// cache.put("c", 3);   // "c" is a resident HIR block
///
/// assert_eq!(cache.get(&"a"), Some(&1));
/// cache.put("d", 4);   // "c" is evicted from the HIR buffer
/// assert_eq!(cache.get(&"c"), None);
/// ```
pub struct LirsCache<K, V, S = DefaultHashBuilder> {
    config: LirsCacheConfig,

    /// Recency stack: LIR blocks, HIR markers and ghosts. The bottom entry
    /// is always LIR.
    stack_s: LirsQueue<K, V, S>,

    /// Resident HIR blocks in recency order; its LRU end is the cache's
    /// eviction point.
    list_q: LirsQueue<K, V, S>,

    /// Number of LIR blocks currently in stack S. Never exceeds
    /// `config.lirs_capacity()`.
    lir_count: usize,
}

// SAFETY: LirsCache owns all data and raw pointers point only to nodes
// owned by `stack_s` or `list_q`. Concurrent access is safe when wrapped
// in proper synchronization primitives.
unsafe impl<K: Send, V: Send, S: Send> Send for LirsCache<K, V, S> {}

// SAFETY: All mutation requires &mut self; shared references cannot cause
// data races.
unsafe impl<K: Send, V: Send, S: Sync> Sync for LirsCache<K, V, S> {}

impl<K: Hash + Eq, V, S: BuildHasher + Clone> LirsCache<K, V, S> {
    /// Creates a new LIRS cache with the given configuration and hash
    /// builder.
    pub fn with_hasher(config: LirsCacheConfig, hash_builder: S) -> Self {
        LirsCache {
            config,
            stack_s: LirsQueue::with_hasher(config.lirs_capacity(), hash_builder.clone()),
            list_q: LirsQueue::with_hasher(config.hirs_capacity(), hash_builder),
            lir_count: 0,
        }
    }
}

impl<K: Hash + Eq, V, S: BuildHasher> LirsCache<K, V, S> {
    /// Returns the total number of resident entries the cache can hold.
    pub fn cap(&self) -> usize {
        self.config.capacity()
    }

    /// Returns the current number of resident entries.
    ///
    /// Non-resident ghosts track recency only and do not count.
    pub fn len(&self) -> usize {
        self.lir_count + self.list_q.len()
    }

    /// Returns `true` if the cache holds no resident entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes a key from the cache, returning its value if it was
    /// resident.
    ///
    /// Removing a ghost discards its recency history; removing a missing
    /// key is a no-op.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        if let Some(node) = self.stack_s.find(key) {
            unsafe {
                // SAFETY: node comes from the stack's map
                return match &(*node).get_value().state {
                    LirsState::Lir(_) => {
                        let entry = self.stack_s.remove_node(node);
                        self.lir_count -= 1;
                        entry.into_value()
                    }
                    LirsState::Hir(q_node) => {
                        let q_node = *q_node;
                        let entry = self.list_q.remove_node(q_node);
                        let _ = self.stack_s.remove_node(node);
                        entry.into_value()
                    }
                    LirsState::NonResident => {
                        let _ = self.stack_s.remove_node(node);
                        None
                    }
                    LirsState::Resident(_) => {
                        unreachable!("resident blocks live only in list Q")
                    }
                };
            }
        }

        // A resident block whose stack entry has been pruned.
        let node = self.list_q.find(key)?;
        // SAFETY: node comes from list Q's map
        let entry = unsafe { self.list_q.remove_node(node) };
        entry.into_value()
    }

    /// Clears the cache, removing all entries and ghosts.
    pub fn clear(&mut self) {
        self.stack_s.clear();
        self.list_q.clear();
        self.lir_count = 0;
    }

    /// Removes non-LIR entries from the bottom of stack S until an LIR
    /// block surfaces.
    ///
    /// A pruned HIR marker takes its resident block in list Q with it;
    /// both only described a key whose recency standing no longer earns it
    /// a place.
    fn prune(&mut self) {
        while let Some(tail) = self.stack_s.back() {
            unsafe {
                // SAFETY: tail is a valid node of the stack's list
                let q_node = match &(*tail).get_value().state {
                    LirsState::Lir(_) => break,
                    LirsState::Hir(q_node) => Some(*q_node),
                    LirsState::NonResident => None,
                    LirsState::Resident(_) => {
                        unreachable!("resident blocks live only in list Q")
                    }
                };
                if let Some(q_node) = q_node {
                    let _ = self.list_q.remove_node(q_node);
                }
                let _ = self.stack_s.remove_node(tail);
            }
        }
    }
}

impl<K: Hash + Eq + Clone, V, S: BuildHasher> LirsCache<K, V, S> {
    /// Returns a reference to the value corresponding to the key.
    ///
    /// A hit refreshes the key's recency. A hit on an HIR block promotes
    /// it to LIR; a hit on a ghost is a miss and leaves the ghost as it
    /// was.
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let node = self.access(key)?;
        // SAFETY: access returns a node that carries a value
        unsafe { (*node).get_value().value() }
    }

    /// Returns a mutable reference to the value corresponding to the key.
    ///
    /// State transitions are identical to [`get`](Self::get).
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let node = self.access(key)?;
        // SAFETY: access returns a node that carries a value
        unsafe { (*node).get_value_mut().value_mut() }
    }

    /// Performs the state transitions of a read access and returns the
    /// node now holding the key's value, or `None` on a miss.
    fn access<Q>(&mut self, key: &Q) -> Option<*mut ListEntry<LirsEntry<K, V>>>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        if let Some(node) = self.stack_s.find(key) {
            // SAFETY: node comes from the stack's map
            return unsafe { self.access_in_stack(node) };
        }

        let node = self.list_q.find(key)?;
        // SAFETY: node comes from list Q's map
        unsafe { self.access_in_queue(node) };
        Some(node)
    }

    /// Inserts a key-value pair into the cache.
    ///
    /// Returns the replaced pair when the key was already resident, the
    /// pair evicted from the resident HIR buffer when the insert forced an
    /// eviction, and `None` otherwise.
    pub fn put(&mut self, key: K, value: V) -> Option<(K, V)> {
        if let Some(node) = self.stack_s.find(&key) {
            // SAFETY: node comes from the stack's map
            return unsafe { self.put_in_stack(node, key, value) };
        }

        if let Some(node) = self.list_q.find(&key) {
            // SAFETY: node comes from list Q's map
            return unsafe { self.put_in_queue(node, key, value) };
        }

        self.insert_new(key, value)
    }

    /// Handles a read hit on a stack entry, returning the node now holding
    /// the value (after a possible promotion), or `None` for a ghost.
    ///
    /// # Safety
    ///
    /// `node` must be a valid node in stack S.
    unsafe fn access_in_stack(
        &mut self,
        node: *mut ListEntry<LirsEntry<K, V>>,
    ) -> Option<*mut ListEntry<LirsEntry<K, V>>> {
        match &(*node).get_value().state {
            LirsState::Lir(_) => {
                self.stack_s.touch(node);
                self.prune();
                Some(node)
            }
            LirsState::Hir(q_node) => {
                let q_node = *q_node;
                let node = self.promote(node, q_node);
                if self.lir_count > self.config.lirs_capacity().get() {
                    self.demote_lru_lir();
                }
                self.prune();
                Some(node)
            }
            LirsState::NonResident => None,
            LirsState::Resident(_) => unreachable!("resident blocks live only in list Q"),
        }
    }

    /// Handles a read hit on a resident block whose stack entry has been
    /// pruned: the key re-enters the stack as a fresh HIR marker.
    ///
    /// # Safety
    ///
    /// `node` must be a valid node in list Q.
    unsafe fn access_in_queue(&mut self, node: *mut ListEntry<LirsEntry<K, V>>) {
        let key = (*node).get_value().key.clone();
        self.stack_s.push_front(LirsEntry {
            key,
            state: LirsState::Hir(node),
        });
        self.list_q.touch(node);
    }

    /// Handles a `put` on a key present in stack S.
    ///
    /// # Safety
    ///
    /// `node` must be a valid node in stack S.
    unsafe fn put_in_stack(
        &mut self,
        node: *mut ListEntry<LirsEntry<K, V>>,
        key: K,
        value: V,
    ) -> Option<(K, V)> {
        match &mut (*node).get_value_mut().state {
            LirsState::Lir(current) => {
                let old = mem::replace(current, value);
                self.stack_s.touch(node);
                self.prune();
                Some((key, old))
            }
            LirsState::Hir(q_node) => {
                let q_node = *q_node;
                let node = self.promote(node, q_node);
                let old = match &mut (*node).get_value_mut().state {
                    LirsState::Lir(current) => mem::replace(current, value),
                    _ => unreachable!("promotion produces a LIR block"),
                };
                if self.lir_count > self.config.lirs_capacity().get() {
                    self.demote_lru_lir();
                }
                self.prune();
                Some((key, old))
            }
            LirsState::NonResident => {
                // Ghost hit: the key's recency standing admits it straight
                // back as LIR with the fresh value.
                (*node).get_value_mut().state = LirsState::Lir(value);
                self.stack_s.touch(node);
                self.lir_count += 1;

                let mut evicted = None;
                if self.lir_count > self.config.lirs_capacity().get() {
                    if self.list_q.is_full() {
                        evicted = self.evict_lru_hir();
                    }
                    self.demote_lru_lir();
                }
                self.prune();
                evicted
            }
            LirsState::Resident(_) => unreachable!("resident blocks live only in list Q"),
        }
    }

    /// Handles a `put` on a resident block whose stack entry has been
    /// pruned.
    ///
    /// # Safety
    ///
    /// `node` must be a valid node in list Q.
    unsafe fn put_in_queue(
        &mut self,
        node: *mut ListEntry<LirsEntry<K, V>>,
        key: K,
        value: V,
    ) -> Option<(K, V)> {
        let old = match &mut (*node).get_value_mut().state {
            LirsState::Resident(current) => mem::replace(current, value),
            _ => unreachable!("list Q holds only resident blocks"),
        };
        self.stack_s.push_front(LirsEntry {
            key: key.clone(),
            state: LirsState::Hir(node),
        });
        self.list_q.touch(node);
        Some((key, old))
    }

    /// Admits a key the cache has no memory of.
    fn insert_new(&mut self, key: K, value: V) -> Option<(K, V)> {
        if self.lir_count < self.config.lirs_capacity().get() {
            self.stack_s.push_front(LirsEntry {
                key,
                state: LirsState::Lir(value),
            });
            self.lir_count += 1;
            return None;
        }

        let mut evicted = None;
        if self.list_q.is_full() {
            // SAFETY: list Q is non-empty when full
            evicted = unsafe { self.evict_lru_hir() };
        }

        let q_node = self.list_q.push_front(LirsEntry {
            key: key.clone(),
            state: LirsState::Resident(value),
        });
        self.stack_s.push_front(LirsEntry {
            key,
            state: LirsState::Hir(q_node),
        });

        evicted
    }

    /// Promotes an HIR block to LIR: the marker leaves stack S and the
    /// resident block itself moves from list Q to the top of the stack.
    ///
    /// Returns the block's node, now at the top of stack S.
    ///
    /// # Safety
    ///
    /// `marker` must be a valid HIR marker in stack S and `q_node` the
    /// resident block it references in list Q.
    unsafe fn promote(
        &mut self,
        marker: *mut ListEntry<LirsEntry<K, V>>,
        q_node: *mut ListEntry<LirsEntry<K, V>>,
    ) -> *mut ListEntry<LirsEntry<K, V>> {
        let _ = self.stack_s.remove_node(marker);

        let node = self.list_q.detach_node(q_node);
        let entry = (*node).get_value_mut();
        entry.state = match mem::replace(&mut entry.state, LirsState::NonResident) {
            LirsState::Resident(v) => LirsState::Lir(v),
            _ => unreachable!("list Q holds only resident blocks"),
        };
        self.stack_s.adopt_front(node);
        self.lir_count += 1;

        node
    }

    /// Demotes the stack's bottom LIR block into list Q as a resident HIR
    /// block. Its stack entry moves along, so the key leaves the stack
    /// entirely.
    fn demote_lru_lir(&mut self) {
        self.prune();

        let tail = match self.stack_s.back() {
            Some(tail) => tail,
            None => return,
        };

        unsafe {
            // SAFETY: tail is the stack's bottom node and, after pruning,
            // an LIR block
            let node = self.stack_s.detach_node(tail);
            let entry = (*node).get_value_mut();
            entry.state = match mem::replace(&mut entry.state, LirsState::NonResident) {
                LirsState::Lir(v) => LirsState::Resident(v),
                _ => unreachable!("the stack bottom is LIR after pruning"),
            };
            self.list_q.adopt_front(node);
        }
        self.lir_count -= 1;
    }

    /// Evicts the LRU resident HIR block from list Q.
    ///
    /// If the key still has a stack entry, that entry stays behind as a
    /// non-resident ghost carrying the key's recency.
    ///
    /// # Safety
    ///
    /// List Q must be non-empty.
    unsafe fn evict_lru_hir(&mut self) -> Option<(K, V)> {
        let tail = self.list_q.back()?;

        if let Some(marker) = self.stack_s.find(&(*tail).get_value().key) {
            // SAFETY: marker comes from the stack's map
            (*marker).get_value_mut().state = LirsState::NonResident;
        }

        let LirsEntry { key, state } = self.list_q.remove_node(tail);
        match state {
            LirsState::Resident(v) => Some((key, v)),
            _ => unreachable!("list Q holds only resident blocks"),
        }
    }
}

impl<K: Hash + Eq, V> LirsCache<K, V> {
    /// Creates a new LIRS cache from a validated configuration.
    pub fn new(config: LirsCacheConfig) -> LirsCache<K, V, DefaultHashBuilder> {
        LirsCache::with_hasher(config, DefaultHashBuilder::default())
    }

    /// Creates a new LIRS cache from a total capacity and a HIR ratio.
    ///
    /// The resident HIR buffer receives `floor(capacity * hirs_ratio)`
    /// slots and the LIR blocks the rest.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if `capacity` is zero, the ratio is not in
    /// `(0, 1)`, or either share rounds down to zero.
    pub fn with_ratio(
        capacity: usize,
        hirs_ratio: f64,
    ) -> Result<LirsCache<K, V, DefaultHashBuilder>, ConfigError> {
        let config = LirsCacheConfig::from_ratio(capacity, hirs_ratio)?;
        Ok(LirsCache::new(config))
    }
}

impl<K: Hash + Eq, V, S: BuildHasher> core::fmt::Debug for LirsCache<K, V, S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LirsCache")
            .field("config", &self.config)
            .field("lir_count", &self.lir_count)
            .field("resident_hir_count", &self.list_q.len())
            .field("stack_len", &self.stack_s.len())
            .finish()
    }
}
