use alloc::boxed::Box;
use core::fmt;
use core::mem;
use core::num::NonZeroUsize;
use core::ptr::{self, NonNull};

extern crate alloc;

/// A node in the doubly linked list.
///
/// Holds a value and the raw links to its neighbors. Nodes are heap
/// allocated and identified by their address, which stays stable across
/// reordering and cross-list transfers. Not meant to be used directly by
/// consumers of `List`.
pub(crate) struct ListEntry<T> {
    /// The stored value. Uses MaybeUninit so sigil nodes can skip it.
    val: mem::MaybeUninit<T>,
    prev: *mut ListEntry<T>,
    next: *mut ListEntry<T>,
}

impl<T> ListEntry<T> {
    fn new(val: T) -> Self {
        ListEntry {
            val: mem::MaybeUninit::new(val),
            prev: ptr::null_mut(),
            next: ptr::null_mut(),
        }
    }

    /// Creates a sigil (sentinel) node without initializing the value.
    fn new_sigil() -> Self {
        ListEntry {
            val: mem::MaybeUninit::uninit(),
            prev: ptr::null_mut(),
            next: ptr::null_mut(),
        }
    }

    /// Returns a reference to the stored value.
    ///
    /// # Safety
    ///
    /// The value must be initialized, i.e. this must not be a sigil node.
    pub(crate) unsafe fn get_value(&self) -> &T {
        self.val.assume_init_ref()
    }

    /// Returns a mutable reference to the stored value.
    ///
    /// # Safety
    ///
    /// The value must be initialized, i.e. this must not be a sigil node.
    pub(crate) unsafe fn get_value_mut(&mut self) -> &mut T {
        self.val.assume_init_mut()
    }

    /// Consumes the node and moves the value out.
    ///
    /// # Safety
    ///
    /// The value must be initialized, i.e. this must not be a sigil node.
    pub(crate) unsafe fn into_value(self) -> T {
        self.val.assume_init()
    }
}

/// A doubly linked list with sentinel head and tail nodes.
///
/// Provides O(1) insertion, removal and reordering through raw node
/// pointers. The capacity given at construction bounds `add`; internal
/// transfers and `add_unchecked` may exceed it when a caller manages the
/// overall budget itself (the cache implementations do).
///
/// The front of the list is the most recently attached position; the back
/// is the oldest. Node addresses never change, so a `*mut ListEntry<T>`
/// handed out by `add` stays valid until the node is removed, even across
/// `move_to_front` and transfers into another list.
pub(crate) struct List<T> {
    cap: NonZeroUsize,
    len: usize,
    head: *mut ListEntry<T>,
    tail: *mut ListEntry<T>,
}

impl<T> List<T> {
    /// Creates a new list that holds at most `cap` items via `add`.
    pub(crate) fn new(cap: NonZeroUsize) -> List<T> {
        let head = Box::into_raw(Box::new(ListEntry::new_sigil()));
        let tail = Box::into_raw(Box::new(ListEntry::new_sigil()));

        let list = List {
            cap,
            len: 0,
            head,
            tail,
        };

        unsafe {
            // SAFETY: head and tail are newly allocated and valid pointers
            (*list.head).next = list.tail;
            (*list.tail).prev = list.head;
        }

        list
    }

    #[allow(dead_code)]
    pub(crate) fn cap(&self) -> NonZeroUsize {
        self.cap
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns true if the list holds at least `cap` items.
    pub(crate) fn is_full(&self) -> bool {
        self.len >= self.cap.get()
    }

    /// Returns the first (most recently attached) node, if any.
    pub(crate) fn front(&self) -> Option<*mut ListEntry<T>> {
        if self.is_empty() {
            None
        } else {
            // SAFETY: head is a valid sigil and the list is non-empty
            Some(unsafe { (*self.head).next })
        }
    }

    /// Returns the last (oldest) node, if any.
    pub(crate) fn back(&self) -> Option<*mut ListEntry<T>> {
        if self.is_empty() {
            None
        } else {
            // SAFETY: tail is a valid sigil and the list is non-empty
            Some(unsafe { (*self.tail).prev })
        }
    }

    /// Returns the successor of `node`, or `None` if `node` is the last.
    ///
    /// # Safety
    ///
    /// `node` must be a valid non-sigil node in this list.
    pub(crate) unsafe fn next(&self, node: *mut ListEntry<T>) -> Option<*mut ListEntry<T>> {
        let next = (*node).next;
        if next == self.tail {
            None
        } else {
            Some(next)
        }
    }

    /// Removes the last (oldest) item from the list.
    pub(crate) fn remove_last(&mut self) -> Option<Box<ListEntry<T>>> {
        if self.is_empty() {
            return None;
        }
        // SAFETY: the list is non-empty, so tail.prev is a real node
        let prev = unsafe { (*self.tail).prev };
        unsafe {
            self.detach(prev);
        }
        self.len -= 1;
        // SAFETY: prev was just detached and is no longer reachable
        unsafe { Some(Box::from_raw(prev)) }
    }

    /// Removes a specific node from the list and returns its allocation.
    ///
    /// # Safety
    ///
    /// `node` must be a valid pointer to a node that is part of this list
    /// (not null, not freed, not a sigil).
    pub(crate) unsafe fn remove(&mut self, node: *mut ListEntry<T>) -> Option<Box<ListEntry<T>>> {
        if self.is_empty() || node.is_null() || node == self.head || node == self.tail {
            return None;
        }

        self.detach(node);
        self.len -= 1;

        Some(Box::from_raw(node))
    }

    /// Unlinks a node without deallocating it.
    ///
    /// # Safety
    ///
    /// `node` must be a valid node currently linked into this list.
    unsafe fn detach(&mut self, node: *mut ListEntry<T>) {
        (*(*node).prev).next = (*node).next;
        (*(*node).next).prev = (*node).prev;
    }

    /// Links a node in right after the head sigil, making it the first item.
    ///
    /// Does not touch `len`; used for reattaching nodes this list already
    /// accounts for.
    ///
    /// # Safety
    ///
    /// `node` must be valid and not currently linked into any list.
    unsafe fn attach(&mut self, node: *mut ListEntry<T>) {
        (*node).next = (*self.head).next;
        (*node).prev = self.head;
        (*self.head).next = node;
        (*(*node).next).prev = node;
    }

    /// Adopts a node detached from another list, placing it at the front.
    ///
    /// # Safety
    ///
    /// `node` must be valid, not linked into any list, and obtained from
    /// `Box::into_raw` so that this list may later free it.
    pub(crate) unsafe fn attach_from_other_list(&mut self, node: *mut ListEntry<T>) {
        self.attach(node);
        self.len += 1;
    }

    /// Moves an existing node to the front of the list.
    ///
    /// # Safety
    ///
    /// `node` must be a valid node currently linked into this list.
    pub(crate) unsafe fn move_to_front(&mut self, node: *mut ListEntry<T>) {
        if node.is_null() || node == self.head || node == self.tail {
            return;
        }

        if (*self.head).next == node {
            return;
        }

        self.detach(node);
        self.attach(node);
    }

    /// Adds a value at the front of the list.
    ///
    /// Returns the new node, or `None` if the list is at capacity. The
    /// value is dropped when the list is full; callers that evict instead
    /// use `add_unchecked` and trim afterwards.
    #[allow(dead_code)]
    pub(crate) fn add(&mut self, v: T) -> Option<*mut ListEntry<T>> {
        if self.is_full() {
            return None;
        }
        Some(self.add_unchecked(v))
    }

    /// Adds a value at the front of the list, bypassing the capacity check.
    ///
    /// The caller is responsible for keeping the overall entry budget
    /// bounded, typically by evicting right after the insert.
    pub(crate) fn add_unchecked(&mut self, v: T) -> *mut ListEntry<T> {
        // SAFETY: Box::into_raw never returns null
        let node = unsafe { NonNull::new_unchecked(Box::into_raw(Box::new(ListEntry::new(v)))) };
        // SAFETY: node is newly allocated and not part of any list yet
        unsafe { self.attach(node.as_ptr()) };
        self.len += 1;
        node.as_ptr()
    }

    /// Inserts a value directly after `node`.
    ///
    /// Returns the new node. Bypasses the capacity check like
    /// `add_unchecked`.
    ///
    /// # Safety
    ///
    /// `node` must be a valid non-sigil node in this list.
    pub(crate) unsafe fn add_after(&mut self, node: *mut ListEntry<T>, v: T) -> *mut ListEntry<T> {
        let new = Box::into_raw(Box::new(ListEntry::new(v)));
        (*new).prev = node;
        (*new).next = (*node).next;
        (*(*node).next).prev = new;
        (*node).next = new;
        self.len += 1;
        new
    }

    /// Removes all entries from the list.
    pub(crate) fn clear(&mut self) {
        while self.remove_last().is_some() {}
    }
}

impl<T> Drop for List<T> {
    fn drop(&mut self) {
        self.clear();

        // SAFETY: head and tail were allocated in `new` and are only freed
        // here; the null writes guard against a double drop.
        unsafe {
            if !self.head.is_null() {
                let _ = Box::from_raw(self.head);
                self.head = ptr::null_mut();
            }
            if !self.tail.is_null() {
                let _ = Box::from_raw(self.tail);
                self.tail = ptr::null_mut();
            }
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for List<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("List")
            .field("capacity", &self.cap)
            .field("length", &self.len)
            .finish()
    }
}
