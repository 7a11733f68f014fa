//! Bounded, byte-accounted LRU store.
//!
//! `Store` is the single-threaded building block behind [`crate::Group`]'s
//! `main_cache`: a `key -> ByteView` map with a recency order maintained by
//! an intrusive doubly-linked list, the same shape as [`crate::list::List`]
//! used throughout this crate. Unlike a count-bounded LRU, eviction here is
//! driven entirely by a byte budget: `max_bytes == 0` means unbounded, and
//! otherwise the sum of `key.len() + value.len()` across all entries never
//! exceeds `max_bytes` after any mutating call returns.
//!
//! # Thread Safety
//!
//! `Store` is **not** thread-safe on its own; see [`crate::ConcurrentCache`]
//! for a lock-protected wrapper with lazy construction.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::num::NonZeroUsize;

use crate::byteview::ByteView;
use crate::list::{Entry, List};

struct StoredEntry {
    key: String,
    value: ByteView,
}

impl StoredEntry {
    fn cost(&self) -> u64 {
        (self.key.len() + self.value.len()) as u64
    }
}

/// Callback invoked synchronously, with no store lock held by the caller of
/// the mutating operation, whenever an entry is evicted.
pub type OnEvicted = Box<dyn FnMut(&str, &ByteView) + Send>;

/// A bounded, byte-accounted least-recently-used cache.
///
/// Maintains entries in recency order (most recent at the front). When a
/// mutation would push `current_bytes()` past `max_bytes`, entries are
/// evicted from the back until the budget is satisfied again, firing
/// `on_evicted` for each one.
pub struct Store {
    max_bytes: u64,
    current_bytes: u64,
    list: List<StoredEntry>,
    map: HashMap<String, *mut Entry<StoredEntry>>,
    on_evicted: Option<OnEvicted>,
}

// SAFETY: Store owns all data reachable through its raw pointers; the
// pointers always refer to nodes owned by `list` and are never shared
// outside the struct. A `&mut Store` is required for any mutation, so
// `Send` across threads is sound as long as the contained data is `Send`.
unsafe impl Send for Store {}

impl Store {
    /// Creates a new store. `max_bytes == 0` means unbounded.
    pub fn new(max_bytes: u64, on_evicted: Option<OnEvicted>) -> Self {
        // The list itself is never capacity-bound; all eviction is driven
        // by the byte budget, so give it the largest capacity it accepts.
        let unbounded = NonZeroUsize::new(usize::MAX).expect("usize::MAX is nonzero");
        Store {
            max_bytes,
            current_bytes: 0,
            list: List::new(unbounded),
            map: HashMap::new(),
            on_evicted,
        }
    }

    /// Returns the configured byte budget (`0` means unbounded).
    #[inline]
    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    /// Returns the current total of `key.len() + value.len()` across all entries.
    #[inline]
    pub fn current_bytes(&self) -> u64 {
        self.current_bytes
    }

    /// Returns the number of entries currently stored.
    #[inline]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns `true` if the store holds no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Looks up `key`, promoting it to the most-recently-used position on a hit.
    pub fn get<Q>(&mut self, key: &Q) -> Option<ByteView>
    where
        String: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let node = *self.map.get(key)?;
        unsafe {
            // SAFETY: node was obtained from our own map and has not been removed.
            self.list.move_to_front(node);
            Some((*node).get_value().value.clone())
        }
    }

    /// Inserts or overwrites `key` with `value`, evicting from the back
    /// while the byte budget is exceeded.
    pub fn add(&mut self, key: String, value: ByteView) {
        if let Some(&node) = self.map.get(&key) {
            unsafe {
                // SAFETY: node was obtained from our own map.
                self.list.move_to_front(node);
                let entry = (*node).get_value_mut();
                let old_cost = entry.cost();
                entry.value = value;
                let new_cost = entry.cost();
                self.current_bytes = self.current_bytes + new_cost - old_cost;
            }
        } else {
            let cost = (key.len() + value.len()) as u64;
            let entry = StoredEntry { key: key.clone(), value };
            // The list's own capacity is unbounded (`usize::MAX`); only the
            // byte budget enforced below ever triggers eviction, so the
            // checked `add` can never observe a full list.
            let node = self.list.add_unchecked(entry);
            self.map.insert(key, node);
            self.current_bytes += cost;
        }

        self.evict_over_budget();
    }

    fn evict_over_budget(&mut self) {
        if self.max_bytes == 0 {
            return;
        }
        while self.current_bytes > self.max_bytes {
            if !self.remove_oldest() {
                break;
            }
        }
    }

    /// Evicts the single least-recently-used entry, if any, firing
    /// `on_evicted`. Returns `true` if an entry was evicted.
    pub fn remove_oldest(&mut self) -> bool {
        let Some(boxed) = self.list.remove_last() else {
            return false;
        };
        // SAFETY: the node came from our own list and is fully initialized.
        let entry = unsafe { boxed.get_value() };
        self.map.remove(&entry.key);
        self.current_bytes = self.current_bytes.saturating_sub(entry.cost());
        if let Some(cb) = self.on_evicted.as_mut() {
            cb(&entry.key, &entry.value);
        }
        true
    }
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("max_bytes", &self.max_bytes)
            .field("current_bytes", &self.current_bytes)
            .field("len", &self.map.len())
            .finish()
    }
}

impl Drop for Store {
    fn drop(&mut self) {
        // Entries are owned by `list`; dropping it reclaims every node.
        // `map` only holds raw pointers into those nodes, so it needs no
        // explicit cleanup beyond the default `HashMap` drop.
        self.list.clear();
    }
}
