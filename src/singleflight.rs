//! Request-coalescing gate: at most one in-flight call per key at a time.
//!
//! A direct restatement of `original_source/singleflight/singleflight.go`.
//! The Go original parks followers on a `sync.WaitGroup`; Rust's standard
//! library has no waitgroup type, so the leader/follower handoff is
//! restated with the idiomatic substitute the rest of this pack reaches for
//! in the same spot — a `Mutex` guarding the shared result plus a
//! `Condvar` to wake waiters, both from `parking_lot` as the teacher's
//! `concurrent` feature already depends on.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Condvar, Mutex};

struct Call<T> {
    done: Mutex<Option<T>>,
    condvar: Condvar,
}

/// Deduplicates concurrent calls that share a key.
///
/// `do_call` guarantees that among all concurrent invocations sharing one
/// `key`, the supplied closure runs exactly once; every caller — the
/// leader that ran it and every follower that arrived while it was running
/// — receives the identical result. Once every caller has returned, the key
/// is gone from the registry: results are not cached here, only
/// deduplicated in flight.
pub struct Singleflight<T: Clone> {
    calls: Mutex<HashMap<String, Arc<Call<T>>>>,
}

impl<T: Clone> Default for Singleflight<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Singleflight<T> {
    /// Creates an empty gate.
    pub fn new() -> Self {
        Singleflight {
            calls: Mutex::new(HashMap::new()),
        }
    }

    /// Runs `f` for `key`, coalescing concurrent callers.
    ///
    /// If a call for `key` is already in flight, this blocks until it
    /// completes and returns its result without invoking `f`. Otherwise
    /// this caller becomes the leader: it registers the call, releases the
    /// registry lock, invokes `f`, publishes the result, wakes any
    /// followers, and removes the call from the registry.
    pub fn do_call<F>(&self, key: &str, f: F) -> T
    where
        F: FnOnce() -> T,
    {
        let mut registry = self.calls.lock();
        if let Some(existing) = registry.get(key).cloned() {
            drop(registry);
            return Self::wait_for(&existing);
        }

        let call = Arc::new(Call {
            done: Mutex::new(None),
            condvar: Condvar::new(),
        });
        registry.insert(key.to_string(), Arc::clone(&call));
        drop(registry);

        let result = f();

        {
            let mut slot = call.done.lock();
            *slot = Some(result.clone());
            call.condvar.notify_all();
        }

        self.calls.lock().remove(key);
        result
    }

    fn wait_for(call: &Call<T>) -> T {
        let mut slot = call.done.lock();
        while slot.is_none() {
            call.condvar.wait(&mut slot);
        }
        slot.clone().expect("condvar woke with result published")
    }

    /// Returns `true` if no call is currently in flight for any key.
    pub fn is_empty(&self) -> bool {
        self.calls.lock().is_empty()
    }
}
