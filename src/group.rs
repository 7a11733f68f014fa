//! `Group` is the cache's read path: local lookup, request-coalesced
//! remote-or-local fill on miss, and (for local fills only) population of
//! the local store.
//!
//! `original_source/cache.go` in this pack's capture is only the `cache`
//! wrapper (lock + lazy `lru.New`, already cited in `concurrent.rs`) — the
//! upstream groupcache `Group` type with its `Get`/`load`/`getLocally`/
//! `getFromPeer` methods was not captured into `original_source/` here, so
//! this module has no source file in the pack to cite directly. It is
//! built from spec.md §4.6/§4.7 instead, wiring together the primitives
//! that do have their own grounding — [`crate::store::Store`] behind
//! [`crate::concurrent::ConcurrentCache`], [`crate::singleflight::Singleflight`],
//! and [`crate::router::PeerRouter`] — the way those sections describe.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::byteview::ByteView;
use crate::concurrent::ConcurrentCache;
use crate::config::GroupConfig;
use crate::error::GroupError;
use crate::router::PeerRouter;
use crate::singleflight::Singleflight;

/// Fills a [`Group`] on a local cache miss.
///
/// Mirrors the original's `Getter` interface (`Get(key string) ([]byte, error)`).
pub trait Loader: Send + Sync {
    /// Loads the value for `key` from the system of record.
    fn load(&self, key: &str) -> Result<ByteView, Box<dyn std::error::Error + Send + Sync>>;
}

impl<F> Loader for F
where
    F: Fn(&str) -> Result<ByteView, Box<dyn std::error::Error + Send + Sync>> + Send + Sync,
{
    fn load(&self, key: &str) -> Result<ByteView, Box<dyn std::error::Error + Send + Sync>> {
        self(key)
    }
}

/// Running counters for a [`Group`]'s read path. Cheap, lock-free, and
/// deliberately narrow compared to the teacher's per-algorithm
/// `CoreCacheMetrics`: a `Group` has exactly one cache shape, so there is
/// no need for the algorithm-comparison machinery that module exists for.
#[derive(Debug, Default)]
pub struct GroupStats {
    gets: AtomicU64,
    local_hits: AtomicU64,
    loads: AtomicU64,
    peer_hits: AtomicU64,
    local_loads: AtomicU64,
}

impl GroupStats {
    /// Total calls to [`Group::get`], including ones that returned `Err`.
    pub fn gets(&self) -> u64 {
        self.gets.load(Ordering::Relaxed)
    }
    /// Calls satisfied by the local cache without invoking `load`.
    pub fn local_hits(&self) -> u64 {
        self.local_hits.load(Ordering::Relaxed)
    }
    /// Calls that missed the local cache and invoked the coalesced `load` path.
    pub fn loads(&self) -> u64 {
        self.loads.load(Ordering::Relaxed)
    }
    /// Loads satisfied by a remote peer.
    pub fn peer_hits(&self) -> u64 {
        self.peer_hits.load(Ordering::Relaxed)
    }
    /// Loads satisfied by this group's own [`Loader`].
    pub fn local_loads(&self) -> u64 {
        self.local_loads.load(Ordering::Relaxed)
    }
}

/// A named, independently-cached read-through view over one data source.
pub struct Group {
    name: String,
    loader: Arc<dyn Loader>,
    main_cache: ConcurrentCache,
    router: RwLock<Option<Arc<PeerRouter>>>,
    load_gate: Singleflight<Result<ByteView, String>>,
    stats: GroupStats,
}

impl Group {
    /// Creates a group named `name`, backed by `loader`, with a local cache
    /// budget of `cache_bytes` (`0` means unbounded).
    pub fn new(name: impl Into<String>, cache_bytes: u64, loader: Arc<dyn Loader>) -> Self {
        Self::with_config(name, GroupConfig::new(cache_bytes), loader)
    }

    /// Creates a group from an explicit [`GroupConfig`].
    pub fn with_config(name: impl Into<String>, config: GroupConfig, loader: Arc<dyn Loader>) -> Self {
        Group {
            name: name.into(),
            loader,
            main_cache: ConcurrentCache::new(config.cache_bytes()),
            router: RwLock::new(None),
            load_gate: Singleflight::new(),
            stats: GroupStats::default(),
        }
    }

    /// Returns this group's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns this group's read-path counters.
    pub fn stats(&self) -> &GroupStats {
        &self.stats
    }

    /// Installs the peer router used to fetch keys this node does not own.
    /// A group with no router installed always serves misses from its own
    /// `Loader`.
    ///
    /// # Panics
    ///
    /// Per spec §4.6/§4.7, a router may be registered at most once per
    /// group; panics if one is already installed, the same "fast-fail at
    /// startup" treatment spec §7 gives this as a programming error (it
    /// groups it with the nil-loader and duplicate-group-name cases, not
    /// with the recoverable `GroupError` variants `get` returns).
    pub fn set_router(&self, router: Arc<PeerRouter>) {
        let mut guard = self.router.write();
        assert!(guard.is_none(), "router already registered for group {:?}", self.name);
        *guard = Some(router);
    }

    /// Reads `key`, consulting the local cache first and falling through to
    /// a coalesced load (remote peer, then local `Loader`) on a miss.
    ///
    /// # Errors
    ///
    /// Returns [`GroupError::EmptyKey`] for an empty key without touching
    /// the cache or the loader, matching the original's `if key == ""`
    /// guard. Returns [`GroupError::LoaderFailed`] if neither a peer nor
    /// the local loader could produce a value.
    pub fn get(&self, key: &str) -> Result<ByteView, GroupError> {
        self.stats.gets.fetch_add(1, Ordering::Relaxed);

        if key.is_empty() {
            return Err(GroupError::EmptyKey);
        }

        if let Some(value) = self.main_cache.get(key) {
            self.stats.local_hits.fetch_add(1, Ordering::Relaxed);
            return Ok(value);
        }

        self.stats.loads.fetch_add(1, Ordering::Relaxed);
        let result = self.load_gate.do_call(key, || self.load(key));
        result.map_err(|message| GroupError::LoaderFailed {
            key: key.to_string(),
            message,
        })
    }

    /// Runs exactly once per coalesced miss: try a remote peer if the
    /// router routes `key` away from this node, otherwise (or on peer
    /// failure) fall back to the local `Loader`.
    ///
    /// Only the local-`Loader` branch populates `main_cache` — a value
    /// fetched from a peer is returned to the caller but not re-stored
    /// here, so this node does not grow an unbounded number of copies of
    /// keys it does not own. A node that wants peer results cached locally
    /// too needs a dedicated hot cache layered in front of `Group`, which
    /// this crate does not provide.
    fn load(&self, key: &str) -> Result<ByteView, String> {
        if let Some(router) = self.router.read().clone() {
            match router.pick(key) {
                Ok(Some(peer)) => match peer.fetch(&self.name, key) {
                    Ok(bytes) => {
                        self.stats.peer_hits.fetch_add(1, Ordering::Relaxed);
                        return Ok(ByteView::from_vec(bytes));
                    }
                    Err(err) => {
                        tracing::warn!(
                            group = %self.name, key, error = %err,
                            "peer fetch failed, falling back to local loader"
                        );
                    }
                },
                Ok(None) => {}
                Err(err) => {
                    tracing::warn!(
                        group = %self.name, key, error = %err,
                        "peer routing failed, falling back to local loader"
                    );
                }
            }
        }

        self.get_locally(key)
    }

    fn get_locally(&self, key: &str) -> Result<ByteView, String> {
        let value = self.loader.load(key).map_err(|e| e.to_string())?;
        self.stats.local_loads.fetch_add(1, Ordering::Relaxed);
        self.populate_cache(key, value.clone());
        Ok(value)
    }

    fn populate_cache(&self, key: &str, value: ByteView) {
        self.main_cache.add(key.to_string(), value);
    }
}

impl fmt::Debug for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Group")
            .field("name", &self.name)
            .field("stats", &self.stats)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Barrier;
    use std::thread;

    fn db_loader() -> Arc<dyn Loader> {
        Arc::new(|key: &str| -> Result<ByteView, Box<dyn std::error::Error + Send + Sync>> {
            match key {
                "Tom" => Ok(ByteView::from_str("630")),
                "Jack" => Ok(ByteView::from_str("589")),
                "Sam" => Ok(ByteView::from_str("567")),
                other => Err(format!("{other} not found").into()),
            }
        })
    }

    #[test]
    fn empty_key_is_rejected_without_touching_loader() {
        let group = Group::new("scores", 0, db_loader());
        let err = group.get("").unwrap_err();
        assert!(matches!(err, GroupError::EmptyKey));
        assert_eq!(group.stats().loads(), 0);
    }

    // Spec scenario 1 (§8): solo process, no peers, local hit vs. local load.
    #[test]
    fn known_key_loads_then_caches() {
        let group = Group::new("scores", 0, db_loader());
        assert_eq!(group.get("Tom").unwrap().as_str().unwrap(), "630");
        assert_eq!(group.stats().local_loads(), 1);

        // Second read is served from cache, not the loader.
        assert_eq!(group.get("Tom").unwrap().as_str().unwrap(), "630");
        assert_eq!(group.stats().local_loads(), 1);
        assert_eq!(group.stats().local_hits(), 1);
    }

    // Spec scenario 2 (§8): unknown key surfaces the loader's error.
    #[test]
    fn unknown_key_surfaces_loader_error() {
        let group = Group::new("scores", 0, db_loader());
        let err = group.get("unknownKey").unwrap_err();
        match err {
            GroupError::LoaderFailed { key, message } => {
                assert_eq!(key, "unknownKey");
                assert!(message.contains("not found"));
            }
            other => panic!("expected LoaderFailed, got {other:?}"),
        }
    }

    // Spec scenario 3 (§8): concurrent misses on the same key coalesce to
    // one loader invocation.
    #[test]
    fn concurrent_misses_coalesce_to_one_load() {
        let invocations = Arc::new(AtomicUsize::new(0));
        let invocations_cb = Arc::clone(&invocations);
        let loader: Arc<dyn Loader> = Arc::new(
            move |key: &str| -> Result<ByteView, Box<dyn std::error::Error + Send + Sync>> {
                invocations_cb.fetch_add(1, Ordering::SeqCst);
                thread::sleep(std::time::Duration::from_millis(10));
                Ok(ByteView::from_str(&format!("value-for-{key}")))
            },
        );
        let group = Arc::new(Group::new("scores", 0, loader));
        let barrier = Arc::new(Barrier::new(50));

        let handles: Vec<_> = (0..50)
            .map(|_| {
                let group = Arc::clone(&group);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    group.get("Tom").unwrap()
                })
            })
            .collect();

        for h in handles {
            assert_eq!(h.join().unwrap().as_str().unwrap(), "value-for-Tom");
        }
        assert_eq!(invocations.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn peer_hit_is_not_populated_into_local_cache() {
        use crate::error::PeerError;
        use crate::router::PeerClient;

        struct AlwaysRemote;
        impl PeerClient for AlwaysRemote {
            fn fetch(&self, _group: &str, key: &str) -> Result<Vec<u8>, PeerError> {
                Ok(format!("remote-{key}").into_bytes())
            }
        }

        let mut router = PeerRouter::new("self", 1);
        // A single peer with replicas=1: every key not landing exactly on
        // "self"'s own vnode routes to "remote". With one peer and one
        // replica each the ring has exactly two vnodes, so pick a key and
        // just assert on whichever branch actually fires.
        router.set(
            &["self".to_string(), "remote".to_string()],
            std::collections::HashMap::from([(
                "remote".to_string(),
                Arc::new(AlwaysRemote) as Arc<dyn PeerClient>,
            )]),
        );
        let group = Group::new("scores", 0, db_loader());
        group.set_router(Arc::new(router));

        // Try several keys so at least one routes to the remote peer.
        for key in ["a", "b", "c", "d", "e", "f", "g", "h"] {
            let before = group.stats().peer_hits();
            let _ = group.get(key);
            if group.stats().peer_hits() > before {
                // This key went to the peer: a second get for it must hit
                // the gate/loader path again, not a populated local entry,
                // since peer results are never written into main_cache.
                let loads_before = group.stats().loads();
                let _ = group.get(key);
                assert!(group.stats().loads() > loads_before);
                return;
            }
        }
    }

    // Spec §4.6/§4.7: a router may be registered at most once per group.
    #[test]
    #[should_panic(expected = "router already registered")]
    fn second_set_router_call_panics() {
        let group = Group::new("scores", 0, db_loader());
        group.set_router(Arc::new(PeerRouter::new("self", 1)));
        group.set_router(Arc::new(PeerRouter::new("self", 1)));
    }
}
