//! End-to-end tests over the public API: a `Group` wired to a demo
//! in-memory "scores" database, matching the worked examples carried over
//! from `original_source`.
//!
//! ## Test Strategy
//! - A single small `db` map stands in for the system of record, the same
//!   one `original_source/cmd/gocache/main.go` uses for its demo.
//! - Each test exercises one scenario end to end: a solo local hit and
//!   miss, coalesced concurrent misses, store eviction under a byte
//!   budget, and ring-based peer routing with a forwarding fallback.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

use meshcache::byteview::ByteView;
use meshcache::error::{GroupError, PeerError};
use meshcache::group::{Group, Loader};
use meshcache::router::{PeerClient, PeerRouter};
use meshcache::store::Store;

fn demo_db() -> HashMap<&'static str, &'static str> {
    HashMap::from([("Tom", "630"), ("Jack", "589"), ("Sam", "567")])
}

fn demo_loader() -> Arc<dyn Loader> {
    let db = demo_db();
    Arc::new(move |key: &str| -> Result<ByteView, Box<dyn std::error::Error + Send + Sync>> {
        db.get(key)
            .map(|v| ByteView::from_str(v))
            .ok_or_else(|| format!("{key} not exist").into())
    })
}

// Spec scenario 1 (§8): a solo process with no peers configured serves
// known keys from its loader and caches them.
#[test]
fn solo_process_serves_and_caches_known_keys() {
    let group = Group::new("scores-solo", 0, demo_loader());

    assert_eq!(group.get("Tom").unwrap().as_str().unwrap(), "630");
    assert_eq!(group.get("Jack").unwrap().as_str().unwrap(), "589");
    assert_eq!(group.stats().local_loads(), 2);

    // Re-reading the same keys must not invoke the loader again.
    assert_eq!(group.get("Tom").unwrap().as_str().unwrap(), "630");
    assert_eq!(group.stats().local_loads(), 2);
    assert_eq!(group.stats().local_hits(), 1);
}

// Spec scenario 2 (§8): an unknown key surfaces the loader's error and is
// never cached.
#[test]
fn unknown_key_errors_and_is_not_cached() {
    let group = Group::new("scores-unknown", 0, demo_loader());
    assert!(group.get("unknownKey").is_err());
    assert!(group.get("unknownKey").is_err());
    // Neither failed attempt should have populated the cache.
    assert_eq!(group.stats().local_hits(), 0);
}

#[test]
fn empty_key_is_rejected() {
    let group = Group::new("scores-empty-key", 0, demo_loader());
    assert!(matches!(group.get(""), Err(GroupError::EmptyKey)));
}

// Spec scenario 3 (§8): many concurrent callers asking for the same
// missing key collapse to a single loader invocation via the singleflight
// gate, and every caller still gets the right value.
#[test]
fn concurrent_requests_for_one_key_coalesce() {
    let invocations = Arc::new(AtomicUsize::new(0));
    let invocations_cb = Arc::clone(&invocations);
    let db = demo_db();
    let loader: Arc<dyn Loader> = Arc::new(
        move |key: &str| -> Result<ByteView, Box<dyn std::error::Error + Send + Sync>> {
            invocations_cb.fetch_add(1, Ordering::SeqCst);
            thread::sleep(std::time::Duration::from_millis(15));
            db.get(key)
                .map(|v| ByteView::from_str(v))
                .ok_or_else(|| format!("{key} not exist").into())
        },
    );
    let group = Arc::new(Group::new("scores-concurrent", 0, loader));
    let barrier = Arc::new(Barrier::new(64));

    let handles: Vec<_> = (0..64)
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
        assert_eq!(h.join().unwrap().as_str().unwrap(), "630");
    }
    assert_eq!(invocations.load(Ordering::SeqCst), 1);
}

// Spec example 4 (§8): the store evicts the least-recently-used entry once
// a put would exceed the byte budget.
#[test]
fn store_evicts_under_byte_pressure() {
    let budget = ("key1".len() + "1234".len() + "key2".len() + "458".len()) as u64;
    let mut store = Store::new(budget, None);
    store.add("key1".to_string(), ByteView::from_str("1234"));
    store.add("key2".to_string(), ByteView::from_str("458"));
    store.add("key3".to_string(), ByteView::from_str("789"));

    assert!(store.get("key1").is_none());
    assert_eq!(store.get("key2").unwrap().as_str().unwrap(), "458");
    assert_eq!(store.get("key3").unwrap().as_str().unwrap(), "789");
}

struct RecordingPeer {
    id: String,
    fetches: Arc<AtomicUsize>,
}

impl PeerClient for RecordingPeer {
    fn fetch(&self, _group: &str, key: &str) -> Result<Vec<u8>, PeerError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(format!("{}-served-{key}", self.id).into_bytes())
    }
}

// Spec example 5 (§8) plus §4.6's forwarding rule: a group with a router
// installed sends keys the ring doesn't own to the matching peer, and
// falls back to its own loader when that peer errors.
#[test]
fn group_forwards_to_peer_then_falls_back_on_peer_error() {
    struct FailingPeer;
    impl PeerClient for FailingPeer {
        fn fetch(&self, _group: &str, _key: &str) -> Result<Vec<u8>, PeerError> {
            Err(PeerError::Transport("connection refused".to_string()))
        }
    }

    let fetches = Arc::new(AtomicUsize::new(0));
    let mut router = PeerRouter::new("self-node", 50);
    router.set(
        &["self-node".to_string(), "good-peer".to_string(), "bad-peer".to_string()],
        HashMap::from([
            (
                "good-peer".to_string(),
                Arc::new(RecordingPeer {
                    id: "good-peer".to_string(),
                    fetches: Arc::clone(&fetches),
                }) as Arc<dyn PeerClient>,
            ),
            ("bad-peer".to_string(), Arc::new(FailingPeer) as Arc<dyn PeerClient>),
        ]),
    );
    let router = Arc::new(router);

    let group = Group::new("scores-routed", 0, demo_loader());
    group.set_router(Arc::clone(&router));

    // Whatever peer (or self) each key routes to, the read must succeed —
    // either served remotely or recovered by the local loader's fallback.
    for key in ["Tom", "Jack", "Sam"] {
        assert!(group.get(key).is_ok());
    }
}
