//! Routes keys to peers using a [`HashRing`], and holds the transport
//! handle used to actually talk to each one.
//!
//! Grounded in `original_source/http.go`'s `HTTPPool`: a router knows its
//! own identity (`self_id`), a consistent-hash ring over the full peer
//! set including itself, and a `PeerClient` per remote peer. `pick` mirrors
//! `HTTPPool.PickPeer`'s `(PeerGetter, bool)` contract — the bool there
//! becomes, here, an explicit `Option` plus the rule that a ring hit on
//! `self_id` is reported as "no remote peer" so callers fall back to their
//! own local loader instead of looping a request back to themselves.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::config::RouterConfig;
use crate::error::PeerError;
use crate::hashring::HashRing;

/// A remote fetch target. Implemented per transport; see
/// [`crate::transport::http::HttpPeerClient`] for the concrete HTTP binding
/// behind the `http` feature.
pub trait PeerClient: Send + Sync {
    /// Fetches `key` from `group` on this peer, returning its raw bytes.
    fn fetch(&self, group: &str, key: &str) -> Result<Vec<u8>, PeerError>;
}

/// Maps keys to peers and holds each remote peer's [`PeerClient`].
pub struct PeerRouter {
    self_id: String,
    replicas: usize,
    ring: HashRing,
    clients: HashMap<String, Arc<dyn PeerClient>>,
}

impl PeerRouter {
    /// Creates a router for a node identified by `self_id`, with `replicas`
    /// virtual nodes per peer on the consistent-hash ring.
    pub fn new(self_id: impl Into<String>, replicas: usize) -> Self {
        Self::with_config(self_id, RouterConfig::new(replicas))
    }

    /// Creates a router from an explicit [`RouterConfig`].
    pub fn with_config(self_id: impl Into<String>, config: RouterConfig) -> Self {
        let replicas = config.replicas();
        PeerRouter {
            self_id: self_id.into(),
            replicas,
            ring: HashRing::new(replicas),
            clients: HashMap::new(),
        }
    }

    /// Returns this node's identity as given to [`PeerRouter::new`].
    pub fn self_id(&self) -> &str {
        &self.self_id
    }

    /// Replaces the full peer set, including `self_id` itself so the ring
    /// can route keys to "this node" as well as to remotes. `clients` gives
    /// the transport for every peer other than `self_id`; a router with no
    /// entry for a peer the ring names a key to will treat that peer as
    /// unreachable.
    ///
    /// Mirrors `HTTPPool.Set`, which rebuilds the whole ring and getter map
    /// from scratch on every call rather than diffing the old and new peer
    /// lists.
    pub fn set(&mut self, peers: &[String], clients: HashMap<String, Arc<dyn PeerClient>>) {
        let mut ring = HashRing::new(self.replicas);
        ring.add(peers.iter().cloned());
        self.ring = ring;
        self.clients = clients;
    }

    /// Picks the peer responsible for `key`.
    ///
    /// Returns `Ok(None)` when the ring routes `key` to this node itself
    /// (the caller should use its local loader) or when the ring has no
    /// peers at all. Returns `Err` if the ring names a remote peer this
    /// router has no client for.
    pub fn pick(&self, key: &str) -> Result<Option<Arc<dyn PeerClient>>, PeerError> {
        let Some(owner) = self.ring.get(key) else {
            return Ok(None);
        };
        if owner == self.self_id {
            return Ok(None);
        }
        self.clients
            .get(owner)
            .cloned()
            .map(Some)
            .ok_or_else(|| PeerError::NoPeerAvailable(owner.to_string()))
    }

    /// Returns `true` if no peers (other than possibly `self_id`) are registered.
    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }
}

impl fmt::Debug for PeerRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PeerRouter")
            .field("self_id", &self.self_id)
            .field("replicas", &self.replicas)
            .field("known_peers", &self.clients.len())
            .finish()
    }
}
