//! Consistent-hash ring mapping keys to peer identities.
//!
//! Grounded in `original_source`'s `consistenthash.Map`: each peer gets
//! `replicas` virtual nodes at `hash("<i><peer>")` for `i in [0, replicas)`,
//! the ring is kept sorted, and lookup finds the first hash at or after the
//! key's hash, wrapping around to index `0`. The default hash is
//! CRC-32/IEEE (via the `crc32fast` crate) exactly as the spec names; the
//! Go original's `hash.Hash32` parameter becomes an injectable
//! `Fn(&[u8]) -> u32`.

use std::fmt;
use std::sync::Arc;

/// A hash function used by the ring. Defaults to CRC-32/IEEE over UTF-8 bytes.
pub type HashFn = Arc<dyn Fn(&[u8]) -> u32 + Send + Sync>;

fn crc32_ieee(bytes: &[u8]) -> u32 {
    crc32fast::hash(bytes)
}

/// Maps keys to peers by consistent hashing with virtual-node replication.
pub struct HashRing {
    replicas: usize,
    hash_fn: HashFn,
    /// Sorted `(hash, peer)` pairs. Kept sorted after every `add`; ties on
    /// `hash` are broken by relative insertion order because `sort_by` is a
    /// stable sort over a vector built in insertion order.
    ring: Vec<(u32, String)>,
}

impl HashRing {
    /// Creates an empty ring with `replicas` virtual nodes per peer and the
    /// default CRC-32/IEEE hash function.
    ///
    /// # Panics
    ///
    /// Panics if `replicas == 0`.
    pub fn new(replicas: usize) -> Self {
        Self::with_hash_fn(replicas, Arc::new(crc32_ieee))
    }

    /// Creates an empty ring with a custom hash function.
    ///
    /// # Panics
    ///
    /// Panics if `replicas == 0`.
    pub fn with_hash_fn(replicas: usize, hash_fn: HashFn) -> Self {
        assert!(replicas >= 1, "replicas must be >= 1");
        HashRing {
            replicas,
            hash_fn,
            ring: Vec::new(),
        }
    }

    /// Adds peers to the ring, inserting `replicas` virtual nodes for each
    /// and re-sorting. Adding the same peer twice is not defended against —
    /// the caller is responsible for not doing that.
    pub fn add<I, S>(&mut self, peers: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for peer in peers {
            let peer = peer.into();
            for i in 0..self.replicas {
                let vnode_key = format!("{i}{peer}");
                let hash = (self.hash_fn)(vnode_key.as_bytes());
                self.ring.push((hash, peer.clone()));
            }
        }
        self.ring.sort_by_key(|(hash, _)| *hash);
    }

    /// Returns `true` if no peers have been added.
    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    /// Looks up the peer owning `key`. Returns `None` iff the ring is empty.
    pub fn get(&self, key: &str) -> Option<&str> {
        if self.ring.is_empty() {
            return None;
        }
        let hash = (self.hash_fn)(key.as_bytes());
        let idx = self
            .ring
            .partition_point(|(node_hash, _)| *node_hash < hash);
        let idx = if idx == self.ring.len() { 0 } else { idx };
        Some(&self.ring[idx].1)
    }
}

impl fmt::Debug for HashRing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashRing")
            .field("replicas", &self.replicas)
            .field("vnodes", &self.ring.len())
            .finish()
    }
}
