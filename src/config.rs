//! Configuration structures for [`crate::group::Group`] and
//! [`crate::router::PeerRouter`].
//!
//! Shaped after the teacher's per-algorithm config structs
//! (`config::lru::LruCacheConfig`): plain, immutable, constructed once and
//! handed to the component's constructor, with accessor methods rather than
//! public fields.

use std::fmt;

/// Configuration for a [`crate::group::Group`].
#[derive(Clone, Copy)]
pub struct GroupConfig {
    cache_bytes: u64,
}

impl GroupConfig {
    /// Creates a config with the given local cache byte budget (`0` means unbounded).
    pub fn new(cache_bytes: u64) -> Self {
        GroupConfig { cache_bytes }
    }

    /// Returns the configured local cache byte budget.
    pub fn cache_bytes(&self) -> u64 {
        self.cache_bytes
    }
}

impl Default for GroupConfig {
    /// Unbounded local cache, matching [`crate::store::Store`]'s own
    /// `max_bytes == 0` convention.
    fn default() -> Self {
        GroupConfig { cache_bytes: 0 }
    }
}

impl fmt::Debug for GroupConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GroupConfig")
            .field("cache_bytes", &self.cache_bytes)
            .finish()
    }
}

/// Configuration for a [`crate::router::PeerRouter`].
#[derive(Clone, Copy)]
pub struct RouterConfig {
    replicas: usize,
}

impl RouterConfig {
    /// Creates a config with the given number of virtual nodes per peer.
    ///
    /// # Panics
    ///
    /// Panics if `replicas == 0`.
    pub fn new(replicas: usize) -> Self {
        assert!(replicas >= 1, "replicas must be >= 1");
        RouterConfig { replicas }
    }

    /// Returns the configured number of virtual nodes per peer.
    pub fn replicas(&self) -> usize {
        self.replicas
    }
}

impl Default for RouterConfig {
    /// 50 virtual nodes per peer, matching `original_source/http.go`'s
    /// `defaultReplicas`.
    fn default() -> Self {
        RouterConfig { replicas: 50 }
    }
}

impl fmt::Debug for RouterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouterConfig")
            .field("replicas", &self.replicas)
            .finish()
    }
}
