//! Typed error enums for the crate's fallible operations.
//!
//! The teacher's `no_std` core has no error type of its own — its
//! `ConcurrentLruCache` operations either succeed or return `Option`. Once a
//! network hop enters the picture (peer routing, remote fetch, group
//! registry lookups) `Option` stops being informative enough, so this
//! module adds `thiserror`-derived enums the way
//! `examples/cyberlife-coder-velesdb` structures its crate-level errors.

use thiserror::Error;

/// Errors a [`crate::group::Group`] read can fail with.
#[derive(Debug, Error)]
pub enum GroupError {
    /// The caller passed an empty key. Mirrors the original's `if key == ""`
    /// guard in `cache.Get`.
    #[error("key must not be empty")]
    EmptyKey,

    /// The configured [`crate::group::Loader`] returned an error while
    /// filling a local miss. Coalesced followers (see
    /// [`crate::singleflight::Singleflight`]) observe the same message as
    /// the leader that actually ran the loader.
    #[error("loader failed for key {key:?}: {message}")]
    LoaderFailed {
        /// The key being loaded when the failure occurred.
        key: String,
        /// The underlying error's `Display` output.
        message: String,
    },
}

/// Errors from routing to or communicating with a peer.
#[derive(Debug, Error)]
pub enum PeerError {
    /// No peer is registered for the key (the ring is empty, or the ring
    /// routed to this node itself and the caller already checked that).
    #[error("no peer available for key {0:?}")]
    NoPeerAvailable(String),

    /// The peer transport itself failed (connection refused, timeout,
    /// non-success status, malformed body, ...). The message is transport
    /// specific; see `crate::transport` for the concrete HTTP mapping.
    #[error("peer request failed: {0}")]
    Transport(String),
}

/// Errors from the process-wide group registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// `new_group` was called twice for the same name. The original panics
    /// (`panic("RegisterNewGroup called more than once")`); a library is
    /// better served returning an error than aborting its caller's process.
    #[error("group {0:?} is already registered")]
    AlreadyRegistered(String),

    /// `get_group` was asked for a name nothing ever registered.
    #[error("no group named {0:?} is registered")]
    NotFound(String),
}
