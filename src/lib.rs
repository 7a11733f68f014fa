#![doc = include_str!("../README.md")]
//!
//! ---
//!
//! # Modules
//!
//! - [`byteview`]: cheaply-cloneable immutable byte values returned by reads
//! - [`list`]: the intrusive doubly-linked list behind [`store::Store`]'s recency order
//! - [`store`]: single-threaded, byte-budgeted LRU storage
//! - [`concurrent`]: lock-protected, lazily-constructed wrapper over a [`store::Store`]
//! - [`hashring`]: consistent-hash ring used to route keys to peers
//! - [`singleflight`]: request-coalescing gate, one in-flight call per key
//! - [`router`]: maps keys to peers and holds each peer's transport handle
//! - [`group`]: the read-through cache's public entry point
//! - [`registry`]: process-wide registry of named [`group::Group`]s
//! - [`transport`]: wire format and the concrete HTTP peer binding (`http` feature)
//! - [`error`]: typed errors for the fallible operations above
//!
//! # Example
//!
//! ```
//! use meshcache::group::Group;
//! use meshcache::byteview::ByteView;
//! use std::sync::Arc;
//!
//! let db = [("Tom", "630"), ("Jack", "589"), ("Sam", "567")];
//! let group = Group::new("scores", 2 << 10, Arc::new(
//!     move |key: &str| -> Result<ByteView, Box<dyn std::error::Error + Send + Sync>> {
//!         db.iter()
//!             .find(|(k, _)| *k == key)
//!             .map(|(_, v)| ByteView::from_str(v))
//!             .ok_or_else(|| format!("{key} not found").into())
//!     },
//! ));
//!
//! assert_eq!(group.get("Tom").unwrap().as_str().unwrap(), "630");
//! assert!(group.get("unknown").is_err());
//! ```

/// Immutable byte values returned by cache reads.
///
/// `ByteView` wraps `bytes::Bytes` so cloning a value out of a [`store::Store`]
/// is O(1) and never copies the underlying bytes.
pub mod byteview;

/// Doubly linked list implementation with in-place editing capabilities.
///
/// This module provides a memory-efficient doubly linked list that allows for
/// efficient insertion, removal, and reordering operations.
///
/// **Note**: This module is internal infrastructure and should not be used directly
/// by library consumers. It exposes unsafe raw pointer operations that require
/// careful invariant maintenance. Use [`store::Store`] instead.
pub(crate) mod list;

/// Single-threaded, byte-budgeted least-recently-used storage.
pub mod store;

/// Thread-safe, lazily-constructed wrapper over a [`store::Store`].
pub mod concurrent;

/// Consistent-hash ring mapping keys to peer identities.
pub mod hashring;

/// Request-coalescing gate: at most one in-flight call per key.
pub mod singleflight;

/// Routes keys to peers and holds each peer's transport handle.
pub mod router;

/// The distributed read-through cache's public entry point.
pub mod group;

/// Process-wide registry of named [`group::Group`]s.
pub mod registry;

/// Wire format and transport bindings for peer-to-peer fetches.
pub mod transport;

/// Typed error enums for the crate's fallible operations.
pub mod error;

// Re-export the most commonly used types at the crate root.
pub use byteview::ByteView;
pub use concurrent::ConcurrentCache;
pub use error::{GroupError, PeerError, RegistryError};
pub use group::{Group, Loader};
pub use hashring::HashRing;
pub use router::{PeerClient, PeerRouter};
pub use singleflight::Singleflight;
pub use store::Store;
