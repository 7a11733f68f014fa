//! Immutable byte values returned by the cache.
//!
//! A [`ByteView`] is the unit of value the whole system moves around: what a
//! loader produces, what the LRU store holds, and what a `Group::get` call
//! returns. It is cheap to clone (an `Arc`-backed `Bytes` refcount bump, not
//! a copy) and offers no mutable access, so a caller can never corrupt a
//! cached entry through a value it was handed.

use std::fmt;

use bytes::Bytes;

/// An immutable, length-known sequence of bytes.
///
/// Values are read-only from the caller's perspective: the only accessors
/// are [`ByteView::as_slice`] and [`ByteView::len`]. Cloning is O(1) since
/// the backing storage is a reference-counted [`bytes::Bytes`] buffer.
#[derive(Clone, Eq, PartialEq)]
pub struct ByteView(Bytes);

impl ByteView {
    /// Wraps an owned byte vector.
    pub fn from_vec(bytes: Vec<u8>) -> Self {
        ByteView(Bytes::from(bytes))
    }

    /// Wraps an owned string's UTF-8 bytes.
    pub fn from_string(s: String) -> Self {
        ByteView(Bytes::from(s.into_bytes()))
    }

    /// Copies a byte slice into a new `ByteView`.
    pub fn from_slice(bytes: &[u8]) -> Self {
        ByteView(Bytes::copy_from_slice(bytes))
    }

    /// Copies a string slice's UTF-8 bytes into a new `ByteView`.
    pub fn from_str(s: &str) -> Self {
        ByteView::from_slice(s.as_bytes())
    }

    /// Returns the bytes as a read-only slice.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    /// Returns the number of bytes held.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if there are no bytes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Attempts to interpret the bytes as UTF-8.
    pub fn as_str(&self) -> Result<&str, std::str::Utf8Error> {
        std::str::from_utf8(&self.0)
    }
}

impl From<Vec<u8>> for ByteView {
    fn from(bytes: Vec<u8>) -> Self {
        ByteView::from_vec(bytes)
    }
}

impl From<String> for ByteView {
    fn from(s: String) -> Self {
        ByteView::from_string(s)
    }
}

impl From<&str> for ByteView {
    fn from(s: &str) -> Self {
        ByteView::from_str(s)
    }
}

impl AsRef<[u8]> for ByteView {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}

impl fmt::Debug for ByteView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ByteView").field(&self.len()).finish()
    }
}
