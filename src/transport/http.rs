//! Concrete HTTP peer transport, gated behind the `http` feature.
//!
//! The client side restates `original_source/http.go`'s `httpGetter.Get`
//! with a blocking `reqwest::blocking::Client` in place of Go's
//! `http.Client`, grounded in how `examples/cyberlife-coder-velesdb`'s
//! server crate pairs `axum` on the serving side with a blocking client on
//! the calling side for its own inter-node hops. The server side is kept
//! to a transport-agnostic function, [`handle_peer_request`], so it can be
//! mounted on whatever async router the embedding binary already runs —
//! `meshcache-launcher` mounts it on `axum`.

use std::time::Duration;

use crate::error::{GroupError, PeerError};
use crate::registry;
use crate::router::PeerClient;
use crate::transport::build_path;

/// A [`PeerClient`] that fetches keys over HTTP from one remote peer.
///
/// `base_url` is the peer's address including scheme, e.g.
/// `http://10.0.0.2:8001`.
pub struct HttpPeerClient {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl HttpPeerClient {
    /// Builds a client for the peer at `base_url`, with a fixed connect +
    /// read timeout so a stuck peer cannot stall an entire `Group::get`
    /// indefinitely.
    pub fn new(base_url: impl Into<String>) -> Result<Self, PeerError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| PeerError::Transport(e.to_string()))?;
        Ok(HttpPeerClient {
            base_url: base_url.into(),
            client,
        })
    }
}

impl PeerClient for HttpPeerClient {
    fn fetch(&self, group: &str, key: &str) -> Result<Vec<u8>, PeerError> {
        let url = format!("{}{}", self.base_url, build_path(group, key));
        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| PeerError::Transport(e.to_string()))?;
        if !response.status().is_success() {
            return Err(PeerError::Transport(format!(
                "peer returned status {}",
                response.status()
            )));
        }
        response
            .bytes()
            .map(|b| b.to_vec())
            .map_err(|e| PeerError::Transport(e.to_string()))
    }
}

/// The outcome of serving one peer request, independent of whatever HTTP
/// framework renders it.
pub struct PeerResponse {
    /// HTTP-style status worth reporting: 200 on success, 400 for a
    /// malformed request, 404 for an unknown group, 500 for a loader
    /// failure.
    pub status: u16,
    /// The response body: the value's bytes on success, an error message otherwise.
    pub body: Vec<u8>,
}

/// Looks up `group` in the process-wide registry and serves `key` from it.
///
/// This is the shared core behind any concrete HTTP binding: it does not
/// touch a request/response type from any particular web framework, so it
/// can be unit tested directly and reused from any router.
pub fn handle_peer_request(group: &str, key: &str) -> PeerResponse {
    let found = match registry::get_group(group) {
        Ok(g) => g,
        Err(err) => {
            return PeerResponse {
                status: 404,
                body: err.to_string().into_bytes(),
            }
        }
    };

    match found.get(key) {
        Ok(value) => PeerResponse {
            status: 200,
            body: value.as_slice().to_vec(),
        },
        Err(GroupError::EmptyKey) => PeerResponse {
            status: 400,
            body: b"key must not be empty".to_vec(),
        },
        Err(err) => PeerResponse {
            status: 500,
            body: err.to_string().into_bytes(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::byteview::ByteView;
    use crate::group::Loader;
    use std::sync::Arc;

    fn loader() -> Arc<dyn Loader> {
        Arc::new(|key: &str| -> Result<ByteView, Box<dyn std::error::Error + Send + Sync>> {
            Ok(ByteView::from_str(key))
        })
    }

    #[test]
    fn unknown_group_is_404() {
        let response = handle_peer_request("transport-http-unknown-group", "any");
        assert_eq!(response.status, 404);
    }

    #[test]
    fn known_group_and_key_is_200_with_value_bytes() {
        registry::new_group("transport-http-known", 0, loader()).unwrap();
        let response = handle_peer_request("transport-http-known", "hello");
        assert_eq!(response.status, 200);
        assert_eq!(response.body, b"hello");
    }

    #[test]
    fn empty_key_is_400() {
        registry::new_group("transport-http-empty-key", 0, loader()).unwrap();
        let response = handle_peer_request("transport-http-empty-key", "");
        assert_eq!(response.status, 400);
    }
}
