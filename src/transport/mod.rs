//! Wire format and transport bindings for peer-to-peer fetches.
//!
//! Grounded in `original_source/http.go`: requests address a group and key
//! as a URL path under one shared base path, and a successful response body
//! is just the value's raw bytes — `http.go` writes `w.Write(body)` with no
//! envelope beyond the protobuf `Response` message it builds first. This
//! crate drops the protobuf envelope (see the crate's `README.md` for why
//! gRPC/protobuf is a declared non-goal here) and serves the bytes
//! directly as `application/octet-stream`, keeping only the URL shape.

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

/// The shared path prefix every peer request lives under, matching the
/// spec's documented default basePath and the original's
/// `defaultBasePath = "/_gocache/"`.
pub const BASE_PATH: &str = "/_gocache/";

const PATH_SEGMENT: &AsciiSet = &CONTROLS.add(b'/').add(b'?').add(b'#').add(b' ');

/// Builds the request path for fetching `key` from `group`, e.g.
/// `/_gocache/scores/Tom`.
pub fn build_path(group: &str, key: &str) -> String {
    format!(
        "{BASE_PATH}{}/{}",
        utf8_percent_encode(group, PATH_SEGMENT),
        utf8_percent_encode(key, PATH_SEGMENT),
    )
}

/// Parses a request path of the shape built by [`build_path`] back into
/// `(group, key)`. Returns `None` if `path` does not start with
/// [`BASE_PATH`] or is missing either segment.
pub fn parse_path(path: &str) -> Option<(String, String)> {
    let rest = path.strip_prefix(BASE_PATH)?;
    let mut parts = rest.splitn(2, '/');
    let group = parts.next()?;
    let key = parts.next()?;
    if group.is_empty() || key.is_empty() {
        return None;
    }
    Some((
        percent_encoding::percent_decode_str(group)
            .decode_utf8_lossy()
            .into_owned(),
        percent_encoding::percent_decode_str(key)
            .decode_utf8_lossy()
            .into_owned(),
    ))
}

#[cfg(feature = "http")]
pub mod http;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_then_parse_round_trips() {
        let path = build_path("scores", "Tom");
        assert_eq!(path, "/_gocache/scores/Tom");
        assert_eq!(parse_path(&path), Some(("scores".to_string(), "Tom".to_string())));
    }

    #[test]
    fn keys_with_slashes_survive_round_trip() {
        let path = build_path("scores", "a/b/c");
        assert_eq!(parse_path(&path), Some(("scores".to_string(), "a/b/c".to_string())));
    }

    #[test]
    fn path_missing_prefix_is_rejected() {
        assert_eq!(parse_path("/other/scores/Tom"), None);
    }

    #[test]
    fn path_missing_key_is_rejected() {
        assert_eq!(parse_path("/_gocache/scores"), None);
    }
}
