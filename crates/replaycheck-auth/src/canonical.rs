//! Canonical request construction for AWS Signature Version 4.
//!
//! The canonical request is the newline-separated serialization that gets
//! hashed into the string to sign:
//!
//! ```text
//! HTTPRequestMethod\n
//! CanonicalURI\n
//! CanonicalQueryString\n
//! CanonicalHeaders\n
//! SignedHeaders\n
//! HashedPayload
//! ```
//!
//! `CanonicalHeaders` ends with its own newline, so a blank line always
//! separates the header block from the signed header list.

use std::collections::BTreeMap;
use std::fmt;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};

/// Characters left unescaped in URI path segments.
///
/// Everything except the RFC 3986 unreserved set (A-Z, a-z, 0-9, `-`, `_`,
/// `.`, `~`) is percent-encoded with uppercase hex. Slashes between segments
/// are kept by [`build_canonical_uri`], never encoded.
const URI_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// A fully normalized request, ready to be hashed.
///
/// The signed header list is derived from the same sorted header map that
/// produces the canonical header block, so the two can never disagree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalRequest {
    method: String,
    uri: String,
    query: String,
    headers: BTreeMap<String, String>,
    payload_hash: String,
}

impl CanonicalRequest {
    /// Normalize the request components.
    ///
    /// Every header passed in is signed. Names are lowercased, values trimmed
    /// with inner whitespace runs collapsed, and repeated names merged with
    /// `,` in the order they were given.
    #[must_use]
    pub fn new(
        method: &str,
        path: &str,
        query: &str,
        headers: &[(&str, &str)],
        payload_hash: &str,
    ) -> Self {
        let mut header_map: BTreeMap<String, String> = BTreeMap::new();
        for (name, value) in headers {
            let value = collapse_whitespace(value.trim());
            header_map
                .entry(name.to_lowercase())
                .and_modify(|existing| {
                    existing.push(',');
                    existing.push_str(&value);
                })
                .or_insert(value);
        }

        Self {
            method: method.to_owned(),
            uri: build_canonical_uri(path),
            query: build_canonical_query_string(query),
            headers: header_map,
            payload_hash: payload_hash.to_owned(),
        }
    }

    /// The `;`-joined list of signed header names, sorted.
    #[must_use]
    pub fn signed_headers(&self) -> String {
        self.headers
            .keys()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(";")
    }

    /// The canonical header block, one `name:value` line per header, each
    /// terminated by a newline.
    #[must_use]
    pub fn canonical_headers(&self) -> String {
        let mut block = String::new();
        for (name, value) in &self.headers {
            block.push_str(name);
            block.push(':');
            block.push_str(value);
            block.push('\n');
        }
        block
    }

    /// The canonical URI path.
    #[must_use]
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// The canonical query string.
    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }
}

impl fmt::Display for CanonicalRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\n{}\n{}\n{}\n{}\n{}",
            self.method,
            self.uri,
            self.query,
            self.canonical_headers(),
            self.signed_headers(),
            self.payload_hash
        )
    }
}

/// Build the canonical URI by URI-encoding each path segment individually.
///
/// Forward slashes (`/`) are preserved. Empty paths are normalized to `/`.
///
/// # Examples
///
/// ```
/// use replaycheck_auth::canonical::build_canonical_uri;
///
/// assert_eq!(build_canonical_uri("/replays/a b.StormReplay"), "/replays/a%20b.StormReplay");
/// assert_eq!(build_canonical_uri(""), "/");
/// ```
#[must_use]
pub fn build_canonical_uri(path: &str) -> String {
    if path.is_empty() || path == "/" {
        return "/".to_owned();
    }

    let encoded_segments: Vec<String> = path
        .split('/')
        .map(|segment| {
            // Decode first so an already-escaped path is not double-encoded.
            let decoded = percent_decode_str(segment).decode_utf8_lossy();
            encode_path_segment(&decoded)
        })
        .collect();

    encoded_segments.join("/")
}

/// Percent-encode one raw path segment, `/` included.
///
/// Produces the same escaping as [`build_canonical_uri`], so a URL built from
/// encoded segments signs and sends byte-identical paths.
///
/// ```
/// use replaycheck_auth::canonical::encode_path_segment;
///
/// assert_eq!(
///     encode_path_segment("Cursed Hollow (12).StormReplay"),
///     "Cursed%20Hollow%20%2812%29.StormReplay"
/// );
/// ```
#[must_use]
pub fn encode_path_segment(segment: &str) -> String {
    utf8_percent_encode(segment, URI_ENCODE_SET).to_string()
}

/// Build the canonical query string by sorting parameters.
///
/// Parameters are sorted by key, then by value for repeated keys. Values are
/// kept exactly as they appear in the URI.
///
/// # Examples
///
/// ```
/// use replaycheck_auth::canonical::build_canonical_query_string;
///
/// assert_eq!(build_canonical_query_string(""), "");
/// assert_eq!(build_canonical_query_string("b=2&a=1"), "a=1&b=2");
/// ```
#[must_use]
pub fn build_canonical_query_string(query: &str) -> String {
    if query.is_empty() {
        return String::new();
    }

    let mut params: Vec<(&str, &str)> = query
        .split('&')
        .filter(|s| !s.is_empty())
        .map(|param| param.split_once('=').unwrap_or((param, "")))
        .collect();

    params.sort_unstable();

    params
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}

/// Collapse consecutive whitespace characters in a string to a single space.
fn collapse_whitespace(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut prev_was_space = false;
    for ch in s.chars() {
        if ch.is_whitespace() {
            if !prev_was_space {
                result.push(' ');
                prev_was_space = true;
            }
        } else {
            result.push(ch);
            prev_was_space = false;
        }
    }
    result
}
