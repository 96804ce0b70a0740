//! Replay download.
//!
//! [`ArtifactFetcher`] resolves a caller's locator against the configured base
//! location and issues one GET with headers the caller has already signed.
//! The HTTP client sits behind [`HttpTransport`] so the fetch path can be
//! exercised without a network.

use std::future::Future;
use std::time::Duration;

use bytes::{Bytes, BytesMut};
use http::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use http::StatusCode;
use replaycheck_auth::{EMPTY_PAYLOAD_SHA256, X_AMZ_CONTENT_SHA256, encode_path_segment};
use tracing::{debug, info};

use crate::config::ReplayConfig;

/// Requester-pays opt-in header.
const X_AMZ_REQUEST_PAYER: &str = "x-amz-request-payer";

/// Errors raised while downloading a replay.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The locator has no usable final path segment.
    #[error("locator has no object name: {0:?}")]
    MalformedLocator(String),

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// The request never produced a response.
    #[error("request to {url} failed: {source}")]
    Connect {
        /// Target URL.
        url: String,
        /// Underlying transport error.
        #[source]
        source: reqwest::Error,
    },

    /// The store answered with a non-success status.
    #[error("{url} returned HTTP {status}")]
    Status {
        /// Target URL.
        url: String,
        /// Response status.
        status: StatusCode,
    },

    /// The response body could not be read to the end.
    #[error("failed to read body from {url}: {source}")]
    Read {
        /// Target URL.
        url: String,
        /// Underlying transport error.
        #[source]
        source: reqwest::Error,
    },

    /// Fewer bytes arrived than `Content-Length` announced.
    #[error("truncated body: expected {expected} bytes, received {received}")]
    Truncated {
        /// Announced length.
        expected: u64,
        /// Bytes actually read.
        received: u64,
    },

    /// The body exceeds the configured size limit.
    #[error("replay is {size} bytes, limit is {limit}")]
    BodyTooLarge {
        /// Announced or received size.
        size: u64,
        /// Configured limit.
        limit: usize,
    },
}

/// A buffered HTTP response.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    /// Response status.
    pub status: StatusCode,
    /// Announced `Content-Length`, if any.
    pub content_length: Option<u64>,
    /// The full body.
    pub body: Bytes,
}

/// Issues a single GET and buffers the response.
pub trait HttpTransport: Send + Sync {
    /// GET `url` with exactly the given headers.
    ///
    /// Implementations must refuse to buffer more than `max_body` bytes.
    fn get(
        &self,
        url: &str,
        headers: HeaderMap,
        max_body: usize,
    ) -> impl Future<Output = Result<TransportResponse, FetchError>> + Send;
}

/// [`HttpTransport`] backed by a pooled `reqwest` client.
///
/// The pool only shares connections. Every request carries its own signed
/// headers.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Build a client with the given whole-request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Client`] if the TLS backend fails to initialize.
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(FetchError::Client)?;
        Ok(Self { client })
    }
}

impl HttpTransport for ReqwestTransport {
    async fn get(
        &self,
        url: &str,
        headers: HeaderMap,
        max_body: usize,
    ) -> Result<TransportResponse, FetchError> {
        let mut response = self
            .client
            .get(url)
            .headers(headers)
            .send()
            .await
            .map_err(|source| FetchError::Connect {
                url: url.to_owned(),
                source,
            })?;

        let status = response.status();
        let content_length = response.content_length();
        if let Some(size) = content_length {
            check_size(size, max_body)?;
        }

        // Chunked bodies carry no length up front; stop as soon as they overrun.
        let mut body = BytesMut::new();
        while let Some(chunk) = response.chunk().await.map_err(|source| FetchError::Read {
            url: url.to_owned(),
            source,
        })? {
            check_size((body.len() + chunk.len()) as u64, max_body)?;
            body.extend_from_slice(&chunk);
        }
        let body = body.freeze();

        Ok(TransportResponse {
            status,
            content_length,
            body,
        })
    }
}

/// Downloads replays from one fixed base location.
#[derive(Debug, Clone)]
pub struct ArtifactFetcher<T> {
    transport: T,
    base_url: String,
    max_artifact_size: usize,
}

impl<T: HttpTransport> ArtifactFetcher<T> {
    /// Create a fetcher bound to the configured base location.
    pub fn new(transport: T, config: &ReplayConfig) -> Self {
        Self {
            transport,
            base_url: config.base_url.clone(),
            max_artifact_size: config.max_artifact_size,
        }
    }

    #[cfg(test)]
    pub(crate) fn transport(&self) -> &T {
        &self.transport
    }

    /// Join the locator's final path segment onto the base location.
    ///
    /// Anything before the last `/` is ignored, so a locator can never point
    /// the fetch at another host. The segment is percent-encoded, so object
    /// names with spaces or non-ASCII characters still form a valid URL.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::MalformedLocator`] if the final segment is empty.
    pub fn resolve(&self, locator: &str) -> Result<String, FetchError> {
        let object = locator.rsplit('/').next().unwrap_or_default();
        if object.is_empty() {
            return Err(FetchError::MalformedLocator(locator.to_owned()));
        }
        Ok(format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            encode_path_segment(object)
        ))
    }

    /// GET `url` with signed `headers` and return the whole body.
    ///
    /// # Errors
    ///
    /// Returns a [`FetchError`] on connection failure, non-success status,
    /// short read, or a body over the size limit.
    pub async fn fetch(&self, url: &str, headers: HeaderMap) -> Result<Bytes, FetchError> {
        debug!(url, "fetching replay");

        let response = self
            .transport
            .get(url, headers, self.max_artifact_size)
            .await?;

        if !response.status.is_success() {
            return Err(FetchError::Status {
                url: url.to_owned(),
                status: response.status,
            });
        }

        let received = response.body.len() as u64;
        check_size(received, self.max_artifact_size)?;
        if let Some(expected) = response.content_length {
            if received < expected {
                return Err(FetchError::Truncated { expected, received });
            }
        }

        info!(url, bytes = received, "fetched replay");
        Ok(response.body)
    }
}

/// The unsigned headers every replay GET carries.
#[must_use]
pub fn request_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        HeaderName::from_static(X_AMZ_CONTENT_SHA256),
        HeaderValue::from_static(EMPTY_PAYLOAD_SHA256),
    );
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
    headers.insert(
        HeaderName::from_static(X_AMZ_REQUEST_PAYER),
        HeaderValue::from_static("requester"),
    );
    headers
}

fn check_size(size: u64, limit: usize) -> Result<(), FetchError> {
    if size > limit as u64 {
        return Err(FetchError::BodyTooLarge { size, limit });
    }
    Ok(())
}
