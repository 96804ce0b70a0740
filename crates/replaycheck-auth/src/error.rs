//! Error types for request signing.
//!
//! Signing is pure, so the only failures are inputs that cannot be
//! canonicalized. None of them are worth retrying.

/// Errors that can occur while building a SigV4 authorization header.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The target URI could not be parsed.
    #[error("malformed URI {uri:?}: {reason}")]
    MalformedUri {
        /// The URI as given by the caller.
        uri: String,
        /// Parser diagnostic.
        reason: String,
    },

    /// The target URI has no host component to sign.
    #[error("URI has no host: {0}")]
    MissingHost(String),

    /// A header value is not visible ASCII and cannot be canonicalized.
    #[error("invalid value for header {0}")]
    InvalidHeaderValue(String),
}
