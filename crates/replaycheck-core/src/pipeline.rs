//! One verification invocation, end to end.
//!
//! ```text
//! locator ──resolve──▶ url ──sign──▶ headers ──fetch──▶ bytes
//!         ──decode──▶ DecodedReplay ──fingerprint──▶ Fingerprint
//!         ──project──▶ ProjectionResult
//! ```
//!
//! Locator, signing and fetch failures are returned as [`PipelineError`]. A decoder
//! rejection is a normal outcome ([`InvocationOutcome::DecodeFailed`]), and
//! nothing after the decoder runs in that case.

use std::fmt;

use chrono::{DateTime, Utc};
use http::Method;
use replaycheck_auth::{AuthError, Credentials, EMPTY_PAYLOAD_SHA256, SigningContext, sign_request};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::ReplayConfig;
use crate::decoder::{DecodeFailure, ParseDepth, ReplayDecoder};
use crate::fetch::{ArtifactFetcher, FetchError, HttpTransport, request_headers};
use crate::fingerprint::Fingerprint;
use crate::projection::{ProjectionResult, project};

/// The four opaque fields a caller sends.
#[derive(Clone, Deserialize)]
pub struct Invocation {
    /// Replay locator; only its final path segment is used.
    pub input: String,
    /// Access key id.
    pub access: String,
    /// Secret access key.
    pub secret: String,
    /// Fingerprint the caller expects.
    pub fingerprint: String,
}

impl fmt::Debug for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Invocation")
            .field("input", &self.input)
            .field("access", &self.access)
            .field("secret", &"<redacted>")
            .field("fingerprint", &self.fingerprint)
            .finish()
    }
}

/// Invocation failures. Each names the stage that failed.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The locator names no object.
    #[error("malformed input: {0}")]
    MalformedInput(#[source] FetchError),

    /// The request could not be signed.
    #[error("signing failed: {0}")]
    Signing(#[from] AuthError),

    /// The replay could not be downloaded.
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),
}

/// What a completed invocation produced.
#[derive(Debug, Clone, PartialEq)]
pub enum InvocationOutcome {
    /// The replay decoded and was fingerprinted.
    Verified(Box<ProjectionResult>),
    /// The decoder rejected the replay.
    DecodeFailed(DecodeFailure),
}

/// The serialized response: either the projection or a plain error string.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum InvocationResponse {
    /// Successful projection.
    Success(Box<ProjectionResult>),
    /// Human-readable failure description.
    Error(String),
}

impl From<InvocationOutcome> for InvocationResponse {
    fn from(outcome: InvocationOutcome) -> Self {
        match outcome {
            InvocationOutcome::Verified(result) => Self::Success(result),
            InvocationOutcome::DecodeFailed(failure) => Self::Error(failure.to_string()),
        }
    }
}

/// Runs invocations against one configured store.
///
/// Holds no per-invocation state, so a single verifier can serve concurrent
/// invocations.
#[derive(Debug)]
pub struct ReplayVerifier<T, D> {
    fetcher: ArtifactFetcher<T>,
    decoder: D,
    region: String,
    service: String,
}

impl<T: HttpTransport, D: ReplayDecoder> ReplayVerifier<T, D> {
    /// Create a verifier from configuration, a transport and a decoder.
    pub fn new(config: &ReplayConfig, transport: T, decoder: D) -> Self {
        Self {
            fetcher: ArtifactFetcher::new(transport, config),
            decoder,
            region: config.region.clone(),
            service: config.service.clone(),
        }
    }

    /// Verify a replay, signing with the current time.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] if the request cannot be signed or the
    /// download fails.
    pub async fn verify(&self, invocation: Invocation) -> Result<InvocationOutcome, PipelineError> {
        self.verify_at(invocation, Utc::now()).await
    }

    /// Verify a replay, signing for the given instant.
    ///
    /// # Errors
    ///
    /// See [`ReplayVerifier::verify`].
    pub async fn verify_at(
        &self,
        invocation: Invocation,
        now: DateTime<Utc>,
    ) -> Result<InvocationOutcome, PipelineError> {
        let Invocation {
            input,
            access,
            secret,
            fingerprint: expected,
        } = invocation;

        let url = self
            .fetcher
            .resolve(&input)
            .map_err(PipelineError::MalformedInput)?;
        let context = SigningContext::new(&self.region, &self.service, now);
        let signed = sign_request(
            &Method::GET,
            &url,
            &request_headers(),
            EMPTY_PAYLOAD_SHA256,
            Credentials::new(access, secret),
            &context,
        )?;

        let bytes = self.fetcher.fetch(&url, signed.headers).await?;

        let replay = match self.decoder.decode(&bytes, ParseDepth::Medium) {
            Ok(replay) => replay,
            Err(failure) => {
                warn!(url = %url, reason = %failure.reason, "replay rejected by decoder");
                return Ok(InvocationOutcome::DecodeFailed(failure));
            }
        };

        let fingerprint = Fingerprint::of(&replay);
        let result = project(replay, &fingerprint, &expected);

        if result.fingerprint_match {
            info!(url = %url, %fingerprint, "fingerprint verified");
        } else {
            warn!(url = %url, %fingerprint, expected = %expected, "fingerprint mismatch");
        }

        Ok(InvocationOutcome::Verified(Box::new(result)))
    }
}
