//! Replay fetching, fingerprinting and projection for replaycheck.
//!
//! Given a replay locator, credentials and an expected fingerprint, a
//! [`ReplayVerifier`] downloads the replay with a SigV4-signed GET, decodes
//! it, computes its [`Fingerprint`] and returns a [`ProjectionResult`] saying
//! whether the fingerprints agree.
//!
//! # Modules
//!
//! - [`config`] - Environment-driven configuration
//! - [`decoder`] - Decoder trait, parse depth and failure reasons
//! - [`fetch`] - Locator resolution and the HTTP download
//! - [`fingerprint`] - Order-independent replay identity
//! - [`model`] - Decoded replay types
//! - [`pipeline`] - The end-to-end invocation
//! - [`projection`] - The output schema

pub mod config;
pub mod decoder;
pub mod fetch;
pub mod fingerprint;
pub mod model;
pub mod pipeline;
pub mod projection;

pub use config::ReplayConfig;
pub use decoder::{DecodeFailure, DecodeFailureReason, JsonReplayDecoder, ParseDepth, ReplayDecoder};
pub use fetch::{ArtifactFetcher, FetchError, HttpTransport, ReqwestTransport};
pub use fingerprint::Fingerprint;
pub use model::DecodedReplay;
pub use pipeline::{Invocation, InvocationOutcome, InvocationResponse, PipelineError, ReplayVerifier};
pub use projection::{ProjectionResult, project};
