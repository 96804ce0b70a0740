//! Replay verification configuration.
//!
//! Provides [`ReplayConfig`]. Values are loaded from environment variables at
//! startup and never change afterwards; the fetcher and verifier copy what
//! they need at construction.

use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

/// Default bucket endpoint replays are fetched from.
pub const DEFAULT_BASE_URL: &str = "http://heroesprofile.s3.amazonaws.com/";

/// Replay verification configuration.
///
/// # Examples
///
/// ```
/// use replaycheck_core::config::ReplayConfig;
///
/// let config = ReplayConfig::default();
/// assert_eq!(config.region, "us-east-1");
/// assert_eq!(config.service, "s3");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct ReplayConfig {
    /// Base location every locator's final path segment is joined onto.
    #[builder(default = String::from(DEFAULT_BASE_URL))]
    pub base_url: String,

    /// Region used in the signing scope.
    #[builder(default = String::from("us-east-1"))]
    pub region: String,

    /// Service used in the signing scope.
    #[builder(default = String::from("s3"))]
    pub service: String,

    /// Largest replay body (in bytes) that will be buffered.
    #[builder(default = 67_108_864)]
    pub max_artifact_size: usize,

    /// Whole-request timeout for the replay download, in seconds.
    #[builder(default = 30)]
    pub fetch_timeout_secs: u64,

    /// Log level filter string (e.g. `"info"`, `"debug"`).
    #[builder(default = String::from("info"))]
    pub log_level: String,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            base_url: String::from(DEFAULT_BASE_URL),
            region: String::from("us-east-1"),
            service: String::from("s3"),
            max_artifact_size: 67_108_864,
            fetch_timeout_secs: 30,
            log_level: String::from("info"),
        }
    }
}

impl ReplayConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `REPLAY_BASE_URL` | `http://heroesprofile.s3.amazonaws.com/` |
    /// | `REPLAY_REGION` | `us-east-1` |
    /// | `REPLAY_SERVICE` | `s3` |
    /// | `REPLAY_MAX_ARTIFACT_SIZE` | `67108864` |
    /// | `REPLAY_FETCH_TIMEOUT_SECS` | `30` |
    /// | `LOG_LEVEL` | `info` |
    ///
    /// Numeric variables that fail to parse keep their default.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration from any variable source.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(v) = lookup("REPLAY_BASE_URL") {
            config.base_url = v;
        }
        if let Some(v) = lookup("REPLAY_REGION") {
            config.region = v;
        }
        if let Some(v) = lookup("REPLAY_SERVICE") {
            config.service = v;
        }
        if let Some(n) = lookup("REPLAY_MAX_ARTIFACT_SIZE").and_then(|v| v.parse().ok()) {
            config.max_artifact_size = n;
        }
        if let Some(n) = lookup("REPLAY_FETCH_TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
            config.fetch_timeout_secs = n;
        }
        if let Some(v) = lookup("LOG_LEVEL") {
            config.log_level = v;
        }

        config
    }
}
