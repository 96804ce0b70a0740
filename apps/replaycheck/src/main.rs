//! replaycheck - verify a stored replay against its expected fingerprint.
//!
//! Reads one invocation from stdin, runs it, and writes the response to
//! stdout. Logs go to stderr.
//!
//! # Usage
//!
//! ```text
//! echo '{"input":"abc.StormReplay","access":"AKID","secret":"...","fingerprint":"..."}' \
//!     | REPLAY_BASE_URL=http://localhost:4566/replays/ replaycheck
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `REPLAY_BASE_URL` | `http://heroesprofile.s3.amazonaws.com/` | Bucket endpoint |
//! | `REPLAY_REGION` | `us-east-1` | Signing region |
//! | `REPLAY_SERVICE` | `s3` | Signing service |
//! | `REPLAY_MAX_ARTIFACT_SIZE` | `67108864` | Largest replay accepted, in bytes |
//! | `REPLAY_FETCH_TIMEOUT_SECS` | `30` | Download timeout |
//! | `LOG_LEVEL` | `info` | Log level filter |
//! | `RUST_LOG` | *(unset)* | Fine-grained tracing filter (overrides `LOG_LEVEL`) |

use std::time::Duration;

use anyhow::{Context, Result};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::info;
use tracing_subscriber::EnvFilter;

use replaycheck_core::{
    Invocation, InvocationResponse, JsonReplayDecoder, ReplayConfig, ReplayVerifier,
    ReqwestTransport,
};

/// Version reported at startup.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the tracing subscriber on stderr.
///
/// Uses `RUST_LOG` if set, otherwise falls back to the `LOG_LEVEL` config value.
fn init_tracing(log_level: &str) -> Result<()> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::try_new(log_level)
            .with_context(|| format!("invalid log level filter: {log_level}"))?
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

/// Parse the invocation document.
fn parse_invocation(raw: &str) -> Result<Invocation> {
    serde_json::from_str(raw)
        .context("invocation must be a JSON object with input, access, secret and fingerprint")
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = ReplayConfig::from_env();

    init_tracing(&config.log_level)?;

    info!(
        base_url = %config.base_url,
        region = %config.region,
        service = %config.service,
        max_artifact_size = config.max_artifact_size,
        version = VERSION,
        "starting replaycheck",
    );

    let mut raw = String::new();
    tokio::io::stdin()
        .read_to_string(&mut raw)
        .await
        .context("failed to read invocation from stdin")?;
    let invocation = parse_invocation(&raw)?;

    let transport = ReqwestTransport::new(Duration::from_secs(config.fetch_timeout_secs))?;
    let decoder = JsonReplayDecoder::new().with_max_size(config.max_artifact_size);
    let verifier = ReplayVerifier::new(&config, transport, decoder);

    let outcome = verifier.verify(invocation).await?;
    let response = InvocationResponse::from(outcome);

    let mut out = serde_json::to_vec(&response).context("failed to serialize response")?;
    out.push(b'\n');
    let mut stdout = tokio::io::stdout();
    stdout.write_all(&out).await?;
    stdout.flush().await?;

    Ok(())
}
