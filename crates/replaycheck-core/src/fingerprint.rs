//! Replay fingerprints.
//!
//! A fingerprint identifies a match independently of who uploaded the replay
//! or how the decoder ordered its players:
//!
//! ```text
//! MD5( sorted_battle_net_ids.join("") + random_value )
//! ```
//!
//! The 16 digest bytes are rendered as a GUID in the mixed-endian layout
//! used by the upload service (first three groups little-endian), so
//! fingerprints computed here compare equal to the ones it already stores.
//! MD5 is used as a content identity, not as a security primitive.

use std::fmt;
use std::fmt::Write as _;

use digest::Digest;
use md5::Md5;
use uuid::Uuid;

use crate::model::DecodedReplay;

/// A 128-bit replay identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint(Uuid);

impl Fingerprint {
    /// Fingerprint a decoded replay.
    #[must_use]
    pub fn of(replay: &DecodedReplay) -> Self {
        Self::from_parts(replay.participant_ids(), replay.random_value)
    }

    /// Fingerprint from participant ids and the random seed.
    ///
    /// # Examples
    ///
    /// ```
    /// use replaycheck_core::fingerprint::Fingerprint;
    ///
    /// let a = Fingerprint::from_parts([500, 12, 77], 42);
    /// let b = Fingerprint::from_parts([77, 500, 12], 42);
    /// assert_eq!(a, b);
    /// assert_eq!(a.to_string(), "9948f09d-e011-38b1-1116-6992a4a0bfe6");
    /// ```
    #[must_use]
    pub fn from_parts(participant_ids: impl IntoIterator<Item = i64>, random_value: u64) -> Self {
        let input = digest_input(participant_ids, random_value);
        let digest = Md5::digest(input.as_bytes());

        let mut bytes = [0u8; 16];
        bytes.copy_from_slice(&digest);
        Self(Uuid::from_bytes_le(bytes))
    }

    /// Exact, case-sensitive comparison against a caller-supplied value.
    #[must_use]
    pub fn matches(&self, expected: &str) -> bool {
        self.to_string() == expected
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0.hyphenated(), f)
    }
}

/// The string that gets hashed: ids ascending, no separator, then the seed.
fn digest_input(participant_ids: impl IntoIterator<Item = i64>, random_value: u64) -> String {
    let mut ids: Vec<i64> = participant_ids.into_iter().collect();
    ids.sort_unstable();

    let mut input = String::with_capacity(ids.len() * 10 + 20);
    for id in ids {
        let _ = write!(input, "{id}");
    }
    let _ = write!(input, "{random_value}");
    input
}
