//! Replay decoder boundary.
//!
//! Parsing the binary replay container is not this crate's job. A decoder is
//! anything that implements [`ReplayDecoder`]; the pipeline only depends on
//! the trait. [`JsonReplayDecoder`] covers replays that an upstream parser
//! already rendered to the [`DecodedReplay`] JSON shape.

use std::fmt;

use tracing::debug;

use crate::model::DecodedReplay;

/// How much of a replay to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ParseDepth {
    /// Header, details and lobby data only.
    Minimal,
    /// Adds tracker events (score screen, team experience) and game events
    /// (talents).
    Medium,
    /// Adds unit-level detail.
    Detailed,
    /// Everything the container holds.
    Full,
}

impl ParseDepth {
    /// Whether tracker and game event data is decoded at this depth.
    #[must_use]
    pub fn includes_events(self) -> bool {
        self >= Self::Medium
    }
}

/// Why a decoder rejected a replay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecodeFailureReason {
    /// An AI player took part.
    ComputerPlayerFound,
    /// The replay is missing required sections.
    Incomplete,
    /// The decoder hit malformed data.
    Exception,
    /// Try Me mode replays are not real matches.
    TryMeMode,
    /// The decoder succeeded but produced no record.
    UnexpectedResult,
    /// The replay could not be located.
    FileNotFound,
    /// The replay predates the pre-alpha wipe.
    PreAlphaWipe,
    /// The replay is larger than the decoder accepts.
    FileSizeTooLarge,
    /// Played on the public test realm.
    PtrRegion,
}

impl DecodeFailureReason {
    /// The reason code as reported to callers.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ComputerPlayerFound => "ComputerPlayerFound",
            Self::Incomplete => "Incomplete",
            Self::Exception => "Exception",
            Self::TryMeMode => "TryMeMode",
            Self::UnexpectedResult => "UnexpectedResult",
            Self::FileNotFound => "FileNotFound",
            Self::PreAlphaWipe => "PreAlphaWipe",
            Self::FileSizeTooLarge => "FileSizeTooLarge",
            Self::PtrRegion => "PTRRegion",
        }
    }
}

impl fmt::Display for DecodeFailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A decoder rejection. Terminal to the pipeline but not an invocation error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Error parsing replay: {reason}")]
pub struct DecodeFailure {
    /// The reason code.
    pub reason: DecodeFailureReason,
}

impl From<DecodeFailureReason> for DecodeFailure {
    fn from(reason: DecodeFailureReason) -> Self {
        Self { reason }
    }
}

/// Turns raw replay bytes into a [`DecodedReplay`].
pub trait ReplayDecoder: Send + Sync {
    /// Decode `bytes` at the given depth.
    ///
    /// # Errors
    ///
    /// Returns a [`DecodeFailure`] naming why the replay was rejected.
    fn decode(&self, bytes: &[u8], depth: ParseDepth) -> Result<DecodedReplay, DecodeFailure>;
}

/// Decodes replays pre-rendered as [`DecodedReplay`] JSON.
///
/// Applies the same acceptance rules as the binary parser: at least one
/// player, and no AI slots (Battle.net id `0`).
#[derive(Debug, Clone, Default)]
pub struct JsonReplayDecoder {
    max_size: Option<usize>,
}

impl JsonReplayDecoder {
    /// Create a decoder with no size limit.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject inputs larger than `max_size` bytes.
    #[must_use]
    pub fn with_max_size(mut self, max_size: usize) -> Self {
        self.max_size = Some(max_size);
        self
    }
}

impl ReplayDecoder for JsonReplayDecoder {
    fn decode(&self, bytes: &[u8], depth: ParseDepth) -> Result<DecodedReplay, DecodeFailure> {
        if self.max_size.is_some_and(|max| bytes.len() > max) {
            return Err(DecodeFailureReason::FileSizeTooLarge.into());
        }

        let mut replay: DecodedReplay = serde_json::from_slice(bytes).map_err(|e| {
            debug!(error = %e, "replay JSON rejected");
            DecodeFailure::from(DecodeFailureReason::Exception)
        })?;

        if replay.players.is_empty() {
            return Err(DecodeFailureReason::Incomplete.into());
        }
        if replay.players.iter().any(|p| p.battle_net_id == 0) {
            return Err(DecodeFailureReason::ComputerPlayerFound.into());
        }

        if !depth.includes_events() {
            replay.team_periodic_xp_breakdown.clear();
            for player in &mut replay.players {
                player.talents.clear();
                player.score_result = None;
            }
        }

        Ok(replay)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn replay_json(ids: &[i64]) -> Vec<u8> {
        let players: Vec<_> = ids
            .iter()
            .map(|id| {
                json!({
                    "name": format!("player{id}"),
                    "battle_tag": 1234,
                    "battle_net_id": id,
                    "battle_net_region_id": 2,
                    "character": "Valla",
                    "team": 0,
                    "is_winner": true,
                    "talents": [{"talent_id": 1, "talent_name": "Hunger", "time_secs": 60}],
                    "score_result": {"level": 20, "takedowns": 11, "hero_damage": 50000}
                })
            })
            .collect();
        serde_json::to_vec(&json!({
            "random_value": 42,
            "game_mode": "StormLeague",
            "timestamp": "2024-03-01T12:00:00Z",
            "length_secs": 1215,
            "map": "Cursed Hollow",
            "replay_version": "2.55.4.91756",
            "replay_version_major": 2,
            "replay_build": 91756,
            "team_periodic_xp_breakdown": [[{
                "time_secs": 60, "team_level": 2, "minion_xp": 100, "creep_xp": 0,
                "structure_xp": 0, "hero_xp": 0, "trickle_xp": 50
            }]],
            "players": players
        }))
        .unwrap()
    }

    #[test]
    fn test_should_decode_replay_json() {
        let replay = JsonReplayDecoder::new()
            .decode(&replay_json(&[500, 12]), ParseDepth::Medium)
            .unwrap();
        assert_eq!(replay.random_value, 42);
        assert_eq!(replay.participant_ids().collect::<Vec<_>>(), vec![500, 12]);
        assert_eq!(replay.players[0].talents.len(), 1);
        assert_eq!(
            replay.players[0].score_result.as_ref().map(|s| s.takedowns),
            Some(11)
        );
    }

    #[test]
    fn test_should_drop_event_data_at_minimal_depth() {
        let replay = JsonReplayDecoder::new()
            .decode(&replay_json(&[500, 12]), ParseDepth::Minimal)
            .unwrap();
        assert!(replay.team_periodic_xp_breakdown.is_empty());
        assert!(replay.players.iter().all(|p| p.talents.is_empty()));
        assert!(replay.players.iter().all(|p| p.score_result.is_none()));
    }

    #[test]
    fn test_should_reject_malformed_input_as_exception() {
        let err = JsonReplayDecoder::new()
            .decode(b"MPQ\x1b not json", ParseDepth::Medium)
            .unwrap_err();
        assert_eq!(err.reason, DecodeFailureReason::Exception);
        assert_eq!(err.to_string(), "Error parsing replay: Exception");
    }

    #[test]
    fn test_should_reject_replay_without_players() {
        let err = JsonReplayDecoder::new()
            .decode(&replay_json(&[]), ParseDepth::Medium)
            .unwrap_err();
        assert_eq!(err.reason, DecodeFailureReason::Incomplete);
    }

    #[test]
    fn test_should_reject_computer_players() {
        let err = JsonReplayDecoder::new()
            .decode(&replay_json(&[500, 0]), ParseDepth::Medium)
            .unwrap_err();
        assert_eq!(err.reason, DecodeFailureReason::ComputerPlayerFound);
    }

    #[test]
    fn test_should_reject_oversized_input() {
        let err = JsonReplayDecoder::new()
            .with_max_size(16)
            .decode(&replay_json(&[500]), ParseDepth::Medium)
            .unwrap_err();
        assert_eq!(err.reason, DecodeFailureReason::FileSizeTooLarge);
    }

    #[test]
    fn test_should_render_ptr_region_reason_code() {
        assert_eq!(DecodeFailureReason::PtrRegion.to_string(), "PTRRegion");
    }
}
