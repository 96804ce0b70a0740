//! The verification result returned to callers.
//!
//! [`ProjectionResult`] is a fixed schema: every field is always present,
//! whether or not the fingerprint matched. A mismatch is information for the
//! caller, never a reason to withhold data.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::fingerprint::Fingerprint;
use crate::model::{DecodedReplay, DraftPick, HeroMasteryTier, Player, ScoreResult, TeamXpSnapshot};

/// Decoded replay fields plus the fingerprint verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionResult {
    /// Per-match random seed.
    pub random_value: u64,
    /// Fingerprint computed from the decoded replay.
    pub calculated_fingerprint: String,
    /// Whether `calculated_fingerprint` equals the caller's value exactly.
    pub fingerprint_match: bool,
    /// Game mode.
    pub mode: String,
    /// Battle.net region of the first player, if any.
    pub region: Option<i32>,
    /// When the match was played.
    pub date: DateTime<Utc>,
    /// Match length in seconds.
    pub length: u32,
    /// Map name.
    pub map: String,
    /// Internal short map name.
    pub map_short: String,
    /// Full client version.
    pub version: String,
    /// Major client version.
    pub version_major: u32,
    /// Client build.
    pub version_build: u32,
    /// Hero bans per team.
    pub bans: Vec<Vec<Option<String>>>,
    /// Draft order.
    pub draft_order: Vec<DraftPick>,
    /// Team experience breakdown.
    pub team_experience: Vec<Vec<TeamXpSnapshot>>,
    /// Per-player data.
    pub players: Vec<PlayerProjection>,
}

/// One player's slice of a [`ProjectionResult`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct PlayerProjection {
    pub battletag_name: String,
    pub battletag_id: i32,
    pub blizz_id: i64,
    pub account_level: u32,
    pub hero: String,
    pub hero_level: u32,
    pub hero_level_taunt: Vec<HeroMasteryTier>,
    pub team: u8,
    pub winner: bool,
    pub silenced: bool,
    pub party: i64,
    /// Talent names in pick order.
    pub talents: Vec<String>,
    pub score: Option<ScoreResult>,
    pub staff: bool,
    pub announcer: String,
    pub banner: String,
    pub skin_title: String,
    pub hero_skin: String,
    pub mount_title: String,
    pub mount: String,
    pub spray_title: String,
    pub spray: String,
    pub voice_line_title: String,
    pub voice_line: String,
}

impl From<Player> for PlayerProjection {
    fn from(p: Player) -> Self {
        Self {
            battletag_name: p.name,
            battletag_id: p.battle_tag,
            blizz_id: p.battle_net_id,
            account_level: p.account_level,
            hero: p.character,
            hero_level: p.character_level,
            hero_level_taunt: p.hero_mastery_tiers,
            team: p.team,
            winner: p.is_winner,
            silenced: p.is_silenced,
            party: p.party_value,
            talents: p.talents.into_iter().map(|t| t.talent_name).collect(),
            score: p.score_result,
            staff: p.is_blizzard_staff,
            announcer: p.announcer_pack_attribute_id,
            banner: p.banner_attribute_id,
            skin_title: p.skin_and_skin_tint,
            hero_skin: p.skin_and_skin_tint_attribute_id,
            mount_title: p.mount_and_mount_tint,
            mount: p.mount_and_mount_tint_attribute_id,
            spray_title: p.spray,
            spray: p.spray_attribute_id,
            voice_line_title: p.voice_line,
            voice_line: p.voice_line_attribute_id,
        }
    }
}

/// Combine a decoded replay with its fingerprint and the caller's expected
/// fingerprint.
#[must_use]
pub fn project(
    replay: DecodedReplay,
    fingerprint: &Fingerprint,
    expected_fingerprint: &str,
) -> ProjectionResult {
    let region = replay.players.first().map(|p| p.battle_net_region_id);

    ProjectionResult {
        random_value: replay.random_value,
        calculated_fingerprint: fingerprint.to_string(),
        fingerprint_match: fingerprint.matches(expected_fingerprint),
        mode: replay.game_mode,
        region,
        date: replay.timestamp,
        length: replay.length_secs,
        map: replay.map,
        map_short: replay.map_alternative_name,
        version: replay.replay_version,
        version_major: replay.replay_version_major,
        version_build: replay.replay_build,
        bans: replay.team_hero_bans,
        draft_order: replay.draft_order,
        team_experience: replay.team_periodic_xp_breakdown,
        players: replay.players.into_iter().map(PlayerProjection::from).collect(),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::model::Talent;

    pub(crate) fn player(battle_net_id: i64, region: i32) -> Player {
        Player {
            name: format!("player{battle_net_id}"),
            battle_tag: 1234,
            battle_net_id,
            battle_net_region_id: region,
            account_level: 312,
            character: "Li-Ming".to_owned(),
            character_level: 20,
            hero_mastery_tiers: vec![HeroMasteryTier {
                hero_attribute_id: "Wiza".to_owned(),
                tier_level: 3,
            }],
            team: 1,
            is_winner: false,
            is_silenced: false,
            party_value: 0,
            talents: vec![
                Talent {
                    talent_id: 1,
                    talent_name: "WizardPowerHungry".to_owned(),
                    time_secs: 62,
                },
                Talent {
                    talent_id: 2,
                    talent_name: "WizardArcaneOrbTripleOrb".to_owned(),
                    time_secs: 250,
                },
            ],
            score_result: Some(ScoreResult {
                takedowns: 9,
                ..ScoreResult::default()
            }),
            is_blizzard_staff: false,
            announcer_pack_attribute_id: "AnLM".to_owned(),
            banner_attribute_id: "BN6d".to_owned(),
            skin_and_skin_tint: "Li-Ming".to_owned(),
            skin_and_skin_tint_attribute_id: "Wiz1".to_owned(),
            mount_and_mount_tint: "Horse".to_owned(),
            mount_and_mount_tint_attribute_id: "Hors".to_owned(),
            spray: "Spray".to_owned(),
            spray_attribute_id: "SY81".to_owned(),
            voice_line: "Voice".to_owned(),
            voice_line_attribute_id: "WZ01".to_owned(),
        }
    }

    pub(crate) fn sample_replay() -> DecodedReplay {
        DecodedReplay {
            random_value: 42,
            game_mode: "StormLeague".to_owned(),
            timestamp: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
            length_secs: 1215,
            map: "Cursed Hollow".to_owned(),
            map_alternative_name: "CursedHollow".to_owned(),
            replay_version: "2.55.4.91756".to_owned(),
            replay_version_major: 2,
            replay_build: 91756,
            team_hero_bans: vec![vec![Some("Abat".to_owned()), None]],
            draft_order: vec![DraftPick {
                hero: "Abat".to_owned(),
                pick_type: "Ban".to_owned(),
                selected_player_slot_id: 0,
            }],
            team_periodic_xp_breakdown: Vec::new(),
            players: vec![player(500, 2), player(12, 1), player(77, 1)],
        }
    }

    #[test]
    fn test_should_project_all_fields() {
        let replay = sample_replay();
        let fingerprint = Fingerprint::of(&replay);
        let result = project(replay, &fingerprint, "9948f09d-e011-38b1-1116-6992a4a0bfe6");

        assert_eq!(result.calculated_fingerprint, "9948f09d-e011-38b1-1116-6992a4a0bfe6");
        assert!(result.fingerprint_match);
        assert_eq!(result.random_value, 42);
        assert_eq!(result.mode, "StormLeague");
        assert_eq!(result.region, Some(2));
        assert_eq!(result.length, 1215);
        assert_eq!(result.map_short, "CursedHollow");
        assert_eq!(result.version_build, 91756);
        assert_eq!(result.bans, vec![vec![Some("Abat".to_owned()), None]]);
        assert_eq!(result.draft_order.len(), 1);
        assert_eq!(result.players.len(), 3);
        assert_eq!(result.players[0].blizz_id, 500);
        assert_eq!(
            result.players[0].talents,
            vec!["WizardPowerHungry", "WizardArcaneOrbTripleOrb"]
        );
        assert_eq!(result.players[0].hero_skin, "Wiz1");
    }

    #[test]
    fn test_should_keep_all_fields_on_mismatch() {
        let replay = sample_replay();
        let fingerprint = Fingerprint::of(&replay);
        let matched = project(replay.clone(), &fingerprint, &fingerprint.to_string());
        let mismatched = project(replay, &fingerprint, "3fa85f64-5717-4562-b3fc-2c963f66afa6");

        assert!(matched.fingerprint_match);
        assert!(!mismatched.fingerprint_match);
        assert_eq!(
            ProjectionResult {
                fingerprint_match: true,
                ..mismatched
            },
            matched
        );
    }

    #[test]
    fn test_should_not_normalize_case_when_matching() {
        let replay = sample_replay();
        let fingerprint = Fingerprint::of(&replay);
        let upper = fingerprint.to_string().to_uppercase();
        assert!(!project(replay, &fingerprint, &upper).fingerprint_match);
    }

    #[test]
    fn test_should_leave_region_empty_without_players() {
        let replay = DecodedReplay {
            players: Vec::new(),
            ..sample_replay()
        };
        let fingerprint = Fingerprint::of(&replay);
        assert_eq!(project(replay, &fingerprint, "").region, None);
    }

    #[test]
    fn test_should_serialize_with_wire_field_names() {
        let replay = sample_replay();
        let fingerprint = Fingerprint::of(&replay);
        let json = serde_json::to_value(project(replay, &fingerprint, "")).unwrap();

        for key in [
            "random_value",
            "calculated_fingerprint",
            "fingerprint_match",
            "mode",
            "region",
            "date",
            "length",
            "map",
            "map_short",
            "version",
            "version_major",
            "version_build",
            "bans",
            "draft_order",
            "team_experience",
            "players",
        ] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
        assert_eq!(json["players"][0]["battletag_name"], "player500");
        assert_eq!(json["players"][0]["voice_line"], "WZ01");
    }
}
