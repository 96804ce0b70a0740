//! Decoded replay types.
//!
//! [`DecodedReplay`] is what a [`ReplayDecoder`](crate::decoder::ReplayDecoder)
//! hands back. Only [`Player::battle_net_id`] and
//! [`DecodedReplay::random_value`] feed the fingerprint; everything else is
//! carried through to the projection untouched.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A decoded replay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodedReplay {
    /// Per-match random seed written by the game client.
    pub random_value: u64,
    /// Game mode name (e.g. `StormLeague`, `QuickMatch`).
    pub game_mode: String,
    /// When the match was played.
    pub timestamp: DateTime<Utc>,
    /// Match length in seconds.
    pub length_secs: u32,
    /// Map name.
    pub map: String,
    /// Internal short map name.
    #[serde(default)]
    pub map_alternative_name: String,
    /// Full client version string.
    pub replay_version: String,
    /// Major client version.
    pub replay_version_major: u32,
    /// Client build number.
    pub replay_build: u32,
    /// Banned heroes, one list per team. Empty ban slots are `None`.
    #[serde(default)]
    pub team_hero_bans: Vec<Vec<Option<String>>>,
    /// Draft picks and bans in order.
    #[serde(default)]
    pub draft_order: Vec<DraftPick>,
    /// Periodic experience breakdown, one list per team.
    #[serde(default)]
    pub team_periodic_xp_breakdown: Vec<Vec<TeamXpSnapshot>>,
    /// Match participants.
    pub players: Vec<Player>,
}

impl DecodedReplay {
    /// Battle.net ids of all players, in decoder order.
    pub fn participant_ids(&self) -> impl Iterator<Item = i64> + '_ {
        self.players.iter().map(|p| p.battle_net_id)
    }
}

/// One step of the draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftPick {
    /// Hero attribute id.
    pub hero: String,
    /// `Pick`, `Ban` or `Swap`.
    pub pick_type: String,
    /// Player slot that made the selection.
    pub selected_player_slot_id: i32,
}

/// Team experience at one point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamXpSnapshot {
    /// Seconds since the match started.
    pub time_secs: u32,
    /// Team level.
    pub team_level: u32,
    /// Experience from minions.
    pub minion_xp: u32,
    /// Experience from mercenary camps.
    pub creep_xp: u32,
    /// Experience from structures.
    pub structure_xp: u32,
    /// Experience from hero kills.
    pub hero_xp: u32,
    /// Passive experience.
    pub trickle_xp: u32,
}

/// A match participant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// Display name.
    pub name: String,
    /// Numeric battle tag suffix.
    pub battle_tag: i32,
    /// Battle.net account id. Unique within a replay.
    pub battle_net_id: i64,
    /// Battle.net region id.
    pub battle_net_region_id: i32,
    /// Account level.
    #[serde(default)]
    pub account_level: u32,
    /// Hero played.
    pub character: String,
    /// Hero level.
    #[serde(default)]
    pub character_level: u32,
    /// Hero mastery tiers shown in the loading screen.
    #[serde(default)]
    pub hero_mastery_tiers: Vec<HeroMasteryTier>,
    /// Team index.
    pub team: u8,
    /// Whether the player's team won.
    pub is_winner: bool,
    /// Whether the player was silenced.
    #[serde(default)]
    pub is_silenced: bool,
    /// Party identifier; players queued together share it.
    #[serde(default)]
    pub party_value: i64,
    /// Talents picked, in order.
    #[serde(default)]
    pub talents: Vec<Talent>,
    /// End-of-match score screen.
    #[serde(default)]
    pub score_result: Option<ScoreResult>,
    /// Whether the account belongs to Blizzard staff.
    #[serde(default)]
    pub is_blizzard_staff: bool,
    /// Announcer pack attribute id.
    #[serde(default)]
    pub announcer_pack_attribute_id: String,
    /// Banner attribute id.
    #[serde(default)]
    pub banner_attribute_id: String,
    /// Skin title.
    #[serde(default)]
    pub skin_and_skin_tint: String,
    /// Skin attribute id.
    #[serde(default)]
    pub skin_and_skin_tint_attribute_id: String,
    /// Mount title.
    #[serde(default)]
    pub mount_and_mount_tint: String,
    /// Mount attribute id.
    #[serde(default)]
    pub mount_and_mount_tint_attribute_id: String,
    /// Spray title.
    #[serde(default)]
    pub spray: String,
    /// Spray attribute id.
    #[serde(default)]
    pub spray_attribute_id: String,
    /// Voice line title.
    #[serde(default)]
    pub voice_line: String,
    /// Voice line attribute id.
    #[serde(default)]
    pub voice_line_attribute_id: String,
}

/// Mastery tier for one hero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeroMasteryTier {
    /// Hero attribute id.
    pub hero_attribute_id: String,
    /// Tier level.
    pub tier_level: u32,
}

/// A talent selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Talent {
    /// Talent id within the hero's tree.
    pub talent_id: u32,
    /// Talent name.
    pub talent_name: String,
    /// Seconds since the match started.
    pub time_secs: u32,
}

/// End-of-match statistics for one player.
///
/// Counters the client adds in later builds land in `extra` so they survive
/// a round trip.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
#[allow(missing_docs)]
pub struct ScoreResult {
    pub level: u32,
    pub takedowns: u32,
    pub solo_kills: u32,
    pub assists: u32,
    pub deaths: u32,
    pub hero_damage: u64,
    pub siege_damage: u64,
    pub structure_damage: u64,
    pub minion_damage: u64,
    pub creep_damage: u64,
    pub summon_damage: u64,
    pub healing: Option<u64>,
    pub self_healing: u64,
    pub damage_taken: Option<u64>,
    pub experience_contribution: u64,
    pub town_kills: u32,
    pub time_spent_dead_secs: u32,
    pub merc_camp_captures: u32,
    pub watch_tower_captures: u32,
    pub meta_experience: u64,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}
