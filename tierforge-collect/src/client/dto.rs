//! Upstream payloads
//!
//! Only the fields the collector reads are modelled. Most fields default
//! when absent; the normalizer decides whether a payload is usable.

use serde::{Deserialize, Serialize};

/// League listing for one tier
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LeagueListDto {
    #[serde(default)]
    pub tier: Option<String>,
    #[serde(default)]
    pub entries: Vec<LeagueItemDto>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LeagueItemDto {
    /// Missing for some legacy entries; such entries are unusable
    pub puuid: Option<String>,
    pub summoner_name: Option<String>,
    pub league_points: i64,
    pub wins: u32,
    pub losses: u32,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MatchDto {
    #[serde(default)]
    pub metadata: MatchMetadataDto,
    #[serde(default)]
    pub info: MatchInfoDto,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MatchMetadataDto {
    pub match_id: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MatchInfoDto {
    pub game_version: String,
    /// Seconds
    pub game_duration: i64,
    pub queue_id: u32,
    pub participants: Vec<ParticipantDto>,
    pub teams: Vec<TeamDto>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ParticipantDto {
    pub puuid: String,
    pub participant_id: u32,
    pub team_id: i64,
    pub win: bool,
    pub champion_id: i64,
    pub champion_name: String,
    pub team_position: String,
    pub lane: String,
    pub kills: u32,
    pub deaths: u32,
    pub assists: u32,
    pub challenges: Option<ChallengesDto>,
    pub total_damage_dealt_to_champions: i64,
    pub total_damage_taken: i64,
    pub total_minions_killed: i64,
    pub neutral_minions_killed: i64,
    pub gold_earned: i64,
    pub vision_score: i64,
    pub vision_wards_bought_in_game: i64,
    pub item0: i64,
    pub item1: i64,
    pub item2: i64,
    pub item3: i64,
    pub item4: i64,
    pub item5: i64,
    pub item6: i64,
    pub perks: Option<PerksDto>,
    pub summoner1_id: i64,
    pub summoner2_id: i64,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChallengesDto {
    pub kda: f64,
    pub solo_kills: u32,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct PerksDto {
    pub styles: Vec<PerkStyleDto>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct PerkStyleDto {
    pub style: i64,
    pub selections: Vec<PerkSelectionDto>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct PerkSelectionDto {
    pub perk: i64,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TeamDto {
    pub team_id: i64,
    pub win: bool,
    pub bans: Vec<BanDto>,
    pub objectives: ObjectivesDto,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BanDto {
    pub champion_id: i64,
    pub pick_turn: i64,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ObjectivesDto {
    pub baron: ObjectiveDto,
    pub dragon: ObjectiveDto,
    pub horde: ObjectiveDto,
    pub champion: ObjectiveDto,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ObjectiveDto {
    pub first: bool,
    pub kills: u32,
}

/// Match timeline: a sequence of one-minute frames
#[derive(Debug, Clone, Deserialize)]
pub struct TimelineDto {
    pub info: Option<TimelineInfoDto>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TimelineInfoDto {
    pub frames: Vec<FrameDto>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FrameDto {
    pub timestamp: i64,
    #[serde(default)]
    pub events: Vec<EventDto>,
}

/// Timeline event, dispatched on its `type` field
///
/// Kinds this collector does not model decode as `Unrecognized`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventDto {
    ItemPurchased(ItemEventDto),
    ItemSold(ItemEventDto),
    ItemDestroyed(ItemEventDto),
    ItemUndo(ItemUndoDto),
    SkillLevelUp(SkillLevelUpDto),
    ChampionKill(ChampionKillDto),
    EliteMonsterKill(EliteMonsterKillDto),
    BuildingKill(BuildingKillDto),
    TurretPlateDestroyed(TurretPlateDto),
    WardPlaced(WardPlacedDto),
    WardKill(WardKillDto),
    #[serde(other)]
    Unrecognized,
}

impl EventDto {
    /// Event time, when the upstream supplied one
    pub fn timestamp(&self) -> Option<i64> {
        match self {
            EventDto::ItemPurchased(e) | EventDto::ItemSold(e) | EventDto::ItemDestroyed(e) => {
                e.timestamp
            }
            EventDto::ItemUndo(e) => e.timestamp,
            EventDto::SkillLevelUp(e) => e.timestamp,
            EventDto::ChampionKill(e) => e.timestamp,
            EventDto::EliteMonsterKill(e) => e.timestamp,
            EventDto::BuildingKill(e) => e.timestamp,
            EventDto::TurretPlateDestroyed(e) => e.timestamp,
            EventDto::WardPlaced(e) => e.timestamp,
            EventDto::WardKill(e) => e.timestamp,
            EventDto::Unrecognized => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PositionDto {
    pub x: i64,
    pub y: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemEventDto {
    #[serde(default)]
    pub timestamp: Option<i64>,
    pub participant_id: i64,
    #[serde(default)]
    pub item_id: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemUndoDto {
    #[serde(default)]
    pub timestamp: Option<i64>,
    pub participant_id: i64,
    /// Item held before the undo (the reverted purchase)
    #[serde(default)]
    pub before_id: i64,
    /// Item held after the undo (the restored item of a reverted sale)
    #[serde(default)]
    pub after_id: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillLevelUpDto {
    #[serde(default)]
    pub timestamp: Option<i64>,
    pub participant_id: i64,
    pub skill_slot: i64,
    pub level_up_type: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChampionKillDto {
    #[serde(default)]
    pub timestamp: Option<i64>,
    #[serde(default)]
    pub killer_id: i64,
    pub victim_id: i64,
    #[serde(default)]
    pub position: PositionDto,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EliteMonsterKillDto {
    #[serde(default)]
    pub timestamp: Option<i64>,
    #[serde(default)]
    pub monster_type: Option<String>,
    #[serde(default)]
    pub monster_sub_type: Option<String>,
    #[serde(default)]
    pub killer_team_id: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildingKillDto {
    #[serde(default)]
    pub timestamp: Option<i64>,
    #[serde(default)]
    pub building_type: Option<String>,
    #[serde(default)]
    pub lane_type: Option<String>,
    #[serde(default)]
    pub team_id: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurretPlateDto {
    #[serde(default)]
    pub timestamp: Option<i64>,
    #[serde(default)]
    pub lane_type: Option<String>,
    #[serde(default)]
    pub team_id: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WardPlacedDto {
    #[serde(default)]
    pub timestamp: Option<i64>,
    #[serde(default)]
    pub ward_type: Option<String>,
    #[serde(default)]
    pub creator_id: Option<i64>,
    #[serde(default)]
    pub position: Option<PositionDto>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WardKillDto {
    #[serde(default)]
    pub timestamp: Option<i64>,
    #[serde(default)]
    pub ward_type: Option<String>,
    #[serde(default)]
    pub killer_id: Option<i64>,
    #[serde(default)]
    pub position: Option<PositionDto>,
}
