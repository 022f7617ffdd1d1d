//! Domain models shared by collection and analysis
//!
//! Records are produced once by the collector and never rewritten. The
//! analyzer only reads them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Sentinel for an unused item slot
pub const EMPTY_ITEM: i64 = 0;

/// Sentinel for a missing ban, perk or spell
pub const NONE_ID: i64 = -1;

/// Number of item slots per participant (six inventory slots plus trinket)
pub const ITEM_SLOTS: usize = 7;

/// Number of ban slots per match (five per team)
pub const BAN_SLOTS: usize = 10;

/// One row of a roster snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterEntry {
    /// Dense 1-based rank, assigned after the global sort
    pub rank: u32,
    /// Stable upstream identifier of the player
    pub entity_id: String,
    pub display_name: String,
    /// League points
    pub score: i64,
    /// League tier the entry was fetched from
    pub tier_label: String,
    pub wins: u32,
    pub losses: u32,
}

/// One of the five fixed lane assignments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Role {
    Top,
    Jungle,
    Middle,
    Bottom,
    Utility,
}

impl Role {
    pub const ALL: [Role; 5] = [
        Role::Top,
        Role::Jungle,
        Role::Middle,
        Role::Bottom,
        Role::Utility,
    ];

    /// Upstream position string
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Top => "TOP",
            Role::Jungle => "JUNGLE",
            Role::Middle => "MIDDLE",
            Role::Bottom => "BOTTOM",
            Role::Utility => "UTILITY",
        }
    }

    /// Name used for report files (`UTILITY` is published as `SUPPORT`)
    pub fn report_name(&self) -> &'static str {
        match self {
            Role::Utility => "SUPPORT",
            other => other.as_str(),
        }
    }

    /// Lane string carried by turret plate events for this role
    pub fn plate_lane(&self) -> Option<&'static str> {
        match self {
            Role::Top => Some("TOP_LANE"),
            Role::Middle => Some("MID_LANE"),
            Role::Bottom | Role::Utility => Some("BOT_LANE"),
            Role::Jungle => None,
        }
    }

    /// Parse an upstream position; blank or unknown positions have no role
    pub fn from_position(position: &str) -> Option<Role> {
        position.parse().ok()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TOP" => Ok(Role::Top),
            "JUNGLE" => Ok(Role::Jungle),
            "MIDDLE" => Ok(Role::Middle),
            "BOTTOM" => Ok(Role::Bottom),
            "UTILITY" => Ok(Role::Utility),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// Map side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Blue,
    Red,
}

impl Side {
    /// Upstream team id (100 blue, 200 red)
    pub fn from_team_id(team_id: i64) -> Option<Side> {
        match team_id {
            100 => Some(Side::Blue),
            200 => Some(Side::Red),
            _ => None,
        }
    }

    pub fn team_id(&self) -> i64 {
        match self {
            Side::Blue => 100,
            Side::Red => 200,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Blue => "Blue",
            Side::Red => "Red",
        }
    }

    pub fn opposite(&self) -> Side {
        match self {
            Side::Blue => Side::Red,
            Side::Red => Side::Blue,
        }
    }
}

impl FromStr for Side {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Blue" => Ok(Side::Blue),
            "Red" => Ok(Side::Red),
            other => Err(format!("unknown side: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    Win,
    Loss,
}

impl Outcome {
    pub fn is_win(&self) -> bool {
        matches!(self, Outcome::Win)
    }
}

/// Rune page summary: primary tree, keystone, secondary tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerkSummary {
    pub primary_style: i64,
    pub keystone: i64,
    pub secondary_style: i64,
}

impl Default for PerkSummary {
    fn default() -> Self {
        Self {
            primary_style: NONE_ID,
            keystone: NONE_ID,
            secondary_style: NONE_ID,
        }
    }
}

/// Objective totals of the participant's team
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamObjectives {
    pub dragon: u32,
    pub baron: u32,
    pub horde: u32,
    pub first_blood: bool,
}

/// Per-participant combat and economy numbers
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub kills: u32,
    pub deaths: u32,
    pub assists: u32,
    pub kda: f64,
    pub solo_kills: u32,
    pub total_damage: i64,
    pub damage_taken: i64,
    pub cs_total: i64,
    pub gold_earned: i64,
    pub vision_score: i64,
    pub control_wards: i64,
}

/// One row per participant per match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub match_id: String,
    /// 1-based participant slot within the match
    pub participant_id: u32,
    pub entity_id: String,
    pub version: String,
    pub duration_seconds: i64,
    pub side: Side,
    pub outcome: Outcome,
    pub role: Option<Role>,
    pub lane: String,
    pub champion_id: i64,
    pub champion: String,
    pub metrics: PerformanceMetrics,
    pub items: [i64; ITEM_SLOTS],
    pub perks: PerkSummary,
    pub spells: [i64; 2],
    pub team_objectives: TeamObjectives,
    /// Champion ids banned in the match, both teams, padded with `NONE_ID`
    pub bans: [i64; BAN_SLOTS],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemAction {
    Purchased,
    Sold,
    Destroyed,
    Undo,
}

impl ItemAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemAction::Purchased => "ITEM_PURCHASED",
            ItemAction::Sold => "ITEM_SOLD",
            ItemAction::Destroyed => "ITEM_DESTROYED",
            ItemAction::Undo => "ITEM_UNDO",
        }
    }
}

impl FromStr for ItemAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ITEM_PURCHASED" => Ok(ItemAction::Purchased),
            "ITEM_SOLD" => Ok(ItemAction::Sold),
            "ITEM_DESTROYED" => Ok(ItemAction::Destroyed),
            "ITEM_UNDO" => Ok(ItemAction::Undo),
            other => Err(format!("unknown item action: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectiveKind {
    EliteMonster,
    Building,
    TurretPlate,
}

impl ObjectiveKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectiveKind::EliteMonster => "ELITE_MONSTER_KILL",
            ObjectiveKind::Building => "BUILDING_KILL",
            ObjectiveKind::TurretPlate => "TURRET_PLATE_DESTROYED",
        }
    }
}

impl FromStr for ObjectiveKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ELITE_MONSTER_KILL" => Ok(ObjectiveKind::EliteMonster),
            "BUILDING_KILL" => Ok(ObjectiveKind::Building),
            "TURRET_PLATE_DESTROYED" => Ok(ObjectiveKind::TurretPlate),
            other => Err(format!("unknown objective kind: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WardAction {
    Placed,
    Killed,
}

impl WardAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            WardAction::Placed => "WARD_PLACED",
            WardAction::Killed => "WARD_KILL",
        }
    }
}

impl FromStr for WardAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "WARD_PLACED" => Ok(WardAction::Placed),
            "WARD_KILL" => Ok(WardAction::Killed),
            other => Err(format!("unknown ward action: {other}")),
        }
    }
}

/// Map coordinates of an event
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub x: i64,
    pub y: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemTransaction {
    pub match_id: String,
    pub timestamp_ms: i64,
    pub participant_id: i64,
    /// For undo events, the item whose transaction was reverted
    pub item_id: i64,
    pub action: ItemAction,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbilityLevelUp {
    pub match_id: String,
    pub timestamp_ms: i64,
    pub participant_id: i64,
    pub skill_slot: i64,
    pub level_up_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Elimination {
    pub match_id: String,
    pub timestamp_ms: i64,
    /// 0 when the kill was not credited to a champion
    pub killer_id: i64,
    pub victim_id: i64,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectiveEvent {
    pub match_id: String,
    pub timestamp_ms: i64,
    pub kind: ObjectiveKind,
    /// Monster subtype (dragon element), building type, or `TURRET_PLATE`
    pub subtype: Option<String>,
    pub team_id: Option<i64>,
    pub lane: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisionDeviceEvent {
    pub match_id: String,
    pub timestamp_ms: i64,
    pub action: WardAction,
    pub ward_type: Option<String>,
    /// Creator for placements, killer for kills
    pub participant_id: Option<i64>,
    pub position: Option<Position>,
}

/// Typed event decoded from a match timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TimelineEvent {
    ItemTransaction(ItemTransaction),
    AbilityLevelUp(AbilityLevelUp),
    Elimination(Elimination),
    Objective(ObjectiveEvent),
    VisionDevice(VisionDeviceEvent),
}

impl TimelineEvent {
    pub fn match_id(&self) -> &str {
        match self {
            TimelineEvent::ItemTransaction(e) => &e.match_id,
            TimelineEvent::AbilityLevelUp(e) => &e.match_id,
            TimelineEvent::Elimination(e) => &e.match_id,
            TimelineEvent::Objective(e) => &e.match_id,
            TimelineEvent::VisionDevice(e) => &e.match_id,
        }
    }

    pub fn timestamp_ms(&self) -> i64 {
        match self {
            TimelineEvent::ItemTransaction(e) => e.timestamp_ms,
            TimelineEvent::AbilityLevelUp(e) => e.timestamp_ms,
            TimelineEvent::Elimination(e) => e.timestamp_ms,
            TimelineEvent::Objective(e) => e.timestamp_ms,
            TimelineEvent::VisionDevice(e) => e.timestamp_ms,
        }
    }
}

/// Split a version string into its `major.minor` prefix
///
/// `"14.1.553.1234"` becomes `"14.1"`. Returns `None` for strings without
/// two numeric components.
pub fn patch_of(version: &str) -> Option<String> {
    let mut parts = version.split('.');
    let major = parts.next()?.trim();
    let minor = parts.next()?.trim();
    if major.parse::<u32>().is_err() || minor.parse::<u32>().is_err() {
        return None;
    }
    Some(format!("{major}.{minor}"))
}
