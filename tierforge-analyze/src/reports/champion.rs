//! Per-champion profiles: lane matchups, rune pages, summoner spells, skill
//! orders, sides, game length, laning and vision over time
//!
//! Every profile groups role-assigned records by (role, champion) and some
//! further key. Rows come out ordered by role, champion id, then key.

use super::macro_stats::{own_lane_plates, plate_counts};
use crate::catalog::Catalog;
use crate::corpus::Corpus;
use crate::csv::{fixed, Table};
use std::collections::{BTreeMap, HashMap};
use tierforge_common::models::{MatchRecord, Role, Side, TimelineEvent, WardAction, NONE_ID};

/// Matchups seen fewer times are not reported
pub const MIN_COUNTER_GAMES: usize = 10;

/// Rune, spell and game length groups seen fewer times are not reported
pub const MIN_PROFILE_GAMES: usize = 5;

/// Spell kept in the second column of a spell pair
pub const FLASH_SPELL_ID: i64 = 4;

/// Kills up to this point count as laning kills
pub const EARLY_KILL_CUTOFF_MS: i64 = 840_000;

/// Width of one vision window
pub const VISION_WINDOW_MS: i64 = 300_000;

/// Ward events after this point are ignored
pub const VISION_HORIZON_MS: i64 = 2_400_000;

const SKILL_KEYS: [char; 4] = ['Q', 'W', 'E', 'R'];
const SKILL_MAX_RANK: usize = 5;
const SKILL_PATH_LEVELS: usize = 18;
/// Paths agreeing on this many level-ups are grouped together
const SKILL_MERGE_LEVELS: usize = 15;

/// Games and wins of one champion in one role under `key`
#[derive(Debug, Clone, PartialEq)]
pub struct ChampionTally<K> {
    pub role: Role,
    pub champion_id: i64,
    pub champion: String,
    pub key: K,
    pub games: usize,
    pub wins: usize,
}

impl<K> ChampionTally<K> {
    pub fn win_rate(&self) -> f64 {
        if self.games == 0 {
            return 0.0;
        }
        self.wins as f64 / self.games as f64 * 100.0
    }
}

fn tally_by<'a, K, F>(records: &'a [MatchRecord], min_games: usize, key: F) -> Vec<ChampionTally<K>>
where
    K: Ord + Clone,
    F: Fn(&'a MatchRecord) -> Option<K>,
{
    let mut groups: BTreeMap<(Role, i64, K), ChampionTally<K>> = BTreeMap::new();
    for record in records {
        let Some(role) = record.role else {
            continue;
        };
        let Some(key) = key(record) else {
            continue;
        };
        let tally = groups
            .entry((role, record.champion_id, key.clone()))
            .or_insert_with(|| ChampionTally {
                role,
                champion_id: record.champion_id,
                champion: record.champion.clone(),
                key,
                games: 0,
                wins: 0,
            });
        tally.games += 1;
        tally.wins += record.outcome.is_win() as usize;
    }
    groups
        .into_values()
        .filter(|t| t.games >= min_games)
        .collect()
}

/// Record against the same-role champion of the other side, keyed by the
/// opponent's id and name
pub fn counters(records: &[MatchRecord]) -> Vec<ChampionTally<(i64, String)>> {
    let mut lineup: HashMap<(&str, Role, Side), &MatchRecord> = HashMap::new();
    for record in records {
        if let Some(role) = record.role {
            lineup.insert((record.match_id.as_str(), role, record.side), record);
        }
    }

    tally_by(records, MIN_COUNTER_GAMES, |record| {
        let role = record.role?;
        let enemy = lineup.get(&(record.match_id.as_str(), role, record.side.opposite()))?;
        (enemy.champion_id != record.champion_id)
            .then(|| (enemy.champion_id, enemy.champion.clone()))
    })
}

/// Rune pages keyed by (keystone, primary tree, secondary tree)
pub fn rune_pages(records: &[MatchRecord]) -> Vec<ChampionTally<(i64, i64, i64)>> {
    tally_by(records, MIN_PROFILE_GAMES, |record| {
        let perks = &record.perks;
        let page = (perks.keystone, perks.primary_style, perks.secondary_style);
        (page.0 != NONE_ID && page.1 != NONE_ID && page.2 != NONE_ID).then_some(page)
    })
}

/// Order-free spell pair, with Flash always second
pub fn spell_pair(spells: [i64; 2]) -> (i64, i64) {
    let [a, b] = spells;
    if a == FLASH_SPELL_ID {
        (b, a)
    } else if b == FLASH_SPELL_ID || a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

pub fn spell_pairs(records: &[MatchRecord]) -> Vec<ChampionTally<(i64, i64)>> {
    tally_by(records, MIN_PROFILE_GAMES, |record| {
        if record.spells.contains(&NONE_ID) {
            return None;
        }
        Some(spell_pair(record.spells))
    })
}

pub fn side_win_rates(records: &[MatchRecord]) -> Vec<ChampionTally<&'static str>> {
    tally_by(records, 1, |record| Some(record.side.as_str()))
}

/// Match length band, in minutes
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GameLength {
    Under20,
    To25,
    To30,
    To35,
    To40,
    Over40,
}

impl GameLength {
    pub fn of(duration_seconds: i64) -> Self {
        match duration_seconds {
            s if s < 1200 => GameLength::Under20,
            s if s < 1500 => GameLength::To25,
            s if s < 1800 => GameLength::To30,
            s if s < 2100 => GameLength::To35,
            s if s < 2400 => GameLength::To40,
            _ => GameLength::Over40,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            GameLength::Under20 => "0-20",
            GameLength::To25 => "20-25",
            GameLength::To30 => "25-30",
            GameLength::To35 => "30-35",
            GameLength::To40 => "35-40",
            GameLength::Over40 => "40+",
        }
    }
}

pub fn game_length_win_rates(records: &[MatchRecord]) -> Vec<ChampionTally<GameLength>> {
    tally_by(records, MIN_PROFILE_GAMES, |record| {
        Some(GameLength::of(record.duration_seconds))
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkillOrder {
    pub role: Role,
    pub champion_id: i64,
    pub champion: String,
    /// Basic abilities in the order they reached max rank
    pub master_order: String,
    /// Longest level-up path seen in the group, at most eighteen steps
    pub skill_path: String,
    pub games: usize,
    pub wins: usize,
}

impl SkillOrder {
    pub fn win_rate(&self) -> f64 {
        self.wins as f64 / self.games.max(1) as f64 * 100.0
    }
}

fn skill_index(slot: i64) -> Option<usize> {
    match slot {
        1..=4 => Some(slot as usize - 1),
        _ => None,
    }
}

/// Q, W and E in the order each reached rank five
///
/// Abilities never maxed follow, most-levelled first.
pub fn master_order(slots: &[usize]) -> String {
    let mut ranks = [0usize; 4];
    let mut mastered: Vec<usize> = Vec::with_capacity(3);
    for &slot in slots {
        ranks[slot] += 1;
        if slot < 3 && ranks[slot] == SKILL_MAX_RANK && !mastered.contains(&slot) {
            mastered.push(slot);
        }
    }
    let mut rest: Vec<usize> = (0..3).filter(|s| !mastered.contains(s)).collect();
    rest.sort_by(|a, b| ranks[*b].cmp(&ranks[*a]));
    mastered.extend(rest);

    mastered
        .iter()
        .map(|&s| SKILL_KEYS[s].to_string())
        .collect::<Vec<_>>()
        .join(" > ")
}

fn skill_path(slots: &[usize], steps: usize) -> String {
    slots
        .iter()
        .take(steps)
        .map(|&s| SKILL_KEYS[s].to_string())
        .collect::<Vec<_>>()
        .join(",")
}

/// Skill orders from ability level-ups, grouped by max order and the first
/// fifteen level-ups
pub fn skill_orders(records: &[MatchRecord], events: &[TimelineEvent]) -> Vec<SkillOrder> {
    let mut level_ups: HashMap<(&str, i64), Vec<(i64, usize)>> = HashMap::new();
    for event in events {
        if let TimelineEvent::AbilityLevelUp(e) = event {
            if let Some(slot) = skill_index(e.skill_slot) {
                level_ups
                    .entry((e.match_id.as_str(), e.participant_id))
                    .or_default()
                    .push((e.timestamp_ms, slot));
            }
        }
    }

    let mut groups: BTreeMap<(Role, i64, String, String), SkillOrder> = BTreeMap::new();
    for record in records {
        let Some(role) = record.role else {
            continue;
        };
        let Some(ups) = level_ups.get_mut(&(record.match_id.as_str(), record.participant_id as i64))
        else {
            continue;
        };
        ups.sort_by_key(|(ts, _)| *ts);
        let slots: Vec<usize> = ups.iter().map(|(_, slot)| *slot).collect();

        let master = master_order(&slots);
        let path = skill_path(&slots, SKILL_PATH_LEVELS);
        let merge_key = skill_path(&slots, SKILL_MERGE_LEVELS);
        let group = groups
            .entry((role, record.champion_id, master.clone(), merge_key))
            .or_insert_with(|| SkillOrder {
                role,
                champion_id: record.champion_id,
                champion: record.champion.clone(),
                master_order: master,
                skill_path: String::new(),
                games: 0,
                wins: 0,
            });
        group.games += 1;
        group.wins += record.outcome.is_win() as usize;
        if path.len() > group.skill_path.len() {
            group.skill_path = path;
        }
    }
    groups.into_values().collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChampionLaning {
    pub role: Role,
    pub champion_id: i64,
    pub champion: String,
    pub games: usize,
    pub avg_cs: f64,
    pub avg_gold: f64,
    /// Own-lane turret plates of the champion's team
    pub avg_plates: f64,
    /// Champion kills scored by the player before the laning cutoff
    pub avg_early_kills: f64,
}

#[derive(Default)]
struct LaningSums {
    games: usize,
    cs: f64,
    gold: f64,
    plates: f64,
    early_kills: f64,
}

/// Laning profile per (role, champion), averaged over every game played
pub fn laning(records: &[MatchRecord], events: &[TimelineEvent]) -> Vec<ChampionLaning> {
    let plates = plate_counts(events);
    let mut early_kills: HashMap<(&str, i64), usize> = HashMap::new();
    for event in events {
        if let TimelineEvent::Elimination(kill) = event {
            if kill.killer_id > 0 && kill.timestamp_ms <= EARLY_KILL_CUTOFF_MS {
                *early_kills
                    .entry((kill.match_id.as_str(), kill.killer_id))
                    .or_insert(0) += 1;
            }
        }
    }

    let mut groups: BTreeMap<(Role, i64), (&str, LaningSums)> = BTreeMap::new();
    for record in records {
        let Some(role) = record.role else {
            continue;
        };
        let kills = early_kills
            .get(&(record.match_id.as_str(), record.participant_id as i64))
            .copied()
            .unwrap_or(0);
        let (_, sums) = groups
            .entry((role, record.champion_id))
            .or_insert_with(|| (record.champion.as_str(), LaningSums::default()));
        sums.games += 1;
        sums.cs += record.metrics.cs_total as f64;
        sums.gold += record.metrics.gold_earned as f64;
        sums.plates += own_lane_plates(&plates, record, role) as f64;
        sums.early_kills += kills as f64;
    }

    groups
        .into_iter()
        .map(|((role, champion_id), (champion, sums))| {
            let n = sums.games.max(1) as f64;
            ChampionLaning {
                role,
                champion_id,
                champion: champion.to_string(),
                games: sums.games,
                avg_cs: sums.cs / n,
                avg_gold: sums.gold / n,
                avg_plates: sums.plates / n,
                avg_early_kills: sums.early_kills / n,
            }
        })
        .collect()
}

/// Average wards placed and destroyed in one five-minute window
#[derive(Debug, Clone, PartialEq)]
pub struct VisionWindow {
    pub role: Role,
    pub champion_id: i64,
    pub champion: String,
    /// Window start, in minutes
    pub minute: i64,
    pub placed: f64,
    pub killed: f64,
}

/// Ward activity over time per (role, champion)
///
/// Counts are averaged over the champion's games that lasted past the
/// window start.
pub fn vision_timeline(records: &[MatchRecord], events: &[TimelineEvent]) -> Vec<VisionWindow> {
    let mut players: HashMap<(&str, i64), &MatchRecord> = HashMap::new();
    let mut durations: HashMap<(Role, i64), Vec<i64>> = HashMap::new();
    for record in records {
        let Some(role) = record.role else {
            continue;
        };
        players.insert((record.match_id.as_str(), record.participant_id as i64), record);
        durations
            .entry((role, record.champion_id))
            .or_default()
            .push(record.duration_seconds * 1000);
    }

    let mut windows: BTreeMap<(Role, i64, i64), (&str, usize, usize)> = BTreeMap::new();
    for event in events {
        let TimelineEvent::VisionDevice(ward) = event else {
            continue;
        };
        if ward.timestamp_ms > VISION_HORIZON_MS {
            continue;
        }
        let Some(player) = ward
            .participant_id
            .and_then(|id| players.get(&(ward.match_id.as_str(), id)))
        else {
            continue;
        };
        let Some(role) = player.role else {
            continue;
        };
        let start_ms = ward.timestamp_ms / VISION_WINDOW_MS * VISION_WINDOW_MS;
        let counts = windows
            .entry((role, player.champion_id, start_ms))
            .or_insert((player.champion.as_str(), 0, 0));
        match ward.action {
            WardAction::Placed => counts.1 += 1,
            WardAction::Killed => counts.2 += 1,
        }
    }

    windows
        .into_iter()
        .map(|((role, champion_id, start_ms), (champion, placed, killed))| {
            let games = durations
                .get(&(role, champion_id))
                .map(|d| d.iter().filter(|&&ms| ms > start_ms).count())
                .unwrap_or(0)
                .max(1) as f64;
            VisionWindow {
                role,
                champion_id,
                champion: champion.to_string(),
                minute: start_ms / 60_000,
                placed: placed as f64 / games,
                killed: killed as f64 / games,
            }
        })
        .collect()
}

/// Catalog name, or the bare id
fn named(name: Option<&str>, id: i64) -> String {
    name.map(str::to_string).unwrap_or_else(|| id.to_string())
}

fn tally_table<K>(
    key_columns: &[&'static str],
    rows: &[ChampionTally<K>],
    catalog: &Catalog,
    key: impl Fn(&K) -> Vec<String>,
) -> Table {
    let mut header = vec!["position", "champion"];
    header.extend_from_slice(key_columns);
    header.extend(["total_games", "win_count", "win_rate"]);

    let mut table = Table::new(&header);
    for row in rows {
        let mut cells = vec![
            row.role.as_str().to_string(),
            catalog.champion(row.champion_id, &row.champion).to_string(),
        ];
        cells.extend(key(&row.key));
        cells.extend([
            row.games.to_string(),
            row.wins.to_string(),
            fixed(row.win_rate(), 2),
        ]);
        table.push(cells);
    }
    table
}

/// All champion profile tables with their file names; empty ones are left out
pub fn champion_tables(corpus: &Corpus, catalog: &Catalog) -> Vec<(String, Table)> {
    let records = &corpus.records;
    let events = &corpus.events;
    let mut tables = vec![
        (
            "champion_counters.csv",
            tally_table(&["enemy"], &counters(records), catalog, |(id, name)| {
                vec![catalog.champion(*id, name).to_string()]
            }),
        ),
        (
            "champion_runes.csv",
            tally_table(
                &["keystone", "primary_style", "secondary_style"],
                &rune_pages(records),
                catalog,
                |&(keystone, primary, secondary)| {
                    vec![
                        named(catalog.perk(keystone), keystone),
                        named(catalog.perk(primary), primary),
                        named(catalog.perk(secondary), secondary),
                    ]
                },
            ),
        ),
        (
            "champion_spells.csv",
            tally_table(&["spell1", "spell2"], &spell_pairs(records), catalog, |&(a, b)| {
                vec![named(catalog.spell(a), a), named(catalog.spell(b), b)]
            }),
        ),
        (
            "champion_sides.csv",
            tally_table(&["team"], &side_win_rates(records), catalog, |side| {
                vec![side.to_string()]
            }),
        ),
        (
            "champion_time_stats.csv",
            tally_table(
                &["game_time"],
                &game_length_win_rates(records),
                catalog,
                |length| vec![length.label().to_string()],
            ),
        ),
    ];

    let mut skills = Table::new(&[
        "position",
        "champion",
        "master_order",
        "skill_path",
        "pick_count",
        "win_count",
        "win_rate",
    ]);
    for row in skill_orders(records, events) {
        skills.push(vec![
            row.role.as_str().to_string(),
            catalog.champion(row.champion_id, &row.champion).to_string(),
            row.master_order.clone(),
            row.skill_path.clone(),
            row.games.to_string(),
            row.wins.to_string(),
            fixed(row.win_rate(), 2),
        ]);
    }
    tables.push(("champion_skills.csv", skills));

    let mut lanes = Table::new(&[
        "position",
        "champion",
        "game_count",
        "avg_cs",
        "avg_gold",
        "avg_plates",
        "avg_early_kills",
    ]);
    for row in laning(records, events) {
        lanes.push(vec![
            row.role.as_str().to_string(),
            catalog.champion(row.champion_id, &row.champion).to_string(),
            row.games.to_string(),
            fixed(row.avg_cs, 2),
            fixed(row.avg_gold, 2),
            fixed(row.avg_plates, 2),
            fixed(row.avg_early_kills, 2),
        ]);
    }
    tables.push(("champion_laning.csv", lanes));

    let mut vision = Table::new(&["position", "champion", "time_min", "placed", "killed"]);
    for row in vision_timeline(records, events) {
        vision.push(vec![
            row.role.as_str().to_string(),
            catalog.champion(row.champion_id, &row.champion).to_string(),
            row.minute.to_string(),
            fixed(row.placed, 2),
            fixed(row.killed, 2),
        ]);
    }
    tables.push(("timeline_vision.csv", vision));

    tables
        .into_iter()
        .filter(|(_, table)| !table.is_empty())
        .map(|(name, table)| (name.to_string(), table))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tierforge_common::models::{
        AbilityLevelUp, Elimination, ObjectiveEvent, ObjectiveKind, Outcome, PerformanceMetrics,
        PerkSummary, Position, TeamObjectives, VisionDeviceEvent, BAN_SLOTS, EMPTY_ITEM,
        ITEM_SLOTS,
    };

    fn record(match_id: &str, side: Side, role: Role, champion_id: i64, won: bool) -> MatchRecord {
        let slot = Role::ALL.iter().position(|r| *r == role).unwrap() as u32;
        MatchRecord {
            match_id: match_id.to_string(),
            participant_id: if side == Side::Blue { slot + 1 } else { slot + 6 },
            entity_id: String::new(),
            version: "14.1.1".to_string(),
            duration_seconds: 1800,
            side,
            outcome: if won { Outcome::Win } else { Outcome::Loss },
            role: Some(role),
            lane: String::new(),
            champion_id,
            champion: format!("Champ{champion_id}"),
            metrics: PerformanceMetrics {
                cs_total: 200,
                gold_earned: 10_000,
                ..Default::default()
            },
            items: [EMPTY_ITEM; ITEM_SLOTS],
            perks: PerkSummary::default(),
            spells: [NONE_ID; 2],
            team_objectives: TeamObjectives::default(),
            bans: [NONE_ID; BAN_SLOTS],
        }
    }

    /// Blue top and red top in one match, blue winning when `blue_wins`
    fn top_duel(match_id: &str, blue: i64, red: i64, blue_wins: bool) -> [MatchRecord; 2] {
        [
            record(match_id, Side::Blue, Role::Top, blue, blue_wins),
            record(match_id, Side::Red, Role::Top, red, !blue_wins),
        ]
    }

    fn level_up(match_id: &str, participant_id: i64, ts: i64, slot: i64) -> TimelineEvent {
        TimelineEvent::AbilityLevelUp(AbilityLevelUp {
            match_id: match_id.to_string(),
            timestamp_ms: ts,
            participant_id,
            skill_slot: slot,
            level_up_type: "NORMAL".to_string(),
        })
    }

    fn ward(match_id: &str, participant_id: i64, ts: i64, action: WardAction) -> TimelineEvent {
        TimelineEvent::VisionDevice(VisionDeviceEvent {
            match_id: match_id.to_string(),
            timestamp_ms: ts,
            action,
            ward_type: Some("YELLOW_TRINKET".to_string()),
            participant_id: Some(participant_id),
            position: None,
        })
    }

    #[test]
    fn test_counters_need_ten_games() {
        let mut records = Vec::new();
        for m in 0..12 {
            records.extend(top_duel(&format!("KR_{m}"), 1, 2, m < 9));
        }
        for m in 12..21 {
            records.extend(top_duel(&format!("KR_{m}"), 1, 3, true));
        }

        let rows = counters(&records);
        assert_eq!(rows.len(), 2);
        assert_eq!((rows[0].champion_id, rows[0].key.0), (1, 2));
        assert_eq!((rows[0].games, rows[0].wins), (12, 9));
        assert_eq!(rows[0].win_rate(), 75.0);
        assert_eq!((rows[1].champion_id, rows[1].key.0), (2, 1));
        assert_eq!(rows[1].wins, 3);
    }

    #[test]
    fn test_spell_pairs_put_flash_second() {
        assert_eq!(spell_pair([4, 14]), (14, 4));
        assert_eq!(spell_pair([12, 4]), (12, 4));
        assert_eq!(spell_pair([14, 11]), (11, 14));

        let mut records = Vec::new();
        for m in 0..6 {
            let mut row = record(&format!("KR_{m}"), Side::Blue, Role::Middle, 7, m % 2 == 0);
            row.spells = if m < 3 { [4, 14] } else { [14, 4] };
            records.push(row);
        }
        let mut unknown = record("KR_9", Side::Blue, Role::Middle, 7, true);
        unknown.spells = [NONE_ID, 4];
        records.push(unknown);

        let rows = spell_pairs(&records);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].key, (14, 4));
        assert_eq!((rows[0].games, rows[0].wins), (6, 3));
    }

    #[test]
    fn test_rune_pages_skip_missing_perks() {
        let mut records = Vec::new();
        for m in 0..5 {
            let mut row = record(&format!("KR_{m}"), Side::Red, Role::Bottom, 22, true);
            row.perks = PerkSummary {
                primary_style: 8000,
                keystone: 8008,
                secondary_style: 8100,
            };
            records.push(row);
        }
        records.push(record("KR_5", Side::Red, Role::Bottom, 22, false));

        let rows = rune_pages(&records);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].key, (8008, 8000, 8100));
        assert_eq!(rows[0].wins, 5);

        let catalog = Catalog::parse(r#"{ "perks": { "8008": "Lethal Tempo" } }"#).unwrap();
        let corpus = Corpus::new(records, Vec::new(), 600);
        let tables = champion_tables(&corpus, &catalog);
        let (_, runes) = tables
            .iter()
            .find(|(name, _)| name == "champion_runes.csv")
            .unwrap();
        assert_eq!(runes.rows[0][2..5], ["Lethal Tempo", "8000", "8100"]);
    }

    #[test]
    fn test_master_order() {
        // R at six, Q maxed first, then E; W never reaches five
        let slots = [0, 2, 1, 0, 0, 3, 0, 2, 0, 3, 2, 2, 1, 1, 2, 3];
        assert_eq!(master_order(&slots), "Q > E > W");
        // Nothing maxed: most-levelled first, ties in Q, W, E order
        assert_eq!(master_order(&[1, 2, 1, 0]), "W > Q > E");
        assert_eq!(master_order(&[]), "Q > W > E");
    }

    #[test]
    fn test_skill_orders_group_by_early_path() {
        // Q W E Q Q R Q W Q W R W W E E: Q maxed at nine, W at thirteen
        let base = [1, 2, 3, 1, 1, 4, 1, 2, 1, 2, 4, 2, 2, 3, 3];
        let mut records = Vec::new();
        let mut events = Vec::new();
        for m in 0..3 {
            let id = format!("KR_{m}");
            records.push(record(&id, Side::Blue, Role::Top, 1, m != 2));
            // Pushed newest first; ordering comes from the timestamps
            for (n, slot) in base.iter().enumerate().rev() {
                events.push(level_up(&id, 1, (n as i64 + 1) * 1_000, *slot));
            }
            if m == 0 {
                events.push(level_up(&id, 1, 16_000, 3));
                events.push(level_up(&id, 1, 17_000, 3));
            }
        }
        // Not an ability slot
        events.push(level_up("KR_0", 1, 500, 0));

        let rows = skill_orders(&records, &events);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].master_order, "Q > W > E");
        assert_eq!((rows[0].games, rows[0].wins), (3, 2));
        // The group keeps its longest path
        assert_eq!(rows[0].skill_path, "Q,W,E,Q,Q,R,Q,W,Q,W,R,W,W,E,E,E,E");
    }

    #[test]
    fn test_game_length_bands() {
        assert_eq!(GameLength::of(1199), GameLength::Under20);
        assert_eq!(GameLength::of(1200), GameLength::To25);
        assert_eq!(GameLength::of(1800), GameLength::To35);
        assert_eq!(GameLength::of(2400).label(), "40+");

        let mut records = Vec::new();
        for m in 0..5 {
            let mut row = record(&format!("KR_{m}"), Side::Blue, Role::Jungle, 64, true);
            row.duration_seconds = 1000;
            records.push(row);
        }
        records.push(record("KR_9", Side::Blue, Role::Jungle, 64, true));

        let rows = game_length_win_rates(&records);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].key, GameLength::Under20);
        assert_eq!(rows[0].games, 5);
    }

    #[test]
    fn test_side_rates_per_champion() {
        let mut records = Vec::new();
        records.extend(top_duel("KR_0", 1, 2, true));
        records.extend(top_duel("KR_1", 2, 1, true));

        let rows = side_win_rates(&records);
        let keys: Vec<(i64, &str, usize)> =
            rows.iter().map(|r| (r.champion_id, r.key, r.wins)).collect();
        assert_eq!(
            keys,
            vec![(1, "Blue", 1), (1, "Red", 0), (2, "Blue", 1), (2, "Red", 0)]
        );
    }

    #[test]
    fn test_laning_counts_early_kills_and_plates() {
        let mut records = Vec::new();
        let mut events = Vec::new();
        for m in 0..2 {
            let id = format!("KR_{m}");
            records.extend(top_duel(&id, 1, 2, true));
            events.push(TimelineEvent::Objective(ObjectiveEvent {
                match_id: id.clone(),
                timestamp_ms: 400_000,
                kind: ObjectiveKind::TurretPlate,
                subtype: Some("TURRET_PLATE".to_string()),
                team_id: Some(100),
                lane: Some("TOP_LANE".to_string()),
            }));
        }
        let kill = |ts: i64, killer_id: i64| {
            TimelineEvent::Elimination(Elimination {
                match_id: "KR_0".to_string(),
                timestamp_ms: ts,
                killer_id,
                victim_id: 6,
                position: Position::default(),
            })
        };
        events.push(kill(300_000, 1));
        events.push(kill(840_000, 1));
        // After the laning phase, and a minion kill
        events.push(kill(900_000, 1));
        events.push(kill(100_000, 0));

        let rows = laning(&records, &events);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].champion_id, 1);
        assert_eq!(rows[0].avg_early_kills, 1.0);
        assert_eq!(rows[0].avg_plates, 1.0);
        assert_eq!(rows[0].avg_cs, 200.0);
        assert_eq!(rows[1].avg_early_kills, 0.0);
        assert_eq!(rows[1].avg_plates, 0.0);
    }

    #[test]
    fn test_vision_windows_average_over_games_reaching_them() {
        let mut records = Vec::new();
        let mut short = record("KR_0", Side::Blue, Role::Utility, 40, true);
        short.duration_seconds = 900;
        records.push(short);
        records.push(record("KR_1", Side::Blue, Role::Utility, 40, false));

        let events = vec![
            ward("KR_0", 5, 60_000, WardAction::Placed),
            ward("KR_1", 5, 90_000, WardAction::Placed),
            ward("KR_1", 5, 120_000, WardAction::Killed),
            ward("KR_1", 5, 1_200_000, WardAction::Placed),
            // Past the horizon, and from a player not in the corpus
            ward("KR_1", 5, 2_500_000, WardAction::Placed),
            ward("KR_1", 9, 60_000, WardAction::Placed),
        ];

        let rows = vision_timeline(&records, &events);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].minute, 0);
        assert_eq!(rows[0].placed, 1.0);
        assert_eq!(rows[0].killed, 0.5);
        // Only the longer game reached minute twenty
        assert_eq!(rows[1].minute, 20);
        assert_eq!(rows[1].placed, 1.0);
    }
}
