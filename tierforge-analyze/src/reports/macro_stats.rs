//! Champion macro profile: team objectives, vision and lane plates
//! against the average of the role

use crate::catalog::Catalog;
use crate::csv::{fixed, Table};
use std::collections::HashMap;
use tierforge_common::models::{MatchRecord, ObjectiveKind, Role, TimelineEvent};

/// Champions with fewer games in a role are not reported
pub const MIN_MACRO_GAMES: usize = 5;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MacroAverages {
    pub dragon: f64,
    pub baron: f64,
    pub horde: f64,
    pub vision: f64,
    pub wards: f64,
    pub plates: f64,
}

impl MacroAverages {
    fn minus(&self, other: &MacroAverages) -> MacroAverages {
        MacroAverages {
            dragon: self.dragon - other.dragon,
            baron: self.baron - other.baron,
            horde: self.horde - other.horde,
            vision: self.vision - other.vision,
            wards: self.wards - other.wards,
            plates: self.plates - other.plates,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChampionMacro {
    pub role: Role,
    pub champion_id: i64,
    pub champion: String,
    pub averages: MacroAverages,
    /// Difference from the role average
    pub diff: MacroAverages,
    pub win_rate: f64,
    pub game_count: usize,
}

#[derive(Default)]
struct Sums {
    games: usize,
    wins: usize,
    dragon: f64,
    baron: f64,
    horde: f64,
    vision: f64,
    wards: f64,
    plates: f64,
}

impl Sums {
    fn add(&mut self, record: &MatchRecord, plates: usize) {
        self.games += 1;
        if record.outcome.is_win() {
            self.wins += 1;
        }
        self.dragon += record.team_objectives.dragon as f64;
        self.baron += record.team_objectives.baron as f64;
        self.horde += record.team_objectives.horde as f64;
        self.vision += record.metrics.vision_score as f64;
        self.wards += record.metrics.control_wards as f64;
        self.plates += plates as f64;
    }

    fn averages(&self) -> MacroAverages {
        let n = self.games.max(1) as f64;
        MacroAverages {
            dragon: self.dragon / n,
            baron: self.baron / n,
            horde: self.horde / n,
            vision: self.vision / n,
            wards: self.wards / n,
            plates: self.plates / n,
        }
    }
}

/// Plates destroyed per (match, team, lane)
pub(crate) fn plate_counts(events: &[TimelineEvent]) -> HashMap<(&str, i64, &str), usize> {
    let mut counts = HashMap::new();
    for event in events {
        if let TimelineEvent::Objective(o) = event {
            if o.kind != ObjectiveKind::TurretPlate {
                continue;
            }
            if let (Some(team), Some(lane)) = (o.team_id, o.lane.as_deref()) {
                *counts.entry((o.match_id.as_str(), team, lane)).or_insert(0) += 1;
            }
        }
    }
    counts
}

/// Plates the record's team took in the lane of `role`; zero for junglers
pub(crate) fn own_lane_plates<'a>(
    plates: &HashMap<(&'a str, i64, &'a str), usize>,
    record: &'a MatchRecord,
    role: Role,
) -> usize {
    role.plate_lane()
        .and_then(|lane| {
            plates
                .get(&(record.match_id.as_str(), record.side.team_id(), lane))
                .copied()
        })
        .unwrap_or(0)
}

/// Per (role, champion) macro rows, ordered by role then champion
///
/// A record's plates are the plate events of its own team in the lane of
/// its role. Junglers have no lane and always count zero.
pub fn champion_macro(records: &[MatchRecord], events: &[TimelineEvent]) -> Vec<ChampionMacro> {
    let plates = plate_counts(events);

    let mut by_role: HashMap<Role, Sums> = HashMap::new();
    let mut by_champion: HashMap<(Role, i64), (String, Sums)> = HashMap::new();
    for record in records {
        let Some(role) = record.role else {
            continue;
        };
        let plate_count = own_lane_plates(&plates, record, role);

        by_role.entry(role).or_default().add(record, plate_count);
        by_champion
            .entry((role, record.champion_id))
            .or_insert_with(|| (record.champion.clone(), Sums::default()))
            .1
            .add(record, plate_count);
    }

    let mut rows: Vec<ChampionMacro> = by_champion
        .into_iter()
        .filter(|(_, (_, sums))| sums.games >= MIN_MACRO_GAMES)
        .map(|((role, champion_id), (champion, sums))| {
            let averages = sums.averages();
            let role_avg = by_role
                .get(&role)
                .map(Sums::averages)
                .unwrap_or_default();
            ChampionMacro {
                role,
                champion_id,
                champion,
                averages,
                diff: averages.minus(&role_avg),
                win_rate: sums.wins as f64 / sums.games as f64 * 100.0,
                game_count: sums.games,
            }
        })
        .collect();

    rows.sort_by(|a, b| a.role.cmp(&b.role).then_with(|| a.champion.cmp(&b.champion)));
    rows
}

pub fn macro_table(rows: &[ChampionMacro], catalog: &Catalog) -> Table {
    let mut table = Table::new(&[
        "position",
        "champion",
        "avg_dragon",
        "avg_baron",
        "avg_horde",
        "avg_vision",
        "avg_ward",
        "avg_plates",
        "win_rate",
        "game_count",
        "diff_dragon",
        "diff_baron",
        "diff_horde",
        "diff_vision",
        "diff_plates",
    ]);
    for row in rows {
        let avg = &row.averages;
        table.push(vec![
            row.role.as_str().to_string(),
            catalog.champion(row.champion_id, &row.champion).to_string(),
            fixed(avg.dragon, 3),
            fixed(avg.baron, 3),
            fixed(avg.horde, 3),
            fixed(avg.vision, 2),
            fixed(avg.wards, 2),
            fixed(avg.plates, 2),
            fixed(row.win_rate, 2),
            row.game_count.to_string(),
            fixed(row.diff.dragon, 3),
            fixed(row.diff.baron, 3),
            fixed(row.diff.horde, 3),
            fixed(row.diff.vision, 2),
            fixed(row.diff.plates, 2),
        ]);
    }
    table
}
