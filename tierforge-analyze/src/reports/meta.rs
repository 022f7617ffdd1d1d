//! Corpus-wide meta tables: side balance, objective counts, dragon
//! subtypes, void grubs, game length

use crate::corpus::Corpus;
use crate::csv::{fixed, Table};
use std::collections::{BTreeMap, HashMap};
use tierforge_common::models::{ObjectiveKind, ObjectiveEvent, Side, TeamObjectives, TimelineEvent};

/// Objective counts seen in fewer team-games are not reported
pub const MIN_OBJECTIVE_SAMPLES: usize = 10;

/// Elemental dragons a team needs for the soul
pub const SOUL_DRAGON_COUNT: usize = 4;

/// Samples and wins behind one win rate
#[derive(Debug, Clone, PartialEq)]
pub struct WinTally<K> {
    pub key: K,
    pub samples: usize,
    pub wins: usize,
}

impl<K> WinTally<K> {
    pub fn win_rate(&self) -> f64 {
        if self.samples == 0 {
            return 0.0;
        }
        self.wins as f64 / self.samples as f64 * 100.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectiveCount {
    Dragon,
    Baron,
    Horde,
}

impl ObjectiveCount {
    pub const ALL: [ObjectiveCount; 3] = [
        ObjectiveCount::Dragon,
        ObjectiveCount::Baron,
        ObjectiveCount::Horde,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ObjectiveCount::Dragon => "dragon",
            ObjectiveCount::Baron => "baron",
            ObjectiveCount::Horde => "horde",
        }
    }

    fn of(&self, objectives: &TeamObjectives) -> u32 {
        match self {
            ObjectiveCount::Dragon => objectives.dragon,
            ObjectiveCount::Baron => objectives.baron,
            ObjectiveCount::Horde => objectives.horde,
        }
    }
}

/// One side of one match
#[derive(Debug, Clone, Copy)]
struct TeamGame {
    won: bool,
    objectives: TeamObjectives,
}

fn team_games(corpus: &Corpus) -> HashMap<(&str, Side), TeamGame> {
    let mut games: HashMap<(&str, Side), TeamGame> = HashMap::new();
    for record in &corpus.records {
        let game = games
            .entry((record.match_id.as_str(), record.side))
            .or_insert(TeamGame {
                won: false,
                objectives: record.team_objectives,
            });
        game.won |= record.outcome.is_win();
    }
    games
}

/// Win rate of each side over all matches
pub fn side_win_rates(corpus: &Corpus) -> Vec<WinTally<Side>> {
    let games = team_games(corpus);
    [Side::Blue, Side::Red]
        .into_iter()
        .map(|side| {
            let (samples, wins) = games
                .iter()
                .filter(|((_, s), _)| *s == side)
                .fold((0, 0), |(n, w), (_, g)| (n + 1, w + g.won as usize));
            WinTally {
                key: side,
                samples,
                wins,
            }
        })
        .collect()
}

/// Team win rate by how many of `kind` the team took
pub fn objective_count_win_rates(corpus: &Corpus, kind: ObjectiveCount) -> Vec<WinTally<u32>> {
    let mut by_count: BTreeMap<u32, WinTally<u32>> = BTreeMap::new();
    for game in team_games(corpus).values() {
        let count = kind.of(&game.objectives);
        let tally = by_count.entry(count).or_insert(WinTally {
            key: count,
            samples: 0,
            wins: 0,
        });
        tally.samples += 1;
        tally.wins += game.won as usize;
    }
    by_count
        .into_values()
        .filter(|t| t.samples >= MIN_OBJECTIVE_SAMPLES)
        .collect()
}

fn dragon_kills(corpus: &Corpus) -> Vec<&ObjectiveEvent> {
    let mut kills: Vec<&ObjectiveEvent> = corpus
        .events
        .iter()
        .filter_map(|e| match e {
            TimelineEvent::Objective(o)
                if o.kind == ObjectiveKind::EliteMonster
                    && o.subtype.as_deref().is_some_and(|s| s.contains("DRAGON")) =>
            {
                Some(o)
            }
            _ => None,
        })
        .collect();
    kills.sort_by(|a, b| {
        a.match_id
            .cmp(&b.match_id)
            .then(a.timestamp_ms.cmp(&b.timestamp_ms))
    });
    kills
}

/// Whether the team credited with an objective won its match
fn killer_won(outcomes: &HashMap<(&str, Side), bool>, kill: &ObjectiveEvent) -> Option<bool> {
    let side = Side::from_team_id(kill.team_id?)?;
    Some(outcomes.get(&(kill.match_id.as_str(), side)).copied().unwrap_or(false))
}

fn tally_by_subtype<'a>(
    kills: impl Iterator<Item = &'a ObjectiveEvent>,
    outcomes: &HashMap<(&str, Side), bool>,
) -> Vec<WinTally<String>> {
    let mut by_subtype: BTreeMap<String, WinTally<String>> = BTreeMap::new();
    for kill in kills {
        let Some(subtype) = kill.subtype.as_deref() else {
            continue;
        };
        let tally = by_subtype
            .entry(subtype.to_string())
            .or_insert_with(|| WinTally {
                key: subtype.to_string(),
                samples: 0,
                wins: 0,
            });
        tally.samples += 1;
        tally.wins += killer_won(outcomes, kill).unwrap_or(false) as usize;
    }
    by_subtype.into_values().collect()
}

/// Killing team's win rate per dragon subtype, best first
pub fn dragon_type_win_rates(corpus: &Corpus) -> Vec<WinTally<String>> {
    let outcomes = corpus.side_outcomes();
    let kills = dragon_kills(corpus);
    let mut rows = tally_by_subtype(kills.into_iter(), &outcomes);
    rows.sort_by(|a, b| b.win_rate().total_cmp(&a.win_rate()).then(a.key.cmp(&b.key)));
    rows
}

/// Win rate of teams by the subtype of their soul-granting dragon
///
/// The soul dragon is a team's fourth elemental (non-elder) dragon of the
/// match in timestamp order.
pub fn dragon_soul_win_rates(corpus: &Corpus) -> Vec<WinTally<String>> {
    let outcomes = corpus.side_outcomes();
    let mut taken: HashMap<(&str, i64), usize> = HashMap::new();
    let mut souls = Vec::new();
    for kill in dragon_kills(corpus) {
        if kill.subtype.as_deref().is_some_and(|s| s.contains("ELDER")) {
            continue;
        }
        let Some(team) = kill.team_id else {
            continue;
        };
        let count = taken.entry((kill.match_id.as_str(), team)).or_insert(0);
        *count += 1;
        if *count == SOUL_DRAGON_COUNT {
            souls.push(kill);
        }
    }
    tally_by_subtype(souls.into_iter(), &outcomes)
}

/// Elite monster subtypes counted as grub takes
const GRUB_MARKERS: [&str; 3] = ["HORDE", "ATAKHAN", "GRUB"];

fn is_grub(subtype: &str) -> bool {
    let subtype = subtype.to_ascii_uppercase();
    GRUB_MARKERS.iter().any(|m| subtype.contains(m))
}

/// Team win rate by how many grub takes the team has in a match
///
/// Only teams with at least one take are counted.
pub fn void_grub_win_rates(corpus: &Corpus) -> Vec<WinTally<usize>> {
    let outcomes = corpus.side_outcomes();
    let mut takes: HashMap<(&str, Side), usize> = HashMap::new();
    for event in &corpus.events {
        let TimelineEvent::Objective(o) = event else {
            continue;
        };
        if o.kind != ObjectiveKind::EliteMonster || !o.subtype.as_deref().is_some_and(is_grub) {
            continue;
        }
        if let Some(side) = o.team_id.and_then(Side::from_team_id) {
            *takes.entry((o.match_id.as_str(), side)).or_insert(0) += 1;
        }
    }

    let mut by_count: BTreeMap<usize, WinTally<usize>> = BTreeMap::new();
    for (team, count) in takes {
        let tally = by_count.entry(count).or_insert(WinTally {
            key: count,
            samples: 0,
            wins: 0,
        });
        tally.samples += 1;
        tally.wins += outcomes.get(&team).copied().unwrap_or(false) as usize;
    }
    by_count.into_values().collect()
}

/// Duration in minutes of every match, by match id
pub fn match_durations(corpus: &Corpus) -> Vec<(String, f64)> {
    let mut durations: BTreeMap<&str, i64> = BTreeMap::new();
    for record in &corpus.records {
        durations
            .entry(record.match_id.as_str())
            .or_insert(record.duration_seconds);
    }
    durations
        .into_iter()
        .map(|(id, secs)| (id.to_string(), secs as f64 / 60.0))
        .collect()
}

/// Average match length by total plates destroyed in the match
pub fn plate_impact(corpus: &Corpus) -> Vec<(usize, f64)> {
    let mut plates: HashMap<&str, usize> = HashMap::new();
    for event in &corpus.events {
        if let TimelineEvent::Objective(o) = event {
            if o.kind == ObjectiveKind::TurretPlate {
                *plates.entry(o.match_id.as_str()).or_insert(0) += 1;
            }
        }
    }

    let durations: HashMap<String, f64> = match_durations(corpus).into_iter().collect();
    let mut by_total: BTreeMap<usize, (usize, f64)> = BTreeMap::new();
    for (match_id, total) in plates {
        if let Some(minutes) = durations.get(match_id) {
            let entry = by_total.entry(total).or_insert((0, 0.0));
            entry.0 += 1;
            entry.1 += minutes;
        }
    }
    by_total
        .into_iter()
        .map(|(total, (n, sum))| (total, sum / n as f64))
        .collect()
}

fn win_table<K>(key_column: &'static str, rows: &[WinTally<K>], key: impl Fn(&K) -> String) -> Table {
    let mut table = Table::new(&[key_column, "match_count", "win_count", "win_rate"]);
    for row in rows {
        table.push(vec![
            key(&row.key),
            row.samples.to_string(),
            row.wins.to_string(),
            fixed(row.win_rate(), 2),
        ]);
    }
    table
}

/// All meta tables with their file names; empty tables are left out
pub fn meta_tables(corpus: &Corpus) -> Vec<(String, Table)> {
    if corpus.records.is_empty() {
        return Vec::new();
    }
    let mut tables = vec![(
        "meta_side_win.csv".to_string(),
        win_table("team", &side_win_rates(corpus), |s| s.as_str().to_string()),
    )];

    for kind in ObjectiveCount::ALL {
        let column = match kind {
            ObjectiveCount::Dragon => "dragon_count",
            ObjectiveCount::Baron => "baron_count",
            ObjectiveCount::Horde => "horde_count",
        };
        tables.push((
            format!("meta_{}_count.csv", kind.name()),
            win_table(column, &objective_count_win_rates(corpus, kind), u32::to_string),
        ));
    }

    let mut time_dist = Table::new(&["match_id", "duration_min"]);
    for (match_id, minutes) in match_durations(corpus) {
        time_dist.push(vec![match_id, fixed(minutes, 1)]);
    }
    tables.push(("meta_time_dist.csv".to_string(), time_dist));

    let dragons = dragon_type_win_rates(corpus);
    if !dragons.is_empty() {
        tables.push((
            "dragon_type_stats.csv".to_string(),
            win_table("subtype", &dragons, String::clone),
        ));
    }
    let souls = dragon_soul_win_rates(corpus);
    if !souls.is_empty() {
        tables.push((
            "dragon_soul_stats.csv".to_string(),
            win_table("subtype", &souls, String::clone),
        ));
    }

    let grubs = void_grub_win_rates(corpus);
    if !grubs.is_empty() {
        tables.push((
            "void_grub_stats.csv".to_string(),
            win_table("grub_count", &grubs, usize::to_string),
        ));
    }

    let impact = plate_impact(corpus);
    if !impact.is_empty() {
        let mut table = Table::new(&["total_plates", "avg_duration_min"]);
        for (total, minutes) in impact {
            table.push(vec![total.to_string(), fixed(minutes, 2)]);
        }
        tables.push(("meta_plate_impact.csv".to_string(), table));
    }

    tables
}
