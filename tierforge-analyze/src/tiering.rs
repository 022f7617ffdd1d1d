//! Tiering engine
//!
//! Ranks every champion played in a role by a weighted score of its win
//! rate and its pick-plus-ban presence, then buckets the score percentile
//! into tiers. Champions picked in fewer than 0.5% of matches are held
//! back as Research entries.
//!
//! **Score:** `7 × win_norm + 3 × pick_ban_norm`, where both terms are
//! min-max normalized within the role.

use rayon::prelude::*;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::fmt;
use tierforge_common::models::{MatchRecord, Role, NONE_ID};
use tracing::debug;

/// Share of matches below which a champion is a Research entry
pub const MINOR_PICK_SHARE: f64 = 0.005;

pub const WIN_WEIGHT: f64 = 7.0;
pub const PICK_BAN_WEIGHT: f64 = 3.0;

/// Percentile floors, checked in order
const TIER_FLOORS: [(f64, Tier); 5] = [
    (0.96, Tier::Op),
    (0.85, Tier::One),
    (0.65, Tier::Two),
    (0.40, Tier::Three),
    (0.15, Tier::Four),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    Op,
    One,
    Two,
    Three,
    Four,
    Five,
    Research,
}

impl Tier {
    pub fn from_percentile(percentile: f64) -> Tier {
        TIER_FLOORS
            .iter()
            .find(|(floor, _)| percentile >= *floor)
            .map(|(_, tier)| *tier)
            .unwrap_or(Tier::Five)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Tier::Op => "OP",
            Tier::One => "1 Tier",
            Tier::Two => "2 Tier",
            Tier::Three => "3 Tier",
            Tier::Four => "4 Tier",
            Tier::Five => "5 Tier",
            Tier::Research => "Research",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Picks and wins of one champion in one role
#[derive(Debug, Clone, PartialEq)]
pub struct PickStats {
    pub champion_id: i64,
    pub champion: String,
    pub picks: usize,
    pub wins: usize,
}

/// Corpus-wide ban counts over distinct matches
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BanTally {
    pub total_matches: usize,
    bans: HashMap<i64, usize>,
}

impl BanTally {
    pub fn new(total_matches: usize, bans: HashMap<i64, usize>) -> Self {
        Self {
            total_matches,
            bans,
        }
    }

    /// Count each banned champion once per match
    ///
    /// Every record of a match carries the same ban list, so the first
    /// record seen for a match stands for it.
    pub fn from_records(records: &[MatchRecord]) -> Self {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut bans: HashMap<i64, usize> = HashMap::new();
        for record in records {
            if !seen.insert(record.match_id.as_str()) {
                continue;
            }
            let banned: HashSet<i64> = record
                .bans
                .iter()
                .copied()
                .filter(|id| *id != NONE_ID)
                .collect();
            for id in banned {
                *bans.entry(id).or_insert(0) += 1;
            }
        }
        Self {
            total_matches: seen.len(),
            bans,
        }
    }

    pub fn bans_of(&self, champion_id: i64) -> usize {
        self.bans.get(&champion_id).copied().unwrap_or(0)
    }
}

/// One ranked row of a role table
#[derive(Debug, Clone, PartialEq)]
pub struct ChampionTier {
    pub champion_id: i64,
    pub champion: String,
    pub pick_count: usize,
    pub win_count: usize,
    pub ban_count: usize,
    pub win_rate: f64,
    pub pick_rate: f64,
    pub ban_rate: f64,
    pub win_norm: f64,
    pub pick_ban_norm: f64,
    pub score: f64,
    pub percentile: f64,
    pub tier: Tier,
}

/// Ranked champions of one role, best score first
#[derive(Debug, Clone, PartialEq)]
pub struct RoleTierTable {
    pub role: Role,
    pub total_matches: usize,
    pub rows: Vec<ChampionTier>,
}

impl RoleTierTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn major(&self) -> impl Iterator<Item = &ChampionTier> {
        self.rows.iter().filter(|r| r.tier != Tier::Research)
    }

    pub fn minor(&self) -> impl Iterator<Item = &ChampionTier> {
        self.rows.iter().filter(|r| r.tier == Tier::Research)
    }

    pub fn get(&self, champion_id: i64) -> Option<&ChampionTier> {
        self.rows.iter().find(|r| r.champion_id == champion_id)
    }
}

/// Picks and wins per champion among records assigned to `role`
pub fn pick_stats(records: &[MatchRecord], role: Role) -> Vec<PickStats> {
    let mut by_champion: HashMap<i64, PickStats> = HashMap::new();
    for record in records.iter().filter(|r| r.role == Some(role)) {
        let stats = by_champion
            .entry(record.champion_id)
            .or_insert_with(|| PickStats {
                champion_id: record.champion_id,
                champion: record.champion.clone(),
                picks: 0,
                wins: 0,
            });
        stats.picks += 1;
        if record.outcome.is_win() {
            stats.wins += 1;
        }
    }
    let mut stats: Vec<PickStats> = by_champion.into_values().collect();
    stats.sort_by_key(|s| s.champion_id);
    stats
}

/// Score, rank and bucket one role
pub fn rank_role(role: Role, stats: Vec<PickStats>, tally: &BanTally) -> RoleTierTable {
    let total = tally.total_matches;
    if total == 0 || stats.is_empty() {
        return RoleTierTable {
            role,
            total_matches: total,
            rows: Vec::new(),
        };
    }
    let total_f = total as f64;

    let win_rates: Vec<f64> = stats
        .iter()
        .map(|s| s.wins as f64 / s.picks as f64 * 100.0)
        .collect();
    let presence: Vec<f64> = stats
        .iter()
        .map(|s| (s.picks + tally.bans_of(s.champion_id)) as f64 / total_f * 100.0)
        .collect();
    let win_norms = min_max_normalize(&win_rates);
    let presence_norms = min_max_normalize(&presence);
    let scores: Vec<f64> = win_norms
        .iter()
        .zip(&presence_norms)
        .map(|(w, p)| WIN_WEIGHT * w + PICK_BAN_WEIGHT * p)
        .collect();
    let percentiles = average_rank_percentiles(&scores);

    let research_floor = total_f * MINOR_PICK_SHARE;
    let mut rows: Vec<ChampionTier> = stats
        .into_iter()
        .enumerate()
        .map(|(i, s)| {
            let ban_count = tally.bans_of(s.champion_id);
            let tier = if (s.picks as f64) < research_floor {
                Tier::Research
            } else {
                Tier::from_percentile(percentiles[i])
            };
            ChampionTier {
                champion_id: s.champion_id,
                champion: s.champion,
                pick_count: s.picks,
                win_count: s.wins,
                ban_count,
                win_rate: win_rates[i],
                pick_rate: s.picks as f64 / total_f * 100.0,
                ban_rate: ban_count as f64 / total_f * 100.0,
                win_norm: win_norms[i],
                pick_ban_norm: presence_norms[i],
                score: scores[i],
                percentile: percentiles[i],
                tier,
            }
        })
        .collect();

    rows.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.champion.cmp(&b.champion))
    });

    debug!(
        role = %role,
        champions = rows.len(),
        research = rows.iter().filter(|r| r.tier == Tier::Research).count(),
        "Ranked role"
    );

    RoleTierTable {
        role,
        total_matches: total,
        rows,
    }
}

/// Tier tables for all five roles, computed in parallel
pub fn compute_tiers(records: &[MatchRecord]) -> Vec<RoleTierTable> {
    let tally = BanTally::from_records(records);
    Role::ALL
        .par_iter()
        .map(|role| rank_role(*role, pick_stats(records, *role), &tally))
        .collect()
}

/// Scale to [0, 1]; a constant input maps to all zeros
fn min_max_normalize(values: &[f64]) -> Vec<f64> {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let span = max - min;
    if span <= 0.0 {
        return vec![0.0; values.len()];
    }
    values.iter().map(|v| (v - min) / span).collect()
}

/// Ascending rank divided by count; tied values share their average rank
fn average_rank_percentiles(values: &[f64]) -> Vec<f64> {
    let n = values.len();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|a, b| values[*a].partial_cmp(&values[*b]).unwrap_or(Ordering::Equal));

    let mut percentiles = vec![0.0; n];
    let mut start = 0;
    while start < n {
        let mut end = start + 1;
        while end < n && values[order[end]] == values[order[start]] {
            end += 1;
        }
        // Ranks start..end are 1-based start+1..=end
        let avg_rank = (start + 1 + end) as f64 / 2.0;
        for idx in &order[start..end] {
            percentiles[*idx] = avg_rank / n as f64;
        }
        start = end;
    }
    percentiles
}
