//! Test helper utilities
//!
//! Builders for synthetic match records and timeline events.

#![allow(dead_code)]

use tierforge_common::models::{
    ItemAction, ItemTransaction, MatchRecord, ObjectiveEvent, ObjectiveKind, Outcome,
    PerformanceMetrics, PerkSummary, Role, Side, TeamObjectives, TimelineEvent, BAN_SLOTS,
    EMPTY_ITEM, ITEM_SLOTS, NONE_ID,
};

/// One participant row; slots 1-5 are blue, 6-10 red, roles follow the slot
pub fn record(match_id: &str, participant_id: u32, champion_id: i64, won: bool) -> MatchRecord {
    let side = if participant_id <= 5 { Side::Blue } else { Side::Red };
    MatchRecord {
        match_id: match_id.to_string(),
        participant_id,
        entity_id: format!("{match_id}-p{participant_id}"),
        version: "14.1.553.1".to_string(),
        duration_seconds: 1800,
        side,
        outcome: if won { Outcome::Win } else { Outcome::Loss },
        role: Some(Role::ALL[((participant_id - 1) % 5) as usize]),
        lane: String::new(),
        champion_id,
        champion: format!("Champ{champion_id}"),
        metrics: PerformanceMetrics {
            vision_score: 25,
            control_wards: 3,
            ..Default::default()
        },
        items: [EMPTY_ITEM; ITEM_SLOTS],
        perks: PerkSummary::default(),
        spells: [4, 14],
        team_objectives: TeamObjectives {
            dragon: if won { 3 } else { 1 },
            baron: if won { 1 } else { 0 },
            horde: 3,
            first_blood: won,
        },
        bans: [NONE_ID; BAN_SLOTS],
    }
}

/// Ten rows of one match; `blue` and `red` list champion ids by role
pub fn full_match(match_id: &str, blue: [i64; 5], red: [i64; 5], blue_wins: bool) -> Vec<MatchRecord> {
    let mut rows = Vec::with_capacity(10);
    for (i, champion) in blue.into_iter().enumerate() {
        rows.push(record(match_id, i as u32 + 1, champion, blue_wins));
    }
    for (i, champion) in red.into_iter().enumerate() {
        rows.push(record(match_id, i as u32 + 6, champion, !blue_wins));
    }
    rows
}

pub fn with_duration(mut rows: Vec<MatchRecord>, seconds: i64) -> Vec<MatchRecord> {
    for row in &mut rows {
        row.duration_seconds = seconds;
    }
    rows
}

pub fn with_bans(mut rows: Vec<MatchRecord>, bans: &[i64]) -> Vec<MatchRecord> {
    let mut padded = [NONE_ID; BAN_SLOTS];
    for (slot, id) in padded.iter_mut().zip(bans) {
        *slot = *id;
    }
    for row in &mut rows {
        row.bans = padded;
    }
    rows
}

pub fn purchase(match_id: &str, participant_id: i64, item_id: i64, ts: i64) -> TimelineEvent {
    TimelineEvent::ItemTransaction(ItemTransaction {
        match_id: match_id.to_string(),
        timestamp_ms: ts,
        participant_id,
        item_id,
        action: ItemAction::Purchased,
    })
}

pub fn dragon(match_id: &str, ts: i64, team_id: i64, subtype: &str) -> TimelineEvent {
    TimelineEvent::Objective(ObjectiveEvent {
        match_id: match_id.to_string(),
        timestamp_ms: ts,
        kind: ObjectiveKind::EliteMonster,
        subtype: Some(subtype.to_string()),
        team_id: Some(team_id),
        lane: None,
    })
}

pub fn plate(match_id: &str, ts: i64, team_id: i64, lane: &str) -> TimelineEvent {
    TimelineEvent::Objective(ObjectiveEvent {
        match_id: match_id.to_string(),
        timestamp_ms: ts,
        kind: ObjectiveKind::TurretPlate,
        subtype: Some("TURRET_PLATE".to_string()),
        team_id: Some(team_id),
        lane: Some(lane.to_string()),
    })
}

/// Parse a written CSV into rows of cells (no quoted fields expected)
pub fn read_csv(path: &std::path::Path) -> Vec<Vec<String>> {
    std::fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("{}: {e}", path.display()))
        .lines()
        .map(|line| line.split(',').map(str::to_string).collect())
        .collect()
}
