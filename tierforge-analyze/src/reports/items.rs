//! Item purchase details per role
//!
//! A purchase counts unless the same participant undid the same item
//! within ten seconds of buying it.

use crate::catalog::Catalog;
use crate::csv::{fixed, Table};
use std::collections::HashMap;
use tierforge_common::models::{ItemAction, MatchRecord, Role, TimelineEvent, EMPTY_ITEM};

pub const UNDO_WINDOW_MS: i64 = 10_000;

/// Groups with fewer purchases are not reported
pub const MIN_ITEM_PURCHASES: usize = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct ItemDetail {
    pub champion_id: i64,
    pub champion: String,
    pub item_id: i64,
    pub pick_count: usize,
    pub win_rate: f64,
    pub avg_purchase_min: f64,
}

#[derive(Default)]
struct Acc {
    count: usize,
    wins: usize,
    ts_sum: i64,
}

/// Purchase groups for champions played in `role`, ordered by champion
/// then by purchase count descending
pub fn item_details(records: &[MatchRecord], events: &[TimelineEvent], role: Role) -> Vec<ItemDetail> {
    let participants: HashMap<(&str, i64), &MatchRecord> = records
        .iter()
        .filter(|r| r.role == Some(role))
        .map(|r| ((r.match_id.as_str(), r.participant_id as i64), r))
        .collect();
    if participants.is_empty() {
        return Vec::new();
    }

    let mut undos: HashMap<(&str, i64, i64), Vec<i64>> = HashMap::new();
    for event in events {
        if let TimelineEvent::ItemTransaction(t) = event {
            if t.action == ItemAction::Undo {
                undos
                    .entry((t.match_id.as_str(), t.participant_id, t.item_id))
                    .or_default()
                    .push(t.timestamp_ms);
            }
        }
    }

    let mut groups: HashMap<(i64, i64), (String, Acc)> = HashMap::new();
    for event in events {
        let TimelineEvent::ItemTransaction(t) = event else {
            continue;
        };
        if t.action != ItemAction::Purchased || t.item_id == EMPTY_ITEM {
            continue;
        }
        let Some(record) = participants.get(&(t.match_id.as_str(), t.participant_id)) else {
            continue;
        };
        let undone = undos
            .get(&(t.match_id.as_str(), t.participant_id, t.item_id))
            .is_some_and(|stamps| {
                stamps
                    .iter()
                    .any(|ts| (t.timestamp_ms..=t.timestamp_ms + UNDO_WINDOW_MS).contains(ts))
            });
        if undone {
            continue;
        }

        let (_, acc) = groups
            .entry((record.champion_id, t.item_id))
            .or_insert_with(|| (record.champion.clone(), Acc::default()));
        acc.count += 1;
        acc.ts_sum += t.timestamp_ms;
        if record.outcome.is_win() {
            acc.wins += 1;
        }
    }

    let mut details: Vec<ItemDetail> = groups
        .into_iter()
        .filter(|(_, (_, acc))| acc.count >= MIN_ITEM_PURCHASES)
        .map(|((champion_id, item_id), (champion, acc))| ItemDetail {
            champion_id,
            champion,
            item_id,
            pick_count: acc.count,
            win_rate: acc.wins as f64 / acc.count as f64 * 100.0,
            avg_purchase_min: acc.ts_sum as f64 / acc.count as f64 / 60_000.0,
        })
        .collect();

    details.sort_by(|a, b| {
        a.champion
            .cmp(&b.champion)
            .then(b.pick_count.cmp(&a.pick_count))
            .then(a.item_id.cmp(&b.item_id))
    });
    details
}

pub fn item_table(details: &[ItemDetail], catalog: &Catalog) -> Table {
    let mut table = Table::new(&[
        "champion",
        "item_id",
        "item_name",
        "pick_count",
        "win_rate",
        "avg_purchase_time_min",
    ]);
    for d in details {
        table.push(vec![
            catalog.champion(d.champion_id, &d.champion).to_string(),
            d.item_id.to_string(),
            catalog.item(d.item_id).unwrap_or_default().to_string(),
            d.pick_count.to_string(),
            fixed(d.win_rate, 2),
            fixed(d.avg_purchase_min, 1),
        ]);
    }
    table
}
