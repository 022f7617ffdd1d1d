//! Ranked roster selection

use crate::client::dto::LeagueItemDto;
use crate::client::PacedSource;
use crate::error::{CollectError, Result};
use std::collections::HashSet;
use tierforge_common::models::RosterEntry;
use tracing::{error, info, warn};

/// League entry tagged with the tier it was fetched from
#[derive(Debug, Clone)]
pub struct Candidate {
    pub tier_label: String,
    pub entry: LeagueItemDto,
}

/// Fetch every tier, then rank the pooled entries
///
/// A failing tier is logged and skipped unless the failure is fatal.
pub async fn select_roster(
    source: &PacedSource,
    tiers: &[String],
    queue: &str,
    size: usize,
) -> Result<Vec<RosterEntry>> {
    let mut candidates = Vec::new();

    for tier in tiers {
        match source.league_entries(tier, queue).await {
            Ok(entries) => {
                info!(tier = %tier, entries = entries.len(), "Fetched league tier");
                candidates.extend(entries.into_iter().map(|entry| Candidate {
                    tier_label: tier.clone(),
                    entry,
                }));
            }
            Err(e) if e.is_fatal() => {
                error!(tier = %tier, error = %e, "Credential rejected, aborting roster fetch");
                return Err(CollectError::Fatal(e));
            }
            Err(e) => warn!(tier = %tier, error = %e, "Skipping tier"),
        }
    }

    let roster = rank_roster(candidates, size);
    if roster.is_empty() {
        return Err(CollectError::EmptyRoster);
    }
    info!(size = roster.len(), "Roster selected");
    Ok(roster)
}

/// Pool, sort by score descending, truncate and number from 1
///
/// Entries without an entity id are discarded. The sort is stable, so fetch
/// order breaks ties. An entity listed twice keeps its first occurrence.
pub fn rank_roster(candidates: Vec<Candidate>, size: usize) -> Vec<RosterEntry> {
    let mut seen = HashSet::new();
    let mut usable: Vec<Candidate> = candidates
        .into_iter()
        .filter(|c| {
            c.entry
                .puuid
                .as_deref()
                .map(str::trim)
                .is_some_and(|id| !id.is_empty())
        })
        .collect();

    usable.sort_by(|a, b| b.entry.league_points.cmp(&a.entry.league_points));

    usable
        .into_iter()
        .filter_map(|c| {
            let entity_id = c.entry.puuid?.trim().to_string();
            if !seen.insert(entity_id.clone()) {
                return None;
            }
            Some(RosterEntry {
                rank: 0,
                display_name: c.entry.summoner_name.unwrap_or_default(),
                entity_id,
                score: c.entry.league_points,
                tier_label: c.tier_label,
                wins: c.entry.wins,
                losses: c.entry.losses,
            })
        })
        .take(size)
        .enumerate()
        .map(|(i, entry)| RosterEntry {
            rank: i as u32 + 1,
            ..entry
        })
        .collect()
}
