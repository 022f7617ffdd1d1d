//! Storage contract shared by the collector and the analyzer

use crate::models::{MatchRecord, RosterEntry, TimelineEvent};
use crate::Result;
use async_trait::async_trait;
use std::collections::HashSet;

/// Decoded timelines for a group of matches, written as one unit
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimelineBatch {
    /// Matches whose timelines were fully decoded, including ones without events
    pub match_ids: Vec<String>,
    pub events: Vec<TimelineEvent>,
}

impl TimelineBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_match(&mut self, match_id: String, events: Vec<TimelineEvent>) {
        self.match_ids.push(match_id);
        self.events.extend(events);
    }

    /// Number of matches in the batch
    pub fn len(&self) -> usize {
        self.match_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.match_ids.is_empty()
    }
}

/// Append-only corpus store
///
/// All writes are idempotent by match id: appending a match that is already
/// present is a no-op, never an overwrite.
#[async_trait]
pub trait CorpusStore: Send + Sync {
    /// Replace the roster snapshot for a new collection run
    async fn replace_roster(&self, entries: &[RosterEntry]) -> Result<()>;

    /// Roster snapshot ordered by rank
    async fn load_roster(&self) -> Result<Vec<RosterEntry>>;

    /// The CollectedSet: every match id durably written
    async fn collected_ids(&self) -> Result<HashSet<String>>;

    /// Append records of one crawl page; returns the number of new matches
    async fn append_match_batch(&self, records: &[MatchRecord]) -> Result<usize>;

    async fn load_match_records(&self) -> Result<Vec<MatchRecord>>;

    /// Matches whose timelines are durably written
    async fn timeline_done_ids(&self) -> Result<HashSet<String>>;

    /// Write events, then mark their matches done; returns newly marked matches
    async fn append_timeline_batch(&self, batch: &TimelineBatch) -> Result<usize>;

    async fn load_timeline_events(&self) -> Result<Vec<TimelineEvent>>;
}

/// Split records into per-match groups, keeping first-seen order
pub(crate) fn group_by_match(records: &[MatchRecord]) -> Vec<(&str, Vec<&MatchRecord>)> {
    let mut groups: Vec<(&str, Vec<&MatchRecord>)> = Vec::new();
    for record in records {
        match groups.iter_mut().find(|(id, _)| *id == record.match_id) {
            Some((_, group)) => group.push(record),
            None => groups.push((record.match_id.as_str(), vec![record])),
        }
    }
    groups
}
