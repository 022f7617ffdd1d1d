//! In-memory corpus store for tests and dry runs

use super::store::{group_by_match, CorpusStore, TimelineBatch};
use crate::models::{MatchRecord, RosterEntry, TimelineEvent};
use crate::Result;
use async_trait::async_trait;
use std::collections::HashSet;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct Inner {
    roster: Vec<RosterEntry>,
    records: Vec<MatchRecord>,
    collected: HashSet<String>,
    events: Vec<TimelineEvent>,
    timeline_done: HashSet<String>,
}

/// Corpus held entirely in memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of participant rows written so far
    pub async fn record_count(&self) -> usize {
        self.inner.read().await.records.len()
    }
}

#[async_trait]
impl CorpusStore for MemoryStore {
    async fn replace_roster(&self, entries: &[RosterEntry]) -> Result<()> {
        self.inner.write().await.roster = entries.to_vec();
        Ok(())
    }

    async fn load_roster(&self) -> Result<Vec<RosterEntry>> {
        Ok(self.inner.read().await.roster.clone())
    }

    async fn collected_ids(&self) -> Result<HashSet<String>> {
        Ok(self.inner.read().await.collected.clone())
    }

    async fn append_match_batch(&self, records: &[MatchRecord]) -> Result<usize> {
        let mut inner = self.inner.write().await;
        let mut new_matches = 0;
        for (match_id, group) in group_by_match(records) {
            if !inner.collected.insert(match_id.to_string()) {
                continue;
            }
            inner.records.extend(group.into_iter().cloned());
            new_matches += 1;
        }
        Ok(new_matches)
    }

    async fn load_match_records(&self) -> Result<Vec<MatchRecord>> {
        Ok(self.inner.read().await.records.clone())
    }

    async fn timeline_done_ids(&self) -> Result<HashSet<String>> {
        Ok(self.inner.read().await.timeline_done.clone())
    }

    async fn append_timeline_batch(&self, batch: &TimelineBatch) -> Result<usize> {
        let mut inner = self.inner.write().await;
        let fresh: HashSet<&str> = batch
            .match_ids
            .iter()
            .map(String::as_str)
            .filter(|id| !inner.timeline_done.contains(*id))
            .collect();

        let events: Vec<TimelineEvent> = batch
            .events
            .iter()
            .filter(|e| fresh.contains(e.match_id()))
            .cloned()
            .collect();
        inner.events.extend(events);

        for id in &fresh {
            inner.timeline_done.insert((*id).to_string());
        }
        Ok(fresh.len())
    }

    async fn load_timeline_events(&self) -> Result<Vec<TimelineEvent>> {
        Ok(self.inner.read().await.events.clone())
    }
}
