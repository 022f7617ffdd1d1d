//! Analysis input: match records and timeline events after the duration filter

use crate::error::Result;
use std::collections::{HashMap, HashSet};
use tierforge_common::models::{MatchRecord, Side, TimelineEvent};
use tierforge_common::CorpusStore;
use tracing::info;

#[derive(Debug, Clone, Default)]
pub struct Corpus {
    pub records: Vec<MatchRecord>,
    pub events: Vec<TimelineEvent>,
    /// Matches dropped by the duration filter
    pub excluded_matches: usize,
}

impl Corpus {
    /// Keep records of matches lasting at least `min_duration_secs`, and
    /// only the events of those matches
    pub fn new(records: Vec<MatchRecord>, events: Vec<TimelineEvent>, min_duration_secs: i64) -> Self {
        let mut excluded: HashSet<String> = HashSet::new();
        let records: Vec<MatchRecord> = records
            .into_iter()
            .filter(|r| {
                let keep = r.duration_seconds >= min_duration_secs;
                if !keep {
                    excluded.insert(r.match_id.clone());
                }
                keep
            })
            .collect();

        let kept: HashSet<&str> = records.iter().map(|r| r.match_id.as_str()).collect();
        let events = events
            .into_iter()
            .filter(|e| kept.contains(e.match_id()))
            .collect();

        Self {
            records,
            events,
            excluded_matches: excluded.len(),
        }
    }

    pub async fn load(store: &dyn CorpusStore, min_duration_secs: i64) -> Result<Self> {
        let records = store.load_match_records().await?;
        let events = store.load_timeline_events().await?;
        let corpus = Self::new(records, events, min_duration_secs);
        info!(
            records = corpus.records.len(),
            events = corpus.events.len(),
            matches = corpus.match_count(),
            excluded = corpus.excluded_matches,
            "Loaded corpus"
        );
        Ok(corpus)
    }

    /// Distinct matches
    pub fn match_count(&self) -> usize {
        self.records
            .iter()
            .map(|r| r.match_id.as_str())
            .collect::<HashSet<_>>()
            .len()
    }

    /// Whether each side of each match won
    pub fn side_outcomes(&self) -> HashMap<(&str, Side), bool> {
        let mut outcomes: HashMap<(&str, Side), bool> = HashMap::new();
        for record in &self.records {
            let won = outcomes.entry((record.match_id.as_str(), record.side)).or_insert(false);
            *won |= record.outcome.is_win();
        }
        outcomes
    }
}
