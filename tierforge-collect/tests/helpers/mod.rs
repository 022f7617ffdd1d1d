//! Test helper utilities
//!
//! A scripted upstream and store wrappers shared by the collector tests.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tierforge_collect::client::dto::{
    LeagueItemDto, MatchDto, MatchInfoDto, MatchMetadataDto, ParticipantDto, TeamDto,
    TimelineDto,
};
use tierforge_collect::client::{MatchSource, PacedSource};
use tierforge_collect::rate_limiter::RateLimiter;
use tierforge_collect::SourceError;
use tierforge_common::config::RateLimitConfig;
use tierforge_common::models::{MatchRecord, RosterEntry, TimelineEvent};
use tierforge_common::{CorpusStore, MemoryStore, TimelineBatch};

/// Scripted upstream
///
/// Histories are listed newest first and paged by offset. Every call is
/// recorded so tests can assert on what was fetched.
#[derive(Default)]
pub struct FakeSource {
    pub leagues: HashMap<String, Result<Vec<LeagueItemDto>, SourceError>>,
    pub histories: HashMap<String, Vec<String>>,
    pub details: HashMap<String, MatchDto>,
    pub timelines: HashMap<String, serde_json::Value>,
    pub versions: Vec<String>,
    /// Sticky failures for detail fetches
    pub detail_errors: HashMap<String, SourceError>,
    /// Listing failures keyed by (entity, start)
    pub listing_errors: HashMap<(String, u32), SourceError>,
    /// Ids whose first detail fetch is throttled
    pub throttle_once: Mutex<HashSet<String>>,
    /// How long every call stays in flight
    pub call_delay: Duration,
    calls: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

/// Marks one upstream call as in flight until dropped
pub struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl FakeSource {
    pub fn new() -> Self {
        Self {
            versions: vec!["14.1.1".to_string(), "13.24.1".to_string()],
            ..Default::default()
        }
    }

    /// Add an entity history whose matches all share `version`
    pub fn with_history(mut self, entity: &str, ids: &[&str], version: &str) -> Self {
        for id in ids {
            self.details
                .entry(id.to_string())
                .or_insert_with(|| match_detail(id, version));
        }
        self.histories.insert(
            entity.to_string(),
            ids.iter().map(|id| id.to_string()).collect(),
        );
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of detail fetches issued for `match_id`
    pub fn detail_calls(&self, match_id: &str) -> usize {
        let call = format!("detail:{match_id}");
        self.calls().iter().filter(|c| **c == call).count()
    }

    pub fn total_detail_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| c.starts_with("detail:"))
            .count()
    }

    /// Most calls ever observed in flight at once
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    async fn record(&self, call: String) -> InFlight<'_> {
        self.calls.lock().unwrap().push(call);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let flight = InFlight(&self.in_flight);
        if !self.call_delay.is_zero() {
            tokio::time::sleep(self.call_delay).await;
        }
        flight
    }
}

#[async_trait]
impl MatchSource for FakeSource {
    async fn league_entries(
        &self,
        tier: &str,
        _queue: &str,
    ) -> Result<Vec<LeagueItemDto>, SourceError> {
        let _flight = self.record(format!("league:{tier}")).await;
        self.leagues
            .get(tier)
            .cloned()
            .unwrap_or_else(|| Err(SourceError::NotFound(tier.to_string())))
    }

    async fn match_ids(
        &self,
        entity_id: &str,
        _queue_id: u32,
        start: u32,
        count: u32,
    ) -> Result<Vec<String>, SourceError> {
        let _flight = self.record(format!("ids:{entity_id}:{start}")).await;
        if let Some(err) = self.listing_errors.get(&(entity_id.to_string(), start)) {
            return Err(err.clone());
        }
        let history = self.histories.get(entity_id).cloned().unwrap_or_default();
        Ok(history
            .into_iter()
            .skip(start as usize)
            .take(count as usize)
            .collect())
    }

    async fn match_detail(&self, match_id: &str) -> Result<MatchDto, SourceError> {
        let _flight = self.record(format!("detail:{match_id}")).await;
        if self.throttle_once.lock().unwrap().remove(match_id) {
            return Err(SourceError::RateLimited {
                retry_after: Some(Duration::from_millis(20)),
            });
        }
        if let Some(err) = self.detail_errors.get(match_id) {
            return Err(err.clone());
        }
        self.details
            .get(match_id)
            .cloned()
            .ok_or_else(|| SourceError::NotFound(match_id.to_string()))
    }

    async fn match_timeline(&self, match_id: &str) -> Result<TimelineDto, SourceError> {
        let _flight = self.record(format!("timeline:{match_id}")).await;
        let value = self
            .timelines
            .get(match_id)
            .cloned()
            .ok_or_else(|| SourceError::NotFound(match_id.to_string()))?;
        serde_json::from_value(value).map_err(|e| SourceError::Malformed(e.to_string()))
    }

    async fn versions(&self) -> Result<Vec<String>, SourceError> {
        let _flight = self.record("versions".to_string()).await;
        Ok(self.versions.clone())
    }
}

/// Pacing without waits
pub fn fast_limits() -> RateLimitConfig {
    RateLimitConfig {
        min_interval_ms: 0,
        throttle_fallback_secs: 0,
        max_throttle_wait_secs: 1,
        max_retries: 1,
        jitter_ms: 0,
        budget_requests: 0,
        budget_window_secs: 0,
    }
}

pub fn paced(source: Arc<FakeSource>) -> PacedSource {
    PacedSource::new(source, Arc::new(RateLimiter::new(&fast_limits())))
}

/// Ranked solo match with ten participants, blue side winning
pub fn match_detail(match_id: &str, version: &str) -> MatchDto {
    let positions = ["TOP", "JUNGLE", "MIDDLE", "BOTTOM", "UTILITY"];
    let participants = (0..10)
        .map(|slot| ParticipantDto {
            puuid: format!("{match_id}-p{slot}"),
            participant_id: slot as u32 + 1,
            team_id: if slot < 5 { 100 } else { 200 },
            win: slot < 5,
            champion_id: 1 + slot as i64,
            champion_name: format!("Champ{slot}"),
            team_position: positions[slot % 5].to_string(),
            ..Default::default()
        })
        .collect();

    MatchDto {
        metadata: MatchMetadataDto {
            match_id: match_id.to_string(),
        },
        info: MatchInfoDto {
            game_version: version.to_string(),
            game_duration: 1700,
            queue_id: 420,
            participants,
            teams: vec![
                TeamDto {
                    team_id: 100,
                    win: true,
                    ..Default::default()
                },
                TeamDto {
                    team_id: 200,
                    ..Default::default()
                },
            ],
        },
    }
}

pub fn roster_entry(rank: u32, entity_id: &str) -> RosterEntry {
    RosterEntry {
        rank,
        entity_id: entity_id.to_string(),
        display_name: entity_id.to_string(),
        score: 1500 - rank as i64,
        tier_label: "CHALLENGER".to_string(),
        wins: 100,
        losses: 90,
    }
}

/// Match ids `{prefix}_{n}` for `n` in `range`
pub fn ids(prefix: &str, range: std::ops::Range<u32>) -> Vec<String> {
    range.map(|n| format!("{prefix}_{n}")).collect()
}

pub fn as_strs(ids: &[String]) -> Vec<&str> {
    ids.iter().map(String::as_str).collect()
}

/// Memory store that can be told to fail writes
#[derive(Default)]
pub struct FlakyStore {
    pub inner: MemoryStore,
    pub fail_match_writes_after: Mutex<Option<usize>>,
    pub fail_timeline_writes: Mutex<bool>,
    pub match_writes: AtomicUsize,
    pub timeline_writes: AtomicUsize,
}

#[async_trait]
impl CorpusStore for FlakyStore {
    async fn replace_roster(&self, entries: &[RosterEntry]) -> tierforge_common::Result<()> {
        self.inner.replace_roster(entries).await
    }

    async fn load_roster(&self) -> tierforge_common::Result<Vec<RosterEntry>> {
        self.inner.load_roster().await
    }

    async fn collected_ids(&self) -> tierforge_common::Result<HashSet<String>> {
        self.inner.collected_ids().await
    }

    async fn append_match_batch(&self, records: &[MatchRecord]) -> tierforge_common::Result<usize> {
        let done = self.match_writes.fetch_add(1, Ordering::SeqCst);
        if let Some(limit) = *self.fail_match_writes_after.lock().unwrap() {
            if done >= limit {
                return Err(tierforge_common::Error::Internal("disk full".to_string()));
            }
        }
        self.inner.append_match_batch(records).await
    }

    async fn load_match_records(&self) -> tierforge_common::Result<Vec<MatchRecord>> {
        self.inner.load_match_records().await
    }

    async fn timeline_done_ids(&self) -> tierforge_common::Result<HashSet<String>> {
        self.inner.timeline_done_ids().await
    }

    async fn append_timeline_batch(&self, batch: &TimelineBatch) -> tierforge_common::Result<usize> {
        self.timeline_writes.fetch_add(1, Ordering::SeqCst);
        if *self.fail_timeline_writes.lock().unwrap() {
            return Err(tierforge_common::Error::Internal("disk full".to_string()));
        }
        self.inner.append_timeline_batch(batch).await
    }

    async fn load_timeline_events(&self) -> tierforge_common::Result<Vec<TimelineEvent>> {
        self.inner.load_timeline_events().await
    }
}
