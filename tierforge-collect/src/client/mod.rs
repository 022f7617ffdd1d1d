//! Upstream match data source
//!
//! [`MatchSource`] is the seam between the collector and the network.
//! [`PacedSource`] wraps any source with the shared [`RateLimiter`] so every
//! call goes through the same pacing and throttle-retry policy.

pub mod dto;
mod riot;

pub use riot::RiotClient;

use crate::error::SourceError;
use crate::rate_limiter::RateLimiter;
use async_trait::async_trait;
use dto::{LeagueItemDto, MatchDto, TimelineDto};
use std::sync::Arc;

/// Raw upstream operations, one network call each
#[async_trait]
pub trait MatchSource: Send + Sync {
    /// Ranked entries of one league tier
    async fn league_entries(&self, tier: &str, queue: &str)
        -> Result<Vec<LeagueItemDto>, SourceError>;

    /// One page of an entity's match history, newest first
    async fn match_ids(
        &self,
        entity_id: &str,
        queue_id: u32,
        start: u32,
        count: u32,
    ) -> Result<Vec<String>, SourceError>;

    async fn match_detail(&self, match_id: &str) -> Result<MatchDto, SourceError>;

    async fn match_timeline(&self, match_id: &str) -> Result<TimelineDto, SourceError>;

    /// Known content versions, newest first
    async fn versions(&self) -> Result<Vec<String>, SourceError>;
}

/// A [`MatchSource`] behind the shared rate limiter
#[derive(Clone)]
pub struct PacedSource {
    source: Arc<dyn MatchSource>,
    limiter: Arc<RateLimiter>,
}

impl PacedSource {
    pub fn new(source: Arc<dyn MatchSource>, limiter: Arc<RateLimiter>) -> Self {
        Self { source, limiter }
    }

    pub async fn league_entries(
        &self,
        tier: &str,
        queue: &str,
    ) -> Result<Vec<LeagueItemDto>, SourceError> {
        self.limiter
            .run("league entries", || self.source.league_entries(tier, queue))
            .await
    }

    pub async fn match_ids(
        &self,
        entity_id: &str,
        queue_id: u32,
        start: u32,
        count: u32,
    ) -> Result<Vec<String>, SourceError> {
        self.limiter
            .run("match ids", || {
                self.source.match_ids(entity_id, queue_id, start, count)
            })
            .await
    }

    pub async fn match_detail(&self, match_id: &str) -> Result<MatchDto, SourceError> {
        self.limiter
            .run("match detail", || self.source.match_detail(match_id))
            .await
    }

    pub async fn match_timeline(&self, match_id: &str) -> Result<TimelineDto, SourceError> {
        self.limiter
            .run("match timeline", || self.source.match_timeline(match_id))
            .await
    }

    pub async fn versions(&self) -> Result<Vec<String>, SourceError> {
        self.limiter
            .run("versions", || self.source.versions())
            .await
    }
}
