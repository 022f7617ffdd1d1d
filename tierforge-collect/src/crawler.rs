//! Incremental match crawler
//!
//! Each roster entity runs a small state machine over its match history:
//! list a page of ids, fetch the details not yet collected, write the page
//! as one batch, move on. Entities run concurrently; the shared rate limiter
//! inside [`PacedSource`] serializes the actual calls.
//!
//! The store's collected set is the resume checkpoint. Anything written by
//! an earlier run, for any entity, is never fetched again.

use crate::client::PacedSource;
use crate::error::{CollectError, Result};
use crate::normalizer::normalize_match;
use crate::version::TargetVersion;
use futures::stream::{self, StreamExt, TryStreamExt};
use std::collections::HashSet;
use std::sync::Arc;
use tierforge_common::config::CrawlConfig;
use tierforge_common::models::{patch_of, MatchRecord, RosterEntry};
use tierforge_common::CorpusStore;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

/// Why an entity's crawl ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StopReason {
    /// The source returned an empty page
    Exhausted,
    /// A match from a different content version was reached
    VersionBoundary,
    /// More than the soft cap of fresh matches was collected
    SoftCap,
    /// Listing failed with a skippable error
    ListingFailed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityReport {
    pub rank: u32,
    pub entity_id: String,
    /// Matches this entity added to the store
    pub new_matches: usize,
    pub pages: u32,
    /// Details that failed or could not be normalized
    pub skipped: usize,
    pub stop: StopReason,
}

#[derive(Debug, Clone, Default)]
pub struct CrawlSummary {
    pub reports: Vec<EntityReport>,
}

impl CrawlSummary {
    pub fn new_matches(&self) -> usize {
        self.reports.iter().map(|r| r.new_matches).sum()
    }

    pub fn skipped(&self) -> usize {
        self.reports.iter().map(|r| r.skipped).sum()
    }

    pub fn stopped_by(&self, reason: StopReason) -> usize {
        self.reports.iter().filter(|r| r.stop == reason).count()
    }
}

enum CrawlState {
    Listing {
        start: u32,
    },
    Detailing {
        start: u32,
        ids: Vec<String>,
        cursor: usize,
        batch: Vec<MatchRecord>,
    },
    Done(StopReason),
}

enum DetailOutcome {
    Collected(Vec<MatchRecord>),
    AlreadyCollected,
    Skipped,
    OutOfVersion,
}

pub struct MatchCrawler {
    source: PacedSource,
    store: Arc<dyn CorpusStore>,
    target: TargetVersion,
    queue_id: u32,
    page_size: u32,
    soft_cap: usize,
    concurrency: usize,
}

impl MatchCrawler {
    pub fn new(
        source: PacedSource,
        store: Arc<dyn CorpusStore>,
        target: TargetVersion,
        config: &CrawlConfig,
    ) -> Self {
        Self {
            source,
            store,
            target,
            queue_id: config.queue_id,
            page_size: config.page_size.max(1),
            soft_cap: config.soft_cap,
            concurrency: config.concurrency.max(1),
        }
    }

    /// Crawl every roster entity
    ///
    /// Returns early on a fatal upstream failure or a store failure. Pages
    /// already written stay written, so a rerun resumes where this one ended.
    pub async fn run(&self, roster: &[RosterEntry]) -> Result<CrawlSummary> {
        let collected = self.store.collected_ids().await?;
        info!(
            collected = collected.len(),
            entities = roster.len(),
            target = %self.target,
            "Starting match crawl"
        );
        let claimed = Mutex::new(collected);

        let reports: Vec<EntityReport> = stream::iter(roster)
            .map(|entry| self.crawl_entity(entry, &claimed))
            .buffer_unordered(self.concurrency)
            .try_collect()
            .await?;

        let summary = CrawlSummary { reports };
        info!(
            new_matches = summary.new_matches(),
            skipped = summary.skipped(),
            version_boundary = summary.stopped_by(StopReason::VersionBoundary),
            soft_cap = summary.stopped_by(StopReason::SoftCap),
            "Match crawl complete"
        );
        Ok(summary)
    }

    async fn crawl_entity(
        &self,
        entry: &RosterEntry,
        claimed: &Mutex<HashSet<String>>,
    ) -> Result<EntityReport> {
        let entity = entry.entity_id.as_str();
        let mut new_matches = 0usize;
        let mut pages = 0u32;
        let mut skipped = 0usize;
        let mut state = CrawlState::Listing { start: 0 };

        let stop = loop {
            state = match state {
                CrawlState::Listing { start } => {
                    match self
                        .source
                        .match_ids(entity, self.queue_id, start, self.page_size)
                        .await
                    {
                        Ok(ids) if ids.is_empty() => CrawlState::Done(StopReason::Exhausted),
                        Ok(ids) => {
                            pages += 1;
                            CrawlState::Detailing {
                                start,
                                ids,
                                cursor: 0,
                                batch: Vec::new(),
                            }
                        }
                        Err(e) if e.is_fatal() => {
                            error!(entity = %entity, error = %e, "Credential rejected, aborting crawl");
                            return Err(CollectError::Fatal(e));
                        }
                        Err(e) => {
                            warn!(entity = %entity, start, error = %e, "Listing failed, skipping entity");
                            CrawlState::Done(StopReason::ListingFailed)
                        }
                    }
                }

                CrawlState::Detailing {
                    start,
                    ids,
                    cursor,
                    mut batch,
                } => {
                    let Some(match_id) = ids.get(cursor) else {
                        new_matches += self.flush(entity, &batch).await?;
                        if new_matches > self.soft_cap {
                            state = CrawlState::Done(StopReason::SoftCap);
                            continue;
                        }
                        state = CrawlState::Listing {
                            start: start + self.page_size,
                        };
                        continue;
                    };

                    match self.fetch_detail(match_id, claimed).await? {
                        DetailOutcome::Collected(records) => batch.extend(records),
                        DetailOutcome::AlreadyCollected => {}
                        DetailOutcome::Skipped => skipped += 1,
                        DetailOutcome::OutOfVersion => {
                            new_matches += self.flush(entity, &batch).await?;
                            state = CrawlState::Done(StopReason::VersionBoundary);
                            continue;
                        }
                    }

                    CrawlState::Detailing {
                        start,
                        ids,
                        cursor: cursor + 1,
                        batch,
                    }
                }

                CrawlState::Done(reason) => break reason,
            };
        };

        info!(
            rank = entry.rank,
            entity = %entity,
            new_matches,
            pages,
            stop = ?stop,
            "Entity crawl finished"
        );

        Ok(EntityReport {
            rank: entry.rank,
            entity_id: entity.to_string(),
            new_matches,
            pages,
            skipped,
            stop,
        })
    }

    /// Claim, fetch and normalize one match
    ///
    /// The id stays claimed only when records were produced; every other
    /// outcome releases it so a later run can try again.
    async fn fetch_detail(
        &self,
        match_id: &str,
        claimed: &Mutex<HashSet<String>>,
    ) -> Result<DetailOutcome> {
        if !claimed.lock().await.insert(match_id.to_string()) {
            return Ok(DetailOutcome::AlreadyCollected);
        }

        let outcome = match self.source.match_detail(match_id).await {
            Ok(mut detail) => {
                let version = detail.info.game_version.as_str();
                if patch_of(version).is_none() {
                    warn!(match_id = %match_id, version = %version, "Skipping match with unreadable version");
                    DetailOutcome::Skipped
                } else if !self.target.matches(version) {
                    debug!(match_id = %match_id, version = %version, "Reached version boundary");
                    DetailOutcome::OutOfVersion
                } else {
                    detail.metadata.match_id = match_id.to_string();
                    match normalize_match(&detail) {
                        Ok(records) => DetailOutcome::Collected(records),
                        Err(e) => {
                            warn!(match_id = %match_id, error = %e, "Skipping unusable match");
                            DetailOutcome::Skipped
                        }
                    }
                }
            }
            Err(e) if e.is_fatal() => {
                error!(match_id = %match_id, error = %e, "Credential rejected, aborting crawl");
                return Err(CollectError::Fatal(e));
            }
            Err(e) => {
                warn!(match_id = %match_id, error = %e, "Skipping match detail");
                DetailOutcome::Skipped
            }
        };

        if !matches!(outcome, DetailOutcome::Collected(_)) {
            claimed.lock().await.remove(match_id);
        }
        Ok(outcome)
    }

    async fn flush(&self, entity: &str, batch: &[MatchRecord]) -> Result<usize> {
        if batch.is_empty() {
            return Ok(0);
        }
        let written = self.store.append_match_batch(batch).await?;
        debug!(entity = %entity, matches = written, rows = batch.len(), "Page written");
        Ok(written)
    }
}
