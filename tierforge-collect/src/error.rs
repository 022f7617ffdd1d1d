//! Error types for the collector
//!
//! Upstream failures carry a [`Severity`] that decides whether the run
//! aborts, waits and retries once, or skips the item.

use std::time::Duration;
use thiserror::Error;

/// How a failure affects the run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Abort the whole run
    Fatal,
    /// Wait, then retry the same request a bounded number of times
    Retryable,
    /// Log and continue; the item is absent from output
    Skippable,
}

/// Failure of a single upstream call
#[derive(Debug, Clone, Error)]
pub enum SourceError {
    #[error("Rate limited (retry after {retry_after:?})")]
    RateLimited { retry_after: Option<Duration> },

    #[error("Credential rejected (HTTP {0})")]
    Forbidden(u16),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Malformed payload: {0}")]
    Malformed(String),

    #[error("Still throttled after {0} attempts")]
    ThrottleExhausted(u32),
}

impl SourceError {
    pub fn severity(&self) -> Severity {
        match self {
            SourceError::Forbidden(_) => Severity::Fatal,
            SourceError::RateLimited { .. } => Severity::Retryable,
            SourceError::NotFound(_)
            | SourceError::Http { .. }
            | SourceError::Transport(_)
            | SourceError::Malformed(_)
            | SourceError::ThrottleExhausted(_) => Severity::Skippable,
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

/// Match detail that cannot be turned into records
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    #[error("match detail carries no match id")]
    MissingMatchId,

    #[error("match {0} has no participants")]
    NoParticipants(String),

    #[error("match {0} has no version string")]
    MissingVersion(String),

    #[error("match {match_id}: participant {slot} has unknown team id {team_id}")]
    UnknownTeam {
        match_id: String,
        slot: usize,
        team_id: i64,
    },
}

/// Run-level collector failure
#[derive(Debug, Error)]
pub enum CollectError {
    #[error("Fatal upstream failure: {0}")]
    Fatal(SourceError),

    #[error("Store error: {0}")]
    Store(#[from] tierforge_common::Error),

    #[error("Roster is empty: no tier returned a usable entry")]
    EmptyRoster,

    #[error("Version list is empty or unparseable")]
    NoTargetVersion,

    #[error(transparent)]
    Normalize(#[from] NormalizeError),
}

pub type Result<T> = std::result::Result<T, CollectError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_mapping() {
        assert_eq!(SourceError::Forbidden(403).severity(), Severity::Fatal);
        assert_eq!(
            SourceError::RateLimited { retry_after: None }.severity(),
            Severity::Retryable
        );
        assert_eq!(
            SourceError::Transport("timed out".into()).severity(),
            Severity::Skippable
        );
        assert!(!SourceError::ThrottleExhausted(2).is_fatal());
    }
}
