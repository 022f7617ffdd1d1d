//! # TierForge collector
//!
//! Builds the match corpus from the upstream API:
//! roster selection, incremental match crawling, timeline extraction.
//! All upstream calls go through one shared [`rate_limiter::RateLimiter`].

pub mod client;
pub mod crawler;
pub mod error;
pub mod normalizer;
pub mod rate_limiter;
pub mod roster;
pub mod timeline;
pub mod version;

pub use crate::error::{CollectError, NormalizeError, Result, Severity, SourceError};
