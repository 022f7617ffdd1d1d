//! # TierForge Common Library
//!
//! Shared code for the collector and the analyzer:
//! - Domain models (roster entries, match records, timeline events)
//! - Corpus storage (`CorpusStore` trait, SQLite and in-memory stores)
//! - Configuration loading and resolution
//! - Error types

pub mod config;
pub mod db;
pub mod error;
pub mod models;

pub use db::{CorpusStore, MemoryStore, TimelineBatch};
#[cfg(feature = "sqlx")]
pub use db::SqliteStore;
pub use error::{Error, Result};
