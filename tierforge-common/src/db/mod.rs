//! Corpus storage
//!
//! The collector appends through [`CorpusStore`]; the analyzer reads through
//! it. Components receive the store as an explicit handle so tests can run
//! against [`MemoryStore`].

#[cfg(feature = "sqlx")]
pub mod init;
pub mod memory;
#[cfg(feature = "sqlx")]
pub mod schema;
#[cfg(feature = "sqlx")]
pub mod sqlite;
pub mod store;

#[cfg(feature = "sqlx")]
pub use init::init_database;
pub use memory::MemoryStore;
#[cfg(feature = "sqlx")]
pub use sqlite::SqliteStore;
pub use store::{CorpusStore, TimelineBatch};
