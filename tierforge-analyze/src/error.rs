//! Error types for the analyzer

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AnalyzeError>;

#[derive(Debug, Error)]
pub enum AnalyzeError {
    /// Corpus could not be read
    #[error("Store error: {0}")]
    Store(#[from] tierforge_common::Error),

    #[error("Catalog error in {}: {message}", .path.display())]
    Catalog { path: PathBuf, message: String },

    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
