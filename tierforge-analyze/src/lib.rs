//! tierforge-analyze library
//!
//! Reads the collected corpus, ranks champions per role and renders the
//! tier lists and supplementary reports as CSV files.

pub mod catalog;
pub mod corpus;
pub mod csv;
pub mod error;
pub mod reports;
pub mod tiering;

pub use catalog::Catalog;
pub use corpus::Corpus;
pub use error::{AnalyzeError, Result};
pub use tiering::{compute_tiers, RoleTierTable, Tier};

use std::path::Path;
use tracing::info;

/// Rank every role, render all reports and write them under `out_dir`
///
/// Returns the number of report files written.
pub fn analyze(corpus: &Corpus, catalog: &Catalog, out_dir: &Path) -> Result<usize> {
    let tiers = compute_tiers(&corpus.records);
    for table in &tiers {
        info!(
            role = %table.role,
            champions = table.rows.len(),
            research = table.minor().count(),
            "Role ranked"
        );
    }
    let rendered = reports::render_all(corpus, &tiers, catalog);
    reports::write_all(out_dir, &rendered)
}
