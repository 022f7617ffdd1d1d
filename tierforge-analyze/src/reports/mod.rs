//! Report rendering
//!
//! Every report is a pure function from the corpus to rows; this module
//! collects them into named tables under the report folder.

pub mod champion;
pub mod items;
pub mod macro_stats;
pub mod meta;
pub mod tiers;

use crate::catalog::Catalog;
use crate::corpus::Corpus;
use crate::csv::Table;
use crate::error::{AnalyzeError, Result};
use crate::tiering::RoleTierTable;
use std::path::{Path, PathBuf};
use tierforge_common::models::Role;
use tracing::{debug, info};

/// A table and its path relative to the report folder
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub path: PathBuf,
    pub table: Table,
}

impl Report {
    pub fn new(path: impl Into<PathBuf>, table: Table) -> Self {
        Self {
            path: path.into(),
            table,
        }
    }
}

/// Render every report for the corpus
pub fn render_all(corpus: &Corpus, tiers: &[RoleTierTable], catalog: &Catalog) -> Vec<Report> {
    let mut reports = tiers::tier_reports(tiers, catalog);

    for role in Role::ALL {
        let details = items::item_details(&corpus.records, &corpus.events, role);
        if details.is_empty() {
            debug!(role = %role, "No item groups above the purchase floor");
            continue;
        }
        reports.push(Report::new(
            Path::new("items").join(format!("{}_ItemDetail.csv", role.report_name())),
            items::item_table(&details, catalog),
        ));
    }

    let advanced = Path::new("advanced");
    let macros = macro_stats::champion_macro(&corpus.records, &corpus.events);
    if !macros.is_empty() {
        reports.push(Report::new(
            advanced.join("champion_macro.csv"),
            macro_stats::macro_table(&macros, catalog),
        ));
    }

    for (name, table) in champion::champion_tables(corpus, catalog) {
        reports.push(Report::new(advanced.join(name), table));
    }

    for (name, table) in meta::meta_tables(corpus) {
        reports.push(Report::new(advanced.join(name), table));
    }

    reports
}

/// Write reports under `out_dir`
pub fn write_all(out_dir: &Path, reports: &[Report]) -> Result<usize> {
    for report in reports {
        let path = out_dir.join(&report.path);
        report
            .table
            .write_to(&path)
            .map_err(|source| AnalyzeError::Write {
                path: path.clone(),
                source,
            })?;
        debug!(rows = report.table.len(), "Wrote {}", path.display());
    }
    info!(reports = reports.len(), "Reports written to {}", out_dir.display());
    Ok(reports.len())
}
