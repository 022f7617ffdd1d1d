//! Major and minor tier lists per role

use super::Report;
use crate::catalog::Catalog;
use crate::csv::{fixed, Table};
use crate::tiering::{ChampionTier, RoleTierTable};
use std::path::Path;
use tracing::info;

const TIER_COLUMNS: [&str; 7] = [
    "champion",
    "tier",
    "win_rate",
    "pick_rate",
    "ban_rate",
    "pick_count",
    "op_score",
];

/// `tiers/Major/{ROLE}_TierList.csv` and `tiers/Minor/{ROLE}_MinorList.csv`
/// for every role with data
pub fn tier_reports(tables: &[RoleTierTable], catalog: &Catalog) -> Vec<Report> {
    let mut reports = Vec::new();
    for table in tables {
        if table.is_empty() {
            info!(role = %table.role, "No data for role, skipping tier list");
            continue;
        }
        let name = table.role.report_name();
        reports.push(Report::new(
            Path::new("tiers").join("Major").join(format!("{name}_TierList.csv")),
            render(table.major(), catalog),
        ));
        reports.push(Report::new(
            Path::new("tiers").join("Minor").join(format!("{name}_MinorList.csv")),
            render(table.minor(), catalog),
        ));
    }
    reports
}

fn render<'a>(rows: impl Iterator<Item = &'a ChampionTier>, catalog: &Catalog) -> Table {
    let mut table = Table::new(&TIER_COLUMNS);
    for row in rows {
        table.push(vec![
            catalog.champion(row.champion_id, &row.champion).to_string(),
            row.tier.label().to_string(),
            fixed(row.win_rate, 2),
            fixed(row.pick_rate, 2),
            fixed(row.ban_rate, 2),
            row.pick_count.to_string(),
            fixed(row.score, 2),
        ]);
    }
    table
}
