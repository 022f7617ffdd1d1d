//! Display names for report rendering
//!
//! The catalog is optional. Every lookup falls back to what the corpus
//! already carries (the upstream champion name, or the bare id).

use crate::error::{AnalyzeError, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

/// Id to name tables, keyed by numeric id
///
/// ```json
/// { "champions": { "266": "Aatrox" }, "items": { "1055": "Doran's Blade" } }
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Catalog {
    champions: HashMap<i64, String>,
    items: HashMap<i64, String>,
    spells: HashMap<i64, String>,
    perks: HashMap<i64, String>,
}

impl Catalog {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| AnalyzeError::Catalog {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let catalog = Self::parse(&content).map_err(|message| AnalyzeError::Catalog {
            path: path.to_path_buf(),
            message,
        })?;
        info!(
            champions = catalog.champions.len(),
            items = catalog.items.len(),
            "Loaded display catalog from {}",
            path.display()
        );
        Ok(catalog)
    }

    pub fn parse(content: &str) -> std::result::Result<Self, String> {
        serde_json::from_str(content).map_err(|e| e.to_string())
    }

    /// Champion display name, or `fallback` when the catalog has none
    pub fn champion<'a>(&'a self, id: i64, fallback: &'a str) -> &'a str {
        self.champions.get(&id).map(String::as_str).unwrap_or(fallback)
    }

    pub fn item(&self, id: i64) -> Option<&str> {
        self.items.get(&id).map(String::as_str)
    }

    pub fn spell(&self, id: i64) -> Option<&str> {
        self.spells.get(&id).map(String::as_str)
    }

    pub fn perk(&self, id: i64) -> Option<&str> {
        self.perks.get(&id).map(String::as_str)
    }
}
