//! Configuration loading and resolution
//!
//! Every setting has a compiled default, so an absent TOML file is valid.
//! Paths and the API key are resolved in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. OS-dependent compiled default (fallback)

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Environment variable overriding the config file location
pub const CONFIG_ENV: &str = "TIERFORGE_CONFIG";
/// Environment variable overriding the root folder
pub const ROOT_ENV: &str = "TIERFORGE_ROOT";
/// Environment variable carrying the upstream API key
pub const API_KEY_ENV: &str = "TIERFORGE_API_KEY";

const DATABASE_FILE: &str = "tierforge.db";

/// Top-level TOML configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    /// Folder holding the database and generated reports
    pub root_folder: Option<PathBuf>,
    /// Inline API key (lowest priority source)
    pub api_key: Option<String>,
    /// File whose trimmed contents are the API key
    pub api_key_file: Option<PathBuf>,
    pub api: ApiConfig,
    pub rate_limit: RateLimitConfig,
    pub roster: RosterConfig,
    pub crawl: CrawlConfig,
    pub timeline: TimelineConfig,
    pub analysis: AnalysisConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Host serving league listings
    pub platform_base_url: String,
    /// Host serving match ids, details and timelines
    pub regional_base_url: String,
    /// JSON array of game versions, newest first
    pub versions_url: String,
    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            platform_base_url: "https://kr.api.riotgames.com".to_string(),
            regional_base_url: "https://asia.api.riotgames.com".to_string(),
            versions_url: "https://ddragon.leagueoflegends.com/api/versions.json".to_string(),
            request_timeout_secs: 15,
            connect_timeout_secs: 5,
        }
    }
}

impl ApiConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

/// Outbound call pacing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Minimum spacing between two outbound calls
    pub min_interval_ms: u64,
    /// Suspension used when a throttle response carries no Retry-After
    pub throttle_fallback_secs: u64,
    /// Upper bound on any single throttle suspension
    pub max_throttle_wait_secs: u64,
    /// Retries allowed for one logical request after a throttle signal
    pub max_retries: u32,
    /// Random extra delay added to throttle suspensions
    pub jitter_ms: u64,
    /// Calls allowed per budget window (0 disables the budget)
    pub budget_requests: u32,
    pub budget_window_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            min_interval_ms: 1200,
            throttle_fallback_secs: 10,
            max_throttle_wait_secs: 120,
            max_retries: 1,
            jitter_ms: 250,
            budget_requests: 100,
            budget_window_secs: 120,
        }
    }
}

impl RateLimitConfig {
    pub fn min_interval(&self) -> Duration {
        Duration::from_millis(self.min_interval_ms)
    }

    pub fn throttle_fallback(&self) -> Duration {
        Duration::from_secs(self.throttle_fallback_secs)
    }

    pub fn max_throttle_wait(&self) -> Duration {
        Duration::from_secs(self.max_throttle_wait_secs)
    }

    pub fn jitter(&self) -> Duration {
        Duration::from_millis(self.jitter_ms)
    }

    pub fn budget_window(&self) -> Duration {
        Duration::from_secs(self.budget_window_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RosterConfig {
    /// League tiers to query, in fetch order
    pub tiers: Vec<String>,
    pub queue: String,
    /// Number of entries kept after the global sort
    pub size: usize,
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            tiers: vec![
                "CHALLENGER".to_string(),
                "GRANDMASTER".to_string(),
                "MASTER".to_string(),
            ],
            queue: "RANKED_SOLO_5x5".to_string(),
            size: 1000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    /// Numeric queue filter for match-id listings
    pub queue_id: u32,
    /// Ids requested per listing page; also the write batch size
    pub page_size: u32,
    /// Fresh matches per entity after which the entity is done
    pub soft_cap: usize,
    /// Entities crawled concurrently behind the shared rate limiter
    pub concurrency: usize,
    /// `major.minor` version to collect; resolved upstream when absent
    pub target_version: Option<String>,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            queue_id: 420,
            page_size: 100,
            soft_cap: 500,
            concurrency: 4,
            target_version: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineConfig {
    /// Matches per durable write
    pub batch_size: usize,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self { batch_size: 50 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Matches shorter than this are excluded from every report
    pub min_duration_secs: i64,
    /// Optional JSON file of display names
    pub catalog_file: Option<PathBuf>,
    /// Report folder; defaults to `<root>/reports`
    pub report_dir: Option<PathBuf>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            min_duration_secs: 600,
            catalog_file: None,
            report_dir: None,
        }
    }
}

impl TomlConfig {
    /// Read and validate a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
        let config = Self::parse(&content)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Parse and validate TOML text
    pub fn parse(content: &str) -> Result<Self> {
        let config: TomlConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would make a run loop forever or do nothing
    pub fn validate(&self) -> Result<()> {
        if self.roster.size == 0 {
            return Err(Error::Config("roster.size must be at least 1".to_string()));
        }
        if self.roster.tiers.is_empty() {
            return Err(Error::Config("roster.tiers must not be empty".to_string()));
        }
        if self.crawl.page_size == 0 {
            return Err(Error::Config("crawl.page_size must be at least 1".to_string()));
        }
        if self.crawl.concurrency == 0 {
            return Err(Error::Config("crawl.concurrency must be at least 1".to_string()));
        }
        if self.timeline.batch_size == 0 {
            return Err(Error::Config("timeline.batch_size must be at least 1".to_string()));
        }
        if self.rate_limit.budget_requests > 0 && self.rate_limit.budget_window_secs == 0 {
            return Err(Error::Config(
                "rate_limit.budget_window_secs must be positive when a budget is set".to_string(),
            ));
        }
        Ok(())
    }
}

/// Load configuration: CLI path, then `TIERFORGE_CONFIG`, then the default
/// location. An explicitly named file that does not exist is an error; a
/// missing default file yields compiled defaults.
pub fn load_config(cli_path: Option<&Path>) -> Result<TomlConfig> {
    if let Some(path) = cli_path {
        return TomlConfig::load(path);
    }

    if let Ok(path) = std::env::var(CONFIG_ENV) {
        return TomlConfig::load(Path::new(&path));
    }

    match default_config_path() {
        Some(path) if path.exists() => TomlConfig::load(&path),
        _ => {
            info!("No config file found, using defaults");
            Ok(TomlConfig::default())
        }
    }
}

/// `~/.config/tierforge/config.toml` or the platform equivalent
fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("tierforge").join("config.toml"))
}

/// Root folder resolution: CLI, `TIERFORGE_ROOT`, TOML, OS default
pub fn resolve_root_folder(cli_arg: Option<&Path>, config: &TomlConfig) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var(ROOT_ENV) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    if let Some(path) = &config.root_folder {
        return path.clone();
    }

    get_default_root_folder()
}

/// Get OS-dependent default root folder path
fn get_default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("tierforge"))
        .unwrap_or_else(|| PathBuf::from("./tierforge_data"))
}

/// Database file inside the root folder
pub fn database_path(root_folder: &Path) -> PathBuf {
    root_folder.join(DATABASE_FILE)
}

/// Resolve a possibly relative path against the root folder
pub fn resolve_in_root(root_folder: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root_folder.join(path)
    }
}

/// Resolve the upstream API key
///
/// **Priority:** ENV → key file (CLI, then TOML) → inline TOML key
///
/// Fails before any network activity when no usable key exists.
pub fn resolve_api_key(
    cli_key_file: Option<&Path>,
    config: &TomlConfig,
    root_folder: &Path,
) -> Result<String> {
    let env_key = std::env::var(API_KEY_ENV).ok().filter(|k| is_valid_key(k));

    let key_file = cli_key_file
        .map(Path::to_path_buf)
        .or_else(|| config.api_key_file.as_ref().map(|p| resolve_in_root(root_folder, p)));
    let file_key = match &key_file {
        Some(path) => match std::fs::read_to_string(path) {
            Ok(content) => Some(content.trim().to_string()).filter(|k| is_valid_key(k)),
            Err(e) => {
                warn!("Cannot read API key file {}: {}", path.display(), e);
                None
            }
        },
        None => None,
    };

    let toml_key = config
        .api_key
        .as_ref()
        .map(|k| k.trim().to_string())
        .filter(|k| is_valid_key(k));

    let sources: Vec<&str> = [
        env_key.as_ref().map(|_| "environment"),
        file_key.as_ref().map(|_| "key file"),
        toml_key.as_ref().map(|_| "TOML"),
    ]
    .into_iter()
    .flatten()
    .collect();

    if sources.len() > 1 {
        warn!(
            "API key found in multiple sources: {}. Using {} (highest priority).",
            sources.join(", "),
            sources[0]
        );
    }

    if let Some(key) = env_key.or(file_key).or(toml_key) {
        info!("API key loaded from {}", sources[0]);
        return Ok(key);
    }

    Err(Error::Config(format!(
        "API key not configured. Configure using one of:\n\
         1. Environment: {}=your-key-here\n\
         2. Key file: --api-key-file <path> or api_key_file = \"api.txt\"\n\
         3. TOML config: api_key = \"your-key\"",
        API_KEY_ENV
    )))
}

/// Validate API key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}
