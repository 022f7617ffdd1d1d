//! tierforge-collect: corpus collection CLI
//!
//! Subcommands run the collection stages individually or in order.
//! Every stage resumes from what the database already holds.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tierforge_collect::client::{PacedSource, RiotClient};
use tierforge_collect::crawler::MatchCrawler;
use tierforge_collect::rate_limiter::RateLimiter;
use tierforge_collect::roster::select_roster;
use tierforge_collect::timeline::TimelineExtractor;
use tierforge_collect::version::resolve_target_version;
use tierforge_common::config::{self, TomlConfig};
use tierforge_common::{CorpusStore, SqliteStore};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for tierforge-collect
#[derive(Parser, Debug)]
#[command(name = "tierforge-collect")]
#[command(about = "Collect ranked match data into the TierForge corpus")]
#[command(version)]
struct Args {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Folder holding the database and reports
    #[arg(short, long, global = true)]
    root_folder: Option<PathBuf>,

    /// File containing the API key
    #[arg(long, global = true)]
    api_key_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    /// Fetch league tiers and store a fresh ranked roster
    Roster,
    /// Crawl match histories of the stored roster
    Matches,
    /// Fetch timelines of collected matches
    Timelines,
    /// Roster, matches, then timelines
    All,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tierforge_collect=info,tierforge_common=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    info!("Starting tierforge-collect v{}", env!("CARGO_PKG_VERSION"));

    let toml_config =
        config::load_config(args.config.as_deref()).context("Failed to load configuration")?;
    let root_folder = config::resolve_root_folder(args.root_folder.as_deref(), &toml_config);
    info!("Root folder: {}", root_folder.display());

    // Credentials are checked before anything touches the network
    let api_key = config::resolve_api_key(args.api_key_file.as_deref(), &toml_config, &root_folder)
        .context("Missing API key")?;

    let db_path = config::database_path(&root_folder);
    info!("Database: {}", db_path.display());
    let store: Arc<dyn CorpusStore> = Arc::new(
        SqliteStore::open(&db_path)
            .await
            .context("Failed to open corpus database")?,
    );

    let client = RiotClient::new(&toml_config.api, api_key).context("Failed to build HTTP client")?;
    let limiter = Arc::new(RateLimiter::new(&toml_config.rate_limit));
    let source = PacedSource::new(Arc::new(client), limiter);

    let command = args.command;
    if matches!(command, Command::Roster | Command::All) {
        run_roster(&source, &store, &toml_config).await?;
    }
    if matches!(command, Command::Matches | Command::All) {
        run_matches(&source, &store, &toml_config).await?;
    }
    if matches!(command, Command::Timelines | Command::All) {
        run_timelines(&source, &store, &toml_config).await?;
    }

    info!("Collection finished");
    Ok(())
}

async fn run_roster(
    source: &PacedSource,
    store: &Arc<dyn CorpusStore>,
    config: &TomlConfig,
) -> Result<()> {
    let roster = select_roster(
        source,
        &config.roster.tiers,
        &config.roster.queue,
        config.roster.size,
    )
    .await
    .context("Roster selection failed")?;

    store
        .replace_roster(&roster)
        .await
        .context("Failed to store roster")?;
    info!(entries = roster.len(), "Roster stored");
    Ok(())
}

async fn run_matches(
    source: &PacedSource,
    store: &Arc<dyn CorpusStore>,
    config: &TomlConfig,
) -> Result<()> {
    let roster = store.load_roster().await.context("Failed to load roster")?;
    if roster.is_empty() {
        bail!("No roster stored; run the `roster` subcommand first");
    }

    let target = resolve_target_version(source, config.crawl.target_version.as_deref())
        .await
        .context("Failed to determine target version")?;

    let crawler = MatchCrawler::new(source.clone(), Arc::clone(store), target, &config.crawl);
    let summary = crawler.run(&roster).await.context("Match crawl aborted")?;
    info!(
        entities = summary.reports.len(),
        new_matches = summary.new_matches(),
        "Matches stage done"
    );
    Ok(())
}

async fn run_timelines(
    source: &PacedSource,
    store: &Arc<dyn CorpusStore>,
    config: &TomlConfig,
) -> Result<()> {
    let extractor =
        TimelineExtractor::new(source.clone(), Arc::clone(store), config.timeline.batch_size);
    let summary = extractor.run().await.context("Timeline extraction aborted")?;
    info!(
        written = summary.written,
        skipped = summary.skipped,
        "Timelines stage done"
    );
    Ok(())
}
