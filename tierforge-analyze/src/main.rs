//! tierforge-analyze: tier lists and reports from the collected corpus

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tierforge_analyze::{analyze, Catalog, Corpus};
use tierforge_common::config;
use tierforge_common::SqliteStore;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for tierforge-analyze
#[derive(Parser, Debug)]
#[command(name = "tierforge-analyze")]
#[command(about = "Rank champions per role and write CSV reports")]
#[command(version)]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Folder holding the database and reports
    #[arg(short, long)]
    root_folder: Option<PathBuf>,

    /// Report folder (overrides `analysis.report_dir`)
    #[arg(short, long)]
    out_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tierforge_analyze=info,tierforge_common=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    info!("Starting tierforge-analyze v{}", env!("CARGO_PKG_VERSION"));

    let toml_config =
        config::load_config(args.config.as_deref()).context("Failed to load configuration")?;
    let root_folder = config::resolve_root_folder(args.root_folder.as_deref(), &toml_config);
    let analysis = &toml_config.analysis;

    let db_path = config::database_path(&root_folder);
    if !db_path.exists() {
        bail!(
            "No corpus database at {}; run tierforge-collect first",
            db_path.display()
        );
    }
    let store = SqliteStore::open(&db_path)
        .await
        .context("Failed to open corpus database")?;
    let corpus = Corpus::load(&store, analysis.min_duration_secs)
        .await
        .context("Failed to load corpus")?;

    let catalog = match &analysis.catalog_file {
        Some(path) => Catalog::load(&config::resolve_in_root(&root_folder, path))
            .context("Failed to load display catalog")?,
        None => Catalog::default(),
    };

    let out_dir = match (&args.out_dir, &analysis.report_dir) {
        (Some(dir), _) => dir.clone(),
        (None, Some(dir)) => config::resolve_in_root(&root_folder, dir),
        (None, None) => root_folder.join("reports"),
    };

    let written = analyze(&corpus, &catalog, &out_dir).context("Failed to write reports")?;
    info!(reports = written, "Analysis finished: {}", out_dir.display());
    Ok(())
}
