use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use vine_archive_harvester::config::HarvestArgs;
use vine_archive_harvester::constants::REQUESTS_PER_SECOND;
use vine_archive_harvester::fetch::Fetcher;
use vine_archive_harvester::harvest::Harvester;
use vine_archive_harvester::rate_gate::RateGate;
use vine_archive_harvester::{fs_utils, seed};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    init_tracing()?;

    let args = HarvestArgs::parse();
    args.validate().context("Invalid arguments")?;

    info!(
        input = %args.input_dir,
        out = %args.out_dir.display(),
        workers = args.workers,
        download = args.download,
        "Starting vine-archive-harvester"
    );

    for dir in [args.profiles_dir(), args.posts_root()] {
        tokio::fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("Failed to create output directory {}", dir.display()))?;
    }
    if args.download {
        tokio::fs::create_dir_all(args.media_root())
            .await
            .with_context(|| {
                format!(
                    "Failed to create media directory {}",
                    args.media_root().display()
                )
            })?;
    }

    // Stage 1: scan the seed corpus for video slugs.
    let slug_set = seed::collect_slugs(&args.input_dir).await?;
    if slug_set.is_empty() {
        bail!("no video slugs found in {}", args.input_dir);
    }
    info!(count = slug_set.len(), "Collected unique video slugs");

    let gate = Arc::new(RateGate::new(REQUESTS_PER_SECOND));
    let fetcher = Fetcher::new(gate)?;
    let harvester = Harvester::new(&args, fetcher);

    // Stage 2: seed posts and discover users from slugs.
    info!("Seeding posts and discovering users from slugs");
    let users = harvester.harvest_slugs(slug_set.into_iter().collect()).await?;
    if users.is_empty() {
        bail!("no user ids discovered from seed corpus");
    }
    info!(count = users.len(), "Discovered unique user ids");

    let index_path = args.user_index_path();
    match fs_utils::write_json_pretty(&index_path, &users).await {
        Ok(()) => info!(path = %index_path.display(), "Wrote discovered user ids"),
        Err(e) => warn!(path = %index_path.display(), "Failed to write user index: {e:#}"),
    }

    // Stage 3: harvest profile and posts for each user.
    info!("Harvesting profiles and posts per user");
    harvester.harvest_users(users).await?;

    info!("All done");
    Ok(())
}

fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,vine_archive_harvester=debug"));

    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| matches!(v.to_lowercase().as_str(), "json" | "structured"))
        .unwrap_or(false);

    if use_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {e}"))?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {e}"))?;
    }

    Ok(())
}
