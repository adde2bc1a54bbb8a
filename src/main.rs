//! nowcast - Playout ingestion and distribution service
//!
//! Accepts now-playing events pushed by the playout automation over a
//! raw TCP socket and fans each one out: artwork publication, website
//! playlist and history files, the play log, and social platforms.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use nowcast::artwork::sweep;
use nowcast::config::Config;
use nowcast::db;
use nowcast::fanout::Fanout;
use nowcast::listener::Listener;
use nowcast::pipeline::Pipeline;
use nowcast::social::{build_platforms, SocialDistributor, TemplateContent};

/// Command-line arguments for nowcast
#[derive(Parser, Debug)]
#[command(name = "nowcast")]
#[command(about = "Playout ingestion and distribution service")]
#[command(version)]
struct Args {
    /// Path to the TOML config file
    #[arg(short, long, env = "NOWCAST_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nowcast=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    info!("Starting nowcast v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::load(args.config.as_deref()).context("Failed to load configuration")?;
    config
        .ensure_directories()
        .context("Failed to create data directories")?;

    let pool = db::init_pool(&config.paths.database)
        .await
        .context("Failed to open database")?;
    info!("Database ready: {}", config.paths.database.display());

    let platforms = build_platforms(&config.social);
    info!(count = platforms.len(), "social platforms enabled");

    let social = SocialDistributor::new(
        &config.social,
        pool.clone(),
        platforms,
        Box::new(TemplateContent::new()),
    );
    let fanout = Fanout::new(&config, pool.clone(), social);
    let pipeline = Pipeline::new(&config, fanout);

    // Background reclaim of cache files no registry row claims
    tokio::spawn(sweep::run(
        pool.clone(),
        config.paths.cache_dir.clone(),
        Duration::from_secs(config.pipeline.sweep_interval_secs),
    ));

    let listener = Listener::bind(&config.listener)
        .await
        .context("Failed to bind listener")?;

    tokio::select! {
        result = listener.serve(pipeline) => {
            result.context("Listener failed")?;
        }
        _ = shutdown_signal() => {
            info!("Shutting down");
        }
    }

    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
