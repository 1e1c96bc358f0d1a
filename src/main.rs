//! storecrawl entry point
//!
//! Loads configuration, opens storage, and either serves the HTTP
//! trigger endpoint (the default) or runs one crawl and exits.

use anyhow::Context;
use clap::Parser;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use storecrawl::config::load_config;
use storecrawl::crawler::Orchestrator;
use storecrawl::observe::Observer;
use storecrawl::server::{self, AppState};
use storecrawl::storage::SqliteStorage;
use tokio::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Storefront catalog crawler
#[derive(Parser, Debug)]
#[command(name = "storecrawl")]
#[command(version)]
#[command(about = "Three-tier storefront catalog crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Run a single crawl and exit instead of serving the trigger endpoint
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = load_config(&cli.config)
        .with_context(|| format!("failed to load configuration from {}", cli.config.display()))?;
    tracing::info!("configuration loaded from {}", cli.config.display());

    let bind_addr: SocketAddr = config
        .server
        .bind_addr
        .parse()
        .context("invalid bind-addr")?;

    let storage = SqliteStorage::new(Path::new(&config.output.database_path))
        .context("failed to open database")?;
    let storage = Arc::new(Mutex::new(storage));
    let observer = Arc::new(Observer::new());

    let orchestrator = Arc::new(Orchestrator::new(config, storage, observer)?);

    if cli.once {
        tracing::info!("running a single crawl");
        orchestrator.run().await?;
    } else {
        server::serve(bind_addr, AppState { orchestrator }).await?;
    }

    Ok(())
}

/// Sets up the tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("storecrawl=info,warn"),
            1 => EnvFilter::new("storecrawl=debug,info"),
            2 => EnvFilter::new("storecrawl=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
