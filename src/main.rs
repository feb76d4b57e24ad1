//! crawld - main entry point.

use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crawld::cli::{Cli, Command};
use crawld::config::Config;
use crawld::dedup::BloomSeenSet;
use crawld::engine::Supervisor;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let mut config = Config::resolve(cli.config.as_deref(), cli.no_db)?;
    if let Some(workers) = cli.workers {
        config.workers = workers;
    }
    if let Some(capacity) = cli.queue_capacity {
        config.queue.capacity = capacity;
    }

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => run(config).await,
        Command::Status => status(config),
    }
}

async fn run(config: Config) -> anyhow::Result<()> {
    let mut supervisor = Supervisor::build(config).await?;
    supervisor.spawn();
    supervisor.run_until_signal().await?;
    Ok(())
}

fn status(config: Config) -> anyhow::Result<()> {
    let seen = BloomSeenSet::restore(&config.dedup.path, config.dedup.initial_capacity)?;
    println!("dedup snapshot: {}", config.dedup.path.display());
    println!("gateway: {}", config.gateway.base_url());
    println!("workers: {}", config.workers);
    println!("queue capacity: {}", config.queue.capacity);
    // Sampling a handful of known-absent CIDs is pointless for a real report;
    // this simply confirms the snapshot loaded without error.
    let _ = seen.contains("status-probe");
    Ok(())
}
