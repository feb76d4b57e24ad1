//! CLI surface, mirroring the teacher's `clap`-derived `Cli`/`Command` shape
//! (`src/cli/mod.rs`) scaled down to this crate's much smaller command set.

use std::path::PathBuf;

use clap::{ColorChoice, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "crawld")]
#[command(about = "Content-addressed crawl engine")]
#[command(
    long_about = "crawld tails a content gateway's provider log, fetches and classifies \
announced objects, and indexes extracted HTML text.\nExamples:\n  crawld run\n  crawld status"
)]
#[command(version)]
#[command(color = ColorChoice::Auto)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Configuration file path (optional, uses env vars by default).
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Use the logging sink instead of connecting to PostgreSQL.
    #[arg(long, global = true)]
    pub no_db: bool,

    /// Override the worker pool size.
    #[arg(long, global = true)]
    pub workers: Option<usize>,

    /// Override the bounded queue capacity.
    #[arg(long = "queue-capacity", global = true)]
    pub queue_capacity: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the crawl engine (default if no subcommand given).
    #[command(about = "Run the crawl engine")]
    Run,

    /// Report the dedup filter's on-disk snapshot without starting a crawl.
    #[command(about = "Report dedup filter status")]
    Status,
}
