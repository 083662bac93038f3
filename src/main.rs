//! Channel views CLI - main entry point
//!
//! Exports links to every post of a public channel, most viewed first.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use channel_views::commands;
use channel_views::config::{Config, CONFIG_FILE};

#[derive(Parser)]
#[command(name = "channel_views")]
#[command(about = "Rank a Telegram channel's posts by views", long_about = None)]
#[command(version)]
struct Cli {
    /// Channel username (without @)
    channel: String,

    /// Output file (default: views.txt)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Optional YAML config file
    #[arg(long, env = "CHANNEL_VIEWS_CONFIG", default_value = CONFIG_FILE)]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env for local development, before RUST_LOG is read
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = Config::load(&cli.config)
        .with_context(|| format!("cannot load configuration from {}", cli.config.display()))?;
    if let Some(output) = cli.output {
        config.output_file = output;
    }

    let start = Instant::now();
    let summary = commands::views_run(&config, &cli.channel)
        .await
        .with_context(|| format!("cannot export views of @{}", cli.channel))?;

    println!(
        "Saved {} links from @{} to {} in {:.1?}",
        summary.messages,
        summary.channel,
        summary.output.display(),
        start.elapsed()
    );

    Ok(())
}
