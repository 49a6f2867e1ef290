use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod cmd;
mod config;
mod output;

use config::AgentConfig;

/// musterd - compute-node membership agent
#[derive(Parser)]
#[command(name = "musterd")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Path to the agent configuration file
  #[arg(short, long, global = true, default_value = "/etc/muster/config.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Install the authentication and compute daemons
  Install,

  /// Start both daemons (authentication first)
  Start,

  /// Stop both daemons (compute first)
  Stop,

  /// Handle a bucket-changed event for a consumed relation
  Sync {
    /// Relation name: auth-key or controller-config
    relation: String,
  },

  /// Publish this host's facts under a fresh nonce
  PublishFacts,

  /// Show installed/running state and applied configuration
  Status,
}

fn main() -> Result<()> {
  // Initialize logging
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .without_time()
    .init();

  let cli = Cli::parse();
  let config = AgentConfig::load(&cli.config)
    .with_context(|| format!("failed to load config from {}", cli.config.display()))?;

  match cli.command {
    Commands::Install => cmd::install::cmd_install(&config),
    Commands::Start => cmd::start::cmd_start(&config),
    Commands::Stop => cmd::stop::cmd_stop(&config),
    Commands::Sync { relation } => cmd::sync::cmd_sync(&config, &relation),
    Commands::PublishFacts => cmd::publish::cmd_publish_facts(&config),
    Commands::Status => cmd::status::cmd_status(&config),
  }
}
