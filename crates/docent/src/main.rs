// SPDX-FileCopyrightText: 2026 Docent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Docent - a documentation assistant for team chat.
//!
//! This is the binary entry point: configuration checks, preference
//! administration, and offline classification dry-runs.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod check;
mod classify;
mod prefs;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use docent_config::DocentConfig;

/// Docent - a documentation assistant for team chat.
#[derive(Parser, Debug)]
#[command(name = "docent", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate configuration and report preference storage health.
    Check,
    /// Administer channel and user preferences.
    Prefs {
        #[command(subcommand)]
        action: prefs::PrefsAction,
    },
    /// Classify recorded events (one JSON object per line) without replying.
    Classify {
        /// JSONL file of inbound events.
        #[arg(long)]
        events: PathBuf,
        /// Assistant user id, when not set in configuration.
        #[arg(long)]
        bot_user_id: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => docent_config::load_and_validate_path(path),
        None => docent_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            docent_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.assistant.log_level);

    let result = run(cli.command, config).await;
    if let Err(e) = result {
        eprintln!("docent: {e}");
        std::process::exit(1);
    }
}

async fn run(command: Commands, config: DocentConfig) -> Result<(), docent_core::DocentError> {
    match command {
        Commands::Check => check::run_check(&config).await,
        Commands::Prefs { action } => prefs::run_prefs(&config, action).await,
        Commands::Classify {
            events,
            bot_user_id,
        } => classify::run_classify(&config, &events, bot_user_id).await,
    }
}

fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("docent={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}
