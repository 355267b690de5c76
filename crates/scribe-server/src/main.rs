// src/main.rs
// Scribe - proactive capture engine for developer journals

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "scribe")]
#[command(about = "Proactive capture engine for developer journals")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Observe activity signals on stdin, emit suggestions on stdout (default)
    Observe {
        /// Database path (default: ~/.scribe/scribe.db)
        #[arg(short, long)]
        db: Option<PathBuf>,
    },

    /// Analyze a single file and print the significance verdict
    Analyze {
        /// File to analyze
        path: PathBuf,
    },

    /// Print the persisted notification statistics
    Stats {
        /// Database path (default: ~/.scribe/scribe.db)
        #[arg(short, long)]
        db: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env files (global first, then project - project overrides)
    if let Some(home) = dirs::home_dir() {
        let _ = dotenvy::from_path(home.join(".scribe/.env"));
    }
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Quiet on the observe pipe (stdout carries JSONL), verbose elsewhere
    let log_level = match &cli.command {
        Some(Commands::Observe { .. }) | None => Level::WARN,
        Some(Commands::Analyze { .. }) | Some(Commands::Stats { .. }) => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        None => scribe::cli::observe::run(None).await?,
        Some(Commands::Observe { db }) => scribe::cli::observe::run(db).await?,
        Some(Commands::Analyze { path }) => scribe::cli::analyze::run(path)?,
        Some(Commands::Stats { db }) => scribe::cli::stats::run(db).await?,
    }

    Ok(())
}
