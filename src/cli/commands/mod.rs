//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod analyze;
mod check;
mod serve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::{load_settings, LoadOptions};

#[derive(Parser)]
#[command(name = "medilens")]
#[command(about = "Medical report analysis backend")]
#[command(version)]
pub struct Cli {
    /// Config file path (overrides MEDILENS_CONFIG and ./medilens.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Address to bind to: PORT, HOST, or HOST:PORT (default: from config, 0.0.0.0:8000)
        bind: Option<String>,
    },

    /// Analyze a local report file and print the JSON response
    Analyze {
        /// Image or PDF of the medical report
        file: PathBuf,
        /// Media type of the file (guessed from the extension if omitted)
        #[arg(short, long)]
        media_type: Option<String>,
    },

    /// Check the API key and that the model answers
    Check,
}

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let options = LoadOptions {
        config_path: cli.config,
    };
    let settings = load_settings(&options)?;

    match cli.command {
        Commands::Serve { bind } => serve::cmd_serve(&settings, bind.as_deref()).await,
        Commands::Analyze { file, media_type } => {
            analyze::cmd_analyze(&settings, &file, media_type.as_deref()).await
        }
        Commands::Check => check::cmd_check(&settings).await,
    }
}
