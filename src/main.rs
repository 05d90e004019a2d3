//! Legends ingest CLI
//!
//! Parses Legends world-history exports and summarizes the resolved world.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use legends_ingest::config::{Config, LogFormat};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "legends")]
#[command(about = "Streaming ingest for Legends world-history exports")]
#[command(version)]
struct Cli {
    /// Configuration file path (defaults to ./legends.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Summary output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse an export (.xml or .xml.bz2) and print a summary
    Parse {
        /// Path to the export
        path: PathBuf,

        /// Hide the progress bar
        #[arg(short, long)]
        quiet: bool,

        /// Bytes per chunk (overrides config)
        #[arg(long)]
        chunk_size: Option<usize>,

        /// Summary format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Write a default configuration file
    Init {
        /// Output directory
        #[arg(default_value = ".")]
        path: PathBuf,
    },
}

fn init_logging(config: &Config, verbosity: u8) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.filter_directive(verbosity)));

    match config.logging.format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init(),
        LogFormat::Text => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .try_init(),
    }
    .map_err(|e| anyhow::anyhow!("Failed to install log subscriber: {}", e))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load_or_default(cli.config.as_deref())?;
    init_logging(&config, cli.verbose)?;

    match cli.command {
        Commands::Parse {
            path,
            quiet,
            chunk_size,
            format,
        } => commands::parse::parse_export(config, path, chunk_size, quiet, format).await,
        Commands::Init { path } => commands::init::init_config(path).await,
    }
}
