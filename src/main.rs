mod commands;
mod config;
mod secret;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use log::LevelFilter;
use std::path::PathBuf;

use crate::config::{Config, OutputFormat};

#[derive(Parser)]
#[command(name = "gfshare")]
#[command(about = "Split a secret into shares over GF(256) and combine them back", long_about = None)]
#[command(version)]
struct Cli {
    /// Increase log output (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to the configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize default split settings
    Init,

    /// Split a secret into shares
    Split {
        /// Number of shares to create
        #[arg(short = 'n', long)]
        shares: Option<usize>,

        /// Number of shares required to recover the secret
        #[arg(short, long)]
        threshold: Option<usize>,

        /// Read the secret from this file ("-" for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output format for the shares
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,
    },

    /// Combine shares back into the secret
    Combine {
        /// Shares in ID:BASE64 form; read from --input or stdin when omitted
        shares: Vec<String>,

        /// Read shares from this file ("-" for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    let config_path = match cli.config {
        Some(path) => path,
        None => Config::default_path()?,
    };

    // Execute the appropriate command
    match cli.command {
        Commands::Init => commands::init(&config_path)?,
        Commands::Split {
            shares,
            threshold,
            input,
            format,
        } => {
            let config = Config::load_from(&config_path).context("Failed to load configuration")?;
            commands::split(&config, shares, threshold, input.as_deref(), format)?
        }
        Commands::Combine { shares, input } => commands::combine(&shares, input.as_deref())?,
    }

    Ok(())
}
