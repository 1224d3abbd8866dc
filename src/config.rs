use anyhow::{anyhow, Context, Result};
use clap::ValueEnum;
use directories::ProjectDirs;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use gfshare::shamir::{MAX_SHARES, MIN_SHARES, MIN_THRESHOLD};

/// How `split` prints shares
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One `ID:BASE64` share per line
    Text,
    /// A JSON array of `{"id", "data"}` objects
    Json,
}

/// Configuration for the gfshare command line
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Number of shares to create (default: 5)
    pub default_shares: usize,
    /// Threshold required to recover secret (default: 3)
    pub default_threshold: usize,
    /// Output format for split (default: text)
    pub format: OutputFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_shares: 5,
            default_threshold: 3,
            format: OutputFormat::Text,
        }
    }
}

impl Config {
    /// Get config file path
    pub fn default_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("com", "gfshare", "gfshare")
            .context("Failed to determine configuration directory")?;

        Ok(proj_dirs.config_dir().join("config.json"))
    }

    /// Load configuration from file, falling back to defaults when it is missing
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("no config at {}, using defaults", path.display());
            return Ok(Config::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let config: Config = serde_json::from_str(&contents)
            .context("Failed to parse config file")?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        self.validate()?;

        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = serde_json::to_string_pretty(self)
            .context("Failed to serialize config")?;

        fs::write(path, contents)
            .context("Failed to write config file")?;

        Ok(())
    }

    /// Check the defaults describe a valid split
    pub fn validate(&self) -> Result<()> {
        if !(MIN_SHARES..=MAX_SHARES).contains(&self.default_shares) {
            return Err(anyhow!(
                "default_shares must be between {} and {}, got {}",
                MIN_SHARES,
                MAX_SHARES,
                self.default_shares
            ));
        }
        if !(MIN_THRESHOLD..=self.default_shares).contains(&self.default_threshold) {
            return Err(anyhow!(
                "default_threshold must be between {} and {}, got {}",
                MIN_THRESHOLD,
                self.default_shares,
                self.default_threshold
            ));
        }
        Ok(())
    }

    /// Initialize configuration with user input
    pub fn initialize(path: &Path) -> Result<Self> {
        use console::style;
        use dialoguer::{Input, Select};

        println!("{}", style("Welcome to gfshare").bold().green());
        println!("Let's set up your defaults...");

        let defaults = Config::load_from(path).unwrap_or_default();

        let default_shares: usize = Input::new()
            .with_prompt("Number of shares to create")
            .default(defaults.default_shares)
            .validate_with(|input: &usize| {
                if (MIN_SHARES..=MAX_SHARES).contains(input) {
                    Ok(())
                } else {
                    Err("Share count must be between 2 and 255")
                }
            })
            .interact_text()?;

        let default_threshold: usize = Input::new()
            .with_prompt("Shares needed to recover")
            .default(defaults.default_threshold.min(default_shares))
            .validate_with(|input: &usize| {
                if (MIN_THRESHOLD..=default_shares).contains(input) {
                    Ok(())
                } else {
                    Err("Threshold must be at least 2 and at most the share count")
                }
            })
            .interact_text()?;

        let formats = &["text (one share per line)", "json"];
        let format_idx = Select::new()
            .with_prompt("Output format for split")
            .default(if defaults.format == OutputFormat::Json { 1 } else { 0 })
            .items(formats)
            .interact()?;

        let config = Config {
            default_shares,
            default_threshold,
            format: if format_idx == 1 { OutputFormat::Json } else { OutputFormat::Text },
        };

        // Save configuration
        config.save_to(path)?;

        println!("{}", style(format!("\nConfiguration saved to {}", path.display())).green());

        Ok(config)
    }
}
