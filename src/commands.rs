use anyhow::{Context, Result};
use console::style;
use dialoguer::Password;
use log::{debug, info};
use std::fs;
use std::io::{self, IsTerminal, Read, Write};
use std::path::Path;
use zeroize::Zeroizing;

use gfshare::{shamir, Combiner, Share};

use crate::config::{Config, OutputFormat};
use crate::secret::SecretBytes;

/// Execute the init command
pub fn init(config_path: &Path) -> Result<()> {
    Config::initialize(config_path)?;
    Ok(())
}

/// Execute the split command
pub fn split(
    config: &Config,
    shares: Option<usize>,
    threshold: Option<usize>,
    input: Option<&Path>,
    format: Option<OutputFormat>,
) -> Result<()> {
    let shares = shares.unwrap_or(config.default_shares);
    let threshold = threshold.unwrap_or(config.default_threshold);
    let format = format.unwrap_or(config.format);

    let secret = read_secret(input)?;
    info!("splitting {} bytes into {} shares, threshold {}", secret.len(), shares, threshold);

    let split_shares = shamir::split(secret.as_bytes(), shares, threshold)
        .context("Failed to split secret")?;

    let mut stdout = io::stdout().lock();
    match format {
        OutputFormat::Text => {
            for share in &split_shares {
                writeln!(stdout, "{}", share)?;
            }
        }
        OutputFormat::Json => {
            let json = Zeroizing::new(serde_json::to_string_pretty(&split_shares)
                .context("Failed to serialize shares")?);
            writeln!(stdout, "{}", json.as_str())?;
        }
    }
    stdout.flush()?;

    status(&format!(
        "Split into {} shares. Any {} of them recover the secret.",
        shares, threshold
    ));

    Ok(())
}

/// Execute the combine command
pub fn combine(share_args: &[String], input: Option<&Path>) -> Result<()> {
    let shares = if share_args.is_empty() {
        let text = read_text(input)?;
        parse_shares(&text)?
    } else {
        share_args
            .iter()
            .enumerate()
            .map(|(i, arg)| {
                arg.parse::<Share>()
                    .with_context(|| format!("Share argument #{} is not valid", i + 1))
            })
            .collect::<Result<Vec<_>>>()?
    };
    debug!("read {} shares", shares.len());

    let mut combiner = Combiner::new();
    for (i, share) in shares.into_iter().enumerate() {
        let id = share.id;
        combiner
            .add(share)
            .with_context(|| format!("Share #{} (id {}) was rejected", i + 1, id))?;
    }

    let count = combiner.len();
    let secret = SecretBytes::new(combiner.finish().context("Failed to combine shares")?);

    let mut stdout = io::stdout().lock();
    stdout.write_all(secret.as_bytes())?;
    stdout.flush()?;

    status(&format!("Combined {} shares into {} bytes.", count, secret.len()));

    Ok(())
}

/// Parse shares from a JSON array or from `ID:BASE64` lines
fn parse_shares(text: &str) -> Result<Vec<Share>> {
    if text.trim_start().starts_with('[') {
        return serde_json::from_str(text).context("Failed to parse JSON shares");
    }

    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            line.parse::<Share>()
                .with_context(|| format!("Line {} is not a valid share", i + 1))
        })
        .collect()
}

/// Read the secret from a file, from piped stdin, or from a hidden prompt
fn read_secret(input: Option<&Path>) -> Result<SecretBytes> {
    match input {
        Some(path) if path != Path::new("-") => {
            let bytes = fs::read(path)
                .with_context(|| format!("Failed to read secret from {}", path.display()))?;
            Ok(SecretBytes::new(bytes))
        }
        _ if io::stdin().is_terminal() => {
            let secret = Password::new()
                .with_prompt("Enter secret")
                .interact()?;
            Ok(SecretBytes::from(secret))
        }
        _ => {
            let mut bytes = Vec::new();
            io::stdin()
                .read_to_end(&mut bytes)
                .context("Failed to read secret from stdin")?;
            Ok(SecretBytes::new(bytes))
        }
    }
}

/// Read share text from a file or stdin
fn read_text(input: Option<&Path>) -> Result<Zeroizing<String>> {
    let mut text = Zeroizing::new(String::new());
    match input {
        Some(path) if path != Path::new("-") => {
            *text = fs::read_to_string(path)
                .with_context(|| format!("Failed to read shares from {}", path.display()))?;
        }
        _ => {
            io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read shares from stdin")?;
        }
    }
    Ok(text)
}

/// Status lines go to stderr so stdout carries only shares or the secret
fn status(message: &str) {
    eprintln!("{}", style(message).green());
}
