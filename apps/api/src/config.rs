use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Every setting has a default; malformed values fail start-up.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Artificial delay applied to every data operation.
    pub mock_latency: Duration,
    pub upload_dir: PathBuf,
    pub seed_demo_data: bool,
    pub default_page_size: usize,
    pub max_page_size: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key/value source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let default_page_size: usize = parse_or(&lookup, "DEFAULT_PAGE_SIZE", 10)?;
        let max_page_size: usize = parse_or(&lookup, "MAX_PAGE_SIZE", 100)?;
        anyhow::ensure!(default_page_size >= 1, "DEFAULT_PAGE_SIZE must be at least 1");
        anyhow::ensure!(
            max_page_size >= default_page_size,
            "MAX_PAGE_SIZE must not be smaller than DEFAULT_PAGE_SIZE"
        );

        Ok(Config {
            port: parse_or(&lookup, "PORT", 8080)?,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            mock_latency: Duration::from_millis(parse_or(&lookup, "MOCK_LATENCY_MS", 300)?),
            upload_dir: lookup("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("uploads")),
            seed_demo_data: parse_bool(&lookup, "SEED_DEMO_DATA", true)?,
            default_page_size,
            max_page_size,
        })
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has invalid value '{raw}'")),
        None => Ok(default),
    }
}

fn parse_bool(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: bool) -> Result<bool> {
    let Some(raw) = lookup(key) else {
        return Ok(default);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => anyhow::bail!("Environment variable '{key}' must be a boolean, got '{raw}'"),
    }
}
