//! Typed configuration from environment variables.
//!
//! Loads once at startup, fails fast if required vars are missing.
//! Credentials are wrapped in secrecy::SecretString to prevent log leaks.

pub mod secrets;

use crate::engine::PacingConfig;
use crate::error::{Error, Result};
use secrets::Credentials;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_SITES_CSV_URL: &str =
    "https://github.com/MassMove/AttackVectors/raw/master/LocalJournals/sites.csv";
pub const DEFAULT_API_BASE_URL: &str = "https://api.twitter.com/1.1";

#[derive(Debug)]
pub struct Config {
    /// Identity used only for searching.
    pub search_credentials: Credentials,
    /// Identity used only for posting replies.
    pub post_credentials: Credentials,
    pub sites_csv_url: String,
    pub sites_cache_path: PathBuf,
    pub ledger_path: PathBuf,
    pub api_base_url: String,
    pub pacing: PacingConfig,
    pub otel_endpoint: Option<String>,
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// In local dev, call `dotenvy::dotenv().ok()` before this.
    /// In production, systemd EnvironmentFile provides the vars.
    pub fn from_env() -> Result<Self> {
        let defaults = PacingConfig::default();
        Ok(Self {
            search_credentials: Credentials::from_env("SEARCH_")?,
            post_credentials: Credentials::from_env("TWEET_")?,
            sites_csv_url: optional_var("SITES_CSV_URL")
                .unwrap_or_else(|| DEFAULT_SITES_CSV_URL.to_string()),
            sites_cache_path: optional_var("SITES_CACHE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("/tmp/sites.csv")),
            ledger_path: optional_var("LEDGER_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("posted.csv")),
            api_base_url: optional_var("API_BASE_URL")
                .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
            pacing: PacingConfig {
                search_sleep: parsed_var::<u64>("SEARCH_SLEEP_SECS")?
                    .map(Duration::from_secs)
                    .unwrap_or(defaults.search_sleep),
                post_sleep: parsed_var::<u64>("POST_SLEEP_SECS")?
                    .map(Duration::from_secs)
                    .unwrap_or(defaults.post_sleep),
                batch_size: parsed_var::<u32>("SEARCH_BATCH_SIZE")?.unwrap_or(defaults.batch_size),
            },
            otel_endpoint: optional_var("OTEL_ENDPOINT"),
            log_level: optional_var("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        })
    }
}

fn required_var(name: &str) -> Result<String> {
    std::env::var(name)
        .map_err(|_| Error::Config(format!("required environment variable {name} is not set")))
}

/// Unset and empty are both treated as absent.
fn optional_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn parsed_var<T: FromStr>(name: &str) -> Result<Option<T>> {
    match optional_var(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| Error::Config(format!("{name} has invalid value {raw:?}"))),
        None => Ok(None),
    }
}
