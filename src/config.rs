//! Configuration management

use std::time::Duration;

use anyhow::{self, Context, Result};

const DEFAULT_API_URL: &str = "http://localhost:7071/api";

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the catalogue API, without trailing slash
    pub api_base_url: String,

    /// Bearer token handed to the auth provider (optional)
    pub api_token: Option<String>,

    /// Per-request timeout
    pub http_timeout: Duration,

    /// First delay between export status polls
    pub poll_interval: Duration,

    /// Upper bound for the backed-off poll delay
    pub poll_max_interval: Duration,

    /// Give up polling an export after this long
    pub poll_timeout: Duration,

    /// Directory for rolling log files
    pub logs_dir: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            api_token: None,
            http_timeout: Duration::from_secs(30),
            poll_interval: Duration::from_millis(2000),
            poll_max_interval: Duration::from_millis(10_000),
            poll_timeout: Duration::from_secs(300),
            logs_dir: "./logs".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let api_base_url = lookup("CATALOGUE_API_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or(defaults.api_base_url);

        if !api_base_url.starts_with("http://") && !api_base_url.starts_with("https://") {
            anyhow::bail!("CATALOGUE_API_URL must be an http(s) URL (got '{}')", api_base_url);
        }

        let api_token = lookup("CATALOGUE_API_TOKEN");

        let timeout_secs = parse_number(&lookup, "CATALOGUE_HTTP_TIMEOUT_SECS", 30)?;
        if timeout_secs == 0 {
            anyhow::bail!("CATALOGUE_HTTP_TIMEOUT_SECS must be greater than zero");
        }

        let poll_interval_ms = parse_number(&lookup, "EXPORT_POLL_INTERVAL_MS", 2000)?;
        let poll_max_interval_ms = parse_number(&lookup, "EXPORT_POLL_MAX_INTERVAL_MS", 10_000)?;
        let poll_timeout_secs = parse_number(&lookup, "EXPORT_POLL_TIMEOUT_SECS", 300)?;

        if poll_interval_ms == 0 {
            anyhow::bail!("EXPORT_POLL_INTERVAL_MS must be greater than zero");
        }
        if poll_max_interval_ms < poll_interval_ms {
            anyhow::bail!(
                "EXPORT_POLL_MAX_INTERVAL_MS ({}) must not be smaller than EXPORT_POLL_INTERVAL_MS ({})",
                poll_max_interval_ms,
                poll_interval_ms
            );
        }

        let logs_dir = lookup("LOGS_DIR").unwrap_or(defaults.logs_dir);

        Ok(Self {
            api_base_url,
            api_token,
            http_timeout: Duration::from_secs(timeout_secs),
            poll_interval: Duration::from_millis(poll_interval_ms),
            poll_max_interval: Duration::from_millis(poll_max_interval_ms),
            poll_timeout: Duration::from_secs(poll_timeout_secs),
            logs_dir,
        })
    }
}

fn parse_number<F>(lookup: &F, key: &str, default: u64) -> Result<u64>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .with_context(|| format!("{} must be a non-negative integer (got '{}')", key, raw)),
        None => Ok(default),
    }
}
