//! Service configuration.
//!
//! Everything is read from environment variables (after an optional `.env`
//! has been loaded by the binary). Unset variables fall back to defaults;
//! variables that are set but malformed are errors.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracing_subscriber::{EnvFilter, fmt};
use url::Url;

pub const DEFAULT_MATCH_SERVICE_URL: &str = "http://localhost:8001/api/v1";
pub const DEFAULT_TEAM_SERVICE_URL: &str = "http://localhost:8002/api/v1";
pub const DEFAULT_MODEL_PATH: &str = "models/player_performance_v1.json";
pub const DEFAULT_UPSTREAM_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_MAX_CONCURRENT_FETCHES: usize = 16;

/// A configuration value that could not be used
#[derive(Error, Debug, PartialEq)]
#[error("Invalid value for {key}: {value:?} ({reason})")]
pub struct ConfigError {
    pub key: &'static str,
    pub value: String,
    pub reason: String,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl LoggingConfig {
    /// Install the global tracing subscriber.
    ///
    /// `RUST_LOG`, when set, wins over the configured level.
    pub fn init(&self) -> anyhow::Result<()> {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.level));

        match self.format.as_str() {
            "json" => fmt().json().with_env_filter(filter).try_init(),
            _ => fmt().with_env_filter(filter).try_init(),
        }
        .map_err(|e| anyhow::anyhow!(e))
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "pretty".into(),
        }
    }
}

/// Runtime settings for the recommendation service
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub match_service_url: String,
    pub team_service_url: String,
    pub model_path: PathBuf,
    pub bind_addr: SocketAddr,
    pub upstream_timeout: Duration,
    pub max_concurrent_fetches: usize,
    pub logging: LoggingConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            match_service_url: DEFAULT_MATCH_SERVICE_URL.to_string(),
            team_service_url: DEFAULT_TEAM_SERVICE_URL.to_string(),
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8000)),
            upstream_timeout: Duration::from_millis(DEFAULT_UPSTREAM_TIMEOUT_MS),
            max_concurrent_fetches: DEFAULT_MAX_CONCURRENT_FETCHES,
            logging: LoggingConfig::default(),
        }
    }
}

impl Settings {
    /// Read settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Settings::default();

        let match_service_url = match get("MATCH_SERVICE_URL") {
            Some(v) => parse_base_url("MATCH_SERVICE_URL", v)?,
            None => defaults.match_service_url,
        };
        let team_service_url = match get("TEAM_SERVICE_URL") {
            Some(v) => parse_base_url("TEAM_SERVICE_URL", v)?,
            None => defaults.team_service_url,
        };
        let model_path = get("MODEL_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.model_path);

        let bind_addr = match get("BIND_ADDR") {
            Some(v) => v.trim().parse().map_err(|e: std::net::AddrParseError| ConfigError {
                key: "BIND_ADDR",
                value: v.clone(),
                reason: e.to_string(),
            })?,
            None => defaults.bind_addr,
        };

        let upstream_timeout = match get("UPSTREAM_TIMEOUT_MS") {
            Some(v) => Duration::from_millis(parse_positive("UPSTREAM_TIMEOUT_MS", &v)?),
            None => defaults.upstream_timeout,
        };
        let max_concurrent_fetches = match get("MAX_CONCURRENT_FETCHES") {
            Some(v) => parse_positive("MAX_CONCURRENT_FETCHES", &v)? as usize,
            None => defaults.max_concurrent_fetches,
        };

        let format = get("LOG_FORMAT").unwrap_or(defaults.logging.format);
        if format != "pretty" && format != "json" {
            return Err(ConfigError {
                key: "LOG_FORMAT",
                value: format,
                reason: "expected \"pretty\" or \"json\"".to_string(),
            });
        }
        let logging = LoggingConfig {
            level: get("LOG_LEVEL").unwrap_or(defaults.logging.level),
            format,
        };

        Ok(Self {
            match_service_url,
            team_service_url,
            model_path,
            bind_addr,
            upstream_timeout,
            max_concurrent_fetches,
            logging,
        })
    }
}

fn parse_base_url(key: &'static str, value: String) -> Result<String, ConfigError> {
    match Url::parse(value.trim()) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {
            Ok(value.trim().trim_end_matches('/').to_string())
        }
        Ok(url) => Err(ConfigError {
            key,
            value: value.clone(),
            reason: format!("unsupported scheme {:?}", url.scheme()),
        }),
        Err(e) => Err(ConfigError {
            key,
            value,
            reason: e.to_string(),
        }),
    }
}

fn parse_positive(key: &'static str, value: &str) -> Result<u64, ConfigError> {
    match value.trim().parse::<u64>() {
        Ok(0) => Err(ConfigError {
            key,
            value: value.to_string(),
            reason: "must be greater than zero".to_string(),
        }),
        Ok(n) => Ok(n),
        Err(e) => Err(ConfigError {
            key,
            value: value.to_string(),
            reason: e.to_string(),
        }),
    }
}
