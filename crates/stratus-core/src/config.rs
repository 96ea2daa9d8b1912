//! Runtime configuration.
//!
//! Values come from `STRATUS_*` environment variables. Binaries layer their
//! command-line flags on top of [`StratusConfig::from_env`].
//!
//! | Variable | Default |
//! |----------|---------|
//! | `STRATUS_REDIS_URL` (or `REDIS_URL`) | unset: in-memory cache |
//! | `STRATUS_GEOCODING_URL` | Open-Meteo geocoding search |
//! | `STRATUS_FORECAST_URL` | Open-Meteo forecast |
//! | `STRATUS_TIMEOUT_MS` | `5000` |
//! | `STRATUS_RETRY_ATTEMPTS` | `3` |
//! | `STRATUS_RETRY_BASE_MS` | `1000` |
//! | `STRATUS_RETRY_MAX_MS` | `10000` |
//! | `STRATUS_LOG` | `info` |
//! | `STRATUS_LOG_JSON` | `false` |

use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::forecast::DEFAULT_FORECAST_URL;
use crate::geocode::DEFAULT_GEOCODING_URL;
use crate::http_client::DEFAULT_TIMEOUT_MS;
use crate::retry::{Backoff, RetryPolicy, DEFAULT_MAX_ATTEMPTS};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} must be {expected}, got '{value}'")]
    InvalidValue {
        name: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error("{0} must be at least 1")]
    ZeroAttempts(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StratusConfig {
    pub redis_url: Option<String>,
    pub geocoding_url: String,
    pub forecast_url: String,
    pub request_timeout_ms: u64,
    pub retry_attempts: u32,
    pub retry_base_ms: u64,
    pub retry_max_ms: u64,
    pub log_level: String,
    pub log_json: bool,
}

impl Default for StratusConfig {
    fn default() -> Self {
        Self {
            redis_url: None,
            geocoding_url: String::from(DEFAULT_GEOCODING_URL),
            forecast_url: String::from(DEFAULT_FORECAST_URL),
            request_timeout_ms: DEFAULT_TIMEOUT_MS,
            retry_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_base_ms: 1_000,
            retry_max_ms: 10_000,
            log_level: String::from("info"),
            log_json: false,
        }
    }
}

impl StratusConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        let mut config = Self::default();

        config.redis_url = get("STRATUS_REDIS_URL").or_else(|| get("REDIS_URL"));
        if let Some(url) = get("STRATUS_GEOCODING_URL") {
            config.geocoding_url = url;
        }
        if let Some(url) = get("STRATUS_FORECAST_URL") {
            config.forecast_url = url;
        }
        if let Some(raw) = get("STRATUS_TIMEOUT_MS") {
            config.request_timeout_ms = parse_number("STRATUS_TIMEOUT_MS", &raw)?;
        }
        if let Some(raw) = get("STRATUS_RETRY_ATTEMPTS") {
            config.retry_attempts = parse_number("STRATUS_RETRY_ATTEMPTS", &raw)?;
        }
        if let Some(raw) = get("STRATUS_RETRY_BASE_MS") {
            config.retry_base_ms = parse_number("STRATUS_RETRY_BASE_MS", &raw)?;
        }
        if let Some(raw) = get("STRATUS_RETRY_MAX_MS") {
            config.retry_max_ms = parse_number("STRATUS_RETRY_MAX_MS", &raw)?;
        }
        if let Some(level) = get("STRATUS_LOG") {
            config.log_level = level;
        }
        if let Some(raw) = get("STRATUS_LOG_JSON") {
            config.log_json = parse_flag("STRATUS_LOG_JSON", &raw)?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.retry_attempts == 0 {
            return Err(ConfigError::ZeroAttempts("retry_attempts"));
        }
        Ok(())
    }

    /// Exponential backoff doubling from `retry_base_ms` up to
    /// `retry_max_ms`, without jitter.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.retry_attempts,
            Backoff::Exponential {
                base: Duration::from_millis(self.retry_base_ms),
                factor: 2.0,
                max: Duration::from_millis(self.retry_max_ms.max(self.retry_base_ms)),
                jitter: false,
            },
        )
    }
}

fn parse_number<T: FromStr>(name: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
        name,
        value: raw.to_string(),
        expected: "a non-negative integer",
    })
}

fn parse_flag(name: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            name,
            value: raw.to_string(),
            expected: "a boolean",
        }),
    }
}
