//! CLI argument definitions for stratus.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `weather` | Current conditions for a city |
//! | `geocode` | Coordinates for a city |
//! | `serve` | Run the HTTP endpoint |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--redis-url` | unset | Redis cache; in-memory when unset |
//! | `--timeout-ms` | `5000` | Per-request provider timeout |
//! | `--log-level` | `info` | `tracing` filter directive |
//! | `--log-json` | `false` | Emit logs as JSON lines |
//!
//! Unset options fall back to the `STRATUS_*` environment variables.
//!
//! # Examples
//!
//! ```bash
//! stratus weather Paris --pretty
//! stratus geocode "São Paulo"
//! stratus --redis-url redis://localhost:6379 serve --addr 127.0.0.1:8000
//! ```

use std::net::SocketAddr;

use clap::{Args, Parser, Subcommand};
use stratus_core::StratusConfig;

#[derive(Debug, Parser)]
#[command(
    name = "stratus",
    author,
    version,
    about = "Current weather by city name, cached in front of Open-Meteo"
)]
pub struct Cli {
    /// Redis connection URL for the cache.
    #[arg(long, global = true)]
    pub redis_url: Option<String>,

    /// Per-request provider timeout in milliseconds.
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    /// Log filter, e.g. `debug` or `stratus_core=trace`.
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Emit logs as JSON lines.
    #[arg(long, global = true, default_value_t = false)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch current weather for a city.
    ///
    /// # Examples
    ///
    ///   stratus weather Paris
    ///   stratus weather "New York" --pretty
    Weather(WeatherArgs),

    /// Resolve a city name to coordinates.
    Geocode(GeocodeArgs),

    /// Serve `GET /weather` and `GET /health` until Ctrl-C.
    Serve(ServeArgs),
}

#[derive(Debug, Args)]
pub struct WeatherArgs {
    pub city: String,

    /// Pretty-print the JSON output.
    #[arg(long, default_value_t = false)]
    pub pretty: bool,
}

#[derive(Debug, Args)]
pub struct GeocodeArgs {
    pub city: String,

    #[arg(long, default_value_t = false)]
    pub pretty: bool,
}

#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Listen address.
    #[arg(long, default_value = "0.0.0.0:8000")]
    pub addr: SocketAddr,
}

impl Cli {
    /// Layer explicit flags over `config`.
    pub fn apply(&self, mut config: StratusConfig) -> StratusConfig {
        if let Some(url) = &self.redis_url {
            config.redis_url = Some(url.clone());
        }
        if let Some(timeout_ms) = self.timeout_ms {
            config.request_timeout_ms = timeout_ms;
        }
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
        if self.log_json {
            config.log_json = true;
        }
        config
    }
}
