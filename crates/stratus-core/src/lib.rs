//! # Stratus Core
//!
//! Current-weather lookup by city name with a cache-aside layer in front of
//! the Open-Meteo geocoding and forecast APIs.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`cache`] | Key-value stores and the never-failing [`WeatherCache`] adapter |
//! | [`config`] | Environment-driven runtime configuration |
//! | [`error`] | Resolution errors surfaced to callers |
//! | [`forecast`] | Forecast provider client |
//! | [`geocode`] | Geocoding provider client with its own cache |
//! | [`http_client`] | HTTP client abstraction |
//! | [`model`] | City names, coordinates and weather snapshots |
//! | [`retry`] | Bounded retry with backoff and exempt error kinds |
//! | [`service`] | The [`WeatherService`] orchestrator |
//! | [`telemetry`] | `tracing` subscriber setup |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use stratus_core::{MemoryStore, StratusConfig, WeatherCache, WeatherService};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = StratusConfig::from_env()?;
//!     let cache = WeatherCache::with_store(Arc::new(MemoryStore::new()));
//!     let service = WeatherService::with_default_transport(&config, cache);
//!
//!     let snapshot = service.get_weather("Paris").await?;
//!     println!("{}", snapshot.as_value()["current_weather"]["temperature"]);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  CLI / HTTP     │
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ WeatherService  │────▶│ WeatherCache     │
//! └────────┬────────┘     │ (redis / memory) │
//!          │              └──────────────────┘
//!          ▼                       ▲
//! ┌─────────────────┐              │
//! │ GeocodeResolver │──────────────┘
//! └────────┬────────┘
//!          │              ┌──────────────────┐
//!          ├─────────────▶│ RetryPolicy      │
//!          ▼              └──────────────────┘
//! ┌─────────────────┐     ┌──────────────────┐
//! │ ForecastFetcher │────▶│ HTTP Client      │
//! └─────────────────┘     │ (reqwest)        │
//!                         └──────────────────┘
//! ```
//!
//! ## Error Handling
//!
//! Cache failures never reach the caller; they degrade to misses. Provider
//! failures surface as [`ResolveError`]:
//!
//! ```rust
//! use stratus_core::{ResolveError, ResolveErrorKind};
//!
//! fn status_for(error: &ResolveError) -> u16 {
//!     match error.kind() {
//!         ResolveErrorKind::CityNotFound => 404,
//!         ResolveErrorKind::InvalidCity => 422,
//!         _ => 500,
//!     }
//! }
//!
//! assert_eq!(status_for(&ResolveError::city_not_found("ZZ")), 404);
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod forecast;
pub mod geocode;
pub mod http_client;
pub mod model;
pub mod retry;
pub mod service;
pub mod telemetry;

#[cfg(test)]
mod testing;

// Caching
pub use cache::{
    cache_key, CacheKind, KeyValueStore, MemoryStore, RedisStore, StoreError, WeatherCache,
    GEOCODE_TTL, WEATHER_TTL,
};

// Configuration
pub use config::{ConfigError, StratusConfig};

// Error types
pub use error::{ResolveError, ResolveErrorKind};

// Providers
pub use forecast::{ForecastFetcher, DEFAULT_FORECAST_URL};
pub use geocode::{GeocodeResolver, DEFAULT_GEOCODING_URL};

// HTTP client types
pub use http_client::{
    HttpClient, HttpError, HttpRequest, HttpResponse, ReqwestHttpClient, DEFAULT_TIMEOUT_MS,
};

// Domain models
pub use model::{CityName, GeoCoordinate, WeatherSnapshot};

// Retry logic
pub use retry::{Backoff, RetryPolicy, DEFAULT_MAX_ATTEMPTS};

// Orchestration
pub use service::{Resolution, WeatherService};

pub use telemetry::init_tracing;
