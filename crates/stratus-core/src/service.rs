//! Weather resolution orchestrator.
//!
//! ```text
//! get_weather(city)
//!   ├─ weather cache hit ──────────────────────────────▶ snapshot
//!   └─ miss ─▶ GeocodeResolver ─▶ ForecastFetcher ─▶ write weather cache ─▶ snapshot
//! ```
//!
//! Every step runs sequentially inside one call. Concurrent misses for the
//! same city each reach the providers and the last cache write wins.

use std::sync::Arc;
use std::time::Instant;

use tracing::{info, warn};

use crate::cache::WeatherCache;
use crate::config::StratusConfig;
use crate::error::ResolveError;
use crate::forecast::ForecastFetcher;
use crate::geocode::GeocodeResolver;
use crate::http_client::{HttpClient, ReqwestHttpClient};
use crate::model::{CityName, GeoCoordinate, WeatherSnapshot};
use crate::retry::RetryPolicy;

/// A resolved snapshot and whether the weather cache served it.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub snapshot: WeatherSnapshot,
    pub cache_hit: bool,
}

/// Composes the cache, the geocoder and the forecast fetcher.
///
/// Holds no mutable state of its own; share it behind an `Arc`.
#[derive(Clone)]
pub struct WeatherService {
    cache: WeatherCache,
    geocoder: GeocodeResolver,
    forecast: ForecastFetcher,
}

impl WeatherService {
    pub fn new(cache: WeatherCache, geocoder: GeocodeResolver, forecast: ForecastFetcher) -> Self {
        Self {
            cache,
            geocoder,
            forecast,
        }
    }

    /// Build both providers over one transport, with endpoints, timeout and
    /// retry policy taken from `config`.
    pub fn from_config(
        config: &StratusConfig,
        http_client: Arc<dyn HttpClient>,
        cache: WeatherCache,
    ) -> Self {
        let policy = config.retry_policy();
        let geocoder = GeocodeResolver::new(Arc::clone(&http_client), cache.clone())
            .with_endpoint(config.geocoding_url.as_str())
            .with_timeout_ms(config.request_timeout_ms)
            .with_retry_policy(policy.clone());
        let forecast = ForecastFetcher::new(http_client)
            .with_endpoint(config.forecast_url.as_str())
            .with_timeout_ms(config.request_timeout_ms)
            .with_retry_policy(policy);

        Self::new(cache, geocoder, forecast)
    }

    /// [`WeatherService::from_config`] over the production reqwest transport.
    pub fn with_default_transport(config: &StratusConfig, cache: WeatherCache) -> Self {
        Self::from_config(config, Arc::new(ReqwestHttpClient::new()), cache)
    }

    /// Same policy for both providers; exemptions are set per provider.
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.geocoder = self.geocoder.with_retry_policy(policy.clone());
        self.forecast = self.forecast.with_retry_policy(policy);
        self
    }

    pub fn cache(&self) -> &WeatherCache {
        &self.cache
    }

    pub fn geocoder(&self) -> &GeocodeResolver {
        &self.geocoder
    }

    pub fn forecast(&self) -> &ForecastFetcher {
        &self.forecast
    }

    /// Current weather for `city_name`.
    ///
    /// Fails with `CityNotFound` unchanged from the geocoder, or with the last
    /// provider failure once retries are exhausted. Nothing is cached on
    /// failure.
    pub async fn get_weather(&self, city_name: &str) -> Result<WeatherSnapshot, ResolveError> {
        self.resolve(city_name)
            .await
            .map(|resolution| resolution.snapshot)
    }

    /// [`WeatherService::get_weather`], also reporting whether the weather
    /// cache answered.
    pub async fn resolve(&self, city_name: &str) -> Result<Resolution, ResolveError> {
        let city = CityName::parse(city_name)?;
        let started = Instant::now();

        let result = self.resolve_city_weather(&city).await;
        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        match &result {
            Ok(resolution) => info!(
                city = %city,
                cache_hit = resolution.cache_hit,
                elapsed_ms,
                "weather resolved"
            ),
            Err(error) if error.is_city_not_found() => {
                info!(city = %city, elapsed_ms, "city not found")
            }
            Err(error) => warn!(
                city = %city,
                code = error.code(),
                error = %error,
                elapsed_ms,
                "weather resolution failed"
            ),
        }

        result
    }

    /// Coordinates only, through the geocode cache.
    pub async fn geocode(&self, city_name: &str) -> Result<GeoCoordinate, ResolveError> {
        self.geocoder.resolve_city(city_name).await
    }

    async fn resolve_city_weather(&self, city: &CityName) -> Result<Resolution, ResolveError> {
        if let Some(snapshot) = self.cache.get_weather(city.as_str()).await {
            return Ok(Resolution {
                snapshot,
                cache_hit: true,
            });
        }

        let coord = self.geocoder.resolve(city).await?;

        let snapshot = self.forecast.fetch_weather(coord).await?;
        self.cache.put_weather(city.as_str(), &snapshot).await;

        Ok(Resolution {
            snapshot,
            cache_hit: false,
        })
    }
}
