//! Current conditions for a coordinate.

use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;
use tracing::debug;

use crate::error::ResolveError;
use crate::http_client::{HttpClient, HttpRequest, DEFAULT_TIMEOUT_MS};
use crate::model::{GeoCoordinate, WeatherSnapshot};
use crate::retry::RetryPolicy;

pub const DEFAULT_FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";

/// Calls the forecast provider on every request; caching happens one level
/// up, keyed by city name.
///
/// No error kind is exempt from retry here.
#[derive(Clone)]
pub struct ForecastFetcher {
    http_client: Arc<dyn HttpClient>,
    endpoint: String,
    timeout_ms: u64,
    retry: RetryPolicy,
}

impl ForecastFetcher {
    pub fn new(http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            http_client,
            endpoint: String::from(DEFAULT_FORECAST_URL),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Use `policy`'s attempt limit and backoff with an empty exemption list.
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry = policy.with_exemptions(&[]);
        self
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Provider payload for `coord`, returned unmodified.
    pub async fn fetch_weather(&self, coord: GeoCoordinate) -> Result<WeatherSnapshot, ResolveError> {
        let started = Instant::now();
        let snapshot = self
            .retry
            .run("forecast", move || self.request(coord))
            .await?;
        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        debug!(
            latitude = coord.latitude,
            longitude = coord.longitude,
            elapsed_ms,
            "forecast fetched"
        );
        Ok(snapshot)
    }

    async fn request(&self, coord: GeoCoordinate) -> Result<WeatherSnapshot, ResolveError> {
        let request = HttpRequest::get(self.endpoint.as_str())
            .with_query("latitude", coord.latitude)
            .with_query("longitude", coord.longitude)
            .with_query("current_weather", true)
            .with_timeout_ms(self.timeout_ms);

        let response = self.http_client.execute(request).await?;
        if !response.is_success() {
            return Err(ResolveError::upstream_status(
                "forecast provider",
                response.status,
            ));
        }

        let payload: Value = serde_json::from_str(&response.body)
            .map_err(|e| ResolveError::decode(format!("forecast response is malformed: {e}")))?;

        Ok(WeatherSnapshot::new(payload))
    }
}
