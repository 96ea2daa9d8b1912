//! City name to coordinates, cache first.

use std::sync::Arc;
use std::time::Instant;

use serde::Deserialize;
use tracing::debug;

use crate::cache::WeatherCache;
use crate::error::{ResolveError, ResolveErrorKind};
use crate::http_client::{HttpClient, HttpRequest, DEFAULT_TIMEOUT_MS};
use crate::model::{CityName, GeoCoordinate};
use crate::retry::RetryPolicy;

pub const DEFAULT_GEOCODING_URL: &str = "https://geocoding-api.open-meteo.com/v1/search";

/// `{"results": [...]}`; the key is absent when nothing matched.
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Option<Vec<SearchMatch>>,
}

#[derive(Debug, Deserialize)]
struct SearchMatch {
    latitude: f64,
    longitude: f64,
}

/// Resolves city names through the weather cache and the geocoding provider.
///
/// The retry policy always exempts [`ResolveErrorKind::CityNotFound`]: a
/// well-formed empty answer is final.
#[derive(Clone)]
pub struct GeocodeResolver {
    http_client: Arc<dyn HttpClient>,
    cache: WeatherCache,
    endpoint: String,
    timeout_ms: u64,
    retry: RetryPolicy,
}

impl GeocodeResolver {
    pub fn new(http_client: Arc<dyn HttpClient>, cache: WeatherCache) -> Self {
        Self {
            http_client,
            cache,
            endpoint: String::from(DEFAULT_GEOCODING_URL),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            retry: RetryPolicy::default().with_exemptions(&[ResolveErrorKind::CityNotFound]),
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

    /// Use `policy`'s attempt limit and backoff. The exemption list is
    /// replaced with `CityNotFound`.
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry = policy.with_exemptions(&[ResolveErrorKind::CityNotFound]);
        self
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Coordinates for `city_name`.
    ///
    /// A cache hit returns without touching the provider. On a miss the
    /// provider call is retried under the policy and the first match is
    /// cached for 24 hours.
    pub async fn resolve_city(&self, city_name: &str) -> Result<GeoCoordinate, ResolveError> {
        let city = CityName::parse(city_name)?;
        self.resolve(&city).await
    }

    pub(crate) async fn resolve(&self, city: &CityName) -> Result<GeoCoordinate, ResolveError> {
        if let Some(coord) = self.cache.get_coordinates(city.as_str()).await {
            debug!(city = %city, "geocode served from cache");
            return Ok(coord);
        }

        let started = Instant::now();
        let coord = self
            .retry
            .run("geocode", move || self.search(city))
            .await?;
        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        debug!(
            city = %city,
            latitude = coord.latitude,
            longitude = coord.longitude,
            elapsed_ms,
            "geocode resolved"
        );

        self.cache.put_coordinates(city.as_str(), coord).await;
        Ok(coord)
    }

    async fn search(&self, city: &CityName) -> Result<GeoCoordinate, ResolveError> {
        let request = HttpRequest::get(self.endpoint.as_str())
            .with_query("name", city.as_str())
            .with_query("count", 1)
            .with_timeout_ms(self.timeout_ms);

        let response = self.http_client.execute(request).await?;
        if !response.is_success() {
            return Err(ResolveError::upstream_status(
                "geocoding provider",
                response.status,
            ));
        }

        let body: SearchResponse = serde_json::from_str(&response.body)
            .map_err(|e| ResolveError::decode(format!("geocoding response is malformed: {e}")))?;

        let first = body
            .results
            .unwrap_or_default()
            .into_iter()
            .next()
            .ok_or_else(|| ResolveError::city_not_found(city.as_str()))?;

        Ok(GeoCoordinate::new(first.latitude, first.longitude))
    }
}
