//! Cache-aside storage for geocodes and weather snapshots.
//!
//! ## Keys and TTLs
//!
//! | Kind | Key | TTL |
//! |------|-----|-----|
//! | [`CacheKind::City`] | `city:<lower(name)>` | 24 hours |
//! | [`CacheKind::Weather`] | `weather:<lower(name)>` | 15 minutes |
//!
//! ## Degradation
//!
//! [`WeatherCache`] never returns an error. A disconnected handle, an
//! unreachable backend, or an undecodable entry all read as a miss; failed
//! writes are logged and dropped. Caching only ever costs latency.

mod memory_store;
mod redis_store;
mod store;

use std::fmt::{Debug, Display, Formatter};
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::model::{GeoCoordinate, WeatherSnapshot};

pub use memory_store::MemoryStore;
pub use redis_store::RedisStore;
pub use store::{KeyValueStore, StoreError};

/// Geocoding results are effectively static.
pub const GEOCODE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Current conditions change quickly.
pub const WEATHER_TTL: Duration = Duration::from_secs(15 * 60);

/// Entity kind, the first component of a cache key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKind {
    City,
    Weather,
}

impl CacheKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::City => "city",
            Self::Weather => "weather",
        }
    }

    pub const fn ttl(self) -> Duration {
        match self {
            Self::City => GEOCODE_TTL,
            Self::Weather => WEATHER_TTL,
        }
    }
}

impl Display for CacheKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `kind:lower(city_name)`.
pub fn cache_key(kind: CacheKind, city_name: &str) -> String {
    format!("{}:{}", kind.as_str(), city_name.to_lowercase())
}

/// Outcome of a raw store read before it is collapsed to `Option`.
#[derive(Debug)]
enum CacheLookup {
    Hit(Value),
    Miss,
    Failed(StoreError),
}

/// Handle to the shared cache connection.
///
/// Cloning is cheap and every clone sees the same connection slot, so one
/// handle is built at startup and injected into the service. `connect` and
/// `disconnect` swap the backing store; in-flight operations keep the store
/// they started with.
#[derive(Clone, Default)]
pub struct WeatherCache {
    slot: Arc<RwLock<Option<Arc<dyn KeyValueStore>>>>,
}

impl Debug for WeatherCache {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeatherCache").finish_non_exhaustive()
    }
}

impl WeatherCache {
    /// A handle with no backing store. Every read misses.
    pub fn disconnected() -> Self {
        Self::default()
    }

    pub fn with_store(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            slot: Arc::new(RwLock::new(Some(store))),
        }
    }

    /// Install `store` as the backing store, replacing any previous one.
    pub async fn connect(&self, store: Arc<dyn KeyValueStore>) {
        info!(backend = store.backend(), "cache connected");
        *self.slot.write().await = Some(store);
    }

    /// Open a Redis connection and install it.
    ///
    /// On failure the handle is left as it was.
    pub async fn connect_redis(&self, url: &str) -> Result<(), StoreError> {
        let store = RedisStore::connect(url).await?;
        self.connect(Arc::new(store)).await;
        Ok(())
    }

    /// Startup connection for the binaries: Redis when a URL is given,
    /// otherwise a process-local [`MemoryStore`].
    ///
    /// An unreachable Redis is logged and the handle stays disconnected, so
    /// the service runs uncached rather than refusing to start.
    pub async fn connect_configured(&self, redis_url: Option<&str>) {
        match redis_url {
            Some(url) => {
                if let Err(error) = self.connect_redis(url).await {
                    warn!(error = %error, "redis unavailable; running without a cache");
                }
            }
            None => self.connect(Arc::new(MemoryStore::new())).await,
        }
    }

    /// Drop the backing store. Subsequent operations are no-ops.
    pub async fn disconnect(&self) {
        if let Some(store) = self.slot.write().await.take() {
            info!(backend = store.backend(), "cache disconnected");
        }
    }

    pub async fn is_connected(&self) -> bool {
        self.slot.read().await.is_some()
    }

    async fn store(&self) -> Option<Arc<dyn KeyValueStore>> {
        self.slot.read().await.clone()
    }

    async fn lookup(&self, key: &str) -> CacheLookup {
        let Some(store) = self.store().await else {
            return CacheLookup::Failed(StoreError::NotConnected);
        };

        match store.get(key).await {
            Ok(Some(raw)) => match serde_json::from_str::<Value>(&raw) {
                Ok(value) => CacheLookup::Hit(value),
                Err(source) => CacheLookup::Failed(StoreError::Decode {
                    key: key.to_string(),
                    source,
                }),
            },
            Ok(None) => CacheLookup::Miss,
            Err(error) => CacheLookup::Failed(error),
        }
    }

    /// Stored value for `kind` and `city_name`, or `None` on miss or any
    /// store failure.
    pub async fn get(&self, kind: CacheKind, city_name: &str) -> Option<Value> {
        let key = cache_key(kind, city_name);
        match self.lookup(&key).await {
            CacheLookup::Hit(value) => {
                debug!(key = %key, "cache hit");
                Some(value)
            }
            CacheLookup::Miss => {
                debug!(key = %key, "cache miss");
                None
            }
            CacheLookup::Failed(StoreError::NotConnected) => {
                debug!(key = %key, "cache not connected; treating as miss");
                None
            }
            CacheLookup::Failed(error) => {
                warn!(key = %key, error = %error, "cache read failed; treating as miss");
                None
            }
        }
    }

    /// Best-effort write with an explicit TTL.
    pub async fn set(&self, kind: CacheKind, city_name: &str, value: &Value, ttl: Duration) {
        let key = cache_key(kind, city_name);
        let Some(store) = self.store().await else {
            debug!(key = %key, "cache not connected; skipping write");
            return;
        };

        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(source) => {
                let error = StoreError::Encode { key, source };
                warn!(error = %error, "cache write skipped");
                return;
            }
        };

        match store.set(&key, raw, ttl).await {
            Ok(()) => debug!(key = %key, ttl_secs = ttl.as_secs(), "cache set"),
            Err(error) => warn!(key = %key, error = %error, "cache write failed"),
        }
    }

    /// Cached coordinates for `city_name`. An entry that does not decode as
    /// `{lat, lon}` reads as a miss.
    pub async fn get_coordinates(&self, city_name: &str) -> Option<GeoCoordinate> {
        let value = self.get(CacheKind::City, city_name).await?;
        match serde_json::from_value::<GeoCoordinate>(value) {
            Ok(coord) => Some(coord),
            Err(error) => {
                warn!(city = %city_name, error = %error, "cached geocode is malformed; ignoring");
                None
            }
        }
    }

    pub async fn put_coordinates(&self, city_name: &str, coord: GeoCoordinate) {
        match serde_json::to_value(coord) {
            Ok(value) => {
                self.set(CacheKind::City, city_name, &value, GEOCODE_TTL)
                    .await;
            }
            Err(error) => warn!(city = %city_name, error = %error, "geocode not cacheable"),
        }
    }

    pub async fn get_weather(&self, city_name: &str) -> Option<WeatherSnapshot> {
        self.get(CacheKind::Weather, city_name)
            .await
            .map(WeatherSnapshot::new)
    }

    pub async fn put_weather(&self, city_name: &str, snapshot: &WeatherSnapshot) {
        self.set(
            CacheKind::Weather,
            city_name,
            snapshot.as_value(),
            WEATHER_TTL,
        )
        .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::future::Future;
    use std::pin::Pin;

    /// Store whose every operation fails, as if the server went away.
    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn backend(&self) -> &'static str {
            "broken"
        }

        fn get<'a>(
            &'a self,
            _key: &'a str,
        ) -> Pin<Box<dyn Future<Output = Result<Option<String>, StoreError>> + Send + 'a>>
        {
            Box::pin(async { Err(StoreError::Backend(String::from("connection reset"))) })
        }

        fn set<'a>(
            &'a self,
            _key: &'a str,
            _value: String,
            _ttl: Duration,
        ) -> Pin<Box<dyn Future<Output = Result<(), StoreError>> + Send + 'a>> {
            Box::pin(async { Err(StoreError::Backend(String::from("connection reset"))) })
        }
    }

    #[test]
    fn keys_are_kind_prefixed_and_lower_cased() {
        assert_eq!(cache_key(CacheKind::City, "Paris"), "city:paris");
        assert_eq!(cache_key(CacheKind::City, "PARIS"), "city:paris");
        assert_eq!(cache_key(CacheKind::Weather, "paris"), "weather:paris");
        assert_eq!(cache_key(CacheKind::Weather, "São Paulo"), "weather:são paulo");
    }

    #[test]
    fn kinds_have_independent_ttls() {
        assert_eq!(CacheKind::City.ttl(), Duration::from_secs(86_400));
        assert_eq!(CacheKind::Weather.ttl(), Duration::from_secs(900));
    }

    #[tokio::test]
    async fn disconnected_handle_is_a_no_op() {
        let cache = WeatherCache::disconnected();
        assert!(!cache.is_connected().await);

        cache
            .put_coordinates("London", GeoCoordinate::new(51.5, -0.1))
            .await;
        assert_eq!(cache.get_coordinates("London").await, None);

        cache
            .put_weather("Paris", &WeatherSnapshot::new(json!({"temp": 20})))
            .await;
        assert_eq!(cache.get_weather("Paris").await, None);
    }

    #[tokio::test]
    async fn failing_backend_reads_as_miss() {
        let cache = WeatherCache::with_store(Arc::new(BrokenStore));

        cache
            .set(CacheKind::Weather, "Paris", &json!({"temp": 20}), WEATHER_TTL)
            .await;
        assert_eq!(cache.get(CacheKind::Weather, "Paris").await, None);
    }

    #[tokio::test]
    async fn coordinates_round_trip_through_any_spelling() {
        let cache = WeatherCache::with_store(Arc::new(MemoryStore::new()));

        cache
            .put_coordinates("Paris", GeoCoordinate::new(48.8566, 2.3522))
            .await;

        for spelling in ["Paris", "paris", "PARIS"] {
            assert_eq!(
                cache.get_coordinates(spelling).await,
                Some(GeoCoordinate::new(48.8566, 2.3522)),
                "spelling {spelling}"
            );
        }
    }

    #[tokio::test]
    async fn cached_snapshot_keeps_number_precision() {
        let raw = r#"{"current_weather":{"big":9007199254740993.0,"tiny":2.2250738585072011e-308,"huge":123456789012345678901234567890}}"#;
        let snapshot: WeatherSnapshot = serde_json::from_str(raw).expect("parses");
        let cache = WeatherCache::with_store(Arc::new(MemoryStore::new()));

        cache.put_weather("Reykjavik", &snapshot).await;
        let cached = cache.get_weather("reykjavik").await.expect("hit");

        assert_eq!(serde_json::to_string(&cached).expect("serializes"), raw);
    }

    #[tokio::test]
    async fn city_and_weather_entries_do_not_collide() {
        let cache = WeatherCache::with_store(Arc::new(MemoryStore::new()));

        cache
            .put_coordinates("Oslo", GeoCoordinate::new(59.91, 10.75))
            .await;

        assert!(cache.get_weather("Oslo").await.is_none());
        assert!(cache.get_coordinates("Oslo").await.is_some());
    }

    #[tokio::test]
    async fn malformed_geocode_entry_reads_as_miss() {
        let store = Arc::new(MemoryStore::new());
        store
            .set("city:rome", String::from("{\"latitude\": 41.9}"), GEOCODE_TTL)
            .await
            .expect("set");
        store
            .set("weather:rome", String::from("not json"), WEATHER_TTL)
            .await
            .expect("set");
        let cache = WeatherCache::with_store(store);

        assert_eq!(cache.get_coordinates("Rome").await, None);
        assert_eq!(cache.get_weather("Rome").await, None);
    }

    #[tokio::test]
    async fn configured_connection_falls_back_to_memory_or_stays_down() {
        let cache = WeatherCache::disconnected();
        cache.connect_configured(None).await;
        assert!(cache.is_connected().await);

        let cache = WeatherCache::disconnected();
        cache.connect_configured(Some("not a redis url")).await;
        assert!(!cache.is_connected().await);
    }

    #[tokio::test]
    async fn disconnect_turns_a_live_cache_into_misses() {
        let cache = WeatherCache::disconnected();
        cache.connect(Arc::new(MemoryStore::new())).await;
        assert!(cache.is_connected().await);

        cache
            .put_weather("Paris", &WeatherSnapshot::new(json!({"temp": 20})))
            .await;
        assert!(cache.get_weather("Paris").await.is_some());

        cache.disconnect().await;
        assert!(!cache.is_connected().await);
        assert!(cache.get_weather("Paris").await.is_none());
    }
}
