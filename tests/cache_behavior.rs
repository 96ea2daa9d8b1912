//! Behavior-driven tests for the cache adapter.
//!
//! These tests verify HOW cache reads and writes degrade: which keys and TTLs
//! are used, and what a caller sees when the backing store misbehaves.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use stratus_core::{
    cache_key, CacheKind, GeoCoordinate, KeyValueStore, MemoryStore, RedisStore, WeatherCache,
    WeatherSnapshot, GEOCODE_TTL, WEATHER_TTL,
};
use stratus_tests::{FailingStore, RecordingStore};

// =============================================================================
// Keys and TTLs
// =============================================================================

#[tokio::test]
async fn when_same_city_is_cached_twice_system_uses_distinct_keys_and_ttls() {
    // Given: A recording store
    let store = RecordingStore::new();
    let cache = WeatherCache::with_store(store.clone());

    // When: Both a geocode and a weather entry are written for Rome
    cache
        .put_coordinates("Rome", GeoCoordinate::new(41.8919, 12.5113))
        .await;
    cache
        .put_weather("Rome", &WeatherSnapshot::new(json!({"current_weather": {}})))
        .await;

    // Then: The keys differ by kind and the TTLs are a day and fifteen minutes
    let writes = store.writes();
    assert_eq!(writes.len(), 2);
    assert_eq!(writes[0].key, "city:rome");
    assert_eq!(writes[0].ttl, Duration::from_secs(24 * 60 * 60));
    assert_eq!(writes[1].key, "weather:rome");
    assert_eq!(writes[1].ttl, Duration::from_secs(15 * 60));
    assert_ne!(writes[0].ttl, writes[1].ttl);
}

#[tokio::test]
async fn when_name_is_cased_differently_system_reads_the_same_entry() {
    // Given: Coordinates stored under one spelling
    let cache = WeatherCache::with_store(Arc::new(MemoryStore::new()));
    cache
        .put_coordinates("PARIS", GeoCoordinate::new(48.8566, 2.3522))
        .await;

    // When/Then: Every spelling finds it
    for spelling in ["Paris", "paris", "PARIS", "pAris"] {
        assert_eq!(
            cache.get_coordinates(spelling).await,
            Some(GeoCoordinate::new(48.8566, 2.3522)),
            "spelling {spelling}"
        );
    }
    assert_eq!(cache_key(CacheKind::City, "PARIS"), "city:paris");
}

#[tokio::test]
async fn when_geocode_is_cached_system_stores_the_lat_lon_wire_form() {
    // Given: A recording store
    let store = RecordingStore::new();
    let cache = WeatherCache::with_store(store.clone());

    // When: Coordinates are cached
    cache
        .put_coordinates("Tokyo", GeoCoordinate::new(35.6895, 139.6917))
        .await;

    // Then: The stored document uses lat/lon field names
    let write = store.write_for("city:tokyo").expect("written");
    let stored: serde_json::Value = serde_json::from_str(&write.value).expect("json");
    assert_eq!(stored, json!({"lat": 35.6895, "lon": 139.6917}));
}

// =============================================================================
// Expiry
// =============================================================================

#[tokio::test]
async fn when_entry_outlives_its_ttl_system_reads_it_as_absent() {
    // Given: A memory store entry with a very short TTL
    let store = MemoryStore::new();
    store
        .set("weather:oslo", String::from("{}"), Duration::from_millis(20))
        .await
        .expect("set");
    assert!(store.get("weather:oslo").await.expect("get").is_some());

    // When: The TTL elapses
    tokio::time::sleep(Duration::from_millis(40)).await;

    // Then: The entry is gone and cleanup drops it
    assert!(store.get("weather:oslo").await.expect("get").is_none());
    store.clear_expired().await;
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn when_ttls_differ_weather_expires_before_the_geocode() {
    // Given: Entries with the production TTLs
    let store = MemoryStore::new();
    store
        .set("city:oslo", String::from(r#"{"lat":59.9,"lon":10.7}"#), GEOCODE_TTL)
        .await
        .expect("set");
    store
        .set("weather:oslo", String::from("{}"), WEATHER_TTL)
        .await
        .expect("set");

    // Then: Both are live immediately after writing
    assert_eq!(store.len().await, 2);
    assert!(GEOCODE_TTL > WEATHER_TTL);
}

// =============================================================================
// Degradation
// =============================================================================

#[tokio::test]
async fn when_store_fails_every_call_system_reports_misses_only() {
    // Given: A store that errors on every operation
    let cache = WeatherCache::with_store(Arc::new(FailingStore));

    // When: Entries are written and read back
    cache
        .put_coordinates("Lima", GeoCoordinate::new(-12.04, -77.03))
        .await;
    cache
        .set(CacheKind::Weather, "Lima", &json!({"t": 1}), WEATHER_TTL)
        .await;

    // Then: Reads are plain misses
    assert_eq!(cache.get_coordinates("Lima").await, None);
    assert_eq!(cache.get(CacheKind::Weather, "Lima").await, None);
    assert!(cache.is_connected().await);
}

#[tokio::test]
async fn when_cached_payload_is_corrupt_system_treats_it_as_a_miss() {
    // Given: Garbage under both keys
    let store = Arc::new(MemoryStore::new());
    store
        .set("city:kyiv", String::from("{\"lat\": \"north\"}"), GEOCODE_TTL)
        .await
        .expect("set");
    store
        .set("weather:kyiv", String::from("{truncated"), WEATHER_TTL)
        .await
        .expect("set");
    let cache = WeatherCache::with_store(store);

    // When/Then: Both read as absent
    assert_eq!(cache.get_coordinates("Kyiv").await, None);
    assert_eq!(cache.get_weather("Kyiv").await, None);
}

#[tokio::test]
async fn when_cache_is_reconnected_system_uses_the_new_store() {
    // Given: A handle shared by two owners
    let cache = WeatherCache::disconnected();
    let shared = cache.clone();

    // When: One owner connects a store
    let store = RecordingStore::new();
    cache.connect(store.clone()).await;
    shared
        .put_weather("Cairo", &WeatherSnapshot::new(json!({"t": 30})))
        .await;

    // Then: The other owner's write went to that store
    assert!(store.write_for("weather:cairo").is_some());
    assert!(cache.get_weather("Cairo").await.is_some());

    // And: Disconnecting is visible to every clone
    shared.disconnect().await;
    assert!(!cache.is_connected().await);
    assert!(cache.get_weather("Cairo").await.is_none());
}

#[tokio::test]
async fn when_redis_url_is_invalid_connect_fails_and_handle_stays_disconnected() {
    // Given: A disconnected handle
    let cache = WeatherCache::disconnected();

    // When: Connecting to a malformed URL
    let result = cache.connect_redis("definitely-not-redis").await;

    // Then: The error is returned and the handle is unchanged
    assert!(result.is_err());
    assert!(!cache.is_connected().await);
}

// =============================================================================
// Redis
// =============================================================================

#[tokio::test]
#[ignore = "requires a running Redis; set STRATUS_TEST_REDIS_URL"]
async fn when_redis_is_available_entries_round_trip_with_expiry() {
    let url = std::env::var("STRATUS_TEST_REDIS_URL")
        .unwrap_or_else(|_| String::from("redis://127.0.0.1:6379"));
    let store = RedisStore::connect(&url).await.expect("redis reachable");
    let cache = WeatherCache::with_store(Arc::new(store.clone()));

    cache
        .put_coordinates("Integration City", GeoCoordinate::new(1.5, -2.5))
        .await;
    assert_eq!(
        cache.get_coordinates("integration city").await,
        Some(GeoCoordinate::new(1.5, -2.5))
    );

    store
        .set("weather:integration-expiry", String::from("{}"), Duration::from_secs(1))
        .await
        .expect("set");
    tokio::time::sleep(Duration::from_millis(2_100)).await;
    assert!(store
        .get("weather:integration-expiry")
        .await
        .expect("get")
        .is_none());
}
