//! Key-value store contract behind the weather cache.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use thiserror::Error;

/// Failure talking to the backing store. Never escapes [`super::WeatherCache`].
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("cache store is not connected")]
    NotConnected,

    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("cached value under '{key}' is not valid JSON: {source}")]
    Decode {
        key: String,
        source: serde_json::Error,
    },

    #[error("value for '{key}' could not be encoded: {source}")]
    Encode {
        key: String,
        source: serde_json::Error,
    },

    #[error("cache store error: {0}")]
    Backend(String),
}

/// String-keyed store with TTL-on-write semantics.
///
/// Implementations must be safe to share across concurrent resolutions.
pub trait KeyValueStore: Send + Sync {
    /// Short backend name used in log fields.
    fn backend(&self) -> &'static str;

    fn get<'a>(
        &'a self,
        key: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Option<String>, StoreError>> + Send + 'a>>;

    fn set<'a>(
        &'a self,
        key: &'a str,
        value: String,
        ttl: Duration,
    ) -> Pin<Box<dyn Future<Output = Result<(), StoreError>> + Send + 'a>>;
}
