//! Redis-backed store.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use redis::aio::ConnectionManager;
use redis::AsyncCommands;

use super::store::{KeyValueStore, StoreError};

/// Shared Redis connection.
///
/// `ConnectionManager` multiplexes one connection and reconnects on failure;
/// clones share the same underlying connection.
#[derive(Clone)]
pub struct RedisStore {
    manager: ConnectionManager,
}

impl RedisStore {
    /// Open the process-wide connection. Called once at startup.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let client = redis::Client::open(url)?;
        let manager = ConnectionManager::new(client).await?;
        Ok(Self { manager })
    }
}

impl KeyValueStore for RedisStore {
    fn backend(&self) -> &'static str {
        "redis"
    }

    fn get<'a>(
        &'a self,
        key: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Option<String>, StoreError>> + Send + 'a>> {
        Box::pin(async move {
            let mut conn = self.manager.clone();
            let value: Option<String> = conn.get(key).await?;
            Ok(value)
        })
    }

    fn set<'a>(
        &'a self,
        key: &'a str,
        value: String,
        ttl: Duration,
    ) -> Pin<Box<dyn Future<Output = Result<(), StoreError>> + Send + 'a>> {
        Box::pin(async move {
            // SETEX rejects a zero expiry.
            let seconds = ttl.as_secs().max(1);
            let mut conn = self.manager.clone();
            conn.set_ex::<_, _, ()>(key, value, seconds).await?;
            Ok(())
        })
    }
}
