//! # Stratus Web
//!
//! HTTP surface over [`stratus_core::WeatherService`].
//!
//! | Route | Response |
//! |-------|----------|
//! | `GET /weather?city=<name>` | `200` snapshot, `404` unknown city, `422` bad input, `500` provider failure |
//! | `GET /health` | `200 {"status": "ok", "cache": "connected" \| "disconnected"}` |
//!
//! Error bodies are `{"detail": "<message>"}`.

pub mod error;
pub mod routes;

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use stratus_core::{StratusConfig, WeatherCache, WeatherService};
use tokio::net::TcpListener;
use tracing::info;

pub use error::WebError;

/// Shared handler state. Clones share one service.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<WeatherService>,
}

impl AppState {
    pub fn new(service: WeatherService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/weather", get(routes::weather))
        .route("/health", get(routes::health))
        .with_state(state)
}

/// Connect the cache, serve on `addr` until Ctrl-C, then disconnect the cache.
pub async fn serve(config: &StratusConfig, addr: SocketAddr) -> Result<(), WebError> {
    let cache = WeatherCache::disconnected();
    cache.connect_configured(config.redis_url.as_deref()).await;

    let service = WeatherService::with_default_transport(config, cache.clone());
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %addr, "listening");

    let result = run(listener, router(AppState::new(service)), shutdown_signal()).await;
    cache.disconnect().await;
    result
}

/// Serve `app` on an already bound listener until `shutdown` resolves.
pub async fn run<F>(listener: TcpListener, app: Router, shutdown: F) -> Result<(), WebError>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutdown signal received");
}
