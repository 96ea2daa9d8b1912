//! Request handlers.

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use stratus_core::WeatherSnapshot;

use crate::error::WebError;
use crate::AppState;

/// Shortest city name the endpoint accepts.
pub const MIN_CITY_LEN: usize = 2;

#[derive(Debug, Deserialize)]
pub struct WeatherQuery {
    pub city: Option<String>,
}

pub async fn weather(
    State(state): State<AppState>,
    Query(query): Query<WeatherQuery>,
) -> Result<Json<WeatherSnapshot>, WebError> {
    let city = query
        .city
        .ok_or_else(|| WebError::InvalidRequest(String::from("query parameter 'city' is required")))?;
    if city.trim().chars().count() < MIN_CITY_LEN {
        return Err(WebError::InvalidRequest(format!(
            "city must be at least {MIN_CITY_LEN} characters"
        )));
    }

    let snapshot = state.service.get_weather(&city).await?;
    Ok(Json(snapshot))
}

pub async fn health(State(state): State<AppState>) -> Json<Value> {
    let cache = if state.service.cache().is_connected().await {
        "connected"
    } else {
        "disconnected"
    };
    Json(json!({ "status": "ok", "cache": cache }))
}
