//! Endpoint errors and their HTTP mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use stratus_core::{ResolveError, ResolveErrorKind};
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum WebError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    InvalidRequest(String),

    #[error("resolution failed: {0}")]
    Resolve(ResolveError),

    #[error("server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl WebError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::InvalidRequest(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Resolve(_) | Self::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Body text. Internal failures are not described to the client.
    fn detail(&self) -> String {
        match self {
            Self::NotFound(message) | Self::InvalidRequest(message) => message.clone(),
            Self::Resolve(_) | Self::Io(_) => String::from("Internal server error"),
        }
    }
}

impl From<ResolveError> for WebError {
    fn from(error: ResolveError) -> Self {
        match error.kind() {
            ResolveErrorKind::CityNotFound => Self::NotFound(error.message().to_string()),
            ResolveErrorKind::InvalidCity => Self::InvalidRequest(error.message().to_string()),
            _ => Self::Resolve(error),
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }
        (status, Json(json!({ "detail": self.detail() }))).into_response()
    }
}
