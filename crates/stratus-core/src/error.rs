//! Resolution error taxonomy.

use std::fmt::{Display, Formatter};

use crate::http_client::HttpError;

/// Classification used by the retry policy and by callers mapping failures
/// to user-visible responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResolveErrorKind {
    /// The geocoder answered successfully but had no match. Terminal.
    CityNotFound,
    /// Network failure or timeout talking to a provider.
    Transport,
    /// A provider answered with a non-2xx status.
    UpstreamStatus,
    /// A provider answered 2xx with a body that could not be decoded.
    Decode,
    /// The caller supplied a city name that cannot be resolved at all.
    InvalidCity,
}

impl ResolveErrorKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CityNotFound => "city_not_found",
            Self::Transport => "transport",
            Self::UpstreamStatus => "upstream_status",
            Self::Decode => "decode",
            Self::InvalidCity => "invalid_city",
        }
    }
}

impl Display for ResolveErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured error returned by the geocoder, the forecast fetcher and the
/// orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveError {
    kind: ResolveErrorKind,
    message: String,
    status: Option<u16>,
}

impl ResolveError {
    pub fn city_not_found(city: &str) -> Self {
        Self {
            kind: ResolveErrorKind::CityNotFound,
            message: format!("City '{city}' not found"),
            status: None,
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            kind: ResolveErrorKind::Transport,
            message: message.into(),
            status: None,
        }
    }

    pub fn upstream_status(provider: &str, status: u16) -> Self {
        Self {
            kind: ResolveErrorKind::UpstreamStatus,
            message: format!("{provider} returned status {status}"),
            status: Some(status),
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self {
            kind: ResolveErrorKind::Decode,
            message: message.into(),
            status: None,
        }
    }

    pub fn invalid_city(message: impl Into<String>) -> Self {
        Self {
            kind: ResolveErrorKind::InvalidCity,
            message: message.into(),
            status: None,
        }
    }

    pub const fn kind(&self) -> ResolveErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// HTTP status reported by the provider, for `UpstreamStatus` errors.
    pub const fn status(&self) -> Option<u16> {
        self.status
    }

    pub const fn is_city_not_found(&self) -> bool {
        matches!(self.kind, ResolveErrorKind::CityNotFound)
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            ResolveErrorKind::CityNotFound => "resolve.city_not_found",
            ResolveErrorKind::Transport => "resolve.transport",
            ResolveErrorKind::UpstreamStatus => "resolve.upstream_status",
            ResolveErrorKind::Decode => "resolve.decode",
            ResolveErrorKind::InvalidCity => "resolve.invalid_city",
        }
    }
}

impl Display for ResolveError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ResolveError {}

impl From<HttpError> for ResolveError {
    fn from(error: HttpError) -> Self {
        Self::transport(error.message())
    }
}
