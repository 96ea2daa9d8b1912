use stratus_core::{ConfigError, ResolveError, ResolveErrorKind};
use stratus_web::WebError;
use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("{0}")]
    NotFound(ResolveError),

    #[error("invalid city: {0}")]
    InvalidCity(ResolveError),

    #[error("upstream failure: {0}")]
    Upstream(ResolveError),

    #[error(transparent)]
    Server(#[from] WebError),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<ResolveError> for CliError {
    fn from(error: ResolveError) -> Self {
        match error.kind() {
            ResolveErrorKind::CityNotFound => Self::NotFound(error),
            ResolveErrorKind::InvalidCity => Self::InvalidCity(error),
            _ => Self::Upstream(error),
        }
    }
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Config(_) => 2,
            Self::InvalidCity(_) => 2,
            Self::NotFound(_) => 3,
            Self::Upstream(_) => 4,
            Self::Server(_) => 10,
            Self::Serialization(_) => 10,
            Self::Io(_) => 10,
        }
    }
}
