use std::path::PathBuf;

use crate::id::{ResourceId, TenantId};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("config parse error: {0}")]
    ParseError(String),

    #[error("config validation error: {0}")]
    ValidationError(String),
}

/// Failures reported by the hosting platform's gateway.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlatformError {
    /// The resource (or member) no longer exists on the platform.
    #[error("not found: {0}")]
    NotFound(String),

    /// Transient failure: network, rate limit, timeout.
    #[error("platform unavailable: {0}")]
    Unavailable(String),
}

impl PlatformError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("platform unavailable: {0}")]
    PlatformUnavailable(String),

    #[error("no policy configured for tenant {0}")]
    PolicyMissing(TenantId),

    #[error("resource {0} is already managed")]
    DuplicateResource(ResourceId),

    #[error("engine is shutting down")]
    ShuttingDown,

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl From<PlatformError> for EngineError {
    fn from(err: PlatformError) -> Self {
        match err {
            PlatformError::NotFound(what) => Self::PlatformUnavailable(format!("not found: {what}")),
            PlatformError::Unavailable(msg) => Self::PlatformUnavailable(msg),
        }
    }
}
