//! Error types for the harness core

use thiserror::Error;

use crate::poll::Timeout;
use crate::remote::RemoteError;

/// Result type alias using the harness core Error
pub type Result<T> = std::result::Result<T, Error>;

/// Harness core error types
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Timeout(#[from] Timeout),

    #[error("Unknown engine: {0}")]
    UnknownEngine(String),

    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Whether a caller may report this as a failed expectation rather
    /// than a broken environment
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Timeout(_))
    }
}
