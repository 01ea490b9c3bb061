//! Error types for the omni-wallet library

use thiserror::Error;

/// Custom error type for omni-wallet operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Unsupported protocol: {0}")]
    UnsupportedProtocol(String),

    #[error("Invalid derivation path: {0}")]
    InvalidDerivationPath(String),

    #[error("Invalid key material: {0}")]
    InvalidKeyMaterial(String),

    #[error("Mnemonic error: {0}")]
    Mnemonic(String),

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Capability probe unavailable: {0}")]
    ProbeUnavailable(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Not implemented: {0}")]
    NotImplemented(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl Error {
    /// Shorthand for a failed request validation rule
    pub(crate) fn validation(reason: impl Into<String>) -> Self {
        Self::ValidationFailed(reason.into())
    }

    /// Whether the caller may retry the same request unchanged
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ProbeUnavailable(_) | Self::Timeout(_) | Self::Network(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

/// Result type for omni-wallet operations
pub type Result<T> = std::result::Result<T, Error>;
