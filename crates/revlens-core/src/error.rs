use serde::Serialize;
use thiserror::Error;

/// Machine-readable category attached to every error surfaced to a caller.
///
/// Library error types expose a `kind()` accessor returning one of these so
/// front ends can branch on the failure without matching on message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Malformed credential name or secret.
    Validation,
    /// An analysis was requested with no active credential.
    NoCredential,
    /// The upstream service reported quota exhaustion.
    RateLimit,
    /// The upstream service rejected the credential.
    InvalidKey,
    /// Connectivity, timeout, or unparsable-response failure.
    NetworkError,
    /// The uploaded file type is not supported.
    UnsupportedType,
    /// The credential store could not be read or written.
    Storage,
}

impl ErrorKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::NoCredential => "no_credential",
            Self::RateLimit => "rate_limit",
            Self::InvalidKey => "invalid_key",
            Self::NetworkError => "network_error",
            Self::UnsupportedType => "unsupported_type",
            Self::Storage => "storage",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for environment variable {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
