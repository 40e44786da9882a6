use std::path::PathBuf;

use revlens_core::ErrorKind;
use thiserror::Error;

/// Rejected input to [`crate::KeyPool::add`] or [`crate::KeyPool::rename`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("key name must not be empty")]
    EmptyName,

    #[error("API key must not be empty")]
    EmptySecret,

    #[error("API key does not look like a Google AI key (expected prefix '{prefix}' and at least {min_len} characters)")]
    MalformedSecret { prefix: &'static str, min_len: usize },
}

/// Failure reading or writing the persisted credential pool.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("credential store {path} is not valid JSON: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize credential pool: {0}")]
    Serialize(#[source] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum KeyPoolError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("credential store error: {0}")]
    Store(#[from] StoreError),
}

impl KeyPoolError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::Store(_) => ErrorKind::Storage,
        }
    }
}
