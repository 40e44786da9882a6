use revlens_core::ErrorKind;
use revlens_llm::ExecuteError;
use thiserror::Error;
use uuid::Uuid;

/// Why a batch produced no outcome.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("no API key available; add an API key to continue")]
    NoCredential,

    #[error("no reviews to analyze")]
    EmptyBatch,

    /// The credential hit its quota. It has been marked rate limited and,
    /// when `failed_over` is set, `next_credential` is now active.
    #[error("{}", rate_limit_message(*.failed_over))]
    RateLimited {
        credential_id: Uuid,
        failed_over: bool,
        next_credential: Option<Uuid>,
        #[source]
        source: ExecuteError,
    },

    #[error("API key {credential_id} was rejected by the provider: {source}")]
    InvalidKey {
        credential_id: Uuid,
        #[source]
        source: ExecuteError,
    },

    #[error("analysis request failed: {source}")]
    Network {
        #[source]
        source: ExecuteError,
    },
}

fn rate_limit_message(failed_over: bool) -> &'static str {
    if failed_over {
        "rate limit exceeded; switched to the next available key, please try again"
    } else {
        "all API keys have reached their rate limits; wait before trying again"
    }
}

impl AnalysisError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NoCredential => ErrorKind::NoCredential,
            Self::EmptyBatch => ErrorKind::Validation,
            Self::RateLimited { .. } => ErrorKind::RateLimit,
            Self::InvalidKey { .. } => ErrorKind::InvalidKey,
            Self::Network { .. } => ErrorKind::NetworkError,
        }
    }

    /// Whether re-running the batch now could succeed without user action.
    #[must_use]
    pub fn is_retry_after_failover(&self) -> bool {
        matches!(
            self,
            Self::RateLimited {
                failed_over: true,
                ..
            }
        )
    }
}

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("unsupported file type: {mime} ({name})")]
    UnsupportedType { name: String, mime: String },

    /// The file claimed a supported type but its contents could not be read.
    #[error("failed to parse {format} file {name}: {reason}")]
    Unreadable {
        name: String,
        format: &'static str,
        reason: String,
    },
}

impl IngestError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnsupportedType { .. } => ErrorKind::UnsupportedType,
            Self::Unreadable { .. } => ErrorKind::Validation,
        }
    }
}
