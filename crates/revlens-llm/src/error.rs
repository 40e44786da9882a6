use revlens_core::ErrorKind;
use thiserror::Error;

use crate::classify::{classify, FailureKind};

/// Errors produced by a single remote generation call.
#[derive(Debug, Error)]
pub enum LlmError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-2xx status.
    #[error("upstream returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// The API answered 2xx but carried no generated text.
    #[error("model returned an empty response")]
    EmptyResponse,

    /// A response body (API envelope or model output) did not parse.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid LLM base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// Failure reported only as text, e.g. by an alternative generator.
    #[error("{0}")]
    Message(String),
}

impl LlmError {
    /// HTTP status attached to the failure, when there is one.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Map this failure onto the retry taxonomy.
    ///
    /// Transport failures are classified by their HTTP status alone, since
    /// their message embeds the request URL. Empty bodies and unparsable
    /// output are network-class; upstream statuses and text-only failures go
    /// through [`classify`].
    #[must_use]
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            Self::Http(e) => e
                .status()
                .map_or(FailureKind::Network, |s| classify(Some(s.as_u16()), "")),
            Self::EmptyResponse | Self::Deserialize { .. } | Self::InvalidBaseUrl { .. } => {
                FailureKind::Network
            }
            Self::Status { .. } | Self::Message(_) => classify(self.status(), &self.to_string()),
        }
    }
}

/// The classified error surfaced by [`crate::RequestExecutor::execute`] once
/// it stops retrying.
#[derive(Debug, Error)]
#[error("{kind} after {attempts} attempt(s): {source}")]
pub struct ExecuteError {
    pub kind: FailureKind,
    /// Invocations of the operation, including the first.
    pub attempts: u32,
    #[source]
    pub source: LlmError,
}

impl ExecuteError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        self.kind.error_kind()
    }
}
