//! Typed classification of upstream failures.

use revlens_core::ErrorKind;
use serde::Serialize;

/// How a failed remote call should be treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Quota exhausted; the credential should be rotated, not retried.
    RateLimit,
    /// The credential was rejected; retrying cannot help.
    InvalidKey,
    /// Connectivity, timeout, unparsable output, or anything unrecognised.
    /// Worth retrying after a back-off.
    Network,
}

impl FailureKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::RateLimit => "rate_limit",
            Self::InvalidKey => "invalid_key",
            Self::Network => "network_error",
        }
    }

    #[must_use]
    pub fn is_retriable(self) -> bool {
        self == Self::Network
    }

    #[must_use]
    pub fn error_kind(self) -> ErrorKind {
        match self {
            Self::RateLimit => ErrorKind::RateLimit,
            Self::InvalidKey => ErrorKind::InvalidKey,
            Self::Network => ErrorKind::NetworkError,
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lowercase substrings that mark quota exhaustion.
const RATE_LIMIT_MARKERS: &[&str] = &[
    "quota",
    "rate limit",
    "rate_limit_exceeded",
    "resource_exhausted",
    "too many requests",
    "429",
];

/// Lowercase substrings that mark a rejected credential.
const INVALID_KEY_MARKERS: &[&str] = &[
    "api key",
    "api_key_invalid",
    "authentication",
    "unauthenticated",
    "permission_denied",
    "401",
];

/// Classify a failure from its HTTP status (if any) and message text.
///
/// Rules are checked in priority order: rate limit, then invalid key.
/// Network is the fallback bucket, so connectivity wording such as
/// `ECONNRESET`, `timeout` or `fetch failed` lands there along with
/// anything unrecognised.
#[must_use]
pub fn classify(status: Option<u16>, message: &str) -> FailureKind {
    let lower = message.to_ascii_lowercase();
    let mentions = |markers: &[&str]| markers.iter().any(|m| lower.contains(m));

    if status == Some(429) || mentions(RATE_LIMIT_MARKERS) {
        FailureKind::RateLimit
    } else if matches!(status, Some(401 | 403)) || mentions(INVALID_KEY_MARKERS) {
        FailureKind::InvalidKey
    } else {
        FailureKind::Network
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limit_markers() {
        for msg in [
            "You exceeded your current quota, please check your plan",
            "rate limit reached for requests",
            "Error 429 from upstream",
            "RATE_LIMIT_EXCEEDED",
            "RESOURCE_EXHAUSTED: Resource has been exhausted",
            "429 Too Many Requests",
        ] {
            assert_eq!(classify(None, msg), FailureKind::RateLimit, "{msg}");
        }
        assert_eq!(classify(Some(429), "whatever"), FailureKind::RateLimit);
    }

    #[test]
    fn invalid_key_markers() {
        for msg in [
            "API key not valid. Please pass a valid API key.",
            "API_KEY_INVALID",
            "authentication failed",
            "UNAUTHENTICATED",
            "PERMISSION_DENIED: caller lacks access",
            "HTTP 401",
        ] {
            assert_eq!(classify(None, msg), FailureKind::InvalidKey, "{msg}");
        }
        assert_eq!(classify(Some(401), "nope"), FailureKind::InvalidKey);
        assert_eq!(classify(Some(403), "nope"), FailureKind::InvalidKey);
    }

    #[test]
    fn rate_limit_wins_over_invalid_key() {
        assert_eq!(
            classify(Some(401), "quota exceeded for this API key"),
            FailureKind::RateLimit
        );
    }

    #[test]
    fn network_wording_and_unknown_fall_through() {
        for msg in [
            "fetch failed",
            "getaddrinfo ENOTFOUND generativelanguage.googleapis.com",
            "read ECONNRESET",
            "connect ETIMEDOUT",
            "operation timed out",
            "something entirely unexpected",
            "",
        ] {
            assert_eq!(classify(None, msg), FailureKind::Network, "{msg:?}");
        }
        assert_eq!(classify(Some(500), "internal"), FailureKind::Network);
    }

    #[test]
    fn only_network_is_retriable() {
        assert!(FailureKind::Network.is_retriable());
        assert!(!FailureKind::RateLimit.is_retriable());
        assert!(!FailureKind::InvalidKey.is_retriable());
    }
}
