//! Credential records and the persisted pool shape.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Every Google AI Studio key starts with this prefix.
pub const SECRET_PREFIX: &str = "AIza";

/// Shortest secret accepted by [`validate_secret`].
pub const SECRET_MIN_LEN: usize = 35;

/// Format check for a Google AI API key.
#[must_use]
pub fn validate_secret(secret: &str) -> bool {
    secret.starts_with(SECRET_PREFIX) && secret.len() >= SECRET_MIN_LEN
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialStatus {
    Active,
    Inactive,
    RateLimited,
}

impl CredentialStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::RateLimited => "rate_limited",
        }
    }
}

impl std::fmt::Display for CredentialStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One user-supplied API key and its usage metadata.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "key")]
    pub secret: String,
    pub status: CredentialStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_used: Option<DateTime<Utc>>,
    /// When the upstream said the limit lifts. Informational only.
    #[serde(
        default,
        rename = "rateLimitResetTime",
        skip_serializing_if = "Option::is_none"
    )]
    pub rate_limit_reset_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub usage_count: u64,
}

impl Credential {
    /// A fresh, inactive credential with a new random id.
    #[must_use]
    pub fn new(name: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            secret: secret.into(),
            status: CredentialStatus::Inactive,
            created_at: Utc::now(),
            last_used: None,
            rate_limit_reset_at: None,
            usage_count: 0,
        }
    }

    #[must_use]
    pub fn is_available(&self) -> bool {
        self.status != CredentialStatus::RateLimited
    }

    /// Secret with everything but the prefix and last four characters hidden.
    #[must_use]
    pub fn masked_secret(&self) -> String {
        let chars: Vec<char> = self.secret.chars().collect();
        if chars.len() < 12 {
            return "****".to_string();
        }
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{head}…{tail}")
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("secret", &"[redacted]")
            .field("status", &self.status)
            .field("created_at", &self.created_at)
            .field("last_used", &self.last_used)
            .field("rate_limit_reset_at", &self.rate_limit_reset_at)
            .field("usage_count", &self.usage_count)
            .finish()
    }
}

/// The full persisted state: ordered credentials, the active id, and
/// whether the user has ever added a key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialPool {
    #[serde(default)]
    pub keys: Vec<Credential>,
    #[serde(default, rename = "currentKeyId")]
    pub active_id: Option<Uuid>,
    #[serde(default = "first_time_default")]
    pub is_first_time: bool,
}

fn first_time_default() -> bool {
    true
}

impl Default for CredentialPool {
    fn default() -> Self {
        Self {
            keys: Vec::new(),
            active_id: None,
            is_first_time: true,
        }
    }
}

impl CredentialPool {
    #[must_use]
    pub fn get(&self, id: Uuid) -> Option<&Credential> {
        self.keys.iter().find(|k| k.id == id)
    }

    pub(crate) fn get_mut(&mut self, id: Uuid) -> Option<&mut Credential> {
        self.keys.iter_mut().find(|k| k.id == id)
    }

    /// Restore the pool invariants after loading foreign or stale data.
    ///
    /// - the active id must name an existing, non-rate-limited credential;
    /// - with no valid active id, the first credential already marked active
    ///   (and not rate limited) is adopted;
    /// - only the active credential may carry [`CredentialStatus::Active`].
    ///
    /// Returns `true` when anything changed.
    pub(crate) fn repair(&mut self) -> bool {
        let before = self.clone();

        let active_valid = self
            .active_id
            .and_then(|id| self.get(id))
            .is_some_and(Credential::is_available);
        if !active_valid {
            self.active_id = self
                .keys
                .iter()
                .find(|k| k.status == CredentialStatus::Active)
                .map(|k| k.id);
        }

        let active_id = self.active_id;
        for key in &mut self.keys {
            if Some(key.id) == active_id {
                key.status = CredentialStatus::Active;
            } else if key.status == CredentialStatus::Active {
                key.status = CredentialStatus::Inactive;
            }
        }

        *self != before
    }
}
