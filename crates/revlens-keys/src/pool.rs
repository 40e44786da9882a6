//! Business rules over the stored credential pool.
//!
//! [`KeyPool`] is the single authoritative view of the user's credentials.
//! It guarantees that at most one credential is active, that the active
//! credential is never rate limited, and that every mutation is persisted
//! before the call returns.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::credential::{validate_secret, Credential, CredentialPool, CredentialStatus};
use crate::credential::{SECRET_MIN_LEN, SECRET_PREFIX};
use crate::error::{KeyPoolError, StoreError, ValidationError};
use crate::store::KeyStore;

pub struct KeyPool<S> {
    store: S,
    state: CredentialPool,
}

impl<S: KeyStore> KeyPool<S> {
    /// Load the pool from `store`.
    ///
    /// A store holding unparsable data is treated like an empty one: the
    /// pool starts in its first-run state and a warning is logged. Stored
    /// data that breaks the pool invariants is repaired and written back.
    ///
    /// # Errors
    ///
    /// Returns [`KeyPoolError::Store`] if the medium cannot be read, or if a
    /// repaired pool cannot be written back.
    pub fn open(store: S) -> Result<Self, KeyPoolError> {
        let state = match store.load() {
            Ok(Some(state)) => state,
            Ok(None) => CredentialPool::default(),
            Err(e @ StoreError::Corrupt { .. }) => {
                tracing::warn!(error = %e, "discarding unreadable credential store");
                CredentialPool::default()
            }
            Err(e) => return Err(e.into()),
        };

        let mut pool = Self { store, state };
        if pool.state.repair() {
            tracing::warn!(
                keys = pool.state.keys.len(),
                "stored credential pool violated invariants; repaired"
            );
            pool.persist()?;
        }
        Ok(pool)
    }

    /// Read-only view of the whole pool.
    #[must_use]
    pub fn state(&self) -> &CredentialPool {
        &self.state
    }

    /// The backing store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Add a credential. The first credential ever added becomes active.
    ///
    /// Name and secret are trimmed before validation and storage.
    ///
    /// # Errors
    ///
    /// - [`KeyPoolError::Validation`] if the name or secret is empty or the
    ///   secret fails [`validate_secret`]; the pool is left unchanged.
    /// - [`KeyPoolError::Store`] if persisting fails.
    pub fn add(&mut self, name: &str, secret: &str) -> Result<Credential, KeyPoolError> {
        let name = name.trim();
        let secret = secret.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        if secret.is_empty() {
            return Err(ValidationError::EmptySecret.into());
        }
        if !validate_secret(secret) {
            return Err(ValidationError::MalformedSecret {
                prefix: SECRET_PREFIX,
                min_len: SECRET_MIN_LEN,
            }
            .into());
        }

        let mut credential = Credential::new(name, secret);
        while self.state.get(credential.id).is_some() {
            credential.id = Uuid::new_v4();
        }
        if self.state.keys.is_empty() {
            credential.status = CredentialStatus::Active;
            self.state.active_id = Some(credential.id);
        }

        self.state.keys.push(credential.clone());
        self.state.is_first_time = false;
        self.persist()?;

        tracing::info!(credential = %credential.id, status = %credential.status, "added API key");
        Ok(credential)
    }

    /// Remove a credential. Returns `false` if `id` is unknown.
    ///
    /// Removing the active credential activates the first remaining
    /// credential that is not rate limited, or leaves the pool without an
    /// active credential.
    ///
    /// # Errors
    ///
    /// Returns [`KeyPoolError::Store`] if persisting fails.
    pub fn remove(&mut self, id: Uuid) -> Result<bool, KeyPoolError> {
        let Some(index) = self.state.keys.iter().position(|k| k.id == id) else {
            return Ok(false);
        };
        self.state.keys.remove(index);

        if self.state.active_id == Some(id) {
            self.state.active_id = None;
            let replacement = self
                .state
                .keys
                .iter()
                .find(|k| k.is_available())
                .map(|k| k.id);
            if let Some(next) = replacement {
                self.activate(next);
            }
            tracing::info!(
                removed = %id,
                replacement = ?replacement,
                "removed active API key"
            );
        }

        self.persist()?;
        Ok(true)
    }

    /// Make `id` the active credential. Returns `false` if `id` is unknown
    /// or rate limited. Calling it again with the current active id is a
    /// no-op.
    ///
    /// # Errors
    ///
    /// Returns [`KeyPoolError::Store`] if persisting fails.
    pub fn set_active(&mut self, id: Uuid) -> Result<bool, KeyPoolError> {
        let Some(target) = self.state.get(id) else {
            return Ok(false);
        };
        match target.status {
            CredentialStatus::RateLimited => return Ok(false),
            CredentialStatus::Active if self.state.active_id == Some(id) => return Ok(true),
            CredentialStatus::Active | CredentialStatus::Inactive => {}
        }

        self.activate(id);
        self.persist()?;
        Ok(true)
    }

    #[must_use]
    pub fn active(&self) -> Option<&Credential> {
        self.state.active_id.and_then(|id| self.state.get(id))
    }

    #[must_use]
    pub fn get(&self, id: Uuid) -> Option<&Credential> {
        self.state.get(id)
    }

    /// Every credential, in insertion order.
    #[must_use]
    pub fn list_all(&self) -> &[Credential] {
        &self.state.keys
    }

    /// Credentials that are not rate limited.
    #[must_use]
    pub fn list_available(&self) -> Vec<&Credential> {
        self.state.keys.iter().filter(|k| k.is_available()).collect()
    }

    /// The available credential with the lowest usage count; ties go to the
    /// earliest `created_at`, then to pool order.
    #[must_use]
    pub fn pick_least_used_available(&self) -> Option<&Credential> {
        self.state
            .keys
            .iter()
            .filter(|k| k.is_available())
            .min_by(|a, b| {
                a.usage_count
                    .cmp(&b.usage_count)
                    .then(a.created_at.cmp(&b.created_at))
            })
    }

    /// Mark `id` as rate limited, recording when the limit is expected to
    /// lift.
    ///
    /// If `id` was active, fails over to [`Self::pick_least_used_available`];
    /// with nothing available the pool is left without an active credential.
    /// Returns the active credential id after the call. An unknown `id`
    /// changes nothing.
    ///
    /// # Errors
    ///
    /// Returns [`KeyPoolError::Store`] if persisting fails.
    pub fn mark_rate_limited(
        &mut self,
        id: Uuid,
        reset_at: Option<DateTime<Utc>>,
    ) -> Result<Option<Uuid>, KeyPoolError> {
        let Some(credential) = self.state.get_mut(id) else {
            return Ok(self.state.active_id);
        };
        credential.status = CredentialStatus::RateLimited;
        credential.rate_limit_reset_at = reset_at;

        if self.state.active_id == Some(id) {
            self.state.active_id = None;
            if let Some(next) = self.pick_least_used_available().map(|k| k.id) {
                self.activate(next);
            }
            tracing::warn!(
                credential = %id,
                failover = ?self.state.active_id,
                "active API key rate limited"
            );
        }

        self.persist()?;
        Ok(self.state.active_id)
    }

    /// Explicitly lift a rate limit once the caller knows it has cleared:
    /// `rate_limited -> inactive`. Returns `false` if `id` is unknown or not
    /// rate limited.
    ///
    /// # Errors
    ///
    /// Returns [`KeyPoolError::Store`] if persisting fails.
    pub fn clear_rate_limit(&mut self, id: Uuid) -> Result<bool, KeyPoolError> {
        let Some(credential) = self.state.get_mut(id) else {
            return Ok(false);
        };
        if credential.status != CredentialStatus::RateLimited {
            return Ok(false);
        }
        credential.status = CredentialStatus::Inactive;
        credential.rate_limit_reset_at = None;
        self.persist()?;
        Ok(true)
    }

    /// Count one successful remote call against `id`. Returns `false` if
    /// `id` is unknown.
    ///
    /// # Errors
    ///
    /// Returns [`KeyPoolError::Store`] if persisting fails.
    pub fn record_usage(&mut self, id: Uuid) -> Result<bool, KeyPoolError> {
        let Some(credential) = self.state.get_mut(id) else {
            return Ok(false);
        };
        credential.usage_count = credential.usage_count.saturating_add(1);
        credential.last_used = Some(Utc::now());
        self.persist()?;
        Ok(true)
    }

    /// Change a credential's display name. Returns `false` if `id` is unknown.
    ///
    /// # Errors
    ///
    /// - [`KeyPoolError::Validation`] if `name` is empty.
    /// - [`KeyPoolError::Store`] if persisting fails.
    pub fn rename(&mut self, id: Uuid, name: &str) -> Result<bool, KeyPoolError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        let Some(credential) = self.state.get_mut(id) else {
            return Ok(false);
        };
        credential.name = name.to_string();
        self.persist()?;
        Ok(true)
    }

    #[must_use]
    pub fn is_first_time(&self) -> bool {
        self.state.is_first_time
    }

    /// Record that the first-run onboarding has been seen.
    ///
    /// # Errors
    ///
    /// Returns [`KeyPoolError::Store`] if persisting fails.
    pub fn reset_first_time(&mut self) -> Result<(), KeyPoolError> {
        self.state.is_first_time = false;
        self.persist()
    }

    /// Drop every credential and return to the first-run state.
    ///
    /// # Errors
    ///
    /// Returns [`KeyPoolError::Store`] if persisting fails.
    pub fn clear(&mut self) -> Result<(), KeyPoolError> {
        self.state = CredentialPool::default();
        self.persist()
    }

    /// Set `id` active and demote every other active credential.
    fn activate(&mut self, id: Uuid) {
        for key in &mut self.state.keys {
            if key.id == id {
                key.status = CredentialStatus::Active;
            } else if key.status == CredentialStatus::Active {
                key.status = CredentialStatus::Inactive;
            }
        }
        self.state.active_id = Some(id);
    }

    fn persist(&self) -> Result<(), KeyPoolError> {
        self.store.save(&self.state).map_err(|e| {
            tracing::error!(error = %e, "failed to persist credential pool");
            KeyPoolError::from(e)
        })
    }
}
