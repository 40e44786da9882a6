//! Client-side API key pool for revlens.
//!
//! Holds the user's LLM credentials, enforces the single-active-key rule,
//! fails over when a key is rate limited, and persists every mutation
//! through a [`KeyStore`] backend.

pub mod credential;
pub mod error;
pub mod pool;
pub mod store;

pub use credential::{
    validate_secret, Credential, CredentialPool, CredentialStatus, SECRET_MIN_LEN, SECRET_PREFIX,
};
pub use error::{KeyPoolError, StoreError, ValidationError};
pub use pool::KeyPool;
pub use store::{JsonFileStore, KeyStore, MemoryStore};
