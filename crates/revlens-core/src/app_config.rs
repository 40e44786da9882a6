use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Runtime settings for the analysis client and the local key store.
///
/// No credential secrets live here: keys are owned by the key pool and
/// persisted through its store.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    /// Location of the JSON credential store.
    pub keys_path: PathBuf,
    pub llm_base_url: String,
    pub llm_model: String,
    pub llm_timeout_secs: u64,
    pub llm_user_agent: String,
    /// Total invocations per remote call, including the first.
    pub llm_max_attempts: u32,
    /// Linear backoff step: the n-th retry waits `n * base` milliseconds.
    pub llm_retry_backoff_base_ms: u64,
}
