use std::path::PathBuf;

use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every variable has a default, so only malformed values fail.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let env = parse_environment(&or_default("REVLENS_ENV", "development"))?;
    let log_level = or_default("REVLENS_LOG_LEVEL", "info");
    let keys_path = PathBuf::from(or_default("REVLENS_KEYS_PATH", ".revlens/keys.json"));

    let llm_base_url = or_default(
        "REVLENS_LLM_BASE_URL",
        "https://generativelanguage.googleapis.com",
    );
    let llm_model = or_default("REVLENS_LLM_MODEL", "gemini-2.0-flash");
    let llm_timeout_secs = parse_u64("REVLENS_LLM_TIMEOUT_SECS", "60")?;
    let llm_user_agent = or_default("REVLENS_LLM_USER_AGENT", "revlens/0.1 (review-analysis)");
    let llm_max_attempts = parse_u32("REVLENS_LLM_MAX_ATTEMPTS", "3")?;
    let llm_retry_backoff_base_ms = parse_u64("REVLENS_LLM_RETRY_BACKOFF_BASE_MS", "1000")?;

    if env == Environment::Production && !llm_base_url.starts_with("https://") {
        return Err(ConfigError::InvalidEnvVar {
            var: "REVLENS_LLM_BASE_URL".to_string(),
            reason: "production requires an https:// endpoint".to_string(),
        });
    }

    if llm_max_attempts == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "REVLENS_LLM_MAX_ATTEMPTS".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }

    Ok(AppConfig {
        env,
        log_level,
        keys_path,
        llm_base_url,
        llm_model,
        llm_timeout_secs,
        llm_user_agent,
        llm_max_attempts,
        llm_retry_backoff_base_ms,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "REVLENS_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
