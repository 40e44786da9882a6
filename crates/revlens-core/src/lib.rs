//! Shared domain types and configuration for revlens.

mod app_config;
mod config;
mod error;
mod types;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use error::{ConfigError, ErrorKind};
pub use types::{
    clamp_confidence, AnalysisOutcome, ReviewRecord, Sentiment, SentimentDistribution,
    SuggestionCategory, DEFAULT_CONFIDENCE,
};
