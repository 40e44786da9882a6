//! Payload shapes the model is asked to return.
//!
//! Every list defaults to empty so a reply that omits a key still parses.

use revlens_core::SuggestionCategory;
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct SentimentResponse {
    #[serde(default)]
    pub results: Vec<SentimentEntry>,
}

/// One per-review verdict as the model reported it.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SentimentEntry {
    #[serde(default)]
    pub review_text: String,
    /// Free-form label; unknown values are treated as neutral downstream.
    #[serde(default)]
    pub sentiment: String,
    #[serde(default)]
    pub confidence: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct IssuesResponse {
    #[serde(default)]
    pub issues: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct SuggestionsResponse {
    #[serde(default)]
    pub suggestions: Vec<SuggestionCategory>,
}
