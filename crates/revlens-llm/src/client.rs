//! HTTP client for the Generative Language `generateContent` endpoint.

use std::future::Future;
use std::time::Duration;

use reqwest::{Client, Url};
use revlens_core::AppConfig;
use serde::{Deserialize, Serialize};

use crate::error::LlmError;

const DEFAULT_MODEL: &str = "gemini-2.0-flash";
const DEFAULT_USER_AGENT: &str = "revlens/0.1 (review-analysis)";
const API_KEY_HEADER: &str = "x-goog-api-key";
const MAX_ERROR_BODY_CHARS: usize = 500;

/// One-shot text generation with a caller-supplied API key.
///
/// The analysis orchestrator depends on this trait rather than on
/// [`GeminiClient`] so tests can substitute a scripted generator.
pub trait TextGenerator {
    /// Send `prompt` to the model and return its raw text reply.
    fn generate(
        &self,
        prompt: &str,
        api_key: &str,
    ) -> impl Future<Output = Result<String, LlmError>> + Send;
}

/// Client for Google's Generative Language API.
///
/// The API key is not part of the client: each call carries the key the
/// pool selected for it. Use [`GeminiClient::new`] for production or
/// [`GeminiClient::with_base_url`] to point at a mock server in tests.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Client,
    endpoint: Url,
    model: String,
}

impl GeminiClient {
    /// Build a client from the `llm_*` settings in `config`.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::Http`] if the `reqwest::Client` cannot be
    /// constructed, or [`LlmError::InvalidBaseUrl`] for an unusable base URL.
    pub fn new(config: &AppConfig) -> Result<Self, LlmError> {
        Self::build(
            &config.llm_base_url,
            &config.llm_model,
            config.llm_timeout_secs,
            &config.llm_user_agent,
        )
    }

    /// A client with default model and user agent aimed at `base_url`.
    ///
    /// # Errors
    ///
    /// Same as [`GeminiClient::new`].
    pub fn with_base_url(base_url: &str, timeout_secs: u64) -> Result<Self, LlmError> {
        Self::build(base_url, DEFAULT_MODEL, timeout_secs, DEFAULT_USER_AGENT)
    }

    fn build(
        base_url: &str,
        model: &str,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        let raw = format!(
            "{}/v1beta/models/{model}:generateContent",
            base_url.trim_end_matches('/')
        );
        let endpoint = Url::parse(&raw).map_err(|e| LlmError::InvalidBaseUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            endpoint,
            model: model.to_owned(),
        })
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Call `generateContent` with a single user turn.
    ///
    /// Concatenates the text parts of the first candidate.
    ///
    /// # Errors
    ///
    /// - [`LlmError::Http`] on transport failure.
    /// - [`LlmError::Status`] on a non-2xx status; the message comes from the
    ///   API's error envelope when present.
    /// - [`LlmError::Deserialize`] if the 2xx body is not the expected shape.
    /// - [`LlmError::EmptyResponse`] if no text came back.
    pub async fn generate_content(&self, prompt: &str, api_key: &str) -> Result<String, LlmError> {
        let body = GenerateRequest {
            contents: [Content {
                role: "user",
                parts: [Part { text: prompt }],
            }],
        };

        tracing::debug!(model = %self.model, prompt_chars = prompt.len(), "calling generateContent");

        let response = self
            .client
            .post(self.endpoint.clone())
            .header(API_KEY_HEADER, api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(LlmError::Status {
                status: status.as_u16(),
                message: error_message(&text),
            });
        }

        let parsed: GenerateResponse =
            serde_json::from_str(&text).map_err(|source| LlmError::Deserialize {
                context: "generateContent response".to_owned(),
                source,
            })?;

        let output: String = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if output.trim().is_empty() {
            return Err(LlmError::EmptyResponse);
        }
        Ok(output)
    }
}

impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str, api_key: &str) -> Result<String, LlmError> {
        self.generate_content(prompt, api_key).await
    }
}

/// Best human-readable message from an error body.
///
/// Prefers `"{status}: {message}"` from the `{"error": {...}}` envelope and
/// otherwise falls back to the (truncated) raw body.
fn error_message(body: &str) -> String {
    if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(body) {
        let detail = envelope.error;
        match (detail.status, detail.message) {
            (Some(status), Some(message)) => return format!("{status}: {message}"),
            (None, Some(message)) => return message,
            (Some(status), None) => return status,
            (None, None) => {}
        }
    }
    body.chars().take(MAX_ERROR_BODY_CHARS).collect()
}

// --- wire types ---

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: [Part<'a>; 1],
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: Option<String>,
    status: Option<String>,
}
