//! Extraction of JSON payloads from model text.

use serde::de::DeserializeOwned;

use crate::error::LlmError;

/// Strip a surrounding Markdown code fence (```` ``` ```` or ```` ```json ````).
///
/// Text without a leading fence is returned trimmed and otherwise untouched.
#[must_use]
pub fn strip_code_fence(raw: &str) -> &str {
    let text = raw.trim();
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = rest
        .strip_prefix("json")
        .or_else(|| rest.strip_prefix("JSON"))
        .unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// Parse model output as `T` after removing any code fence.
///
/// # Errors
///
/// Returns [`LlmError::Deserialize`] tagged with `context` when the text is
/// not valid JSON for `T`. That error classifies as network-class, so the
/// executor retries it.
pub fn parse_json_response<T: DeserializeOwned>(raw: &str, context: &str) -> Result<T, LlmError> {
    serde_json::from_str(strip_code_fence(raw)).map_err(|source| LlmError::Deserialize {
        context: context.to_owned(),
        source,
    })
}
