//! Remote LLM access for revlens.
//!
//! [`GeminiClient`] talks to Google's Generative Language API through the
//! [`TextGenerator`] seam, [`classify`] maps failures onto a closed set of
//! [`FailureKind`]s, and [`RequestExecutor`] retries network-class failures
//! with a linear back-off while stopping at once on quota or auth problems.

pub mod classify;
pub mod client;
pub mod error;
pub mod response;
pub mod retry;

pub use classify::{classify, FailureKind};
pub use client::{GeminiClient, TextGenerator};
pub use error::{ExecuteError, LlmError};
pub use response::{parse_json_response, strip_code_fence};
pub use retry::{RequestExecutor, RetryPolicy};
