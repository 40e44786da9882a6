//! Review analysis for revlens.
//!
//! [`AnalysisOrchestrator::analyze`] runs the sentiment, issues, and
//! suggestions requests for one batch concurrently under the pool's active
//! credential, turns upstream failures into [`AnalysisError`]s (failing the
//! pool over on rate limits), and reconciles per-review sentiment onto the
//! submitted order. [`ingest`] turns uploaded files into review records.

pub mod error;
pub mod ingest;
pub mod orchestrator;
pub mod prompts;
pub mod reconcile;
pub mod types;

pub use error::{AnalysisError, IngestError};
pub use ingest::{parse_document, reviews_from_text};
pub use orchestrator::AnalysisOrchestrator;
pub use reconcile::reconcile;
pub use types::{IssuesResponse, SentimentEntry, SentimentResponse, SuggestionsResponse};
