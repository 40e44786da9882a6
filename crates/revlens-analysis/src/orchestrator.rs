//! Per-batch orchestration of the three remote analyses.

use std::sync::Arc;

use revlens_core::{AnalysisOutcome, ReviewRecord, SentimentDistribution};
use revlens_keys::{KeyPool, KeyStore};
use revlens_llm::{parse_json_response, ExecuteError, FailureKind, RequestExecutor, TextGenerator};
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::AnalysisError;
use crate::prompts::{issues_prompt, sentiment_prompt, suggestions_prompt};
use crate::reconcile::reconcile;
use crate::types::{IssuesResponse, SentimentResponse, SuggestionsResponse};

/// Runs one batch of reviews through the remote model.
///
/// The key pool is shared behind an async mutex. The lock is taken only for
/// synchronous pool operations and is never held while a remote call is in
/// flight, so pool mutations (and their persistence) complete one at a time.
pub struct AnalysisOrchestrator<G, S> {
    generator: G,
    executor: RequestExecutor,
    keys: Arc<Mutex<KeyPool<S>>>,
}

impl<G, S> AnalysisOrchestrator<G, S>
where
    G: TextGenerator,
    S: KeyStore,
{
    #[must_use]
    pub fn new(generator: G, executor: RequestExecutor, keys: Arc<Mutex<KeyPool<S>>>) -> Self {
        Self {
            generator,
            executor,
            keys,
        }
    }

    #[must_use]
    pub fn keys(&self) -> &Arc<Mutex<KeyPool<S>>> {
        &self.keys
    }

    /// Analyze `reviews` under the active credential.
    ///
    /// Sentiment, issues, and suggestions are requested concurrently and all
    /// three settle before the outcome is decided. A batch succeeds only if
    /// all three do; usage is then recorded once against the credential.
    ///
    /// # Errors
    ///
    /// - [`AnalysisError::NoCredential`] when the pool has no active key
    ///   (no remote call is made).
    /// - [`AnalysisError::EmptyBatch`] when `reviews` is empty.
    /// - [`AnalysisError::RateLimited`] if any request hit a quota. The key
    ///   is marked rate limited and the pool fails over before this returns.
    /// - [`AnalysisError::InvalidKey`] if any request was rejected for the key.
    /// - [`AnalysisError::Network`] when retries were exhausted.
    pub async fn analyze(
        &self,
        source_name: &str,
        mut reviews: Vec<ReviewRecord>,
    ) -> Result<AnalysisOutcome, AnalysisError> {
        let (credential_id, secret) = {
            let pool = self.keys.lock().await;
            let active = pool.active().ok_or(AnalysisError::NoCredential)?;
            (active.id, active.secret.clone())
        };
        if reviews.is_empty() {
            return Err(AnalysisError::EmptyBatch);
        }

        tracing::info!(
            source = source_name,
            reviews = reviews.len(),
            credential = %credential_id,
            "starting analysis batch"
        );

        let sentiment_prompt = sentiment_prompt(&reviews);
        let issues_prompt = issues_prompt(&reviews);
        let suggestions_prompt = suggestions_prompt(&reviews);

        let (sentiment, issues, suggestions) = tokio::join!(
            self.request::<SentimentResponse>(&sentiment_prompt, &secret, "sentiment response"),
            self.request::<IssuesResponse>(&issues_prompt, &secret, "issues response"),
            self.request::<SuggestionsResponse>(
                &suggestions_prompt,
                &secret,
                "suggestions response"
            ),
        );

        let (sentiment, issues, suggestions) = match (sentiment, issues, suggestions) {
            (Ok(s), Ok(i), Ok(g)) => (s, i, g),
            (Err(e), i, g) => {
                return Err(self.surface_failure(credential_id, e, [i.err(), g.err()]).await)
            }
            (Ok(_), Err(e), g) => {
                return Err(self.surface_failure(credential_id, e, [g.err(), None]).await)
            }
            (Ok(_), Ok(_), Err(e)) => {
                return Err(self.surface_failure(credential_id, e, [None, None]).await)
            }
        };

        reconcile(&mut reviews, &sentiment.results);
        let distribution = SentimentDistribution::from_reviews(&reviews);

        if let Err(e) = self.keys.lock().await.record_usage(credential_id) {
            tracing::error!(credential = %credential_id, error = %e, "failed to persist key usage");
        }

        tracing::info!(
            source = source_name,
            positive = distribution.positive,
            negative = distribution.negative,
            neutral = distribution.neutral,
            issues = issues.issues.len(),
            suggestion_categories = suggestions.suggestions.len(),
            "analysis batch complete"
        );

        Ok(AnalysisOutcome {
            source_name: source_name.to_owned(),
            credential_id,
            reviews,
            distribution,
            issues: issues.issues,
            suggestions: suggestions.suggestions,
        })
    }

    async fn request<T: DeserializeOwned>(
        &self,
        prompt: &str,
        secret: &str,
        context: &'static str,
    ) -> Result<T, ExecuteError> {
        self.executor
            .execute(|| async move {
                let raw = self.generator.generate(prompt, secret).await?;
                parse_json_response(&raw, context)
            })
            .await
    }

    /// Surface the most significant failure: rate limit, then invalid key,
    /// then network. A rate limit marks the key and fails the pool over.
    async fn surface_failure(
        &self,
        credential_id: Uuid,
        first: ExecuteError,
        others: [Option<ExecuteError>; 2],
    ) -> AnalysisError {
        let source = others.into_iter().flatten().fold(first, |worst, e| {
            if surface_rank(e.kind) < surface_rank(worst.kind) {
                e
            } else {
                worst
            }
        });

        match source.kind {
            FailureKind::RateLimit => {
                let mut pool = self.keys.lock().await;
                let next = match pool.mark_rate_limited(credential_id, None) {
                    Ok(next) => next,
                    Err(e) => {
                        tracing::error!(
                            credential = %credential_id,
                            error = %e,
                            "failed to persist rate-limit marking"
                        );
                        pool.active().map(|k| k.id)
                    }
                };
                let next_credential = next.filter(|id| *id != credential_id);
                AnalysisError::RateLimited {
                    credential_id,
                    failed_over: next_credential.is_some(),
                    next_credential,
                    source,
                }
            }
            FailureKind::InvalidKey => {
                tracing::warn!(credential = %credential_id, error = %source, "API key rejected");
                AnalysisError::InvalidKey {
                    credential_id,
                    source,
                }
            }
            FailureKind::Network => AnalysisError::Network { source },
        }
    }
}

fn surface_rank(kind: FailureKind) -> u8 {
    match kind {
        FailureKind::RateLimit => 0,
        FailureKind::InvalidKey => 1,
        FailureKind::Network => 2,
    }
}
