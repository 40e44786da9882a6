//! Matching per-review sentiment results back onto the submitted reviews.

use revlens_core::{ReviewRecord, Sentiment, DEFAULT_CONFIDENCE};

use crate::types::SentimentEntry;

/// Apply `results` to `reviews` in place.
///
/// For review *i*: the first entry whose trimmed, case-folded text equals the
/// review's wins; otherwise entry *i* is used; otherwise the review is reset
/// to neutral / 0.5. Unknown labels become neutral and confidences are
/// clamped into `[0, 1]`.
pub fn reconcile(reviews: &mut [ReviewRecord], results: &[SentimentEntry]) {
    let keys: Vec<String> = results.iter().map(|e| normalize(&e.review_text)).collect();
    let mut positional = 0usize;

    for (index, review) in reviews.iter_mut().enumerate() {
        let key = normalize(&review.text);
        let entry = keys
            .iter()
            .position(|k| *k == key)
            .and_then(|i| results.get(i))
            .or_else(|| {
                positional += 1;
                results.get(index)
            });

        match entry {
            Some(entry) => review.apply(
                Sentiment::from_label(&entry.sentiment).unwrap_or_default(),
                entry.confidence.unwrap_or(DEFAULT_CONFIDENCE),
            ),
            None => review.reset(),
        }
    }

    if positional > 0 {
        tracing::debug!(
            reviews = reviews.len(),
            results = results.len(),
            unmatched_by_text = positional,
            "sentiment results reconciled by position"
        );
    }
}

fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}
