use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Confidence assigned to a review the remote analysis did not score.
pub const DEFAULT_CONFIDENCE: f64 = 0.5;

/// Sentiment label attached to a single review.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    #[default]
    Neutral,
}

impl Sentiment {
    /// Every label, in the order distributions are reported.
    pub const ALL: [Sentiment; 3] = [Self::Positive, Self::Negative, Self::Neutral];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
            Self::Neutral => "neutral",
        }
    }

    /// Parse a label as returned by the model. Case and surrounding
    /// whitespace are ignored; anything unrecognised yields `None`.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "positive" => Some(Self::Positive),
            "negative" => Some(Self::Negative),
            "neutral" => Some(Self::Neutral),
            _ => None,
        }
    }
}

impl std::fmt::Display for Sentiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Clamp a model-reported confidence into `[0.0, 1.0]`.
///
/// Non-finite values (NaN, infinities) fall back to [`DEFAULT_CONFIDENCE`].
#[must_use]
pub fn clamp_confidence(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        DEFAULT_CONFIDENCE
    }
}

/// One unit of review text, plus its sentiment once analysed.
///
/// Freshly built records carry the neutral / 0.5 default so a record that
/// never gets matched against a remote result is still well-formed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewRecord {
    /// 1-based position in the uploaded document.
    pub position: usize,
    pub text: String,
    pub sentiment: Sentiment,
    /// Always within `[0.0, 1.0]`.
    pub confidence: f64,
}

impl ReviewRecord {
    #[must_use]
    pub fn new(position: usize, text: impl Into<String>) -> Self {
        Self {
            position,
            text: text.into(),
            sentiment: Sentiment::Neutral,
            confidence: DEFAULT_CONFIDENCE,
        }
    }

    /// Apply a sentiment result, clamping the confidence.
    pub fn apply(&mut self, sentiment: Sentiment, confidence: f64) {
        self.sentiment = sentiment;
        self.confidence = clamp_confidence(confidence);
    }

    /// Reset to the unmatched default.
    pub fn reset(&mut self) {
        self.sentiment = Sentiment::Neutral;
        self.confidence = DEFAULT_CONFIDENCE;
    }
}

/// A titled group of improvement suggestions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionCategory {
    pub title: String,
    #[serde(default)]
    pub points: Vec<String>,
}

/// Count of reviews per sentiment label. Every label is always present,
/// including those with a zero count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentDistribution {
    pub positive: usize,
    pub negative: usize,
    pub neutral: usize,
}

impl SentimentDistribution {
    #[must_use]
    pub fn from_reviews(reviews: &[ReviewRecord]) -> Self {
        let mut dist = Self::default();
        for review in reviews {
            match review.sentiment {
                Sentiment::Positive => dist.positive += 1,
                Sentiment::Negative => dist.negative += 1,
                Sentiment::Neutral => dist.neutral += 1,
            }
        }
        dist
    }

    #[must_use]
    pub fn count(&self, sentiment: Sentiment) -> usize {
        match sentiment {
            Sentiment::Positive => self.positive,
            Sentiment::Negative => self.negative,
            Sentiment::Neutral => self.neutral,
        }
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.positive + self.negative + self.neutral
    }

    /// `(label, count)` pairs in [`Sentiment::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (Sentiment, usize)> + '_ {
        Sentiment::ALL.into_iter().map(|s| (s, self.count(s)))
    }
}

/// Aggregate result of analysing one batch of reviews.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisOutcome {
    /// Name of the uploaded file (or other label) the batch came from.
    pub source_name: String,
    /// Credential that served the batch.
    pub credential_id: Uuid,
    pub reviews: Vec<ReviewRecord>,
    pub distribution: SentimentDistribution,
    pub issues: Vec<String>,
    pub suggestions: Vec<SuggestionCategory>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(position: usize, sentiment: Sentiment) -> ReviewRecord {
        let mut r = ReviewRecord::new(position, format!("review {position}"));
        r.apply(sentiment, 0.9);
        r
    }

    #[test]
    fn new_record_defaults_to_neutral_half() {
        let r = ReviewRecord::new(1, "fine");
        assert_eq!(r.sentiment, Sentiment::Neutral);
        assert!((r.confidence - DEFAULT_CONFIDENCE).abs() < f64::EPSILON);
    }

    #[test]
    fn apply_clamps_confidence() {
        let mut r = ReviewRecord::new(1, "great");
        r.apply(Sentiment::Positive, 1.7);
        assert!((r.confidence - 1.0).abs() < f64::EPSILON);
        r.apply(Sentiment::Negative, -0.2);
        assert!(r.confidence.abs() < f64::EPSILON);
        r.apply(Sentiment::Negative, f64::NAN);
        assert!((r.confidence - DEFAULT_CONFIDENCE).abs() < f64::EPSILON);
    }

    #[test]
    fn from_label_ignores_case_and_whitespace() {
        assert_eq!(Sentiment::from_label(" Positive "), Some(Sentiment::Positive));
        assert_eq!(Sentiment::from_label("NEGATIVE"), Some(Sentiment::Negative));
        assert_eq!(Sentiment::from_label("mixed"), None);
    }

    #[test]
    fn distribution_keeps_zero_counts() {
        let reviews = vec![record(1, Sentiment::Positive), record(2, Sentiment::Positive)];
        let dist = SentimentDistribution::from_reviews(&reviews);
        assert_eq!(dist.positive, 2);
        assert_eq!(dist.negative, 0);
        assert_eq!(dist.neutral, 0);
        assert_eq!(dist.total(), 2);

        let json = serde_json::to_value(dist).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"positive": 2, "negative": 0, "neutral": 0})
        );
    }

    #[test]
    fn distribution_iter_follows_label_order() {
        let dist = SentimentDistribution {
            positive: 1,
            negative: 2,
            neutral: 3,
        };
        let pairs: Vec<_> = dist.iter().collect();
        assert_eq!(
            pairs,
            vec![
                (Sentiment::Positive, 1),
                (Sentiment::Negative, 2),
                (Sentiment::Neutral, 3)
            ]
        );
    }

    #[test]
    fn suggestion_points_default_to_empty() {
        let cat: SuggestionCategory = serde_json::from_str(r#"{"title":"Shipping"}"#).unwrap();
        assert!(cat.points.is_empty());
    }
}
