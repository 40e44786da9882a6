//! Prompt builders for the three per-batch requests.

use std::fmt::Write as _;

use revlens_core::ReviewRecord;

/// Ask for one `{reviewText, sentiment, confidence}` entry per review.
///
/// Reviews are numbered from 1 in submission order.
#[must_use]
pub fn sentiment_prompt(reviews: &[ReviewRecord]) -> String {
    let mut prompt = String::from(
        "You are a sentiment analysis expert. Analyze the sentiment of each customer review below. \
         Be accurate and consider the actual emotional tone of each review.\n\n\
         For each review, determine:\n\
         - sentiment: \"positive\" (happy, satisfied, praising), \"negative\" (unhappy, complaining, criticizing), \
         or \"neutral\" (factual, mixed feelings)\n\
         - confidence: score from 0.1 to 1.0 based on how clear the sentiment is\n\n\
         Return ONLY valid JSON in this exact format:\n\
         {\n  \"results\": [\n    {\n      \"reviewText\": \"exact original review text\",\n      \
         \"sentiment\": \"positive\",\n      \"confidence\": 0.85\n    }\n  ]\n}\n\n\
         Customer Reviews:\n",
    );
    for (index, review) in reviews.iter().enumerate() {
        let _ = writeln!(prompt, "{}. {}", index + 1, review.text);
    }
    prompt.push_str("\nAnalyze each review carefully and return the JSON response:");
    prompt
}

/// Ask for the recurring issues across the batch.
#[must_use]
pub fn issues_prompt(reviews: &[ReviewRecord]) -> String {
    format!(
        "Analyze the following customer reviews and identify the key issues or pain points that \
         customers are mentioning. Provide a list of these issues.\n\n\
         Return the response in this exact JSON format:\n\
         {{\n  \"issues\": [\"issue 1\", \"issue 2\", \"issue 3\"]\n}}\n\n\
         Reviews: {}",
        joined_text(reviews)
    )
}

/// Ask for improvement suggestions grouped into titled categories.
#[must_use]
pub fn suggestions_prompt(reviews: &[ReviewRecord]) -> String {
    format!(
        "Based on the following customer reviews, provide actionable business improvement \
         suggestions. Group the suggestions into logical categories.\n\n\
         Return the response in this exact JSON format:\n\
         {{\n  \"suggestions\": [\n    {{\n      \"title\": \"Category Name\",\n      \
         \"points\": [\"suggestion 1\", \"suggestion 2\"]\n    }}\n  ]\n}}\n\n\
         Reviews: {}",
        joined_text(reviews)
    )
}

fn joined_text(reviews: &[ReviewRecord]) -> String {
    reviews
        .iter()
        .map(|r| r.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}
