//! Rendering an `AnalysisOutcome` for the terminal or for export.

use std::fmt::Write as _;

use chrono::Utc;
use clap::ValueEnum;
use revlens_core::{AnalysisOutcome, SentimentDistribution};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable summary
    Text,
    /// Full outcome as pretty-printed JSON
    Json,
    /// Per-review CSV
    Csv,
    /// Markdown report
    Markdown,
}

impl OutputFormat {
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Text => "txt",
            Self::Json => "json",
            Self::Csv => "csv",
            Self::Markdown => "md",
        }
    }
}

/// Render `outcome` in `format`.
///
/// # Errors
///
/// Returns an error only if JSON serialization fails.
pub(crate) fn render(outcome: &AnalysisOutcome, format: OutputFormat) -> anyhow::Result<String> {
    Ok(match format {
        OutputFormat::Text => render_text(outcome),
        OutputFormat::Json => serde_json::to_string_pretty(outcome)?,
        OutputFormat::Csv => render_csv(outcome),
        OutputFormat::Markdown => render_markdown(outcome),
    })
}

/// Default export file name: `reviews.csv` → `reviews_analysis.json`.
pub(crate) fn export_file_name(source_name: &str, format: OutputFormat) -> String {
    let base = source_name
        .rsplit_once('.')
        .map_or(source_name, |(base, _)| base);
    let base = if base.is_empty() { source_name } else { base };
    format!("{base}_analysis.{}", format.extension())
}

fn percent(count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let ratio = count as f64 / total as f64;
    ratio * 100.0
}

fn distribution_lines(dist: &SentimentDistribution) -> Vec<(String, usize, f64)> {
    let total = dist.total();
    dist.iter()
        .map(|(label, count)| (label.to_string(), count, percent(count, total)))
        .collect()
}

fn render_text(outcome: &AnalysisOutcome) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{}: {} reviews analyzed",
        outcome.source_name,
        outcome.reviews.len()
    );
    let _ = writeln!(out);

    let _ = writeln!(out, "{:<12}{:<8}SHARE", "SENTIMENT", "COUNT");
    for (label, count, share) in distribution_lines(&outcome.distribution) {
        let _ = writeln!(out, "{label:<12}{count:<8}{share:.1}%");
    }

    let _ = writeln!(out);
    if outcome.issues.is_empty() {
        let _ = writeln!(out, "no issues identified");
    } else {
        let _ = writeln!(out, "ISSUES");
        for issue in &outcome.issues {
            let _ = writeln!(out, "  - {issue}");
        }
    }

    for category in &outcome.suggestions {
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", category.title.to_uppercase());
        for point in &category.points {
            let _ = writeln!(out, "  - {point}");
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "{:<6}{:<11}{:<7}REVIEW", "#", "SENTIMENT", "CONF");
    for review in &outcome.reviews {
        let _ = writeln!(
            out,
            "{:<6}{:<11}{:<7.2}{}",
            review.position, review.sentiment, review.confidence, review.text
        );
    }
    out
}

fn csv_field(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

fn render_csv(outcome: &AnalysisOutcome) -> String {
    let mut rows = vec!["position,text,sentiment,confidence".to_string()];
    rows.extend(outcome.reviews.iter().map(|r| {
        [
            csv_field(&r.position.to_string()),
            csv_field(&r.text),
            csv_field(r.sentiment.as_str()),
            csv_field(&r.confidence.to_string()),
        ]
        .join(",")
    }));
    rows.join("\n")
}

fn md_cell(value: &str) -> String {
    value.replace('|', "\\|")
}

fn render_markdown(outcome: &AnalysisOutcome) -> String {
    let mut out = String::new();
    let now = Utc::now().format("%Y-%m-%d %H:%M UTC");

    let _ = writeln!(out, "# Review Analysis Report");
    let _ = writeln!(out);
    let _ = writeln!(out, "**Source**: {}", outcome.source_name);
    let _ = writeln!(out, "**Generated**: {now}");
    let _ = writeln!(out, "**Reviews**: {}", outcome.reviews.len());
    let _ = writeln!(out);
    let _ = writeln!(out, "## Sentiment");
    let _ = writeln!(out);
    let _ = writeln!(out, "| Sentiment | Count | Share |");
    let _ = writeln!(out, "|-----------|-------|-------|");
    for (label, count, share) in distribution_lines(&outcome.distribution) {
        let _ = writeln!(out, "| {label} | {count} | {share:.1}% |");
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "## Issues");
    let _ = writeln!(out);
    if outcome.issues.is_empty() {
        let _ = writeln!(out, "_None identified._");
    }
    for issue in &outcome.issues {
        let _ = writeln!(out, "- {issue}");
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "## Suggestions");
    for category in &outcome.suggestions {
        let _ = writeln!(out);
        let _ = writeln!(out, "### {}", category.title);
        let _ = writeln!(out);
        for point in &category.points {
            let _ = writeln!(out, "- {point}");
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "## Reviews");
    let _ = writeln!(out);
    let _ = writeln!(out, "| # | Sentiment | Confidence | Review |");
    let _ = writeln!(out, "|---|-----------|------------|--------|");
    for review in &outcome.reviews {
        let _ = writeln!(
            out,
            "| {} | {} | {:.2} | {} |",
            review.position,
            review.sentiment,
            review.confidence,
            md_cell(&review.text)
        );
    }
    out
}
