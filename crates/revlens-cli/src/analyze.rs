//! The `analyze` command: ingest a file, run one batch, render the outcome.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context as _;
use revlens_analysis::{parse_document, reviews_from_text, AnalysisError, AnalysisOrchestrator};
use revlens_core::{AnalysisOutcome, AppConfig};
use revlens_keys::{KeyPool, KeyStore};
use revlens_llm::{GeminiClient, RequestExecutor, RetryPolicy, TextGenerator};
use tokio::sync::Mutex;

use crate::report::{export_file_name, render, OutputFormat};

#[derive(Debug)]
pub(crate) struct AnalyzeArgs {
    pub file: PathBuf,
    pub mime: Option<String>,
    pub format: OutputFormat,
    pub output: Option<PathBuf>,
    pub retry_on_failover: bool,
}

/// Analyze the file named in `args` and print or write the report.
///
/// # Errors
///
/// Returns an error if the file cannot be read or has an unsupported type,
/// the batch fails, or the report cannot be written.
pub(crate) async fn run_analyze<S: KeyStore>(
    config: &AppConfig,
    keys: Arc<Mutex<KeyPool<S>>>,
    args: &AnalyzeArgs,
) -> anyhow::Result<()> {
    let client = GeminiClient::new(config)?;
    let executor = RequestExecutor::new(RetryPolicy::from_config(config));
    let orchestrator = AnalysisOrchestrator::new(client, executor, keys);
    analyze_file(&orchestrator, args, &mut std::io::stdout()).await
}

/// Ingest, analyze, and render `args.file`. Only the report itself goes to
/// `out`; progress is logged.
async fn analyze_file<G: TextGenerator, S: KeyStore, W: Write>(
    orchestrator: &AnalysisOrchestrator<G, S>,
    args: &AnalyzeArgs,
    out: &mut W,
) -> anyhow::Result<()> {
    let source_name = args
        .file
        .file_name()
        .map_or_else(|| args.file.display().to_string(), |n| n.to_string_lossy().into_owned());
    let bytes = tokio::fs::read(&args.file)
        .await
        .with_context(|| format!("failed to read {}", args.file.display()))?;
    let text = parse_document(&source_name, args.mime.as_deref().unwrap_or(""), &bytes)
        .map_err(|e| anyhow::anyhow!("{e} [{}]", e.kind()))?;
    let reviews = reviews_from_text(&text);
    tracing::info!(source = %source_name, reviews = reviews.len(), "extracted reviews");

    let outcome = analyze_with_failover(orchestrator, &source_name, reviews, args.retry_on_failover)
        .await
        .map_err(|e| anyhow::anyhow!("{e} [{}]", e.kind()))?;

    let rendered = render(&outcome, args.format)?;
    match &args.output {
        Some(path) => {
            let path = resolve_output_path(path, &source_name, args.format);
            tokio::fs::write(&path, rendered)
                .await
                .with_context(|| format!("failed to write {}", path.display()))?;
            tracing::info!(path = %path.display(), "report written");
        }
        None => writeln!(out, "{rendered}").context("failed to write report")?,
    }
    Ok(())
}

/// Run the batch, re-issuing it after a rate-limit fail-over when `retry` is
/// set. Re-issues are bounded by the number of keys in the pool.
pub(crate) async fn analyze_with_failover<G: TextGenerator, S: KeyStore>(
    orchestrator: &AnalysisOrchestrator<G, S>,
    source_name: &str,
    reviews: Vec<revlens_core::ReviewRecord>,
    retry: bool,
) -> Result<AnalysisOutcome, AnalysisError> {
    let max_reissues = if retry {
        orchestrator.keys().lock().await.list_all().len().saturating_sub(1)
    } else {
        0
    };

    let mut reissues = 0usize;
    loop {
        match orchestrator.analyze(source_name, reviews.clone()).await {
            Err(e) if e.is_retry_after_failover() && reissues < max_reissues => {
                reissues += 1;
                tracing::warn!(reissues, max_reissues, error = %e, "re-running batch on fail-over key");
            }
            other => return other,
        }
    }
}

/// A directory target gets the default export name inside it.
fn resolve_output_path(path: &Path, source_name: &str, format: OutputFormat) -> PathBuf {
    if path.is_dir() {
        path.join(export_file_name(source_name, format))
    } else {
        path.to_path_buf()
    }
}
