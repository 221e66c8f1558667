//! # newsdesk
//!
//! Concurrent news research pipeline: given a list of subjects (companies,
//! tokens), query a rate-limited news search provider for each, evaluate
//! every distinct result against its subject with an LLM reasoning
//! provider, and emit the top-N most relevant articles per subject.
//!
//! ## Design
//!
//! - One search per subject, fanned out concurrently; a shared
//!   one-request-per-interval limiter is the only backpressure point
//! - Cross-subject deduplication by canonicalised URL before the expensive
//!   evaluation stage
//! - Two-stage evaluation per unique article (keep/remove decision, then a
//!   1–10 score), throttled by a timed-release semaphore, fail-closed on
//!   ambiguity
//! - Stable ranking per subject, truncated to a configurable cap
//! - Partial failure never aborts a run: a failed search or evaluation
//!   costs exactly that subject or article, nothing else
//!
//! ## Security
//!
//! - Credentials live in an explicit [`PipelineConfig`] — no process-wide
//!   mutable state, nothing logged above debug carries payload text
//! - This is a library; it opens no listeners and persists nothing itself
//!   (storage and notification are traits the host implements, see
//!   [`sink`])

pub mod config;
pub mod error;
pub mod eval;
pub mod http;
pub mod limit;
pub mod pipeline;
pub mod search;
pub mod sink;
pub mod types;

use std::sync::Arc;
use std::time::Duration;

pub use config::PipelineConfig;
pub use error::{ResearchError, Result};
pub use eval::{ChatClient, Evaluator};
pub use limit::{IntervalLimiter, TimedSemaphore};
pub use pipeline::{ResearchPipeline, RunPhase};
pub use search::NewsSearchClient;
pub use types::{EvaluatedItem, Freshness, NewsItem, ResearchReport, SubjectReport};

/// Research every subject and return ranked per-subject reports.
///
/// Builds the default provider clients from `config` and runs one
/// pipeline pass. Per-subject and per-article failures are recovered
/// inside the run; the report always covers every input subject.
///
/// # Errors
///
/// Returns [`ResearchError::Config`] if the configuration is invalid
/// (missing credentials, zero limits) — the only fatal error class.
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> newsdesk::Result<()> {
/// let config = newsdesk::PipelineConfig::from_env()?;
/// let subjects = vec!["Acme Corp".to_string(), "Globex".to_string()];
/// let report = newsdesk::research(&subjects, &config).await?;
/// for (subject, articles) in &report.subjects {
///     println!("{subject}: {} article(s)", articles.len());
/// }
/// # Ok(())
/// # }
/// ```
pub async fn research(subjects: &[String], config: &PipelineConfig) -> Result<ResearchReport> {
    build_pipeline(config)?.run(subjects).await
}

/// Assemble a [`ResearchPipeline`] with the default provider clients.
///
/// Useful when the caller wants to hold the pipeline across runs, thread
/// a carry-forward seen-set through
/// [`run_with`](ResearchPipeline::run_with), or wire up a cancellation
/// token.
///
/// # Errors
///
/// Returns [`ResearchError::Config`] on invalid configuration and
/// [`ResearchError::Http`] if the HTTP client cannot be constructed.
pub fn build_pipeline(
    config: &PipelineConfig,
) -> Result<ResearchPipeline<NewsSearchClient, ChatClient>> {
    config.validate()?;

    let client = http::build_client(Duration::from_secs(config.timeout_seconds))?;
    let search_limiter = Arc::new(IntervalLimiter::new(config.search_interval));
    let search = NewsSearchClient::new(client.clone(), config, search_limiter);

    let eval_limiter = Arc::new(TimedSemaphore::new(config.eval_concurrency, config.eval_hold));
    let evaluator = Evaluator::new(ChatClient::new(client, config), eval_limiter);

    Ok(ResearchPipeline::new(search, evaluator, config.clone()))
}
