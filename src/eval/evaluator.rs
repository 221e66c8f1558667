//! Two-stage relevance evaluation: binary decision, then scoring.
//!
//! Stage one asks the reasoning provider whether an article is genuinely
//! about the subject; the answer must be the single word `keep` or
//! `remove` (case-insensitive). Anything else — including provider errors
//! — is treated as `remove`, so an item is never surfaced on an ambiguous
//! evaluation. Stage two runs only after a keep verdict and assigns a
//! 1–10 relevance/reliability score; there a failure merely demotes the
//! item to the minimum score, since relevance is already established.
//!
//! Every remote call first takes a slot on the shared [`TimedSemaphore`].
//! Items are evaluated independently: one item's failure never aborts a
//! sibling evaluation.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::eval::provider::ReasoningProvider;
use crate::limit::TimedSemaphore;
use crate::types::{EvaluatedItem, NewsItem, MAX_SCORE, MIN_SCORE};

/// System framing shared by both evaluation stages.
const ANALYST_ROLE: &str = "You are an expert financial news analyst.";

/// Two-stage evaluator over a reasoning provider.
#[derive(Debug)]
pub struct Evaluator<R> {
    provider: R,
    limiter: Arc<TimedSemaphore>,
}

impl<R: ReasoningProvider> Evaluator<R> {
    /// Create an evaluator sharing the given throughput limiter.
    pub fn new(provider: R, limiter: Arc<TimedSemaphore>) -> Self {
        Self { provider, limiter }
    }

    /// Evaluate one article against its subject.
    ///
    /// Never fails: decision errors fail closed (`keep == false`) and
    /// scoring errors floor the score, so a batch of these futures can be
    /// gathered without short-circuiting.
    pub async fn evaluate(&self, subject: &str, item: NewsItem) -> EvaluatedItem {
        let (keep, evaluation) = self.decide(subject, &item).await;
        let score = if keep { self.score(&item).await } else { MIN_SCORE };

        if !keep {
            debug!(subject, url = %item.url, "article filtered out");
        }

        EvaluatedItem {
            item,
            keep,
            score,
            evaluation,
        }
    }

    /// Stage one: binary relevance decision, fail-closed.
    async fn decide(&self, subject: &str, item: &NewsItem) -> (bool, String) {
        self.limiter.acquire().await;
        match self
            .provider
            .complete(ANALYST_ROLE, &decide_prompt(subject, item))
            .await
        {
            Ok(answer) => {
                let keep = match answer.trim().to_lowercase().as_str() {
                    "keep" => true,
                    "remove" => false,
                    verdict => {
                        debug!(subject, url = %item.url, verdict, "unexpected verdict, removing");
                        false
                    }
                };
                (keep, answer)
            }
            Err(err) => {
                warn!(subject, url = %item.url, error = %err, "relevance decision failed");
                (false, format!("evaluation failed: {err}"))
            }
        }
    }

    /// Stage two: numeric score, demote-on-failure.
    async fn score(&self, item: &NewsItem) -> f64 {
        self.limiter.acquire().await;
        match self.provider.complete(ANALYST_ROLE, &score_prompt(item)).await {
            Ok(reply) => parse_score(&reply).unwrap_or_else(|| {
                warn!(url = %item.url, reply, "unparseable score, flooring");
                MIN_SCORE
            }),
            Err(err) => {
                warn!(url = %item.url, error = %err, "scoring failed, flooring");
                MIN_SCORE
            }
        }
    }
}

/// Prompt for the binary relevance decision.
fn decide_prompt(subject: &str, item: &NewsItem) -> String {
    format!(
        "Evaluate the following news article and decide whether it is genuinely about \
         the named subject and relevant for financial research. Relevant coverage \
         includes funding, investment, mergers and acquisitions, regulatory updates, \
         product launches, leadership changes, and other strategic moves.\n\n\
         Subject: {subject}\n\
         Title: {}\n\
         Description: {}\n\
         URL: {}\n\
         Extra snippets: {}\n\n\
         Answer with exactly one word: 'keep' if the article is relevant and reliable, \
         or 'remove' if it is irrelevant, off-topic, or from an unreliable source.",
        item.title,
        item.description,
        item.url,
        item.extra_snippets.join(" | "),
    )
}

/// Prompt for the relevance/reliability score.
fn score_prompt(item: &NewsItem) -> String {
    format!(
        "Rate the following news article for combined relevance and source \
         reliability on a scale from 1 to 10, where 10 means highly relevant \
         and from a highly reliable source.\n\n\
         Title: {}\n\
         Description: {}\n\
         URL: {}\n\
         Extra snippets: {}\n\n\
         Respond with only the number.",
        item.title,
        item.description,
        item.url,
        item.extra_snippets.join(" | "),
    )
}

/// Extract the first numeric token from a reply, clamped to the score range.
fn parse_score(reply: &str) -> Option<f64> {
    reply
        .split_whitespace()
        .find_map(|token| {
            token
                .trim_matches(|c: char| !c.is_ascii_digit() && c != '.')
                .parse::<f64>()
                .ok()
        })
        .map(|score| score.clamp(MIN_SCORE, MAX_SCORE))
}
