//! Downstream delivery boundary: persistence and notification sinks.
//!
//! The pipeline itself stops at the ranked report; storing articles and
//! pushing digests to a chat channel are host concerns behind the two
//! traits here. [`deliver`] drives a report through both sinks with the
//! same guarantees the rest of the crate gives: duplicate-key conflicts
//! are logged and skipped, delivery failures are logged per attempt, and
//! nothing here can fail the run that produced the report.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::{info, warn};

use crate::types::{EvaluatedItem, ResearchReport};

/// A kept article flattened for storage.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredArticle {
    /// Subject the article was kept for.
    pub subject: String,
    /// Headline.
    pub title: String,
    /// Identity key at the storage boundary too.
    pub url: String,
    /// Teaser text.
    pub description: String,
    /// Publication time parsed from the provider's `page_age`, when given.
    pub published_at: Option<DateTime<Utc>>,
    /// Extra snippet lines, one string per line.
    pub snippets: Vec<String>,
    /// The reasoning provider's verbatim decision answer.
    pub evaluation: String,
}

impl StoredArticle {
    /// Flatten one evaluated item for its subject.
    pub fn from_evaluated(subject: &str, evaluated: &EvaluatedItem) -> Self {
        Self {
            subject: subject.to_string(),
            title: evaluated.item.title.clone(),
            url: evaluated.item.url.clone(),
            description: evaluated.item.description.clone(),
            published_at: parse_published_at(&evaluated.item.page_age),
            snippets: evaluated.item.extra_snippets.clone(),
            evaluation: evaluated.evaluation.clone(),
        }
    }
}

/// Parse the provider's publication timestamp.
///
/// Accepts RFC 3339 and the provider's zone-less ISO 8601 form; anything
/// else (including the `"N/A"` sentinel) is `None` rather than an error.
fn parse_published_at(page_age: &str) -> Option<DateTime<Utc>> {
    if let Ok(stamped) = DateTime::parse_from_rfc3339(page_age) {
        return Some(stamped.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(page_age, "%Y-%m-%dT%H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Errors at the delivery boundary.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    /// The article's URL already exists at the storage backend. Logged and
    /// skipped, never propagated as a run failure.
    #[error("duplicate article: {url}")]
    Conflict { url: String },

    /// Any other backend failure.
    #[error("sink backend error: {0}")]
    Backend(String),
}

/// Storage backend for kept articles.
#[async_trait]
pub trait PersistenceSink: Send + Sync {
    /// Store one article, reporting duplicates as [`SinkError::Conflict`].
    async fn store(&self, article: &StoredArticle) -> Result<(), SinkError>;
}

/// One line of a notification digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestEntry {
    /// Headline to display.
    pub title: String,
    /// Link target.
    pub url: String,
}

/// Per-subject notification payload: newly stored articles only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Digest {
    /// Subject the digest covers.
    pub subject: String,
    /// Articles to announce, ranked order preserved.
    pub entries: Vec<DigestEntry>,
}

/// Outbound notification channel (e.g. a chat webhook).
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Deliver one subject's digest.
    async fn notify(&self, digest: &Digest) -> Result<(), SinkError>;
}

/// Drive a report through storage and notification, best-effort.
///
/// Every kept article is offered to the persistence sink; conflicts and
/// backend failures are logged and skipped. Subjects that stored at least
/// one new article get a digest notification; a failed delivery is logged
/// and does not affect other subjects. Returns the number of newly stored
/// articles.
pub async fn deliver(
    report: &ResearchReport,
    store: &dyn PersistenceSink,
    notify: &dyn NotificationSink,
) -> usize {
    let mut stored_total = 0;

    for (subject, items) in &report.subjects {
        let mut entries = Vec::new();
        for evaluated in items {
            let article = StoredArticle::from_evaluated(subject, evaluated);
            match store.store(&article).await {
                Ok(()) => {
                    stored_total += 1;
                    entries.push(DigestEntry {
                        title: article.title,
                        url: article.url,
                    });
                }
                Err(SinkError::Conflict { url }) => {
                    info!(subject = %subject, url = %url, "article already stored, skipping");
                }
                Err(err) => {
                    warn!(subject = %subject, url = %article.url, error = %err, "failed to store article");
                }
            }
        }

        if entries.is_empty() {
            continue;
        }
        let digest = Digest {
            subject: subject.clone(),
            entries,
        };
        if let Err(err) = notify.notify(&digest).await {
            warn!(subject = %subject, error = %err, "digest delivery failed");
        }
    }

    stored_total
}
