//! Core types for news results, evaluations, and run reports.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

/// Sentinel used for optional provider fields that were absent or empty.
pub const NOT_AVAILABLE: &str = "N/A";

/// Lowest and highest meaningful relevance scores.
pub const MIN_SCORE: f64 = 0.0;
/// Upper bound of the relevance/reliability scale.
pub const MAX_SCORE: f64 = 10.0;

/// A single news article as returned by the search provider.
///
/// All string fields default to [`NOT_AVAILABLE`] when the provider omits
/// them; `url` (after canonicalisation) is the identity key used for
/// deduplication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsItem {
    /// Headline of the article.
    pub title: String,
    /// Canonical link to the article.
    pub url: String,
    /// Short description or teaser text.
    pub description: String,
    /// Publication timestamp as reported by the provider (ISO 8601 when present).
    pub page_age: String,
    /// Human-readable age string, e.g. "2 days ago".
    pub age: String,
    /// Additional snippet lines extracted from the article body.
    pub extra_snippets: Vec<String>,
}

/// A news item after the two-stage relevance evaluation.
///
/// `score` is only meaningful when `keep` is `true`; discarded items are
/// never scored and carry [`MIN_SCORE`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluatedItem {
    /// The underlying article.
    pub item: NewsItem,
    /// Whether the article survived the relevance decision.
    pub keep: bool,
    /// Combined relevance/reliability score in `0.0..=10.0`.
    pub score: f64,
    /// The reasoning provider's verbatim decision answer.
    pub evaluation: String,
}

/// Ranked, kept articles for one subject. Length is bounded by the
/// configured per-subject cap; entries are sorted by score descending with
/// ties keeping discovery order.
pub type SubjectReport = Vec<EvaluatedItem>;

/// The sole artifact of a pipeline run: one report per input subject,
/// possibly empty, never absent.
#[derive(Debug, Clone)]
pub struct ResearchReport {
    /// Correlates log lines across the run.
    pub run_id: Uuid,
    /// Per-subject ranked results.
    pub subjects: HashMap<String, SubjectReport>,
}

impl ResearchReport {
    /// The ranked report for one subject, if it was part of the run.
    pub fn report(&self, subject: &str) -> Option<&[EvaluatedItem]> {
        self.subjects.get(subject).map(Vec::as_slice)
    }

    /// Total number of kept articles across all subjects.
    pub fn total_kept(&self) -> usize {
        self.subjects.values().map(Vec::len).sum()
    }
}

/// Freshness window requested from the search provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Freshness {
    /// Articles published within the last day.
    PastDay,
    /// Articles published within the last week.
    #[default]
    PastWeek,
    /// Articles published within the last month.
    PastMonth,
    /// Articles published within the last year.
    PastYear,
}

impl Freshness {
    /// The provider's query-parameter code for this window.
    pub fn code(&self) -> &'static str {
        match self {
            Self::PastDay => "pd",
            Self::PastWeek => "pw",
            Self::PastMonth => "pm",
            Self::PastYear => "py",
        }
    }

    /// Parse a provider code back to a freshness window.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "pd" => Some(Self::PastDay),
            "pw" => Some(Self::PastWeek),
            "pm" => Some(Self::PastMonth),
            "py" => Some(Self::PastYear),
            _ => None,
        }
    }
}

impl fmt::Display for Freshness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_item(url: &str) -> NewsItem {
        NewsItem {
            title: "Example headline".into(),
            url: url.into(),
            description: "Example description".into(),
            page_age: "2026-08-01T09:00:00".into(),
            age: "5 days ago".into(),
            extra_snippets: vec!["snippet one".into()],
        }
    }

    #[test]
    fn news_item_serde_round_trip() {
        let item = make_item("https://example.com/story");
        let json = serde_json::to_string(&item).expect("serialize");
        let decoded: NewsItem = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(decoded.url, "https://example.com/story");
        assert_eq!(decoded.extra_snippets.len(), 1);
    }

    #[test]
    fn evaluated_item_serde_round_trip() {
        let evaluated = EvaluatedItem {
            item: make_item("https://example.com"),
            keep: true,
            score: 8.0,
            evaluation: "keep".into(),
        };
        let json = serde_json::to_string(&evaluated).expect("serialize");
        let decoded: EvaluatedItem = serde_json::from_str(&json).expect("deserialize");
        assert!(decoded.keep);
        assert!((decoded.score - 8.0).abs() < f64::EPSILON);
    }

    #[test]
    fn report_lookup_and_totals() {
        let mut subjects = HashMap::new();
        subjects.insert("acme".to_string(), vec![]);
        subjects.insert(
            "globex".to_string(),
            vec![EvaluatedItem {
                item: make_item("https://example.com"),
                keep: true,
                score: 7.0,
                evaluation: "keep".into(),
            }],
        );
        let report = ResearchReport {
            run_id: Uuid::new_v4(),
            subjects,
        };
        assert_eq!(report.report("acme").map(<[_]>::len), Some(0));
        assert_eq!(report.report("globex").map(<[_]>::len), Some(1));
        assert!(report.report("missing").is_none());
        assert_eq!(report.total_kept(), 1);
    }

    #[test]
    fn freshness_codes_round_trip() {
        for window in [
            Freshness::PastDay,
            Freshness::PastWeek,
            Freshness::PastMonth,
            Freshness::PastYear,
        ] {
            assert_eq!(Freshness::from_code(window.code()), Some(window));
        }
        assert_eq!(Freshness::from_code("yesterday"), None);
    }

    #[test]
    fn freshness_default_is_past_week() {
        assert_eq!(Freshness::default(), Freshness::PastWeek);
        assert_eq!(Freshness::default().to_string(), "pw");
    }
}
