//! Result deduplication against a run-scoped seen-set.
//!
//! Identity is the canonicalised URL, so syntactic variants of one article
//! (tracking parameters, trailing slash, fragment) collapse to a single
//! key. Untitled results are dropped before the key check — they carry
//! nothing worth evaluating. Within a batch, order is preserved and the
//! first occurrence wins.
//!
//! The caller owns the seen-set: the orchestrator threads one set through
//! every batch of a run, and may pre-seed it with keys carried forward
//! from earlier runs.

use std::collections::HashSet;

use url::Url;

use crate::types::{NewsItem, NOT_AVAILABLE};

/// Query parameters that never distinguish two articles.
const TRACKING_PARAMS: &[&str] = &[
    "utm_source",
    "utm_medium",
    "utm_campaign",
    "utm_term",
    "utm_content",
    "fbclid",
    "gclid",
];

/// Filter a batch down to first-seen, titled results.
///
/// `seen` is updated in place so subsequent batches in the same run
/// observe the keys added here.
pub fn dedupe(seen: &mut HashSet<String>, batch: Vec<NewsItem>) -> Vec<NewsItem> {
    batch
        .into_iter()
        .filter(has_title)
        .filter(|item| seen.insert(canonical_url(&item.url)))
        .collect()
}

fn has_title(item: &NewsItem) -> bool {
    let title = item.title.trim();
    !title.is_empty() && title != NOT_AVAILABLE
}

/// Canonicalise a URL into a dedup identity key.
///
/// Lowercases scheme and host (via parsing), strips the fragment, default
/// ports, known tracking parameters, and any trailing slash. Strings that
/// do not parse as URLs are keyed on their trimmed raw form.
pub fn canonical_url(raw: &str) -> String {
    let Ok(mut parsed) = Url::parse(raw) else {
        return raw.trim().to_string();
    };

    parsed.set_fragment(None);

    if matches!(
        (parsed.scheme(), parsed.port()),
        ("http", Some(80)) | ("https", Some(443))
    ) {
        let _ = parsed.set_port(None);
    }

    let kept: Vec<(String, String)> = parsed
        .query_pairs()
        .filter(|(key, _)| !TRACKING_PARAMS.contains(&key.to_lowercase().as_str()))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    if kept.is_empty() {
        parsed.set_query(None);
    } else {
        let query: String = kept
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");
        parsed.set_query(Some(&query));
    }

    let path = parsed.path().to_string();
    if path.len() > 1 && path.ends_with('/') {
        parsed.set_path(&path[..path.len() - 1]);
    }

    parsed.to_string()
}
