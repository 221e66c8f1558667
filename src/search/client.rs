//! News search provider adapter.
//!
//! Issues one keyed GET per subject against a Brave-style news search
//! endpoint, gated by the shared [`IntervalLimiter`]. The raw payload is a
//! dynamic JSON document; it is narrowed to a closed schema here so every
//! downstream component works with fully-populated [`NewsItem`] records.

use std::sync::Arc;

use serde::Deserialize;
use tracing::debug;

use crate::config::PipelineConfig;
use crate::error::{ResearchError, Result};
use crate::limit::IntervalLimiter;
use crate::search::cache::{CacheKey, ResponseCache};
use crate::types::{Freshness, NewsItem, NOT_AVAILABLE};

/// Path of the news search endpoint under the provider base URL.
const SEARCH_PATH: &str = "/res/v1/news/search";

/// A pluggable search backend.
///
/// The pipeline is generic over this trait so orchestration tests can
/// substitute scripted backends. All implementations must be `Send + Sync`
/// for the concurrent per-subject fan-out.
pub trait SearchProvider: Send + Sync {
    /// Search for news about one subject.
    ///
    /// # Errors
    ///
    /// Returns [`ResearchError::SearchProvider`] on a non-success provider
    /// status, [`ResearchError::Http`] on transport failure, and
    /// [`ResearchError::Parse`] if the payload cannot be interpreted. The
    /// orchestrator recovers any of these as "no results for this subject".
    fn search(
        &self,
        subject: &str,
    ) -> impl std::future::Future<Output = Result<Vec<NewsItem>>> + Send;
}

/// Rate-limited client for the news search provider.
#[derive(Debug)]
pub struct NewsSearchClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    freshness: Freshness,
    limiter: Arc<IntervalLimiter>,
    cache: ResponseCache,
}

impl NewsSearchClient {
    /// Create a client from the pipeline config and the shared limiter.
    pub fn new(
        client: reqwest::Client,
        config: &PipelineConfig,
        limiter: Arc<IntervalLimiter>,
    ) -> Self {
        Self {
            client,
            base_url: config.search_base_url.trim_end_matches('/').to_string(),
            api_key: config.search_api_key.clone(),
            freshness: config.freshness,
            limiter,
            cache: ResponseCache::new(config.search_cache_ttl),
        }
    }

    async fn fetch(&self, query: &str) -> Result<Vec<NewsItem>> {
        // The permit covers the request; dropping it afterwards starts the
        // provider's mandatory quiet interval.
        let _slot = self.limiter.acquire().await;

        let response = self
            .client
            .get(format!("{}{SEARCH_PATH}", self.base_url))
            .header("Accept", "application/json")
            .header("X-Subscription-Token", &self.api_key)
            .query(&[("q", query), ("freshness", self.freshness.code())])
            .send()
            .await
            .map_err(|e| ResearchError::Http(format!("search request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ResearchError::SearchProvider {
                status: status.as_u16(),
            });
        }

        let payload: NewsResponse = response
            .json()
            .await
            .map_err(|e| ResearchError::Parse(format!("search payload: {e}")))?;

        Ok(payload
            .results
            .into_iter()
            .map(RawNewsItem::into_item)
            .collect())
    }
}

impl SearchProvider for NewsSearchClient {
    async fn search(&self, subject: &str) -> Result<Vec<NewsItem>> {
        if subject.trim().is_empty() {
            return Err(ResearchError::Parse("empty subject query".into()));
        }

        let key = CacheKey::new(subject, self.freshness);
        if let Some(hit) = self.cache.get(&key).await {
            debug!(subject, count = hit.len(), "search cache hit");
            return Ok(hit);
        }

        let items = self.fetch(subject).await?;
        debug!(subject, count = items.len(), "search returned results");
        self.cache.insert(key, items.clone()).await;
        Ok(items)
    }
}

/// Wire shape of the provider's news response.
#[derive(Debug, Deserialize)]
struct NewsResponse {
    #[serde(default)]
    results: Vec<RawNewsItem>,
}

/// One raw result entry; every field the provider may omit is optional.
#[derive(Debug, Deserialize)]
struct RawNewsItem {
    title: Option<String>,
    url: Option<String>,
    description: Option<String>,
    page_age: Option<String>,
    age: Option<String>,
    #[serde(default)]
    extra_snippets: Vec<String>,
}

impl RawNewsItem {
    /// Close the schema: absent or blank fields become the `"N/A"` sentinel.
    fn into_item(self) -> NewsItem {
        NewsItem {
            title: or_not_available(self.title),
            url: or_not_available(self.url),
            description: or_not_available(self.description),
            page_age: or_not_available(self.page_age),
            age: or_not_available(self.age),
            extra_snippets: self.extra_snippets,
        }
    }
}

fn or_not_available(field: Option<String>) -> String {
    match field {
        Some(value) if !value.trim().is_empty() => value,
        _ => NOT_AVAILABLE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_payload_parses() {
        let payload = serde_json::json!({
            "results": [{
                "title": "Acme raises Series C",
                "url": "https://news.example.com/acme-series-c",
                "description": "Acme Corp announced...",
                "page_age": "2026-08-01T09:00:00",
                "age": "5 days ago",
                "extra_snippets": ["The round was led by..."],
            }]
        });
        let response: NewsResponse = serde_json::from_value(payload).expect("parse");
        let items: Vec<NewsItem> = response
            .results
            .into_iter()
            .map(RawNewsItem::into_item)
            .collect();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "Acme raises Series C");
        assert_eq!(items[0].extra_snippets.len(), 1);
    }

    #[test]
    fn missing_fields_default_to_sentinel() {
        let payload = serde_json::json!({
            "results": [{ "url": "https://news.example.com/bare" }]
        });
        let response: NewsResponse = serde_json::from_value(payload).expect("parse");
        let item = response
            .results
            .into_iter()
            .map(RawNewsItem::into_item)
            .next()
            .expect("one item");
        assert_eq!(item.title, NOT_AVAILABLE);
        assert_eq!(item.description, NOT_AVAILABLE);
        assert_eq!(item.page_age, NOT_AVAILABLE);
        assert_eq!(item.age, NOT_AVAILABLE);
        assert!(item.extra_snippets.is_empty());
        assert_eq!(item.url, "https://news.example.com/bare");
    }

    #[test]
    fn blank_fields_treated_as_missing() {
        let payload = serde_json::json!({
            "results": [{ "title": "   ", "url": "https://example.com" }]
        });
        let response: NewsResponse = serde_json::from_value(payload).expect("parse");
        let item = response
            .results
            .into_iter()
            .map(RawNewsItem::into_item)
            .next()
            .expect("one item");
        assert_eq!(item.title, NOT_AVAILABLE);
    }

    #[test]
    fn empty_and_unknown_payloads_tolerated() {
        let empty: NewsResponse = serde_json::from_value(serde_json::json!({})).expect("parse");
        assert!(empty.results.is_empty());

        let extra: NewsResponse = serde_json::from_value(serde_json::json!({
            "results": [],
            "query": {"original": "acme"},
        }))
        .expect("unknown top-level fields are ignored");
        assert!(extra.results.is_empty());
    }
}
