//! Pipeline configuration with environment loading and validation.
//!
//! Credentials and tuning knobs are carried in an explicit
//! [`PipelineConfig`] value passed into each component at construction —
//! there is no process-wide credential state. Missing credentials are a
//! fatal setup error surfaced before any work begins.

use crate::error::{ResearchError, Result};
use crate::types::Freshness;
use std::time::Duration;

/// Environment variable carrying the search provider subscription token.
pub const SEARCH_KEY_VAR: &str = "BRAVE_SEARCH_API_KEY";
/// Environment variable carrying the reasoning provider API key.
pub const REASONING_KEY_VAR: &str = "OPENAI_API_KEY";

/// Configuration for a research pipeline run.
///
/// Use [`PipelineConfig::from_env`] in a host process, or construct with
/// field overrides in tests (base URLs point at mock servers there).
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Subscription token for the news search provider.
    pub search_api_key: String,
    /// Base URL of the search provider (no trailing slash).
    pub search_base_url: String,
    /// Minimum spacing between search requests. One request is in flight
    /// at a time and the slot is held for this long afterwards.
    pub search_interval: Duration,
    /// TTL for the per-query search response cache. Zero disables caching.
    pub search_cache_ttl: Duration,
    /// API key for the reasoning provider.
    pub reasoning_api_key: String,
    /// Base URL of the reasoning provider including `/v1`.
    pub reasoning_base_url: String,
    /// Model identifier sent with every reasoning request.
    pub reasoning_model: String,
    /// Maximum concurrent reasoning calls per hold window.
    pub eval_concurrency: usize,
    /// How long each reasoning slot is held after acquisition.
    pub eval_hold: Duration,
    /// Result cap per subject in the final report.
    pub max_per_subject: usize,
    /// Freshness window requested from the search provider.
    pub freshness: Freshness,
    /// Per-request HTTP timeout in seconds, shared by both providers.
    pub timeout_seconds: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            search_api_key: String::new(),
            search_base_url: "https://api.search.brave.com".to_string(),
            search_interval: Duration::from_secs(1),
            search_cache_ttl: Duration::ZERO,
            reasoning_api_key: String::new(),
            reasoning_base_url: "https://api.openai.com/v1".to_string(),
            reasoning_model: "gpt-4o-mini".to_string(),
            eval_concurrency: 5,
            eval_hold: Duration::from_secs(1),
            max_per_subject: 3,
            freshness: Freshness::PastWeek,
            timeout_seconds: 30,
        }
    }
}

impl PipelineConfig {
    /// Load configuration from the process environment.
    ///
    /// Both provider credentials are required; everything else falls back
    /// to the defaults above. Unparseable numeric overrides fall back to
    /// their defaults rather than failing the load.
    ///
    /// # Errors
    ///
    /// Returns [`ResearchError::Config`] if either credential variable is
    /// missing or empty.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable lookup.
    ///
    /// [`from_env`](Self::from_env) delegates here; tests supply a map
    /// instead of mutating the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let default = Self::default();

        let search_api_key = required(&lookup, SEARCH_KEY_VAR)?;
        let reasoning_api_key = required(&lookup, REASONING_KEY_VAR)?;

        let config = Self {
            search_api_key,
            reasoning_api_key,
            search_base_url: lookup("NEWSDESK_SEARCH_BASE_URL")
                .unwrap_or(default.search_base_url),
            search_interval: millis_or(
                &lookup,
                "NEWSDESK_SEARCH_INTERVAL_MS",
                default.search_interval,
            ),
            search_cache_ttl: secs_or(
                &lookup,
                "NEWSDESK_CACHE_TTL_SECONDS",
                default.search_cache_ttl,
            ),
            reasoning_base_url: lookup("NEWSDESK_REASONING_BASE_URL")
                .unwrap_or(default.reasoning_base_url),
            reasoning_model: lookup("NEWSDESK_REASONING_MODEL")
                .unwrap_or(default.reasoning_model),
            eval_concurrency: parse_or(&lookup, "NEWSDESK_EVAL_CONCURRENCY", default.eval_concurrency),
            eval_hold: millis_or(&lookup, "NEWSDESK_EVAL_HOLD_MS", default.eval_hold),
            max_per_subject: parse_or(&lookup, "NEWSDESK_MAX_PER_SUBJECT", default.max_per_subject),
            freshness: lookup("NEWSDESK_FRESHNESS")
                .and_then(|code| Freshness::from_code(&code))
                .unwrap_or(default.freshness),
            timeout_seconds: parse_or(&lookup, "NEWSDESK_TIMEOUT_SECONDS", default.timeout_seconds),
        };

        config.validate()?;
        Ok(config)
    }

    /// Validates this configuration, returning an error if any field is
    /// unusable.
    ///
    /// # Errors
    ///
    /// Returns [`ResearchError::Config`] naming the offending field.
    pub fn validate(&self) -> Result<()> {
        if self.search_api_key.is_empty() {
            return Err(ResearchError::Config(format!("{SEARCH_KEY_VAR} is not set")));
        }
        if self.reasoning_api_key.is_empty() {
            return Err(ResearchError::Config(format!(
                "{REASONING_KEY_VAR} is not set"
            )));
        }
        if self.reasoning_model.is_empty() {
            return Err(ResearchError::Config("reasoning model must be set".into()));
        }
        if self.search_interval.is_zero() {
            return Err(ResearchError::Config(
                "search_interval must be greater than zero".into(),
            ));
        }
        if self.eval_concurrency == 0 {
            return Err(ResearchError::Config(
                "eval_concurrency must be greater than 0".into(),
            ));
        }
        if self.max_per_subject == 0 {
            return Err(ResearchError::Config(
                "max_per_subject must be greater than 0".into(),
            ));
        }
        if self.timeout_seconds == 0 {
            return Err(ResearchError::Config(
                "timeout_seconds must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}

fn required(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Result<String> {
    match lookup(name) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(ResearchError::Config(format!("{name} is not set"))),
    }
}

fn parse_or<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: T,
) -> T {
    lookup(name)
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}

fn millis_or(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: Duration,
) -> Duration {
    lookup(name)
        .and_then(|value| value.parse().ok())
        .map(Duration::from_millis)
        .unwrap_or(default)
}

fn secs_or(lookup: &impl Fn(&str) -> Option<String>, name: &str, default: Duration) -> Duration {
    lookup(name)
        .and_then(|value| value.parse().ok())
        .map(Duration::from_secs)
        .unwrap_or(default)
}
