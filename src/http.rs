//! Shared HTTP client construction for provider requests.
//!
//! Both provider adapters share one [`reqwest::Client`] so connection
//! pools and the request timeout are configured in a single place.

use crate::error::ResearchError;
use std::time::Duration;

/// Build a [`reqwest::Client`] for talking to the search and reasoning
/// providers.
///
/// The client has:
/// - Request timeout from config
/// - Gzip response decompression (the search provider compresses payloads)
/// - A bounded redirect policy
///
/// # Errors
///
/// Returns [`ResearchError::Http`] if the client cannot be constructed.
pub fn build_client(timeout: Duration) -> Result<reqwest::Client, ResearchError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .redirect(reqwest::redirect::Policy::limited(5))
        .build()
        .map_err(|e| ResearchError::Http(format!("failed to build HTTP client: {e}")))
}
