//! Error types for the research pipeline.
//!
//! Provider and parse failures are recovered locally as "no data for this
//! unit" — only configuration errors abort a run. Error messages are stable
//! strings with no credentials or payload fragments embedded.

/// Errors that can occur while researching subjects.
#[derive(Debug, thiserror::Error)]
pub enum ResearchError {
    /// The search provider answered with a non-success HTTP status.
    #[error("search provider returned status {status}")]
    SearchProvider { status: u16 },

    /// The reasoning provider failed or answered with a non-success status.
    #[error("reasoning provider error: {0}")]
    Reasoning(String),

    /// Transport-level failure talking to either provider.
    #[error("HTTP error: {0}")]
    Http(String),

    /// A provider payload or answer could not be interpreted.
    #[error("parse error: {0}")]
    Parse(String),

    /// Invalid or incomplete pipeline configuration.
    #[error("config error: {0}")]
    Config(String),
}

/// Convenience type alias for pipeline results.
pub type Result<T> = std::result::Result<T, ResearchError>;
