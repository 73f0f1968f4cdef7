use thiserror::Error;

/// Failures surfaced by the search-and-synthesize pipeline.
///
/// Nothing in the pipeline retries or falls back: every variant reaches the
/// presentation layer as-is.
#[derive(Debug, Error)]
pub enum FaqError {
    /// Embedding provider unreachable or returned malformed output.
    #[error("embedding failed: {0}")]
    Embedding(String),
    /// Database unreachable or the nearest-neighbor query failed.
    #[error("retrieval failed: {0}")]
    Retrieval(String),
    /// Completion provider unreachable or its output failed validation.
    #[error("synthesis failed: {0}")]
    Synthesis(String),
    /// Missing or malformed credentials / settings.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// Rejected user input (zero limit, unknown category, bad dates).
    #[error("invalid query: {0}")]
    InvalidQuery(String),
}

impl FaqError {
    pub fn embedding<E: std::fmt::Display>(err: E) -> Self {
        FaqError::Embedding(err.to_string())
    }

    pub fn retrieval<E: std::fmt::Display>(err: E) -> Self {
        FaqError::Retrieval(err.to_string())
    }

    pub fn synthesis<E: std::fmt::Display>(err: E) -> Self {
        FaqError::Synthesis(err.to_string())
    }

    /// Short label used by the UIs when rendering the error state.
    pub fn stage(&self) -> &'static str {
        match self {
            FaqError::Embedding(_) => "embedding",
            FaqError::Retrieval(_) => "retrieval",
            FaqError::Synthesis(_) => "synthesis",
            FaqError::Configuration(_) => "configuration",
            FaqError::InvalidQuery(_) => "query",
        }
    }
}

pub type FaqResult<T> = Result<T, FaqError>;
