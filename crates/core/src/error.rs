//! Unified error types for the ETL pipeline.
//!
//! Every job failure is recorded (freshness/audit) and then propagated;
//! nothing in the pipeline swallows an error. The HTTP layer maps these
//! to status codes via `http_status`.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for the ETL pipeline.
#[derive(Debug, Error)]
pub enum Error {
    /// Dispatch received an identifier with no registered handler.
    /// Carries the original, unnormalized identifier.
    #[error("unsupported job: {0}")]
    UnsupportedJob(String),

    /// Failure while contacting an external provider (non-2xx, timeout,
    /// malformed response).
    #[error("source fetch failed: {0}")]
    SourceFetch(String),

    /// Embedding output does not match the configured vector width.
    #[error("embedding dimensions mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Failure during upsert/freshness/audit writes.
    #[error("persistence error: {0}")]
    Persistence(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    pub fn unsupported_job(job: impl Into<String>) -> Self {
        Self::UnsupportedJob(job.into())
    }

    pub fn source_fetch(msg: impl Into<String>) -> Self {
        Self::SourceFetch(msg.into())
    }

    pub fn persistence(msg: impl Into<String>) -> Self {
        Self::Persistence(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Get the HTTP status code for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::UnsupportedJob(_) => 400,
            Self::SourceFetch(_) => 502,
            Self::DimensionMismatch { .. } => 500,
            Self::Persistence(_) => 500,
            Self::Validation(_) => 400,
            Self::Serialization(_) => 400,
        }
    }
}
