//! Error types for the callpulse query pipeline.
//!
//! All fallible operations return `CallpulseResult<T>`. "No activity" is not
//! an error: a query that matches zero events returns an empty or default
//! result (offline agent, all-zero metrics), never a variant of this enum.

use thiserror::Error;

/// The unified error type for callpulse.
#[derive(Debug, Error)]
pub enum CallpulseError {
    /// A single record failed structural validation.
    ///
    /// Aggregations skip such records and keep going; this variant only
    /// surfaces when the caller parses one record directly.
    #[error("malformed input: {reason}")]
    MalformedInput { reason: String },

    /// The caller asked for a window whose end precedes its start, or for a
    /// non-positive SLA threshold. Rejected before any event is read.
    #[error("invalid window: {reason}")]
    InvalidWindow { reason: String },

    /// The event source or catalog failed or timed out.
    ///
    /// Must never be treated as "zero activity".
    #[error("upstream '{source_name}' unavailable: {reason}")]
    UpstreamUnavailable { source_name: String, reason: String },

    /// The caller cancelled the query.
    #[error("query cancelled: {reason}")]
    Cancelled { reason: String },

    /// The caller-supplied deadline passed before the query finished.
    #[error("deadline exceeded after {elapsed_ms} ms during {phase}")]
    DeadlineExceeded { elapsed_ms: u128, phase: String },

    /// A required configuration value is missing or invalid.
    #[error("configuration error: {reason}")]
    ConfigError { reason: String },
}

impl CallpulseError {
    /// True for errors caused by the caller's own request rather than by data
    /// or infrastructure.
    pub fn is_caller_error(&self) -> bool {
        matches!(self, Self::InvalidWindow { .. } | Self::Cancelled { .. })
    }
}

/// Convenience alias used throughout the callpulse crates.
pub type CallpulseResult<T> = Result<T, CallpulseError>;
