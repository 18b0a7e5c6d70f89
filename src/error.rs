//! Unified error handling for the run-log library.
//!
//! Most operations in this crate degrade soft by contract (malformed
//! polylines decode to empty tracks, unmatched location text classifies to
//! empty strings, undated activities are skipped by the aggregator). The
//! error type below covers the cases that genuinely fail: an unreadable
//! activity asset, a duration string no known shape matches, and explicit
//! resolution of a run id that is not in the set.

use thiserror::Error;

/// Unified error type for run-log operations.
#[derive(Debug, Error)]
pub enum RunLogError {
    /// The activity asset is not valid JSON for the expected schema
    #[error("activity asset parse failed: {0}")]
    AssetParse(#[from] serde_json::Error),

    /// A moving-time string matched neither `H:MM:SS` nor `D day(s), H:MM:SS`
    #[error("unparseable duration '{value}'")]
    InvalidDuration { value: String },

    /// A run id was explicitly resolved but is not in the activity set
    #[error("unknown run id {run_id}")]
    UnknownRun { run_id: u64 },
}

/// Result type alias for run-log operations.
pub type Result<T> = std::result::Result<T, RunLogError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RunLogError::InvalidDuration {
            value: "nonsense".to_string(),
        };
        assert!(err.to_string().contains("nonsense"));

        let err = RunLogError::UnknownRun { run_id: 42 };
        assert!(err.to_string().contains("42"));
    }
}
