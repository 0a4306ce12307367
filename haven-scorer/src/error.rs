//! Errors raised when scorer configuration is invalid.

use thiserror::Error;

/// Invalid range or weight tables supplied to a scorer.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// A range's bounds were non-finite or not strictly increasing.
    #[error("range {min}..={max} must be finite with min < max")]
    InvalidRange {
        /// Lower bound supplied.
        min: f64,
        /// Upper bound supplied.
        max: f64,
    },
    /// A weight was negative or non-finite.
    #[error("weight for {name} must be finite and non-negative, got {value}")]
    InvalidWeight {
        /// Name of the weighted item.
        name: String,
        /// Rejected weight.
        value: f64,
    },
    /// Component weights did not sum to one.
    #[error("component weights must sum to 1.0, got {total}")]
    WeightsDoNotSumToOne {
        /// Sum of the supplied weights.
        total: f64,
    },
    /// A threshold was outside `0.0..=1.0` or the thresholds were unordered.
    #[error("threshold {name} must lie in 0.0..=1.0 and keep good >= moderate >= poor")]
    InvalidThreshold {
        /// Name of the offending threshold.
        name: String,
    },
}
