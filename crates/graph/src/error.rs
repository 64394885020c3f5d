//! Error types for the graph crate.
//!
//! Only configuration and output can fail: scoring, building and filtering
//! are total once their parameters have been accepted.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GraphError {
    /// Filter threshold outside [0, 1] (or NaN)
    #[error("Invalid threshold {value}: must be within [0, 1]")]
    InvalidThreshold { value: f64 },

    /// Scoring coefficients are negative, non-finite or don't sum to 1
    #[error("Invalid scoring weights: {reason}")]
    InvalidWeights { reason: String },

    /// A scorer parameter other than the weights is unusable
    #[error("Invalid scorer setting {parameter}: {value}")]
    InvalidScorer { parameter: String, value: String },

    /// A layout parameter is unusable
    #[error("Invalid layout setting {parameter}: {value}")]
    InvalidLayout { parameter: String, value: String },

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, GraphError>;
