//! Error types for the predictor

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, PredictorError>;

/// Main error type
#[derive(Error, Debug)]
pub enum PredictorError {
    /// Quote API unreachable, non-2xx, timed out or returned a malformed payload
    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Insufficient data: need {required} candles, got {available}")]
    InsufficientData { required: usize, available: usize },

    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Persisted artifact was trained on a different feature schema
    #[error("Feature mismatch: artifact has {expected:?}, engine produced {actual:?}")]
    FeatureMismatch {
        expected: Vec<String>,
        actual: Vec<String>,
    },

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Data unavailable for {symbol}: {reason}")]
    DataUnavailable { symbol: String, reason: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for PredictorError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            PredictorError::Upstream(format!("request timed out: {}", e))
        } else {
            PredictorError::Upstream(e.to_string())
        }
    }
}

impl From<std::io::Error> for PredictorError {
    fn from(e: std::io::Error) -> Self {
        PredictorError::Persistence(e.to_string())
    }
}

impl From<serde_json::Error> for PredictorError {
    fn from(e: serde_json::Error) -> Self {
        PredictorError::Persistence(e.to_string())
    }
}

impl From<csv::Error> for PredictorError {
    fn from(e: csv::Error) -> Self {
        PredictorError::Persistence(e.to_string())
    }
}

impl From<config::ConfigError> for PredictorError {
    fn from(e: config::ConfigError) -> Self {
        PredictorError::Config(e.to_string())
    }
}

impl PredictorError {
    /// Whether the caller should offer the user a retry
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PredictorError::Upstream(_) | PredictorError::DataUnavailable { .. }
        )
    }
}
