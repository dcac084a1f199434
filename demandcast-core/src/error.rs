//! Error types for the demandcast-core crate.

use thiserror::Error;

/// Top-level error type for the batch inference pipeline.
///
/// Every variant is fatal: the pipeline has no retry, fallback, or
/// partial-success path. A stage either fully completes or the run aborts.
#[derive(Debug, Error)]
pub enum ForecastError {
    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Registry unavailable: {0}")]
    RegistryUnavailable(String),

    #[error("Invalid forecast horizon: {0} (must be >= 1 day)")]
    InvalidHorizon(i64),

    #[error("Feature schema mismatch: {0}")]
    SchemaMismatch(String),

    #[error("Length mismatch: expected {expected} predictions, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl ForecastError {
    pub fn model_not_found(msg: impl Into<String>) -> Self {
        Self::ModelNotFound(msg.into())
    }

    pub fn registry_unavailable(msg: impl Into<String>) -> Self {
        Self::RegistryUnavailable(msg.into())
    }

    pub fn schema_mismatch(msg: impl Into<String>) -> Self {
        Self::SchemaMismatch(msg.into())
    }

    pub fn persistence(msg: impl Into<String>) -> Self {
        Self::Persistence(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
