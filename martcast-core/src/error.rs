//! Error types for the martcast-core crate.

use thiserror::Error;

/// Top-level error type for pipeline, model, and serving operations.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Input schema error: {0}")]
    InputSchema(String),

    #[error("Imputation error: {0}")]
    Imputation(String),

    #[error("Missing persisted state: {0}")]
    MissingState(String),

    #[error("Numeric coercion error: {0}")]
    Coercion(String),

    #[error("Dataset error: {0}")]
    Dataset(String),

    #[error("Model error: {0}")]
    Model(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl CoreError {
    pub fn input_schema(msg: impl Into<String>) -> Self {
        Self::InputSchema(msg.into())
    }

    pub fn imputation(msg: impl Into<String>) -> Self {
        Self::Imputation(msg.into())
    }

    pub fn missing_state(msg: impl Into<String>) -> Self {
        Self::MissingState(msg.into())
    }

    pub fn coercion(msg: impl Into<String>) -> Self {
        Self::Coercion(msg.into())
    }

    pub fn dataset(msg: impl Into<String>) -> Self {
        Self::Dataset(msg.into())
    }

    pub fn model(msg: impl Into<String>) -> Self {
        Self::Model(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Stable machine-readable category, used in boundary error payloads
    /// instead of raw error strings.
    pub fn category(&self) -> &'static str {
        match self {
            Self::InputSchema(_) => "input_schema",
            Self::Imputation(_) => "imputation",
            Self::MissingState(_) => "missing_state",
            Self::Coercion(_) => "numeric_coercion",
            Self::Dataset(_) => "dataset",
            Self::Model(_) => "model",
            Self::Config(_) => "config",
            Self::Io(_) => "io",
            Self::Serde(_) => "serialization",
        }
    }
}
