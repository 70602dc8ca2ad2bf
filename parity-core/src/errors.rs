use std::io;

use thiserror::Error;

/// Result type used across the parity core crate.
pub type Result<T> = std::result::Result<T, ParityError>;

/// Canonical error representation shared by all crates of the workspace.
#[derive(Debug, Error)]
pub enum ParityError {
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    #[error("serialization error: {0}")]
    SerializationError(String),

    #[error("deserialization error: {0}")]
    DeserializationError(String),

    #[error("rule configuration error: {0}")]
    RuleConfiguration(String),

    #[error("rule evaluation error: {0}")]
    RuleEvaluation(String),

    #[error("cost estimation error: {0}")]
    CostEstimation(String),

    #[error("configuration error: {0}")]
    ConfigError(String),

    #[error("general error: {0}")]
    GeneralError(String),
}

impl From<serde_json::Error> for ParityError {
    fn from(err: serde_json::Error) -> Self {
        ParityError::DeserializationError(err.to_string())
    }
}

impl From<anyhow::Error> for ParityError {
    fn from(err: anyhow::Error) -> Self {
        ParityError::GeneralError(err.to_string())
    }
}

/// Dedicated configuration error used by the configuration module.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for environment variable {key}: {value}")]
    InvalidEnvVar { key: String, value: String },

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<ConfigError> for ParityError {
    fn from(value: ConfigError) -> Self {
        ParityError::ConfigError(value.to_string())
    }
}
