use parity_core::ParityError;
use parity_rules::{MatchError, RuleError};
use thiserror::Error;

/// Errors raised by parity aggregation and cost estimation.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("analysis of resource '{resource_id}' failed: {source}")]
    Analysis {
        resource_id: String,
        #[source]
        source: MatchError,
    },
    #[error(transparent)]
    Rules(#[from] RuleError),
    #[error("invalid price tier for meter '{meter_id}': {message}")]
    InvalidTier { meter_id: String, message: String },
    #[error("cost overflow for meter '{meter_id}'")]
    Overflow { meter_id: String },
}

impl From<EngineError> for ParityError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Rules(inner) => inner.into(),
            EngineError::Analysis { .. } => ParityError::RuleEvaluation(err.to_string()),
            other => ParityError::CostEstimation(other.to_string()),
        }
    }
}
