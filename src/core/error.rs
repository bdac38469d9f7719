//! Error types for the simulation engine and the queueing model

use thiserror::Error;

/// Every failure a scenario run can produce.
///
/// Neither class is retryable: bad configuration is rejected before any state is built,
/// and an invariant violation means the engine itself is wrong.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("Invariant violated: {0}")]
    InvariantViolation(String),
}

impl SimError {
    pub fn is_configuration(&self) -> bool {
        matches!(self, SimError::Configuration(_))
    }

    pub fn is_invariant_violation(&self) -> bool {
        matches!(self, SimError::InvariantViolation(_))
    }
}
