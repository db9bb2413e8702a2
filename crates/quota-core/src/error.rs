//! Domain-level error types.

use thiserror::Error;

/// Domain errors - malformed input rejected at the boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("Identity key must be a non-empty string")]
    EmptyIdentityKey,

    #[error("Attempt id must be a non-empty string")]
    EmptyAttemptId,

    #[error("Invalid feature kind: {0:?}")]
    InvalidFeatureKind(String),

    #[error("Invalid limit: {0:?}")]
    InvalidLimit(String),
}
