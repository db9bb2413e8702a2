//! Identity resolution port.

use async_trait::async_trait;

use crate::domain::IdentityKey;
use crate::error::DomainError;

/// Raw identity candidates pulled off a request, before any validation.
#[derive(Debug, Clone, Default)]
pub struct IdentityHints {
    /// `x-guest-key` header.
    pub guest_key: Option<String>,
    /// `x-user-key` header (legacy clients).
    pub user_key: Option<String>,
    /// `userKey` field of a JSON body.
    pub body_user_key: Option<String>,
    /// `userKey` query parameter.
    pub query_user_key: Option<String>,
}

/// Identity resolver trait - turns request hints into a stable identity key.
///
/// Implementations may call out to an auth backend, hence async.
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    async fn resolve(&self, hints: &IdentityHints) -> Result<IdentityKey, IdentityError>;
}

/// Identity resolution errors.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("Missing identity key")]
    Missing,

    #[error(transparent)]
    Invalid(#[from] DomainError),

    #[error("Identity backend error: {0}")]
    Backend(String),
}
