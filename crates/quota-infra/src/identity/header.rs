//! Resolves identity from request-supplied keys.

use async_trait::async_trait;

use quota_core::DomainError;
use quota_core::domain::IdentityKey;
use quota_core::ports::{IdentityError, IdentityHints, IdentityResolver};

/// Trusts the key the client sends, checking sources in order:
/// `x-guest-key`, `x-user-key`, body `userKey`, query `userKey`.
///
/// Blank candidates are skipped. Deployments with an auth backend put a
/// token-verifying resolver in front of this one.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderIdentityResolver;

#[async_trait]
impl IdentityResolver for HeaderIdentityResolver {
    async fn resolve(&self, hints: &IdentityHints) -> Result<IdentityKey, IdentityError> {
        let candidates = [
            &hints.guest_key,
            &hints.user_key,
            &hints.body_user_key,
            &hints.query_user_key,
        ];

        let mut saw_blank = false;
        for candidate in candidates.into_iter().flatten() {
            match IdentityKey::parse(candidate) {
                Ok(key) => return Ok(key),
                Err(_) => saw_blank = true,
            }
        }

        if saw_blank {
            Err(IdentityError::Invalid(DomainError::EmptyIdentityKey))
        } else {
            Err(IdentityError::Missing)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_guest_key_wins() {
        let hints = IdentityHints {
            guest_key: Some("guest-1".to_string()),
            user_key: Some("legacy".to_string()),
            query_user_key: Some("query".to_string()),
            ..Default::default()
        };
        let key = HeaderIdentityResolver.resolve(&hints).await.unwrap();
        assert_eq!(key.as_str(), "guest-1");
    }

    #[tokio::test]
    async fn test_blank_header_falls_through() {
        let hints = IdentityHints {
            guest_key: Some("   ".to_string()),
            body_user_key: Some(" body-user ".to_string()),
            ..Default::default()
        };
        let key = HeaderIdentityResolver.resolve(&hints).await.unwrap();
        assert_eq!(key.as_str(), "body-user");
    }

    #[tokio::test]
    async fn test_missing_identity() {
        let err = HeaderIdentityResolver
            .resolve(&IdentityHints::default())
            .await
            .unwrap_err();
        assert!(matches!(err, IdentityError::Missing));
    }

    #[tokio::test]
    async fn test_only_blank_identity() {
        let hints = IdentityHints {
            user_key: Some("".to_string()),
            ..Default::default()
        };
        let err = HeaderIdentityResolver.resolve(&hints).await.unwrap_err();
        assert!(matches!(
            err,
            IdentityError::Invalid(DomainError::EmptyIdentityKey)
        ));
    }
}
