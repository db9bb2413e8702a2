//! Identity and attempt-id resolution from request headers, body and query.

use actix_web::HttpRequest;

use quota_core::domain::{AttemptId, IdentityKey};
use quota_core::ports::IdentityHints;
use quota_shared::dto::{AttemptRequest, UsageQuery};

use crate::middleware::error::AppResult;
use crate::state::AppState;

pub static GUEST_KEY_HEADER: &str = "x-guest-key";
pub static USER_KEY_HEADER: &str = "x-user-key";
pub static ATTEMPT_ID_HEADER: &str = "x-attempt-id";

fn header(req: &HttpRequest, name: &str) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(String::from)
}

/// Collect identity candidates in resolution order.
pub fn identity_hints(
    req: &HttpRequest,
    query: &UsageQuery,
    body: Option<&AttemptRequest>,
) -> IdentityHints {
    IdentityHints {
        guest_key: header(req, GUEST_KEY_HEADER),
        user_key: header(req, USER_KEY_HEADER),
        body_user_key: body.and_then(|b| b.user_key.clone()),
        query_user_key: query.user_key.clone(),
    }
}

/// Resolve the caller's identity key through the configured resolver.
pub async fn resolve_identity(
    state: &AppState,
    req: &HttpRequest,
    query: &UsageQuery,
    body: Option<&AttemptRequest>,
) -> AppResult<IdentityKey> {
    let hints = identity_hints(req, query, body);
    Ok(state.identity.resolve(&hints).await?)
}

/// Attempt id from `x-attempt-id`, body `attemptId` or query `attemptId`.
///
/// A missing id gets a fresh UUID, which means a retry of that request
/// cannot be deduplicated.
pub fn resolve_attempt_id(
    req: &HttpRequest,
    query: &UsageQuery,
    body: Option<&AttemptRequest>,
) -> AttemptId {
    let candidates = [
        header(req, ATTEMPT_ID_HEADER),
        body.and_then(|b| b.attempt_id.clone()),
        query.attempt_id.clone(),
    ];

    if let Some(attempt) = candidates
        .iter()
        .flatten()
        .find_map(|raw| AttemptId::parse(raw).ok())
    {
        return attempt;
    }

    let generated = AttemptId::generate();
    tracing::debug!(attempt_id = %generated, "No attempt id supplied, generated one");
    generated
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn test_attempt_header_beats_body_and_query() {
        let req = TestRequest::default()
            .insert_header((ATTEMPT_ID_HEADER, " from-header "))
            .to_http_request();
        let query = UsageQuery {
            attempt_id: Some("from-query".to_string()),
            ..Default::default()
        };
        let body = AttemptRequest {
            attempt_id: Some("from-body".to_string()),
            ..Default::default()
        };

        let attempt = resolve_attempt_id(&req, &query, Some(&body));
        assert_eq!(attempt.as_str(), "from-header");
    }

    #[test]
    fn test_blank_attempt_ids_are_skipped() {
        let req = TestRequest::default()
            .insert_header((ATTEMPT_ID_HEADER, "  "))
            .to_http_request();
        let query = UsageQuery {
            attempt_id: Some("from-query".to_string()),
            ..Default::default()
        };

        let attempt = resolve_attempt_id(&req, &query, None);
        assert_eq!(attempt.as_str(), "from-query");
    }

    #[test]
    fn test_missing_attempt_id_is_generated() {
        let req = TestRequest::default().to_http_request();
        let first = resolve_attempt_id(&req, &UsageQuery::default(), None);
        let second = resolve_attempt_id(&req, &UsageQuery::default(), None);
        assert_ne!(first, second);
    }

    #[test]
    fn test_identity_hints_collects_all_sources() {
        let req = TestRequest::default()
            .insert_header((GUEST_KEY_HEADER, "guest"))
            .insert_header((USER_KEY_HEADER, "legacy"))
            .to_http_request();
        let query = UsageQuery {
            user_key: Some("query".to_string()),
            ..Default::default()
        };
        let body = AttemptRequest {
            user_key: Some("body".to_string()),
            ..Default::default()
        };

        let hints = identity_hints(&req, &query, Some(&body));
        assert_eq!(hints.guest_key.as_deref(), Some("guest"));
        assert_eq!(hints.user_key.as_deref(), Some("legacy"));
        assert_eq!(hints.body_user_key.as_deref(), Some("body"));
        assert_eq!(hints.query_user_key.as_deref(), Some("query"));
    }
}
